use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::Widget,
};

/// One-line key-hint bar rendered at the bottom of the screen.
pub struct Controls {
    pub hints: Vec<(&'static str, &'static str)>,
    pub row_count: Option<usize>,
    pub key_color: Color,
    pub label_color: Color,
}

impl Controls {
    pub fn new(hints: Vec<(&'static str, &'static str)>) -> Self {
        Self {
            hints,
            row_count: None,
            key_color: Color::Cyan,
            label_color: Color::White,
        }
    }

    pub fn with_row_count(mut self, row_count: usize) -> Self {
        self.row_count = Some(row_count);
        self
    }
}

impl Widget for Controls {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let mut spans = Vec::new();
        if let Some(count) = self.row_count {
            spans.push(Span::styled(
                format!("{} rows ", count),
                Style::default().fg(self.label_color),
            ));
        }
        for (key, label) in &self.hints {
            spans.push(Span::styled(
                format!(" {} ", key),
                Style::default().fg(self.key_color).bg(Color::Indexed(236)),
            ));
            spans.push(Span::styled(
                format!(" {}  ", label),
                Style::default().fg(self.label_color),
            ));
        }
        Line::from(spans).render(area, buf);
    }
}
