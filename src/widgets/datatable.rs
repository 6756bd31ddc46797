use crate::import::{Column, Record};
use crate::view::{SortSpec, VisiblePage};
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Cell, Paragraph, Row, StatefulWidget, Table, TableState, Widget},
};

/// Renders one page of the lead table: header row with a sort arrow and a
/// highlighted column cursor, a saved-marker column, and a
/// "Showing X to Y of Z" footer.
pub struct DataTable<'a> {
    pub columns: &'a [Column],
    pub page: &'a VisiblePage<'a>,
    pub sort: Option<&'a SortSpec>,
    pub column_cursor: usize,
    pub current_page: usize,
    pub page_size: usize,
    pub row_numbers: bool,
    pub is_saved: &'a dyn Fn(&Record) -> bool,
}

impl DataTable<'_> {
    fn header(&self) -> Row<'static> {
        let mut cells = Vec::with_capacity(self.columns.len() + 2);
        if self.row_numbers {
            cells.push(Cell::from("#"));
        }
        for (idx, column) in self.columns.iter().enumerate() {
            let mut title = column.label.clone();
            if let Some(sort) = self.sort {
                if sort.key == column.key {
                    title = format!("{} {}", title, sort.direction.arrow());
                }
            }
            let mut style = Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD);
            if idx == self.column_cursor {
                style = style.add_modifier(Modifier::REVERSED);
            }
            cells.push(Cell::from(title).style(style));
        }
        cells.push(Cell::from("★").style(Style::default().fg(Color::Yellow)));
        Row::new(cells).height(1)
    }

    fn rows(&self) -> Vec<Row<'static>> {
        self.page
            .rows
            .iter()
            .map(|record| {
                let mut cells = Vec::with_capacity(self.columns.len() + 2);
                if self.row_numbers {
                    cells.push(Cell::from(record.id.clone()).style(Style::default().fg(Color::DarkGray)));
                }
                for column in self.columns {
                    cells.push(Cell::from(record.get(&column.key).to_string()));
                }
                let marker = if (self.is_saved)(record) { "★" } else { "" };
                cells.push(Cell::from(marker).style(Style::default().fg(Color::Yellow)));
                Row::new(cells).height(1)
            })
            .collect()
    }

    fn footer_text(&self) -> String {
        if self.page.total_count == 0 {
            return "No matching rows".to_string();
        }
        let first = (self.current_page - 1) * self.page_size + 1;
        let last = (self.current_page * self.page_size).min(self.page.total_count);
        format!(
            "Showing {} to {} of {} results (page {} of {})",
            first.min(self.page.total_count),
            last,
            self.page.total_count,
            self.current_page,
            self.page.total_pages
        )
    }

    fn widths(&self) -> Vec<Constraint> {
        let mut widths = Vec::with_capacity(self.columns.len() + 2);
        if self.row_numbers {
            widths.push(Constraint::Length(5));
        }
        widths.extend(self.columns.iter().map(|_| Constraint::Fill(1)));
        widths.push(Constraint::Length(3));
        widths
    }
}

impl StatefulWidget for DataTable<'_> {
    type State = TableState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Fill(1), Constraint::Length(1)])
            .split(area);

        let table = Table::new(self.rows(), self.widths())
            .header(self.header())
            .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .block(Block::default().borders(Borders::ALL).title("Leads"));
        StatefulWidget::render(table, layout[0], buf, state);

        Paragraph::new(self.footer_text())
            .style(Style::default().fg(Color::DarkGray))
            .render(layout[1], buf);
    }
}
