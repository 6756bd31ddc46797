use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::path::PathBuf;
use std::sync::mpsc::Sender;

use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::{buffer::Buffer, layout::Rect, widgets::Widget};

use ratatui::widgets::{
    Block, Borders, Clear, List, ListItem, Paragraph, StatefulWidget, TableState,
};

pub mod cli;
pub mod config;
pub mod filter_modal;
pub mod import;
pub mod saved;
pub mod storage;
pub mod view;
pub mod widgets;

pub use cli::Args;
pub use config::{AppConfig, ConfigManager};
pub use import::{LeadTable, OpenOptions, Record};
pub use saved::{SavedProfile, SavedStore};
pub use storage::StorageManager;
pub use view::{FilterSpec, SortSpec, ViewState};

use filter_modal::{FilterFocus, FilterModal};
use widgets::controls::Controls;
use widgets::datatable::DataTable;

/// Application name used for config/data directories and other app-specific paths
pub const APP_NAME: &str = "leadtui";

pub enum AppEvent {
    Key(KeyEvent),
    Open(PathBuf, OpenOptions),
    Search(String),
    Filter(FilterSpec),
    Sort(String), // Canonical key of the column to sort by
    ToggleSave(String),
    RemoveSaved(String),
    Exit,
    Crash(String),
    Resize(u16, u16), // resized (width, height)
}

#[derive(Debug, Default, PartialEq, Eq)]
pub enum InputMode {
    #[default]
    Normal,
    Searching,
    Filtering,
}

/// Which screen is showing. The profile view remembers where it was opened
/// from so Esc returns there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    Browse,
    Saved,
    Profile { id: String, from_saved: bool },
}

#[derive(Default)]
pub struct ErrorModal {
    pub active: bool,
    pub message: String,
}

impl ErrorModal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show(&mut self, message: String) {
        self.active = true;
        self.message = message;
    }

    pub fn hide(&mut self) {
        self.active = false;
        self.message.clear();
    }
}

/// Saved entries whose snapshot matches the term in any field,
/// case-insensitively. An empty term matches everything.
pub fn filter_saved<'a>(entries: &'a [SavedProfile], term: &str) -> Vec<&'a SavedProfile> {
    let term = term.to_lowercase();
    entries
        .iter()
        .filter(|entry| {
            term.is_empty()
                || entry
                    .profile
                    .fields
                    .values()
                    .any(|v| v.to_lowercase().contains(&term))
        })
        .collect()
}

pub struct App {
    pub table: Option<LeadTable>,
    pub view_state: ViewState,
    pub screen: Screen,
    events: Sender<AppEvent>,
    debug: bool,
    num_events: u64,
    input: String,
    pub input_mode: InputMode,
    pub filter_modal: FilterModal,
    error_modal: ErrorModal,
    show_help: bool,
    pub table_state: TableState,
    pub saved_state: TableState,
    pub column_cursor: usize,
    saved_store: SavedStore,
    saved_search: String,
    row_numbers: bool,
}

impl App {
    pub fn new(events: Sender<AppEvent>, storage: &StorageManager) -> App {
        Self::with_config(events, storage, AppConfig::default())
    }

    pub fn with_config(
        events: Sender<AppEvent>,
        storage: &StorageManager,
        config: AppConfig,
    ) -> App {
        App {
            table: None,
            view_state: ViewState::with_page_size(config.display.page_size),
            screen: Screen::Browse,
            events,
            debug: false,
            num_events: 0,
            input: String::new(),
            input_mode: InputMode::Normal,
            filter_modal: FilterModal::new(),
            error_modal: ErrorModal::new(),
            show_help: false,
            table_state: TableState::default(),
            saved_state: TableState::default(),
            column_cursor: 0,
            saved_store: SavedStore::load(storage),
            saved_search: String::new(),
            row_numbers: config.display.row_numbers,
        }
    }

    pub fn enable_debug(&mut self) {
        self.debug = true;
    }

    pub fn send_event(&mut self, event: AppEvent) -> Result<()> {
        self.events.send(event)?;
        Ok(())
    }

    pub fn saved_store(&self) -> &SavedStore {
        &self.saved_store
    }

    fn load(&mut self, path: &PathBuf, options: &OpenOptions) -> Result<()> {
        let table = LeadTable::from_path(path, options)?;
        self.view_state = ViewState::with_page_size(self.view_state.page_size);
        self.column_cursor = 0;
        self.table_state.select(Some(0));
        self.table = Some(table);
        Ok(())
    }

    fn records(&self) -> &[Record] {
        self.table.as_ref().map(|t| t.records.as_slice()).unwrap_or(&[])
    }

    /// The record under the row cursor on the currently visible page.
    fn selected_record(&self) -> Option<Record> {
        let table = self.table.as_ref()?;
        let page = self.view_state.visible(&table.records);
        let idx = self.table_state.selected()?;
        page.rows.get(idx).map(|r| (*r).clone())
    }

    fn selected_saved_id(&self) -> Option<String> {
        let visible = filter_saved(self.saved_store.list(), &self.saved_search);
        let idx = self.saved_state.selected()?;
        visible.get(idx).map(|e| e.id.clone())
    }

    /// The record backing the profile screen: live table data when browsing,
    /// the stored snapshot when opened from the saved list.
    fn profile_record(&self, id: &str, from_saved: bool) -> Option<Record> {
        if from_saved {
            self.saved_store.get(id).map(|e| e.profile.clone())
        } else {
            self.table.as_ref().and_then(|t| t.record(id)).cloned()
        }
    }

    pub fn event(&mut self, event: &AppEvent) -> Option<AppEvent> {
        self.num_events += 1;
        match event {
            AppEvent::Key(key) => self.key(key),
            AppEvent::Open(path, options) => {
                // Import errors block the whole upload; nothing partial is kept.
                if let Err(e) = self.load(path, options) {
                    self.error_modal.show(format!("Could not import file: {}", e));
                }
                None
            }
            AppEvent::Search(term) => {
                let records = self.table.as_ref().map(|t| t.records.as_slice()).unwrap_or(&[]);
                self.view_state.set_search(term.clone(), records);
                self.table_state.select(Some(0));
                None
            }
            AppEvent::Filter(spec) => {
                let records = self.table.as_ref().map(|t| t.records.as_slice()).unwrap_or(&[]);
                self.view_state.set_filters(spec.clone(), records);
                self.table_state.select(Some(0));
                None
            }
            AppEvent::Sort(key) => {
                self.view_state.toggle_sort(key);
                None
            }
            AppEvent::ToggleSave(id) => {
                let record = self
                    .table
                    .as_ref()
                    .and_then(|t| t.record(id))
                    .cloned()
                    .or_else(|| self.saved_store.get(id).map(|e| e.profile.clone()));
                if let Some(record) = record {
                    if let Err(e) = self.saved_store.toggle_save(&record) {
                        self.error_modal
                            .show(format!("Could not save profile: {}", e));
                    }
                }
                None
            }
            AppEvent::RemoveSaved(id) => {
                if let Err(e) = self.saved_store.remove(id) {
                    self.error_modal
                        .show(format!("Could not remove profile: {}", e));
                }
                let remaining = filter_saved(self.saved_store.list(), &self.saved_search).len();
                if remaining == 0 {
                    self.saved_state.select(None);
                } else if let Some(idx) = self.saved_state.selected() {
                    self.saved_state.select(Some(idx.min(remaining - 1)));
                }
                None
            }
            AppEvent::Resize(_, _) => None,
            AppEvent::Exit | AppEvent::Crash(_) => None, // handled by the main loop
        }
    }

    fn key(&mut self, event: &KeyEvent) -> Option<AppEvent> {
        // Error modal has highest priority
        if self.error_modal.active {
            if matches!(event.code, KeyCode::Esc | KeyCode::Enter) {
                self.error_modal.hide();
            }
            return None;
        }

        if self.show_help {
            if matches!(event.code, KeyCode::Esc | KeyCode::Char('?')) {
                self.show_help = false;
            }
            return None;
        }

        if event.code == KeyCode::Char('?') {
            self.show_help = true;
            return None;
        }

        if self.input_mode == InputMode::Filtering {
            return self.filter_key(event);
        }

        if self.input_mode == InputMode::Searching {
            return self.search_key(event);
        }

        match self.screen.clone() {
            Screen::Browse => self.browse_key(event),
            Screen::Saved => self.saved_key(event),
            Screen::Profile { id, from_saved } => self.profile_key(event, &id, from_saved),
        }
    }

    fn search_key(&mut self, event: &KeyEvent) -> Option<AppEvent> {
        match event.code {
            KeyCode::Esc => {
                self.input_mode = InputMode::Normal;
                self.input.clear();
            }
            KeyCode::Enter => {
                let term = self.input.clone();
                self.input_mode = InputMode::Normal;
                self.input.clear();
                if self.screen == Screen::Saved {
                    self.saved_search = term;
                    self.saved_state.select(Some(0));
                } else {
                    return Some(AppEvent::Search(term));
                }
            }
            KeyCode::Backspace => {
                self.input.pop();
            }
            KeyCode::Char(c) => {
                self.input.push(c);
            }
            _ => {}
        }
        None
    }

    fn filter_key(&mut self, event: &KeyEvent) -> Option<AppEvent> {
        match event.code {
            KeyCode::Esc => {
                self.input_mode = InputMode::Normal;
                self.filter_modal.active = false;
            }
            KeyCode::Tab => self.filter_modal.next_focus(),
            KeyCode::BackTab => self.filter_modal.prev_focus(),
            KeyCode::Left if self.filter_modal.focus == FilterFocus::Column => {
                let len = self.filter_modal.available_columns.len().max(1);
                self.filter_modal.new_column_idx =
                    (self.filter_modal.new_column_idx + len - 1) % len;
            }
            KeyCode::Right if self.filter_modal.focus == FilterFocus::Column => {
                let len = self.filter_modal.available_columns.len().max(1);
                self.filter_modal.new_column_idx = (self.filter_modal.new_column_idx + 1) % len;
            }
            KeyCode::Down if self.filter_modal.focus == FilterFocus::Statements => {
                let len = self.filter_modal.statements.len();
                let next = match self.filter_modal.list_state.selected() {
                    Some(i) if i + 1 < len => i + 1,
                    _ => 0,
                };
                self.filter_modal.list_state.select(Some(next));
            }
            KeyCode::Up if self.filter_modal.focus == FilterFocus::Statements => {
                let len = self.filter_modal.statements.len();
                let prev = match self.filter_modal.list_state.selected() {
                    Some(0) | None => len.saturating_sub(1),
                    Some(i) => i - 1,
                };
                self.filter_modal.list_state.select(Some(prev));
            }
            KeyCode::Enter => match self.filter_modal.focus {
                FilterFocus::Add => self.filter_modal.add_statement(),
                FilterFocus::Confirm => {
                    self.input_mode = InputMode::Normal;
                    self.filter_modal.active = false;
                    return Some(AppEvent::Filter(self.filter_modal.to_spec()));
                }
                FilterFocus::Clear => self.filter_modal.clear(),
                FilterFocus::Statements => self.filter_modal.remove_selected(),
                _ => {}
            },
            KeyCode::Char(c) if self.filter_modal.focus == FilterFocus::Pattern => {
                self.filter_modal.new_pattern.push(c);
            }
            KeyCode::Backspace if self.filter_modal.focus == FilterFocus::Pattern => {
                self.filter_modal.new_pattern.pop();
            }
            _ => {}
        }
        None
    }

    fn browse_key(&mut self, event: &KeyEvent) -> Option<AppEvent> {
        let page_len = self
            .table
            .as_ref()
            .map(|t| self.view_state.visible(&t.records).rows.len())
            .unwrap_or(0);

        match event.code {
            KeyCode::Char('q') => return Some(AppEvent::Exit),
            KeyCode::Char('c') if event.modifiers.contains(KeyModifiers::CONTROL) => {
                return Some(AppEvent::Exit)
            }
            KeyCode::Char('/') => {
                self.input_mode = InputMode::Searching;
                self.input = self.view_state.search_term.clone();
            }
            KeyCode::Char('f') => {
                if let Some(table) = &self.table {
                    self.filter_modal.open(&table.columns);
                    self.input_mode = InputMode::Filtering;
                }
            }
            KeyCode::Char('b') => {
                self.screen = Screen::Saved;
                if !self.saved_store.list().is_empty() {
                    self.saved_state.select(Some(0));
                }
            }
            KeyCode::Tab => {
                if let Some(table) = &self.table {
                    self.column_cursor = (self.column_cursor + 1) % table.columns.len();
                }
            }
            KeyCode::BackTab => {
                if let Some(table) = &self.table {
                    let len = table.columns.len();
                    self.column_cursor = (self.column_cursor + len - 1) % len;
                }
            }
            KeyCode::Char('o') => {
                if let Some(table) = &self.table {
                    let key = table.columns[self.column_cursor].key.clone();
                    return Some(AppEvent::Sort(key));
                }
            }
            KeyCode::Left => {
                self.view_state.prev_page();
                self.table_state.select(Some(0));
            }
            KeyCode::Right => {
                if let Some(table) = &self.table {
                    self.view_state.next_page(&table.records);
                }
                self.table_state.select(Some(0));
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if page_len > 0 {
                    let next = match self.table_state.selected() {
                        Some(i) if i + 1 < page_len => i + 1,
                        _ => 0,
                    };
                    self.table_state.select(Some(next));
                }
            }
            KeyCode::Up | KeyCode::Char('k') => {
                if page_len > 0 {
                    let prev = match self.table_state.selected() {
                        Some(0) | None => page_len - 1,
                        Some(i) => i - 1,
                    };
                    self.table_state.select(Some(prev));
                }
            }
            KeyCode::Char('s') => {
                if let Some(record) = self.selected_record() {
                    return Some(AppEvent::ToggleSave(record.id));
                }
            }
            KeyCode::Enter => {
                if let Some(record) = self.selected_record() {
                    self.screen = Screen::Profile {
                        id: record.id,
                        from_saved: false,
                    };
                }
            }
            _ => {}
        }
        None
    }

    fn saved_key(&mut self, event: &KeyEvent) -> Option<AppEvent> {
        let visible_len = filter_saved(self.saved_store.list(), &self.saved_search).len();

        match event.code {
            KeyCode::Char('q') => return Some(AppEvent::Exit),
            KeyCode::Esc | KeyCode::Char('b') => {
                self.screen = Screen::Browse;
            }
            KeyCode::Char('/') => {
                self.input_mode = InputMode::Searching;
                self.input = self.saved_search.clone();
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if visible_len > 0 {
                    let next = match self.saved_state.selected() {
                        Some(i) if i + 1 < visible_len => i + 1,
                        _ => 0,
                    };
                    self.saved_state.select(Some(next));
                }
            }
            KeyCode::Up | KeyCode::Char('k') => {
                if visible_len > 0 {
                    let prev = match self.saved_state.selected() {
                        Some(0) | None => visible_len - 1,
                        Some(i) => i - 1,
                    };
                    self.saved_state.select(Some(prev));
                }
            }
            KeyCode::Char('d') => {
                if let Some(id) = self.selected_saved_id() {
                    return Some(AppEvent::RemoveSaved(id));
                }
            }
            KeyCode::Enter => {
                if let Some(id) = self.selected_saved_id() {
                    self.screen = Screen::Profile {
                        id,
                        from_saved: true,
                    };
                }
            }
            _ => {}
        }
        None
    }

    fn profile_key(&mut self, event: &KeyEvent, id: &str, from_saved: bool) -> Option<AppEvent> {
        match event.code {
            KeyCode::Char('q') => return Some(AppEvent::Exit),
            KeyCode::Esc | KeyCode::Backspace => {
                self.screen = if from_saved {
                    Screen::Saved
                } else {
                    Screen::Browse
                };
            }
            KeyCode::Char('s') => {
                if self.profile_record(id, from_saved).is_some() {
                    return Some(AppEvent::ToggleSave(id.to_string()));
                }
            }
            _ => {}
        }
        None
    }
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(height),
            Constraint::Fill(1),
        ])
        .split(area);
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(width),
            Constraint::Fill(1),
        ])
        .split(vertical[1]);
    horizontal[1]
}

impl App {
    fn render_browse(&mut self, area: Rect, buf: &mut Buffer) {
        let Some(table) = &self.table else {
            Paragraph::new("No data loaded. Start leadtui with a spreadsheet path.")
                .style(Style::default().fg(Color::DarkGray))
                .render(centered_rect(60, 1, area), buf);
            return;
        };

        let page = self.view_state.visible(&table.records);
        let saved_store = &self.saved_store;
        let widget = DataTable {
            columns: &table.columns,
            page: &page,
            sort: self.view_state.sort.as_ref(),
            column_cursor: self.column_cursor,
            current_page: self.view_state.page,
            page_size: self.view_state.page_size,
            row_numbers: self.row_numbers,
            is_saved: &|record: &Record| saved_store.is_saved(&record.id),
        };
        StatefulWidget::render(widget, area, buf, &mut self.table_state);
    }

    fn render_saved(&mut self, area: Rect, buf: &mut Buffer) {
        let visible = filter_saved(self.saved_store.list(), &self.saved_search);

        if visible.is_empty() {
            let message = if self.saved_search.is_empty() {
                "No saved profiles yet. Press s on a row to save it."
            } else {
                "No saved profiles match the search."
            };
            Paragraph::new(message)
                .style(Style::default().fg(Color::DarkGray))
                .render(centered_rect(60, 1, area), buf);
            return;
        }

        let items: Vec<ListItem> = visible
            .iter()
            .map(|entry| {
                let name = entry.profile.get("name");
                let name = if name.is_empty() { "Unnamed profile" } else { name };
                let line = Line::from(vec![
                    Span::styled(name.to_string(), Style::default().add_modifier(Modifier::BOLD)),
                    Span::raw(format!(
                        "  {}  {}",
                        entry.profile.get("position"),
                        entry.profile.get("companyname")
                    )),
                    Span::styled(
                        format!("  saved {}", entry.saved_at.format("%Y-%m-%d")),
                        Style::default().fg(Color::DarkGray),
                    ),
                ]);
                ListItem::new(line)
            })
            .collect();

        let list = List::new(items)
            .block(Block::default().borders(Borders::ALL).title("Saved Profiles"))
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
        // List and Table share selection semantics; reuse the table state's index.
        let mut list_state = ratatui::widgets::ListState::default()
            .with_selected(self.saved_state.selected());
        StatefulWidget::render(list, area, buf, &mut list_state);
    }

    fn render_profile(&self, area: Rect, buf: &mut Buffer, id: &str, from_saved: bool) {
        let Some(record) = self.profile_record(id, from_saved) else {
            let lines = vec![
                Line::from("Profile not found"),
                Line::from(""),
                Line::from(Span::styled(
                    "The record behind this profile is no longer available. Press Esc to go back.",
                    Style::default().fg(Color::DarkGray),
                )),
            ];
            Paragraph::new(lines)
                .block(Block::default().borders(Borders::ALL).title("Profile"))
                .render(centered_rect(70, 5, area), buf);
            return;
        };

        let mut lines = Vec::new();
        if let Some(table) = &self.table {
            for column in &table.columns {
                lines.push(Line::from(vec![
                    Span::styled(
                        format!("{}: ", column.label),
                        Style::default().fg(Color::Cyan),
                    ),
                    Span::raw(record.get(&column.key).to_string()),
                ]));
            }
        } else {
            // Snapshot-only view; no schema to order by, so sort the keys.
            let mut keys: Vec<&String> = record.fields.keys().collect();
            keys.sort();
            for key in keys {
                lines.push(Line::from(vec![
                    Span::styled(format!("{}: ", key), Style::default().fg(Color::Cyan)),
                    Span::raw(record.get(key).to_string()),
                ]));
            }
        }
        lines.push(Line::from(""));
        let saved = self.saved_store.is_saved(id);
        lines.push(Line::from(Span::styled(
            if saved { "★ Saved" } else { "Not saved" },
            Style::default().fg(if saved { Color::Yellow } else { Color::DarkGray }),
        )));

        Paragraph::new(lines)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!("Profile {}", id)),
            )
            .render(area, buf);
    }

    fn render_filter_panel(&mut self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title("Filters")
            .border_style(Style::default().fg(Color::Cyan));
        let inner = block.inner(area);
        Clear.render(area, buf);
        block.render(area, buf);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2), // column selector
                Constraint::Length(2), // pattern input
                Constraint::Length(1), // add button
                Constraint::Fill(1),   // active statements
                Constraint::Length(1), // confirm/clear
            ])
            .split(inner);

        let focus_style = |focused: bool| {
            if focused {
                Style::default().fg(Color::Black).bg(Color::Cyan)
            } else {
                Style::default()
            }
        };

        let column_label = self
            .filter_modal
            .available_columns
            .get(self.filter_modal.new_column_idx)
            .map(|c| c.label.as_str())
            .unwrap_or("");
        Paragraph::new(format!("Column: ◀ {} ▶", column_label))
            .style(focus_style(self.filter_modal.focus == FilterFocus::Column))
            .render(layout[0], buf);

        Paragraph::new(format!("Contains: {}", self.filter_modal.new_pattern))
            .style(focus_style(self.filter_modal.focus == FilterFocus::Pattern))
            .render(layout[1], buf);

        Paragraph::new("[ Add filter ]")
            .style(focus_style(self.filter_modal.focus == FilterFocus::Add))
            .render(layout[2], buf);

        let items: Vec<ListItem> = self
            .filter_modal
            .statements
            .iter()
            .map(|s| ListItem::new(format!("{} contains \"{}\"", s.label, s.pattern)))
            .collect();
        let list = List::new(items)
            .block(Block::default().borders(Borders::TOP).title("Active"))
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
        StatefulWidget::render(list, layout[3], buf, &mut self.filter_modal.list_state);

        let buttons = Line::from(vec![
            Span::styled(
                "[ Apply ]",
                focus_style(self.filter_modal.focus == FilterFocus::Confirm),
            ),
            Span::raw("  "),
            Span::styled(
                "[ Clear ]",
                focus_style(self.filter_modal.focus == FilterFocus::Clear),
            ),
        ]);
        Paragraph::new(buttons).render(layout[4], buf);
    }

    fn render_help(&self, area: Rect, buf: &mut Buffer) {
        let lines = vec![
            Line::from("Browse:   / search   f filters   Tab column   o sort"),
            Line::from("          ←/→ page   ↑/↓ row     s save       Enter profile"),
            Line::from("          b saved list           q quit"),
            Line::from("Saved:    / search   d remove    Enter profile   Esc back"),
            Line::from("Profile:  s save/unsave          Esc back"),
            Line::from(""),
            Line::from(Span::styled(
                "Press Esc to close this help",
                Style::default().fg(Color::DarkGray),
            )),
        ];
        let rect = centered_rect(64, lines.len() as u16 + 2, area);
        Clear.render(rect, buf);
        Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title("Help"))
            .render(rect, buf);
    }

    fn render_error(&self, area: Rect, buf: &mut Buffer) {
        let rect = centered_rect(60, 5, area);
        Clear.render(rect, buf);
        Paragraph::new(self.error_modal.message.clone())
            .wrap(ratatui::widgets::Wrap { trim: true })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("Error")
                    .border_style(Style::default().fg(Color::Red)),
            )
            .render(rect, buf);
    }

    fn controls(&self) -> Controls {
        let hints = match (&self.screen, &self.input_mode) {
            (_, InputMode::Searching) => vec![("Enter", "apply"), ("Esc", "cancel")],
            (_, InputMode::Filtering) => {
                vec![("Tab", "focus"), ("Enter", "select"), ("Esc", "close")]
            }
            (Screen::Browse, _) => vec![
                ("/", "search"),
                ("f", "filter"),
                ("o", "sort"),
                ("s", "save"),
                ("b", "saved"),
                ("?", "help"),
                ("q", "quit"),
            ],
            (Screen::Saved, _) => vec![
                ("/", "search"),
                ("d", "remove"),
                ("Enter", "profile"),
                ("Esc", "back"),
            ],
            (Screen::Profile { .. }, _) => vec![("s", "save"), ("Esc", "back")],
        };

        let controls = Controls::new(hints);
        match &self.table {
            Some(table) if self.screen == Screen::Browse => {
                controls.with_row_count(table.records.len())
            }
            _ => controls,
        }
    }
}

impl Widget for &mut App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let mut constraints = vec![Constraint::Fill(1)];
        if self.input_mode == InputMode::Searching {
            constraints.insert(1, Constraint::Length(3));
        }
        constraints.push(Constraint::Length(1)); // Controls
        if self.debug {
            constraints.push(Constraint::Length(1));
        }
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(area);

        let main_area = layout[0];
        let mut data_area = main_area;
        let mut panel_area = Rect::default();
        if self.filter_modal.active {
            let chunks = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Min(0), Constraint::Length(40)])
                .split(main_area);
            data_area = chunks[0];
            panel_area = chunks[1];
        }

        match self.screen.clone() {
            Screen::Browse => self.render_browse(data_area, buf),
            Screen::Saved => self.render_saved(data_area, buf),
            Screen::Profile { id, from_saved } => {
                self.render_profile(data_area, buf, &id, from_saved)
            }
        }

        if self.filter_modal.active {
            self.render_filter_panel(panel_area, buf);
        }

        if self.input_mode == InputMode::Searching {
            Paragraph::new(self.input.clone())
                .block(Block::default().borders(Borders::ALL).title("Search"))
                .render(layout[1], buf);
        }

        let controls_area = if self.debug {
            layout[layout.len() - 2]
        } else {
            layout[layout.len() - 1]
        };
        self.controls().render(controls_area, buf);

        if self.debug {
            Paragraph::new(format!(
                "events: {}  page: {}  sort: {:?}",
                self.num_events, self.view_state.page, self.view_state.sort
            ))
            .style(Style::default().fg(Color::DarkGray))
            .render(layout[layout.len() - 1], buf);
        }

        if self.show_help {
            self.render_help(area, buf);
        }
        if self.error_modal.active {
            self.render_error(area, buf);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::StorageManager;
    use chrono::Utc;
    use std::collections::HashMap;
    use std::sync::mpsc::channel;
    use tempfile::TempDir;

    fn entry(id: &str, name: &str, company: &str) -> SavedProfile {
        SavedProfile {
            id: id.to_string(),
            saved_at: Utc::now(),
            profile: Record {
                id: id.to_string(),
                fields: HashMap::from([
                    ("name".to_string(), name.to_string()),
                    ("companyname".to_string(), company.to_string()),
                ]),
            },
        }
    }

    fn app() -> (TempDir, App) {
        let dir = TempDir::new().unwrap();
        let storage = StorageManager::with_dir(dir.path().to_path_buf());
        let (tx, _rx) = channel::<AppEvent>();
        (dir, App::new(tx, &storage))
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_filter_saved_matches_any_field() {
        let entries = vec![entry("1", "Anna", "Acme"), entry("2", "Bob", "Beta")];
        let hits = filter_saved(&entries, "beta");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "2");
        assert_eq!(filter_saved(&entries, "").len(), 2);
    }

    #[test]
    fn test_import_error_shows_modal_instead_of_crashing() {
        let (_dir, mut app) = app();
        let event = AppEvent::Open(PathBuf::from("/nonexistent.csv"), OpenOptions::new());
        assert!(app.event(&event).is_none());
        assert!(app.error_modal.active);
        assert!(app.table.is_none());
    }

    #[test]
    fn test_profile_screen_for_unknown_id_reports_not_found() {
        let (_dir, app) = app();
        assert!(app.profile_record("42", false).is_none());
    }

    #[test]
    fn test_save_toggle_roundtrip_through_events() {
        let (_dir, mut app) = app();
        app.table = Some(
            LeadTable::from_rows(
                vec!["Name".into()],
                vec![vec!["Anna".into()], vec!["Bob".into()], vec!["Carl".into()]],
            )
            .unwrap(),
        );

        app.event(&AppEvent::ToggleSave("3".to_string()));
        assert!(app.saved_store().is_saved("3"));
        app.event(&AppEvent::ToggleSave("3".to_string()));
        assert!(!app.saved_store().is_saved("3"));
    }

    #[test]
    fn test_screen_navigation() {
        let (_dir, mut app) = app();
        app.key(&key(KeyCode::Char('b')));
        assert_eq!(app.screen, Screen::Saved);
        app.key(&key(KeyCode::Esc));
        assert_eq!(app.screen, Screen::Browse);
    }

    #[test]
    fn test_quit_key_emits_exit() {
        let (_dir, mut app) = app();
        assert!(matches!(
            app.key(&key(KeyCode::Char('q'))),
            Some(AppEvent::Exit)
        ));
    }
}
