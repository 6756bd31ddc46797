use crate::import::Column;
use crate::view::FilterSpec;
use ratatui::widgets::ListState;

/// One per-column filter: a case-insensitive substring pattern on a single
/// column. All statements combine with logical AND.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct FilterStatement {
    pub label: String,
    pub key: String,
    pub pattern: String,
}

#[derive(Debug, Default, PartialEq, Eq, Clone, Copy)]
pub enum FilterFocus {
    #[default]
    Column,
    Pattern,
    Add,
    Statements,
    Confirm,
    Clear,
}

#[derive(Default)]
pub struct FilterModal {
    pub active: bool,
    pub statements: Vec<FilterStatement>,
    pub available_columns: Vec<Column>,

    pub new_column_idx: usize,
    pub new_pattern: String,

    pub focus: FilterFocus,
    pub list_state: ListState,
}

impl FilterModal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&mut self, columns: &[Column]) {
        self.active = true;
        self.available_columns = columns.to_vec();
        self.new_column_idx = self.new_column_idx.min(columns.len().saturating_sub(1));
        self.focus = FilterFocus::Column;
    }

    pub fn add_statement(&mut self) {
        if self.available_columns.is_empty() || self.new_pattern.is_empty() {
            return;
        }
        let column = &self.available_columns[self.new_column_idx];

        // One pattern per column; adding again replaces the old statement.
        self.statements.retain(|s| s.key != column.key);
        self.statements.push(FilterStatement {
            label: column.label.clone(),
            key: column.key.clone(),
            pattern: self.new_pattern.clone(),
        });

        self.new_pattern.clear();
        self.focus = FilterFocus::Column;
    }

    pub fn remove_selected(&mut self) {
        if let Some(idx) = self.list_state.selected() {
            if idx < self.statements.len() {
                self.statements.remove(idx);
                if self.statements.is_empty() {
                    self.list_state.select(None);
                    self.focus = FilterFocus::Column;
                } else if idx >= self.statements.len() {
                    self.list_state.select(Some(self.statements.len() - 1));
                }
            }
        }
    }

    pub fn clear(&mut self) {
        self.statements.clear();
        self.list_state.select(None);
    }

    /// The active statements as the view engine's filter map.
    pub fn to_spec(&self) -> FilterSpec {
        self.statements
            .iter()
            .map(|s| (s.key.clone(), s.pattern.clone()))
            .collect()
    }

    pub fn next_focus(&mut self) {
        self.focus = match self.focus {
            FilterFocus::Column => FilterFocus::Pattern,
            FilterFocus::Pattern => FilterFocus::Add,
            FilterFocus::Add => {
                if !self.statements.is_empty() {
                    FilterFocus::Statements
                } else {
                    FilterFocus::Confirm
                }
            }
            FilterFocus::Statements => FilterFocus::Confirm,
            FilterFocus::Confirm => FilterFocus::Clear,
            FilterFocus::Clear => FilterFocus::Column,
        };
    }

    pub fn prev_focus(&mut self) {
        self.focus = match self.focus {
            FilterFocus::Column => FilterFocus::Clear,
            FilterFocus::Pattern => FilterFocus::Column,
            FilterFocus::Add => FilterFocus::Pattern,
            FilterFocus::Statements => FilterFocus::Add,
            FilterFocus::Confirm => {
                if !self.statements.is_empty() {
                    FilterFocus::Statements
                } else {
                    FilterFocus::Add
                }
            }
            FilterFocus::Clear => FilterFocus::Confirm,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns() -> Vec<Column> {
        vec![
            Column {
                label: "Name".to_string(),
                key: "name".to_string(),
            },
            Column {
                label: "Company Name".to_string(),
                key: "companyname".to_string(),
            },
        ]
    }

    #[test]
    fn test_filter_modal_new() {
        let modal = FilterModal::new();
        assert!(!modal.active);
        assert!(modal.statements.is_empty());
        assert!(modal.available_columns.is_empty());
        assert_eq!(modal.focus, FilterFocus::Column);
    }

    #[test]
    fn test_add_statement_uses_canonical_key() {
        let mut modal = FilterModal::new();
        modal.open(&columns());
        modal.new_column_idx = 1;
        modal.new_pattern = "acme".to_string();
        modal.add_statement();

        assert_eq!(modal.statements.len(), 1);
        let statement = &modal.statements[0];
        assert_eq!(statement.label, "Company Name");
        assert_eq!(statement.key, "companyname");
        assert_eq!(statement.pattern, "acme");
        assert_eq!(modal.new_pattern, "");
        assert_eq!(modal.focus, FilterFocus::Column);
    }

    #[test]
    fn test_adding_same_column_replaces_pattern() {
        let mut modal = FilterModal::new();
        modal.open(&columns());
        modal.new_pattern = "an".to_string();
        modal.add_statement();
        modal.new_pattern = "bo".to_string();
        modal.add_statement();

        assert_eq!(modal.statements.len(), 1);
        assert_eq!(modal.statements[0].pattern, "bo");
    }

    #[test]
    fn test_add_statement_without_pattern_is_a_noop() {
        let mut modal = FilterModal::new();
        modal.open(&columns());
        modal.add_statement();
        assert!(modal.statements.is_empty());
    }

    #[test]
    fn test_to_spec() {
        let mut modal = FilterModal::new();
        modal.open(&columns());
        modal.new_pattern = "an".to_string();
        modal.add_statement();

        let spec = modal.to_spec();
        assert_eq!(spec.get("name").map(String::as_str), Some("an"));
    }
}
