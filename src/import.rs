use calamine::{open_workbook_auto, Data, Reader};
use color_eyre::eyre::eyre;
use color_eyre::Result;
use regex::Regex;
use std::collections::HashMap;
use std::path::Path;
use std::sync::LazyLock;

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Normalize a column header into its canonical field key: lowercase with
/// all whitespace removed. Headers that differ only by case or whitespace
/// collide to the same key.
pub fn normalize_key(header: &str) -> String {
    WHITESPACE.replace_all(&header.to_lowercase(), "").into_owned()
}

/// One imported row. Field values are keyed by canonical field key and are
/// always strings; typed cells are stringified at import time.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Record {
    pub id: String,
    pub fields: HashMap<String, String>,
}

impl Record {
    /// Field value at a canonical key, or an empty string if the key is not
    /// part of the schema.
    pub fn get(&self, key: &str) -> &str {
        self.fields.get(key).map(String::as_str).unwrap_or("")
    }
}

/// A table column: the original header label (shown to the user) and the
/// canonical key used for every programmatic lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub label: String,
    pub key: String,
}

/// Options controlling how a file is read.
#[derive(Debug, Default, Clone)]
pub struct OpenOptions {
    pub delimiter: Option<u8>,
}

impl OpenOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = Some(delimiter);
        self
    }
}

/// An imported spreadsheet: the ordered column schema (from the header row)
/// plus the records. Ids are assigned sequentially starting at "1".
#[derive(Debug, Clone, Default)]
pub struct LeadTable {
    pub columns: Vec<Column>,
    pub records: Vec<Record>,
}

impl LeadTable {
    /// Build a table from a header row and data rows. Fails on an empty
    /// header or zero data rows; nothing is partially imported.
    pub fn from_rows(headers: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self> {
        if headers.is_empty() {
            return Err(eyre!("No header row found in the file"));
        }
        if rows.is_empty() {
            return Err(eyre!("No data rows found in the file"));
        }

        let columns: Vec<Column> = headers
            .into_iter()
            .map(|label| Column {
                key: normalize_key(&label),
                label,
            })
            .collect();

        let records = rows
            .into_iter()
            .enumerate()
            .map(|(i, row)| {
                let mut fields = HashMap::with_capacity(columns.len());
                for (col_idx, column) in columns.iter().enumerate() {
                    let value = row.get(col_idx).cloned().unwrap_or_default();
                    fields.insert(column.key.clone(), value);
                }
                Record {
                    id: (i + 1).to_string(),
                    fields,
                }
            })
            .collect();

        Ok(Self { columns, records })
    }

    /// Load a table from a file, dispatching on extension: `.csv` goes
    /// through the csv reader, everything else through calamine.
    pub fn from_path(path: &Path, options: &OpenOptions) -> Result<Self> {
        let is_csv = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("csv"))
            .unwrap_or(false);

        if is_csv {
            Self::from_csv(path, options)
        } else {
            Self::from_workbook(path)
        }
    }

    fn from_csv(path: &Path, options: &OpenOptions) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(options.delimiter.unwrap_or(b','))
            .flexible(true)
            .from_path(path)?;

        let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        let mut rows = Vec::new();
        for result in reader.records() {
            let row = result?;
            rows.push(row.iter().map(str::to_string).collect());
        }

        Self::from_rows(headers, rows)
    }

    fn from_workbook(path: &Path) -> Result<Self> {
        let mut workbook = open_workbook_auto(path)?;
        let sheet_name = workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| eyre!("No worksheets found in {}", path.display()))?;
        let range = workbook.worksheet_range(&sheet_name)?;

        let mut iter = range.rows();
        let headers: Vec<String> = iter
            .next()
            .ok_or_else(|| eyre!("No header row found in {}", path.display()))?
            .iter()
            .map(cell_to_string)
            .collect();
        let rows: Vec<Vec<String>> = iter
            .map(|row| row.iter().map(cell_to_string).collect())
            .collect();

        Self::from_rows(headers, rows)
    }

    /// Display labels for the schema, in declared order.
    pub fn column_labels(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.label.clone()).collect()
    }

    /// Look up a record by id.
    pub fn record(&self, id: &str) -> Option<&Record> {
        self.records.iter().find(|r| r.id == id)
    }
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        other => other.to_string(),
    }
}
