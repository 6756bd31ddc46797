use crate::import::Record;
use std::collections::HashMap;

pub const DEFAULT_PAGE_SIZE: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn arrow(&self) -> &'static str {
        match self {
            SortDirection::Ascending => "▲",
            SortDirection::Descending => "▼",
        }
    }
}

/// The single active sort: a canonical column key and a direction.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SortSpec {
    pub key: String,
    pub direction: SortDirection,
}

/// Per-column substring patterns keyed by canonical field key. An empty
/// pattern places no constraint on its key; multiple entries compose with
/// logical AND.
pub type FilterSpec = HashMap<String, String>;

/// One recomputed page of the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisiblePage<'a> {
    pub rows: Vec<&'a Record>,
    pub total_count: usize,
    pub total_pages: usize,
}

/// Derive the visible page from the full record set. Pure: identical inputs
/// always produce identical output, and the pipeline order is fixed —
/// column filters, then free-text search, then a stable sort, then
/// pagination of the fully reduced sequence.
///
/// `page` is 1-based. The engine does not clamp: a page past the end yields
/// an empty `rows` with the correct totals, and callers are expected to
/// clamp before asking. An empty result set reports `total_pages` of 0.
pub fn compute_visible<'a>(
    records: &'a [Record],
    filters: &FilterSpec,
    search_term: &str,
    sort: Option<&SortSpec>,
    page: usize,
    page_size: usize,
) -> VisiblePage<'a> {
    let mut rows: Vec<&Record> = records
        .iter()
        .filter(|record| {
            filters.iter().all(|(key, pattern)| {
                pattern.is_empty() || contains_ci(record.get(key), pattern)
            })
        })
        .collect();

    if !search_term.is_empty() {
        rows.retain(|record| {
            record
                .fields
                .values()
                .any(|value| contains_ci(value, search_term))
        });
    }

    if let Some(sort) = sort {
        // sort_by is stable: ties keep their pre-sort relative order.
        rows.sort_by(|a, b| {
            let ordering = a.get(&sort.key).cmp(b.get(&sort.key));
            match sort.direction {
                SortDirection::Ascending => ordering,
                SortDirection::Descending => ordering.reverse(),
            }
        });
    }

    let total_count = rows.len();
    let total_pages = total_count.div_ceil(page_size);
    let start = page.saturating_sub(1) * page_size;
    let rows = if start < total_count {
        rows[start..(start + page_size).min(total_count)].to_vec()
    } else {
        Vec::new()
    };

    VisiblePage {
        rows,
        total_count,
        total_pages,
    }
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// The table's browsing state: filters, search term, sort and page. Every
/// mutation clamps the page so it never exceeds the total after the result
/// set shrinks.
#[derive(Debug, Clone)]
pub struct ViewState {
    pub filters: FilterSpec,
    pub search_term: String,
    pub sort: Option<SortSpec>,
    pub page: usize,
    pub page_size: usize,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            filters: FilterSpec::new(),
            search_term: String::new(),
            sort: None,
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl ViewState {
    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
            ..Self::default()
        }
    }

    /// Recompute the visible page for the current state.
    pub fn visible<'a>(&self, records: &'a [Record]) -> VisiblePage<'a> {
        compute_visible(
            records,
            &self.filters,
            &self.search_term,
            self.sort.as_ref(),
            self.page,
            self.page_size,
        )
    }

    /// Sorting the already-sorted key flips direction; a new key starts
    /// ascending.
    pub fn toggle_sort(&mut self, key: &str) {
        let direction = match &self.sort {
            Some(spec) if spec.key == key && spec.direction == SortDirection::Ascending => {
                SortDirection::Descending
            }
            _ => SortDirection::Ascending,
        };
        self.sort = Some(SortSpec {
            key: key.to_string(),
            direction,
        });
    }

    pub fn set_search(&mut self, term: String, records: &[Record]) {
        self.search_term = term;
        self.clamp_page(records);
    }

    pub fn set_filters(&mut self, filters: FilterSpec, records: &[Record]) {
        self.filters = filters;
        self.clamp_page(records);
    }

    pub fn next_page(&mut self, records: &[Record]) {
        let total = self.visible(records).total_pages;
        if self.page < total {
            self.page += 1;
        }
    }

    pub fn prev_page(&mut self) {
        if self.page > 1 {
            self.page -= 1;
        }
    }

    /// Pull the page back into range after the result set shrank. An empty
    /// result still displays as page 1.
    fn clamp_page(&mut self, records: &[Record]) {
        let total = self.visible(records).total_pages;
        self.page = self.page.min(total).max(1);
    }
}
