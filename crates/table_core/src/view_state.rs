//! Filter, column-visibility, selection, pagination, and user-driven sort
//! state, independent of the dataset's contents.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use shared::{domain::SubscriptionId, protocol::SubscriptionRecord};

use crate::config::Settings;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Column {
    Title,
    Email,
    Price,
    RenewsAt,
    Checked,
}

impl Column {
    pub const ALL: [Column; 5] = [
        Column::Title,
        Column::Email,
        Column::Price,
        Column::RenewsAt,
        Column::Checked,
    ];
}

/// Column metadata for the rendering collaborator.
#[derive(Debug, Clone, Copy)]
pub struct ColumnSpec {
    pub column: Column,
    pub label: &'static str,
    pub hideable: bool,
}

pub fn column_specs() -> [ColumnSpec; 5] {
    [
        ColumnSpec {
            column: Column::Title,
            label: "Title",
            hideable: false,
        },
        ColumnSpec {
            column: Column::Email,
            label: "Email",
            hideable: true,
        },
        ColumnSpec {
            column: Column::Price,
            label: "Price",
            hideable: true,
        },
        ColumnSpec {
            column: Column::RenewsAt,
            label: "Renews at",
            hideable: true,
        },
        ColumnSpec {
            column: Column::Checked,
            label: "Status",
            hideable: true,
        },
    ]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// One page of rows derived from the current dataset and view state.
#[derive(Debug, Clone)]
pub struct PageView {
    pub rows: Vec<SubscriptionRecord>,
    pub page_index: usize,
    pub page_count: usize,
    pub filtered_count: usize,
}

#[derive(Debug, Clone)]
pub struct ViewState {
    filter: String,
    case_insensitive: bool,
    visibility: HashMap<Column, bool>,
    selected: HashSet<SubscriptionId>,
    page_index: usize,
    page_size: usize,
    sort: Option<(Column, SortDirection)>,
}

impl ViewState {
    pub fn new(settings: &Settings) -> Self {
        Self {
            filter: String::new(),
            case_insensitive: settings.case_insensitive_filter,
            visibility: HashMap::new(),
            selected: HashSet::new(),
            page_index: 0,
            page_size: settings.page_size.max(1),
            sort: None,
        }
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    pub fn set_filter(&mut self, text: impl Into<String>) {
        self.filter = text.into();
    }

    /// Unspecified columns default to visible.
    pub fn is_column_visible(&self, column: Column) -> bool {
        self.visibility.get(&column).copied().unwrap_or(true)
    }

    pub fn set_column_visible(&mut self, column: Column, visible: bool) {
        self.visibility.insert(column, visible);
    }

    pub fn visible_columns(&self) -> Vec<Column> {
        Column::ALL
            .into_iter()
            .filter(|column| self.is_column_visible(*column))
            .collect()
    }

    pub fn is_selected(&self, id: SubscriptionId) -> bool {
        self.selected.contains(&id)
    }

    pub fn toggle_selected(&mut self, id: SubscriptionId) {
        if !self.selected.insert(id) {
            self.selected.remove(&id);
        }
    }

    /// Selection ids that no longer match a dataset row stay in the set and
    /// are simply never rendered; replacing the dataset never clears them.
    pub fn selected_ids(&self) -> &HashSet<SubscriptionId> {
        &self.selected
    }

    pub fn page_index(&self) -> usize {
        self.page_index
    }

    pub fn set_page_index(&mut self, page_index: usize) {
        self.page_index = page_index;
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn set_page_size(&mut self, page_size: usize) {
        self.page_size = page_size.max(1);
    }

    pub fn sort(&self) -> Option<(Column, SortDirection)> {
        self.sort
    }

    /// Header-click cycle: ascending, then descending, then back to the
    /// source order. Clicking a different column starts it ascending.
    pub fn toggle_sort(&mut self, column: Column) {
        self.sort = match self.sort {
            Some((current, SortDirection::Ascending)) if current == column => {
                Some((column, SortDirection::Descending))
            }
            Some((current, SortDirection::Descending)) if current == column => None,
            _ => Some((column, SortDirection::Ascending)),
        };
    }

    /// Derives the visible page: filter on title, apply the user sort
    /// inside the fixed checked-first partition, clamp the page index to
    /// the filtered row count, and slice.
    ///
    /// `records` is expected in normalizer order. The user sort compares
    /// `checked` first, so it can reorder rows only within a partition and
    /// never lift an unchecked row above a checked one.
    pub fn visible_page(&self, records: &[SubscriptionRecord]) -> PageView {
        let needle = if self.case_insensitive {
            self.filter.to_lowercase()
        } else {
            self.filter.clone()
        };
        let mut rows: Vec<SubscriptionRecord> = records
            .iter()
            .filter(|record| self.title_matches(record, &needle))
            .cloned()
            .collect();

        if let Some((column, direction)) = self.sort {
            rows.sort_by(|a, b| {
                b.checked.cmp(&a.checked).then_with(|| {
                    let by_column = compare_by_column(a, b, column);
                    match direction {
                        SortDirection::Ascending => by_column,
                        SortDirection::Descending => by_column.reverse(),
                    }
                })
            });
        }

        let filtered_count = rows.len();
        let page_size = self.page_size.max(1);
        let page_count = filtered_count.div_ceil(page_size);
        let page_index = if page_count == 0 {
            0
        } else {
            self.page_index.min(page_count - 1)
        };
        let rows = rows
            .into_iter()
            .skip(page_index * page_size)
            .take(page_size)
            .collect();

        PageView {
            rows,
            page_index,
            page_count,
            filtered_count,
        }
    }

    fn title_matches(&self, record: &SubscriptionRecord, needle: &str) -> bool {
        if needle.is_empty() {
            return true;
        }
        if self.case_insensitive {
            record.title.to_lowercase().contains(needle)
        } else {
            record.title.contains(needle)
        }
    }
}

fn compare_by_column(a: &SubscriptionRecord, b: &SubscriptionRecord, column: Column) -> Ordering {
    match column {
        Column::Title => a.title.cmp(&b.title),
        Column::Email => a.email.cmp(&b.email),
        Column::Price => a.price_cents.cmp(&b.price_cents),
        Column::RenewsAt => a.renews_at.cmp(&b.renews_at),
        // The partition already orders by `checked`; inside a partition the
        // key is constant, so the stable sort keeps source order.
        Column::Checked => Ordering::Equal,
    }
}
