//! Client-side list queries: search, equality filters, sorting and pagination
//!
//! [`query_list`] is a pure function of its inputs. Every call filters the full
//! record slice from scratch; nothing is cached between calls, so identical
//! inputs always produce identical pages.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::str::FromStr;

use crate::core::entity::{BloodGroup, DonationStatus};
use crate::core::store::Queryable;

/// Page size used when none is configured
pub const DEFAULT_PAGE_SIZE: usize = 12;

/// Sort orders supported by the list views
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortKey {
    /// Latest date first
    Newest,
    /// Earliest date first
    Oldest,
    /// Blood group, lexicographic ascending
    BloodGroup,
    /// District, lexicographic ascending
    District,
    /// Keep input order
    #[default]
    #[serde(other)]
    Unsorted,
}

impl SortKey {
    /// Parse a sort key; anything unrecognized keeps input order
    pub fn parse(s: &str) -> Self {
        match s.trim() {
            "newest" | "date:desc" => SortKey::Newest,
            "oldest" | "date:asc" => SortKey::Oldest,
            "bloodGroup" | "blood_group" => SortKey::BloodGroup,
            "district" => SortKey::District,
            _ => SortKey::Unsorted,
        }
    }

    fn compare<T: Queryable>(&self, a: &T, b: &T) -> Ordering {
        match self {
            SortKey::Newest => b.sort_date().cmp(&a.sort_date()),
            SortKey::Oldest => a.sort_date().cmp(&b.sort_date()),
            SortKey::BloodGroup => a.blood_group_key().cmp(&b.blood_group_key()),
            SortKey::District => a.district_key().cmp(&b.district_key()),
            SortKey::Unsorted => Ordering::Equal,
        }
    }
}

impl From<&str> for SortKey {
    fn from(s: &str) -> Self {
        SortKey::parse(s)
    }
}

/// Explicit inputs of one list query
///
/// # Example
/// ```rust,ignore
/// let query = ListQuery::new()
///     .search("ali")
///     .filter("blood_group", "A+")
///     .sort(SortKey::Newest)
///     .page(2);
/// let page = query_list(&requests, &query);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListQuery {
    /// Case-insensitive substring matched against the record's search field
    pub search_term: String,

    /// Field name to required value; empty values are ignored
    pub field_filters: IndexMap<String, String>,

    /// Sort order
    pub sort_key: SortKey,

    /// Page number (starts at 1)
    pub page: usize,

    /// Number of items per page
    pub page_size: usize,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            search_term: String::new(),
            field_filters: IndexMap::new(),
            sort_key: SortKey::Unsorted,
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl ListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search_term = term.into();
        self
    }

    pub fn filter(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.field_filters.insert(field.into(), value.into());
        self
    }

    pub fn sort(mut self, key: SortKey) -> Self {
        self.sort_key = key;
        self
    }

    pub fn page(mut self, page: usize) -> Self {
        self.page = page;
        self
    }

    pub fn page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Page number, ensuring minimum of 1
    pub fn effective_page(&self) -> usize {
        self.page.max(1)
    }

    /// Page size, ensuring minimum of 1
    pub fn effective_page_size(&self) -> usize {
        self.page_size.max(1)
    }

    fn matches<T: Queryable>(&self, record: &T, needle: Option<&str>) -> bool {
        if let Some(needle) = needle
            && !record.search_text().to_lowercase().contains(needle)
        {
            return false;
        }

        self.field_filters
            .iter()
            .filter(|(_, expected)| !expected.is_empty())
            .all(|(field, expected)| match record.field(field) {
                Some(actual) => actual == expected.as_str(),
                None => true,
            })
    }
}

/// One page of query results
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    /// Records on the requested page
    pub items: Vec<T>,

    /// Number of pages (at least 1)
    pub total_pages: usize,

    /// Number of records matching the filters
    pub total: usize,

    /// Requested page number
    pub page: usize,
}

impl<T> Page<T> {
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    /// Whether the requested page lies past the last page
    pub fn is_out_of_range(&self) -> bool {
        self.page > self.total_pages
    }
}

/// Number of pages needed for `total` records, never less than 1
pub fn total_pages(total: usize, page_size: usize) -> usize {
    total.div_ceil(page_size.max(1)).max(1)
}

/// Filter, sort and paginate `records`
///
/// Pages past the end are not clamped: they come back with no items, and the
/// caller decides whether to jump back to page 1.
pub fn query_list<T: Queryable + Clone>(records: &[T], query: &ListQuery) -> Page<T> {
    let needle = query.search_term.trim().to_lowercase();
    let needle = (!needle.is_empty()).then_some(needle);

    let mut matched: Vec<&T> = records
        .iter()
        .filter(|r| query.matches(*r, needle.as_deref()))
        .collect();

    if query.sort_key != SortKey::Unsorted {
        matched.sort_by(|a, b| query.sort_key.compare(*a, *b));
    }

    let page = query.effective_page();
    let page_size = query.effective_page_size();
    let total = matched.len();
    let start = (page - 1).saturating_mul(page_size);

    let items: Vec<T> = matched
        .into_iter()
        .skip(start)
        .take(page_size)
        .cloned()
        .collect();

    tracing::debug!(
        total,
        page,
        page_size,
        returned = items.len(),
        "list query evaluated"
    );

    Page {
        items,
        total_pages: total_pages(total, page_size),
        total,
        page,
    }
}

/// Transient filter state of a list view
///
/// Any change to a filter, the search term or the sort key moves the view
/// back to page 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryState {
    pub search_term: String,
    pub blood_group_filter: String,
    pub district_filter: String,
    pub status_filter: String,
    pub sort_key: SortKey,
    pub current_page: usize,
    pub page_size: usize,
}

impl Default for QueryState {
    fn default() -> Self {
        Self {
            search_term: String::new(),
            blood_group_filter: String::new(),
            district_filter: String::new(),
            status_filter: String::new(),
            sort_key: SortKey::Unsorted,
            current_page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl QueryState {
    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            page_size,
            ..Self::default()
        }
    }

    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.search_term = term.into();
        self.current_page = 1;
    }

    /// Blood groups are stored in their canonical form, so `"a+"` filters as `"A+"`
    pub fn set_blood_group(&mut self, blood_group: impl Into<String>) {
        self.blood_group_filter = canonical::<BloodGroup>(blood_group.into(), BloodGroup::as_str);
        self.current_page = 1;
    }

    pub fn set_district(&mut self, district: impl Into<String>) {
        self.district_filter = district.into();
        self.current_page = 1;
    }

    /// Accepts any spelling `DonationStatus` parses, e.g. `"Pending"` or `"in-progress"`
    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status_filter = canonical::<DonationStatus>(status.into(), DonationStatus::as_str);
        self.current_page = 1;
    }

    pub fn set_sort_key(&mut self, key: SortKey) {
        self.sort_key = key;
        self.current_page = 1;
    }

    pub fn set_page(&mut self, page: usize) {
        self.current_page = page.max(1);
    }

    /// Clear every filter and return to page 1
    pub fn reset(&mut self) {
        *self = Self::with_page_size(self.page_size);
    }

    /// Build the engine inputs for the current state
    pub fn to_query(&self) -> ListQuery {
        ListQuery::new()
            .search(self.search_term.clone())
            .filter("blood_group", self.blood_group_filter.clone())
            .filter("district", self.district_filter.clone())
            .filter("status", self.status_filter.clone())
            .sort(self.sort_key)
            .page(self.current_page)
            .page_size(self.page_size)
    }

    /// Run the query, jumping back to page 1 if the current page no longer exists
    pub fn apply<T: Queryable + Clone>(&mut self, records: &[T]) -> Page<T> {
        let page = query_list(records, &self.to_query());
        if page.is_out_of_range() {
            self.current_page = 1;
            return query_list(records, &self.to_query());
        }
        page
    }
}

/// Wire form of a recognized value; anything else is kept as given
fn canonical<T: FromStr>(value: String, as_str: fn(&T) -> &'static str) -> String {
    match value.parse::<T>() {
        Ok(parsed) => as_str(&parsed).to_string(),
        Err(_) => value,
    }
}
