use serde::Serialize;

use crate::validation::Validator;

/// Paging and sorting options shared by the list endpoints. `sort` is only
/// ever spliced into SQL after it passes the per-endpoint safelist.
#[derive(Debug, Clone)]
pub struct Filters {
    pub page: i64,
    pub page_size: i64,
    pub sort: String,
    pub sort_safelist: &'static [&'static str],
}

impl Filters {
    pub fn limit(&self) -> i64 {
        self.page_size
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.page_size
    }

    /// Sort column with any leading `-` (descending marker) stripped.
    /// Falls back to `id` for anything outside the safelist.
    pub fn sort_column(&self) -> &str {
        if self.sort_safelist.contains(&self.sort.as_str()) {
            self.sort.trim_start_matches('-')
        } else {
            "id"
        }
    }

    pub fn sort_direction(&self) -> &'static str {
        if self.sort.starts_with('-') {
            "DESC"
        } else {
            "ASC"
        }
    }
}

pub fn validate_filters(v: &mut Validator, filters: &Filters) {
    v.check(filters.page > 0, "page", "must be greater than zero");
    v.check(filters.page <= 10_000_000, "page", "must be a maximum of 10 million");
    v.check(filters.page_size > 0, "page_size", "must be greater than zero");
    v.check(filters.page_size <= 100, "page_size", "must be a maximum of 100");
    v.check(
        filters.sort_safelist.contains(&filters.sort.as_str()),
        "sort",
        "invalid sort value",
    );
}

/// Pagination details included alongside list responses.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Metadata {
    pub current_page: i64,
    pub page_size: i64,
    pub first_page: i64,
    pub last_page: i64,
    pub total_records: i64,
}

pub fn calculate_metadata(total_records: i64, page: i64, page_size: i64) -> Metadata {
    if total_records == 0 {
        return Metadata::default();
    }

    Metadata {
        current_page: page,
        page_size,
        first_page: 1,
        last_page: (total_records + page_size - 1) / page_size,
        total_records,
    }
}
