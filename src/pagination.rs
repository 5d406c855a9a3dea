use serde::{Serialize, Serializer};

use crate::filtering::{Criteria, OrderBy};

/// Number of pages needed for `total` rows at `per_page` rows per page.
///
/// # Panics
///
/// Panics when `per_page <= 0`: asking for a last page without a page size
/// is a caller bug, not a recoverable condition.
#[must_use]
pub fn compute_last_page(total: u64, per_page: i64) -> u64 {
    assert!(
        per_page > 0,
        "last page requested without a positive page size (per_page = {per_page})"
    );
    if total == 0 {
        return 0;
    }
    total.div_ceil(per_page.unsigned_abs())
}

fn encode(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

/// What navigation URLs carry besides the page numbers.
///
/// Only lives for the duration of [`PageResult::new`]: criteria and ordering
/// are never stored on the result.
#[derive(Debug, Clone, Copy)]
pub struct PageLinks<'a> {
    criteria: &'a Criteria,
    order_by: &'a OrderBy,
    reserved_fields: &'a [String],
}

impl<'a> PageLinks<'a> {
    #[must_use]
    pub const fn new(criteria: &'a Criteria, order_by: &'a OrderBy) -> Self {
        Self {
            criteria,
            order_by,
            reserved_fields: &[],
        }
    }

    /// Fields (tenant or identity keys) that must never appear in a URL.
    #[must_use]
    pub const fn reserving(mut self, reserved_fields: &'a [String]) -> Self {
        self.reserved_fields = reserved_fields;
        self
    }

    fn is_reserved(&self, field: &str) -> bool {
        self.reserved_fields.iter().any(|r| r == field)
    }

    /// `?page=<n>&per_page=<n>[&sort=<f>&order=<dir>]*[&search=<v>&search_field=<f>]*`
    #[must_use]
    pub fn mount_url(&self, page: u64, per_page: i64) -> String {
        let mut url = format!("?page={page}&per_page={per_page}");

        for (field, direction) in self.order_by.iter() {
            if self.is_reserved(field) {
                continue;
            }
            url.push_str(&format!("&sort={}&order={direction}", encode(field)));
        }

        for (field, criterion) in self.criteria.iter() {
            if self.is_reserved(field) {
                continue;
            }
            url.push_str(&format!(
                "&search={}&search_field={}",
                encode(&criterion.url_value()),
                encode(field)
            ));
        }

        url
    }
}

fn serialize_total<S: Serializer>(total: &Option<u64>, serializer: S) -> Result<S::Ok, S::Error> {
    match total {
        Some(total) => serializer.serialize_u64(*total),
        None => serializer.serialize_i64(-1),
    }
}

/// One page of results plus everything a client needs to keep paging.
///
/// Serializes as:
/// ```json
/// {"total": 23, "last_page": 5, "per_page": 5, "current_page": 2,
///  "next_page_url": "?page=3&per_page=5", "prev_page_url": "?page=1&per_page=5",
///  "data": [...]}
/// ```
/// An unknown total (pagination disabled) serializes as `-1`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageResult<T> {
    #[serde(serialize_with = "serialize_total")]
    total: Option<u64>,
    last_page: Option<u64>,
    per_page: i64,
    current_page: u64,
    next_page_url: String,
    prev_page_url: String,
    data: Vec<T>,
}

impl<T> PageResult<T> {
    /// Derive last page and both navigation URLs. The next/prev page numbers
    /// are clamped to `[1, last_page]`; with an unknown total only the lower
    /// bound applies.
    #[must_use]
    pub fn new(
        data: Vec<T>,
        current_page: u64,
        per_page: i64,
        total: Option<u64>,
        links: &PageLinks<'_>,
    ) -> Self {
        let last_page = match total {
            Some(total) if per_page > 0 => Some(compute_last_page(total, per_page)),
            _ => None,
        };

        let clamp = |page: u64| {
            let page = page.max(1);
            last_page.map_or(page, |last| page.min(last.max(1)))
        };
        let next_page_url = links.mount_url(clamp(current_page.saturating_add(1)), per_page);
        let prev_page_url = links.mount_url(clamp(current_page.saturating_sub(1)), per_page);

        Self {
            total,
            last_page,
            per_page,
            current_page,
            next_page_url,
            prev_page_url,
            data,
        }
    }

    /// `None` when pagination was disabled and no count was taken.
    #[must_use]
    pub const fn total(&self) -> Option<u64> {
        self.total
    }

    #[must_use]
    pub const fn last_page(&self) -> Option<u64> {
        self.last_page
    }

    #[must_use]
    pub const fn per_page(&self) -> i64 {
        self.per_page
    }

    #[must_use]
    pub const fn current_page(&self) -> u64 {
        self.current_page
    }

    #[must_use]
    pub fn next_page_url(&self) -> &str {
        &self.next_page_url
    }

    #[must_use]
    pub fn prev_page_url(&self) -> &str {
        &self.prev_page_url
    }

    #[must_use]
    pub fn data(&self) -> &[T] {
        &self.data
    }

    #[must_use]
    pub fn into_data(self) -> Vec<T> {
        self.data
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Convert every item, keeping the metadata.
    #[must_use]
    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> PageResult<U> {
        PageResult {
            total: self.total,
            last_page: self.last_page,
            per_page: self.per_page,
            current_page: self.current_page,
            next_page_url: self.next_page_url,
            prev_page_url: self.prev_page_url,
            data: self.data.into_iter().map(f).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filtering::{Criterion, SortDirection};
    use serde_json::json;

    fn page(current: u64, per_page: i64, total: Option<u64>) -> PageResult<u32> {
        let criteria = Criteria::new();
        let order_by = OrderBy::new();
        PageResult::new(vec![], current, per_page, total, &PageLinks::new(&criteria, &order_by))
    }

    #[test]
    fn test_last_page_is_ceiling() {
        for per_page in 1..=12_i64 {
            for total in 0..=100_u64 {
                let last = compute_last_page(total, per_page);
                let expected = total.div_ceil(per_page.unsigned_abs());
                assert_eq!(last, expected, "total={total} per_page={per_page}");
                assert_eq!(last == 0, total == 0);
            }
        }
    }

    #[test]
    #[should_panic(expected = "positive page size")]
    fn test_last_page_without_page_size_panics() {
        let _ = compute_last_page(10, 0);
    }

    #[test]
    #[should_panic(expected = "positive page size")]
    fn test_last_page_with_negative_page_size_panics() {
        let _ = compute_last_page(10, -1);
    }

    #[test]
    fn test_metadata_for_known_total() {
        let result = page(2, 5, Some(23));
        assert_eq!(result.last_page(), Some(5));
        assert_eq!(result.next_page_url(), "?page=3&per_page=5");
        assert_eq!(result.prev_page_url(), "?page=1&per_page=5");
    }

    #[test]
    fn test_zero_total() {
        let result = page(1, 10, Some(0));
        assert_eq!(result.last_page(), Some(0));
        assert_eq!(result.next_page_url(), "?page=1&per_page=10");
        assert_eq!(result.prev_page_url(), "?page=1&per_page=10");
    }

    #[test]
    fn test_navigation_is_clamped_to_last_page() {
        let result = page(5, 5, Some(23));
        assert_eq!(result.next_page_url(), "?page=5&per_page=5");
        assert_eq!(result.prev_page_url(), "?page=4&per_page=5");
    }

    #[test]
    fn test_unknown_total_has_no_last_page() {
        let result = page(1, 0, None);
        assert_eq!(result.total(), None);
        assert_eq!(result.last_page(), None);
        assert_eq!(result.next_page_url(), "?page=2&per_page=0");
        assert_eq!(result.prev_page_url(), "?page=1&per_page=0");
    }

    #[test]
    fn test_url_carries_ordering_then_criteria() {
        let criteria = Criteria::new()
            .with("status", Criterion::equals("active"))
            .with("name", Criterion::prefix("jo"));
        let order_by = OrderBy::new().then("name", SortDirection::Asc);
        let links = PageLinks::new(&criteria, &order_by);

        assert_eq!(
            links.mount_url(2, 10),
            "?page=2&per_page=10&sort=name&order=ASC&search=active&search_field=status&search=jo&search_field=name"
        );
    }

    #[test]
    fn test_reserved_fields_never_leak() {
        let criteria = Criteria::new()
            .with("company_id", Criterion::equals(7))
            .with("status", Criterion::equals("active"));
        let order_by = OrderBy::new()
            .then("company_id", SortDirection::Asc)
            .then("name", SortDirection::Desc);
        let reserved = vec!["company_id".to_string()];
        let links = PageLinks::new(&criteria, &order_by).reserving(&reserved);

        let url = links.mount_url(1, 10);
        assert!(!url.contains("company_id"), "got: {url}");
        assert_eq!(
            url,
            "?page=1&per_page=10&sort=name&order=DESC&search=active&search_field=status"
        );
    }

    #[test]
    fn test_url_values_are_encoded() {
        let criteria = Criteria::new().with("name", Criterion::prefix("a&b c"));
        let order_by = OrderBy::new();
        let url = PageLinks::new(&criteria, &order_by).mount_url(1, 10);
        assert_eq!(url, "?page=1&per_page=10&search=a%26b+c&search_field=name");
    }

    #[test]
    fn test_serialization_shape() {
        let criteria = Criteria::new();
        let order_by = OrderBy::new();
        let links = PageLinks::new(&criteria, &order_by);
        let result = PageResult::new(vec!["a", "b"], 1, 0, None, &links);

        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(
            value,
            json!({
                "total": -1,
                "last_page": null,
                "per_page": 0,
                "current_page": 1,
                "next_page_url": "?page=2&per_page=0",
                "prev_page_url": "?page=1&per_page=0",
                "data": ["a", "b"]
            })
        );
    }

    #[test]
    fn test_map_keeps_metadata() {
        let result = page(2, 5, Some(23)).map(|n| n.to_string());
        assert_eq!(result.total(), Some(23));
        assert_eq!(result.last_page(), Some(5));
        assert!(result.is_empty());
    }
}
