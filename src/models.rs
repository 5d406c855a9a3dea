use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use utoipa::{IntoParams, ToSchema};

use crate::filtering::{Criteria, Criterion, OrderBy, SortDirection, sort::DEFAULT_ORDER};

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_PER_PAGE: i64 = 20;

/// Placeholder some clients send for every missing field.
const UNDEFINED_MARKER: &str = "undefined";

/// How the store shapes fetched rows. Opaque to the pagination core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ResultMode {
    /// Hydrate entity models
    #[default]
    Model,
    /// Plain JSON objects, one per row
    Json,
}

impl ResultMode {
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "model" | "object" | "1" => Some(Self::Model),
            "json" | "array" | "2" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Normalized request: page, page size, criteria, ordering and result mode.
///
/// Built once per request, either programmatically through the `with_*`
/// methods or from untyped input through [`QuerySpec::from_map`],
/// [`QuerySpec::from_pairs`] and [`QuerySpec::from_query_string`]. Parsing is
/// permissive: unknown keys, `"undefined"` placeholders and unparseable
/// numbers are ignored.
#[derive(Debug, Clone, PartialEq)]
pub struct QuerySpec {
    page: u64,
    per_page: i64,
    criteria: Criteria,
    sort: String,
    order: String,
    search: Vec<String>,
    search_field: Vec<String>,
    result_mode: ResultMode,
}

impl Default for QuerySpec {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            per_page: DEFAULT_PER_PAGE,
            criteria: Criteria::new(),
            sort: String::new(),
            order: DEFAULT_ORDER.to_string(),
            search: Vec::new(),
            search_field: Vec::new(),
            result_mode: ResultMode::default(),
        }
    }
}

type Coercion = fn(&mut QuerySpec, JsonValue);

/// Recognized input keys and how each raw value is coerced.
const FIELD_COERCIONS: &[(&str, Coercion)] = &[
    ("page", coerce_page),
    ("per_page", coerce_per_page),
    ("criteria", coerce_criteria),
    ("sort", coerce_sort),
    ("order", coerce_order),
    ("search", coerce_search),
    ("search_field", coerce_search_field),
    ("result_mode", coerce_result_mode),
    ("hydrate_mode", coerce_result_mode),
];

fn as_integer(key: &str, value: &JsonValue) -> Option<i64> {
    let parsed = match value {
        JsonValue::Number(n) => n.as_i64(),
        JsonValue::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    if parsed.is_none() {
        tracing::debug!(key, value = %value, "Ignoring non-integer value");
    }
    parsed
}

fn as_text(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::String(s) => Some(s.trim().to_string()),
        JsonValue::Number(n) => Some(n.to_string()),
        JsonValue::Bool(b) => Some(b.to_string()),
        JsonValue::Null | JsonValue::Array(_) | JsonValue::Object(_) => None,
    }
}

fn as_list(value: JsonValue) -> Vec<String> {
    match value {
        JsonValue::Array(items) => items.iter().filter_map(as_text).collect(),
        scalar => as_text(&scalar).into_iter().collect(),
    }
}

fn coerce_page(spec: &mut QuerySpec, value: JsonValue) {
    if let Some(page) = as_integer("page", &value) {
        spec.page = u64::try_from(page).unwrap_or(0).max(1);
    }
}

fn coerce_per_page(spec: &mut QuerySpec, value: JsonValue) {
    if let Some(per_page) = as_integer("per_page", &value) {
        spec.per_page = per_page;
    }
}

fn coerce_criteria(spec: &mut QuerySpec, value: JsonValue) {
    let object = match value {
        JsonValue::Object(object) => object,
        JsonValue::String(raw) => match serde_json::from_str::<JsonValue>(&raw) {
            Ok(JsonValue::Object(object)) => object,
            Ok(_) => {
                tracing::warn!("Criteria must be a JSON object, ignoring");
                return;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Invalid JSON in criteria, ignoring");
                return;
            }
        },
        _ => return,
    };
    for (field, criterion) in Criteria::from_json_object(&object).iter() {
        spec.criteria.insert(field, criterion.clone());
    }
}

fn coerce_sort(spec: &mut QuerySpec, value: JsonValue) {
    if let Some(sort) = as_text(&value) {
        spec.sort = sort;
    }
}

fn coerce_order(spec: &mut QuerySpec, value: JsonValue) {
    if let Some(order) = as_text(&value) {
        spec.order = order;
    }
}

fn coerce_search(spec: &mut QuerySpec, value: JsonValue) {
    spec.search.extend(as_list(value));
}

fn coerce_search_field(spec: &mut QuerySpec, value: JsonValue) {
    spec.search_field.extend(as_list(value));
}

fn coerce_result_mode(spec: &mut QuerySpec, value: JsonValue) {
    if let Some(mode) = as_text(&value).as_deref().and_then(ResultMode::parse) {
        spec.result_mode = mode;
    }
}

impl QuerySpec {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalize an untyped JSON object.
    #[must_use]
    pub fn from_map(raw: &serde_json::Map<String, JsonValue>) -> Self {
        let mut spec = Self::default();
        for (key, value) in raw {
            spec.apply(key, value.clone());
        }
        spec
    }

    /// Normalize string pairs. Repeated `search` / `search_field` keys
    /// accumulate, other repeated keys keep the last value.
    #[must_use]
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut spec = Self::default();
        for (key, value) in pairs {
            spec.apply(key.as_ref(), JsonValue::String(value.as_ref().to_string()));
        }
        spec
    }

    /// Normalize a URL query string, with or without the leading `?`.
    #[must_use]
    pub fn from_query_string(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        Self::from_pairs(url::form_urlencoded::parse(query.as_bytes()))
    }

    fn apply(&mut self, key: &str, value: JsonValue) {
        let key = key.trim();
        if matches!(&value, JsonValue::String(s) if s.trim() == UNDEFINED_MARKER) {
            return;
        }
        match FIELD_COERCIONS.iter().find(|(name, _)| *name == key) {
            Some((_, coerce)) => coerce(self, value),
            None => tracing::trace!(key, "Ignoring unrecognized query parameter"),
        }
    }

    #[must_use]
    pub fn with_page(mut self, page: u64) -> Self {
        self.page = page.max(1);
        self
    }

    #[must_use]
    pub const fn with_per_page(mut self, per_page: i64) -> Self {
        self.per_page = per_page;
        self
    }

    #[must_use]
    pub fn with_criteria(mut self, criteria: Criteria) -> Self {
        self.criteria = criteria;
        self
    }

    #[must_use]
    pub fn with_sort(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.sort = field.into();
        self.order = direction.as_str().to_string();
        self
    }

    #[must_use]
    pub fn with_search(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.search_field.push(field.into());
        self.search.push(value.into());
        self
    }

    #[must_use]
    pub const fn with_result_mode(mut self, result_mode: ResultMode) -> Self {
        self.result_mode = result_mode;
        self
    }

    #[must_use]
    pub const fn page(&self) -> u64 {
        self.page
    }

    #[must_use]
    pub const fn per_page(&self) -> i64 {
        self.per_page
    }

    #[must_use]
    pub const fn result_mode(&self) -> ResultMode {
        self.result_mode
    }

    #[must_use]
    pub fn sort(&self) -> &str {
        &self.sort
    }

    #[must_use]
    pub fn order(&self) -> &str {
        &self.order
    }

    /// Explicit criteria plus one prefix match per non-empty
    /// `(search_field, search)` pair. Explicit criteria win on collision.
    #[must_use]
    pub fn criteria(&self) -> Criteria {
        let mut criteria = self.criteria.clone();
        for (field, value) in self.search_field.iter().zip(&self.search) {
            if field.is_empty() || value.is_empty() || criteria.contains(field) {
                continue;
            }
            criteria.insert(field.clone(), Criterion::prefix(value.clone()));
        }
        criteria
    }

    /// `[(sort, order)]` when both are set, otherwise empty.
    #[must_use]
    pub fn order_by(&self) -> OrderBy {
        if self.sort.is_empty() || self.order.is_empty() {
            return OrderBy::new();
        }
        OrderBy::new().then(self.sort.clone(), SortDirection::parse(&self.order))
    }
}

/// Query parameters accepted by paginated list endpoints.
///
/// # Pagination
/// `page` is 1-based. `per_page` of 0 or less disables pagination and
/// returns every matching row with an unknown (`-1`) total.
///
/// # Filtering
/// - `criteria`: JSON object, e.g. `{"status": "active", "deleted_at": null, "id": [1, 2]}`
/// - `search` + `search_field`: case-insensitive prefix match, e.g. `search=jo&search_field=name`
///
/// # Sorting
/// `sort=name&order=DESC`. Anything other than `ASC` sorts descending.
#[derive(Debug, Deserialize, IntoParams, ToSchema, Default)]
#[into_params(parameter_in = Query)]
pub struct PageParams {
    /// Page number (1-based).
    #[param(example = "1")]
    pub page: Option<String>,
    /// Items per page, 0 or less for everything.
    #[param(example = "20")]
    pub per_page: Option<String>,
    /// JSON-encoded criteria object.
    #[param(example = r#"{"status": "active"}"#)]
    pub criteria: Option<String>,
    /// Sort column.
    #[param(example = "name")]
    pub sort: Option<String>,
    /// Sort direction, ASC or DESC.
    #[param(example = "ASC")]
    pub order: Option<String>,
    /// Prefix to search for in `search_field`.
    #[param(example = "jo")]
    pub search: Option<String>,
    /// Column searched by `search`.
    #[param(example = "name")]
    pub search_field: Option<String>,
    /// `model` or `json`.
    #[param(example = "model")]
    pub result_mode: Option<String>,
}

impl From<PageParams> for QuerySpec {
    fn from(params: PageParams) -> Self {
        let pairs = [
            ("page", params.page),
            ("per_page", params.per_page),
            ("criteria", params.criteria),
            ("sort", params.sort),
            ("order", params.order),
            ("search", params.search),
            ("search_field", params.search_field),
            ("result_mode", params.result_mode),
        ];
        Self::from_pairs(pairs.into_iter().filter_map(|(k, v)| v.map(|v| (k, v))))
    }
}
