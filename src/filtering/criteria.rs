//! Typed filter criteria and the JSON shorthand accepted for them.

use sea_orm::Value;
use serde_json::Value as JsonValue;
use uuid::Uuid;

/// Operator tags that turn a two-element list into a prefix match.
const PREFIX_TAGS: [&str; 2] = ["LIKE", "ILIKE"];

/// One filter condition on a single field.
#[derive(Debug, Clone, PartialEq)]
pub enum Criterion {
    /// `field = value`
    Equals(JsonValue),
    /// `field IS NULL`
    IsNull,
    /// `field IN (values...)`
    In(Vec<JsonValue>),
    /// Case-insensitive `field LIKE 'value%'`
    PrefixMatch(String),
}

impl Criterion {
    pub fn equals(value: impl Into<JsonValue>) -> Self {
        Self::Equals(value.into())
    }

    pub fn prefix(value: impl Into<String>) -> Self {
        Self::PrefixMatch(value.into())
    }

    pub fn one_of<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<JsonValue>,
    {
        Self::In(values.into_iter().map(Into::into).collect())
    }

    /// Read the JSON shorthand:
    /// - `null` is `IsNull`
    /// - `["LIKE", v]` / `["ILIKE", v]` (tag in any case) is `PrefixMatch(v)`
    /// - any other list is `In`
    /// - any other value is `Equals`
    #[must_use]
    pub fn from_json(value: JsonValue) -> Self {
        match value {
            JsonValue::Null => Self::IsNull,
            JsonValue::Array(items) if is_prefix_tagged(&items) => {
                Self::PrefixMatch(scalar_to_string(&items[1]))
            }
            JsonValue::Array(items) => Self::In(items),
            other => Self::Equals(other),
        }
    }

    /// Text this criterion contributes to a navigation URL `search` value.
    #[must_use]
    pub fn url_value(&self) -> String {
        match self {
            Self::Equals(value) => scalar_to_string(value),
            Self::IsNull => String::new(),
            Self::In(values) => values
                .iter()
                .map(scalar_to_string)
                .collect::<Vec<_>>()
                .join(","),
            Self::PrefixMatch(value) => value.clone(),
        }
    }
}

fn is_prefix_tagged(items: &[JsonValue]) -> bool {
    items.len() == 2
        && items[0]
            .as_str()
            .is_some_and(|tag| PREFIX_TAGS.iter().any(|t| tag.trim().eq_ignore_ascii_case(t)))
}

pub(crate) fn scalar_to_string(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        JsonValue::Null => String::new(),
        other => other.to_string(),
    }
}

/// Convert a JSON criterion value into a bindable store value.
/// Strings bind as text unless the target column holds UUIDs.
pub(crate) fn to_sea_value(value: &JsonValue, uuid_column: bool) -> Value {
    match value {
        JsonValue::String(s) if uuid_column => Uuid::parse_str(s.trim())
            .map_or_else(|_| Value::from(s.clone()), Value::from),
        JsonValue::String(s) => Value::from(s.clone()),
        JsonValue::Number(n) => {
            if let Some(int_value) = n.as_i64() {
                Value::from(int_value)
            } else if let Some(uint_value) = n.as_u64() {
                Value::from(uint_value)
            } else {
                Value::from(n.as_f64().unwrap_or_default())
            }
        }
        JsonValue::Bool(b) => Value::from(*b),
        JsonValue::Null => Value::String(None),
        JsonValue::Array(_) | JsonValue::Object(_) => Value::Json(Some(Box::new(value.clone()))),
    }
}

/// Ordered field -> criterion mapping. Inserting an existing field replaces
/// its criterion without moving it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Criteria(Vec<(String, Criterion)>);

impl Criteria {
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    pub fn insert(&mut self, field: impl Into<String>, criterion: Criterion) {
        let field = field.into();
        if let Some(slot) = self.0.iter_mut().find(|(f, _)| *f == field) {
            slot.1 = criterion;
        } else {
            self.0.push((field, criterion));
        }
    }

    /// Builder-style [`Criteria::insert`].
    #[must_use]
    pub fn with(mut self, field: impl Into<String>, criterion: Criterion) -> Self {
        self.insert(field, criterion);
        self
    }

    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Criterion> {
        self.0.iter().find(|(f, _)| f == field).map(|(_, c)| c)
    }

    #[must_use]
    pub fn contains(&self, field: &str) -> bool {
        self.get(field).is_some()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Criterion)> {
        self.0.iter().map(|(f, c)| (f.as_str(), c))
    }

    /// Build from a JSON object using the [`Criterion::from_json`] shorthand.
    #[must_use]
    pub fn from_json_object(object: &serde_json::Map<String, JsonValue>) -> Self {
        object
            .iter()
            .map(|(field, value)| (field.trim().to_string(), Criterion::from_json(value.clone())))
            .filter(|(field, _)| !field.is_empty())
            .collect()
    }
}

impl<F: Into<String>> FromIterator<(F, Criterion)> for Criteria {
    fn from_iter<I: IntoIterator<Item = (F, Criterion)>>(iter: I) -> Self {
        let mut criteria = Self::new();
        for (field, criterion) in iter {
            criteria.insert(field, criterion);
        }
        criteria
    }
}
