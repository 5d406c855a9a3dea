use sea_orm::sea_query::Order;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const DEFAULT_ORDER: &str = "ASC";

/// Direction of one ORDER BY entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    /// `ASC` in any case is ascending, everything else sorts descending.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case("ASC") {
            Self::Asc
        } else {
            Self::Desc
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

impl From<SortDirection> for Order {
    fn from(direction: SortDirection) -> Self {
        match direction {
            SortDirection::Asc => Order::Asc,
            SortDirection::Desc => Order::Desc,
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered list of `(field, direction)` pairs. Earlier pairs take precedence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderBy(Vec<(String, SortDirection)>);

impl OrderBy {
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Append a pair, keeping insertion order.
    #[must_use]
    pub fn then(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.push(field, direction);
        self
    }

    pub fn push(&mut self, field: impl Into<String>, direction: SortDirection) {
        self.0.push((field.into(), direction));
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, SortDirection)> {
        self.0.iter().map(|(field, direction)| (field.as_str(), *direction))
    }
}

impl<F: Into<String>> FromIterator<(F, SortDirection)> for OrderBy {
    fn from_iter<I: IntoIterator<Item = (F, SortDirection)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(f, d)| (f.into(), d)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_direction_asc() {
        assert_eq!(SortDirection::parse("ASC"), SortDirection::Asc);
        assert_eq!(SortDirection::parse("asc"), SortDirection::Asc);
        assert_eq!(SortDirection::parse(" Asc "), SortDirection::Asc);
    }

    #[test]
    fn test_parse_direction_anything_else_is_desc() {
        assert_eq!(SortDirection::parse("DESC"), SortDirection::Desc);
        assert_eq!(SortDirection::parse("random"), SortDirection::Desc);
        assert_eq!(SortDirection::parse(""), SortDirection::Desc);
    }

    #[test]
    fn test_order_by_keeps_insertion_order() {
        let order = OrderBy::new()
            .then("name", SortDirection::Asc)
            .then("created_at", SortDirection::Desc)
            .then("id", SortDirection::Asc);

        let fields: Vec<&str> = order.iter().map(|(f, _)| f).collect();
        assert_eq!(fields, vec!["name", "created_at", "id"]);
        assert_eq!(order.len(), 3);
    }

    #[test]
    fn test_direction_into_sea_query_order() {
        assert_eq!(Order::from(SortDirection::Asc), Order::Asc);
        assert_eq!(Order::from(SortDirection::Desc), Order::Desc);
    }
}
