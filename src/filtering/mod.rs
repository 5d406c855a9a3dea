//! # Criteria Translation & Query Building
//!
//! Turns a typed criteria map and an ordering into a bounded Sea-ORM query.
//!
//! ## Main Components
//!
//! - **[`Criteria`] / [`Criterion`]**: field -> condition map with a JSON shorthand
//! - **[`CriteriaTranslator`]**: strategy that compiles criteria into predicates
//! - **[`PaginatingQueryBuilder`]**: select statement with composable ordering and pagination
//! - **[`OrderBy`]**: ordered `(field, direction)` pairs
//!
//! ## Criterion Shorthand
//!
//! ```rust,ignore
//! // {"status": "active"}           -> c.status = :f1a2b3
//! // {"deleted_at": null}           -> c.deleted_at IS NULL
//! // {"id": [1, 2, 3]}              -> c.id IN (1, 2, 3)
//! // {"name": ["ILIKE", "jo"]}      -> LOWER(c.name) LIKE 'jo%'
//! ```
//!
//! Every criterion is AND-combined. There is no OR, grouping or negation
//! beyond the null check.

pub mod conditions;
pub mod criteria;
pub mod query_builder;
pub mod sort;

pub use conditions::{CriteriaTranslator, CustomTranslator, DefaultTranslator, build_prefix_condition};
pub use criteria::{Criteria, Criterion};
pub use query_builder::{BoundParameter, PaginatingQueryBuilder, parameter_name};
pub use sort::{OrderBy, SortDirection};
