//! # pagecrate
//!
//! Paged reads in front of Sea-ORM: request parameters are normalized into a
//! [`QuerySpec`], criteria are translated into predicates, the query is
//! ordered and bounded, and the result comes back as a [`PageResult`] with
//! total, last page and next/prev navigation URLs.

pub mod core;
pub mod errors;
pub mod extract;
pub mod filtering;
pub mod models;
pub mod pagination;

pub use crate::core::{Hydrated, PageStore, PagedRepository, SeaOrmStore};
pub use errors::PageError;
pub use filtering::{
    Criteria, CriteriaTranslator, Criterion, CustomTranslator, DefaultTranslator, OrderBy,
    PaginatingQueryBuilder, SortDirection,
};
pub use models::{PageParams, QuerySpec, ResultMode};
pub use pagination::{PageLinks, PageResult, compute_last_page};
