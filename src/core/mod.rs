// Paged reads: orchestration and the store boundary

pub mod repository;
pub mod store;

pub use repository::PagedRepository;
pub use store::{Hydrated, PageStore, SeaOrmStore};
