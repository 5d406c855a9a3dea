//! # Paged Repository
//!
//! Orchestrates a paged read:
//!
//! 1. build the query (entity projection, translated criteria, ordering)
//! 2. paginate it when `per_page > 0`
//! 3. execute it through the [`PageStore`]
//! 4. work out the total, skipping the COUNT query when the first page is
//!    already known to be complete
//! 5. assemble the [`PageResult`]
//!
//! ## Usage
//!
//! ```rust,ignore
//! use pagecrate::{PagedRepository, QuerySpec, SeaOrmStore};
//!
//! let customers = PagedRepository::new(SeaOrmStore::<customer::Entity>::new(db), "c")
//!     .with_reserved_url_fields(["company_id"]);
//!
//! let spec = QuerySpec::from_query_string("page=2&per_page=5&sort=name&order=ASC");
//! let page = customers.find_page(&spec).await?;
//! assert_eq!(page.current_page(), 2);
//! ```

use crate::core::store::PageStore;
use crate::errors::PageError;
use crate::filtering::{
    Criteria, CriteriaTranslator, DefaultTranslator, OrderBy, PaginatingQueryBuilder,
};
use crate::models::{QuerySpec, ResultMode};
use crate::pagination::{PageLinks, PageResult};

pub struct PagedRepository<S> {
    store: S,
    alias: String,
    translator: Box<dyn CriteriaTranslator>,
    reserved_url_fields: Vec<String>,
}

impl<S: PageStore> PagedRepository<S> {
    /// Repository over `store`, querying the entity as `alias`.
    pub fn new(store: S, alias: impl Into<String>) -> Self {
        Self {
            store,
            alias: alias.into(),
            translator: Box::new(DefaultTranslator),
            reserved_url_fields: Vec::new(),
        }
    }

    /// Replace the default criteria translation.
    #[must_use]
    pub fn with_translator(mut self, translator: impl CriteriaTranslator + 'static) -> Self {
        self.translator = Box::new(translator);
        self
    }

    /// Fields that are filtered on but never written into navigation URLs.
    #[must_use]
    pub fn with_reserved_url_fields<I, F>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = F>,
        F: Into<String>,
    {
        self.reserved_url_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    #[must_use]
    pub fn into_store(self) -> S {
        self.store
    }

    #[must_use]
    pub fn alias(&self) -> &str {
        &self.alias
    }

    /// Query over the aliased entity with `criteria` applied and nothing selected yet.
    #[must_use]
    pub fn create_paginated_query_builder(&self, criteria: &Criteria) -> PaginatingQueryBuilder {
        let mut qb = PaginatingQueryBuilder::new(self.store.table(), self.alias.as_str());
        qb.set_uuid_columns(self.store.uuid_columns());
        self.translator.translate(&mut qb, criteria);
        tracing::trace!(
            translator = self.translator.name(),
            predicates = qb.predicate_count(),
            "Translated criteria"
        );
        qb
    }

    /// Fetch the page described by a normalized request.
    ///
    /// # Errors
    ///
    /// Propagates store failures unchanged.
    pub async fn find_page(&self, spec: &QuerySpec) -> Result<PageResult<S::Row>, PageError> {
        self.find_page_by(
            spec.page(),
            spec.per_page(),
            &spec.criteria(),
            &spec.order_by(),
            spec.result_mode(),
        )
        .await
    }

    /// Fetch one page. `per_page <= 0` returns every matching row with an
    /// unknown total.
    ///
    /// # Errors
    ///
    /// Propagates store failures unchanged.
    pub async fn find_page_by(
        &self,
        page: u64,
        per_page: i64,
        criteria: &Criteria,
        order_by: &OrderBy,
        result_mode: ResultMode,
    ) -> Result<PageResult<S::Row>, PageError> {
        let page = page.max(1);
        let limit = u64::try_from(per_page).ok().filter(|limit| *limit > 0);

        let mut qb = self.create_paginated_query_builder(criteria);
        qb.add_select(self.store.columns());
        qb.add_order(order_by, Some(&self.alias));
        if let Some(limit) = limit {
            qb.add_pagination(page, limit);
        }

        let results = self.store.execute_query(&qb, result_mode).await?;

        let total = match limit {
            None => None,
            Some(limit) => {
                let fetched = u64::try_from(results.len()).unwrap_or(u64::MAX);
                if fetched < limit && page == 1 {
                    tracing::debug!(fetched, limit, "First page is complete, skipping count");
                    Some(fetched)
                } else {
                    Some(self.count_by(criteria).await?)
                }
            }
        };

        let links = PageLinks::new(criteria, order_by).reserving(&self.reserved_url_fields);
        Ok(PageResult::new(results, page, per_page, total, &links))
    }

    /// Count rows matching `criteria`. A COUNT that yields no row or several
    /// rows counts as zero.
    ///
    /// # Errors
    ///
    /// Propagates any other store failure.
    pub async fn count_by(&self, criteria: &Criteria) -> Result<u64, PageError> {
        let mut qb = self.create_paginated_query_builder(criteria);
        qb.select_count();

        match self.store.execute_count(&qb).await {
            Ok(count) => Ok(count),
            Err(err) if err.is_degenerate_count() => {
                tracing::debug!(error = %err, "Degenerate count result, using 0");
                Ok(0)
            }
            Err(err) => Err(err),
        }
    }
}
