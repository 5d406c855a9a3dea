//! axum glue: `QuerySpec` as an extractor, `PageResult` as a JSON response.
//!
//! ```rust,ignore
//! async fn list_customers(
//!     State(repo): State<Arc<PagedRepository<SeaOrmStore<customer::Entity>>>>,
//!     spec: QuerySpec,
//! ) -> Result<PageResult<Hydrated<customer::Model>>, PageError> {
//!     repo.find_page(&spec).await
//! }
//! ```

use axum::{
    Json,
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::convert::Infallible;

use crate::models::QuerySpec;
use crate::pagination::PageResult;

/// Reads the raw query string so repeated `search` / `search_field` pairs
/// survive. Never rejects: malformed parameters are ignored.
impl<S: Send + Sync> FromRequestParts<S> for QuerySpec {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_query_string(parts.uri.query().unwrap_or_default()))
    }
}

impl<T: Serialize> IntoResponse for PageResult<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}
