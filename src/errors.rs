//! # Error Handling for Paged Queries
//!
//! `PageError` is returned by every store-facing operation of the crate:
//! - Store faults (`DbErr`) are propagated unchanged, the crate never retries
//! - Degenerate COUNT results are reported as `NoResult` / `NonUniqueResult`
//!   so `count_by` can normalize them to zero
//!
//! Contract violations such as computing a last page without a page size are
//! not errors: they panic, see [`crate::pagination::compute_last_page`].
//!
//! When a `PageError` is returned from an axum handler it is logged through
//! `tracing` and a sanitized body is sent to the client. No database details
//! leave the process.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::DbErr;
use serde::Serialize;
use std::fmt;

#[derive(Debug)]
pub enum PageError {
    /// Connectivity, syntax or hydration fault reported by the store
    Database(DbErr),

    /// A COUNT query produced no row
    NoResult,

    /// A COUNT query produced more than one row
    NonUniqueResult {
        /// Number of rows the store returned
        rows: usize,
    },
}

impl PageError {
    /// True for the two COUNT outcomes that `count_by` treats as zero
    #[must_use]
    pub const fn is_degenerate_count(&self) -> bool {
        matches!(self, Self::NoResult | Self::NonUniqueResult { .. })
    }

    fn status_code(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }

    /// Get the user-facing error message (sanitized)
    fn user_message(&self) -> String {
        match self {
            Self::Database(_) => "A database error occurred".to_string(),
            Self::NoResult | Self::NonUniqueResult { .. } => {
                "Unable to count the requested resources".to_string()
            }
        }
    }

    fn log_internal(&self) {
        match self {
            Self::Database(internal) => {
                tracing::error!(error = ?internal, "Database error while paging");
            }
            Self::NonUniqueResult { rows } => {
                tracing::error!(rows = *rows, "Count query returned more than one row");
            }
            Self::NoResult => {
                tracing::error!("Count query returned no row");
            }
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        self.log_internal();

        let status = self.status_code();
        let body = ErrorResponse {
            error: self.user_message(),
        };

        (status, Json(body)).into_response()
    }
}

impl fmt::Display for PageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Database(err) => write!(f, "database error: {err}"),
            Self::NoResult => write!(f, "count query returned no result"),
            Self::NonUniqueResult { rows } => {
                write!(f, "count query returned {rows} rows, expected exactly one")
            }
        }
    }
}

impl std::error::Error for PageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Database(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbErr> for PageError {
    fn from(err: DbErr) -> Self {
        Self::Database(err)
    }
}
