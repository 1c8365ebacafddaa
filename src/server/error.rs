//! HTTP error responses
//!
//! Handlers fail with [`ApiError`]; only the coarse category reaches the
//! client, the full error chain goes to the log.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::error::Error;

use crate::repository::{ErrorCategory, RepositoryError};

/// Response body for failed requests
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: ErrorCategory,
}

/// Error type for repository handlers
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    category: ErrorCategory,
}

/// `err` followed by each of its sources, joined with `: `
fn error_chain(err: &dyn Error) -> String {
    let mut rendered = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        rendered.push_str(": ");
        rendered.push_str(&cause.to_string());
        source = cause.source();
    }
    rendered
}

impl ApiError {
    pub fn new(status: StatusCode, category: ErrorCategory) -> Self {
        Self { status, category }
    }

    /// Map a repository failure onto a status.
    ///
    /// Version-control failures use `vcs_status`, which differs per route;
    /// every other category has a fixed status.
    pub fn from_repository(err: RepositoryError, vcs_status: StatusCode) -> Self {
        let category = err.category();
        let status = match category {
            ErrorCategory::NotFound => StatusCode::NOT_FOUND,
            ErrorCategory::NotARepository | ErrorCategory::InvalidArgument => {
                StatusCode::BAD_REQUEST
            }
            ErrorCategory::VersionControlError => vcs_status,
            ErrorCategory::IoError | ErrorCategory::InternalError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        if status.is_server_error() {
            log::error!("Request failed ({}): {}", status, error_chain(&err));
        } else {
            log::warn!("Request rejected ({}): {}", status, error_chain(&err));
        }

        Self { status, category }
    }

    /// A blocking worker died before producing a result
    pub fn internal(message: &str) -> Self {
        log::error!("Internal server error: {}", message);
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            ErrorCategory::InternalError,
        )
    }

    /// Malformed request shape, rejected before reaching the manager
    pub fn bad_request(message: &str) -> Self {
        log::warn!("Bad request: {}", message);
        Self::new(StatusCode::BAD_REQUEST, ErrorCategory::InvalidArgument)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn category(&self) -> ErrorCategory {
        self.category
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.category,
        };
        (self.status, Json(body)).into_response()
    }
}
