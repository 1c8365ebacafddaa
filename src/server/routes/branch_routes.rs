//! Branch routes
//!
//! Handles: GET /branches, POST /create-branch

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use super::{map_repository, resolve_existing, run_blocking};
use crate::server::error::ApiError;
use crate::server::ServerAppState;

/// Request body for POST /create-branch
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBranchRequest {
    #[serde(default)]
    pub branch_name: Option<String>,
    #[serde(default)]
    pub source_branch: Option<String>,
}

/// Fully qualified local and remote-tracking branch names
pub async fn list_branches(
    State(state): State<ServerAppState>,
    Path((project_code, repository_name)): Path<(String, String)>,
) -> Result<Json<Vec<String>>, ApiError> {
    let manager = state.manager.clone();

    let branches = run_blocking(move || {
        let vcs_status = StatusCode::INTERNAL_SERVER_ERROR;
        let descriptor = map_repository(
            resolve_existing(&manager, &project_code, &repository_name),
            vcs_status,
        )?;
        map_repository(manager.list_branches(&descriptor), vcs_status)
    })
    .await?;

    Ok(Json(branches))
}

/// Create a branch and publish it; retrying with the same name is a no-op.
///
/// The addressed repository is resolved before the body is looked at, so an
/// unknown repository is a 404 whatever was posted.
pub async fn create_branch(
    State(state): State<ServerAppState>,
    Path((project_code, repository_name)): Path<(String, String)>,
    payload: Result<Json<CreateBranchRequest>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let manager = state.manager.clone();
    let request = payload.map(|Json(request)| request).map_err(|e| e.body_text());

    run_blocking(move || {
        let vcs_status = StatusCode::BAD_REQUEST;
        let descriptor = map_repository(
            resolve_existing(&manager, &project_code, &repository_name),
            vcs_status,
        )?;
        let request = request.map_err(|reason| {
            ApiError::bad_request(&format!("unreadable create-branch body: {}", reason))
        })?;
        map_repository(
            manager.create_branch(
                request.branch_name.as_deref().unwrap_or(""),
                request.source_branch.as_deref(),
                &descriptor,
            ),
            vcs_status,
        )
    })
    .await?;

    Ok(StatusCode::CREATED)
}
