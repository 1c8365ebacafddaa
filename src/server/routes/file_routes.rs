//! File routes
//!
//! Handles: GET /file, POST /commit-file, GET /files

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Json,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde::Deserialize;

use super::{map_repository, resolve_existing, run_blocking};
use crate::repository::FileCommitIntent;
use crate::server::error::ApiError;
use crate::server::ServerAppState;

/// Query for GET /file
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileQuery {
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub branch: Option<String>,
}

/// Query for GET /files
#[derive(Debug, Default, Deserialize)]
pub struct BranchQuery {
    #[serde(default)]
    pub branch: Option<String>,
}

/// File content on a branch, as plain base64 text
pub async fn get_file(
    State(state): State<ServerAppState>,
    Path((project_code, repository_name)): Path<(String, String)>,
    Query(query): Query<FileQuery>,
) -> Result<String, ApiError> {
    let manager = state.manager.clone();

    let content = run_blocking(move || {
        let vcs_status = StatusCode::INTERNAL_SERVER_ERROR;
        let descriptor = map_repository(
            resolve_existing(&manager, &project_code, &repository_name),
            vcs_status,
        )?;
        map_repository(
            manager.get_file(
                query.file_name.as_deref().unwrap_or(""),
                &descriptor,
                query.branch.as_deref(),
            ),
            vcs_status,
        )
    })
    .await?;

    Ok(BASE64.encode(content))
}

/// Write, commit and push one uploaded file.
///
/// Multipart parts: `file` (the upload), and optional text fields `branch`,
/// `commitMessage`, `authorName`, `authorEmail`.
pub async fn commit_file(
    State(state): State<ServerAppState>,
    Path((project_code, repository_name)): Path<(String, String)>,
    mut multipart: Multipart,
) -> Result<StatusCode, ApiError> {
    let mut intent = FileCommitIntent::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(&format!("malformed multipart body: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();
        let read_error = |e: axum::extract::multipart::MultipartError| {
            ApiError::bad_request(&format!("unreadable multipart field {}: {}", name, e))
        };

        match name.as_str() {
            "file" => {
                intent.file_name = field.file_name().unwrap_or_default().to_string();
                intent.content = field.bytes().await.map_err(read_error)?.to_vec();
            }
            "branch" => intent.branch = Some(field.text().await.map_err(read_error)?),
            "commitMessage" => intent.message = Some(field.text().await.map_err(read_error)?),
            "authorName" => intent.author_name = Some(field.text().await.map_err(read_error)?),
            "authorEmail" => intent.author_email = Some(field.text().await.map_err(read_error)?),
            other => log::debug!("Ignoring multipart field {}", other),
        }
    }

    let manager = state.manager.clone();
    let receipt = run_blocking(move || {
        let vcs_status = StatusCode::BAD_REQUEST;
        let descriptor = map_repository(
            resolve_existing(&manager, &project_code, &repository_name),
            vcs_status,
        )?;
        map_repository(manager.commit_file(&intent, &descriptor), vcs_status)
    })
    .await?;

    log::debug!(
        "Commit {} published on {}",
        receipt.commit_id,
        receipt.branch
    );
    Ok(StatusCode::OK)
}

/// Immediate entries of the repository root, on `branch` or the main branch
pub async fn list_files(
    State(state): State<ServerAppState>,
    Path((project_code, repository_name)): Path<(String, String)>,
    Query(query): Query<BranchQuery>,
) -> Result<Json<Vec<String>>, ApiError> {
    let manager = state.manager.clone();

    let files = run_blocking(move || {
        let vcs_status = StatusCode::INTERNAL_SERVER_ERROR;
        let descriptor = map_repository(
            resolve_existing(&manager, &project_code, &repository_name),
            vcs_status,
        )?
        .with_main_branch(query.branch.as_deref());
        map_repository(manager.list_files(&descriptor), vcs_status)
    })
    .await?;

    Ok(Json(files))
}
