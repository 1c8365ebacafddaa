//! Repository-management routes
//!
//! All routes live under `/repository-management/:project_code/:repository_name`:
//! - branch_routes: `GET /branches`, `POST /create-branch`
//! - file_routes: `GET /file`, `POST /commit-file`, `GET /files`

pub mod branch_routes;
pub mod file_routes;

use axum::{
    http::StatusCode,
    routing::{get, post},
    Router,
};

use super::error::ApiError;
use super::ServerAppState;
use crate::config::RepositoryDescriptor;
use crate::repository::{RepositoryManager, RepositoryResult};

/// Prefix every repository route is nested under
pub const REPOSITORY_ROUTE_PREFIX: &str = "/repository-management/:project_code/:repository_name";

/// Routes addressed by project code and repository name
pub fn repository_router() -> Router<ServerAppState> {
    Router::new()
        .route("/branches", get(branch_routes::list_branches))
        .route("/create-branch", post(branch_routes::create_branch))
        .route("/file", get(file_routes::get_file))
        .route("/commit-file", post(file_routes::commit_file))
        .route("/files", get(file_routes::list_files))
}

// =============================================================================
// Helpers shared by route modules
// =============================================================================

/// Run blocking repository work off the async runtime
pub async fn run_blocking<T, F>(work: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, ApiError> + Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| ApiError::internal(&format!("repository worker failed: {}", e)))?
}

/// Converts a repository result, using `vcs_status` for version-control failures
pub fn map_repository<T>(result: RepositoryResult<T>, vcs_status: StatusCode) -> Result<T, ApiError> {
    result.map_err(|e| ApiError::from_repository(e, vcs_status))
}

/// Resolve the addressed repository and require an existing repository on disk
pub fn resolve_existing(
    manager: &RepositoryManager,
    project_code: &str,
    repository_name: &str,
) -> RepositoryResult<RepositoryDescriptor> {
    let descriptor = manager.descriptor(project_code, repository_name)?;
    RepositoryManager::ensure_repository_path(&descriptor)?;
    Ok(descriptor)
}
