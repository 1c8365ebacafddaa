// Static description of one managed repository

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::git::Credentials;
use crate::utils::non_blank;

pub const DEFAULT_MAIN_BRANCH: &str = "main";
pub const DEFAULT_COMMIT_USER: &str = "Repository Admin";
pub const DEFAULT_COMMIT_EMAIL: &str = "repository-manager@localhost";

fn default_repository_type() -> String {
    "git".to_string()
}

fn default_main_branch() -> String {
    DEFAULT_MAIN_BRANCH.to_string()
}

fn default_commit_user() -> String {
    DEFAULT_COMMIT_USER.to_string()
}

fn default_commit_email() -> String {
    DEFAULT_COMMIT_EMAIL.to_string()
}

/// One `[[repositories]]` entry of the registry file
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RepositoryDescriptor {
    pub name: String,
    pub project_code: String,
    /// Working directory; may not be a repository yet
    pub path: PathBuf,
    #[serde(rename = "type", default = "default_repository_type")]
    pub repository_type: String,
    #[serde(default)]
    pub remote_url: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default, skip_serializing)]
    pub password: Option<String>,
    /// Personal access token; takes precedence over username/password
    #[serde(default, skip_serializing)]
    pub token: Option<String>,
    #[serde(default = "default_main_branch")]
    pub main_branch: String,
    #[serde(default = "default_commit_user")]
    pub default_commit_user: String,
    #[serde(default = "default_commit_email")]
    pub default_commit_email: String,
}

impl RepositoryDescriptor {
    /// Minimal descriptor with every optional field at its default
    pub fn new(
        project_code: impl Into<String>,
        name: impl Into<String>,
        path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            name: name.into(),
            project_code: project_code.into(),
            path: path.into(),
            repository_type: default_repository_type(),
            remote_url: None,
            username: None,
            password: None,
            token: None,
            main_branch: default_main_branch(),
            default_commit_user: default_commit_user(),
            default_commit_email: default_commit_email(),
        }
    }

    /// Credentials for remote operations, or `None` for anonymous access
    pub fn credentials(&self) -> Option<Credentials> {
        if let Some(token) = non_blank(self.token.as_deref()) {
            return Some(Credentials::Token(token.to_string()));
        }

        match (
            non_blank(self.username.as_deref()),
            self.password.as_deref(),
        ) {
            (Some(username), Some(password)) => Some(Credentials::UserPass {
                username: username.to_string(),
                password: password.to_string(),
            }),
            _ => None,
        }
    }

    /// Copy of this descriptor with a different main branch.
    ///
    /// Blank overrides leave the configured branch in place.
    pub fn with_main_branch(&self, branch: Option<&str>) -> Self {
        let mut descriptor = self.clone();
        if let Some(branch) = non_blank(branch) {
            descriptor.main_branch = branch.to_string();
        }
        descriptor
    }
}

impl std::fmt::Debug for RepositoryDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RepositoryDescriptor")
            .field("name", &self.name)
            .field("project_code", &self.project_code)
            .field("path", &self.path)
            .field("type", &self.repository_type)
            .field("remote_url", &self.remote_url)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("token", &self.token.as_ref().map(|_| "***"))
            .field("main_branch", &self.main_branch)
            .finish()
    }
}
