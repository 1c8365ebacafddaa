// Repository registry loaded from ~/.repository-manager/repositories.toml
//
// Immutable after startup; shared with the manager behind an Arc

use anyhow::{anyhow, bail, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::descriptor::RepositoryDescriptor;
use crate::utils::is_blank;

/// On-disk layout of the registry file
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RegistryFile {
    #[serde(default)]
    pub repositories: Vec<RepositoryDescriptor>,
}

/// Lookup of repository descriptors by project code and name, case-insensitive
#[derive(Debug, Default)]
pub struct RepositoryRegistry {
    descriptors: Vec<RepositoryDescriptor>,
    by_key: HashMap<(String, String), usize>,
}

fn registry_key(project_code: &str, name: &str) -> (String, String) {
    (project_code.to_lowercase(), name.to_lowercase())
}

impl RepositoryRegistry {
    /// Default registry file path (~/.repository-manager/repositories.toml)
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|p| p.join(".repository-manager").join("repositories.toml"))
    }

    /// Load the registry from `path`.
    ///
    /// A missing file is an empty registry; unreadable or malformed files and
    /// entries with a blank name or path are errors.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::warn!(
                "Repository registry '{}' not found, starting with no repositories",
                path.display()
            );
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .map_err(|e| anyhow!("Failed to read registry file '{}': {}", path.display(), e))?;

        let file: RegistryFile = toml::from_str(&contents)
            .map_err(|e| anyhow!("Failed to parse registry file '{}': {}", path.display(), e))?;

        let registry = Self::from_descriptors(file.repositories)?;
        log::info!(
            "Loaded {} repositories from '{}'",
            registry.len(),
            path.display()
        );
        Ok(registry)
    }

    /// Build a registry from descriptors; the first entry wins on duplicate keys
    pub fn from_descriptors(descriptors: Vec<RepositoryDescriptor>) -> Result<Self> {
        let mut registry = Self::default();

        for (position, descriptor) in descriptors.into_iter().enumerate() {
            if is_blank(&descriptor.name) {
                bail!("Repository entry #{} has a blank name", position + 1);
            }
            if descriptor.path.as_os_str().is_empty() {
                bail!(
                    "Repository '{}' has a blank path",
                    descriptor.name
                );
            }

            let key = registry_key(&descriptor.project_code, &descriptor.name);
            if registry.by_key.contains_key(&key) {
                log::warn!(
                    "Duplicate repository '{}/{}' ignored",
                    descriptor.project_code,
                    descriptor.name
                );
                continue;
            }

            registry.by_key.insert(key, registry.descriptors.len());
            registry.descriptors.push(descriptor);
        }

        Ok(registry)
    }

    /// Descriptor registered under `(project_code, name)`
    pub fn find_by_project_and_name(
        &self,
        project_code: &str,
        name: &str,
    ) -> Option<&RepositoryDescriptor> {
        self.by_key
            .get(&registry_key(project_code, name))
            .map(|&index| &self.descriptors[index])
    }

    /// First descriptor named `name` in any project
    pub fn find_by_name(&self, name: &str) -> Option<&RepositoryDescriptor> {
        let name = name.to_lowercase();
        self.descriptors
            .iter()
            .find(|d| d.name.to_lowercase() == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RepositoryDescriptor> {
        self.descriptors.iter()
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}
