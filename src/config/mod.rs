// Repository configuration: descriptors and the registry they are loaded into

pub mod descriptor;
pub mod registry;

pub use descriptor::{
    RepositoryDescriptor, DEFAULT_COMMIT_EMAIL, DEFAULT_COMMIT_USER, DEFAULT_MAIN_BRANCH,
};
pub use registry::{RegistryFile, RepositoryRegistry};
