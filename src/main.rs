// Repository manager server entry point

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;

use repository_manager_lib::config::RepositoryRegistry;
use repository_manager_lib::repository::RepositoryManager;
use repository_manager_lib::server::{self, ServerAppState};
use repository_manager_lib::shutdown::{register_signal_handlers, ShutdownState};

/// HTTP service for branches and files of server-resident git repositories
#[derive(Parser, Debug)]
#[command(name = "repository-manager")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Port to bind the server to
    #[arg(long, env = "REPOSITORY_MANAGER_PORT", default_value = "8080")]
    port: u16,

    /// Address to bind the server to
    #[arg(long, env = "REPOSITORY_MANAGER_BIND", default_value = "0.0.0.0")]
    bind: String,

    /// Repository registry file (default: ~/.repository-manager/repositories.toml)
    #[arg(long, env = "REPOSITORY_MANAGER_CONFIG")]
    config: Option<PathBuf>,

    /// Allowed CORS origin; repeat for several. Any origin when omitted
    #[arg(long = "cors-origin")]
    cors_origins: Vec<String>,

    /// Clone registered repositories whose path is not a repository yet
    #[arg(long)]
    clone_missing: bool,
}

fn clone_missing_repositories(manager: &RepositoryManager) {
    for descriptor in manager.registry().iter() {
        if descriptor.remote_url.is_none() {
            continue;
        }
        match manager.ensure_cloned(descriptor) {
            Ok(true) => log::info!("Cloned {} into {}", descriptor.name, descriptor.path.display()),
            Ok(false) => {}
            Err(e) => log::warn!("Could not clone {}: {}", descriptor.name, e),
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logger
    env_logger::init();

    let config_path = match cli.config {
        Some(path) => path,
        None => RepositoryRegistry::default_config_path()
            .ok_or_else(|| anyhow!("Could not determine home directory"))?,
    };
    let registry = RepositoryRegistry::load(&config_path)?;
    let manager = RepositoryManager::new(Arc::new(registry));

    if cli.clone_missing {
        clone_missing_repositories(&manager);
    }

    let shutdown_state = ShutdownState::new();
    if let Err(e) = register_signal_handlers(shutdown_state.clone()) {
        log::warn!("Failed to register signal handlers: {}", e);
    }

    let state = ServerAppState::new(manager, shutdown_state);
    let cors_origins = (!cli.cors_origins.is_empty()).then_some(cli.cors_origins);

    let rt = tokio::runtime::Runtime::new().context("Failed to create tokio runtime")?;
    rt.block_on(server::run_server(cli.port, &cli.bind, state, cors_origins))
        .map_err(|e| anyhow!(e))?;

    log::info!("Repository manager stopped");
    Ok(())
}
