use std::env;
use std::path::PathBuf;

use engine::{app_paths_for_root, resolve_app_paths, LoopConfig, Scene};
use thiserror::Error;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use super::config::{config_path, load_config, ConfigError};
use super::gameplay;

pub(crate) struct AppWiring {
    pub(crate) config: LoopConfig,
    pub(crate) lobby: Box<dyn Scene>,
    pub(crate) characters: Box<dyn Scene>,
}

#[derive(Debug, Error)]
pub(crate) enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub(crate) fn build_app() -> Result<AppWiring, BootstrapError> {
    init_tracing();
    info!("=== Character Toggle Startup ===");

    let paths = match resolve_app_paths() {
        Ok(paths) => paths,
        Err(error) => {
            warn!(error = %error, "project_root_unresolved_using_cwd");
            app_paths_for_root(current_dir_or_dot())
        }
    };
    let config_file = config_path(&paths.config_dir);
    info!(root = %paths.root.display(), config = %config_file.display(), "paths_resolved");

    let demo_config = load_config(&config_file)?;
    let (lobby, characters) = gameplay::build_scene_pair(demo_config);

    Ok(AppWiring {
        config: LoopConfig::default(),
        lobby,
        characters,
    })
}

fn current_dir_or_dot() -> PathBuf {
    env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}
