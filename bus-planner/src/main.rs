use std::process::ExitCode;

use tracing::{error, info};

use bus_planner::logging;
use bus_planner::repository::{
    CachedRepository, HttpRepository, HttpRepositoryConfig, MemoryRepository, RepositoryBackend,
    RepositoryError,
};
use bus_planner::settings::{DataSource, Settings};
use bus_planner::web::{AppState, create_router};

fn backend(settings: &Settings) -> Result<RepositoryBackend, RepositoryError> {
    match &settings.source {
        DataSource::Snapshot(dir) => {
            MemoryRepository::load_dir(dir, &settings.repository).map(RepositoryBackend::Memory)
        }
        DataSource::Remote { base_url, api_key } => {
            let mut config =
                HttpRepositoryConfig::new(base_url).with_conversion(settings.repository.clone());
            if let Some(key) = api_key {
                config = config.with_api_key(key);
            }
            info!(base_url = %config.base_url, "Using remote repository");
            HttpRepository::new(config).map(RepositoryBackend::Http)
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    logging::init();

    let settings = match Settings::from_env() {
        Ok(s) => s,
        Err(e) => {
            error!(error = %e, "Invalid settings");
            return ExitCode::FAILURE;
        }
    };

    let backend = match backend(&settings) {
        Ok(b) => b,
        Err(e) => {
            error!(error = %e, "Failed to open repository");
            return ExitCode::FAILURE;
        }
    };
    let repository = CachedRepository::new(backend, &settings.cache);
    let state = AppState::new(repository, settings.planner);
    let app = create_router(state);

    let listener = match tokio::net::TcpListener::bind(settings.bind).await {
        Ok(l) => l,
        Err(e) => {
            error!(addr = %settings.bind, error = %e, "Failed to bind");
            return ExitCode::FAILURE;
        }
    };
    info!(addr = %settings.bind, "Bus journey planner listening");
    info!("  GET  /health                     - Health check");
    info!("  GET  /lines                      - Operating lines");
    info!("  GET  /lines/:code/stops/nearest  - Nearest stops on a line");
    info!("  POST /plan                       - Plan a journey");
    info!("  GET  /schedule                   - Next departure at a stop");

    if let Err(e) = axum::serve(listener, app).await {
        error!(error = %e, "Server error");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
