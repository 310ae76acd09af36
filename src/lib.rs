pub mod app;
pub mod auth;
pub mod errors;
pub mod models;
pub mod remote;
pub mod seed;
pub mod state;
pub mod store;
pub mod validation;
pub mod views;

use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;

pub use app::AppCore;
pub use errors::{AppError, AppResult};

/// Body of the demo `GET /api/hello` endpoint.
pub const GREETING: &str = "Hello, World!";

static LOG_GUARD: std::sync::OnceLock<WorkerGuard> = std::sync::OnceLock::new();

pub fn init_tracing(data_dir: &Path) -> Result<(), String> {
    let log_dir = data_dir.join("logs");
    std::fs::create_dir_all(&log_dir).map_err(|error| error.to_string())?;
    let file_appender = tracing_appender::rolling::daily(log_dir, "gridblock.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    let _ = LOG_GUARD.set(guard);

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .json()
        .with_writer(non_blocking)
        .try_init()
        .map_err(|error| error.to_string())
}
