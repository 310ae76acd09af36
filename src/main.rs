use axum::http::header;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use gridblock_lib::{init_tracing, AppCore, GREETING};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let data_dir = std::env::var("GRIDBLOCK_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("data"));
    if let Err(error) = init_tracing(&data_dir) {
        eprintln!("failed to initialize tracing: {}", error);
    }

    let core = Arc::new(AppCore::open(&data_dir)?);
    if core.snapshot_recovered() {
        tracing::warn!("persisted snapshot was corrupt, started from the default workspace");
    }
    tracing::info!(
        remote_configured = core.remote().is_configured(),
        data_dir = %data_dir.display(),
        "gridblock core ready"
    );

    let app = Router::new().route("/api/hello", get(hello));

    let port = std::env::var("GRIDBLOCK_PORT")
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(8686);
    let listener = TcpListener::bind(("127.0.0.1", port)).await?;
    tracing::info!(port, "listening");
    axum::serve(listener, app).await?;

    Ok(())
}

// The reference endpoint declares JSON but ships a plain greeting; kept as-is.
async fn hello() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "application/json")], GREETING)
}
