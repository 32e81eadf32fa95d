//! Vigil server binary.
//!
//! Runs either predict-service or quote-service, selected by `service.kind`
//! in the YAML config named by `VIGIL_CONFIG` (default `vigil.yaml`).

use tracing_subscriber::{fmt, EnvFilter};

use vigil_core::error::{Result, VigilError};
use vigil_server::{app_state, config, router};

#[tokio::main]
async fn main() {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    if let Err(e) = run().await {
        tracing::error!(error = %e, "vigil-server failed");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let path = config::config_path();
    let cfg = config::load_from_file(&path)?;
    let listen = cfg.server.listen_addr()?;

    // Instruments are registered here; wiring errors stop startup.
    let state = app_state::AppState::from_config(&cfg)?;
    let app = router::build_router(state);

    tracing::info!(%listen, service = cfg.service.kind(), config = %path, "vigil-server starting");
    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .map_err(|e| VigilError::Internal(format!("failed to bind {listen}: {e}")))?;

    axum::serve(listener, app)
        .await
        .map_err(|e| VigilError::Internal(format!("server failed: {e}")))
}
