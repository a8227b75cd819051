use std::{net::SocketAddr, sync::Arc};

use axum::{
    routing::{get, patch, post},
    Router,
};
use server_api::ApiContext;
use storage::Registry;
use tokio::sync::broadcast;
use tower_http::limit::RequestBodyLimitLayer;
use tracing::{error, info, warn};

mod api;
mod app_state;
mod config;

use app_state::AppState;
use config::{load_settings, Settings};

const MAX_REQUEST_BYTES: usize = 64 * 1024;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let (settings, config_warnings) = load_settings();
    tracing_subscriber::fmt()
        .with_env_filter(settings.log_filter.as_str())
        .init();
    for warning in &config_warnings {
        warn!("{warning}");
    }

    let registry = load_registry(&settings).map_err(|error| {
        error!(
            seed_path = settings.seed_path.as_deref().unwrap_or("<builtin>"),
            error = %format!("{error:#}"),
            "failed to load clinic registry"
        );
        error
    })?;
    info!(
        doctors = registry.doctor_count(),
        rename_policy = ?settings.rename_policy,
        "clinic registry ready"
    );

    let api = ApiContext::new(registry, settings.rename_policy);
    let (events, _) = broadcast::channel(256);

    let state = AppState { api, events };
    let app = build_router(Arc::new(state));

    let addr: SocketAddr = settings.server_bind.parse()?;
    info!(%addr, "server listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn load_registry(settings: &Settings) -> anyhow::Result<Registry> {
    match settings.seed_path.as_deref() {
        Some(path) => Registry::load(path),
        None => Ok(Registry::seeded()),
    }
}

fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(api::healthz))
        .route("/operations", post(api::run_operation))
        .route("/doctors/:doctor_id", get(api::http_get_doctor))
        .route(
            "/doctors/:doctor_id/events",
            get(api::http_list_events).post(api::http_create_event),
        )
        .route(
            "/doctors/:doctor_id/events/:event_id",
            patch(api::http_rename_patient).delete(api::http_delete_event),
        )
        .route("/ws", get(api::ws_handler))
        .layer(RequestBodyLimitLayer::new(MAX_REQUEST_BYTES))
        .with_state(state)
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
