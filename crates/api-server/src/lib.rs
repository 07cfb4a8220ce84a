//! HTTP surface over the simulation engines. Each player gets one session
//! (snapshot + event engine) behind a mutex; handlers lock it, call into the
//! engine crates, and write the result back.

pub mod event_routes;
pub mod finance_routes;
pub mod save_routes;
pub mod season_routes;
mod session;

pub use session::Session;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use content_client::{ContentProvider, HttpContentClient};
use dashmap::DashMap;
use save_store::{InMemoryStore, SnapshotStore};
use serde::Serialize;
use sim_core::SimError;
use tokio::sync::Mutex;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::EnvFilter;

#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<DashMap<String, Arc<Mutex<Session>>>>,
    pub store: Arc<dyn SnapshotStore>,
    pub provider: Arc<dyn ContentProvider>,
}

impl AppState {
    pub fn new(store: Arc<dyn SnapshotStore>, provider: Arc<dyn ContentProvider>) -> Self {
        Self {
            sessions: Arc::new(DashMap::new()),
            store,
            provider,
        }
    }

    /// Fetch or lazily create the session for a player.
    pub fn session(&self, player_id: &str) -> Arc<Mutex<Session>> {
        self.sessions
            .entry(player_id.to_string())
            .or_insert_with(|| {
                tracing::info!(player = player_id, "starting new game session");
                Arc::new(Mutex::new(Session::new(player_id, self.provider.clone())))
            })
            .clone()
    }
}

/// Uniform response envelope.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Handler error type: anything anyhow-compatible comes in, an enveloped
/// JSON error with a status derived from the underlying `SimError` goes out.
#[derive(Debug)]
pub struct AppError(anyhow::Error);

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self.0.downcast_ref::<SimError>() {
            Some(SimError::InvalidParameters(_)) => StatusCode::BAD_REQUEST,
            Some(SimError::NotFound(_)) => StatusCode::NOT_FOUND,
            Some(SimError::NotEligible(_)) | Some(SimError::InsufficientFunds { .. }) => {
                StatusCode::CONFLICT
            }
            Some(SimError::CorruptSave(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            Some(SimError::ExternalServiceFailure(_)) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        }
        (status, Json(ApiResponse::<()>::error(self.0.to_string()))).into_response()
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .merge(season_routes::season_routes())
        .merge(event_routes::event_routes())
        .merge(finance_routes::finance_routes())
        .merge(save_routes::save_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn run_server() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(3000);
    let content_url = std::env::var("CONTENT_SERVICE_URL")
        .unwrap_or_else(|_| "http://localhost:8001".to_string());
    let content_timeout: u64 = std::env::var("CONTENT_TIMEOUT_SECS")
        .ok()
        .and_then(|t| t.parse().ok())
        .unwrap_or(10);

    let provider: Arc<dyn ContentProvider> = Arc::new(HttpContentClient::new(
        content_url,
        Duration::from_secs(content_timeout),
    ));
    let store: Arc<dyn SnapshotStore> = Arc::new(InMemoryStore::new());
    let state = AppState::new(store, provider);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "server listening");
    axum::serve(listener, build_router(state)).await?;
    Ok(())
}
