use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use event_engine::{apply_consequences, TopicInsight};
use serde::{Deserialize, Serialize};
use sim_core::{EventResolution, GameEvent, GameSnapshot};
use std::collections::BTreeMap;

use crate::{ApiResponse, AppError, AppState};

#[derive(Deserialize)]
pub struct ResolveEventRequest {
    pub choice_id: String,
}

#[derive(Serialize)]
pub struct ResolveEventResponse {
    pub resolution: EventResolution,
    pub snapshot: GameSnapshot,
}

pub fn event_routes() -> Router<AppState> {
    Router::new()
        .route("/api/players/:player_id/events", get(list_active_events))
        .route("/api/players/:player_id/events/generate", post(generate_event))
        .route(
            "/api/players/:player_id/events/:event_id/resolve",
            post(resolve_event),
        )
        .route("/api/players/:player_id/events/history", get(event_history))
        .route("/api/players/:player_id/education", get(education_insights))
}

async fn list_active_events(
    State(state): State<AppState>,
    Path(player_id): Path<String>,
) -> Result<Json<ApiResponse<Vec<GameEvent>>>, AppError> {
    let session = state.session(&player_id);
    let mut session = session.lock().await;
    Ok(Json(ApiResponse::success(
        session.events.active_events(Utc::now()),
    )))
}

async fn generate_event(
    State(state): State<AppState>,
    Path(player_id): Path<String>,
) -> Result<Json<ApiResponse<GameEvent>>, AppError> {
    let session = state.session(&player_id);
    let mut session = session.lock().await;

    let snapshot = session.snapshot.clone();
    let event = session.events.generate(&snapshot).await;
    Ok(Json(ApiResponse::success(event)))
}

async fn resolve_event(
    State(state): State<AppState>,
    Path((player_id, event_id)): Path<(String, String)>,
    Json(request): Json<ResolveEventRequest>,
) -> Result<Json<ApiResponse<ResolveEventResponse>>, AppError> {
    let session = state.session(&player_id);
    let mut session = session.lock().await;

    let snapshot = session.snapshot.clone();
    let resolution = session
        .events
        .resolve(&event_id, &request.choice_id, &snapshot)
        .await?;

    session.snapshot = apply_consequences(&resolution.consequences, &snapshot);
    Ok(Json(ApiResponse::success(ResolveEventResponse {
        resolution,
        snapshot: session.snapshot.clone(),
    })))
}

async fn event_history(
    State(state): State<AppState>,
    Path(player_id): Path<String>,
) -> Result<Json<ApiResponse<Vec<EventResolution>>>, AppError> {
    let session = state.session(&player_id);
    let session = session.lock().await;
    Ok(Json(ApiResponse::success(
        session.events.history().to_vec(),
    )))
}

async fn education_insights(
    State(state): State<AppState>,
    Path(player_id): Path<String>,
) -> Result<Json<ApiResponse<BTreeMap<String, TopicInsight>>>, AppError> {
    let session = state.session(&player_id);
    let session = session.lock().await;
    Ok(Json(ApiResponse::success(
        session.events.educational_insights(),
    )))
}
