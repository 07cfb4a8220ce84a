use axum::{
    extract::{Path, State},
    routing::{delete, get, post},
    Json, Router,
};
use save_store::{restore_snapshot, SaveReceipt, SaveSummary};
use sim_core::GameSnapshot;

use crate::{ApiResponse, AppError, AppState};

pub fn save_routes() -> Router<AppState> {
    Router::new()
        .route("/api/players/:player_id/saves", get(list_saves))
        .route("/api/players/:player_id/saves/:slot", post(save_game))
        .route("/api/players/:player_id/saves/:slot/load", post(load_game))
        .route("/api/players/:player_id/saves/:slot", delete(delete_save))
}

async fn list_saves(
    State(state): State<AppState>,
    Path(player_id): Path<String>,
) -> Result<Json<ApiResponse<Vec<SaveSummary>>>, AppError> {
    let summaries = state.store.list(&player_id).await?;
    Ok(Json(ApiResponse::success(summaries)))
}

async fn save_game(
    State(state): State<AppState>,
    Path((player_id, slot)): Path<(String, String)>,
) -> Result<Json<ApiResponse<SaveReceipt>>, AppError> {
    let session = state.session(&player_id);
    let session = session.lock().await;
    let receipt = state.store.save(&session.snapshot, &slot).await?;
    Ok(Json(ApiResponse::success(receipt)))
}

async fn load_game(
    State(state): State<AppState>,
    Path((player_id, slot)): Path<(String, String)>,
) -> Result<Json<ApiResponse<GameSnapshot>>, AppError> {
    let stored = state.store.load(&player_id, &slot).await?;
    let snapshot = restore_snapshot(&stored)?;

    let session = state.session(&player_id);
    let mut session = session.lock().await;
    session.replace_snapshot(snapshot.clone());
    Ok(Json(ApiResponse::success(snapshot)))
}

async fn delete_save(
    State(state): State<AppState>,
    Path((player_id, slot)): Path<(String, String)>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    state.store.delete(&player_id, &slot).await?;
    Ok(Json(ApiResponse::success(())))
}
