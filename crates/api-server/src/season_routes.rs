use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use sim_core::{ScheduledEvent, Season, SeasonState};

use crate::{ApiResponse, AppError, AppState};

#[derive(Deserialize)]
pub struct ScheduleEventRequest {
    pub id: String,
    pub kind: String,
    pub scheduled_day: u32,
    pub scheduled_season: Season,
    #[serde(default)]
    pub payload: serde_json::Value,
    #[serde(default)]
    pub recurring: bool,
}

#[derive(Deserialize)]
pub struct SetSeasonRequest {
    pub season: Season,
    pub day: u32,
}

#[derive(Serialize)]
pub struct AdvanceDayResponse {
    pub total_day: u32,
    pub season: SeasonState,
    pub season_changed: bool,
    /// Ids of scheduled events that came due on the new day.
    pub completed_events: Vec<String>,
}

pub fn season_routes() -> Router<AppState> {
    Router::new()
        .route("/api/players/:player_id/season", get(get_season))
        .route("/api/players/:player_id/season", post(set_season))
        .route("/api/players/:player_id/day/advance", post(advance_day))
        .route(
            "/api/players/:player_id/season/events",
            post(schedule_event),
        )
}

async fn get_season(
    State(state): State<AppState>,
    Path(player_id): Path<String>,
) -> Result<Json<ApiResponse<SeasonState>>, AppError> {
    let session = state.session(&player_id);
    let session = session.lock().await;
    Ok(Json(ApiResponse::success(session.snapshot.season.clone())))
}

async fn advance_day(
    State(state): State<AppState>,
    Path(player_id): Path<String>,
) -> Result<Json<ApiResponse<AdvanceDayResponse>>, AppError> {
    let session = state.session(&player_id);
    let mut session = session.lock().await;

    session.snapshot.total_day += 1;
    let report = season_clock::advance_day(&mut session.snapshot.season);

    Ok(Json(ApiResponse::success(AdvanceDayResponse {
        total_day: session.snapshot.total_day,
        season: session.snapshot.season.clone(),
        season_changed: report.season_changed,
        completed_events: report.completed_events,
    })))
}

async fn set_season(
    State(state): State<AppState>,
    Path(player_id): Path<String>,
    Json(request): Json<SetSeasonRequest>,
) -> Result<Json<ApiResponse<SeasonState>>, AppError> {
    let session = state.session(&player_id);
    let mut session = session.lock().await;

    season_clock::set_season(&mut session.snapshot.season, request.season, request.day);
    Ok(Json(ApiResponse::success(session.snapshot.season.clone())))
}

async fn schedule_event(
    State(state): State<AppState>,
    Path(player_id): Path<String>,
    Json(request): Json<ScheduleEventRequest>,
) -> Result<Json<ApiResponse<SeasonState>>, AppError> {
    let session = state.session(&player_id);
    let mut session = session.lock().await;

    season_clock::schedule_event(
        &mut session.snapshot.season,
        ScheduledEvent {
            id: request.id,
            kind: request.kind,
            scheduled_day: request.scheduled_day,
            scheduled_season: request.scheduled_season,
            payload: request.payload,
            recurring: request.recurring,
            completed: false,
        },
    );
    Ok(Json(ApiResponse::success(session.snapshot.season.clone())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AppState;
    use content_client::{ContentProvider, HttpContentClient};
    use save_store::InMemoryStore;
    use std::sync::Arc;
    use std::time::Duration;

    fn test_state() -> AppState {
        let provider: Arc<dyn ContentProvider> = Arc::new(HttpContentClient::new(
            "http://localhost:1".to_string(),
            Duration::from_millis(10),
        ));
        AppState::new(Arc::new(InMemoryStore::new()), provider)
    }

    #[tokio::test]
    async fn test_advance_day_reports_due_event_ids() {
        let state = test_state();

        schedule_event(
            State(state.clone()),
            Path("p1".to_string()),
            Json(ScheduleEventRequest {
                id: "sow".to_string(),
                kind: "sowing".to_string(),
                scheduled_day: 2,
                scheduled_season: Season::Kharif,
                payload: serde_json::Value::Null,
                recurring: false,
            }),
        )
        .await
        .unwrap();

        let Json(response) = advance_day(State(state), Path("p1".to_string()))
            .await
            .unwrap();
        let report = response.data.unwrap();

        assert_eq!(report.total_day, 2);
        assert_eq!(report.season.day, 2);
        assert!(!report.season_changed);
        assert_eq!(report.completed_events, vec!["sow".to_string()]);
    }
}
