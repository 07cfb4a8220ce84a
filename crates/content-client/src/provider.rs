use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sim_core::{GameEvent, GameSnapshot, ResolvedConsequences, Season};

use crate::error::ContentResult;

/// Context payload sent with every content-service call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventContext {
    pub money: i64,
    pub season: Season,
    pub day: u32,
    pub drought_risk: f64,
    pub flood_risk: f64,
    pub active_crops: usize,
    pub active_loans: usize,
}

impl EventContext {
    pub fn from_snapshot(snapshot: &GameSnapshot) -> Self {
        Self {
            money: snapshot.farm.money,
            season: snapshot.season.current,
            day: snapshot.season.day,
            drought_risk: snapshot.weather.drought_risk,
            flood_risk: snapshot.weather.flood_risk,
            active_crops: snapshot.farm.crops.len(),
            active_loans: snapshot.economics.loans.len(),
        }
    }
}

/// Backend-agnostic interface to the narrative content service.
///
/// Implemented by the HTTP client and by in-process stubs in tests. Callers
/// must treat every error (including timeouts) as a signal to fall back to
/// the deterministic local generator.
#[async_trait]
pub trait ContentProvider: Send + Sync {
    async fn generate_event(&self, context: &EventContext) -> ContentResult<GameEvent>;

    async fn resolve_event(
        &self,
        event: &GameEvent,
        choice_id: &str,
        context: &EventContext,
    ) -> ContentResult<ResolvedConsequences>;

    fn backend_name(&self) -> &'static str;
}
