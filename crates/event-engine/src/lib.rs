//! Event Engine: generates, validates, resolves, and expires narrative
//! events, and folds their consequences into the game snapshot. The external
//! content service is consulted first for generation/resolution; every
//! failure path recovers through a deterministic local fallback, so callers
//! never observe a half-applied state.

pub mod consequences;
pub mod fallback;
pub mod severity;

pub use consequences::apply_consequences;

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use content_client::{ContentProvider, EventContext};
use serde::{Deserialize, Serialize};
use sim_core::{
    EducationalImpact, EventChoice, EventResolution, GameEvent, GameSnapshot,
    ResolvedConsequences, SimError, SimResult,
};
use uuid::Uuid;

/// Derived per-topic view over resolution history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicInsight {
    pub events_experienced: u32,
    pub lessons: Vec<String>,
    pub mastery: u32,
}

pub struct EventEngine {
    provider: Arc<dyn ContentProvider>,
    active: HashMap<String, GameEvent>,
    history: Vec<EventResolution>,
}

impl EventEngine {
    pub fn new(provider: Arc<dyn ContentProvider>) -> Self {
        Self {
            provider,
            active: HashMap::new(),
            history: Vec::new(),
        }
    }

    /// Generate a new event for the snapshot. The content service is asked
    /// first; on any failure the deterministic local generator takes over.
    /// The event enters the active set before being returned.
    pub async fn generate(&mut self, snapshot: &GameSnapshot) -> GameEvent {
        let context = EventContext::from_snapshot(snapshot);
        let now = Utc::now();

        let mut event = match self.provider.generate_event(&context).await {
            Ok(mut event) => {
                if event.id.is_empty() {
                    event.id = format!("event_{}", Uuid::new_v4().simple());
                }
                if let Some(tagged) = severity::tag_from_type(&event.event_type) {
                    event.severity = tagged;
                }
                event
            }
            Err(err) => {
                tracing::warn!(
                    backend = self.provider.backend_name(),
                    error = %err,
                    "content service unavailable, using local event generator"
                );
                fallback::generate(snapshot, now)
            }
        };

        if event.expires_at <= now {
            event.expires_at = now + severity::expiry_horizon(event.severity);
        }

        self.active.insert(event.id.clone(), event.clone());
        event
    }

    /// A choice is available unless one of its declared requirements fails
    /// against the snapshot. Unknown event/choice ids are unavailable.
    pub fn is_choice_available(
        event: &GameEvent,
        choice_id: &str,
        snapshot: &GameSnapshot,
    ) -> bool {
        match event.choices.iter().find(|c| c.id == choice_id) {
            Some(choice) => choice.requirements.iter().all(|r| r.holds(snapshot)),
            None => false,
        }
    }

    /// Resolve an active event with the given choice. Funds are validated
    /// before anything is mutated; on content-service failure the
    /// deterministic fallback consequences are used. The event leaves the
    /// active set and the resolution is appended to history atomically.
    pub async fn resolve(
        &mut self,
        event_id: &str,
        choice_id: &str,
        snapshot: &GameSnapshot,
    ) -> SimResult<EventResolution> {
        let event = self
            .active
            .get(event_id)
            .cloned()
            .ok_or_else(|| SimError::NotFound(format!("no active event {event_id}")))?;

        let choice = event
            .choices
            .iter()
            .find(|c| c.id == choice_id)
            .cloned()
            .ok_or_else(|| SimError::NotFound(format!("no choice {choice_id} on {event_id}")))?;

        if !Self::is_choice_available(&event, choice_id, snapshot) {
            return Err(SimError::NotEligible(format!(
                "requirements not met for choice {choice_id}"
            )));
        }
        if choice.cost > snapshot.farm.money {
            return Err(SimError::InsufficientFunds {
                needed: choice.cost,
                available: snapshot.farm.money,
            });
        }

        let context = EventContext::from_snapshot(snapshot);
        let consequences = match self
            .provider
            .resolve_event(&event, choice_id, &context)
            .await
        {
            Ok(consequences) => consequences,
            Err(err) => {
                tracing::warn!(
                    backend = self.provider.backend_name(),
                    error = %err,
                    "content service unavailable, using local resolution"
                );
                fallback_consequences(&event, &choice)
            }
        };

        let resolution = EventResolution {
            event_id: event.id.clone(),
            choice_id: choice.id.clone(),
            timestamp: Utc::now(),
            consequences,
        };

        self.active.remove(event_id);
        self.history.push(resolution.clone());
        Ok(resolution)
    }

    /// Active events, after lazily sweeping out anything past its expiry.
    /// This sweep-on-read is the only eviction mechanism.
    pub fn active_events(&mut self, now: DateTime<Utc>) -> Vec<GameEvent> {
        self.active.retain(|id, event| {
            let alive = event.expires_at > now;
            if !alive {
                tracing::debug!(event_id = %id, "expiring event");
            }
            alive
        });
        let mut events: Vec<GameEvent> = self.active.values().cloned().collect();
        events.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
        events
    }

    pub fn history(&self) -> &[EventResolution] {
        &self.history
    }

    /// Rehydrate engine state from a persisted session.
    pub fn restore(&mut self, active: Vec<GameEvent>, history: Vec<EventResolution>) {
        self.active = active.into_iter().map(|e| (e.id.clone(), e)).collect();
        self.history = history;
    }

    /// Per-topic lesson list and mastery score, derived from history alone.
    pub fn educational_insights(&self) -> BTreeMap<String, TopicInsight> {
        educational_insights(&self.history)
    }
}

/// Aggregate resolution history per topic: deduplicated lessons and a
/// mastery score of `min(100, resolutions * 10)`.
pub fn educational_insights(history: &[EventResolution]) -> BTreeMap<String, TopicInsight> {
    let mut insights: BTreeMap<String, TopicInsight> = BTreeMap::new();
    for resolution in history {
        let impact = &resolution.consequences.educational_impact;
        let entry = insights
            .entry(impact.topic.clone())
            .or_insert_with(|| TopicInsight {
                events_experienced: 0,
                lessons: Vec::new(),
                mastery: 0,
            });
        entry.events_experienced += 1;
        if !impact.lesson_learned.is_empty() && !entry.lessons.contains(&impact.lesson_learned) {
            entry.lessons.push(impact.lesson_learned.clone());
        }
        entry.mastery = (entry.events_experienced * 10).min(100);
    }
    insights
}

/// Educational topic for known crisis event types; anything else keeps its
/// own type string as the topic and does not count as crisis experience.
fn educational_topic(event_type: &str) -> (String, bool) {
    let topic = match event_type {
        "severe_drought" => "drought_management",
        "flash_flood" => "flood_preparedness",
        "cyclone_warning" => "disaster_preparedness",
        "locust_swarm" => "pest_management",
        "pest_outbreak" => "integrated_pest_management",
        "equipment_failure" => "farm_equipment_maintenance",
        "health_emergency" => "rural_healthcare_planning",
        "fire_accident" => "farm_safety_protocols",
        other => return (other.to_string(), false),
    };
    (topic.to_string(), true)
}

/// Deterministic resolution used when the content service cannot be reached:
/// the choice's cost leaves the player's cash and the event's own educational
/// text becomes the lesson.
fn fallback_consequences(event: &GameEvent, choice: &EventChoice) -> ResolvedConsequences {
    let (topic, crisis_experience) = educational_topic(&event.event_type);
    let lesson = event
        .educational_content
        .clone()
        .unwrap_or_else(|| "Every farming decision carries financial consequences.".to_string());

    let mut immediate_effects = BTreeMap::new();
    immediate_effects.insert("money_change".to_string(), -(choice.cost as f64));

    ResolvedConsequences {
        immediate_effects,
        long_term_effects: BTreeMap::new(),
        educational_impact: EducationalImpact {
            topic,
            lesson_learned: lesson,
            awareness_increased: true,
            crisis_experience,
        },
        choice_made: choice.text.clone(),
        cost: choice.cost,
    }
}
