use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::GameSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventCategory {
    WeatherCrisis,
    ExtremeWeather,
    PestCrisis,
    EmergencyCrisis,
    FinancialCrisis,
    MarketOpportunity,
    GovernmentScheme,
    SocialCrisis,
}

impl Default for EventCategory {
    fn default() -> Self {
        EventCategory::WeatherCrisis
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl Default for EventSeverity {
    fn default() -> Self {
        EventSeverity::Medium
    }
}

/// Typed predicate a choice may declare against the current snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChoiceRequirement {
    MoneyAtLeast { amount: i64 },
    MoneyAtMost { amount: i64 },
    MoneyExactly { amount: i64 },
    HasCrops,
    HasEquipment { kind: String },
}

impl ChoiceRequirement {
    pub fn holds(&self, snapshot: &GameSnapshot) -> bool {
        match self {
            ChoiceRequirement::MoneyAtLeast { amount } => snapshot.farm.money >= *amount,
            ChoiceRequirement::MoneyAtMost { amount } => snapshot.farm.money <= *amount,
            ChoiceRequirement::MoneyExactly { amount } => snapshot.farm.money == *amount,
            ChoiceRequirement::HasCrops => !snapshot.farm.crops.is_empty(),
            ChoiceRequirement::HasEquipment { kind } => snapshot
                .farm
                .equipment
                .iter()
                .any(|e| e.kind.eq_ignore_ascii_case(kind)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventChoice {
    pub id: String,
    pub text: String,
    /// Upfront cost in whole rupees; validated against funds at resolution.
    #[serde(default)]
    pub cost: i64,
    /// Effect-name -> magnitude. Canonical effect names are interpreted by
    /// the consequence applier; anything else rides along untouched.
    #[serde(default)]
    pub consequences: BTreeMap<String, f64>,
    #[serde(default)]
    pub requirements: Vec<ChoiceRequirement>,
}

/// A narrative event awaiting player resolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameEvent {
    #[serde(default)]
    pub id: String,
    /// Free-text event type from the content service (e.g. "severe_drought").
    pub event_type: String,
    #[serde(default)]
    pub category: EventCategory,
    #[serde(default)]
    pub severity: EventSeverity,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub educational_content: Option<String>,
    pub choices: Vec<EventChoice>,
    pub timestamp: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EducationalImpact {
    pub topic: String,
    pub lesson_learned: String,
    pub awareness_increased: bool,
    #[serde(default)]
    pub crisis_experience: bool,
}

/// The resolved outcome of an event choice.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedConsequences {
    #[serde(default)]
    pub immediate_effects: BTreeMap<String, f64>,
    #[serde(default)]
    pub long_term_effects: BTreeMap<String, f64>,
    pub educational_impact: EducationalImpact,
    pub choice_made: String,
    #[serde(default)]
    pub cost: i64,
}

/// Immutable history entry appended when an event is resolved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventResolution {
    pub event_id: String,
    pub choice_id: String,
    pub timestamp: DateTime<Utc>,
    pub consequences: ResolvedConsequences,
}
