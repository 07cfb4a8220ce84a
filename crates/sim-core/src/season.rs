use serde::{Deserialize, Serialize};

/// Length of every season in simulated days.
pub const SEASON_LENGTH_DAYS: u32 = 120;

/// The fixed agricultural season rotation. The cycle order never changes:
/// Kharif -> Rabi -> Zaid -> Off-season -> Kharif.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Season {
    Kharif,
    Rabi,
    Zaid,
    #[serde(rename = "Off-season")]
    OffSeason,
}

impl Season {
    pub const CYCLE: [Season; 4] = [
        Season::Kharif,
        Season::Rabi,
        Season::Zaid,
        Season::OffSeason,
    ];

    /// Next season in the fixed rotation.
    pub fn successor(self) -> Season {
        match self {
            Season::Kharif => Season::Rabi,
            Season::Rabi => Season::Zaid,
            Season::Zaid => Season::OffSeason,
            Season::OffSeason => Season::Kharif,
        }
    }

    /// Position within the fixed cycle, used for ordering scheduled events.
    pub fn cycle_position(self) -> u32 {
        match self {
            Season::Kharif => 0,
            Season::Rabi => 1,
            Season::Zaid => 2,
            Season::OffSeason => 3,
        }
    }
}

impl std::fmt::Display for Season {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Season::Kharif => "Kharif",
            Season::Rabi => "Rabi",
            Season::Zaid => "Zaid",
            Season::OffSeason => "Off-season",
        };
        write!(f, "{name}")
    }
}

/// An entry on the season calendar. Owned exclusively by `SeasonState`:
/// created via scheduling, marked completed when its day arrives, purged at
/// season rollover unless recurring (then reset to pending).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduledEvent {
    pub id: String,
    pub kind: String,
    pub scheduled_day: u32,
    pub scheduled_season: Season,
    #[serde(default)]
    pub payload: serde_json::Value,
    #[serde(default)]
    pub recurring: bool,
    #[serde(default)]
    pub completed: bool,
}

/// Day/season counter plus the season calendar.
///
/// Invariants: `days_remaining == SEASON_LENGTH_DAYS - day`,
/// `next_season == current.successor()`, `1 <= day <= SEASON_LENGTH_DAYS`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeasonState {
    pub current: Season,
    pub day: u32,
    pub days_remaining: u32,
    pub next_season: Season,
    #[serde(default)]
    pub scheduled_events: Vec<ScheduledEvent>,
    /// Set on the final day of a season so hosts can surface the upcoming
    /// rollover; cleared by the transition itself and by `set_season`.
    #[serde(default)]
    pub transition_pending: bool,
}

impl SeasonState {
    pub fn new(season: Season) -> Self {
        Self {
            current: season,
            day: 1,
            days_remaining: SEASON_LENGTH_DAYS - 1,
            next_season: season.successor(),
            scheduled_events: Vec::new(),
            transition_pending: false,
        }
    }
}

impl Default for SeasonState {
    fn default() -> Self {
        SeasonState::new(Season::Kharif)
    }
}
