//! Season Clock: the day/season counter and its transition state machine.
//!
//! Four states (one per season), a single forward transition each, traversed
//! exactly once per 120 `advance_day` calls. All operations mutate an explicit
//! `SeasonState`; nothing here does I/O.

use serde::{Deserialize, Serialize};
use sim_core::{ScheduledEvent, Season, SeasonState, SEASON_LENGTH_DAYS};

/// What a single `advance_day` call did.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdvanceReport {
    /// True when the call crossed a season boundary.
    pub season_changed: bool,
    /// Ids of scheduled events that came due on the new day.
    pub completed_events: Vec<String>,
}

/// A detected violation of the season-cycle invariants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CycleIssue {
    DayOutOfRange { day: u32 },
    DaysRemainingMismatch { expected: u32, found: u32 },
    NextSeasonMismatch { expected: Season, found: Season },
}

impl std::fmt::Display for CycleIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CycleIssue::DayOutOfRange { day } => write!(f, "day {day} outside 1..=120"),
            CycleIssue::DaysRemainingMismatch { expected, found } => {
                write!(f, "days_remaining {found}, expected {expected}")
            }
            CycleIssue::NextSeasonMismatch { expected, found } => {
                write!(f, "next_season {found}, expected {expected}")
            }
        }
    }
}

/// Advance the clock one day, rolling the season when day 120 is passed.
///
/// At rollover: completed non-recurring scheduled events are purged and
/// completed recurring ones go back to pending. On an ordinary day, scheduled
/// events matching the new (day, season) are marked completed and reported.
pub fn advance_day(state: &mut SeasonState) -> AdvanceReport {
    let mut report = AdvanceReport::default();
    state.day += 1;

    if state.day > SEASON_LENGTH_DAYS {
        state.current = state.next_season;
        state.next_season = state.current.successor();
        state.day = 1;
        state.days_remaining = SEASON_LENGTH_DAYS - 1;
        state.transition_pending = false;

        state
            .scheduled_events
            .retain(|e| e.recurring || !e.completed);
        for entry in &mut state.scheduled_events {
            entry.completed = false;
        }

        tracing::debug!(season = %state.current, "season rollover");
        report.season_changed = true;
        return report;
    }

    state.days_remaining = SEASON_LENGTH_DAYS - state.day;
    if state.day == SEASON_LENGTH_DAYS {
        state.transition_pending = true;
    }

    for entry in &mut state.scheduled_events {
        if !entry.completed
            && entry.scheduled_day == state.day
            && entry.scheduled_season == state.current
        {
            entry.completed = true;
            report.completed_events.push(entry.id.clone());
        }
    }

    report
}

/// Administrative override used for corrective resets. Clamps the day into
/// bounds and recomputes the derived fields.
pub fn set_season(state: &mut SeasonState, season: Season, day: u32) {
    state.current = season;
    state.day = day.clamp(1, SEASON_LENGTH_DAYS);
    state.days_remaining = SEASON_LENGTH_DAYS - state.day;
    state.next_season = season.successor();
    state.transition_pending = false;
}

/// Upsert a calendar entry, keeping the list ordered by
/// (cycle position of season, day). Entries with an out-of-range day are
/// dropped without error.
pub fn schedule_event(state: &mut SeasonState, event: ScheduledEvent) {
    if event.scheduled_day < 1 || event.scheduled_day > SEASON_LENGTH_DAYS {
        tracing::warn!(
            id = %event.id,
            day = event.scheduled_day,
            "rejecting scheduled event with out-of-range day"
        );
        return;
    }

    if let Some(existing) = state
        .scheduled_events
        .iter_mut()
        .find(|e| e.id == event.id)
    {
        *existing = event;
    } else {
        state.scheduled_events.push(event);
    }

    state
        .scheduled_events
        .sort_by_key(|e| (e.scheduled_season.cycle_position(), e.scheduled_day));
}

/// Check the cycle invariants without mutating anything.
pub fn validate(state: &SeasonState) -> Vec<CycleIssue> {
    let mut issues = Vec::new();

    if state.day < 1 || state.day > SEASON_LENGTH_DAYS {
        issues.push(CycleIssue::DayOutOfRange { day: state.day });
    } else {
        let expected = SEASON_LENGTH_DAYS - state.day;
        if state.days_remaining != expected {
            issues.push(CycleIssue::DaysRemainingMismatch {
                expected,
                found: state.days_remaining,
            });
        }
    }

    let expected_next = state.current.successor();
    if state.next_season != expected_next {
        issues.push(CycleIssue::NextSeasonMismatch {
            expected: expected_next,
            found: state.next_season,
        });
    }

    issues
}

/// Idempotent repair for externally loaded snapshots: clamps the day,
/// recomputes `days_remaining` and `next_season`. Returns the issues that
/// were present before repair.
pub fn repair(state: &mut SeasonState) -> Vec<CycleIssue> {
    let issues = validate(state);
    if !issues.is_empty() {
        for issue in &issues {
            tracing::warn!(%issue, "repairing season state");
        }
        state.day = state.day.clamp(1, SEASON_LENGTH_DAYS);
        state.days_remaining = SEASON_LENGTH_DAYS - state.day;
        state.next_season = state.current.successor();
    }
    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn calendar_entry(id: &str, day: u32, season: Season, recurring: bool) -> ScheduledEvent {
        ScheduledEvent {
            id: id.to_string(),
            kind: "test".to_string(),
            scheduled_day: day,
            scheduled_season: season,
            payload: json!({}),
            recurring,
            completed: false,
        }
    }

    #[test]
    fn test_advance_increments_day_and_days_remaining() {
        let mut state = SeasonState::new(Season::Kharif);
        let report = advance_day(&mut state);

        assert!(!report.season_changed);
        assert_eq!(state.day, 2);
        assert_eq!(state.days_remaining, 118);
        assert!(validate(&state).is_empty());
    }

    #[test]
    fn test_seasonal_cycle_consistency_from_any_start() {
        for &season in &Season::CYCLE {
            for start_day in [1u32, 17, 59, 60, 100, 119, 120] {
                let mut state = SeasonState::new(season);
                set_season(&mut state, season, start_day);

                let advances = SEASON_LENGTH_DAYS - start_day + 1;
                let mut changed = false;
                for _ in 0..advances {
                    changed = advance_day(&mut state).season_changed;
                }

                assert!(changed, "last advance must roll the season");
                assert_eq!(state.current, season.successor());
                assert_eq!(state.day, 1);
                assert_eq!(state.days_remaining, 119);
                assert!(validate(&state).is_empty());
            }
        }
    }

    #[test]
    fn test_full_cycle_closure() {
        for &season in &Season::CYCLE {
            let mut state = SeasonState::new(season);
            let mut transitions = 0;
            while transitions < 4 {
                if advance_day(&mut state).season_changed {
                    transitions += 1;
                }
            }
            assert_eq!(state.current, season);
        }
    }

    #[test]
    fn test_validation_accepts_consistent_states() {
        for &season in &Season::CYCLE {
            for day in 1..=SEASON_LENGTH_DAYS {
                let mut state = SeasonState::new(season);
                set_season(&mut state, season, day);
                assert!(validate(&state).is_empty(), "{season} day {day}");
            }
        }
    }

    #[test]
    fn test_repair_fixes_out_of_range_day() {
        let mut state = SeasonState::new(Season::Rabi);
        state.day = 500;
        state.days_remaining = 99;
        state.next_season = Season::Rabi;

        let issues = repair(&mut state);
        assert_eq!(issues.len(), 2);
        assert_eq!(state.day, 120);
        assert_eq!(state.days_remaining, 0);
        assert_eq!(state.next_season, Season::Zaid);

        // Idempotent: a second pass finds nothing.
        assert!(repair(&mut state).is_empty());
    }

    #[test]
    fn test_transition_pending_flag() {
        let mut state = SeasonState::new(Season::Zaid);
        set_season(&mut state, Season::Zaid, 119);

        advance_day(&mut state);
        assert!(state.transition_pending);

        advance_day(&mut state);
        assert!(!state.transition_pending);
        assert_eq!(state.current, Season::OffSeason);
    }

    #[test]
    fn test_schedule_rejects_out_of_range_day() {
        let mut state = SeasonState::new(Season::Kharif);
        schedule_event(&mut state, calendar_entry("bad", 0, Season::Kharif, false));
        schedule_event(&mut state, calendar_entry("worse", 121, Season::Kharif, false));
        assert!(state.scheduled_events.is_empty());
    }

    #[test]
    fn test_schedule_upserts_and_orders_by_cycle_position_then_day() {
        let mut state = SeasonState::new(Season::Kharif);
        schedule_event(&mut state, calendar_entry("c", 5, Season::Zaid, false));
        schedule_event(&mut state, calendar_entry("a", 90, Season::Kharif, false));
        schedule_event(&mut state, calendar_entry("b", 10, Season::Rabi, false));

        let order: Vec<&str> = state
            .scheduled_events
            .iter()
            .map(|e| e.id.as_str())
            .collect();
        assert_eq!(order, vec!["a", "b", "c"]);

        // Upsert by id moves the entry, never duplicates it.
        schedule_event(&mut state, calendar_entry("c", 2, Season::Kharif, false));
        assert_eq!(state.scheduled_events.len(), 3);
        assert_eq!(state.scheduled_events[0].id, "c");
    }

    #[test]
    fn test_due_events_marked_completed_and_reported() {
        let mut state = SeasonState::new(Season::Kharif);
        schedule_event(&mut state, calendar_entry("sow", 2, Season::Kharif, false));
        schedule_event(&mut state, calendar_entry("later", 2, Season::Rabi, false));

        let report = advance_day(&mut state);
        assert_eq!(report.completed_events, vec!["sow".to_string()]);
        assert!(state.scheduled_events.iter().any(|e| e.id == "sow" && e.completed));
        assert!(state.scheduled_events.iter().any(|e| e.id == "later" && !e.completed));
    }

    #[test]
    fn test_rollover_purges_completed_and_resets_recurring() {
        let mut state = SeasonState::new(Season::Kharif);
        schedule_event(&mut state, calendar_entry("once", 3, Season::Kharif, false));
        schedule_event(&mut state, calendar_entry("every", 3, Season::Kharif, true));
        set_season(&mut state, Season::Kharif, 2);

        advance_day(&mut state);
        assert!(state.scheduled_events.iter().all(|e| e.completed));

        set_season(&mut state, Season::Kharif, 120);
        let report = advance_day(&mut state);
        assert!(report.season_changed);

        assert_eq!(state.scheduled_events.len(), 1);
        let survivor = &state.scheduled_events[0];
        assert_eq!(survivor.id, "every");
        assert!(!survivor.completed);
    }
}
