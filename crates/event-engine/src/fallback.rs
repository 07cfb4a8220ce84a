//! Deterministic local event generator used whenever the content service is
//! unreachable. Templates carry literal costs and consequence magnitudes in
//! the canonical effect keys the consequence applier understands.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use sim_core::{
    ChoiceRequirement, EventCategory, EventChoice, EventSeverity, GameEvent, GameSnapshot, Season,
};
use uuid::Uuid;

use crate::severity::expiry_horizon;

/// Below this cash level the fallback generator produces a financial
/// emergency ahead of anything else.
pub const LOW_FUNDS_THRESHOLD: i64 = 20_000;
pub const DROUGHT_RISK_THRESHOLD: f64 = 0.5;
pub const FLOOD_RISK_THRESHOLD: f64 = 0.4;

/// Pest pressure peaks through the middle of the Kharif season.
const PEST_WINDOW: std::ops::Range<u32> = 31..90;

fn effects(pairs: &[(&str, f64)]) -> BTreeMap<String, f64> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), *v))
        .collect()
}

fn choice(id: &str, text: &str, cost: i64, consequences: BTreeMap<String, f64>) -> EventChoice {
    EventChoice {
        id: id.to_string(),
        text: text.to_string(),
        cost,
        consequences,
        requirements: Vec::new(),
    }
}

fn build_event(
    event_type: &str,
    category: EventCategory,
    severity: EventSeverity,
    title: &str,
    description: &str,
    educational_content: &str,
    choices: Vec<EventChoice>,
    now: DateTime<Utc>,
) -> GameEvent {
    GameEvent {
        id: format!("fallback_{}_{}", event_type, Uuid::new_v4().simple()),
        event_type: event_type.to_string(),
        category,
        severity,
        title: title.to_string(),
        description: description.to_string(),
        educational_content: Some(educational_content.to_string()),
        choices,
        timestamp: now,
        expires_at: now + expiry_horizon(severity),
    }
}

/// Select and build a fallback event for the given snapshot. Priority:
/// low funds, then drought risk, then flood risk, then the Kharif pest
/// window, then a generic weather advisory.
pub fn generate(snapshot: &GameSnapshot, now: DateTime<Utc>) -> GameEvent {
    if snapshot.farm.money < LOW_FUNDS_THRESHOLD {
        return financial_emergency(now);
    }
    if snapshot.weather.drought_risk > DROUGHT_RISK_THRESHOLD {
        return drought(now);
    }
    if snapshot.weather.flood_risk > FLOOD_RISK_THRESHOLD {
        return flood(now);
    }
    if snapshot.season.current == Season::Kharif && PEST_WINDOW.contains(&snapshot.season.day) {
        return pest_outbreak(now);
    }
    weather_advisory(now)
}

fn financial_emergency(now: DateTime<Utc>) -> GameEvent {
    let mut sell = choice(
        "sell_crop_early",
        "Sell crops at current market price",
        0,
        effects(&[("money_change", 40_000.0), ("yield_change", -20.0)]),
    );
    sell.requirements.push(ChoiceRequirement::HasCrops);

    build_event(
        "loan_due_emergency",
        EventCategory::FinancialCrisis,
        EventSeverity::High,
        "Loan Payment Due",
        "Your bank loan EMI of \u{20b9}15,000 is due in 3 days. Current account balance is insufficient.",
        "Managing loan repayments is critical. Consider restructuring options or emergency government schemes.",
        vec![
            sell,
            choice(
                "borrow_from_moneylender",
                "Borrow from local moneylender (36% interest)",
                0,
                effects(&[("money_change", 20_000.0), ("debt_increase", 20_000.0)]),
            ),
            choice(
                "request_loan_restructure",
                "Request bank for loan restructuring",
                0,
                effects(&[]),
            ),
        ],
        now,
    )
}

fn drought(now: DateTime<Utc>) -> GameEvent {
    build_event(
        "severe_drought",
        EventCategory::ExtremeWeather,
        EventSeverity::Critical,
        "Severe Drought Conditions",
        "Groundwater levels have dropped critically and crop yields are expected to fall sharply without intervention.",
        "Severe droughts require immediate action. Crop insurance, water harvesting, and drought-resistant varieties are essential for survival.",
        vec![
            choice(
                "drill_borewell",
                "Drill a new borewell (\u{20b9}50,000)",
                50_000,
                effects(&[("debt_increase", 50_000.0), ("survival_rate", 80.0)]),
            ),
            choice(
                "reduce_crop_area",
                "Reduce crop area by 30%",
                0,
                effects(&[("yield_change", -30.0)]),
            ),
            choice(
                "wait_and_pray",
                "Wait for rain and pray",
                0,
                effects(&[("crop_damage", 40.0)]),
            ),
        ],
        now,
    )
}

fn flood(now: DateTime<Utc>) -> GameEvent {
    build_event(
        "flood_alert",
        EventCategory::ExtremeWeather,
        EventSeverity::High,
        "Flood Alert in Your Area",
        "Heavy rainfall has caused river levels to rise. Flood warning issued for low-lying agricultural areas.",
        "Flood preparedness includes crop insurance, drainage systems, and emergency evacuation plans for livestock.",
        vec![
            choice(
                "build_drainage",
                "Build emergency drainage (\u{20b9}25,000)",
                25_000,
                effects(&[("debt_increase", 25_000.0), ("crop_damage", 10.0)]),
            ),
            choice(
                "evacuate_livestock",
                "Evacuate livestock to higher ground",
                5_000,
                effects(&[("crop_damage", 30.0)]),
            ),
            choice(
                "stay_and_protect",
                "Stay and protect the farm",
                0,
                effects(&[("crop_damage", 60.0)]),
            ),
        ],
        now,
    )
}

fn pest_outbreak(now: DateTime<Utc>) -> GameEvent {
    build_event(
        "pest_outbreak",
        EventCategory::PestCrisis,
        EventSeverity::High,
        "Major Pest Outbreak",
        "Your crops are under attack from bollworm/stem borer. The infestation is spreading rapidly across your fields.",
        "Integrated Pest Management (IPM) combines biological, cultural, and chemical controls for sustainable pest management.",
        vec![
            choice(
                "chemical_spray",
                "Emergency chemical spraying (\u{20b9}12,000)",
                12_000,
                effects(&[("pest_reduction", 90.0), ("environmental_damage", -20.0)]),
            ),
            choice(
                "ipm_approach",
                "Implement IPM strategy (\u{20b9}8,000)",
                8_000,
                effects(&[("pest_reduction", 75.0)]),
            ),
            choice(
                "accept_losses",
                "Accept losses and focus on next season",
                0,
                effects(&[("crop_damage", 60.0)]),
            ),
        ],
        now,
    )
}

fn weather_advisory(now: DateTime<Utc>) -> GameEvent {
    build_event(
        "weather_advisory",
        EventCategory::WeatherCrisis,
        EventSeverity::Low,
        "Weather Advisory",
        "The meteorological department forecasts variable conditions over the coming week. Minor precautions are recommended.",
        "Routine weather monitoring and soil moisture conservation pay off over a full season.",
        vec![
            choice(
                "mulch_fields",
                "Mulch fields to conserve moisture (\u{20b9}2,000)",
                2_000,
                effects(&[("survival_rate", 95.0)]),
            ),
            choice(
                "monitor_only",
                "Keep monitoring, take no action",
                0,
                effects(&[]),
            ),
        ],
        now,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use season_clock::set_season;
    use sim_core::GameSnapshot;

    fn snapshot() -> GameSnapshot {
        GameSnapshot::new_game("p1")
    }

    #[test]
    fn test_low_funds_takes_priority() {
        let mut snap = snapshot();
        snap.farm.money = 5_000;
        snap.weather.drought_risk = 0.9;

        let event = generate(&snap, Utc::now());
        assert_eq!(event.event_type, "loan_due_emergency");
        assert_eq!(event.category, EventCategory::FinancialCrisis);
    }

    #[test]
    fn test_drought_beats_flood() {
        let mut snap = snapshot();
        snap.weather.drought_risk = 0.6;
        snap.weather.flood_risk = 0.9;

        let event = generate(&snap, Utc::now());
        assert_eq!(event.event_type, "severe_drought");
        assert_eq!(event.severity, EventSeverity::Critical);
    }

    #[test]
    fn test_flood_at_threshold_boundary() {
        let mut snap = snapshot();
        snap.weather.flood_risk = 0.4;
        assert_eq!(generate(&snap, Utc::now()).event_type, "weather_advisory");

        snap.weather.flood_risk = 0.41;
        assert_eq!(generate(&snap, Utc::now()).event_type, "flood_alert");
    }

    #[test]
    fn test_pest_window_mid_kharif_only() {
        let mut snap = snapshot();
        set_season(&mut snap.season, Season::Kharif, 45);
        assert_eq!(generate(&snap, Utc::now()).event_type, "pest_outbreak");

        set_season(&mut snap.season, Season::Kharif, 30);
        assert_eq!(generate(&snap, Utc::now()).event_type, "weather_advisory");

        set_season(&mut snap.season, Season::Rabi, 45);
        assert_eq!(generate(&snap, Utc::now()).event_type, "weather_advisory");
    }

    #[test]
    fn test_expiry_scales_with_severity() {
        let now = Utc::now();
        let mut snap = snapshot();

        snap.weather.drought_risk = 0.9;
        let critical = generate(&snap, now);
        assert_eq!(critical.expires_at, now + chrono::Duration::days(2));

        let calm = snapshot();
        let advisory = generate(&calm, now);
        assert_eq!(advisory.expires_at, now + chrono::Duration::days(7));
    }

    #[test]
    fn test_fallback_events_carry_unique_ids_and_choices() {
        let snap = snapshot();
        let a = generate(&snap, Utc::now());
        let b = generate(&snap, Utc::now());
        assert_ne!(a.id, b.id);
        assert!(!a.choices.is_empty());
        assert!(a.educational_content.is_some());
    }
}
