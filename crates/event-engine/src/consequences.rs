//! Pure application of resolved consequences to a snapshot. Given the same
//! inputs this always produces the same output; no hidden counters.

use sim_core::{GameSnapshot, ResolvedConsequences, TopicProgress};

/// Health never drops below this share of 20 points under a survival effect.
const SURVIVAL_HEALTH_FLOOR: f64 = 20.0;
const PEST_RECOVERY_POINTS: f64 = 30.0;
const CRISIS_MASTERY_BONUS: u32 = 15;

/// Produce a new snapshot with the consequences folded in. Named effects are
/// applied only when present; unknown effect names are ignored. Educational
/// bookkeeping always runs.
pub fn apply_consequences(
    consequences: &ResolvedConsequences,
    snapshot: &GameSnapshot,
) -> GameSnapshot {
    let mut next = snapshot.clone();

    for effects in [
        &consequences.immediate_effects,
        &consequences.long_term_effects,
    ] {
        for (name, &value) in effects {
            apply_effect(&mut next, name, value);
        }
    }

    record_educational_impact(&mut next, consequences);
    next
}

fn apply_effect(snapshot: &mut GameSnapshot, name: &str, value: f64) {
    match name {
        "money_change" => {
            snapshot.farm.money += value as i64;
        }
        // A liability draw against the bank, deliberately not a Loan record;
        // changing this would change observable financial totals.
        "debt_increase" => {
            snapshot.economics.bank_balance -= value as i64;
        }
        "yield_change" => {
            for crop in &mut snapshot.farm.crops {
                crop.expected_yield *= 1.0 + value / 100.0;
            }
        }
        "crop_damage" => {
            for crop in &mut snapshot.farm.crops {
                crop.health = (crop.health - value).max(0.0);
                crop.expected_yield *= 1.0 - value / 100.0;
            }
        }
        "survival_rate" => {
            let rate = value / 100.0;
            for crop in &mut snapshot.farm.crops {
                crop.expected_yield *= rate;
                crop.health = crop.health.max(SURVIVAL_HEALTH_FLOOR * rate);
            }
        }
        "pest_reduction" => {
            for crop in &mut snapshot.farm.crops {
                crop.health = (crop.health + value / 100.0 * PEST_RECOVERY_POINTS).min(100.0);
            }
        }
        "equipment_status" => {
            for equipment in &mut snapshot.farm.equipment {
                equipment.condition = (equipment.condition * value / 100.0).min(100.0);
            }
        }
        "environmental_damage" => {
            snapshot.farm.soil_quality = (snapshot.farm.soil_quality + value).max(0.0);
        }
        _ => {
            tracing::debug!(effect = name, value, "unmapped consequence effect");
        }
    }
}

fn record_educational_impact(snapshot: &mut GameSnapshot, consequences: &ResolvedConsequences) {
    let impact = &consequences.educational_impact;
    let progress = snapshot
        .education
        .entry(impact.topic.clone())
        .or_insert_with(TopicProgress::default);

    progress.events_experienced += 1;
    if !impact.lesson_learned.is_empty()
        && !progress.lessons_learned.contains(&impact.lesson_learned)
    {
        progress.lessons_learned.push(impact.lesson_learned.clone());
    }

    let mut mastery =
        (progress.events_experienced * 10 + progress.lessons_learned.len() as u32 * 5).min(100);
    if impact.crisis_experience {
        mastery = (mastery + CRISIS_MASTERY_BONUS).min(100);
    }
    progress.mastery_level = mastery;
}
