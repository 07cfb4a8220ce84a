use serde::{Deserialize, Serialize};
use sim_core::{CREDIT_SCORE_MAX, CREDIT_SCORE_MIN};

/// How an installment was (or was not) paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PaymentOutcome {
    OnTime,
    Late { days_late: u32 },
    Missed,
}

/// Credit-score update: +2 on time, -5 late (-15 past 30 days), -25 missed.
/// The result is always clamped into [300, 850]. This is the only function
/// allowed to move a credit score.
pub fn update_credit_score(current: i32, outcome: PaymentOutcome) -> i32 {
    let delta = match outcome {
        PaymentOutcome::OnTime => 2,
        PaymentOutcome::Late { days_late } => {
            if days_late <= 30 {
                -5
            } else {
                -15
            }
        }
        PaymentOutcome::Missed => -25,
    };
    (current + delta).clamp(CREDIT_SCORE_MIN, CREDIT_SCORE_MAX)
}
