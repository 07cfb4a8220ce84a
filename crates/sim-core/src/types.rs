use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::season::SeasonState;

/// Credit score bounds. Scores are mutated only through the credit update
/// function and clamped into this range.
pub const CREDIT_SCORE_MIN: i32 = 300;
pub const CREDIT_SCORE_MAX: i32 = 850;

/// A planted crop on the farm.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CropState {
    pub name: String,
    pub growth_stage: String,
    /// 0..=100
    pub health: f64,
    /// Expected yield in quintals at harvest.
    pub expected_yield: f64,
}

/// A piece of farm equipment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EquipmentState {
    pub kind: String,
    /// 0..=100
    pub condition: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FarmState {
    /// Cash on hand in whole rupees.
    pub money: i64,
    /// Land holding in hectares.
    pub land_area: f64,
    /// 0..=100
    pub soil_quality: f64,
    pub crops: Vec<CropState>,
    #[serde(default)]
    pub harvested_crops: Vec<String>,
    pub equipment: Vec<EquipmentState>,
}

/// Credit channel a loan was drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoanChannel {
    /// Bank credit (Kisan Credit Card).
    Institutional,
    /// Local moneylender.
    Informal,
    /// Government scheme credit.
    Subsidized,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoanStatus {
    Active,
    Defaulted,
    Paid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Loan {
    pub id: String,
    pub channel: LoanChannel,
    pub principal: i64,
    pub annual_rate_pct: f64,
    /// Fixed monthly installment in whole rupees.
    pub monthly_installment: i64,
    /// Total amount still payable (principal plus interest).
    pub remaining_amount: i64,
    pub start_day: u32,
    pub next_installment_day: u32,
    pub missed_payments: u32,
    pub status: LoanStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    LoanDisbursement,
    InstallmentPayment,
    PenaltyCharge,
    SchemeBenefit,
    EventExpense,
    EventIncome,
}

/// Ledger entry. Amounts are signed: credits positive, debits negative.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub kind: TransactionKind,
    pub amount: i64,
    pub day: u32,
    pub description: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EconomicsState {
    pub bank_balance: i64,
    pub loans: Vec<Loan>,
    pub credit_score: i32,
    pub transactions: Vec<Transaction>,
    #[serde(default)]
    pub has_insurance: bool,
    #[serde(default)]
    pub applied_schemes: Vec<String>,
}

/// Risk indicators consumed by event generation. Produced by the host's
/// weather model; this engine only reads them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WeatherIndicators {
    #[serde(default)]
    pub conditions: String,
    /// 0.0..=1.0
    pub drought_risk: f64,
    /// 0.0..=1.0
    pub flood_risk: f64,
}

/// Per-topic educational progress, driven by event resolutions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TopicProgress {
    pub events_experienced: u32,
    pub lessons_learned: Vec<String>,
    /// Derived 0..=100 score.
    pub mastery_level: u32,
}

/// The complete per-player game snapshot. Every engine operation is a pure
/// or near-pure function over one of these; there are no ambient globals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub player_id: String,
    /// Days elapsed since game start, across season boundaries.
    pub total_day: u32,
    pub farm: FarmState,
    pub economics: EconomicsState,
    pub season: SeasonState,
    pub weather: WeatherIndicators,
    #[serde(default)]
    pub education: BTreeMap<String, TopicProgress>,
    #[serde(default)]
    pub selected_crop: Option<String>,
    #[serde(default)]
    pub last_saved: Option<DateTime<Utc>>,
}

impl GameSnapshot {
    /// Fresh snapshot for a new game.
    pub fn new_game(player_id: &str) -> Self {
        Self {
            player_id: player_id.to_string(),
            total_day: 1,
            farm: FarmState {
                money: 50_000,
                land_area: 1.5,
                soil_quality: 70.0,
                crops: Vec::new(),
                harvested_crops: Vec::new(),
                equipment: Vec::new(),
            },
            economics: EconomicsState {
                bank_balance: 0,
                loans: Vec::new(),
                credit_score: 650,
                transactions: Vec::new(),
                has_insurance: false,
                applied_schemes: Vec::new(),
            },
            season: SeasonState::default(),
            weather: WeatherIndicators::default(),
            education: BTreeMap::new(),
            selected_crop: None,
            last_saved: None,
        }
    }
}
