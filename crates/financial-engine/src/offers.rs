use serde::{Deserialize, Serialize};
use sim_core::LoanChannel;

/// Minimum credit score for institutional (KCC) credit.
pub const INSTITUTIONAL_MIN_SCORE: i32 = 650;
/// Minimum credit score for subsidized scheme credit.
pub const SUBSIDIZED_MIN_SCORE: i32 = 600;
/// Subsidized credit is reserved for small/marginal holdings.
pub const SUBSIDIZED_MAX_LAND_HA: f64 = 2.0;

/// An entry in the fixed credit-channel catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanOffer {
    pub channel: LoanChannel,
    pub name: String,
    pub max_amount: i64,
    pub annual_rate_pct: f64,
    pub max_duration_months: u32,
    pub processing_days: u32,
    pub collateral_required: bool,
    pub requirements: Vec<String>,
}

/// Filter the channel catalog by eligibility.
///
/// Institutional credit needs a 650+ score and a larger ceiling with
/// collateral; the informal lender is always on the table (highest rate,
/// fastest processing); subsidized credit needs a 600+ score and a small
/// holding. Thresholds and amounts are catalog data, not engine logic.
pub fn loan_offers(credit_score: i32, has_collateral: bool, land_area: f64) -> Vec<LoanOffer> {
    let mut offers = Vec::new();

    if credit_score >= INSTITUTIONAL_MIN_SCORE {
        let max_amount = if has_collateral { 500_000 } else { 200_000 };
        offers.push(LoanOffer {
            channel: LoanChannel::Institutional,
            name: "Kisan Credit Card (KCC)".to_string(),
            max_amount,
            annual_rate_pct: 7.0,
            max_duration_months: 60,
            processing_days: 7,
            collateral_required: true,
            requirements: vec![
                "Valid land documents".to_string(),
                "Aadhaar card".to_string(),
                "Bank account".to_string(),
                format!("Credit score >= {INSTITUTIONAL_MIN_SCORE} (Current: {credit_score})"),
            ],
        });
    }

    // Always available, no score gate.
    offers.push(LoanOffer {
        channel: LoanChannel::Informal,
        name: "Local Moneylender".to_string(),
        max_amount: 100_000,
        annual_rate_pct: 36.0,
        max_duration_months: 12,
        processing_days: 1,
        collateral_required: false,
        requirements: vec![
            "Local reference".to_string(),
            "Identity proof".to_string(),
        ],
    });

    if credit_score >= SUBSIDIZED_MIN_SCORE && land_area <= SUBSIDIZED_MAX_LAND_HA {
        offers.push(LoanOffer {
            channel: LoanChannel::Subsidized,
            name: "PM-KISAN Credit Scheme".to_string(),
            max_amount: 300_000,
            annual_rate_pct: 4.0,
            max_duration_months: 84,
            processing_days: 14,
            collateral_required: false,
            requirements: vec![
                "Small/marginal farmer certificate".to_string(),
                "Land ownership proof".to_string(),
                "Income certificate".to_string(),
                format!("Land area <= {SUBSIDIZED_MAX_LAND_HA} hectares (Current: {land_area})"),
            ],
        });
    }

    offers
}

#[cfg(test)]
mod tests {
    use super::*;

    fn channels(offers: &[LoanOffer]) -> Vec<LoanChannel> {
        offers.iter().map(|o| o.channel).collect()
    }

    #[test]
    fn test_low_score_never_gets_institutional_credit() {
        let offers = loan_offers(600, true, 1.0);
        assert!(!channels(&offers).contains(&LoanChannel::Institutional));
        assert!(channels(&offers).contains(&LoanChannel::Informal));
        assert!(channels(&offers).contains(&LoanChannel::Subsidized));
    }

    #[test]
    fn test_collateral_raises_institutional_ceiling() {
        let with = loan_offers(750, true, 1.0);
        let without = loan_offers(750, false, 1.0);

        let ceiling = |offers: &[LoanOffer]| {
            offers
                .iter()
                .find(|o| o.channel == LoanChannel::Institutional)
                .map(|o| o.max_amount)
                .unwrap()
        };
        assert_eq!(ceiling(&with), 500_000);
        assert_eq!(ceiling(&without), 200_000);
        assert!(ceiling(&with) > ceiling(&without));
    }

    #[test]
    fn test_informal_lender_present_for_every_score() {
        for score in [300, 450, 600, 650, 750, 850] {
            let offers = loan_offers(score, false, 5.0);
            let informal = offers
                .iter()
                .find(|o| o.channel == LoanChannel::Informal)
                .expect("informal offer always present");
            assert_eq!(informal.annual_rate_pct, 36.0);
            assert_eq!(informal.processing_days, 1);
        }
    }

    #[test]
    fn test_subsidized_gated_on_score_and_land() {
        assert!(!channels(&loan_offers(599, false, 1.0)).contains(&LoanChannel::Subsidized));
        assert!(!channels(&loan_offers(700, false, 2.5)).contains(&LoanChannel::Subsidized));

        let offers = loan_offers(600, false, 2.0);
        let subsidized = offers
            .iter()
            .find(|o| o.channel == LoanChannel::Subsidized)
            .unwrap();
        assert_eq!(subsidized.annual_rate_pct, 4.0);
        assert_eq!(subsidized.max_amount, 300_000);
    }
}
