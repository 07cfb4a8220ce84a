use serde::{Deserialize, Serialize};
use sim_core::{SimError, SimResult};

/// PM-KISAN is restricted to small/marginal holdings.
pub const PM_KISAN_MAX_LAND_HA: f64 = 2.0;
/// Annual PM-KISAN income support.
pub const PM_KISAN_BENEFIT: i64 = 6_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemeCategory {
    IncomeSupport,
    Insurance,
    CreditFacility,
    Subsidy,
    Service,
}

/// Catalog entry for a government scheme.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemeInfo {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: SchemeCategory,
    /// Fixed amount credited on approval; zero for non-monetary schemes.
    pub benefit_amount: i64,
    pub processing_days: u32,
    pub requirements: Vec<String>,
}

/// Eligibility inputs for offers and schemes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FarmerProfile {
    pub land_area: f64,
    pub has_insurance: bool,
}

/// Outcome of an approved scheme application.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemeBenefit {
    pub scheme_id: String,
    pub amount_credited: i64,
    pub insurance_granted: bool,
    pub processing_days: u32,
}

/// Filter the scheme catalog by the farmer's profile.
pub fn eligible_schemes(profile: &FarmerProfile) -> Vec<SchemeInfo> {
    let mut schemes = Vec::new();

    if profile.land_area <= PM_KISAN_MAX_LAND_HA {
        schemes.push(SchemeInfo {
            id: "pm-kisan".to_string(),
            name: "PM-KISAN".to_string(),
            description: format!(
                "Direct income support of \u{20b9}{PM_KISAN_BENEFIT} per year to small and marginal farmers"
            ),
            category: SchemeCategory::IncomeSupport,
            benefit_amount: PM_KISAN_BENEFIT,
            processing_days: 30,
            requirements: vec![
                "Land holding up to 2 hectares".to_string(),
                "Valid Aadhaar card".to_string(),
                "Bank account linked to Aadhaar".to_string(),
            ],
        });
    }

    if !profile.has_insurance {
        schemes.push(SchemeInfo {
            id: "pmfby".to_string(),
            name: "Pradhan Mantri Fasal Bima Yojana".to_string(),
            description:
                "Comprehensive crop insurance covering yield losses due to natural calamities"
                    .to_string(),
            category: SchemeCategory::Insurance,
            benefit_amount: 0,
            processing_days: 7,
            requirements: vec![
                "Farmer with insurable interest in crop".to_string(),
                "Valid land documents".to_string(),
            ],
        });
    }

    schemes.push(SchemeInfo {
        id: "interest-subvention".to_string(),
        name: "Interest Subvention Scheme".to_string(),
        description: "Interest subsidy on crop loans up to \u{20b9}3 lakh at 7% interest rate"
            .to_string(),
        category: SchemeCategory::Subsidy,
        benefit_amount: 0,
        processing_days: 0,
        requirements: vec![
            "Crop loan from scheduled commercial bank".to_string(),
            "Timely repayment within due date".to_string(),
        ],
    });

    schemes.push(SchemeInfo {
        id: "soil-health-card".to_string(),
        name: "Soil Health Card Scheme".to_string(),
        description: "Free soil testing and nutrient recommendations for optimal crop yield"
            .to_string(),
        category: SchemeCategory::Service,
        benefit_amount: 0,
        processing_days: 15,
        requirements: vec![
            "Any farmer with cultivable land".to_string(),
            "Valid land documents".to_string(),
        ],
    });

    schemes
}

/// Apply for a scheme. Eligible applications are approved deterministically
/// and credit the catalog benefit; ineligible ones come back as a structured
/// `NotEligible` refusal with the stated reason.
pub fn apply_scheme(scheme_id: &str, profile: &FarmerProfile) -> SimResult<SchemeBenefit> {
    match scheme_id {
        "pm-kisan" => {
            if profile.land_area > PM_KISAN_MAX_LAND_HA {
                return Err(SimError::NotEligible(
                    "Land holding exceeds 2 hectares limit for PM-KISAN".to_string(),
                ));
            }
            Ok(SchemeBenefit {
                scheme_id: scheme_id.to_string(),
                amount_credited: PM_KISAN_BENEFIT,
                insurance_granted: false,
                processing_days: 30,
            })
        }
        "pmfby" => {
            if profile.has_insurance {
                return Err(SimError::NotEligible(
                    "Crop insurance cover already in force".to_string(),
                ));
            }
            Ok(SchemeBenefit {
                scheme_id: scheme_id.to_string(),
                amount_credited: 0,
                insurance_granted: true,
                processing_days: 7,
            })
        }
        "interest-subvention" => Ok(SchemeBenefit {
            scheme_id: scheme_id.to_string(),
            amount_credited: 0,
            insurance_granted: false,
            processing_days: 0,
        }),
        "soil-health-card" => Ok(SchemeBenefit {
            scheme_id: scheme_id.to_string(),
            amount_credited: 0,
            insurance_granted: false,
            processing_days: 15,
        }),
        other => Err(SimError::NotFound(format!("unknown scheme: {other}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_farmer() -> FarmerProfile {
        FarmerProfile {
            land_area: 1.5,
            has_insurance: false,
        }
    }

    #[test]
    fn test_catalog_filters_by_profile() {
        let ids: Vec<String> = eligible_schemes(&small_farmer())
            .into_iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(
            ids,
            vec!["pm-kisan", "pmfby", "interest-subvention", "soil-health-card"]
        );

        let large_insured = FarmerProfile {
            land_area: 4.0,
            has_insurance: true,
        };
        let ids: Vec<String> = eligible_schemes(&large_insured)
            .into_iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(ids, vec!["interest-subvention", "soil-health-card"]);
    }

    #[test]
    fn test_pm_kisan_credits_fixed_benefit() {
        let benefit = apply_scheme("pm-kisan", &small_farmer()).unwrap();
        assert_eq!(benefit.amount_credited, PM_KISAN_BENEFIT);
        assert!(!benefit.insurance_granted);
    }

    #[test]
    fn test_pm_kisan_rejects_large_holdings() {
        let profile = FarmerProfile {
            land_area: 2.5,
            ..small_farmer()
        };
        let err = apply_scheme("pm-kisan", &profile).unwrap_err();
        assert!(matches!(err, SimError::NotEligible(_)));
        assert!(err.to_string().contains("2 hectares"));
    }

    #[test]
    fn test_pmfby_grants_insurance_once() {
        let benefit = apply_scheme("pmfby", &small_farmer()).unwrap();
        assert!(benefit.insurance_granted);

        let insured = FarmerProfile {
            has_insurance: true,
            ..small_farmer()
        };
        assert!(matches!(
            apply_scheme("pmfby", &insured),
            Err(SimError::NotEligible(_))
        ));
    }

    #[test]
    fn test_unknown_scheme_is_not_found() {
        assert!(matches!(
            apply_scheme("no-such-scheme", &small_farmer()),
            Err(SimError::NotFound(_))
        ));
    }
}
