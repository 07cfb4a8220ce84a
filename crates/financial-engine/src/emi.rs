use serde::{Deserialize, Serialize};
use sim_core::{SimError, SimResult};

/// One line of an amortization schedule. Components are rounded to two
/// decimals; the installment itself is a whole-rupee amount.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleLine {
    pub month: u32,
    pub emi_amount: f64,
    pub principal_component: f64,
    pub interest_component: f64,
    pub remaining_balance: f64,
}

/// Full repayment schedule plus totals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepaymentSchedule {
    pub emi_amount: i64,
    pub total_amount: i64,
    pub total_interest: i64,
    pub lines: Vec<ScheduleLine>,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn check_parameters(principal: i64, annual_rate_pct: f64, months: u32) -> SimResult<()> {
    if principal <= 0 {
        return Err(SimError::InvalidParameters(
            "principal must be positive".to_string(),
        ));
    }
    if annual_rate_pct < 0.0 {
        return Err(SimError::InvalidParameters(
            "annual rate must not be negative".to_string(),
        ));
    }
    if months == 0 {
        return Err(SimError::InvalidParameters(
            "duration must be at least one month".to_string(),
        ));
    }
    Ok(())
}

/// Standard reducing-balance EMI, rounded to the nearest whole rupee.
///
/// `P * r * (1+r)^n / ((1+r)^n - 1)` with `r = annual_rate / 12 / 100`;
/// zero-rate loans (some government schemes) fall back to `P / n`.
pub fn amortized_installment(principal: i64, annual_rate_pct: f64, months: u32) -> SimResult<i64> {
    check_parameters(principal, annual_rate_pct, months)?;

    if annual_rate_pct == 0.0 {
        return Ok((principal as f64 / months as f64).round() as i64);
    }

    let monthly_rate = annual_rate_pct / 100.0 / 12.0;
    let growth = (1.0 + monthly_rate).powi(months as i32);
    let emi = principal as f64 * monthly_rate * growth / (growth - 1.0);
    Ok(emi.round() as i64)
}

/// Month-by-month breakdown of a reducing-balance loan.
///
/// Each line's interest is the running balance times the monthly rate, the
/// principal component is the installment minus that interest, and the
/// balance is floored at zero to absorb rounding on the final line.
pub fn build_schedule(
    principal: i64,
    annual_rate_pct: f64,
    months: u32,
) -> SimResult<RepaymentSchedule> {
    let emi_amount = amortized_installment(principal, annual_rate_pct, months)?;
    let monthly_rate = if annual_rate_pct > 0.0 {
        annual_rate_pct / 100.0 / 12.0
    } else {
        0.0
    };

    let mut lines = Vec::with_capacity(months as usize);
    let mut remaining = principal as f64;
    for month in 1..=months {
        let interest = remaining * monthly_rate;
        let principal_component = emi_amount as f64 - interest;
        remaining = (remaining - principal_component).max(0.0);

        lines.push(ScheduleLine {
            month,
            emi_amount: emi_amount as f64,
            principal_component: round2(principal_component),
            interest_component: round2(interest),
            remaining_balance: round2(remaining),
        });
    }

    let total_amount = emi_amount * months as i64;
    Ok(RepaymentSchedule {
        emi_amount,
        total_amount,
        total_interest: total_amount - principal,
        lines,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_emi_exactness() {
        // 1 lakh at 12% over 12 months is the canonical reference case.
        assert_eq!(amortized_installment(100_000, 12.0, 12).unwrap(), 8_885);

        let schedule = build_schedule(100_000, 12.0, 12).unwrap();
        assert_eq!(schedule.emi_amount, 8_885);
        assert_eq!(schedule.total_amount, 106_620);
        assert_eq!(schedule.total_interest, 6_620);

        let first = &schedule.lines[0];
        assert_relative_eq!(first.interest_component, 1_000.0, epsilon = 0.01);
        assert_relative_eq!(first.principal_component, 7_885.0, epsilon = 0.01);
        assert_relative_eq!(first.remaining_balance, 92_115.0, epsilon = 0.01);
    }

    #[test]
    fn test_zero_rate_emi() {
        assert_eq!(amortized_installment(120_000, 0.0, 12).unwrap(), 10_000);

        let schedule = build_schedule(120_000, 0.0, 12).unwrap();
        assert_eq!(schedule.total_interest, 0);
        for line in &schedule.lines {
            assert_relative_eq!(line.interest_component, 0.0);
            assert_relative_eq!(line.principal_component, 10_000.0);
        }
        assert_relative_eq!(schedule.lines.last().unwrap().remaining_balance, 0.0);
    }

    #[test]
    fn test_final_balance_floored_at_zero() {
        let schedule = build_schedule(100_000, 12.0, 12).unwrap();
        let last = schedule.lines.last().unwrap();
        assert!(last.remaining_balance >= 0.0);
        assert!(last.remaining_balance < 1.0, "rounding residue only");
    }

    #[test]
    fn test_invalid_parameters_rejected() {
        assert!(matches!(
            amortized_installment(0, 12.0, 12),
            Err(SimError::InvalidParameters(_))
        ));
        assert!(matches!(
            amortized_installment(-5_000, 12.0, 12),
            Err(SimError::InvalidParameters(_))
        ));
        assert!(matches!(
            amortized_installment(100_000, -1.0, 12),
            Err(SimError::InvalidParameters(_))
        ));
        assert!(matches!(
            amortized_installment(100_000, 12.0, 0),
            Err(SimError::InvalidParameters(_))
        ));
        assert!(build_schedule(100_000, 12.0, 0).is_err());
    }

    #[test]
    fn test_schedule_sums_to_total() {
        let schedule = build_schedule(250_000, 7.0, 36).unwrap();
        let paid: f64 = schedule.lines.iter().map(|l| l.emi_amount).sum();
        assert_relative_eq!(paid, schedule.total_amount as f64, epsilon = 0.01);
        assert_eq!(schedule.lines.len(), 36);
    }
}
