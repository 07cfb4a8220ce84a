use chrono::Utc;
use serde::{Deserialize, Serialize};
use sim_core::{
    Loan, LoanChannel, LoanStatus, SimError, SimResult, Transaction, TransactionKind,
};
use uuid::Uuid;

use crate::credit::{update_credit_score, PaymentOutcome};
use crate::emi::amortized_installment;
use crate::offers::LoanOffer;

/// Days between installments.
pub const INSTALLMENT_PERIOD_DAYS: u32 = 30;
/// A loan defaults once this many installments have been missed.
pub const DEFAULT_AFTER_MISSED: u32 = 3;

/// Ledger-entry constructor; the only place transaction ids are minted.
pub fn new_transaction(
    kind: TransactionKind,
    amount: i64,
    day: u32,
    description: impl Into<String>,
) -> Transaction {
    Transaction {
        id: Uuid::new_v4().to_string(),
        kind,
        amount,
        day,
        description: description.into(),
        timestamp: Utc::now(),
    }
}

/// Validate a loan request against an offer and construct the loan record
/// plus its disbursement transaction. The first installment falls due one
/// period after the start day; the remaining amount starts at the full
/// payable total so that exactly `months` installments retire it.
pub fn apply_for_loan(
    offer: &LoanOffer,
    principal: i64,
    months: u32,
    start_day: u32,
) -> SimResult<(Loan, Transaction)> {
    if principal > offer.max_amount {
        return Err(SimError::NotEligible(format!(
            "requested \u{20b9}{} exceeds the {} ceiling of \u{20b9}{}",
            principal, offer.name, offer.max_amount
        )));
    }
    if months > offer.max_duration_months {
        return Err(SimError::NotEligible(format!(
            "requested term of {} months exceeds the {} maximum of {} months",
            months, offer.name, offer.max_duration_months
        )));
    }

    let monthly_installment = amortized_installment(principal, offer.annual_rate_pct, months)?;
    let loan = Loan {
        id: Uuid::new_v4().to_string(),
        channel: offer.channel,
        principal,
        annual_rate_pct: offer.annual_rate_pct,
        monthly_installment,
        remaining_amount: monthly_installment * months as i64,
        start_day,
        next_installment_day: start_day + INSTALLMENT_PERIOD_DAYS,
        missed_payments: 0,
        status: LoanStatus::Active,
    };

    let disbursement = new_transaction(
        TransactionKind::LoanDisbursement,
        principal,
        start_day,
        format!("{} disbursement", offer.name),
    );

    tracing::info!(loan_id = %loan.id, channel = ?loan.channel, principal, "loan created");
    Ok((loan, disbursement))
}

/// Late-payment penalty: a channel-specific fraction of the remaining
/// balance, prorated per day late. Lateness tiering: the subsidized channel's
/// multiplier doubles past 30 days; the informal channel's halves within the
/// first week.
pub fn penalty(remaining: i64, days_late: u32, channel: LoanChannel) -> f64 {
    let monthly_rate = match channel {
        LoanChannel::Institutional => 0.02,
        LoanChannel::Informal => 0.05,
        LoanChannel::Subsidized => 0.01,
    };
    let tier_multiplier = match channel {
        LoanChannel::Subsidized if days_late > 30 => 2.0,
        LoanChannel::Informal if days_late <= 7 => 0.5,
        _ => 1.0,
    };
    let raw = remaining as f64 * (monthly_rate / 30.0) * days_late as f64 * tier_multiplier;
    (raw * 100.0).round() / 100.0
}

/// Result of one installment-processing pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstallmentOutcome {
    pub loans: Vec<Loan>,
    pub cash: i64,
    pub credit_score: i32,
    pub transactions: Vec<Transaction>,
}

/// Process every active loan whose installment is due.
///
/// Paid installments reduce the balance, push the due date out one period and
/// earn an on-time credit update. Unpayable installments add the late penalty
/// to the balance, count a missed payment (default at three) and take the
/// missed-payment credit hit. The due date advances either way so one shortfall
/// is penalized once per period, not once per call.
pub fn installment_cycle(
    loans: &[Loan],
    today: u32,
    available_cash: i64,
    credit_score: i32,
) -> InstallmentOutcome {
    let mut cash = available_cash;
    let mut score = credit_score;
    let mut transactions = Vec::new();
    let mut updated: Vec<Loan> = loans.to_vec();

    for loan in &mut updated {
        if loan.status != LoanStatus::Active || loan.next_installment_day > today {
            continue;
        }

        let installment = loan.monthly_installment;
        if cash >= installment {
            cash -= installment;
            loan.remaining_amount = (loan.remaining_amount - installment).max(0);
            loan.next_installment_day += INSTALLMENT_PERIOD_DAYS;
            score = update_credit_score(score, PaymentOutcome::OnTime);
            if loan.remaining_amount == 0 {
                loan.status = LoanStatus::Paid;
                tracing::info!(loan_id = %loan.id, "loan fully repaid");
            }
            transactions.push(new_transaction(
                TransactionKind::InstallmentPayment,
                -installment,
                today,
                format!("Installment on loan {}", loan.id),
            ));
        } else {
            let days_late = today.saturating_sub(loan.next_installment_day).max(1);
            let fine = penalty(loan.remaining_amount, days_late, loan.channel).round() as i64;
            loan.remaining_amount += fine;
            loan.missed_payments += 1;
            loan.next_installment_day += INSTALLMENT_PERIOD_DAYS;
            score = update_credit_score(score, PaymentOutcome::Missed);
            if loan.missed_payments >= DEFAULT_AFTER_MISSED {
                loan.status = LoanStatus::Defaulted;
                tracing::warn!(loan_id = %loan.id, "loan defaulted after {} missed payments", loan.missed_payments);
            }
            // The fine lands on the outstanding balance; no cash moves, so
            // the ledger entry carries a zero amount.
            transactions.push(new_transaction(
                TransactionKind::PenaltyCharge,
                0,
                today,
                format!(
                    "Late-payment penalty of \u{20b9}{fine} added to loan {}",
                    loan.id
                ),
            ));
        }
    }

    InstallmentOutcome {
        loans: updated,
        cash,
        credit_score: score,
        transactions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::offers::loan_offers;
    use approx::assert_relative_eq;

    fn institutional_offer() -> LoanOffer {
        loan_offers(700, true, 1.0)
            .into_iter()
            .find(|o| o.channel == LoanChannel::Institutional)
            .unwrap()
    }

    #[test]
    fn test_apply_for_loan_builds_record_and_disbursement() {
        let offer = institutional_offer();
        let (loan, tx) = apply_for_loan(&offer, 100_000, 12, 10).unwrap();

        // 7% over 12 months on 1 lakh.
        assert_eq!(loan.monthly_installment, 8_653);
        assert_eq!(loan.remaining_amount, 8_653 * 12);
        assert_eq!(loan.next_installment_day, 40);
        assert_eq!(loan.status, LoanStatus::Active);
        assert_eq!(tx.kind, TransactionKind::LoanDisbursement);
        assert_eq!(tx.amount, 100_000);
    }

    #[test]
    fn test_apply_rejects_over_ceiling() {
        let offer = institutional_offer();
        assert!(matches!(
            apply_for_loan(&offer, 600_000, 12, 1),
            Err(SimError::NotEligible(_))
        ));
        assert!(matches!(
            apply_for_loan(&offer, 100_000, 72, 1),
            Err(SimError::NotEligible(_))
        ));
    }

    #[test]
    fn test_penalty_channel_rates_and_tiering() {
        // Base: remaining * monthly/30 * days.
        assert_relative_eq!(
            penalty(90_000, 15, LoanChannel::Institutional),
            90_000.0 * (0.02 / 30.0) * 15.0,
            epsilon = 0.01
        );
        // Subsidized doubles past 30 days late.
        assert_relative_eq!(
            penalty(90_000, 31, LoanChannel::Subsidized),
            90_000.0 * (0.01 / 30.0) * 31.0 * 2.0,
            epsilon = 0.01
        );
        assert_relative_eq!(
            penalty(90_000, 30, LoanChannel::Subsidized),
            90_000.0 * (0.01 / 30.0) * 30.0,
            epsilon = 0.01
        );
        // Informal halves within the first week.
        assert_relative_eq!(
            penalty(90_000, 7, LoanChannel::Informal),
            90_000.0 * (0.05 / 30.0) * 7.0 * 0.5,
            epsilon = 0.01
        );
        assert_relative_eq!(
            penalty(90_000, 8, LoanChannel::Informal),
            90_000.0 * (0.05 / 30.0) * 8.0,
            epsilon = 0.01
        );
    }

    #[test]
    fn test_installment_cycle_pays_due_loan() {
        let offer = institutional_offer();
        let (loan, _) = apply_for_loan(&offer, 100_000, 12, 0).unwrap();
        let outcome = installment_cycle(&[loan.clone()], 30, 50_000, 700);

        assert_eq!(outcome.cash, 50_000 - loan.monthly_installment);
        assert_eq!(outcome.credit_score, 702);
        let paid = &outcome.loans[0];
        assert_eq!(
            paid.remaining_amount,
            loan.remaining_amount - loan.monthly_installment
        );
        assert_eq!(paid.next_installment_day, 60);
        assert_eq!(outcome.transactions.len(), 1);
        assert_eq!(
            outcome.transactions[0].kind,
            TransactionKind::InstallmentPayment
        );
    }

    #[test]
    fn test_installment_cycle_ignores_undue_loans() {
        let offer = institutional_offer();
        let (loan, _) = apply_for_loan(&offer, 100_000, 12, 0).unwrap();
        let outcome = installment_cycle(&[loan], 15, 50_000, 700);
        assert_eq!(outcome.cash, 50_000);
        assert!(outcome.transactions.is_empty());
        assert_eq!(outcome.credit_score, 700);
    }

    #[test]
    fn test_missed_payments_penalize_and_default_at_three() {
        let offer = institutional_offer();
        let (mut loan, _) = apply_for_loan(&offer, 100_000, 12, 0).unwrap();
        let mut score = 700;

        for cycle in 1..=3u32 {
            let before = loan.remaining_amount;
            let outcome = installment_cycle(&[loan.clone()], cycle * 30, 0, score);
            loan = outcome.loans[0].clone();
            score = outcome.credit_score;

            assert!(loan.remaining_amount > before, "penalty added to balance");
            assert_eq!(loan.missed_payments, cycle);

            // The penalty is a liability adjustment, not a cash movement.
            assert_eq!(outcome.cash, 0);
            assert_eq!(outcome.transactions.len(), 1);
            assert_eq!(outcome.transactions[0].kind, TransactionKind::PenaltyCharge);
            assert_eq!(outcome.transactions[0].amount, 0);
        }

        assert_eq!(loan.status, LoanStatus::Defaulted);
        assert_eq!(score, 700 - 25 * 3);
    }

    #[test]
    fn test_loan_paid_after_full_term() {
        let offer = institutional_offer();
        let (mut loan, _) = apply_for_loan(&offer, 12_000, 12, 0).unwrap();
        let mut cash = 100_000;

        for cycle in 1..=12u32 {
            let outcome = installment_cycle(&[loan.clone()], cycle * 30, cash, 700);
            loan = outcome.loans[0].clone();
            cash = outcome.cash;
        }

        assert_eq!(loan.status, LoanStatus::Paid);
        assert_eq!(loan.remaining_amount, 0);
    }
}
