use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use financial_engine::{
    apply_for_loan, apply_scheme, build_schedule, eligible_schemes, installment_cycle, loan_offers,
    new_transaction, FarmerProfile, InstallmentOutcome, LoanOffer, RepaymentSchedule, SchemeBenefit,
    SchemeInfo,
};
use serde::{Deserialize, Serialize};
use sim_core::{Loan, LoanChannel, SimError, Transaction, TransactionKind};

use crate::{ApiResponse, AppError, AppState};

#[derive(Deserialize)]
pub struct EmiQuery {
    pub principal: i64,
    pub annual_rate_pct: f64,
    pub months: u32,
}

#[derive(Deserialize)]
pub struct OffersQuery {
    #[serde(default)]
    pub has_collateral: bool,
}

#[derive(Deserialize)]
pub struct ApplyLoanRequest {
    pub channel: LoanChannel,
    pub principal: i64,
    pub months: u32,
    #[serde(default)]
    pub has_collateral: bool,
}

#[derive(Serialize)]
pub struct ApplyLoanResponse {
    pub loan: Loan,
    pub disbursement: Transaction,
    pub money: i64,
}

#[derive(Serialize)]
pub struct SchemeApplicationResponse {
    pub benefit: SchemeBenefit,
    pub money: i64,
    pub has_insurance: bool,
}

pub fn finance_routes() -> Router<AppState> {
    Router::new()
        .route("/api/finance/emi", get(emi_schedule))
        .route("/api/players/:player_id/loans", get(list_loans))
        .route("/api/players/:player_id/loans/offers", get(list_offers))
        .route("/api/players/:player_id/loans/apply", post(apply_loan))
        .route(
            "/api/players/:player_id/loans/installments/run",
            post(run_installments),
        )
        .route("/api/players/:player_id/schemes", get(list_schemes))
        .route(
            "/api/players/:player_id/schemes/:scheme_id/apply",
            post(apply_for_scheme),
        )
}

/// Stateless amortization calculator, usable without a game session.
async fn emi_schedule(
    Query(query): Query<EmiQuery>,
) -> Result<Json<ApiResponse<RepaymentSchedule>>, AppError> {
    let schedule = build_schedule(query.principal, query.annual_rate_pct, query.months)?;
    Ok(Json(ApiResponse::success(schedule)))
}

async fn list_loans(
    State(state): State<AppState>,
    Path(player_id): Path<String>,
) -> Result<Json<ApiResponse<Vec<Loan>>>, AppError> {
    let session = state.session(&player_id);
    let session = session.lock().await;
    Ok(Json(ApiResponse::success(
        session.snapshot.economics.loans.clone(),
    )))
}

async fn list_offers(
    State(state): State<AppState>,
    Path(player_id): Path<String>,
    Query(query): Query<OffersQuery>,
) -> Result<Json<ApiResponse<Vec<LoanOffer>>>, AppError> {
    let session = state.session(&player_id);
    let session = session.lock().await;
    let snapshot = &session.snapshot;

    Ok(Json(ApiResponse::success(loan_offers(
        snapshot.economics.credit_score,
        query.has_collateral,
        snapshot.farm.land_area,
    ))))
}

async fn apply_loan(
    State(state): State<AppState>,
    Path(player_id): Path<String>,
    Json(request): Json<ApplyLoanRequest>,
) -> Result<Json<ApiResponse<ApplyLoanResponse>>, AppError> {
    let session = state.session(&player_id);
    let mut session = session.lock().await;
    let snapshot = &mut session.snapshot;

    let offers = loan_offers(
        snapshot.economics.credit_score,
        request.has_collateral,
        snapshot.farm.land_area,
    );
    let offer = offers
        .into_iter()
        .find(|o| o.channel == request.channel)
        .ok_or_else(|| {
            SimError::NotEligible(format!("no eligible offer on channel {:?}", request.channel))
        })?;

    let (loan, disbursement) =
        apply_for_loan(&offer, request.principal, request.months, snapshot.total_day)?;

    snapshot.farm.money += loan.principal;
    snapshot.economics.loans.push(loan.clone());
    snapshot.economics.transactions.push(disbursement.clone());

    Ok(Json(ApiResponse::success(ApplyLoanResponse {
        loan,
        disbursement,
        money: snapshot.farm.money,
    })))
}

async fn run_installments(
    State(state): State<AppState>,
    Path(player_id): Path<String>,
) -> Result<Json<ApiResponse<InstallmentOutcome>>, AppError> {
    let session = state.session(&player_id);
    let mut session = session.lock().await;
    let snapshot = &mut session.snapshot;

    let outcome = installment_cycle(
        &snapshot.economics.loans,
        snapshot.total_day,
        snapshot.farm.money,
        snapshot.economics.credit_score,
    );

    snapshot.farm.money = outcome.cash;
    snapshot.economics.loans = outcome.loans.clone();
    snapshot.economics.credit_score = outcome.credit_score;
    snapshot
        .economics
        .transactions
        .extend(outcome.transactions.iter().cloned());

    Ok(Json(ApiResponse::success(outcome)))
}

async fn list_schemes(
    State(state): State<AppState>,
    Path(player_id): Path<String>,
) -> Result<Json<ApiResponse<Vec<SchemeInfo>>>, AppError> {
    let session = state.session(&player_id);
    let session = session.lock().await;
    Ok(Json(ApiResponse::success(eligible_schemes(&profile_of(
        &session.snapshot,
    )))))
}

async fn apply_for_scheme(
    State(state): State<AppState>,
    Path((player_id, scheme_id)): Path<(String, String)>,
) -> Result<Json<ApiResponse<SchemeApplicationResponse>>, AppError> {
    let session = state.session(&player_id);
    let mut session = session.lock().await;
    let snapshot = &mut session.snapshot;

    if snapshot.economics.applied_schemes.contains(&scheme_id) {
        return Err(SimError::NotEligible(format!("already enrolled in {scheme_id}")).into());
    }

    let benefit = apply_scheme(&scheme_id, &profile_of(snapshot))?;

    if benefit.amount_credited > 0 {
        snapshot.farm.money += benefit.amount_credited;
        snapshot.economics.transactions.push(new_transaction(
            TransactionKind::SchemeBenefit,
            benefit.amount_credited,
            snapshot.total_day,
            format!("{scheme_id} benefit"),
        ));
    }
    if benefit.insurance_granted {
        snapshot.economics.has_insurance = true;
    }
    snapshot.economics.applied_schemes.push(scheme_id);

    Ok(Json(ApiResponse::success(SchemeApplicationResponse {
        benefit,
        money: snapshot.farm.money,
        has_insurance: snapshot.economics.has_insurance,
    })))
}

fn profile_of(snapshot: &sim_core::GameSnapshot) -> FarmerProfile {
    FarmerProfile {
        land_area: snapshot.farm.land_area,
        has_insurance: snapshot.economics.has_insurance,
    }
}
