use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};

use crate::{
    error::AppError,
    models::{Earning, EarningStatus, LedgerEntry, MonthlyProfit, Role, UnpaidBucket},
    session::SessionUser,
    state::{
        AppState, EarningMutation, LedgerOutcome, add_earning, add_expense, add_hr_balance,
        add_main_balance, change_earning_status, get_balances, get_monthly_profit,
        get_unpaid_bucket, list_earnings, list_transactions, share_profit, spend_hr_balance,
        update_earning,
    },
};

use super::{ApiMessage, accepted, clean_opt, parse_object_id, rejected};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseForm {
    pub amount: f64,
    pub note: String,
    pub month: String,
    pub year: i32,
}

pub async fn expenses_create(
    session_user: SessionUser,
    State(state): State<Arc<AppState>>,
    Json(form): Json<ExpenseForm>,
) -> Result<Json<ApiMessage>, AppError> {
    session_user.require_role(&[Role::Admin])?;
    if form.amount <= 0.0 {
        return Err(AppError::bad_request("amount must be positive"));
    }

    match add_expense(&state, form.amount, form.note.trim(), &form.month, form.year).await? {
        LedgerOutcome::Applied => Ok(accepted("expense recorded")),
        LedgerOutcome::Insufficient => Ok(rejected("insufficient balance")),
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionsQuery {
    #[serde(default, rename = "type")]
    pub entry_type: Option<String>,
}

pub async fn transactions_index(
    session_user: SessionUser,
    State(state): State<Arc<AppState>>,
    Query(query): Query<TransactionsQuery>,
) -> Result<Json<Vec<LedgerEntry>>, AppError> {
    session_user.require_role(&[Role::Admin, Role::HrAdmin])?;
    Ok(Json(
        list_transactions(&state, query.entry_type.as_deref()).await?,
    ))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BalancesResponse {
    pub main_balance: f64,
    pub hr_balance: f64,
}

pub async fn balances_index(
    session_user: SessionUser,
    State(state): State<Arc<AppState>>,
) -> Result<Json<BalancesResponse>, AppError> {
    session_user.require_role(&[Role::Admin, Role::HrAdmin])?;
    let (main_balance, hr_balance) = get_balances(&state).await?;
    Ok(Json(BalancesResponse {
        main_balance,
        hr_balance,
    }))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceForm {
    pub amount: f64,
    pub note: String,
}

pub async fn balances_add_main(
    session_user: SessionUser,
    State(state): State<Arc<AppState>>,
    Json(form): Json<BalanceForm>,
) -> Result<Json<ApiMessage>, AppError> {
    session_user.require_role(&[Role::Admin])?;
    if form.amount <= 0.0 {
        return Err(AppError::bad_request("amount must be positive"));
    }
    add_main_balance(&state, form.amount, form.note.trim()).await?;
    Ok(accepted("main balance updated"))
}

pub async fn balances_add_hr(
    session_user: SessionUser,
    State(state): State<Arc<AppState>>,
    Json(form): Json<BalanceForm>,
) -> Result<Json<ApiMessage>, AppError> {
    session_user.require_role(&[Role::Admin])?;
    if form.amount <= 0.0 {
        return Err(AppError::bad_request("amount must be positive"));
    }
    match add_hr_balance(&state, form.amount, form.note.trim()).await? {
        LedgerOutcome::Applied => Ok(accepted("hr balance updated")),
        LedgerOutcome::Insufficient => Ok(rejected("insufficient balance")),
    }
}

pub async fn balances_spend_hr(
    session_user: SessionUser,
    State(state): State<Arc<AppState>>,
    Json(form): Json<BalanceForm>,
) -> Result<Json<ApiMessage>, AppError> {
    session_user.require_role(&[Role::Admin, Role::HrAdmin])?;
    if form.amount <= 0.0 {
        return Err(AppError::bad_request("amount must be positive"));
    }
    match spend_hr_balance(&state, form.amount, form.note.trim()).await? {
        LedgerOutcome::Applied => Ok(accepted("hr expense recorded")),
        LedgerOutcome::Insufficient => Ok(rejected("insufficient balance")),
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EarningForm {
    pub client_id: String,
    pub month: String,
    pub year: i32,
    pub usd: f64,
    pub charge: f64,
    pub receivable: f64,
    pub rate: f64,
    pub converted_bdt: f64,
    pub status: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EarningCreated {
    pub success: bool,
    pub id: String,
}

pub async fn earnings_create(
    session_user: SessionUser,
    State(state): State<Arc<AppState>>,
    Json(form): Json<EarningForm>,
) -> Result<Json<EarningCreated>, AppError> {
    session_user.require_role(&[Role::Admin])?;

    let status = EarningStatus::parse(&form.status)
        .ok_or_else(|| AppError::bad_request("invalid earning status"))?;
    let id = add_earning(
        &state,
        form.client_id.trim(),
        &form.month,
        form.year,
        form.usd,
        form.charge,
        form.receivable,
        form.rate,
        form.converted_bdt,
        status,
    )
    .await?;

    Ok(Json(EarningCreated {
        success: true,
        id: id.to_hex(),
    }))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EarningsQuery {
    #[serde(default)]
    pub month: Option<String>,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub client_id: Option<String>,
}

pub async fn earnings_index(
    session_user: SessionUser,
    State(state): State<Arc<AppState>>,
    Query(query): Query<EarningsQuery>,
) -> Result<Json<Vec<Earning>>, AppError> {
    session_user.require_role(&[Role::Admin, Role::HrAdmin])?;
    Ok(Json(
        list_earnings(
            &state,
            query.month.as_deref(),
            query.year,
            query.client_id.as_deref(),
        )
        .await?,
    ))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EarningStatusForm {
    pub status: String,
}

pub async fn earnings_set_status(
    session_user: SessionUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(form): Json<EarningStatusForm>,
) -> Result<Json<ApiMessage>, AppError> {
    session_user.require_role(&[Role::Admin])?;

    let status = EarningStatus::parse(&form.status)
        .ok_or_else(|| AppError::bad_request("invalid earning status"))?;
    let object_id = parse_object_id(&id)?;

    match change_earning_status(&state, &object_id, status).await? {
        EarningMutation::Applied => Ok(accepted("earning status updated")),
        EarningMutation::NotFound => Err(AppError::NotFound("earning")),
    }
}

pub async fn earnings_update(
    session_user: SessionUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(form): Json<EarningForm>,
) -> Result<Json<ApiMessage>, AppError> {
    session_user.require_role(&[Role::Admin])?;

    let status = EarningStatus::parse(&form.status)
        .ok_or_else(|| AppError::bad_request("invalid earning status"))?;
    let object_id = parse_object_id(&id)?;

    match update_earning(
        &state,
        &object_id,
        form.client_id.trim(),
        &form.month,
        form.year,
        form.usd,
        form.charge,
        form.receivable,
        form.rate,
        form.converted_bdt,
        status,
    )
    .await?
    {
        EarningMutation::Applied => Ok(accepted("earning updated")),
        EarningMutation::NotFound => Err(AppError::NotFound("earning")),
    }
}

pub async fn monthly_profit_show(
    session_user: SessionUser,
    State(state): State<Arc<AppState>>,
    Path((year, month)): Path<(i32, String)>,
) -> Result<Json<MonthlyProfit>, AppError> {
    session_user.require_role(&[Role::Admin, Role::HrAdmin])?;
    get_monthly_profit(&state, &month, year)
        .await?
        .map(Json)
        .ok_or(AppError::NotFound("monthly profit bucket"))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareProfitForm {
    pub month: String,
    pub year: i32,
    pub recipient: String,
    pub amount: f64,
    #[serde(default)]
    pub note: Option<String>,
}

pub async fn profit_share(
    session_user: SessionUser,
    State(state): State<Arc<AppState>>,
    Json(form): Json<ShareProfitForm>,
) -> Result<Json<ApiMessage>, AppError> {
    session_user.require_role(&[Role::Admin])?;
    if form.amount <= 0.0 {
        return Err(AppError::bad_request("amount must be positive"));
    }

    match share_profit(
        &state,
        &form.month,
        form.year,
        form.recipient.trim(),
        form.amount,
        clean_opt(form.note),
    )
    .await?
    {
        LedgerOutcome::Applied => Ok(accepted("profit shared")),
        LedgerOutcome::Insufficient => Ok(rejected("insufficient remaining profit")),
    }
}

pub async fn unpaid_bucket_show(
    session_user: SessionUser,
    State(state): State<Arc<AppState>>,
    Path((year, month)): Path<(i32, String)>,
) -> Result<Json<UnpaidBucket>, AppError> {
    session_user.require_role(&[Role::Admin, Role::HrAdmin])?;
    get_unpaid_bucket(&state, &month, year)
        .await?
        .map(Json)
        .ok_or(AppError::NotFound("unpaid bucket"))
}
