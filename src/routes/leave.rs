use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};

use crate::{
    error::AppError,
    models::{AppliedLeave, Role},
    session::SessionUser,
    state::{
        AppState, LeaveApply, LeaveDecision, apply_leave, approve_leave, decline_leave,
        get_leave_balance, list_leaves,
    },
};

use super::{ApiMessage, SelfQuery, accepted, parse_datetime, parse_object_id, rejected};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveApplyForm {
    pub days: i64,
    pub from_date: String,
    pub to_date: String,
    pub reason: String,
}

pub async fn leaves_apply(
    session_user: SessionUser,
    State(state): State<Arc<AppState>>,
    Json(form): Json<LeaveApplyForm>,
) -> Result<Json<ApiMessage>, AppError> {
    if form.days <= 0 {
        return Err(AppError::bad_request("days must be positive"));
    }
    let from_date = parse_datetime(&form.from_date, "fromDate")?;
    let to_date = parse_datetime(&form.to_date, "toDate")?;

    match apply_leave(
        &state,
        session_user.email(),
        form.days,
        from_date,
        to_date,
        form.reason.trim(),
    )
    .await?
    {
        LeaveApply::Applied => Ok(accepted("leave application submitted")),
        LeaveApply::InsufficientBalance => Ok(rejected("insufficient leave balance")),
        LeaveApply::AlreadyPending => Ok(rejected("a pending application already exists")),
    }
}

pub async fn leaves_mine(
    session_user: SessionUser,
    State(state): State<Arc<AppState>>,
    Query(query): Query<SelfQuery>,
) -> Result<Json<Vec<AppliedLeave>>, AppError> {
    session_user.require_self_or_elevated(&query.user_email)?;
    Ok(Json(list_leaves(&state, Some(&query.user_email)).await?))
}

pub async fn leaves_index(
    session_user: SessionUser,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<AppliedLeave>>, AppError> {
    session_user.require_role(&[Role::Admin, Role::HrAdmin])?;
    Ok(Json(list_leaves(&state, None).await?))
}

pub async fn leaves_approve(
    session_user: SessionUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ApiMessage>, AppError> {
    session_user.require_role(&[Role::Admin, Role::HrAdmin])?;

    let object_id = parse_object_id(&id)?;
    match approve_leave(&state, &object_id).await? {
        LeaveDecision::Done => Ok(accepted("leave approved")),
        LeaveDecision::NotFound => Err(AppError::NotFound("leave application")),
    }
}

pub async fn leaves_decline(
    session_user: SessionUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ApiMessage>, AppError> {
    session_user.require_role(&[Role::Admin, Role::HrAdmin])?;

    let object_id = parse_object_id(&id)?;
    match decline_leave(&state, &object_id).await? {
        LeaveDecision::Done => Ok(accepted("leave declined")),
        LeaveDecision::NotFound => Err(AppError::NotFound("leave application")),
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveBalanceResponse {
    pub email: String,
    pub casual_leave: i64,
}

pub async fn leaves_balance(
    session_user: SessionUser,
    State(state): State<Arc<AppState>>,
    Query(query): Query<SelfQuery>,
) -> Result<Json<LeaveBalanceResponse>, AppError> {
    session_user.require_self_or_elevated(&query.user_email)?;
    let casual_leave = get_leave_balance(&state, &query.user_email).await?;
    Ok(Json(LeaveBalanceResponse {
        email: query.user_email,
        casual_leave,
    }))
}
