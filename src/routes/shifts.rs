use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;

use crate::{
    error::AppError,
    models::{Role, ShiftAssignment, ShiftName},
    session::SessionUser,
    state::{AppState, assign_shift, enroll_ot, get_shift_for, list_shifts},
};

use super::{ApiMessage, SelfQuery, accepted, rejected};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignShiftForm {
    pub email: String,
    pub shift: String,
    pub entry_time: String,
}

pub async fn shifts_assign(
    session_user: SessionUser,
    State(state): State<Arc<AppState>>,
    Json(form): Json<AssignShiftForm>,
) -> Result<Json<ApiMessage>, AppError> {
    session_user.require_role(&[Role::Admin, Role::HrAdmin])?;

    let shift =
        ShiftName::parse(&form.shift).ok_or_else(|| AppError::bad_request("invalid shift"))?;
    if shift == ShiftName::OtList {
        return Err(AppError::bad_request("use the OT enrollment endpoint"));
    }

    assign_shift(&state, form.email.trim(), shift, form.entry_time.trim()).await?;
    Ok(accepted("shift assigned"))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OtEnrollForm {
    pub email: String,
    pub entry_time: String,
}

pub async fn shifts_ot_enroll(
    session_user: SessionUser,
    State(state): State<Arc<AppState>>,
    Json(form): Json<OtEnrollForm>,
) -> Result<Json<ApiMessage>, AppError> {
    session_user.require_role(&[Role::Admin, Role::HrAdmin, Role::TeamLeader])?;

    if enroll_ot(&state, form.email.trim(), form.entry_time.trim()).await? {
        Ok(accepted("enrolled for OT"))
    } else {
        Ok(rejected("already enrolled for OT"))
    }
}

pub async fn shifts_index(
    session_user: SessionUser,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ShiftAssignment>>, AppError> {
    session_user.require_role(&[Role::Admin, Role::HrAdmin, Role::TeamLeader])?;
    Ok(Json(list_shifts(&state).await?))
}

pub async fn shifts_mine(
    session_user: SessionUser,
    State(state): State<Arc<AppState>>,
    Query(query): Query<SelfQuery>,
) -> Result<Json<ShiftAssignment>, AppError> {
    session_user.require_self_or_elevated(&query.user_email)?;
    get_shift_for(&state, &query.user_email)
        .await?
        .map(Json)
        .ok_or(AppError::NotFound("shift assignment"))
}
