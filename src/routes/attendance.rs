use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
};
use serde::{Deserialize, Serialize};

use crate::{
    error::AppError,
    models::{AttendanceSnapshot, Role},
    session::SessionUser,
    state::{
        AppState, CheckInOutcome, CheckOutOutcome, OtStartOutcome, OtStopOutcome, list_snapshots,
        record_check_in, record_check_out, record_ot_start, record_ot_stop, snapshot_for,
    },
};

use super::{ApiMessage, accepted, rejected};

/// Check-in/out timestamps are supplied by the client as epoch milliseconds;
/// the server takes them at face value.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimePayload {
    pub time: i64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckInResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub late_check_in: Option<String>,
}

pub async fn attendance_check_in(
    session_user: SessionUser,
    State(state): State<Arc<AppState>>,
    Json(payload): Json<TimePayload>,
) -> Result<Json<CheckInResponse>, AppError> {
    let outcome = record_check_in(&state, session_user.email(), payload.time).await?;
    let response = match outcome {
        CheckInOutcome::Accepted { late_check_in } => CheckInResponse {
            success: true,
            message: match &late_check_in {
                Some(lateness) => format!("checked in, {lateness} late"),
                None => "checked in".to_string(),
            },
            late_check_in,
        },
        CheckInOutcome::AlreadyCheckedIn => CheckInResponse {
            success: false,
            message: "already checked in".to_string(),
            late_check_in: None,
        },
        CheckInOutcome::NoShiftAssigned => CheckInResponse {
            success: false,
            message: "no shift assigned".to_string(),
            late_check_in: None,
        },
        CheckInOutcome::NotEligible => CheckInResponse {
            success: false,
            message: "you are not eligible to check in at this time".to_string(),
            late_check_in: None,
        },
    };
    Ok(Json(response))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckOutResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub working_time: Option<String>,
}

pub async fn attendance_check_out(
    session_user: SessionUser,
    State(state): State<Arc<AppState>>,
    Json(payload): Json<TimePayload>,
) -> Result<Json<CheckOutResponse>, AppError> {
    match record_check_out(&state, session_user.email(), payload.time).await? {
        CheckOutOutcome::Accepted { working_time } => Ok(Json(CheckOutResponse {
            success: true,
            message: format!("checked out after {working_time}"),
            working_time: Some(working_time),
        })),
        CheckOutOutcome::AlreadyCheckedOut => Ok(Json(CheckOutResponse {
            success: false,
            message: "already checked out".to_string(),
            working_time: None,
        })),
        CheckOutOutcome::NoCheckIn => {
            Err(AppError::bad_request("no check-in found for today"))
        }
    }
}

pub async fn attendance_ot_start(
    session_user: SessionUser,
    State(state): State<Arc<AppState>>,
    Json(payload): Json<TimePayload>,
) -> Result<Json<ApiMessage>, AppError> {
    match record_ot_start(&state, session_user.email(), payload.time).await? {
        OtStartOutcome::Started => Ok(accepted("overtime started")),
        OtStartOutcome::AlreadyStarted => Ok(rejected("overtime already started")),
        OtStartOutcome::NotEnrolled => Ok(rejected("not enrolled in OT list")),
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OtStopResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ot_time: Option<String>,
}

pub async fn attendance_ot_stop(
    session_user: SessionUser,
    State(state): State<Arc<AppState>>,
    Json(payload): Json<TimePayload>,
) -> Result<Json<OtStopResponse>, AppError> {
    match record_ot_stop(&state, session_user.email(), payload.time).await? {
        OtStopOutcome::Stopped { ot_time } => Ok(Json(OtStopResponse {
            success: true,
            message: format!("overtime stopped after {ot_time}"),
            ot_time: Some(ot_time),
        })),
        OtStopOutcome::AlreadyStopped => Ok(Json(OtStopResponse {
            success: false,
            message: "overtime already stopped".to_string(),
            ot_time: None,
        })),
        OtStopOutcome::NoStart => Err(AppError::bad_request("no OT start found for today")),
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotQuery {
    pub user_email: String,
    pub date: String,
}

pub async fn attendance_today(
    session_user: SessionUser,
    State(state): State<Arc<AppState>>,
    Query(query): Query<SnapshotQuery>,
) -> Result<Json<AttendanceSnapshot>, AppError> {
    session_user.require_self_or_elevated(&query.user_email)?;
    snapshot_for(&state, &query.user_email, &query.date)
        .await?
        .map(Json)
        .ok_or(AppError::NotFound("attendance snapshot"))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateQuery {
    pub date: String,
}

pub async fn attendance_index(
    session_user: SessionUser,
    State(state): State<Arc<AppState>>,
    Query(query): Query<DateQuery>,
) -> Result<Json<Vec<AttendanceSnapshot>>, AppError> {
    session_user.require_role(&[Role::Admin, Role::HrAdmin, Role::TeamLeader])?;
    Ok(Json(list_snapshots(&state, &query.date).await?))
}
