use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use crate::{
    error::AppError,
    mailer::send_activation_email,
    models::{Employee, EmployeeStatus, Role, TokenKind},
    session::SessionUser,
    state::{
        AppState, EmployeeCreate, create_token, get_employee, list_employees, register_employee,
        set_employee_status, set_salary_pin, update_employee_profile,
    },
};

use super::{ApiMessage, accepted, clean_opt, parse_datetime, rejected};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterForm {
    pub employee_id: String,
    pub email: String,
    pub name: String,
    pub designation: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    pub joining_date: String,
    pub role: String,
}

pub async fn employees_register(
    session_user: SessionUser,
    State(state): State<Arc<AppState>>,
    Json(form): Json<RegisterForm>,
) -> Result<Json<ApiMessage>, AppError> {
    session_user.require_role(&[Role::Admin, Role::HrAdmin])?;

    let role = Role::parse(&form.role).ok_or_else(|| AppError::bad_request("invalid role"))?;
    let joining_date = parse_datetime(&form.joining_date, "joiningDate")?;

    let created = register_employee(
        &state,
        form.employee_id.trim(),
        form.email.trim(),
        form.name.trim(),
        form.designation.trim(),
        clean_opt(form.phone),
        clean_opt(form.address),
        joining_date,
        role,
    )
    .await?;
    if created == EmployeeCreate::Duplicate {
        return Ok(rejected("employee already exists"));
    }

    let token = create_token(&state, form.email.trim(), TokenKind::Activation).await?;
    send_activation_email(
        state.mailer.as_ref(),
        form.email.trim(),
        &state.app_base_url,
        &token,
    )
    .await?;

    Ok(accepted("employee registered, activation email sent"))
}

pub async fn employees_index(
    session_user: SessionUser,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Employee>>, AppError> {
    session_user.require_role(&[Role::Admin, Role::HrAdmin, Role::Developer, Role::TeamLeader])?;
    Ok(Json(list_employees(&state).await?))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelfQuery {
    pub user_email: String,
}

pub async fn employees_profile(
    session_user: SessionUser,
    State(state): State<Arc<AppState>>,
    Query(query): Query<SelfQuery>,
) -> Result<Json<Employee>, AppError> {
    session_user.require_self_or_elevated(&query.user_email)?;
    get_employee(&state, &query.user_email)
        .await?
        .map(Json)
        .ok_or(AppError::NotFound("employee"))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdateForm {
    pub name: String,
    pub designation: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub photo_url: Option<String>,
}

pub async fn employees_update(
    session_user: SessionUser,
    State(state): State<Arc<AppState>>,
    Path(email): Path<String>,
    Json(form): Json<ProfileUpdateForm>,
) -> Result<Json<ApiMessage>, AppError> {
    session_user.require_role(&[Role::Admin, Role::HrAdmin])?;

    let found = update_employee_profile(
        &state,
        &email,
        form.name.trim(),
        form.designation.trim(),
        clean_opt(form.phone),
        clean_opt(form.address),
        clean_opt(form.photo_url),
    )
    .await?;
    if !found {
        return Err(AppError::NotFound("employee"));
    }
    Ok(accepted("profile updated"))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusForm {
    pub status: String,
}

pub async fn employees_set_status(
    session_user: SessionUser,
    State(state): State<Arc<AppState>>,
    Path(email): Path<String>,
    Json(form): Json<StatusForm>,
) -> Result<Json<ApiMessage>, AppError> {
    session_user.require_role(&[Role::Admin, Role::HrAdmin])?;

    let status = EmployeeStatus::parse(&form.status)
        .ok_or_else(|| AppError::bad_request("invalid status"))?;
    if !set_employee_status(&state, &email, status).await? {
        return Err(AppError::NotFound("employee"));
    }
    Ok(accepted("status updated"))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalaryPinForm {
    pub pin: String,
}

pub async fn employees_set_salary_pin(
    session_user: SessionUser,
    State(state): State<Arc<AppState>>,
    Json(form): Json<SalaryPinForm>,
) -> Result<Json<ApiMessage>, AppError> {
    if form.pin.trim().is_empty() {
        return Err(AppError::bad_request("pin is required"));
    }
    if !set_salary_pin(&state, session_user.email(), form.pin.trim()).await? {
        return Err(AppError::NotFound("employee"));
    }
    Ok(accepted("salary pin set"))
}
