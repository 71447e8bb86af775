use std::sync::Arc;

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use crate::{
    error::AppError,
    models::{Employee, TokenKind},
    session::SessionUser,
    state::{
        AppState, activate_employee, consume_activation_token, create_token, delete_session,
        find_user, get_employee, hash_secret,
    },
};

use super::{ApiMessage, accepted};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub role: String,
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(form): Json<LoginForm>,
) -> Result<Json<LoginResponse>, AppError> {
    let user = find_user(&state, &form.email)
        .await?
        .ok_or(AppError::Unauthorized)?;
    let hash = user.password_hash.as_deref().ok_or(AppError::Unauthorized)?;
    if hash != hash_secret(&form.password) {
        return Err(AppError::Unauthorized);
    }

    let token = create_token(&state, &form.email, TokenKind::Session).await?;
    Ok(Json(LoginResponse {
        token,
        role: user.role.as_str().to_string(),
    }))
}

pub async fn logout(
    session_user: SessionUser,
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiMessage>, AppError> {
    delete_session(&state, session_user.token()).await?;
    Ok(accepted("logged out"))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivateForm {
    pub token: String,
    pub password: String,
}

pub async fn activate(
    State(state): State<Arc<AppState>>,
    Json(form): Json<ActivateForm>,
) -> Result<Json<ApiMessage>, AppError> {
    let Some(email) = consume_activation_token(&state, &form.token).await? else {
        return Err(AppError::bad_request("invalid or expired activation token"));
    };
    activate_employee(&state, &email, &form.password).await?;
    Ok(accepted("account activated"))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeResponse {
    pub email: String,
    pub role: String,
    pub employee: Option<Employee>,
}

pub async fn me(
    session_user: SessionUser,
    State(state): State<Arc<AppState>>,
) -> Result<Json<MeResponse>, AppError> {
    let employee = get_employee(&state, session_user.email()).await?;
    Ok(Json(MeResponse {
        email: session_user.email().to_string(),
        role: session_user.role().as_str().to_string(),
        employee,
    }))
}
