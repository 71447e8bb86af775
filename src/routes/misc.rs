use std::sync::Arc;

use axum::{
    Json,
    extract::{Multipart, Query, State},
};
use serde::{Deserialize, Serialize};

use crate::{error::AppError, models::Role, session::SessionUser, state::AppState};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OtpQuery {
    pub phone: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OtpResponse {
    pub otp: Option<String>,
}

pub async fn otp_lookup(
    session_user: SessionUser,
    State(state): State<Arc<AppState>>,
    Query(query): Query<OtpQuery>,
) -> Result<Json<OtpResponse>, AppError> {
    session_user.require_role(&[Role::Admin, Role::Developer])?;
    let otp = state.otp.fetch_otp(&query.phone).await?;
    Ok(Json(OtpResponse { otp }))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub url: String,
}

/// Forwards the first file field to the image host and returns the hosted
/// URL.
pub async fn upload_file(
    _session_user: SessionUser,
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    if !state.image_host.is_configured() {
        return Err(AppError::bad_request("file uploads are not configured"));
    }

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| AppError::bad_request("malformed multipart body"))?
    {
        if field.file_name().is_none() {
            continue;
        }
        let content_type = field.content_type().unwrap_or_default().to_string();
        let file_name = field.file_name().unwrap_or("upload").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|_| AppError::bad_request("invalid file field"))?;
        let url = state
            .image_host
            .upload(&file_name, &content_type, bytes.to_vec())
            .await?;
        return Ok(Json(UploadResponse { url }));
    }

    Err(AppError::bad_request("no file field in request"))
}
