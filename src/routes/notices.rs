use std::sync::Arc;

use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
};
use serde::Serialize;

use crate::{
    error::AppError,
    models::{Notice, Notification, Role},
    session::SessionUser,
    state::{
        AppState, create_notice, delete_notice, list_notices, list_notifications,
        mark_notification_read,
    },
};

use super::{ApiMessage, SelfQuery, accepted, parse_object_id};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NoticeCreated {
    pub success: bool,
    pub id: String,
}

/// Multipart because of the optional PDF attachment; everything else arrives
/// as text fields.
pub async fn notices_create(
    session_user: SessionUser,
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<NoticeCreated>, AppError> {
    session_user.require_role(&[Role::Admin, Role::HrAdmin])?;

    let mut title = None;
    let mut description = None;
    let mut send_email = false;
    let mut attachment_url = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| AppError::bad_request("malformed multipart body"))?
    {
        match field.name() {
            Some("title") => {
                title = Some(
                    field
                        .text()
                        .await
                        .map_err(|_| AppError::bad_request("invalid title field"))?,
                );
            }
            Some("description") => {
                description = Some(
                    field
                        .text()
                        .await
                        .map_err(|_| AppError::bad_request("invalid description field"))?,
                );
            }
            Some("sendEmail") => {
                let value = field
                    .text()
                    .await
                    .map_err(|_| AppError::bad_request("invalid sendEmail field"))?;
                send_email = matches!(value.as_str(), "true" | "1" | "on");
            }
            Some("attachment") => {
                let content_type = field.content_type().unwrap_or_default().to_string();
                if content_type != "application/pdf" {
                    return Err(AppError::bad_request("only PDF attachments are accepted"));
                }
                let file_name = field.file_name().unwrap_or("notice.pdf").to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|_| AppError::bad_request("invalid attachment"))?;
                attachment_url = Some(
                    state
                        .image_host
                        .upload(&file_name, &content_type, bytes.to_vec())
                        .await?,
                );
            }
            _ => {}
        }
    }

    let title = title
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| AppError::bad_request("title is required"))?;
    let description = description
        .filter(|d| !d.trim().is_empty())
        .ok_or_else(|| AppError::bad_request("description is required"))?;

    let id = create_notice(
        &state,
        title.trim(),
        description.trim(),
        attachment_url,
        session_user.email(),
        send_email,
    )
    .await?;

    Ok(Json(NoticeCreated {
        success: true,
        id: id.to_hex(),
    }))
}

pub async fn notices_index(
    _session_user: SessionUser,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Notice>>, AppError> {
    Ok(Json(list_notices(&state).await?))
}

pub async fn notices_delete(
    session_user: SessionUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ApiMessage>, AppError> {
    session_user.require_role(&[Role::Admin])?;

    let object_id = parse_object_id(&id)?;
    if !delete_notice(&state, &object_id).await? {
        return Err(AppError::NotFound("notice"));
    }
    Ok(accepted("notice deleted"))
}

pub async fn notifications_index(
    session_user: SessionUser,
    State(state): State<Arc<AppState>>,
    Query(query): Query<SelfQuery>,
) -> Result<Json<Vec<Notification>>, AppError> {
    session_user.require_self_or_elevated(&query.user_email)?;
    Ok(Json(list_notifications(&state, &query.user_email).await?))
}

pub async fn notifications_mark_read(
    _session_user: SessionUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ApiMessage>, AppError> {
    let object_id = parse_object_id(&id)?;
    if !mark_notification_read(&state, &object_id).await? {
        return Err(AppError::NotFound("notification"));
    }
    Ok(accepted("notification marked read"))
}
