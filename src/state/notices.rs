use anyhow::{Context, Result};
use futures::stream::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId};
use tracing::warn;

use crate::models::{Notice, Notification};

use super::{AppState, list_employees, now};

pub async fn create_notice(
    state: &AppState,
    title: &str,
    description: &str,
    attachment_url: Option<String>,
    created_by: &str,
    send_email: bool,
) -> Result<ObjectId> {
    let res = state
        .notices
        .insert_one(Notice {
            id: None,
            title: title.to_string(),
            description: description.to_string(),
            attachment_url,
            created_by: created_by.to_string(),
            created_at: now(),
        })
        .await?;
    let id = res
        .inserted_id
        .as_object_id()
        .context("notice insert missing _id")?;

    push_notification(state, None, title, description).await?;

    // The email fan-out is best-effort: a relay failure must not fail the
    // notice itself.
    if send_email {
        let recipients: Vec<String> = list_employees(state)
            .await?
            .into_iter()
            .map(|e| e.email)
            .collect();
        if let Err(err) = state
            .mailer
            .broadcast(&recipients, title, description)
            .await
        {
            warn!(?err, "notice email broadcast failed");
        }
    }

    Ok(id)
}

pub async fn list_notices(state: &AppState) -> Result<Vec<Notice>> {
    let mut cursor = state.notices.find(doc! {}).await?;
    let mut items = Vec::new();
    while let Some(notice) = cursor.try_next().await? {
        items.push(notice);
    }
    Ok(items)
}

pub async fn delete_notice(state: &AppState, id: &ObjectId) -> Result<bool> {
    let res = state.notices.delete_one(doc! { "_id": id }).await?;
    Ok(res.deleted_count > 0)
}

pub async fn push_notification(
    state: &AppState,
    recipient: Option<String>,
    title: &str,
    message: &str,
) -> Result<()> {
    state
        .notifications
        .insert_one(Notification {
            id: None,
            recipient,
            title: title.to_string(),
            message: message.to_string(),
            read: false,
            created_at: now(),
        })
        .await?;
    Ok(())
}

/// Personal notifications plus broadcasts (no recipient).
pub async fn list_notifications(state: &AppState, email: &str) -> Result<Vec<Notification>> {
    let filter = doc! { "$or": [
        { "recipient": email },
        { "recipient": mongodb::bson::Bson::Null },
    ] };
    let mut cursor = state.notifications.find(filter).await?;
    let mut items = Vec::new();
    while let Some(notification) = cursor.try_next().await? {
        items.push(notification);
    }
    Ok(items)
}

pub async fn mark_notification_read(state: &AppState, id: &ObjectId) -> Result<bool> {
    let res = state
        .notifications
        .update_one(doc! { "_id": id }, doc! { "$set": { "read": true } })
        .await?;
    Ok(res.matched_count > 0)
}
