// routes module: JSON handlers and shared parsing/response helpers.

mod attendance;
mod auth;
mod employees;
mod leave;
mod ledger;
mod misc;
mod notices;
mod orders;
mod shifts;

pub use attendance::*;
pub use auth::*;
pub use employees::*;
pub use leave::*;
pub use ledger::*;
pub use misc::*;
pub use notices::*;
pub use orders::*;
pub use shifts::*;

use std::str::FromStr;

use axum::Json;
use mongodb::bson::{DateTime, oid::ObjectId};
use serde::Serialize;

use crate::error::AppError;

/// Body shape for business-rule accept/reject responses. Rejections ride on
/// 200 OK; existing consumers depend on that convention.
#[derive(Debug, Serialize)]
pub struct ApiMessage {
    pub success: bool,
    pub message: String,
}

pub(crate) fn accepted(message: impl Into<String>) -> Json<ApiMessage> {
    Json(ApiMessage {
        success: true,
        message: message.into(),
    })
}

pub(crate) fn rejected(message: impl Into<String>) -> Json<ApiMessage> {
    Json(ApiMessage {
        success: false,
        message: message.into(),
    })
}

pub(crate) fn parse_object_id(value: &str) -> Result<ObjectId, AppError> {
    ObjectId::from_str(value).map_err(|_| AppError::bad_request("invalid id"))
}

pub(crate) fn parse_datetime(value: &str, label: &str) -> Result<DateTime, AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::bad_request(format!(
            "{label} is required (RFC3339, e.g. 2024-01-01T00:00:00Z)"
        )));
    }
    DateTime::parse_rfc3339_str(trimmed)
        .map_err(|_| AppError::bad_request(format!("invalid date/time for {label}")))
}

pub(crate) fn clean_opt(input: Option<String>) -> Option<String> {
    input.and_then(|v| {
        let trimmed = v.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}
