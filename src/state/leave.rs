use anyhow::Result;
use futures::stream::TryStreamExt;
use mongodb::bson::{DateTime, doc, oid::ObjectId};

use crate::models::{AppliedLeave, EmployeeStatus, LeaveBalance, LeaveStatus};

use super::{AppState, DEFAULT_CASUAL_LEAVE_DAYS, now, push_notification};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeaveApply {
    Applied,
    InsufficientBalance,
    AlreadyPending,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeaveDecision {
    Done,
    NotFound,
}

pub async fn get_leave_balance(state: &AppState, email: &str) -> Result<i64> {
    if let Some(balance) = state
        .leave_balances
        .find_one(doc! { "email": email })
        .await?
    {
        return Ok(balance.casual_leave);
    }
    // First touch provisions the default allowance.
    state
        .leave_balances
        .insert_one(LeaveBalance {
            id: None,
            email: email.to_string(),
            casual_leave: DEFAULT_CASUAL_LEAVE_DAYS,
        })
        .await?;
    Ok(DEFAULT_CASUAL_LEAVE_DAYS)
}

pub async fn apply_leave(
    state: &AppState,
    email: &str,
    days: i64,
    from_date: DateTime,
    to_date: DateTime,
    reason: &str,
) -> Result<LeaveApply> {
    let balance = get_leave_balance(state, email).await?;
    if balance < days {
        return Ok(LeaveApply::InsufficientBalance);
    }

    let pending = state
        .applied_leaves
        .find_one(doc! { "email": email, "status": LeaveStatus::Pending.as_str() })
        .await?;
    if pending.is_some() {
        return Ok(LeaveApply::AlreadyPending);
    }

    state
        .applied_leaves
        .insert_one(AppliedLeave {
            id: None,
            email: email.to_string(),
            days,
            from_date,
            to_date,
            reason: reason.to_string(),
            status: LeaveStatus::Pending,
            applied_at: now(),
        })
        .await?;

    Ok(LeaveApply::Applied)
}

/// Approval is the only path that spends the balance; it also parks the
/// employee on leave and notifies them. There is no automatic restoration
/// when the leave ends.
pub async fn approve_leave(state: &AppState, id: &ObjectId) -> Result<LeaveDecision> {
    let Some(leave) = state.applied_leaves.find_one(doc! { "_id": id }).await? else {
        return Ok(LeaveDecision::NotFound);
    };

    state
        .applied_leaves
        .update_one(
            doc! { "_id": id },
            doc! { "$set": { "status": LeaveStatus::Approved.as_str() } },
        )
        .await?;
    state
        .leave_balances
        .update_one(
            doc! { "email": &leave.email },
            doc! { "$inc": { "casualLeave": -leave.days } },
        )
        .await?;
    state
        .employees
        .update_one(
            doc! { "email": &leave.email },
            doc! { "$set": { "status": EmployeeStatus::OnLeave.as_str() } },
        )
        .await?;

    push_notification(
        state,
        Some(leave.email.clone()),
        "Leave approved",
        &format!("Your leave application for {} day(s) was approved.", leave.days),
    )
    .await?;

    Ok(LeaveDecision::Done)
}

pub async fn decline_leave(state: &AppState, id: &ObjectId) -> Result<LeaveDecision> {
    let Some(leave) = state.applied_leaves.find_one(doc! { "_id": id }).await? else {
        return Ok(LeaveDecision::NotFound);
    };

    state
        .applied_leaves
        .update_one(
            doc! { "_id": id },
            doc! { "$set": { "status": LeaveStatus::Declined.as_str() } },
        )
        .await?;

    push_notification(
        state,
        Some(leave.email.clone()),
        "Leave declined",
        &format!("Your leave application for {} day(s) was declined.", leave.days),
    )
    .await?;

    Ok(LeaveDecision::Done)
}

pub async fn list_leaves(state: &AppState, email: Option<&str>) -> Result<Vec<AppliedLeave>> {
    let filter = match email {
        Some(e) => doc! { "email": e },
        None => doc! {},
    };
    let mut cursor = state.applied_leaves.find(filter).await?;
    let mut items = Vec::new();
    while let Some(leave) = cursor.try_next().await? {
        items.push(leave);
    }
    Ok(items)
}
