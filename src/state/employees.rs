use anyhow::Result;
use futures::stream::TryStreamExt;
use mongodb::bson::{DateTime, doc};
use sha2::{Digest, Sha256};

use crate::models::{Employee, EmployeeStatus, Role, ShiftAssignment, ShiftName, User};

use super::{AppState, is_duplicate_key, ot_key};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmployeeCreate {
    Created,
    Duplicate,
}

pub fn hash_secret(secret: &str) -> String {
    hex::encode(Sha256::digest(secret.as_bytes()))
}

/// Registration creates the auth identity and the pending employee profile in
/// one step; the employee becomes Active through the activation link.
#[allow(clippy::too_many_arguments)]
pub async fn register_employee(
    state: &AppState,
    employee_id: &str,
    email: &str,
    name: &str,
    designation: &str,
    phone: Option<String>,
    address: Option<String>,
    joining_date: DateTime,
    role: Role,
) -> Result<EmployeeCreate> {
    let user = User {
        id: None,
        email: email.to_string(),
        password_hash: None,
        role,
    };
    match state.users.insert_one(user).await {
        Ok(_) => {}
        Err(err) if is_duplicate_key(&err) => return Ok(EmployeeCreate::Duplicate),
        Err(err) => return Err(err.into()),
    }

    let employee = Employee {
        id: None,
        employee_id: employee_id.to_string(),
        email: email.to_string(),
        name: name.to_string(),
        designation: designation.to_string(),
        phone,
        address,
        photo_url: None,
        joining_date,
        status: EmployeeStatus::Pending,
        salary_pin_hash: None,
    };
    match state.employees.insert_one(employee).await {
        Ok(_) => Ok(EmployeeCreate::Created),
        Err(err) if is_duplicate_key(&err) => Ok(EmployeeCreate::Duplicate),
        Err(err) => Err(err.into()),
    }
}

/// Consuming a valid activation token sets the password and flips the
/// employee from pending to Active.
pub async fn activate_employee(state: &AppState, email: &str, password: &str) -> Result<()> {
    state
        .users
        .update_one(
            doc! { "email": email },
            doc! { "$set": { "passwordHash": hash_secret(password) } },
        )
        .await?;
    state
        .employees
        .update_one(
            doc! { "email": email },
            doc! { "$set": { "status": EmployeeStatus::Active.as_str() } },
        )
        .await?;
    Ok(())
}

pub async fn find_user(state: &AppState, email: &str) -> Result<Option<User>> {
    state
        .users
        .find_one(doc! { "email": email })
        .await
        .map_err(Into::into)
}

pub async fn get_employee(state: &AppState, email: &str) -> Result<Option<Employee>> {
    state
        .employees
        .find_one(doc! { "email": email })
        .await
        .map_err(Into::into)
}

pub async fn list_employees(state: &AppState) -> Result<Vec<Employee>> {
    let mut cursor = state.employees.find(doc! {}).await?;
    let mut items = Vec::new();
    while let Some(employee) = cursor.try_next().await? {
        items.push(employee);
    }
    Ok(items)
}

pub async fn update_employee_profile(
    state: &AppState,
    email: &str,
    name: &str,
    designation: &str,
    phone: Option<String>,
    address: Option<String>,
    photo_url: Option<String>,
) -> Result<bool> {
    let res = state
        .employees
        .update_one(
            doc! { "email": email },
            doc! { "$set": {
                "name": name,
                "designation": designation,
                "phone": phone,
                "address": address,
                "photoUrl": photo_url,
            } },
        )
        .await?;
    Ok(res.matched_count > 0)
}

pub async fn set_employee_status(
    state: &AppState,
    email: &str,
    status: EmployeeStatus,
) -> Result<bool> {
    let res = state
        .employees
        .update_one(
            doc! { "email": email },
            doc! { "$set": { "status": status.as_str() } },
        )
        .await?;
    Ok(res.matched_count > 0)
}

pub async fn set_salary_pin(state: &AppState, email: &str, pin: &str) -> Result<bool> {
    let res = state
        .employees
        .update_one(
            doc! { "email": email },
            doc! { "$set": { "salaryPinHash": hash_secret(pin) } },
        )
        .await?;
    Ok(res.matched_count > 0)
}

/// Assigns (or reassigns) the employee's regular shift, keyed by email.
pub async fn assign_shift(
    state: &AppState,
    email: &str,
    shift: ShiftName,
    entry_time: &str,
) -> Result<()> {
    state
        .shifts
        .update_one(
            doc! { "key": email },
            doc! { "$set": {
                "email": email,
                "shift": shift.as_str(),
                "entryTime": entry_time,
            } },
        )
        .upsert(true)
        .await?;
    Ok(())
}

/// Enrolls a one-shot OT ticket under the synthesized `email_OT` key so it
/// can coexist with the regular assignment.
pub async fn enroll_ot(state: &AppState, email: &str, entry_time: &str) -> Result<bool> {
    let ticket = ShiftAssignment {
        id: None,
        key: ot_key(email),
        email: email.to_string(),
        shift: ShiftName::OtList,
        entry_time: entry_time.to_string(),
    };
    match state.shifts.insert_one(ticket).await {
        Ok(_) => Ok(true),
        Err(err) if is_duplicate_key(&err) => Ok(false),
        Err(err) => Err(err.into()),
    }
}

pub async fn list_shifts(state: &AppState) -> Result<Vec<ShiftAssignment>> {
    let mut cursor = state.shifts.find(doc! {}).await?;
    let mut items = Vec::new();
    while let Some(assignment) = cursor.try_next().await? {
        items.push(assignment);
    }
    Ok(items)
}

pub async fn get_shift_for(state: &AppState, email: &str) -> Result<Option<ShiftAssignment>> {
    state
        .shifts
        .find_one(doc! { "key": email })
        .await
        .map_err(Into::into)
}
