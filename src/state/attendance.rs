use anyhow::Result;
use chrono::{FixedOffset, TimeZone, Timelike, Utc};
use mongodb::bson::{Bson, doc};

use crate::models::{ShiftName, TimeEntry};

use super::{AppState, is_duplicate_key};

/// Asia/Dhaka has no DST; a fixed +06:00 offset is exact.
const DHAKA_OFFSET_SECS: i32 = 6 * 3600;

/// Clock-time thresholds in seconds from local midnight.
struct ShiftWindow {
    open: u32,
    on_time: u32,
    late: u32,
}

const fn hm(hours: u32, minutes: u32) -> u32 {
    hours * 3600 + minutes * 60
}

// Night has no window table entry and falls through to NotEligible, matching
// the deployed behavior.
fn shift_window(shift: &ShiftName) -> Option<ShiftWindow> {
    match shift {
        ShiftName::Morning => Some(ShiftWindow {
            open: hm(5, 45),
            on_time: hm(6, 0),
            late: hm(12, 0),
        }),
        ShiftName::General => Some(ShiftWindow {
            open: hm(9, 45),
            on_time: hm(10, 0),
            late: hm(16, 0),
        }),
        ShiftName::Evening => Some(ShiftWindow {
            open: hm(13, 45),
            on_time: hm(14, 5),
            late: hm(18, 30),
        }),
        ShiftName::Night | ShiftName::OtList => None,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckInEvaluation {
    OnTime,
    Late(String),
    NotEligible,
}

fn dhaka_seconds_of_day(at_ms: i64) -> Option<u32> {
    let offset = FixedOffset::east_opt(DHAKA_OFFSET_SECS)?;
    let utc = Utc.timestamp_millis_opt(at_ms).single()?;
    Some(utc.with_timezone(&offset).num_seconds_from_midnight())
}

/// The attendance date bucket is the Dhaka-local calendar date of the
/// client-supplied timestamp.
pub fn date_key(at_ms: i64) -> String {
    let offset = FixedOffset::east_opt(DHAKA_OFFSET_SECS).expect("valid fixed offset");
    match Utc.timestamp_millis_opt(at_ms).single() {
        Some(utc) => utc.with_timezone(&offset).format("%Y-%m-%d").to_string(),
        None => String::new(),
    }
}

/// Formats elapsed milliseconds as "{hours}h {minutes}m", truncating anything
/// below a whole minute.
pub fn format_duration(elapsed_ms: i64) -> String {
    let hours = elapsed_ms / 3_600_000;
    let minutes = (elapsed_ms % 3_600_000) / 60_000;
    format!("{hours}h {minutes}m")
}

/// Window membership for a check-in attempt: inside [open, on-time] is
/// accepted clean, inside (on-time, late] is accepted with the lateness
/// measured from the on-time cutoff, anything else is rejected.
pub fn evaluate_check_in(shift: &ShiftName, at_ms: i64) -> CheckInEvaluation {
    let Some(window) = shift_window(shift) else {
        return CheckInEvaluation::NotEligible;
    };
    let Some(seconds) = dhaka_seconds_of_day(at_ms) else {
        return CheckInEvaluation::NotEligible;
    };

    if seconds >= window.open && seconds <= window.on_time {
        CheckInEvaluation::OnTime
    } else if seconds > window.on_time && seconds <= window.late {
        let late_ms = i64::from(seconds - window.on_time) * 1000;
        CheckInEvaluation::Late(format_duration(late_ms))
    } else {
        CheckInEvaluation::NotEligible
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckInOutcome {
    Accepted { late_check_in: Option<String> },
    AlreadyCheckedIn,
    NoShiftAssigned,
    NotEligible,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutOutcome {
    Accepted { working_time: String },
    AlreadyCheckedOut,
    NoCheckIn,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OtStartOutcome {
    Started,
    AlreadyStarted,
    NotEnrolled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OtStopOutcome {
    Stopped { ot_time: String },
    AlreadyStopped,
    NoStart,
}

pub fn ot_key(email: &str) -> String {
    format!("{email}_OT")
}

async fn insert_time_entry(
    collection: &mongodb::Collection<TimeEntry>,
    email: &str,
    date: &str,
    at: i64,
) -> Result<bool> {
    let entry = TimeEntry {
        id: None,
        email: email.to_string(),
        date: date.to_string(),
        at,
    };
    match collection.insert_one(entry).await {
        Ok(_) => Ok(true),
        Err(err) if is_duplicate_key(&err) => Ok(false),
        Err(err) => Err(err.into()),
    }
}

pub async fn record_check_in(state: &AppState, email: &str, at: i64) -> Result<CheckInOutcome> {
    let Some(assignment) = state.shifts.find_one(doc! { "key": email }).await? else {
        return Ok(CheckInOutcome::NoShiftAssigned);
    };

    let late_check_in = match evaluate_check_in(&assignment.shift, at) {
        CheckInEvaluation::OnTime => None,
        CheckInEvaluation::Late(lateness) => Some(lateness),
        CheckInEvaluation::NotEligible => return Ok(CheckInOutcome::NotEligible),
    };

    let date = date_key(at);
    if state
        .check_ins
        .find_one(doc! { "email": email, "date": &date })
        .await?
        .is_some()
    {
        return Ok(CheckInOutcome::AlreadyCheckedIn);
    }
    if !insert_time_entry(&state.check_ins, email, &date, at).await? {
        return Ok(CheckInOutcome::AlreadyCheckedIn);
    }

    let employee = state.employees.find_one(doc! { "email": email }).await?;
    let (employee_id, name, designation) = match &employee {
        Some(e) => (
            Bson::from(e.employee_id.clone()),
            Bson::from(e.name.clone()),
            Bson::from(e.designation.clone()),
        ),
        None => (Bson::Null, Bson::Null, Bson::Null),
    };

    state
        .attendance
        .update_one(
            doc! { "email": email, "date": &date },
            doc! {
                "$setOnInsert": {
                    "employeeId": employee_id,
                    "name": name,
                    "designation": designation,
                    "shift": assignment.shift.as_str(),
                },
                "$set": {
                    "checkInTime": at,
                    "lateCheckIn": late_check_in
                        .clone()
                        .map(Bson::from)
                        .unwrap_or(Bson::Null),
                },
            },
        )
        .upsert(true)
        .await?;

    Ok(CheckInOutcome::Accepted { late_check_in })
}

pub async fn record_check_out(state: &AppState, email: &str, at: i64) -> Result<CheckOutOutcome> {
    let date = date_key(at);

    // The original dereferenced a missing check-in and crashed; this surfaces
    // as a structured rejection instead.
    let Some(check_in) = state
        .check_ins
        .find_one(doc! { "email": email, "date": &date })
        .await?
    else {
        return Ok(CheckOutOutcome::NoCheckIn);
    };

    if state
        .check_outs
        .find_one(doc! { "email": email, "date": &date })
        .await?
        .is_some()
    {
        return Ok(CheckOutOutcome::AlreadyCheckedOut);
    }
    if !insert_time_entry(&state.check_outs, email, &date, at).await? {
        return Ok(CheckOutOutcome::AlreadyCheckedOut);
    }

    // Raw subtraction of the two client-supplied timestamps.
    let worked_ms = at - check_in.at;
    let working_time = format_duration(worked_ms);
    let working_seconds = worked_ms / 1000;

    let employee = state.employees.find_one(doc! { "email": email }).await?;
    let assignment = state.shifts.find_one(doc! { "key": email }).await?;

    let mut set = doc! {
        "checkOutTime": at,
        "workingTime": &working_time,
        "workingSeconds": working_seconds,
    };
    if let Some(e) = &employee {
        set.insert("employeeId", e.employee_id.clone());
        set.insert("name", e.name.clone());
        set.insert("designation", e.designation.clone());
    }
    if let Some(a) = &assignment {
        set.insert("shift", a.shift.as_str());
    }

    state
        .attendance
        .update_one(doc! { "email": email, "date": &date }, doc! { "$set": set })
        .upsert(true)
        .await?;

    Ok(CheckOutOutcome::Accepted { working_time })
}

pub async fn record_ot_start(state: &AppState, email: &str, at: i64) -> Result<OtStartOutcome> {
    if state
        .shifts
        .find_one(doc! { "key": ot_key(email) })
        .await?
        .is_none()
    {
        return Ok(OtStartOutcome::NotEnrolled);
    }

    let date = date_key(at);
    if state
        .ot_starts
        .find_one(doc! { "email": email, "date": &date })
        .await?
        .is_some()
    {
        return Ok(OtStartOutcome::AlreadyStarted);
    }
    if !insert_time_entry(&state.ot_starts, email, &date, at).await? {
        return Ok(OtStartOutcome::AlreadyStarted);
    }

    Ok(OtStartOutcome::Started)
}

pub async fn record_ot_stop(state: &AppState, email: &str, at: i64) -> Result<OtStopOutcome> {
    let date = date_key(at);

    let Some(start) = state
        .ot_starts
        .find_one(doc! { "email": email, "date": &date })
        .await?
    else {
        return Ok(OtStopOutcome::NoStart);
    };

    if state
        .ot_stops
        .find_one(doc! { "email": email, "date": &date })
        .await?
        .is_some()
    {
        return Ok(OtStopOutcome::AlreadyStopped);
    }
    if !insert_time_entry(&state.ot_stops, email, &date, at).await? {
        return Ok(OtStopOutcome::AlreadyStopped);
    }

    let ot_ms = at - start.at;
    let ot_time = format_duration(ot_ms);

    state
        .attendance
        .update_one(
            doc! { "email": email, "date": &date },
            doc! { "$set": {
                "otStartTime": start.at,
                "otStopTime": at,
                "otTime": &ot_time,
                "otSeconds": ot_ms / 1000,
            } },
        )
        .upsert(true)
        .await?;

    // The OT ticket is a one-shot enrollment, consumed on stop.
    state
        .shifts
        .delete_one(doc! { "key": ot_key(email) })
        .await?;

    Ok(OtStopOutcome::Stopped { ot_time })
}

pub async fn snapshot_for(
    state: &AppState,
    email: &str,
    date: &str,
) -> Result<Option<crate::models::AttendanceSnapshot>> {
    state
        .attendance
        .find_one(doc! { "email": email, "date": date })
        .await
        .map_err(Into::into)
}

pub async fn list_snapshots(
    state: &AppState,
    date: &str,
) -> Result<Vec<crate::models::AttendanceSnapshot>> {
    use futures::stream::TryStreamExt;
    let mut cursor = state.attendance.find(doc! { "date": date }).await?;
    let mut items = Vec::new();
    while let Some(snapshot) = cursor.try_next().await? {
        items.push(snapshot);
    }
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dhaka_ms(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> i64 {
        FixedOffset::east_opt(DHAKA_OFFSET_SECS)
            .unwrap()
            .with_ymd_and_hms(y, mo, d, h, mi, s)
            .unwrap()
            .timestamp_millis()
    }

    #[test]
    fn morning_window_accepts_on_time() {
        let shift = ShiftName::Morning;
        assert_eq!(
            evaluate_check_in(&shift, dhaka_ms(2024, 8, 15, 5, 45, 0)),
            CheckInEvaluation::OnTime
        );
        assert_eq!(
            evaluate_check_in(&shift, dhaka_ms(2024, 8, 15, 5, 52, 30)),
            CheckInEvaluation::OnTime
        );
        // The on-time cutoff itself is still clean.
        assert_eq!(
            evaluate_check_in(&shift, dhaka_ms(2024, 8, 15, 6, 0, 0)),
            CheckInEvaluation::OnTime
        );
    }

    #[test]
    fn morning_window_computes_lateness_from_cutoff() {
        let shift = ShiftName::Morning;
        assert_eq!(
            evaluate_check_in(&shift, dhaka_ms(2024, 8, 15, 6, 30, 0)),
            CheckInEvaluation::Late("0h 30m".to_string())
        );
        // Sub-minute remainder is dropped.
        assert_eq!(
            evaluate_check_in(&shift, dhaka_ms(2024, 8, 15, 6, 30, 45)),
            CheckInEvaluation::Late("0h 30m".to_string())
        );
        assert_eq!(
            evaluate_check_in(&shift, dhaka_ms(2024, 8, 15, 11, 59, 0)),
            CheckInEvaluation::Late("5h 59m".to_string())
        );
        assert_eq!(
            evaluate_check_in(&shift, dhaka_ms(2024, 8, 15, 12, 0, 0)),
            CheckInEvaluation::Late("6h 0m".to_string())
        );
    }

    #[test]
    fn morning_window_rejects_outside() {
        let shift = ShiftName::Morning;
        assert_eq!(
            evaluate_check_in(&shift, dhaka_ms(2024, 8, 15, 5, 30, 0)),
            CheckInEvaluation::NotEligible
        );
        assert_eq!(
            evaluate_check_in(&shift, dhaka_ms(2024, 8, 15, 13, 0, 0)),
            CheckInEvaluation::NotEligible
        );
    }

    #[test]
    fn general_window_boundaries() {
        let shift = ShiftName::General;
        assert_eq!(
            evaluate_check_in(&shift, dhaka_ms(2024, 8, 15, 9, 45, 0)),
            CheckInEvaluation::OnTime
        );
        assert_eq!(
            evaluate_check_in(&shift, dhaka_ms(2024, 8, 15, 10, 1, 0)),
            CheckInEvaluation::Late("0h 1m".to_string())
        );
        assert_eq!(
            evaluate_check_in(&shift, dhaka_ms(2024, 8, 15, 16, 1, 0)),
            CheckInEvaluation::NotEligible
        );
    }

    #[test]
    fn evening_window_boundaries() {
        let shift = ShiftName::Evening;
        assert_eq!(
            evaluate_check_in(&shift, dhaka_ms(2024, 8, 15, 14, 5, 0)),
            CheckInEvaluation::OnTime
        );
        assert_eq!(
            evaluate_check_in(&shift, dhaka_ms(2024, 8, 15, 14, 6, 0)),
            CheckInEvaluation::Late("0h 1m".to_string())
        );
        assert_eq!(
            evaluate_check_in(&shift, dhaka_ms(2024, 8, 15, 18, 30, 0)),
            CheckInEvaluation::Late("4h 25m".to_string())
        );
        assert_eq!(
            evaluate_check_in(&shift, dhaka_ms(2024, 8, 15, 18, 31, 0)),
            CheckInEvaluation::NotEligible
        );
    }

    #[test]
    fn night_shift_has_no_window() {
        let shift = ShiftName::Night;
        for (h, m) in [(0, 0), (6, 0), (14, 0), (22, 0)] {
            assert_eq!(
                evaluate_check_in(&shift, dhaka_ms(2024, 8, 15, h, m, 0)),
                CheckInEvaluation::NotEligible
            );
        }
    }

    #[test]
    fn duration_formatting_truncates_below_a_minute() {
        assert_eq!(format_duration(0), "0h 0m");
        assert_eq!(format_duration(59_999), "0h 0m");
        assert_eq!(format_duration(60_000), "0h 1m");
        assert_eq!(format_duration(3_659_999), "1h 0m");
        assert_eq!(format_duration(9 * 3_600_000 + 14 * 60_000 + 59_000), "9h 14m");
    }

    #[test]
    fn date_key_uses_dhaka_local_date() {
        // 19:30 UTC is already past midnight in Dhaka.
        let late_utc = Utc
            .with_ymd_and_hms(2024, 8, 15, 19, 30, 0)
            .unwrap()
            .timestamp_millis();
        assert_eq!(date_key(late_utc), "2024-08-16");
        assert_eq!(date_key(dhaka_ms(2024, 8, 15, 6, 30, 0)), "2024-08-15");
    }
}
