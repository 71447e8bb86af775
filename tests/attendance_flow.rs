#[path = "common/mod.rs"]
mod common;

use chrono::{FixedOffset, TimeZone};
use mongodb::bson::doc;

use opsdesk::{
    models::ShiftName,
    state::{
        CheckInOutcome, CheckOutOutcome, OtStartOutcome, OtStopOutcome, assign_shift, enroll_ot,
        ot_key, record_check_in, record_check_out, record_ot_start, record_ot_stop, snapshot_for,
    },
};

fn dhaka_ms(h: u32, mi: u32) -> i64 {
    FixedOffset::east_opt(6 * 3600)
        .unwrap()
        .with_ymd_and_hms(2025, 3, 10, h, mi, 0)
        .unwrap()
        .timestamp_millis()
}

#[tokio::test]
async fn check_in_check_out_updates_snapshot() {
    let ctx = match common::setup_state().await {
        Some(c) => c,
        None => return,
    };
    let state = &ctx.state;
    let email = "worker@opsdesk.test";

    assign_shift(state, email, ShiftName::Morning, "06:00")
        .await
        .unwrap();

    // 06:30 in a morning shift is accepted half an hour late.
    let outcome = record_check_in(state, email, dhaka_ms(6, 30)).await.unwrap();
    assert_eq!(
        outcome,
        CheckInOutcome::Accepted {
            late_check_in: Some("0h 30m".to_string())
        }
    );

    let snapshot = snapshot_for(state, email, "2025-03-10").await.unwrap().unwrap();
    assert_eq!(snapshot.late_check_in.as_deref(), Some("0h 30m"));
    assert_eq!(snapshot.check_in_time, Some(dhaka_ms(6, 30)));

    // Second attempt the same day is a duplicate, not a second record.
    let duplicate = record_check_in(state, email, dhaka_ms(7, 0)).await.unwrap();
    assert_eq!(duplicate, CheckInOutcome::AlreadyCheckedIn);
    let count = state
        .check_ins
        .count_documents(doc! { "email": email })
        .await
        .unwrap();
    assert_eq!(count, 1);

    let checkout = record_check_out(state, email, dhaka_ms(14, 30)).await.unwrap();
    assert_eq!(
        checkout,
        CheckOutOutcome::Accepted {
            working_time: "8h 0m".to_string()
        }
    );
    let snapshot = snapshot_for(state, email, "2025-03-10").await.unwrap().unwrap();
    assert_eq!(snapshot.working_time.as_deref(), Some("8h 0m"));
    assert_eq!(snapshot.working_seconds, Some(8 * 3600));

    let again = record_check_out(state, email, dhaka_ms(15, 0)).await.unwrap();
    assert_eq!(again, CheckOutOutcome::AlreadyCheckedOut);

    common::teardown(Some(ctx)).await;
}

#[tokio::test]
async fn ineligible_check_in_writes_nothing() {
    let ctx = match common::setup_state().await {
        Some(c) => c,
        None => return,
    };
    let state = &ctx.state;
    let email = "late@opsdesk.test";

    assign_shift(state, email, ShiftName::Morning, "06:00")
        .await
        .unwrap();

    // 13:00 is past the morning late-cutoff.
    let outcome = record_check_in(state, email, dhaka_ms(13, 0)).await.unwrap();
    assert_eq!(outcome, CheckInOutcome::NotEligible);
    let count = state
        .check_ins
        .count_documents(doc! { "email": email })
        .await
        .unwrap();
    assert_eq!(count, 0);

    // Night shift falls through to the same rejection at any hour.
    assign_shift(state, email, ShiftName::Night, "22:00")
        .await
        .unwrap();
    let outcome = record_check_in(state, email, dhaka_ms(22, 0)).await.unwrap();
    assert_eq!(outcome, CheckInOutcome::NotEligible);

    common::teardown(Some(ctx)).await;
}

#[tokio::test]
async fn check_out_without_check_in_is_rejected() {
    let ctx = match common::setup_state().await {
        Some(c) => c,
        None => return,
    };
    let state = &ctx.state;

    let outcome = record_check_out(state, "ghost@opsdesk.test", dhaka_ms(17, 0))
        .await
        .unwrap();
    assert_eq!(outcome, CheckOutOutcome::NoCheckIn);

    common::teardown(Some(ctx)).await;
}

#[tokio::test]
async fn ot_ticket_is_consumed_on_stop() {
    let ctx = match common::setup_state().await {
        Some(c) => c,
        None => return,
    };
    let state = &ctx.state;
    let email = "ot@opsdesk.test";

    // Without a ticket, OT cannot start.
    let outcome = record_ot_start(state, email, dhaka_ms(19, 0)).await.unwrap();
    assert_eq!(outcome, OtStartOutcome::NotEnrolled);

    assert!(enroll_ot(state, email, "19:00").await.unwrap());
    assert!(!enroll_ot(state, email, "19:00").await.unwrap());

    let outcome = record_ot_start(state, email, dhaka_ms(19, 0)).await.unwrap();
    assert_eq!(outcome, OtStartOutcome::Started);
    let outcome = record_ot_start(state, email, dhaka_ms(19, 30)).await.unwrap();
    assert_eq!(outcome, OtStartOutcome::AlreadyStarted);

    let outcome = record_ot_stop(state, email, dhaka_ms(21, 15)).await.unwrap();
    assert_eq!(
        outcome,
        OtStopOutcome::Stopped {
            ot_time: "2h 15m".to_string()
        }
    );

    let snapshot = snapshot_for(state, email, "2025-03-10").await.unwrap().unwrap();
    assert_eq!(snapshot.ot_time.as_deref(), Some("2h 15m"));

    // The ticket is one-shot: gone after the stop.
    let ticket = state
        .shifts
        .find_one(doc! { "key": ot_key(email) })
        .await
        .unwrap();
    assert!(ticket.is_none());

    let outcome = record_ot_stop(state, email, dhaka_ms(22, 0)).await.unwrap();
    assert_eq!(outcome, OtStopOutcome::AlreadyStopped);

    common::teardown(Some(ctx)).await;
}

#[tokio::test]
async fn ot_stop_without_start_is_rejected() {
    let ctx = match common::setup_state().await {
        Some(c) => c,
        None => return,
    };
    let state = &ctx.state;

    let outcome = record_ot_stop(state, "nobody@opsdesk.test", dhaka_ms(21, 0))
        .await
        .unwrap();
    assert_eq!(outcome, OtStopOutcome::NoStart);

    common::teardown(Some(ctx)).await;
}
