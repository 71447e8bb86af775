#[path = "common/mod.rs"]
mod common;

use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode},
};
use mongodb::bson::DateTime;
use serde_json::{Value, json};
use tower::ServiceExt; // for oneshot

use opsdesk::{
    app,
    models::{Employee, EmployeeStatus, OrderStatus, Role},
    state::{create_client, create_order, update_order_status},
};

async fn send(
    app: Router,
    method: &str,
    path: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(path);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(value) => builder
            .header("content-type", "application/json")
            .body(Body::from(value.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = app.oneshot(request).await.expect("request failed");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("body read failed");
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

#[tokio::test]
async fn login_and_session_guard() {
    let ctx = match common::setup_state().await {
        Some(c) => c,
        None => return,
    };
    let state = &ctx.state;
    let shared = Arc::new(state.clone());

    let _token = common::login_as(state, "admin@opsdesk.test", Role::Admin).await;

    // Wrong password is a 401, right password returns a token.
    let (status, _) = send(
        app(shared.clone()),
        "POST",
        "/login",
        None,
        Some(json!({ "email": "admin@opsdesk.test", "password": "wrong" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(
        app(shared.clone()),
        "POST",
        "/login",
        None,
        Some(json!({ "email": "admin@opsdesk.test", "password": "secret123" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let token = body["token"].as_str().expect("token in login body").to_string();

    // Protected routes reject missing tokens and accept the fresh one.
    let (status, _) = send(app(shared.clone()), "GET", "/employees", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        app(shared.clone()),
        "GET",
        "/employees",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    common::teardown(Some(ctx)).await;
}

#[tokio::test]
async fn role_allow_lists_are_enforced() {
    let ctx = match common::setup_state().await {
        Some(c) => c,
        None => return,
    };
    let state = &ctx.state;
    let shared = Arc::new(state.clone());

    let employee_token = common::login_as(state, "emp@opsdesk.test", Role::Employee).await;

    let (status, _) = send(
        app(shared.clone()),
        "GET",
        "/transactions",
        Some(&employee_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Self-match reads reject other people's emails for plain employees.
    let (status, _) = send(
        app(shared.clone()),
        "GET",
        "/leaves/balance?userEmail=other@opsdesk.test",
        Some(&employee_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    common::teardown(Some(ctx)).await;
}

#[tokio::test]
async fn business_rejections_ride_on_200() {
    let ctx = match common::setup_state().await {
        Some(c) => c,
        None => return,
    };
    let state = &ctx.state;
    let shared = Arc::new(state.clone());

    let token = common::login_as(state, "noshift@opsdesk.test", Role::Employee).await;

    // No shift assigned: still HTTP 200, message body carries the rejection.
    let (status, body) = send(
        app(shared.clone()),
        "POST",
        "/attendance/check-in",
        Some(&token),
        Some(json!({ "time": 1_755_000_000_000_i64 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["message"], json!("no shift assigned"));

    // Missing check-in on checkout is the mandated structured 400.
    let (status, _) = send(
        app(shared.clone()),
        "POST",
        "/attendance/check-out",
        Some(&token),
        Some(json!({ "time": 1_755_000_000_000_i64 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // A locked order rejects with 200 + message, not an error status.
    let hr_token = common::login_as(state, "hr@opsdesk.test", Role::HrAdmin).await;
    create_client(state, "CL-H", "Hooli", None, None).await.unwrap();
    let opsdesk::state::OrderCreate::Created { order_id } = create_order(
        state,
        "CL-H",
        "retouching batch",
        None,
        None,
        DateTime::parse_rfc3339_str("2025-06-01T00:00:00Z").unwrap(),
    )
    .await
    .unwrap() else {
        panic!("order creation failed");
    };
    update_order_status(state, &order_id, OrderStatus::Completed)
        .await
        .unwrap();

    let (status, body) = send(
        app(shared.clone()),
        "PATCH",
        &format!("/orders/{order_id}/status"),
        Some(&hr_token),
        Some(json!({ "status": "Hold" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["message"], json!("order is locked"));

    common::teardown(Some(ctx)).await;
}

#[tokio::test]
async fn leave_flow_over_http() {
    let ctx = match common::setup_state().await {
        Some(c) => c,
        None => return,
    };
    let state = &ctx.state;
    let shared = Arc::new(state.clone());

    let email = "leaver@opsdesk.test";
    let employee_token = common::login_as(state, email, Role::Employee).await;
    let hr_token = common::login_as(state, "hr2@opsdesk.test", Role::HrAdmin).await;

    state
        .employees
        .insert_one(Employee {
            id: None,
            employee_id: "EMP-7".to_string(),
            email: email.to_string(),
            name: "Leaver".to_string(),
            designation: "Editor".to_string(),
            phone: None,
            address: None,
            photo_url: None,
            joining_date: DateTime::parse_rfc3339_str("2024-01-01T00:00:00Z").unwrap(),
            status: EmployeeStatus::Active,
            salary_pin_hash: None,
        })
        .await
        .unwrap();

    let apply = json!({
        "days": 2,
        "fromDate": "2025-04-01T00:00:00Z",
        "toDate": "2025-04-03T00:00:00Z",
        "reason": "family visit",
    });
    let (status, body) = send(
        app(shared.clone()),
        "POST",
        "/leaves/apply",
        Some(&employee_token),
        Some(apply.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));

    // A second application while one is pending is rejected.
    let (status, body) = send(
        app(shared.clone()),
        "POST",
        "/leaves/apply",
        Some(&employee_token),
        Some(apply),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(false));

    let (status, body) = send(app(shared.clone()), "GET", "/leaves", Some(&hr_token), None).await;
    assert_eq!(status, StatusCode::OK);
    let id = body[0]["_id"]["$oid"].as_str().expect("leave id").to_string();

    let (status, body) = send(
        app(shared.clone()),
        "PATCH",
        &format!("/leaves/{id}/approve"),
        Some(&hr_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));

    // Approval spends the balance and parks the employee on leave.
    let (status, body) = send(
        app(shared.clone()),
        "GET",
        &format!("/leaves/balance?userEmail={email}"),
        Some(&employee_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["casualLeave"], json!(8));

    let employee = state
        .employees
        .find_one(mongodb::bson::doc! { "email": email })
        .await
        .unwrap()
        .unwrap();
    assert_eq!(employee.status, EmployeeStatus::OnLeave);

    // The approval also left a notification for the employee.
    let (status, body) = send(
        app(shared.clone()),
        "GET",
        &format!("/notifications?userEmail={email}"),
        Some(&employee_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(!body.as_array().unwrap().is_empty());

    common::teardown(Some(ctx)).await;
}
