// lib.rs
// Library target so the integration tests drive the same router the binary
// serves.

use std::sync::Arc;

use axum::{
    Router, middleware,
    routing::{delete, get, patch, post, put},
};

pub mod error;
pub mod mailer;
pub mod models;
pub mod otp;
pub mod routes;
pub mod session;
pub mod state;
pub mod uploads;

use state::AppState;

pub fn app(state: Arc<AppState>) -> Router {
    let protected = Router::new()
        .route("/logout", post(routes::logout))
        .route("/me", get(routes::me))
        .route("/employees/register", post(routes::employees_register))
        .route("/employees", get(routes::employees_index))
        .route("/employees/profile", get(routes::employees_profile))
        .route("/employees/{email}", patch(routes::employees_update))
        .route(
            "/employees/{email}/status",
            patch(routes::employees_set_status),
        )
        .route(
            "/employees/salary-pin",
            post(routes::employees_set_salary_pin),
        )
        .route("/shifts/assign", post(routes::shifts_assign))
        .route("/shifts/ot-enroll", post(routes::shifts_ot_enroll))
        .route("/shifts", get(routes::shifts_index))
        .route("/shifts/my", get(routes::shifts_mine))
        .route("/attendance/check-in", post(routes::attendance_check_in))
        .route("/attendance/check-out", post(routes::attendance_check_out))
        .route("/attendance/ot-start", post(routes::attendance_ot_start))
        .route("/attendance/ot-stop", post(routes::attendance_ot_stop))
        .route("/attendance/today", get(routes::attendance_today))
        .route("/attendance", get(routes::attendance_index))
        .route("/expenses", post(routes::expenses_create))
        .route("/transactions", get(routes::transactions_index))
        .route("/balances", get(routes::balances_index))
        .route("/balances/main", post(routes::balances_add_main))
        .route("/balances/hr", post(routes::balances_add_hr))
        .route("/balances/hr/spend", post(routes::balances_spend_hr))
        .route(
            "/earnings",
            get(routes::earnings_index).post(routes::earnings_create),
        )
        .route("/earnings/{id}/status", patch(routes::earnings_set_status))
        .route("/earnings/{id}", put(routes::earnings_update))
        .route("/profit/{year}/{month}", get(routes::monthly_profit_show))
        .route("/profit/share", post(routes::profit_share))
        .route("/unpaid/{year}/{month}", get(routes::unpaid_bucket_show))
        .route(
            "/clients",
            get(routes::clients_index).post(routes::clients_create),
        )
        .route(
            "/clients/{clientId}",
            get(routes::clients_show).patch(routes::clients_update),
        )
        .route(
            "/orders",
            get(routes::orders_index).post(routes::orders_create),
        )
        .route("/orders/{orderId}", get(routes::orders_show))
        .route("/orders/{orderId}/status", patch(routes::orders_set_status))
        .route(
            "/orders/{orderId}/extend-deadline",
            patch(routes::orders_extend_deadline),
        )
        .route("/orders/{orderId}/restore", patch(routes::orders_restore))
        .route("/leaves/apply", post(routes::leaves_apply))
        .route("/leaves/my", get(routes::leaves_mine))
        .route("/leaves", get(routes::leaves_index))
        .route("/leaves/{id}/approve", patch(routes::leaves_approve))
        .route("/leaves/{id}/decline", patch(routes::leaves_decline))
        .route("/leaves/balance", get(routes::leaves_balance))
        .route(
            "/notices",
            get(routes::notices_index).post(routes::notices_create),
        )
        .route("/notices/{id}", delete(routes::notices_delete))
        .route("/notifications", get(routes::notifications_index))
        .route(
            "/notifications/{id}/read",
            patch(routes::notifications_mark_read),
        )
        .route("/otp", get(routes::otp_lookup))
        .route("/uploads", post(routes::upload_file))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            session::require_session,
        ));

    Router::new()
        .route("/login", post(routes::login))
        .route("/activate", post(routes::activate))
        .merge(protected)
        .with_state(state)
}
