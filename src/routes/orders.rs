use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};

use crate::{
    error::AppError,
    models::{Client, LocalOrder, OrderStatus, Role},
    session::SessionUser,
    state::{
        AppState, ClientCreate, OrderCreate, OrderTransition, create_client, create_order,
        extend_order_deadline, get_client, get_order, list_clients, list_orders, restore_order,
        update_client, update_order_status,
    },
};

use super::{ApiMessage, accepted, clean_opt, parse_datetime, rejected};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientForm {
    pub client_id: String,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
}

pub async fn clients_create(
    session_user: SessionUser,
    State(state): State<Arc<AppState>>,
    Json(form): Json<ClientForm>,
) -> Result<Json<ApiMessage>, AppError> {
    session_user.require_role(&[Role::Admin, Role::HrAdmin])?;
    if form.client_id.trim().is_empty() {
        return Err(AppError::bad_request("clientId is required"));
    }

    match create_client(
        &state,
        form.client_id.trim(),
        form.name.trim(),
        clean_opt(form.email),
        clean_opt(form.country),
    )
    .await?
    {
        ClientCreate::Created => Ok(accepted("client created")),
        ClientCreate::Duplicate => Ok(rejected("client already exists")),
    }
}

pub async fn clients_index(
    session_user: SessionUser,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Client>>, AppError> {
    session_user.require_role(&[Role::Admin, Role::HrAdmin, Role::TeamLeader])?;
    Ok(Json(list_clients(&state).await?))
}

pub async fn clients_show(
    session_user: SessionUser,
    State(state): State<Arc<AppState>>,
    Path(client_id): Path<String>,
) -> Result<Json<Client>, AppError> {
    session_user.require_role(&[Role::Admin, Role::HrAdmin, Role::TeamLeader])?;
    get_client(&state, &client_id)
        .await?
        .map(Json)
        .ok_or(AppError::NotFound("client"))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientUpdateForm {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
}

pub async fn clients_update(
    session_user: SessionUser,
    State(state): State<Arc<AppState>>,
    Path(client_id): Path<String>,
    Json(form): Json<ClientUpdateForm>,
) -> Result<Json<ApiMessage>, AppError> {
    session_user.require_role(&[Role::Admin, Role::HrAdmin])?;

    if !update_client(
        &state,
        &client_id,
        form.name.trim(),
        clean_opt(form.email),
        clean_opt(form.country),
    )
    .await?
    {
        return Err(AppError::NotFound("client"));
    }
    Ok(accepted("client updated"))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderForm {
    pub client_id: String,
    pub title: String,
    #[serde(default)]
    pub quantity: Option<i64>,
    #[serde(default)]
    pub instructions: Option<String>,
    pub deadline: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderCreated {
    pub success: bool,
    pub order_id: String,
}

pub async fn orders_create(
    session_user: SessionUser,
    State(state): State<Arc<AppState>>,
    Json(form): Json<OrderForm>,
) -> Result<Json<OrderCreated>, AppError> {
    session_user.require_role(&[Role::Admin, Role::HrAdmin, Role::TeamLeader])?;

    let deadline = parse_datetime(&form.deadline, "deadline")?;
    match create_order(
        &state,
        form.client_id.trim(),
        form.title.trim(),
        form.quantity,
        clean_opt(form.instructions),
        deadline,
    )
    .await?
    {
        OrderCreate::Created { order_id } => Ok(Json(OrderCreated {
            success: true,
            order_id,
        })),
        OrderCreate::ClientNotFound => Err(AppError::NotFound("client")),
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrdersQuery {
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

pub async fn orders_index(
    session_user: SessionUser,
    State(state): State<Arc<AppState>>,
    Query(query): Query<OrdersQuery>,
) -> Result<Json<Vec<LocalOrder>>, AppError> {
    session_user.require_role(&[Role::Admin, Role::HrAdmin, Role::TeamLeader, Role::Developer])?;
    Ok(Json(
        list_orders(&state, query.client_id.as_deref(), query.status.as_deref()).await?,
    ))
}

pub async fn orders_show(
    session_user: SessionUser,
    State(state): State<Arc<AppState>>,
    Path(order_id): Path<String>,
) -> Result<Json<LocalOrder>, AppError> {
    session_user.require_role(&[Role::Admin, Role::HrAdmin, Role::TeamLeader, Role::Developer])?;
    get_order(&state, &order_id)
        .await?
        .map(Json)
        .ok_or(AppError::NotFound("order"))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderStatusForm {
    pub status: String,
}

pub async fn orders_set_status(
    session_user: SessionUser,
    State(state): State<Arc<AppState>>,
    Path(order_id): Path<String>,
    Json(form): Json<OrderStatusForm>,
) -> Result<Json<ApiMessage>, AppError> {
    session_user.require_role(&[Role::Admin, Role::HrAdmin, Role::TeamLeader])?;

    let status = OrderStatus::parse(&form.status)
        .ok_or_else(|| AppError::bad_request("invalid order status"))?;
    match update_order_status(&state, &order_id, status).await? {
        OrderTransition::Updated => Ok(accepted("order status updated")),
        OrderTransition::Locked => Ok(rejected("order is locked")),
        OrderTransition::NotFound => Err(AppError::NotFound("order")),
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtendDeadlineForm {
    pub deadline: String,
}

pub async fn orders_extend_deadline(
    session_user: SessionUser,
    State(state): State<Arc<AppState>>,
    Path(order_id): Path<String>,
    Json(form): Json<ExtendDeadlineForm>,
) -> Result<Json<ApiMessage>, AppError> {
    session_user.require_role(&[Role::Admin, Role::HrAdmin])?;

    let deadline = parse_datetime(&form.deadline, "deadline")?;
    match extend_order_deadline(&state, &order_id, deadline).await? {
        OrderTransition::NotFound => Err(AppError::NotFound("order")),
        _ => Ok(accepted("deadline extended")),
    }
}

pub async fn orders_restore(
    session_user: SessionUser,
    State(state): State<Arc<AppState>>,
    Path(order_id): Path<String>,
) -> Result<Json<ApiMessage>, AppError> {
    session_user.require_role(&[Role::Admin, Role::HrAdmin])?;

    match restore_order(&state, &order_id).await? {
        OrderTransition::NotFound => Err(AppError::NotFound("order")),
        _ => Ok(accepted("order restored")),
    }
}
