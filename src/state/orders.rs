use anyhow::Result;
use futures::stream::TryStreamExt;
use mongodb::bson::doc;
use uuid::Uuid;

use crate::models::{Client, LocalOrder, OrderHistoryEntry, OrderStatus};

use super::{AppState, is_duplicate_key, now};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientCreate {
    Created,
    Duplicate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderCreate {
    Created { order_id: String },
    ClientNotFound,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderTransition {
    Updated,
    Locked,
    NotFound,
}

pub async fn create_client(
    state: &AppState,
    client_id: &str,
    name: &str,
    email: Option<String>,
    country: Option<String>,
) -> Result<ClientCreate> {
    let client = Client {
        id: None,
        client_id: client_id.to_string(),
        name: name.to_string(),
        email,
        country,
        order_history: Vec::new(),
        payment_history: Vec::new(),
        created_at: now(),
    };
    match state.clients.insert_one(client).await {
        Ok(_) => Ok(ClientCreate::Created),
        Err(err) if is_duplicate_key(&err) => Ok(ClientCreate::Duplicate),
        Err(err) => Err(err.into()),
    }
}

pub async fn get_client(state: &AppState, client_id: &str) -> Result<Option<Client>> {
    state
        .clients
        .find_one(doc! { "clientId": client_id })
        .await
        .map_err(Into::into)
}

pub async fn list_clients(state: &AppState) -> Result<Vec<Client>> {
    let mut cursor = state.clients.find(doc! {}).await?;
    let mut items = Vec::new();
    while let Some(client) = cursor.try_next().await? {
        items.push(client);
    }
    Ok(items)
}

pub async fn update_client(
    state: &AppState,
    client_id: &str,
    name: &str,
    email: Option<String>,
    country: Option<String>,
) -> Result<bool> {
    let res = state
        .clients
        .update_one(
            doc! { "clientId": client_id },
            doc! { "$set": { "name": name, "email": email, "country": country } },
        )
        .await?;
    Ok(res.matched_count > 0)
}

pub async fn create_order(
    state: &AppState,
    client_id: &str,
    title: &str,
    quantity: Option<i64>,
    instructions: Option<String>,
    deadline: mongodb::bson::DateTime,
) -> Result<OrderCreate> {
    if get_client(state, client_id).await?.is_none() {
        return Ok(OrderCreate::ClientNotFound);
    }

    let order_id = Uuid::new_v4().to_string();
    state
        .local_orders
        .insert_one(LocalOrder {
            id: None,
            order_id: order_id.clone(),
            client_id: client_id.to_string(),
            title: title.to_string(),
            quantity,
            instructions,
            deadline,
            order_status: OrderStatus::Pending,
            is_locked: false,
            created_at: now(),
        })
        .await?;

    let history = OrderHistoryEntry {
        order_id: order_id.clone(),
        title: title.to_string(),
        date: now(),
    };
    state
        .clients
        .update_one(
            doc! { "clientId": client_id },
            doc! { "$push": { "orderHistory": mongodb::bson::to_bson(&history)? } },
        )
        .await?;

    Ok(OrderCreate::Created { order_id })
}

pub async fn get_order(state: &AppState, order_id: &str) -> Result<Option<LocalOrder>> {
    state
        .local_orders
        .find_one(doc! { "orderId": order_id })
        .await
        .map_err(Into::into)
}

pub async fn list_orders(
    state: &AppState,
    client_id: Option<&str>,
    status: Option<&str>,
) -> Result<Vec<LocalOrder>> {
    let mut filter = doc! {};
    if let Some(c) = client_id {
        filter.insert("clientId", c);
    }
    if let Some(s) = status {
        filter.insert("orderStatus", s);
    }
    let mut cursor = state.local_orders.find(filter).await?;
    let mut items = Vec::new();
    while let Some(order) = cursor.try_next().await? {
        items.push(order);
    }
    Ok(items)
}

/// Status writes are gated only by the lock flag: any unlocked order may move
/// to any status, and Completed/Cancel flip the lock on.
pub async fn update_order_status(
    state: &AppState,
    order_id: &str,
    status: OrderStatus,
) -> Result<OrderTransition> {
    let Some(order) = get_order(state, order_id).await? else {
        return Ok(OrderTransition::NotFound);
    };
    if order.is_locked {
        return Ok(OrderTransition::Locked);
    }

    state
        .local_orders
        .update_one(
            doc! { "orderId": order_id },
            doc! { "$set": {
                "orderStatus": status.as_str(),
                "isLocked": status.locks(),
            } },
        )
        .await?;

    Ok(OrderTransition::Updated)
}

/// One of the two escapes from a locked order: a new deadline reopens it as
/// Pending.
pub async fn extend_order_deadline(
    state: &AppState,
    order_id: &str,
    deadline: mongodb::bson::DateTime,
) -> Result<OrderTransition> {
    let res = state
        .local_orders
        .update_one(
            doc! { "orderId": order_id },
            doc! { "$set": {
                "deadline": deadline,
                "orderStatus": OrderStatus::Pending.as_str(),
                "isLocked": false,
            } },
        )
        .await?;
    if res.matched_count == 0 {
        return Ok(OrderTransition::NotFound);
    }
    Ok(OrderTransition::Updated)
}

pub async fn restore_order(state: &AppState, order_id: &str) -> Result<OrderTransition> {
    let res = state
        .local_orders
        .update_one(
            doc! { "orderId": order_id },
            doc! { "$set": {
                "orderStatus": OrderStatus::Pending.as_str(),
                "isLocked": false,
            } },
        )
        .await?;
    if res.matched_count == 0 {
        return Ok(OrderTransition::NotFound);
    }
    Ok(OrderTransition::Updated)
}
