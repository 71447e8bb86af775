#[path = "common/mod.rs"]
mod common;

use mongodb::bson::DateTime;

use opsdesk::{
    models::OrderStatus,
    state::{
        ClientCreate, OrderCreate, OrderTransition, create_client, create_order,
        extend_order_deadline, get_client, get_order, restore_order, update_order_status,
    },
};

fn deadline() -> DateTime {
    DateTime::parse_rfc3339_str("2025-06-01T00:00:00Z").unwrap()
}

#[tokio::test]
async fn duplicate_clients_are_rejected() {
    let ctx = match common::setup_state().await {
        Some(c) => c,
        None => return,
    };
    let state = &ctx.state;

    assert_eq!(
        create_client(state, "CL-1", "Acme", None, None).await.unwrap(),
        ClientCreate::Created
    );
    assert_eq!(
        create_client(state, "CL-1", "Acme again", None, None).await.unwrap(),
        ClientCreate::Duplicate
    );

    common::teardown(Some(ctx)).await;
}

#[tokio::test]
async fn order_lock_gates_every_transition() {
    let ctx = match common::setup_state().await {
        Some(c) => c,
        None => return,
    };
    let state = &ctx.state;

    create_client(state, "CL-2", "Globex", None, None).await.unwrap();
    let OrderCreate::Created { order_id } =
        create_order(state, "CL-2", "50 photo edits", Some(50), None, deadline())
            .await
            .unwrap()
    else {
        panic!("order creation failed");
    };

    // Order creation is mirrored into the client's history.
    let client = get_client(state, "CL-2").await.unwrap().unwrap();
    assert_eq!(client.order_history.len(), 1);
    assert_eq!(client.order_history[0].order_id, order_id);

    // Unlocked orders move freely between statuses.
    assert_eq!(
        update_order_status(state, &order_id, OrderStatus::InProgress)
            .await
            .unwrap(),
        OrderTransition::Updated
    );
    assert_eq!(
        update_order_status(state, &order_id, OrderStatus::ReadyToQc)
            .await
            .unwrap(),
        OrderTransition::Updated
    );

    // Completed locks the order.
    update_order_status(state, &order_id, OrderStatus::Completed)
        .await
        .unwrap();
    let order = get_order(state, &order_id).await.unwrap().unwrap();
    assert!(order.is_locked);
    assert_eq!(order.order_status, OrderStatus::Completed);

    // Every further status write bounces off the lock, whatever the target.
    for status in [
        OrderStatus::Pending,
        OrderStatus::Delivered,
        OrderStatus::Hold,
    ] {
        assert_eq!(
            update_order_status(state, &order_id, status).await.unwrap(),
            OrderTransition::Locked
        );
    }

    // Restore is one of the two escapes: unlocked and back to Pending.
    assert_eq!(
        restore_order(state, &order_id).await.unwrap(),
        OrderTransition::Updated
    );
    let order = get_order(state, &order_id).await.unwrap().unwrap();
    assert!(!order.is_locked);
    assert_eq!(order.order_status, OrderStatus::Pending);

    // Cancel locks again; extending the deadline reopens.
    update_order_status(state, &order_id, OrderStatus::Cancel)
        .await
        .unwrap();
    assert!(get_order(state, &order_id).await.unwrap().unwrap().is_locked);

    let new_deadline = DateTime::parse_rfc3339_str("2025-07-01T00:00:00Z").unwrap();
    assert_eq!(
        extend_order_deadline(state, &order_id, new_deadline)
            .await
            .unwrap(),
        OrderTransition::Updated
    );
    let order = get_order(state, &order_id).await.unwrap().unwrap();
    assert!(!order.is_locked);
    assert_eq!(order.order_status, OrderStatus::Pending);
    assert_eq!(order.deadline, new_deadline);

    common::teardown(Some(ctx)).await;
}

#[tokio::test]
async fn missing_orders_and_clients_are_reported() {
    let ctx = match common::setup_state().await {
        Some(c) => c,
        None => return,
    };
    let state = &ctx.state;

    assert_eq!(
        create_order(state, "no-such-client", "job", None, None, deadline())
            .await
            .unwrap(),
        OrderCreate::ClientNotFound
    );
    assert_eq!(
        update_order_status(state, "no-such-order", OrderStatus::Hold)
            .await
            .unwrap(),
        OrderTransition::NotFound
    );
    assert_eq!(
        restore_order(state, "no-such-order").await.unwrap(),
        OrderTransition::NotFound
    );

    common::teardown(Some(ctx)).await;
}
