#[path = "common/mod.rs"]
mod common;

use opsdesk::{
    models::EarningStatus,
    state::{
        EarningMutation, LedgerOutcome, add_earning, add_expense, add_hr_balance,
        add_main_balance, change_earning_status, create_client, get_balances, get_client,
        get_monthly_profit, get_unpaid_bucket, list_earnings, list_transactions, share_profit,
        spend_hr_balance, update_earning,
    },
};

async fn unpaid_total(state: &opsdesk::state::AppState, month: &str, year: i32) -> f64 {
    get_unpaid_bucket(state, month, year)
        .await
        .unwrap()
        .map(|b| b.total_converted_bdt)
        .unwrap_or(0.0)
}

async fn unpaid_earnings_sum(state: &opsdesk::state::AppState, month: &str, year: i32) -> f64 {
    list_earnings(state, Some(month), Some(year), None)
        .await
        .unwrap()
        .into_iter()
        .filter(|e| e.status == EarningStatus::Unpaid)
        .map(|e| e.converted_bdt)
        .sum()
}

#[tokio::test]
async fn expenses_and_balances_stay_consistent() {
    let ctx = match common::setup_state().await {
        Some(c) => c,
        None => return,
    };
    let state = &ctx.state;

    add_main_balance(state, 10_000.0, "initial top-up").await.unwrap();
    assert_eq!(get_balances(state).await.unwrap(), (10_000.0, 0.0));

    // A covered expense decreases main by exactly the amount and logs it.
    let outcome = add_expense(state, 3_000.0, "office rent", "august", 2025)
        .await
        .unwrap();
    assert_eq!(outcome, LedgerOutcome::Applied);
    assert_eq!(get_balances(state).await.unwrap(), (7_000.0, 0.0));

    let expenses = list_transactions(state, Some("Expense")).await.unwrap();
    assert_eq!(expenses.len(), 1);
    assert_eq!(expenses[0].amount, 3_000.0);

    let bucket = get_monthly_profit(state, "august", 2025).await.unwrap().unwrap();
    assert_eq!(bucket.expense, 3_000.0);
    assert_eq!(bucket.profit, -3_000.0);
    assert_eq!(bucket.remaining, -3_000.0);

    // An uncovered expense is rejected without touching anything.
    let outcome = add_expense(state, 999_999.0, "too big", "august", 2025)
        .await
        .unwrap();
    assert_eq!(outcome, LedgerOutcome::Insufficient);
    assert_eq!(get_balances(state).await.unwrap(), (7_000.0, 0.0));
    assert_eq!(list_transactions(state, Some("Expense")).await.unwrap().len(), 1);

    // HR top-ups draw down main; HR spends are guarded by the HR balance.
    assert_eq!(
        add_hr_balance(state, 2_000.0, "hr float").await.unwrap(),
        LedgerOutcome::Applied
    );
    assert_eq!(get_balances(state).await.unwrap(), (5_000.0, 2_000.0));
    assert_eq!(
        spend_hr_balance(state, 2_500.0, "snacks").await.unwrap(),
        LedgerOutcome::Insufficient
    );
    assert_eq!(
        spend_hr_balance(state, 500.0, "snacks").await.unwrap(),
        LedgerOutcome::Applied
    );
    assert_eq!(get_balances(state).await.unwrap(), (5_000.0, 1_500.0));

    assert_eq!(list_transactions(state, Some("Credit")).await.unwrap().len(), 1);
    assert_eq!(list_transactions(state, Some("In")).await.unwrap().len(), 1);
    assert_eq!(list_transactions(state, Some("Out")).await.unwrap().len(), 1);

    common::teardown(Some(ctx)).await;
}

#[tokio::test]
async fn earning_status_changes_move_value_between_buckets() {
    let ctx = match common::setup_state().await {
        Some(c) => c,
        None => return,
    };
    let state = &ctx.state;

    add_main_balance(state, 5_000.0, "seed").await.unwrap();
    create_client(state, "C1", "Acme Prints", None, None).await.unwrap();

    let id = add_earning(
        state, "C1", "august", 2025, 45.0, 50.0, 44.0, 110.0, 5_000.0,
        EarningStatus::Unpaid,
    )
    .await
    .unwrap();

    // Unpaid earnings land in the unpaid bucket, not the main balance.
    assert_eq!(unpaid_total(state, "august", 2025).await, 5_000.0);
    assert_eq!(get_balances(state).await.unwrap().0, 5_000.0);
    let bucket = get_monthly_profit(state, "august", 2025).await.unwrap().unwrap();
    assert_eq!(bucket.earnings, 5_000.0);

    // Unpaid -> Paid: bucket drains, main gains, one positive adjustment.
    let mutation = change_earning_status(state, &id, EarningStatus::Paid).await.unwrap();
    assert_eq!(mutation, EarningMutation::Applied);
    assert_eq!(unpaid_total(state, "august", 2025).await, 0.0);
    assert_eq!(get_balances(state).await.unwrap().0, 10_000.0);

    let plus = list_transactions(state, Some("Adjustment (+)")).await.unwrap();
    assert_eq!(plus.len(), 1);
    assert_eq!(plus[0].amount, 5_000.0);

    let client = get_client(state, "C1").await.unwrap().unwrap();
    assert_eq!(client.payment_history.len(), 1);
    assert_eq!(client.payment_history[0].amount_bdt, 5_000.0);

    // Paid -> Unpaid reverses the move.
    change_earning_status(state, &id, EarningStatus::Unpaid).await.unwrap();
    assert_eq!(unpaid_total(state, "august", 2025).await, 5_000.0);
    assert_eq!(get_balances(state).await.unwrap().0, 5_000.0);
    assert_eq!(
        list_transactions(state, Some("Adjustment (-)")).await.unwrap().len(),
        1
    );

    // The running invariant: unpaid earnings sum equals the bucket total.
    assert_eq!(
        unpaid_earnings_sum(state, "august", 2025).await,
        unpaid_total(state, "august", 2025).await
    );

    common::teardown(Some(ctx)).await;
}

#[tokio::test]
async fn earning_updates_move_value_between_months() {
    let ctx = match common::setup_state().await {
        Some(c) => c,
        None => return,
    };
    let state = &ctx.state;

    create_client(state, "C2", "Globex", None, None).await.unwrap();
    let id = add_earning(
        state, "C2", "august", 2025, 45.0, 50.0, 44.0, 110.0, 5_000.0,
        EarningStatus::Unpaid,
    )
    .await
    .unwrap();

    // Rewriting month and amount moves the value out of august entirely.
    let mutation = update_earning(
        state, &id, "C2", "september", 2025, 60.0, 65.0, 58.0, 110.0, 7_000.0,
        EarningStatus::Unpaid,
    )
    .await
    .unwrap();
    assert_eq!(mutation, EarningMutation::Applied);

    assert_eq!(unpaid_total(state, "august", 2025).await, 0.0);
    assert_eq!(unpaid_total(state, "september", 2025).await, 7_000.0);

    let august = get_monthly_profit(state, "august", 2025).await.unwrap().unwrap();
    assert_eq!(august.earnings, 0.0);
    let september = get_monthly_profit(state, "september", 2025).await.unwrap().unwrap();
    assert_eq!(september.earnings, 7_000.0);

    assert_eq!(
        unpaid_earnings_sum(state, "september", 2025).await,
        unpaid_total(state, "september", 2025).await
    );

    common::teardown(Some(ctx)).await;
}

#[tokio::test]
async fn profit_sharing_is_capped_by_remaining() {
    let ctx = match common::setup_state().await {
        Some(c) => c,
        None => return,
    };
    let state = &ctx.state;

    create_client(state, "C3", "Initech", None, None).await.unwrap();
    add_earning(
        state, "C3", "july", 2025, 60.0, 65.0, 58.0, 110.0, 7_000.0,
        EarningStatus::Unpaid,
    )
    .await
    .unwrap();

    assert_eq!(
        share_profit(state, "july", 2025, "partner-a", 3_000.0, None)
            .await
            .unwrap(),
        LedgerOutcome::Applied
    );
    let bucket = get_monthly_profit(state, "july", 2025).await.unwrap().unwrap();
    assert_eq!(bucket.remaining, 4_000.0);
    assert_eq!(bucket.shared.len(), 1);
    assert_eq!(bucket.shared[0].recipient, "partner-a");

    assert_eq!(
        share_profit(state, "july", 2025, "partner-b", 999_999.0, None)
            .await
            .unwrap(),
        LedgerOutcome::Insufficient
    );
    // A month with no bucket cannot be shared from at all.
    assert_eq!(
        share_profit(state, "december", 2025, "partner-b", 1.0, None)
            .await
            .unwrap(),
        LedgerOutcome::Insufficient
    );

    common::teardown(Some(ctx)).await;
}
