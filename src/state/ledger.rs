use anyhow::{Context, Result};
use futures::stream::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId};

use crate::models::{
    Earning, EarningStatus, LedgerEntry, LedgerType, MonthlyProfit, PaymentHistoryEntry,
    UnpaidBucket,
};

use super::{AppState, HR_BALANCE_KEY, MAIN_BALANCE_KEY, now};

/// Result of a guarded ledger mutation. Insufficient funds is a business
/// outcome, not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerOutcome {
    Applied,
    Insufficient,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EarningMutation {
    Applied,
    NotFound,
}

pub async fn get_balance(state: &AppState, key: &str) -> Result<f64> {
    let balance = state
        .balances
        .find_one(doc! { "_id": key })
        .await?
        .with_context(|| format!("balance document '{key}' missing"))?;
    Ok(balance.amount)
}

pub async fn get_balances(state: &AppState) -> Result<(f64, f64)> {
    Ok((
        get_balance(state, MAIN_BALANCE_KEY).await?,
        get_balance(state, HR_BALANCE_KEY).await?,
    ))
}

async fn inc_balance(state: &AppState, key: &str, delta: f64) -> Result<()> {
    state
        .balances
        .update_one(
            doc! { "_id": key },
            doc! {
                "$inc": { "amount": delta },
                "$set": { "updatedAt": now() },
            },
        )
        .await?;
    Ok(())
}

async fn log_entry(state: &AppState, amount: f64, note: &str, entry_type: LedgerType) -> Result<()> {
    state
        .transactions
        .insert_one(LedgerEntry {
            id: None,
            amount,
            note: note.to_string(),
            entry_type,
            date: now(),
        })
        .await?;
    Ok(())
}

// Monthly bucket increments keep profit = earnings - expense and remaining in
// step with profit; distributions only ever reduce remaining.
async fn bump_monthly(
    state: &AppState,
    month: &str,
    year: i32,
    earnings_delta: f64,
    expense_delta: f64,
) -> Result<()> {
    let profit_delta = earnings_delta - expense_delta;
    state
        .monthly_profits
        .update_one(
            doc! { "month": month, "year": year },
            doc! {
                "$inc": {
                    "earnings": earnings_delta,
                    "expense": expense_delta,
                    "profit": profit_delta,
                    "remaining": profit_delta,
                },
                "$setOnInsert": { "shared": [] },
            },
        )
        .upsert(true)
        .await?;
    Ok(())
}

async fn bump_unpaid(state: &AppState, month: &str, year: i32, delta: f64) -> Result<()> {
    state
        .unpaid_buckets
        .update_one(
            doc! { "month": month, "year": year },
            doc! { "$inc": { "totalConvertedBdt": delta } },
        )
        .upsert(true)
        .await?;
    Ok(())
}

async fn push_payment_history(
    state: &AppState,
    client_id: &str,
    amount_bdt: f64,
    month: &str,
    year: i32,
) -> Result<()> {
    let entry = PaymentHistoryEntry {
        amount_bdt,
        month: month.to_string(),
        year,
        date: now(),
    };
    state
        .clients
        .update_one(
            doc! { "clientId": client_id },
            doc! { "$push": { "paymentHistory": mongodb::bson::to_bson(&entry)? } },
        )
        .await?;
    Ok(())
}

/// Expense against the main balance: guarded, logged, and folded into the
/// (month, year) profit bucket.
pub async fn add_expense(
    state: &AppState,
    amount: f64,
    note: &str,
    month: &str,
    year: i32,
) -> Result<LedgerOutcome> {
    let main = get_balance(state, MAIN_BALANCE_KEY).await?;
    if main < amount {
        return Ok(LedgerOutcome::Insufficient);
    }

    inc_balance(state, MAIN_BALANCE_KEY, -amount).await?;
    log_entry(state, amount, note, LedgerType::Expense).await?;
    bump_monthly(state, month, year, 0.0, amount).await?;

    Ok(LedgerOutcome::Applied)
}

pub async fn add_main_balance(state: &AppState, amount: f64, note: &str) -> Result<()> {
    inc_balance(state, MAIN_BALANCE_KEY, amount).await?;
    log_entry(state, amount, note, LedgerType::Credit).await?;
    Ok(())
}

/// HR balance top-ups draw down the main balance.
pub async fn add_hr_balance(state: &AppState, amount: f64, note: &str) -> Result<LedgerOutcome> {
    let main = get_balance(state, MAIN_BALANCE_KEY).await?;
    if main < amount {
        return Ok(LedgerOutcome::Insufficient);
    }

    inc_balance(state, MAIN_BALANCE_KEY, -amount).await?;
    inc_balance(state, HR_BALANCE_KEY, amount).await?;
    log_entry(state, amount, note, LedgerType::In).await?;

    Ok(LedgerOutcome::Applied)
}

pub async fn spend_hr_balance(state: &AppState, amount: f64, note: &str) -> Result<LedgerOutcome> {
    let hr = get_balance(state, HR_BALANCE_KEY).await?;
    if hr < amount {
        return Ok(LedgerOutcome::Insufficient);
    }

    inc_balance(state, HR_BALANCE_KEY, -amount).await?;
    log_entry(state, amount, note, LedgerType::Out).await?;

    Ok(LedgerOutcome::Applied)
}

#[allow(clippy::too_many_arguments)]
pub async fn add_earning(
    state: &AppState,
    client_id: &str,
    month: &str,
    year: i32,
    usd: f64,
    charge: f64,
    receivable: f64,
    rate: f64,
    converted_bdt: f64,
    status: EarningStatus,
) -> Result<ObjectId> {
    let res = state
        .earnings
        .insert_one(Earning {
            id: None,
            client_id: client_id.to_string(),
            month: month.to_string(),
            year,
            usd,
            charge,
            receivable,
            rate,
            converted_bdt,
            status,
            created_at: now(),
        })
        .await?;
    let id = res
        .inserted_id
        .as_object_id()
        .context("earning insert missing _id")?;

    bump_monthly(state, month, year, converted_bdt, 0.0).await?;

    match status {
        EarningStatus::Unpaid => {
            bump_unpaid(state, month, year, converted_bdt).await?;
        }
        EarningStatus::Paid => {
            inc_balance(state, MAIN_BALANCE_KEY, converted_bdt).await?;
            log_entry(
                state,
                converted_bdt,
                &format!("earning from {client_id} ({month} {year})"),
                LedgerType::Earning,
            )
            .await?;
            push_payment_history(state, client_id, converted_bdt, month, year).await?;
        }
    }

    Ok(id)
}

fn contribution(status: EarningStatus, converted_bdt: f64) -> f64 {
    match status {
        EarningStatus::Paid => converted_bdt,
        EarningStatus::Unpaid => 0.0,
    }
}

/// Flipping Paid/Unpaid moves the amount between the unpaid bucket and the
/// main balance, and logs the delta as an adjustment.
pub async fn change_earning_status(
    state: &AppState,
    id: &ObjectId,
    new_status: EarningStatus,
) -> Result<EarningMutation> {
    let Some(earning) = state.earnings.find_one(doc! { "_id": id }).await? else {
        return Ok(EarningMutation::NotFound);
    };

    let delta = contribution(new_status, earning.converted_bdt)
        - contribution(earning.status, earning.converted_bdt);

    if delta != 0.0 {
        inc_balance(state, MAIN_BALANCE_KEY, delta).await?;
        bump_unpaid(state, &earning.month, earning.year, -delta).await?;

        let entry_type = if delta > 0.0 {
            LedgerType::AdjustmentPlus
        } else {
            LedgerType::AdjustmentMinus
        };
        log_entry(
            state,
            delta.abs(),
            &format!(
                "earning status {} -> {} for {}",
                earning.status.as_str(),
                new_status.as_str(),
                earning.client_id
            ),
            entry_type,
        )
        .await?;

        if new_status == EarningStatus::Paid {
            push_payment_history(
                state,
                &earning.client_id,
                earning.converted_bdt,
                &earning.month,
                earning.year,
            )
            .await?;
        }
    }

    state
        .earnings
        .update_one(
            doc! { "_id": id },
            doc! { "$set": { "status": new_status.as_str() } },
        )
        .await?;

    Ok(EarningMutation::Applied)
}

/// Rewrites an earning and re-derives every dependent total: the monthly
/// buckets (moving value between two months when the key changes), the unpaid
/// buckets, and the main balance.
#[allow(clippy::too_many_arguments)]
pub async fn update_earning(
    state: &AppState,
    id: &ObjectId,
    client_id: &str,
    month: &str,
    year: i32,
    usd: f64,
    charge: f64,
    receivable: f64,
    rate: f64,
    converted_bdt: f64,
    status: EarningStatus,
) -> Result<EarningMutation> {
    let Some(old) = state.earnings.find_one(doc! { "_id": id }).await? else {
        return Ok(EarningMutation::NotFound);
    };

    bump_monthly(state, &old.month, old.year, -old.converted_bdt, 0.0).await?;
    bump_monthly(state, month, year, converted_bdt, 0.0).await?;

    if old.status == EarningStatus::Unpaid {
        bump_unpaid(state, &old.month, old.year, -old.converted_bdt).await?;
    }
    if status == EarningStatus::Unpaid {
        bump_unpaid(state, month, year, converted_bdt).await?;
    }

    let delta = contribution(status, converted_bdt) - contribution(old.status, old.converted_bdt);
    if delta != 0.0 {
        inc_balance(state, MAIN_BALANCE_KEY, delta).await?;
        let entry_type = if delta > 0.0 {
            LedgerType::AdjustmentPlus
        } else {
            LedgerType::AdjustmentMinus
        };
        log_entry(
            state,
            delta.abs(),
            &format!("earning update for {client_id} ({month} {year})"),
            entry_type,
        )
        .await?;
    }

    state
        .earnings
        .update_one(
            doc! { "_id": id },
            doc! { "$set": {
                "clientId": client_id,
                "month": month,
                "year": year,
                "usd": usd,
                "charge": charge,
                "receivable": receivable,
                "rate": rate,
                "convertedBdt": converted_bdt,
                "status": status.as_str(),
            } },
        )
        .await?;

    Ok(EarningMutation::Applied)
}

/// Records a profit distribution against a month's remaining profit.
pub async fn share_profit(
    state: &AppState,
    month: &str,
    year: i32,
    recipient: &str,
    amount: f64,
    note: Option<String>,
) -> Result<LedgerOutcome> {
    let Some(bucket) = state
        .monthly_profits
        .find_one(doc! { "month": month, "year": year })
        .await?
    else {
        return Ok(LedgerOutcome::Insufficient);
    };
    if bucket.remaining < amount {
        return Ok(LedgerOutcome::Insufficient);
    }

    let share = crate::models::ProfitShare {
        recipient: recipient.to_string(),
        amount,
        note,
        date: now(),
    };
    state
        .monthly_profits
        .update_one(
            doc! { "month": month, "year": year },
            doc! {
                "$push": { "shared": mongodb::bson::to_bson(&share)? },
                "$inc": { "remaining": -amount },
            },
        )
        .await?;

    Ok(LedgerOutcome::Applied)
}

pub async fn list_transactions(
    state: &AppState,
    entry_type: Option<&str>,
) -> Result<Vec<LedgerEntry>> {
    let filter = match entry_type {
        Some(t) => doc! { "entryType": t },
        None => doc! {},
    };
    let mut cursor = state.transactions.find(filter).await?;
    let mut items = Vec::new();
    while let Some(entry) = cursor.try_next().await? {
        items.push(entry);
    }
    Ok(items)
}

pub async fn get_monthly_profit(
    state: &AppState,
    month: &str,
    year: i32,
) -> Result<Option<MonthlyProfit>> {
    state
        .monthly_profits
        .find_one(doc! { "month": month, "year": year })
        .await
        .map_err(Into::into)
}

pub async fn get_unpaid_bucket(
    state: &AppState,
    month: &str,
    year: i32,
) -> Result<Option<UnpaidBucket>> {
    state
        .unpaid_buckets
        .find_one(doc! { "month": month, "year": year })
        .await
        .map_err(Into::into)
}

pub async fn get_earning_by_id(state: &AppState, id: &ObjectId) -> Result<Option<Earning>> {
    state
        .earnings
        .find_one(doc! { "_id": id })
        .await
        .map_err(Into::into)
}

pub async fn list_earnings(
    state: &AppState,
    month: Option<&str>,
    year: Option<i32>,
    client_id: Option<&str>,
) -> Result<Vec<Earning>> {
    let mut filter = doc! {};
    if let Some(m) = month {
        filter.insert("month", m);
    }
    if let Some(y) = year {
        filter.insert("year", y);
    }
    if let Some(c) = client_id {
        filter.insert("clientId", c);
    }
    let mut cursor = state.earnings.find(filter).await?;
    let mut items = Vec::new();
    while let Some(earning) = cursor.try_next().await? {
        items.push(earning);
    }
    Ok(items)
}
