// state module: AppState, initialization, and re-exports of submodules.

use anyhow::Result;
use mongodb::{
    Client as MongoClient, Collection, Database, IndexModel,
    bson::{DateTime, doc},
    options::IndexOptions,
};
use std::{env, sync::Arc, time::SystemTime};

use crate::{
    mailer::{Mailer, mailer_from_env},
    models::{
        AppliedLeave, AttendanceSnapshot, AuthToken, BalanceDoc, Client, Earning, Employee,
        LeaveBalance, LedgerEntry, LocalOrder, MonthlyProfit, Notice, Notification,
        ShiftAssignment, TimeEntry, UnpaidBucket, User,
    },
    otp::OtpClient,
    uploads::ImageHost,
};

mod attendance;
mod employees;
mod leave;
mod ledger;
mod notices;
mod orders;
mod sessions;

pub use attendance::*;
pub use employees::*;
pub use leave::*;
pub use ledger::*;
pub use notices::*;
pub use orders::*;
pub use sessions::*;

pub const SESSION_TTL_SECONDS: u64 = 60 * 60 * 24; // 1 day
pub const ACTIVATION_TTL_SECONDS: u64 = 60 * 60 * 24 * 7; // 7 days
pub const DEFAULT_CASUAL_LEAVE_DAYS: i64 = 10;

pub const MAIN_BALANCE_KEY: &str = "main";
pub const HR_BALANCE_KEY: &str = "hr";

#[derive(Clone)]
pub struct AppState {
    pub users: Collection<User>,
    pub tokens: Collection<AuthToken>,
    pub employees: Collection<Employee>,
    pub shifts: Collection<ShiftAssignment>,
    pub check_ins: Collection<TimeEntry>,
    pub check_outs: Collection<TimeEntry>,
    pub ot_starts: Collection<TimeEntry>,
    pub ot_stops: Collection<TimeEntry>,
    pub attendance: Collection<AttendanceSnapshot>,
    pub local_orders: Collection<LocalOrder>,
    pub clients: Collection<Client>,
    pub earnings: Collection<Earning>,
    pub balances: Collection<BalanceDoc>,
    pub transactions: Collection<LedgerEntry>,
    pub monthly_profits: Collection<MonthlyProfit>,
    pub unpaid_buckets: Collection<UnpaidBucket>,
    pub leave_balances: Collection<LeaveBalance>,
    pub applied_leaves: Collection<AppliedLeave>,
    pub notices: Collection<Notice>,
    pub notifications: Collection<Notification>,
    pub mailer: Arc<dyn Mailer>,
    pub image_host: ImageHost,
    pub otp: OtpClient,
    pub app_base_url: String,
}

pub async fn init_state() -> Result<AppState> {
    let uri = env::var("MONGODB_URI").unwrap_or_else(|_| "mongodb://localhost:27017".to_string());
    let db_name = env::var("MONGODB_DB").unwrap_or_else(|_| "opsdesk".to_string());
    let app_base_url =
        env::var("APP_BASE_URL").unwrap_or_else(|_| "http://localhost:8080".to_string());

    let client = MongoClient::with_uri_str(uri).await?;
    let db = client.database(&db_name);

    ensure_collections(&db).await?;
    ensure_indexes(&db).await?;
    seed_balances(&db).await?;

    Ok(AppState {
        users: db.collection::<User>("users"),
        tokens: db.collection::<AuthToken>("sessions"),
        employees: db.collection::<Employee>("employees"),
        shifts: db.collection::<ShiftAssignment>("shifts"),
        check_ins: db.collection::<TimeEntry>("check_ins"),
        check_outs: db.collection::<TimeEntry>("check_outs"),
        ot_starts: db.collection::<TimeEntry>("ot_starts"),
        ot_stops: db.collection::<TimeEntry>("ot_stops"),
        attendance: db.collection::<AttendanceSnapshot>("attendance"),
        local_orders: db.collection::<LocalOrder>("local_orders"),
        clients: db.collection::<Client>("clients"),
        earnings: db.collection::<Earning>("earnings"),
        balances: db.collection::<BalanceDoc>("balances"),
        transactions: db.collection::<LedgerEntry>("transactions"),
        monthly_profits: db.collection::<MonthlyProfit>("monthly_profits"),
        unpaid_buckets: db.collection::<UnpaidBucket>("unpaid_buckets"),
        leave_balances: db.collection::<LeaveBalance>("leave_balances"),
        applied_leaves: db.collection::<AppliedLeave>("applied_leaves"),
        notices: db.collection::<Notice>("notices"),
        notifications: db.collection::<Notification>("notifications"),
        mailer: mailer_from_env(),
        image_host: ImageHost::from_env(),
        otp: OtpClient::from_env(),
        app_base_url,
    })
}

async fn ensure_collections(db: &Database) -> Result<()> {
    let existing = db.list_collection_names().await?;
    for name in [
        "users",
        "sessions",
        "employees",
        "shifts",
        "check_ins",
        "check_outs",
        "ot_starts",
        "ot_stops",
        "attendance",
        "local_orders",
        "clients",
        "earnings",
        "balances",
        "transactions",
        "monthly_profits",
        "unpaid_buckets",
        "leave_balances",
        "applied_leaves",
        "notices",
        "notifications",
    ] {
        if !existing.iter().any(|n| n == name) {
            db.create_collection(name).await?;
        }
    }
    Ok(())
}

// Unique indexes close the check-then-act races of the original design: a
// concurrent duplicate surfaces as an E11000 write error which the state layer
// maps onto the same "already exists" rejection.
async fn ensure_indexes(db: &Database) -> Result<()> {
    let unique = IndexOptions::builder().unique(true).build();

    db.collection::<User>("users")
        .create_index(
            IndexModel::builder()
                .keys(doc! { "email": 1 })
                .options(unique.clone())
                .build(),
        )
        .await?;
    db.collection::<Employee>("employees")
        .create_index(
            IndexModel::builder()
                .keys(doc! { "email": 1 })
                .options(unique.clone())
                .build(),
        )
        .await?;
    db.collection::<Client>("clients")
        .create_index(
            IndexModel::builder()
                .keys(doc! { "clientId": 1 })
                .options(unique.clone())
                .build(),
        )
        .await?;
    db.collection::<ShiftAssignment>("shifts")
        .create_index(
            IndexModel::builder()
                .keys(doc! { "key": 1 })
                .options(unique.clone())
                .build(),
        )
        .await?;

    for name in ["check_ins", "check_outs", "ot_starts", "ot_stops"] {
        db.collection::<TimeEntry>(name)
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "email": 1, "date": 1 })
                    .options(unique.clone())
                    .build(),
            )
            .await?;
    }

    db.collection::<AttendanceSnapshot>("attendance")
        .create_index(
            IndexModel::builder()
                .keys(doc! { "email": 1, "date": 1 })
                .options(unique)
                .build(),
        )
        .await?;

    Ok(())
}

// The balance singletons live under fixed _id keys instead of the original
// "first document in the collection" assumption.
async fn seed_balances(db: &Database) -> Result<()> {
    let balances = db.collection::<BalanceDoc>("balances");
    for key in [MAIN_BALANCE_KEY, HR_BALANCE_KEY] {
        balances
            .update_one(
                doc! { "_id": key },
                doc! { "$setOnInsert": {
                    "amount": 0.0,
                    "updatedAt": DateTime::from_system_time(SystemTime::now()),
                } },
            )
            .upsert(true)
            .await?;
    }
    Ok(())
}

pub(crate) fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    use mongodb::error::{ErrorKind, WriteFailure};
    matches!(
        err.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(write_error)) if write_error.code == 11000
    )
}

pub(crate) fn now() -> DateTime {
    DateTime::from_system_time(SystemTime::now())
}
