// models.rs
// Domain models for the MongoDB collections. Field names stay camelCase on the
// wire to match the data the original deployment already holds.

use mongodb::bson::{DateTime, oid::ObjectId};
use serde::{Deserialize, Serialize};

/// Roles carried by auth users. Comparison is case-insensitive on parse.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum Role {
    #[serde(rename = "admin")]
    Admin,
    #[serde(rename = "hr-admin")]
    HrAdmin,
    #[serde(rename = "developer")]
    Developer,
    #[serde(rename = "teamLeader")]
    TeamLeader,
    #[serde(rename = "employee")]
    Employee,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::HrAdmin => "hr-admin",
            Role::Developer => "developer",
            Role::TeamLeader => "teamLeader",
            Role::Employee => "employee",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "admin" => Some(Role::Admin),
            "hr-admin" => Some(Role::HrAdmin),
            "developer" => Some(Role::Developer),
            "teamleader" => Some(Role::TeamLeader),
            "employee" => Some(Role::Employee),
            _ => None,
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

/// Auth identity. Shares its email with the employee document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub email: String,
    #[serde(default)]
    pub password_hash: Option<String>,
    pub role: Role,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum TokenKind {
    #[serde(rename = "session")]
    Session,
    #[serde(rename = "activation")]
    Activation,
}

/// Bearer token document, both 24h sessions and 7d activation links.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthToken {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub token: String,
    pub email: String,
    pub kind: TokenKind,
    pub expires_at: DateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum EmployeeStatus {
    #[serde(rename = "pending")]
    Pending,
    #[serde(rename = "Active")]
    Active,
    #[serde(rename = "On Leave")]
    OnLeave,
    #[serde(rename = "De-activate")]
    Deactivated,
}

impl EmployeeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmployeeStatus::Pending => "pending",
            EmployeeStatus::Active => "Active",
            EmployeeStatus::OnLeave => "On Leave",
            EmployeeStatus::Deactivated => "De-activate",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(EmployeeStatus::Pending),
            "Active" => Some(EmployeeStatus::Active),
            "On Leave" => Some(EmployeeStatus::OnLeave),
            "De-activate" => Some(EmployeeStatus::Deactivated),
            _ => None,
        }
    }
}

/// Employee profile. Never hard-deleted; HR toggles status instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub employee_id: String,
    pub email: String,
    pub name: String,
    pub designation: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub photo_url: Option<String>,
    pub joining_date: DateTime,
    pub status: EmployeeStatus,
    #[serde(default)]
    pub salary_pin_hash: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum ShiftName {
    Morning,
    Evening,
    Night,
    General,
    #[serde(rename = "OT list")]
    OtList,
}

impl ShiftName {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShiftName::Morning => "Morning",
            ShiftName::Evening => "Evening",
            ShiftName::Night => "Night",
            ShiftName::General => "General",
            ShiftName::OtList => "OT list",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Morning" => Some(ShiftName::Morning),
            "Evening" => Some(ShiftName::Evening),
            "Night" => Some(ShiftName::Night),
            "General" => Some(ShiftName::General),
            "OT list" => Some(ShiftName::OtList),
            _ => None,
        }
    }
}

/// Shift assignment keyed by email, or by `email + "_OT"` for one-shot
/// overtime tickets that coexist with the normal assignment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftAssignment {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub key: String,
    pub email: String,
    pub shift: ShiftName,
    pub entry_time: String,
}

/// One timestamped record per (email, date); shared by the check-in,
/// check-out, OT-start and OT-stop collections.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeEntry {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub email: String,
    pub date: String,
    /// Client-supplied epoch milliseconds.
    pub at: i64,
}

/// Denormalized per-(email, date) read model for the admin dashboards.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceSnapshot {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub email: String,
    pub date: String,
    #[serde(default)]
    pub employee_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub designation: Option<String>,
    #[serde(default)]
    pub shift: Option<String>,
    #[serde(default)]
    pub check_in_time: Option<i64>,
    #[serde(default)]
    pub late_check_in: Option<String>,
    #[serde(default)]
    pub check_out_time: Option<i64>,
    #[serde(default)]
    pub working_time: Option<String>,
    #[serde(default)]
    pub working_seconds: Option<i64>,
    #[serde(default)]
    pub ot_start_time: Option<i64>,
    #[serde(default)]
    pub ot_stop_time: Option<i64>,
    #[serde(default)]
    pub ot_time: Option<String>,
    #[serde(default)]
    pub ot_seconds: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum OrderStatus {
    Pending,
    Reviewing,
    #[serde(rename = "In-progress")]
    InProgress,
    #[serde(rename = "Ready to QC")]
    ReadyToQc,
    #[serde(rename = "Ready to Upload")]
    ReadyToUpload,
    Completed,
    Delivered,
    Hold,
    Cancel,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Reviewing => "Reviewing",
            OrderStatus::InProgress => "In-progress",
            OrderStatus::ReadyToQc => "Ready to QC",
            OrderStatus::ReadyToUpload => "Ready to Upload",
            OrderStatus::Completed => "Completed",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Hold => "Hold",
            OrderStatus::Cancel => "Cancel",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Pending" => Some(OrderStatus::Pending),
            "Reviewing" => Some(OrderStatus::Reviewing),
            "In-progress" => Some(OrderStatus::InProgress),
            "Ready to QC" => Some(OrderStatus::ReadyToQc),
            "Ready to Upload" => Some(OrderStatus::ReadyToUpload),
            "Completed" => Some(OrderStatus::Completed),
            "Delivered" => Some(OrderStatus::Delivered),
            "Hold" => Some(OrderStatus::Hold),
            "Cancel" => Some(OrderStatus::Cancel),
            _ => None,
        }
    }

    /// Completed and Cancel lock the order against further status writes.
    pub fn locks(&self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancel)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalOrder {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub order_id: String,
    pub client_id: String,
    pub title: String,
    #[serde(default)]
    pub quantity: Option<i64>,
    #[serde(default)]
    pub instructions: Option<String>,
    pub deadline: DateTime,
    pub order_status: OrderStatus,
    pub is_locked: bool,
    pub created_at: DateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderHistoryEntry {
    pub order_id: String,
    pub title: String,
    pub date: DateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentHistoryEntry {
    pub amount_bdt: f64,
    pub month: String,
    pub year: i32,
    pub date: DateTime,
}

/// Client document. orderHistory and paymentHistory are append-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub client_id: String,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub order_history: Vec<OrderHistoryEntry>,
    #[serde(default)]
    pub payment_history: Vec<PaymentHistoryEntry>,
    pub created_at: DateTime,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum EarningStatus {
    Paid,
    Unpaid,
}

impl EarningStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EarningStatus::Paid => "Paid",
            EarningStatus::Unpaid => "Unpaid",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Paid" => Some(EarningStatus::Paid),
            "Unpaid" => Some(EarningStatus::Unpaid),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Earning {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub client_id: String,
    pub month: String,
    pub year: i32,
    pub usd: f64,
    pub charge: f64,
    pub receivable: f64,
    pub rate: f64,
    pub converted_bdt: f64,
    pub status: EarningStatus,
    pub created_at: DateTime,
}

/// Singleton ledger document addressed by a fixed string `_id` ("main"/"hr").
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceDoc {
    #[serde(rename = "_id")]
    pub id: String,
    pub amount: f64,
    pub updated_at: DateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum LedgerType {
    Expense,
    Credit,
    Earning,
    In,
    Out,
    #[serde(rename = "Adjustment (+)")]
    AdjustmentPlus,
    #[serde(rename = "Adjustment (-)")]
    AdjustmentMinus,
}

impl LedgerType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LedgerType::Expense => "Expense",
            LedgerType::Credit => "Credit",
            LedgerType::Earning => "Earning",
            LedgerType::In => "In",
            LedgerType::Out => "Out",
            LedgerType::AdjustmentPlus => "Adjustment (+)",
            LedgerType::AdjustmentMinus => "Adjustment (-)",
        }
    }
}

/// Append-only transaction log entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntry {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub amount: f64,
    pub note: String,
    pub entry_type: LedgerType,
    pub date: DateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfitShare {
    pub recipient: String,
    pub amount: f64,
    #[serde(default)]
    pub note: Option<String>,
    pub date: DateTime,
}

/// Per-(month, year) aggregate of earnings, expense and distributions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyProfit {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub month: String,
    pub year: i32,
    pub earnings: f64,
    pub expense: f64,
    pub profit: f64,
    pub remaining: f64,
    #[serde(default)]
    pub shared: Vec<ProfitShare>,
}

/// Per-(month, year) running total of earnings still marked Unpaid.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnpaidBucket {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub month: String,
    pub year: i32,
    pub total_converted_bdt: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveBalance {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub email: String,
    pub casual_leave: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum LeaveStatus {
    Pending,
    Approved,
    Declined,
}

impl LeaveStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LeaveStatus::Pending => "Pending",
            LeaveStatus::Approved => "Approved",
            LeaveStatus::Declined => "Declined",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppliedLeave {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub email: String,
    pub days: i64,
    pub from_date: DateTime,
    pub to_date: DateTime,
    pub reason: String,
    pub status: LeaveStatus,
    pub applied_at: DateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notice {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub attachment_url: Option<String>,
    pub created_by: String,
    pub created_at: DateTime,
}

/// In-app notification. A missing recipient means broadcast.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    #[serde(default)]
    pub recipient: Option<String>,
    pub title: String,
    pub message: String,
    pub read: bool,
    pub created_at: DateTime,
}
