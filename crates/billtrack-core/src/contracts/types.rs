use serde::Serialize;

use crate::model::{Bill, PaymentRecord};

#[derive(Debug, Clone, Serialize)]
pub struct BillRow {
    pub id: String,
    pub name: String,
    pub amount: f64,
    pub recurrence: String,
    pub due_date: String,
    pub status: String,
    pub priority: u8,
    pub days_overdue: Option<i64>,
    pub days_until_due: Option<i64>,
    pub last_paid_date: Option<String>,
    pub recurring_template_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProcessData {
    pub today: String,
    pub rows: Vec<BillRow>,
    pub bills: Vec<Bill>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct StatusCounts {
    pub overdue: usize,
    pub due_soon: usize,
    pub upcoming: usize,
    pub pending: usize,
    pub skipped: usize,
    pub paid: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusData {
    pub today: String,
    pub counts: StatusCounts,
    pub rows: Vec<BillRow>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PaydayData {
    pub date: String,
    pub days_until: i64,
    pub source: String,
    pub source_label: String,
    pub amount: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DueData {
    pub today: String,
    pub cutoff: String,
    pub cutoff_source: String,
    pub payday: Option<PaydayData>,
    pub total_amount: f64,
    pub rows: Vec<BillRow>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PayData {
    pub applied: bool,
    pub reason: Option<String>,
    pub payment: Option<PaymentRecord>,
    pub bill: Bill,
}

#[derive(Debug, Clone, Serialize)]
pub struct MatchRow {
    pub transaction_id: String,
    pub transaction_name: String,
    pub transaction_amount: f64,
    pub transaction_date: String,
    pub bill_id: String,
    pub bill_name: String,
    pub bill_amount: f64,
    pub bill_due_date: String,
    pub confidence: f64,
    pub name_match: bool,
    pub amount_match: bool,
    pub date_match: bool,
    pub date_offset_days: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MatchData {
    pub policy_version: String,
    pub mode: String,
    pub today: String,
    pub unmatched_transactions: usize,
    pub rows: Vec<MatchRow>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RejectedRow {
    #[serde(flatten)]
    pub row: MatchRow,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconcileData {
    pub policy_version: String,
    pub today: String,
    pub approved: Vec<MatchRow>,
    pub rejected: Vec<RejectedRow>,
    pub bills: Vec<Bill>,
    pub generated: Vec<Bill>,
}
