use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;

use crate::config::load_config;
use crate::contracts::types::{BillRow, MatchRow, PaydayData};
use crate::cycle::date::format_iso_date;
use crate::cycle::tracker::TrackedBill;
use crate::engine::BillEngine;
use crate::matching::matcher::MatchResult;
use crate::model::{Bill, Transaction};
use crate::payday::Payday;
use crate::{CoreError, CoreResult};

pub(crate) fn load_engine(home_override: Option<&Path>) -> CoreResult<BillEngine> {
    Ok(BillEngine::new(load_config(home_override)?))
}

/// Reads one top-level JSON array of records. Field types are not coerced.
pub(crate) fn read_records<T>(path: &Path) -> CoreResult<Vec<T>>
where
    T: DeserializeOwned,
{
    let raw = fs::read_to_string(path)
        .map_err(|error| CoreError::input_read_failed(path, &error.to_string()))?;
    serde_json::from_str::<Vec<T>>(&raw)
        .map_err(|error| CoreError::input_parse_failed(path, &error.to_string()))
}

pub(crate) fn load_bills(path: &Path) -> CoreResult<Vec<Bill>> {
    read_records(path)
}

pub(crate) fn load_transactions(path: &Path) -> CoreResult<Vec<Transaction>> {
    read_records(path)
}

pub(crate) fn bill_row(tracked: &TrackedBill) -> BillRow {
    let bill = &tracked.bill;
    BillRow {
        id: bill.id.clone(),
        name: bill.name.clone(),
        amount: bill.amount,
        recurrence: bill.recurrence.as_str().to_string(),
        due_date: tracked.assessment.due_date.clone(),
        status: tracked.assessment.status.as_str().to_string(),
        priority: tracked.assessment.priority,
        days_overdue: tracked.assessment.days_overdue,
        days_until_due: tracked.assessment.days_until_due,
        last_paid_date: bill.latest_payment().map(|payment| payment.paid_date.clone()),
        recurring_template_id: bill.recurring_template_id.clone(),
    }
}

pub(crate) fn match_row(result: &MatchResult) -> MatchRow {
    MatchRow {
        transaction_id: result.transaction.id.clone(),
        transaction_name: result.transaction.display_name().to_string(),
        transaction_amount: result.transaction.amount,
        transaction_date: result.transaction.date.clone(),
        bill_id: result.bill.id.clone(),
        bill_name: result.bill.name.clone(),
        bill_amount: result.bill.amount,
        bill_due_date: result.bill.current_due_label().to_string(),
        confidence: result.confidence,
        name_match: result.criteria.name,
        amount_match: result.criteria.amount,
        date_match: result.criteria.date,
        date_offset_days: result.date_offset_days,
    }
}

pub(crate) fn payday_data(payday: &Payday) -> PaydayData {
    PaydayData {
        date: format_iso_date(&payday.date),
        days_until: payday.days_until,
        source: payday.source.as_str().to_string(),
        source_label: payday.source.label().to_string(),
        amount: payday.amount,
    }
}
