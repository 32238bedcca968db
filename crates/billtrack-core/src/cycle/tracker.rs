use std::cmp::Ordering;

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::cycle::date::{format_iso_date, next_due_date_anchored, parse_bill_date};
use crate::model::{Bill, BillStatus, PaymentRecord, PaymentSource};
use crate::{CoreError, CoreResult};

pub const DEFAULT_DUE_SOON_DAYS: i64 = 7;

/// How far `process` may move a bill's active cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CyclePolicy {
    /// Never move past a cycle that has not been paid or skipped, so missed
    /// cycles stay overdue.
    #[default]
    HoldUnpaid,
    /// Roll forward from the anchor to the first due date on or after the
    /// reference day, whether or not earlier cycles were settled.
    RollForward,
}

#[derive(Debug, Clone)]
pub struct MarkPaidOptions {
    pub amount: Option<f64>,
    pub source: PaymentSource,
    pub transaction_id: Option<String>,
    pub recorded_at: Option<NaiveDateTime>,
}

impl Default for MarkPaidOptions {
    fn default() -> Self {
        Self {
            amount: None,
            source: PaymentSource::Manual,
            transaction_id: None,
            recorded_at: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentEligibility {
    pub can_pay: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusAssessment {
    pub status: BillStatus,
    pub priority: u8,
    pub due_date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days_overdue: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days_until_due: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrackedBill {
    pub bill: Bill,
    pub assessment: StatusAssessment,
}

pub fn process(bills: &[Bill], reference: NaiveDate) -> Vec<Bill> {
    process_with_policy(bills, reference, CyclePolicy::default())
}

pub fn process_with_policy(
    bills: &[Bill],
    reference: NaiveDate,
    policy: CyclePolicy,
) -> Vec<Bill> {
    bills
        .iter()
        .map(|bill| process_bill(bill, reference, policy))
        .collect()
}

/// Recomputes `nextDueDate` and clears the cached `status`/`isPaid` flags.
///
/// Clearing the flags is what lets a bill paid last cycle read as unpaid
/// once the next cycle starts; payment history is left untouched.
pub fn process_bill(bill: &Bill, reference: NaiveDate, policy: CyclePolicy) -> Bill {
    let mut updated = bill.clone();
    updated.status = None;
    updated.is_paid = None;

    match active_cycle_due(bill, reference, policy) {
        Some(due) => updated.next_due_date = Some(format_iso_date(&due)),
        None => {
            warn!(
                bill_id = %bill.id,
                due_date = %bill.due_date,
                last_due_date = ?bill.last_due_date,
                "unparseable bill date; keeping stored due date"
            );
            updated.next_due_date = Some(bill.due_date.clone());
        }
    }
    updated
}

fn active_cycle_due(bill: &Bill, reference: NaiveDate, policy: CyclePolicy) -> Option<NaiveDate> {
    let anchor = bill.anchor_due_date()?;
    let anchor_day = anchor_day(bill, anchor);
    let rolled = next_due_date_anchored(anchor, anchor_day, bill.recurrence, reference);
    match policy {
        CyclePolicy::RollForward => Some(rolled),
        CyclePolicy::HoldUnpaid => {
            let first_unsettled = match latest_settled_cycle(bill) {
                Some(settled) => bill
                    .recurrence
                    .advance_anchored(settled, anchor_day)
                    .max(anchor),
                None => anchor,
            };
            Some(rolled.min(first_unsettled))
        }
    }
}

/// Latest cycle closed by `lastDueDate`, the latest payment, or a skip.
fn latest_settled_cycle(bill: &Bill) -> Option<NaiveDate> {
    let last_due = bill.last_due_date.as_deref().and_then(parse_bill_date);
    let paid = bill
        .latest_payment()
        .and_then(|payment| parse_bill_date(&payment.due_date));
    let skipped = bill
        .skipped_due_dates
        .iter()
        .filter_map(|value| parse_bill_date(value))
        .max();
    [last_due, paid, skipped].into_iter().flatten().max()
}

fn anchor_day(bill: &Bill, fallback: NaiveDate) -> u32 {
    parse_bill_date(&bill.due_date)
        .map(|date| date.day())
        .unwrap_or_else(|| fallback.day())
}

/// True iff the latest payment covers a due date on or after the active one.
pub fn is_paid_for_current_cycle(bill: &Bill) -> bool {
    let Some(payment) = bill.latest_payment() else {
        return false;
    };
    let Some(paid_cycle) = parse_bill_date(&payment.due_date) else {
        return false;
    };
    match bill.current_due_date() {
        Some(current) => paid_cycle >= current,
        None => false,
    }
}

pub fn is_skipped_for_current_cycle(bill: &Bill) -> bool {
    let Some(current) = bill.current_due_date() else {
        return false;
    };
    bill.skipped_due_dates
        .iter()
        .filter_map(|value| parse_bill_date(value))
        .any(|skipped| skipped == current)
}

pub fn can_pay(bill: &Bill) -> PaymentEligibility {
    if !is_paid_for_current_cycle(bill) {
        return PaymentEligibility {
            can_pay: true,
            reason: None,
        };
    }

    let reason = match bill.latest_payment() {
        Some(payment) => format!(
            "Already paid for the cycle due {} via {} on {}.",
            payment.due_date,
            payment.source.label(),
            payment.paid_date
        ),
        None => "Already paid for the current cycle.".to_string(),
    };
    PaymentEligibility {
        can_pay: false,
        reason: Some(reason),
    }
}

/// Records a payment for the active cycle and moves the bill to the next one.
///
/// The returned bill's `nextDueDate` is the following cycle; its
/// `lastPayment` describes the cycle that was just paid.
pub fn mark_paid(bill: &Bill, paid_date: NaiveDate, options: MarkPaidOptions) -> CoreResult<Bill> {
    let cycle_due = bill
        .current_due_date()
        .ok_or_else(|| CoreError::invalid_bill_date(&bill.id, bill.current_due_label()))?;
    let recorded_at = options
        .recorded_at
        .unwrap_or_else(|| paid_date.and_time(NaiveTime::MIN));

    let record = PaymentRecord {
        amount: options.amount.unwrap_or(bill.amount),
        paid_date: format_iso_date(&paid_date),
        due_date: format_iso_date(&cycle_due),
        source: options.source,
        transaction_id: options.transaction_id.clone(),
        timestamp: recorded_at.format("%Y-%m-%dT%H:%M:%S").to_string(),
    };

    let mut updated = advance_cycle(bill, cycle_due);
    updated.payment_history.push(record.clone());
    updated.last_payment = Some(record);
    if let Some(transaction_id) = options.transaction_id {
        updated.linked_transaction_ids.insert(transaction_id);
    }
    updated.status = Some(BillStatus::Paid);
    updated.is_paid = Some(true);
    Ok(updated)
}

/// Moves the bill past its active cycle without recording a payment.
pub fn skip_cycle(bill: &Bill) -> CoreResult<Bill> {
    let cycle_due = bill
        .current_due_date()
        .ok_or_else(|| CoreError::invalid_bill_date(&bill.id, bill.current_due_label()))?;

    let mut updated = advance_cycle(bill, cycle_due);
    let label = format_iso_date(&cycle_due);
    if !updated.skipped_due_dates.contains(&label) {
        updated.skipped_due_dates.push(label);
    }
    updated.status = Some(BillStatus::Skipped);
    updated.is_paid = Some(false);
    Ok(updated)
}

fn advance_cycle(bill: &Bill, cycle_due: NaiveDate) -> Bill {
    let mut updated = bill.clone();
    let next = bill
        .recurrence
        .advance_anchored(cycle_due, anchor_day(bill, cycle_due));
    updated.last_due_date = Some(format_iso_date(&cycle_due));
    updated.next_due_date = Some(format_iso_date(&next));
    updated
}

pub fn determine_status(bill: &Bill, reference: NaiveDate, due_soon_days: i64) -> StatusAssessment {
    let due_date = bill.current_due_label().to_string();

    if is_paid_for_current_cycle(bill) {
        return assessment(BillStatus::Paid, due_date, None, None);
    }
    if is_skipped_for_current_cycle(bill) {
        return assessment(BillStatus::Skipped, due_date, None, None);
    }

    let Some(due) = bill.current_due_date() else {
        return assessment(BillStatus::Pending, due_date, None, None);
    };
    let days_until = (due - reference).num_days();
    if days_until < 0 {
        return assessment(BillStatus::Overdue, due_date, Some(-days_until), None);
    }
    if days_until <= due_soon_days {
        return assessment(BillStatus::DueSoon, due_date, None, Some(days_until));
    }
    assessment(BillStatus::Upcoming, due_date, None, Some(days_until))
}

fn assessment(
    status: BillStatus,
    due_date: String,
    days_overdue: Option<i64>,
    days_until_due: Option<i64>,
) -> StatusAssessment {
    StatusAssessment {
        status,
        priority: status.priority(),
        due_date,
        days_overdue,
        days_until_due,
    }
}

pub fn sort_by_priority(bills: &[Bill], reference: NaiveDate, due_soon_days: i64) -> Vec<TrackedBill> {
    let mut tracked = bills
        .iter()
        .map(|bill| TrackedBill {
            assessment: determine_status(bill, reference, due_soon_days),
            bill: bill.clone(),
        })
        .collect::<Vec<TrackedBill>>();
    tracked.sort_by(compare_tracked);
    tracked
}

fn compare_tracked(left: &TrackedBill, right: &TrackedBill) -> Ordering {
    left.assessment
        .priority
        .cmp(&right.assessment.priority)
        .then_with(|| {
            right
                .assessment
                .days_overdue
                .unwrap_or(0)
                .cmp(&left.assessment.days_overdue.unwrap_or(0))
        })
        .then_with(|| compare_optional_dates(left.bill.current_due_date(), right.bill.current_due_date()))
        .then_with(|| left.bill.name.cmp(&right.bill.name))
        .then_with(|| left.bill.id.cmp(&right.bill.id))
}

fn compare_optional_dates(left: Option<NaiveDate>, right: Option<NaiveDate>) -> Ordering {
    match (left, right) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
