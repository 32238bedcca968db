use std::collections::BTreeSet;

use chrono::NaiveDate;

use crate::cycle::tracker::{
    TrackedBill, is_paid_for_current_cycle, is_skipped_for_current_cycle, sort_by_priority,
};
use crate::model::Bill;

fn is_outstanding(bill: &Bill) -> bool {
    !is_paid_for_current_cycle(bill) && !is_skipped_for_current_cycle(bill)
}

/// Outstanding bills whose active due date is strictly before `cutoff`.
pub fn due_before(bills: &[Bill], cutoff: NaiveDate) -> Vec<Bill> {
    bills
        .iter()
        .filter(|bill| is_outstanding(bill))
        .filter(|bill| bill.current_due_date().is_some_and(|due| due < cutoff))
        .cloned()
        .collect()
}

/// Bills whose active due date falls in `start..=end`.
pub fn in_range(bills: &[Bill], start: NaiveDate, end: NaiveDate) -> Vec<Bill> {
    bills
        .iter()
        .filter(|bill| {
            bill.current_due_date()
                .is_some_and(|due| due >= start && due <= end)
        })
        .cloned()
        .collect()
}

/// Outstanding bills already past due on `reference`. No payday cutoff
/// applies, so these never drop out of view until paid.
pub fn overdue(bills: &[Bill], reference: NaiveDate) -> Vec<Bill> {
    due_before(bills, reference)
}

/// Union by bill id; the first occurrence of an id wins and order is kept.
pub fn deduplicate(lists: &[&[Bill]]) -> Vec<Bill> {
    let mut seen: BTreeSet<&str> = BTreeSet::new();
    let mut merged: Vec<Bill> = Vec::new();
    for bill in lists.iter().flat_map(|list| list.iter()) {
        if seen.insert(bill.id.as_str()) {
            merged.push(bill.clone());
        }
    }
    merged
}

/// Everything owed before `cutoff`: overdue on `today` plus due before the
/// cutoff, deduplicated and sorted by status priority.
pub fn owed_before(
    bills: &[Bill],
    cutoff: NaiveDate,
    today: NaiveDate,
    due_soon_days: i64,
) -> Vec<TrackedBill> {
    let late = overdue(bills, today);
    let upcoming = due_before(bills, cutoff);
    let merged = deduplicate(&[&late, &upcoming]);
    sort_by_priority(&merged, today, due_soon_days)
}
