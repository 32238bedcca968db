use serde::Serialize;
use tracing::info;
use ulid::Ulid;

use crate::CoreError;
use crate::cycle::tracker::{MarkPaidOptions, can_pay, mark_paid};
use crate::events::{BillEvent, EventBus};
use crate::matching::matcher::{BillMatcher, MatchResult};
use crate::matching::policy::min_match_confidence;
use crate::matching::similarity::normalize_name;
use crate::model::{Bill, PaymentSource, Transaction};

const CONFIDENCE_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ApprovalPolicy {
    pub min_confidence: f64,
    pub generate_next_occurrence: bool,
}

impl ApprovalPolicy {
    /// Never lower than what the matcher itself emits at two of three.
    pub fn effective_min_confidence(self) -> f64 {
        self.min_confidence.max(min_match_confidence())
    }

    pub fn approves(self, confidence: f64) -> bool {
        confidence + CONFIDENCE_EPSILON >= self.effective_min_confidence()
    }
}

impl Default for ApprovalPolicy {
    fn default() -> Self {
        Self {
            min_confidence: min_match_confidence(),
            generate_next_occurrence: true,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RejectedMatch {
    pub result: MatchResult,
    pub reason: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ReconcileOutcome {
    /// Input bills with approved payments applied, in input order.
    pub bills: Vec<Bill>,
    /// Next-cycle instances created for paid recurring bills.
    pub generated: Vec<Bill>,
    pub approved: Vec<MatchResult>,
    pub rejected: Vec<RejectedMatch>,
}

/// Runs batch matching and auto-approves every match at or above the
/// policy's confidence floor.
///
/// An approved match marks its bill paid from the bank feed (amount and
/// date taken from the transaction) and, for recurring bills, may add a
/// next-occurrence instance. Anything else is recorded as rejected and
/// leaves state untouched.
pub fn reconcile(
    matcher: &BillMatcher,
    bills: &[Bill],
    transactions: &[Transaction],
    policy: ApprovalPolicy,
    events: &EventBus,
) -> ReconcileOutcome {
    let mut outcome = ReconcileOutcome {
        bills: bills.to_vec(),
        ..ReconcileOutcome::default()
    };

    for result in matcher.match_all(transactions, bills) {
        if !policy.approves(result.confidence) {
            let reason = format!(
                "Confidence {:.2} is below the auto-approve minimum {:.2}.",
                result.confidence,
                policy.effective_min_confidence()
            );
            reject(&mut outcome, events, result, reason);
            continue;
        }

        let Some(index) = outcome
            .bills
            .iter()
            .position(|bill| bill.id == result.bill.id)
        else {
            continue;
        };

        let eligibility = can_pay(&outcome.bills[index]);
        if !eligibility.can_pay {
            let reason = eligibility
                .reason
                .unwrap_or_else(|| "Already paid for the current cycle.".to_string());
            reject(&mut outcome, events, result, reason);
            continue;
        }

        let current = &outcome.bills[index];
        let paid_date = result
            .transaction
            .posted_on()
            .or_else(|| current.current_due_date());
        let paid = match paid_date {
            Some(paid_date) => mark_paid(
                current,
                paid_date,
                MarkPaidOptions {
                    amount: Some(result.transaction.abs_amount()),
                    source: PaymentSource::ExternalFeed,
                    transaction_id: Some(result.transaction.id.clone()),
                    recorded_at: None,
                },
            ),
            None => Err(CoreError::invalid_bill_date(
                &current.id,
                current.current_due_label(),
            )),
        };
        let paid = match paid {
            Ok(paid) => paid,
            Err(error) => {
                reject(&mut outcome, events, result, error.message);
                continue;
            }
        };

        info!(
            bill_id = %paid.id,
            transaction_id = %result.transaction.id,
            confidence = result.confidence,
            "auto-approved match"
        );
        events.publish(&BillEvent::MatchApproved {
            bill_id: paid.id.clone(),
            transaction_id: result.transaction.id.clone(),
            confidence: result.confidence,
        });
        if let Some(payment) = paid.last_payment.as_ref() {
            events.publish(&BillEvent::BillPaid {
                bill_id: paid.id.clone(),
                due_date: payment.due_date.clone(),
                source: payment.source,
                transaction_id: payment.transaction_id.clone(),
            });
        }

        if policy.generate_next_occurrence {
            if let Some(next) = next_occurrence(&paid) {
                if !occurrence_exists(&next, &paid.id, &outcome) {
                    info!(
                        bill_id = %next.id,
                        source_bill_id = %paid.id,
                        due_date = %next.due_date,
                        "generated next occurrence"
                    );
                    events.publish(&BillEvent::OccurrenceGenerated {
                        bill_id: next.id.clone(),
                        source_bill_id: paid.id.clone(),
                        due_date: next.due_date.clone(),
                    });
                    outcome.generated.push(next);
                }
            }
        }

        outcome.bills[index] = paid;
        outcome.approved.push(result);
    }

    outcome
}

fn reject(outcome: &mut ReconcileOutcome, events: &EventBus, result: MatchResult, reason: String) {
    info!(
        bill_id = %result.bill.id,
        transaction_id = %result.transaction.id,
        confidence = result.confidence,
        reason = %reason,
        "rejected match"
    );
    events.publish(&BillEvent::MatchRejected {
        bill_id: result.bill.id.clone(),
        transaction_id: result.transaction.id.clone(),
        confidence: result.confidence,
        reason: reason.clone(),
    });
    outcome.rejected.push(RejectedMatch { result, reason });
}

/// Fresh instance for the cycle after the one `paid` just settled.
/// `None` for one-time bills or when the next due date is unusable.
pub fn next_occurrence(paid: &Bill) -> Option<Bill> {
    next_occurrence_with_id(paid, &format!("bill_{}", Ulid::new()))
}

pub fn next_occurrence_with_id(paid: &Bill, id: &str) -> Option<Bill> {
    if !paid.recurrence.is_recurring() {
        return None;
    }
    let due = paid.current_due_date()?;
    let mut next = Bill::new(id, &paid.name, paid.amount, paid.recurrence, due);
    next.recurring_template_id = paid.recurring_template_id.clone();
    Some(next)
}

fn occurrence_exists(candidate: &Bill, source_id: &str, outcome: &ReconcileOutcome) -> bool {
    let due = candidate.current_due_date();
    outcome
        .bills
        .iter()
        .chain(outcome.generated.iter())
        .filter(|bill| bill.id != source_id)
        .any(|bill| same_series(bill, candidate) && bill.current_due_date() == due)
}

fn same_series(left: &Bill, right: &Bill) -> bool {
    match (&left.recurring_template_id, &right.recurring_template_id) {
        (Some(a), Some(b)) => a == b,
        _ => normalize_name(&left.name) == normalize_name(&right.name),
    }
}
