use std::cmp::Ordering;
use std::collections::BTreeSet;

use serde::Serialize;
use tracing::debug;

use crate::cycle::tracker::is_paid_for_current_cycle;
use crate::matching::policy::{
    MIN_MATCHED_CRITERIA, MatchPolicy, RECONCILIATION_MATCH_POLICY, STRICT_MATCH_POLICY,
    confidence_for,
};
use crate::matching::similarity::names_match;
use crate::model::{Bill, Transaction};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MatchCriteria {
    pub name: bool,
    pub amount: bool,
    pub date: bool,
}

impl MatchCriteria {
    pub fn matched_count(self) -> usize {
        [self.name, self.amount, self.date]
            .into_iter()
            .filter(|matched| *matched)
            .count()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MatchResult {
    pub transaction: Transaction,
    pub bill: Bill,
    pub confidence: f64,
    pub criteria: MatchCriteria,
    /// `transaction date - bill due date`, when both dates parse.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_offset_days: Option<i64>,
}

#[derive(Debug, Clone, Copy)]
pub struct BillMatcher {
    policy: MatchPolicy,
}

impl BillMatcher {
    pub const fn new(policy: MatchPolicy) -> Self {
        Self { policy }
    }

    pub const fn strict() -> Self {
        Self::new(STRICT_MATCH_POLICY)
    }

    pub const fn reconciliation() -> Self {
        Self::new(RECONCILIATION_MATCH_POLICY)
    }

    pub const fn policy(&self) -> MatchPolicy {
        self.policy
    }

    /// Scores the three criteria independently. Deposits and pending rows are
    /// never eligible and yield `None`.
    pub fn score(&self, transaction: &Transaction, bill: &Bill) -> Option<(MatchCriteria, Option<i64>)> {
        if !transaction.is_settled_outflow() {
            return None;
        }

        let date_offset_days = match (transaction.posted_on(), bill.current_due_date()) {
            (Some(posted), Some(due)) => Some((posted - due).num_days()),
            _ => None,
        };
        let criteria = MatchCriteria {
            name: names_match(transaction.display_name(), &bill.name)
                || names_match(&transaction.name, &bill.name),
            amount: self.policy.amount_matches(transaction.amount, bill.amount),
            date: date_offset_days.is_some_and(|offset| self.policy.date_matches(offset)),
        };
        Some((criteria, date_offset_days))
    }

    /// Returns a result only when at least two of the three criteria hold.
    pub fn match_transaction(&self, transaction: &Transaction, bill: &Bill) -> Option<MatchResult> {
        let (criteria, date_offset_days) = self.score(transaction, bill)?;
        let matched = criteria.matched_count();
        debug!(
            transaction_id = %transaction.id,
            bill_id = %bill.id,
            name = criteria.name,
            amount = criteria.amount,
            date = criteria.date,
            "scored transaction against bill"
        );
        if matched < MIN_MATCHED_CRITERIA {
            return None;
        }

        Some(MatchResult {
            transaction: transaction.clone(),
            bill: bill.clone(),
            confidence: confidence_for(matched),
            criteria,
            date_offset_days,
        })
    }

    /// Greedy one-to-one assignment in bill order.
    ///
    /// Bills already paid for their cycle are skipped, as are transactions
    /// any bill has already linked. Each bill takes its best available
    /// transaction: highest confidence, then closest to the due date, then
    /// lowest transaction id. Output is sorted by confidence, descending;
    /// equal confidences keep bill order.
    pub fn match_all(&self, transactions: &[Transaction], bills: &[Bill]) -> Vec<MatchResult> {
        let mut consumed: BTreeSet<&str> = bills
            .iter()
            .flat_map(|bill| bill.linked_transaction_ids.iter().map(String::as_str))
            .collect();
        let mut results: Vec<MatchResult> = Vec::new();

        for bill in bills {
            if is_paid_for_current_cycle(bill) {
                continue;
            }

            let best = transactions
                .iter()
                .filter(|transaction| !consumed.contains(transaction.id.as_str()))
                .filter_map(|transaction| self.match_transaction(transaction, bill))
                .min_by(compare_candidates);
            let Some(best) = best else {
                continue;
            };

            if let Some(original) = transactions
                .iter()
                .find(|transaction| transaction.id == best.transaction.id)
            {
                consumed.insert(original.id.as_str());
            }
            results.push(best);
        }

        results.sort_by(|left, right| right.confidence.total_cmp(&left.confidence));
        results
    }
}

impl Default for BillMatcher {
    fn default() -> Self {
        Self::strict()
    }
}

fn compare_candidates(left: &MatchResult, right: &MatchResult) -> Ordering {
    right
        .confidence
        .total_cmp(&left.confidence)
        .then_with(|| {
            compare_offsets(
                left.date_offset_days.map(i64::abs),
                right.date_offset_days.map(i64::abs),
            )
        })
        .then_with(|| left.transaction.id.cmp(&right.transaction.id))
}

fn compare_offsets(left: Option<i64>, right: Option<i64>) -> Ordering {
    match (left, right) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
