use serde::{Deserialize, Serialize};

/// Identifier emitted alongside match results so threshold changes stay
/// auditable.
pub const MATCH_POLICY_VERSION: &str = "match/v1";

/// Criteria (of name, amount, date) a pair must satisfy to be a match.
/// Fixed; callers cannot lower it.
pub const MIN_MATCHED_CRITERIA: usize = 2;
pub const CRITERIA_COUNT: usize = 3;

/// Tolerances for one matching path.
///
/// The date window may be asymmetric: `days_before_due` bounds how early a
/// transaction may post, `days_after_due` how late.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchPolicy {
    pub amount_tolerance: f64,
    pub days_before_due: i64,
    pub days_after_due: i64,
}

impl MatchPolicy {
    pub fn amount_matches(self, transaction_amount: f64, bill_amount: f64) -> bool {
        let difference = (transaction_amount.abs() - bill_amount).abs();
        // Cents arithmetic in f64 drifts; don't let 0.5000000001 fail a 0.50 tolerance.
        difference <= self.amount_tolerance + 1e-9
    }

    /// `offset_days` is `transaction_date - due_date`.
    pub fn date_matches(self, offset_days: i64) -> bool {
        if offset_days < 0 {
            return -offset_days <= self.days_before_due;
        }
        offset_days <= self.days_after_due
    }
}

pub const STRICT_MATCH_POLICY: MatchPolicy = MatchPolicy {
    amount_tolerance: 0.50,
    days_before_due: 7,
    days_after_due: 7,
};

pub const RECONCILIATION_MATCH_POLICY: MatchPolicy = MatchPolicy {
    amount_tolerance: 2.00,
    days_before_due: 5,
    days_after_due: 10,
};

pub fn confidence_for(matched_criteria: usize) -> f64 {
    matched_criteria.min(CRITERIA_COUNT) as f64 / CRITERIA_COUNT as f64
}

/// Confidence of a pair that satisfies exactly the minimum criteria.
pub fn min_match_confidence() -> f64 {
    confidence_for(MIN_MATCHED_CRITERIA)
}
