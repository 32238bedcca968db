use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::CoreResult;
use crate::commands::common::{load_bills, load_engine, load_transactions, match_row};
use crate::contracts::envelope::{SuccessEnvelope, success};
use crate::contracts::types::{ReconcileData, RejectedRow};
use crate::cycle::date::format_iso_date;
use crate::matching::policy::MATCH_POLICY_VERSION;

#[derive(Debug)]
pub struct ReconcileRunOptions<'a> {
    pub bills_path: PathBuf,
    pub transactions_path: PathBuf,
    pub today: NaiveDate,
    pub home_override: Option<&'a Path>,
}

pub fn run(bills_path: &Path, transactions_path: &Path, today: NaiveDate) -> CoreResult<SuccessEnvelope> {
    run_with_options(ReconcileRunOptions {
        bills_path: bills_path.to_path_buf(),
        transactions_path: transactions_path.to_path_buf(),
        today,
        home_override: None,
    })
}

#[doc(hidden)]
pub fn run_with_options(options: ReconcileRunOptions<'_>) -> CoreResult<SuccessEnvelope> {
    let engine = load_engine(options.home_override)?;
    let bills = load_bills(&options.bills_path)?;
    let transactions = load_transactions(&options.transactions_path)?;

    let outcome = engine.reconcile(&bills, &transactions, options.today);

    success(
        "reconcile",
        ReconcileData {
            policy_version: MATCH_POLICY_VERSION.to_string(),
            today: format_iso_date(&options.today),
            approved: outcome.approved.iter().map(match_row).collect(),
            rejected: outcome
                .rejected
                .iter()
                .map(|rejected| RejectedRow {
                    row: match_row(&rejected.result),
                    reason: rejected.reason.clone(),
                })
                .collect(),
            bills: outcome.bills,
            generated: outcome.generated,
        },
    )
}
