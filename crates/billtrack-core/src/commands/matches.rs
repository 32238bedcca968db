use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::CoreResult;
use crate::commands::common::{load_bills, load_engine, load_transactions, match_row};
use crate::contracts::envelope::{SuccessEnvelope, success};
use crate::contracts::types::{MatchData, MatchRow};
use crate::cycle::date::format_iso_date;
use crate::engine::MatchMode;
use crate::matching::policy::MATCH_POLICY_VERSION;

#[derive(Debug)]
pub struct MatchRunOptions<'a> {
    pub bills_path: PathBuf,
    pub transactions_path: PathBuf,
    pub today: NaiveDate,
    pub loose: bool,
    pub home_override: Option<&'a Path>,
}

pub fn run(
    bills_path: &Path,
    transactions_path: &Path,
    today: NaiveDate,
    loose: bool,
) -> CoreResult<SuccessEnvelope> {
    run_with_options(MatchRunOptions {
        bills_path: bills_path.to_path_buf(),
        transactions_path: transactions_path.to_path_buf(),
        today,
        loose,
        home_override: None,
    })
}

#[doc(hidden)]
pub fn run_with_options(options: MatchRunOptions<'_>) -> CoreResult<SuccessEnvelope> {
    let engine = load_engine(options.home_override)?;
    let bills = load_bills(&options.bills_path)?;
    let transactions = load_transactions(&options.transactions_path)?;
    let processed = engine.process(&bills, options.today);

    let mode = if options.loose {
        MatchMode::Reconciliation
    } else {
        MatchMode::Strict
    };
    let results = engine.match_all(&transactions, &processed, mode);

    let matched_ids = results
        .iter()
        .map(|result| result.transaction.id.as_str())
        .collect::<BTreeSet<&str>>();
    let unmatched_transactions = transactions
        .iter()
        .filter(|transaction| transaction.is_settled_outflow())
        .filter(|transaction| !matched_ids.contains(transaction.id.as_str()))
        .count();

    success(
        "match",
        MatchData {
            policy_version: MATCH_POLICY_VERSION.to_string(),
            mode: if options.loose { "loose" } else { "strict" }.to_string(),
            today: format_iso_date(&options.today),
            unmatched_transactions,
            rows: results.iter().map(match_row).collect::<Vec<MatchRow>>(),
        },
    )
}
