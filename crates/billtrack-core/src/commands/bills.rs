use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::commands::common::{bill_row, load_bills, load_engine, payday_data};
use crate::contracts::envelope::{SuccessEnvelope, success};
use crate::contracts::types::{BillRow, DueData, PayData, ProcessData, StatusCounts, StatusData};
use crate::cycle::date::format_iso_date;
use crate::cycle::tracker::{MarkPaidOptions, TrackedBill};
use crate::model::BillStatus;
use crate::{CoreError, CoreResult};

#[derive(Debug)]
pub struct BillsRunOptions<'a> {
    pub bills_path: PathBuf,
    pub today: NaiveDate,
    pub home_override: Option<&'a Path>,
}

#[derive(Debug)]
pub struct DueRunOptions<'a> {
    pub bills_path: PathBuf,
    pub today: NaiveDate,
    pub before: Option<NaiveDate>,
    pub home_override: Option<&'a Path>,
}

#[derive(Debug)]
pub struct PayRunOptions<'a> {
    pub bills_path: PathBuf,
    pub bill_id: String,
    pub today: NaiveDate,
    pub paid_on: Option<NaiveDate>,
    pub amount: Option<f64>,
    pub home_override: Option<&'a Path>,
}

pub fn process(bills_path: &Path, today: NaiveDate) -> CoreResult<SuccessEnvelope> {
    process_with_options(BillsRunOptions {
        bills_path: bills_path.to_path_buf(),
        today,
        home_override: None,
    })
}

#[doc(hidden)]
pub fn process_with_options(options: BillsRunOptions<'_>) -> CoreResult<SuccessEnvelope> {
    let engine = load_engine(options.home_override)?;
    let bills = load_bills(&options.bills_path)?;
    let processed = engine.process(&bills, options.today);

    let rows = processed
        .iter()
        .map(|bill| {
            bill_row(&TrackedBill {
                assessment: engine.status_of(bill, options.today),
                bill: bill.clone(),
            })
        })
        .collect::<Vec<BillRow>>();

    success(
        "bills process",
        ProcessData {
            today: format_iso_date(&options.today),
            rows,
            bills: processed,
        },
    )
}

pub fn status(bills_path: &Path, today: NaiveDate) -> CoreResult<SuccessEnvelope> {
    status_with_options(BillsRunOptions {
        bills_path: bills_path.to_path_buf(),
        today,
        home_override: None,
    })
}

#[doc(hidden)]
pub fn status_with_options(options: BillsRunOptions<'_>) -> CoreResult<SuccessEnvelope> {
    let engine = load_engine(options.home_override)?;
    let bills = load_bills(&options.bills_path)?;
    let processed = engine.process(&bills, options.today);
    let sorted = engine.sorted(&processed, options.today);

    let mut counts = StatusCounts::default();
    for tracked in &sorted {
        match tracked.assessment.status {
            BillStatus::Overdue => counts.overdue += 1,
            BillStatus::DueSoon => counts.due_soon += 1,
            BillStatus::Upcoming => counts.upcoming += 1,
            BillStatus::Pending => counts.pending += 1,
            BillStatus::Skipped => counts.skipped += 1,
            BillStatus::Paid => counts.paid += 1,
        }
    }

    success(
        "bills status",
        StatusData {
            today: format_iso_date(&options.today),
            counts,
            rows: sorted.iter().map(bill_row).collect(),
        },
    )
}

pub fn due(bills_path: &Path, today: NaiveDate, before: Option<NaiveDate>) -> CoreResult<SuccessEnvelope> {
    due_with_options(DueRunOptions {
        bills_path: bills_path.to_path_buf(),
        today,
        before,
        home_override: None,
    })
}

#[doc(hidden)]
pub fn due_with_options(options: DueRunOptions<'_>) -> CoreResult<SuccessEnvelope> {
    let engine = load_engine(options.home_override)?;
    let bills = load_bills(&options.bills_path)?;
    let processed = engine.process(&bills, options.today);

    let (cutoff, cutoff_source, payday) = match options.before {
        Some(before) => (before, "explicit", None),
        None => match engine.due_cutoff(options.today) {
            (cutoff, Some(payday)) => (cutoff, "payday", Some(payday_data(&payday))),
            (cutoff, None) => (cutoff, "fallback", None),
        },
    };

    let owed = engine.owed_before(&processed, cutoff, options.today);
    let total_amount = owed.iter().map(|tracked| tracked.bill.amount).sum::<f64>();

    success(
        "bills due",
        DueData {
            today: format_iso_date(&options.today),
            cutoff: format_iso_date(&cutoff),
            cutoff_source: cutoff_source.to_string(),
            payday,
            total_amount,
            rows: owed.iter().map(bill_row).collect(),
        },
    )
}

pub fn pay(
    bills_path: &Path,
    bill_id: &str,
    today: NaiveDate,
    paid_on: Option<NaiveDate>,
    amount: Option<f64>,
) -> CoreResult<SuccessEnvelope> {
    pay_with_options(PayRunOptions {
        bills_path: bills_path.to_path_buf(),
        bill_id: bill_id.to_string(),
        today,
        paid_on,
        amount,
        home_override: None,
    })
}

#[doc(hidden)]
pub fn pay_with_options(options: PayRunOptions<'_>) -> CoreResult<SuccessEnvelope> {
    if let Some(amount) = options.amount {
        if !amount.is_finite() || amount <= 0.0 {
            return Err(CoreError::invalid_argument_for_command(
                "`--amount` must be a positive number.",
                Some("bills pay"),
            ));
        }
    }

    let engine = load_engine(options.home_override)?;
    let bills = load_bills(&options.bills_path)?;
    let processed = engine.process(&bills, options.today);
    let bill = processed
        .iter()
        .find(|bill| bill.id == options.bill_id)
        .ok_or_else(|| CoreError::bill_not_found(&options.bill_id))?;

    let eligibility = engine.can_pay(bill);
    if !eligibility.can_pay {
        return success(
            "bills pay",
            PayData {
                applied: false,
                reason: eligibility.reason,
                payment: None,
                bill: bill.clone(),
            },
        );
    }

    let paid = engine.mark_paid(
        bill,
        options.paid_on.unwrap_or(options.today),
        MarkPaidOptions {
            amount: options.amount,
            ..MarkPaidOptions::default()
        },
    )?;
    success(
        "bills pay",
        PayData {
            applied: true,
            reason: None,
            payment: paid.last_payment.clone(),
            bill: paid,
        },
    )
}
