use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

pub fn parse_iso_date(value: &str) -> Result<NaiveDate, String> {
    if value.len() != 10 {
        return Err("date must use YYYY-MM-DD format".to_string());
    }

    let bytes = value.as_bytes();
    if bytes[4] != b'-' || bytes[7] != b'-' {
        return Err("date must use YYYY-MM-DD format".to_string());
    }

    for index in [0usize, 1, 2, 3, 5, 6, 8, 9] {
        if !bytes[index].is_ascii_digit() {
            return Err("date must use YYYY-MM-DD format".to_string());
        }
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| "date must use valid calendar values".to_string())
}

/// Extended help shown after `billtrack bills --help`.
pub const BILLS_AFTER_HELP: &str = "\
Bill records:
  --bills takes a path to one top-level JSON array of bill objects:
    {\"id\", \"name\", \"amount\", \"recurrence\", \"dueDate\", ...}

  recurrence is one of: one-time, weekly, bi-weekly, monthly, quarterly, annually.
  Status is always derived from dueDate, nextDueDate and paymentHistory;
  stored `status` and `isPaid` fields are ignored.

  Commands never write the bills file. `bills process` and `bills pay`
  print the updated records so you can persist them yourself.
";

#[derive(Debug, Clone, Parser)]
#[command(
    name = "billtrack",
    version,
    about = "Recurring bill tracking and transaction reconciliation",
    disable_help_subcommand = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Track recurring bills through their payment cycles
    #[command(arg_required_else_help = true, after_long_help = BILLS_AFTER_HELP)]
    Bills {
        #[command(subcommand)]
        command: BillsCommand,
    },
    /// Match settled transactions to the bills they most likely pay
    Match {
        /// Path to the bills JSON file
        #[arg(long)]
        bills: PathBuf,
        /// Path to the transactions JSON file
        #[arg(long)]
        transactions: PathBuf,
        /// Use the wider reconciliation tolerances instead of the strict ones
        #[arg(long)]
        loose: bool,
        /// Reference date (YYYY-MM-DD); defaults to the local date
        #[arg(long, value_parser = parse_iso_date)]
        today: Option<NaiveDate>,
        /// Emit machine-readable JSON output
        #[arg(long)]
        json: bool,
    },
    /// Auto-approve confident matches and record the payments
    Reconcile {
        /// Path to the bills JSON file
        #[arg(long)]
        bills: PathBuf,
        /// Path to the transactions JSON file
        #[arg(long)]
        transactions: PathBuf,
        /// Reference date (YYYY-MM-DD); defaults to the local date
        #[arg(long, value_parser = parse_iso_date)]
        today: Option<NaiveDate>,
        /// Emit machine-readable JSON output
        #[arg(long)]
        json: bool,
    },
    /// Show the next payday from your configured pay schedules
    Payday {
        /// Reference date (YYYY-MM-DD); defaults to the local date
        #[arg(long, value_parser = parse_iso_date)]
        today: Option<NaiveDate>,
        /// Emit machine-readable JSON output
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Clone, Subcommand)]
pub enum BillsCommand {
    /// Roll every bill forward to its active cycle and report its status
    Process {
        /// Path to the bills JSON file
        #[arg(long)]
        bills: PathBuf,
        /// Reference date (YYYY-MM-DD); defaults to the local date
        #[arg(long, value_parser = parse_iso_date)]
        today: Option<NaiveDate>,
        /// Emit machine-readable JSON output
        #[arg(long)]
        json: bool,
    },
    /// List bills by urgency, overdue first
    Status {
        /// Path to the bills JSON file
        #[arg(long)]
        bills: PathBuf,
        /// Reference date (YYYY-MM-DD); defaults to the local date
        #[arg(long, value_parser = parse_iso_date)]
        today: Option<NaiveDate>,
        /// Emit machine-readable JSON output
        #[arg(long)]
        json: bool,
    },
    /// List what is owed before a cutoff (defaults to the next payday)
    Due {
        /// Path to the bills JSON file
        #[arg(long)]
        bills: PathBuf,
        /// Exclusive cutoff date (YYYY-MM-DD)
        #[arg(long, value_parser = parse_iso_date)]
        before: Option<NaiveDate>,
        /// Reference date (YYYY-MM-DD); defaults to the local date
        #[arg(long, value_parser = parse_iso_date)]
        today: Option<NaiveDate>,
        /// Emit machine-readable JSON output
        #[arg(long)]
        json: bool,
    },
    /// Record a manual payment for a bill's current cycle
    Pay {
        /// The bill id to pay (e.g. bill_01J...)
        bill_id: String,
        /// Path to the bills JSON file
        #[arg(long)]
        bills: PathBuf,
        /// Payment date (YYYY-MM-DD); defaults to the reference date
        #[arg(long, value_parser = parse_iso_date)]
        paid_on: Option<NaiveDate>,
        /// Amount paid; defaults to the bill amount
        #[arg(long, allow_negative_numbers = true)]
        amount: Option<f64>,
        /// Reference date (YYYY-MM-DD); defaults to the local date
        #[arg(long, value_parser = parse_iso_date)]
        today: Option<NaiveDate>,
        /// Emit machine-readable JSON output
        #[arg(long)]
        json: bool,
    },
}

#[cfg(test)]
pub fn parse_from<I, T>(itr: I) -> Result<Cli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    Cli::try_parse_from(itr)
}
