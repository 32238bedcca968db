use billtrack_core::commands;
use billtrack_core::{CoreResult, SuccessEnvelope};
use chrono::{Local, NaiveDate};

use crate::cli::{BillsCommand, Cli, Commands};

pub fn dispatch(cli: &Cli) -> CoreResult<SuccessEnvelope> {
    dispatch_on(cli, Local::now().date_naive())
}

/// `local_today` is the fallback for commands run without `--today`.
fn dispatch_on(cli: &Cli, local_today: NaiveDate) -> CoreResult<SuccessEnvelope> {
    match &cli.command {
        Commands::Bills { command } => match command {
            BillsCommand::Process { bills, today, .. } => {
                commands::bills::process(bills, today.unwrap_or(local_today))
            }
            BillsCommand::Status { bills, today, .. } => {
                commands::bills::status(bills, today.unwrap_or(local_today))
            }
            BillsCommand::Due {
                bills,
                before,
                today,
                ..
            } => commands::bills::due(bills, today.unwrap_or(local_today), *before),
            BillsCommand::Pay {
                bill_id,
                bills,
                paid_on,
                amount,
                today,
                ..
            } => commands::bills::pay(
                bills,
                bill_id,
                today.unwrap_or(local_today),
                *paid_on,
                *amount,
            ),
        },
        Commands::Match {
            bills,
            transactions,
            loose,
            today,
            ..
        } => commands::matches::run(bills, transactions, today.unwrap_or(local_today), *loose),
        Commands::Reconcile {
            bills,
            transactions,
            today,
            ..
        } => commands::reconcile::run(bills, transactions, today.unwrap_or(local_today)),
        Commands::Payday { today, .. } => commands::payday::run(today.unwrap_or(local_today)),
    }
}
