mod cli;
mod dispatch;
mod output;
mod stdout_io;

use std::process::ExitCode;

use billtrack_core::CoreError;
use clap::{Parser, error::ErrorKind};
use stdout_io::write_stdout_text;
use tracing_subscriber::EnvFilter;

const ROOT_HELP: &str = "billtrack - recurring bill tracking and transaction reconciliation

Usage:
  billtrack <command>

Start here:
  billtrack bills status --bills bills.json
  billtrack bills due --bills bills.json
  billtrack --help
";

const TOP_LEVEL_HELP: &str = "billtrack - recurring bill tracking and transaction reconciliation

USAGE: billtrack <command>

Keep your bills current:
  billtrack bills process --bills <path>                  Roll bills forward to their active cycle
  billtrack bills status --bills <path>                   List bills by urgency, overdue first
  billtrack bills pay <bill-id> --bills <path>            Record a manual payment

Plan around payday:
  billtrack payday                                        Show the next payday from config
  billtrack bills due --bills <path>                      What is owed before the next payday

Reconcile against your bank feed:
  1. billtrack match --bills <path> --transactions <path>         Preview matches (add --loose for wider tolerances)
  2. billtrack reconcile --bills <path> --transactions <path>     Auto-approve confident matches

Every command accepts --json for machine-readable output and --today <YYYY-MM-DD>
to evaluate against a date other than today.

Configuration:
  Pay schedules and tolerances are read from config.json in $BILLTRACK_HOME
  (default ~/.billtrack). Set RUST_LOG=debug to see matching decisions on stderr.
";

fn main() -> ExitCode {
    init_tracing();
    match run() {
        Ok(code) => code,
        Err(code) => code,
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run() -> Result<ExitCode, ExitCode> {
    let raw_args = std::env::args().collect::<Vec<String>>();
    if raw_args.len() == 1 {
        if write_stdout_text(ROOT_HELP).is_err() {
            return Err(ExitCode::from(2));
        }
        return Ok(ExitCode::SUCCESS);
    }
    let parsed = cli::Cli::try_parse();
    let cli = match parsed {
        Ok(value) => value,
        Err(err) => {
            if matches!(
                err.kind(),
                ErrorKind::DisplayHelp
                    | ErrorKind::DisplayVersion
                    | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
            ) {
                let text = if is_top_level_help_request(&raw_args) {
                    TOP_LEVEL_HELP.to_string()
                } else {
                    err.to_string()
                };
                if write_stdout_text(&text).is_err() {
                    return Err(ExitCode::from(2));
                }
                return Ok(ExitCode::SUCCESS);
            }
            let command_hint = if matches!(
                err.kind(),
                ErrorKind::MissingRequiredArgument
                    | ErrorKind::InvalidValue
                    | ErrorKind::ValueValidation
                    | ErrorKind::WrongNumberOfValues
                    | ErrorKind::UnknownArgument
                    | ErrorKind::InvalidSubcommand
            ) {
                command_path_from_args(&raw_args)
            } else {
                None
            };
            let clean_message = strip_clap_boilerplate(&err.to_string());
            let parse_error =
                CoreError::invalid_argument_for_command(&clean_message, command_hint.as_deref());
            let mode = infer_requested_output_mode(&raw_args);
            if output::print_failure(&parse_error, mode).is_err() {
                return Err(ExitCode::from(2));
            }
            return Err(ExitCode::from(1));
        }
    };
    let mode = output::mode_for_command(&cli.command);

    match dispatch::dispatch(&cli) {
        Ok(success) => {
            if output::print_success(&success, mode).is_err() {
                return Err(ExitCode::from(2));
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(error) => {
            tracing::debug!(code = %error.code, "command failed");
            if output::print_failure(&error, mode).is_err() {
                return Err(ExitCode::from(2));
            }
            Err(exit_code_for_error(&error))
        }
    }
}

fn is_top_level_help_request(raw_args: &[String]) -> bool {
    raw_args.len() == 2 && matches!(raw_args[1].as_str(), "--help" | "-h")
}

/// Drops clap's trailing usage and "For more information" lines; recovery
/// steps carry that guidance instead.
fn strip_clap_boilerplate(message: &str) -> String {
    let trimmed = if let Some(pos) = message.find("\n\nUsage:") {
        &message[..pos]
    } else if let Some(pos) = message.find("\nFor more information") {
        &message[..pos]
    } else {
        message
    };
    trimmed.trim_end().to_string()
}

/// Maps raw args onto the deepest known command path, e.g. "bills pay".
/// Flag values such as file paths are skipped along with their flags.
fn command_path_from_args(raw_args: &[String]) -> Option<String> {
    let mut words = Vec::new();
    let mut skip_value = false;
    for value in raw_args.iter().skip(1) {
        if skip_value {
            skip_value = false;
            continue;
        }
        if let Some(flag) = value.strip_prefix("--") {
            skip_value = !flag.contains('=') && flag_takes_value(flag);
            continue;
        }
        if value.starts_with('-') {
            continue;
        }
        words.push(value.as_str());
    }

    let hint = match words.as_slice() {
        ["bills", "process", ..] => Some("bills process"),
        ["bills", "status", ..] => Some("bills status"),
        ["bills", "due", ..] => Some("bills due"),
        ["bills", "pay", ..] => Some("bills pay"),
        ["bills", ..] => Some("bills"),
        ["match", ..] => Some("match"),
        ["reconcile", ..] => Some("reconcile"),
        ["payday", ..] => Some("payday"),
        _ => None,
    };
    hint.map(std::string::ToString::to_string)
}

fn flag_takes_value(flag: &str) -> bool {
    matches!(
        flag,
        "bills" | "transactions" | "today" | "before" | "paid-on" | "amount"
    )
}

fn exit_code_for_error(error: &CoreError) -> ExitCode {
    if error.code.starts_with("internal_") {
        ExitCode::from(2)
    } else {
        ExitCode::from(1)
    }
}

fn infer_requested_output_mode(raw_args: &[String]) -> output::OutputMode {
    if raw_args.iter().skip(1).any(|value| value == "--json") {
        return output::OutputMode::Json;
    }
    output::OutputMode::Text
}
