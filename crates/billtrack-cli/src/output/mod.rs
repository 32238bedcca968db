mod bills_text;
mod error_text;
mod format;
mod json;
mod match_text;
mod mode;

use std::io;

use billtrack_core::{CoreError, SuccessEnvelope};

use crate::stdout_io::write_stdout_line;

pub use mode::{OutputMode, mode_for_command};

pub fn print_success(success: &SuccessEnvelope, mode: OutputMode) -> io::Result<()> {
    let body = match mode {
        OutputMode::Text => render_text_success(success)?,
        OutputMode::Json => json::render_success_json(success)?,
    };
    write_stdout_line(&body)
}

pub fn print_failure(error: &CoreError, mode: OutputMode) -> io::Result<()> {
    let body = match mode {
        OutputMode::Json => json::render_error_json(error)?,
        OutputMode::Text => error_text::render_error(error),
    };
    write_stdout_line(&body)
}

fn render_text_success(success: &SuccessEnvelope) -> io::Result<String> {
    match success.command.as_str() {
        "bills process" => bills_text::render_process(&success.data),
        "bills status" => bills_text::render_status(&success.data),
        "bills due" => bills_text::render_due(&success.data),
        "bills pay" => bills_text::render_pay(&success.data),
        "match" => match_text::render_match(&success.data),
        "reconcile" => match_text::render_reconcile(&success.data),
        "payday" => match_text::render_payday(&success.data),
        _ => Err(io::Error::other(format!(
            "unsupported text output command `{}`",
            success.command
        ))),
    }
}
