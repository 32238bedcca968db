use std::path::Path;

use serde_json::{Value, json};
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct CoreError {
    pub code: String,
    pub message: String,
    pub recovery_steps: Vec<String>,
    pub data: Option<Value>,
}

impl CoreError {
    pub fn new(code: &str, message: &str, recovery_steps: Vec<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.to_string(),
            recovery_steps,
            data: None,
        }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn invalid_argument(message: &str) -> Self {
        Self::invalid_argument_for_command(message, None)
    }

    pub fn invalid_argument_for_command(message: &str, command: Option<&str>) -> Self {
        let help_hint = match command {
            Some(cmd) => format!("Run `billtrack {cmd} --help` for usage."),
            None => "Run `billtrack --help` for usage.".to_string(),
        };
        let error = Self::new("invalid_argument", message, vec![help_hint]);
        if let Some(cmd) = command {
            return error.with_data(json!({
                "command_hint": cmd,
            }));
        }
        error
    }

    pub fn invalid_bill_date(bill_id: &str, value: &str) -> Self {
        Self::new(
            "invalid_bill_date",
            &format!("Bill `{bill_id}` has no usable due date (stored value `{value}`)."),
            vec![
                "Store due dates as YYYY-MM-DD or an ISO date-time.".to_string(),
                "Fix the bill record and retry.".to_string(),
            ],
        )
        .with_data(json!({
            "bill_id": bill_id,
            "stored_value": value,
        }))
    }

    pub fn bill_not_found(bill_id: &str) -> Self {
        Self::new(
            "bill_not_found",
            &format!("Bill id `{bill_id}` was not found."),
            vec!["Run `billtrack bills status --bills <path>` to list bill ids.".to_string()],
        )
        .with_data(json!({
            "bill_id": bill_id,
        }))
    }

    pub fn no_payday_information() -> Self {
        Self::new(
            "no_payday_information",
            "No payday information available.",
            vec![
                "Add `paySchedules.interval` or `paySchedules.monthly` with a non-zero amount to config.json."
                    .to_string(),
            ],
        )
    }

    pub fn config_read_failed(path: &Path, detail: &str) -> Self {
        let location = path.display().to_string();
        Self::new(
            "config_read_failed",
            &format!("Cannot read config at `{location}`: {detail}"),
            vec![format!(
                "Grant read access to `{location}` or set `BILLTRACK_HOME` to another directory."
            )],
        )
    }

    pub fn config_parse_failed(path: &Path, detail: &str) -> Self {
        let location = path.display().to_string();
        Self::new(
            "config_parse_failed",
            &format!("Config at `{location}` is not valid: {detail}"),
            vec![format!(
                "Fix the JSON in `{location}` or delete it to fall back to defaults."
            )],
        )
    }

    pub fn input_read_failed(path: &Path, detail: &str) -> Self {
        let location = path.display().to_string();
        Self::new(
            "input_read_failed",
            &format!("Cannot read input file `{location}`: {detail}"),
            vec!["Check the path and file permissions, then retry.".to_string()],
        )
    }

    pub fn input_parse_failed(path: &Path, detail: &str) -> Self {
        let location = path.display().to_string();
        Self::new(
            "input_parse_failed",
            &format!("Input file `{location}` does not match the record schema: {detail}"),
            vec![
                "Provide one top-level JSON array of records.".to_string(),
                "Amounts must be JSON numbers, not strings.".to_string(),
            ],
        )
        .with_data(json!({
            "path": location,
        }))
    }

    pub fn internal_serialization(message: &str) -> Self {
        Self::new("internal_serialization_error", message, Vec::new())
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
