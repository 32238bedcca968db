#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use billtrack_core::{CoreResult, SuccessEnvelope};
use chrono::NaiveDate;
use serde_json::{Value, json};
use tempfile::{Builder, TempDir};

/// Temp workspace with an empty config home and a fixtures directory.
pub struct Workspace {
    pub dir: TempDir,
    pub home: PathBuf,
}

impl Workspace {
    pub fn fixture(&self, name: &str, records: &[Value]) -> PathBuf {
        let path = self.dir.path().join(name);
        let written = fs::write(&path, Value::Array(records.to_vec()).to_string());
        assert!(written.is_ok());
        path
    }

    pub fn raw_fixture(&self, name: &str, body: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        assert!(fs::write(&path, body).is_ok());
        path
    }

    pub fn write_config(&self, config: &Value) {
        let written = fs::write(self.home.join("config.json"), config.to_string());
        assert!(written.is_ok());
    }

    pub fn home(&self) -> Option<&Path> {
        Some(self.home.as_path())
    }
}

pub fn workspace(prefix: &str) -> std::io::Result<Workspace> {
    let dir = Builder::new().prefix(prefix).tempdir()?;
    let home = dir.path().join("billtrack-home");
    fs::create_dir_all(&home)?;
    Ok(Workspace { dir, home })
}

pub fn date(value: &str) -> NaiveDate {
    let parsed = NaiveDate::parse_from_str(value, "%Y-%m-%d");
    assert!(parsed.is_ok());
    parsed.unwrap_or(NaiveDate::MIN)
}

pub fn bill(id: &str, name: &str, amount: f64, recurrence: &str, due_date: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "amount": amount,
        "recurrence": recurrence,
        "dueDate": due_date,
    })
}

pub fn transaction(id: &str, name: &str, amount: f64, date: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "amount": amount,
        "date": date,
        "pending": false,
    })
}

/// Serializes a successful envelope to JSON; `Value::Null` on failure.
pub fn payload(result: CoreResult<SuccessEnvelope>) -> Value {
    assert!(result.is_ok(), "{:?}", result.as_ref().err());
    if let Ok(success) = result {
        let value = serde_json::to_value(success);
        assert!(value.is_ok());
        if let Ok(value) = value {
            return value;
        }
    }
    Value::Null
}

pub fn rows(payload: &Value) -> Vec<Value> {
    payload["data"]["rows"].as_array().cloned().unwrap_or_default()
}

pub fn row_ids(rows: &[Value], key: &str) -> Vec<String> {
    rows.iter()
        .filter_map(|row| row[key].as_str().map(str::to_string))
        .collect()
}
