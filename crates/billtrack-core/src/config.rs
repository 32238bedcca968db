use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cycle::tracker::{CyclePolicy, DEFAULT_DUE_SOON_DAYS};
use crate::matching::approval::ApprovalPolicy;
use crate::matching::policy::{
    MatchPolicy, RECONCILIATION_MATCH_POLICY, STRICT_MATCH_POLICY, min_match_confidence,
};
use crate::model::PaySchedules;
use crate::{CoreError, CoreResult};

pub const HOME_ENV_VAR: &str = "BILLTRACK_HOME";
pub const CONFIG_FILE_NAME: &str = "config.json";
pub const MAX_PAY_INTERVAL_DAYS: i64 = 366;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    pub due_soon_days: i64,
    pub cycle_policy: CyclePolicy,
    pub strict_matching: MatchPolicy,
    pub reconciliation_matching: MatchPolicy,
    pub auto_approve_min_confidence: f64,
    pub generate_next_occurrence: bool,
    pub pay_schedules: PaySchedules,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            due_soon_days: DEFAULT_DUE_SOON_DAYS,
            cycle_policy: CyclePolicy::default(),
            strict_matching: STRICT_MATCH_POLICY,
            reconciliation_matching: RECONCILIATION_MATCH_POLICY,
            auto_approve_min_confidence: min_match_confidence(),
            generate_next_occurrence: true,
            pay_schedules: PaySchedules::default(),
        }
    }
}

impl EngineConfig {
    pub fn approval_policy(&self) -> ApprovalPolicy {
        ApprovalPolicy {
            min_confidence: self.auto_approve_min_confidence,
            generate_next_occurrence: self.generate_next_occurrence,
        }
    }

    fn validate(self, path: &Path) -> CoreResult<Self> {
        if self.due_soon_days < 0 {
            return Err(CoreError::config_parse_failed(
                path,
                "`dueSoonDays` must not be negative.",
            ));
        }
        for (field, policy) in [
            ("strictMatching", self.strict_matching),
            ("reconciliationMatching", self.reconciliation_matching),
        ] {
            if policy.amount_tolerance < 0.0
                || policy.days_before_due < 0
                || policy.days_after_due < 0
            {
                return Err(CoreError::config_parse_failed(
                    path,
                    &format!("`{field}` tolerances must not be negative."),
                ));
            }
        }
        if let Some(interval) = self.pay_schedules.interval.as_ref()
            && interval.interval_days > MAX_PAY_INTERVAL_DAYS
        {
            return Err(CoreError::config_parse_failed(
                path,
                &format!("`intervalDays` must be at most {MAX_PAY_INTERVAL_DAYS}."),
            ));
        }
        if !self.auto_approve_min_confidence.is_finite() {
            return Err(CoreError::config_parse_failed(
                path,
                "`autoApproveMinConfidence` must be a number.",
            ));
        }
        Ok(Self {
            auto_approve_min_confidence: self
                .auto_approve_min_confidence
                .clamp(min_match_confidence(), 1.0),
            ..self
        })
    }
}

pub fn resolve_home(home_override: Option<&Path>) -> CoreResult<PathBuf> {
    match home_override {
        Some(path) => Ok(path.to_path_buf()),
        None => {
            if let Some(override_path) = std::env::var_os(HOME_ENV_VAR) {
                Ok(PathBuf::from(override_path))
            } else if let Some(home_path) = home::home_dir() {
                Ok(home_path.join(".billtrack"))
            } else {
                Err(CoreError::config_read_failed(
                    Path::new("."),
                    "Could not resolve a home directory for configuration.",
                ))
            }
        }
    }
}

pub fn config_path(home: &Path) -> PathBuf {
    home.join(CONFIG_FILE_NAME)
}

pub fn load_config(home_override: Option<&Path>) -> CoreResult<EngineConfig> {
    let home = resolve_home(home_override)?;
    load_config_at(&config_path(&home))
}

/// A missing file means defaults; anything else unreadable is an error.
pub fn load_config_at(path: &Path) -> CoreResult<EngineConfig> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "no config file; using defaults");
            return Ok(EngineConfig::default());
        }
        Err(error) => return Err(CoreError::config_read_failed(path, &error.to_string())),
    };

    let parsed: EngineConfig = serde_json::from_str(&raw)
        .map_err(|error| CoreError::config_parse_failed(path, &error.to_string()))?;
    parsed.validate(path)
}
