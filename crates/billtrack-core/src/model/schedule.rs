use serde::{Deserialize, Serialize};

/// Paid every `interval_days`, counted from `last_paid_date`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntervalSchedule {
    pub last_paid_date: String,
    #[serde(default)]
    pub amount: f64,
    pub interval_days: i64,
}

/// Paid on fixed days of each month, e.g. the 15th and 30th.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlySchedule {
    #[serde(default)]
    pub amount: f64,
    pub days_of_month: Vec<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaySchedules {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval: Option<IntervalSchedule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monthly: Option<MonthlySchedule>,
}
