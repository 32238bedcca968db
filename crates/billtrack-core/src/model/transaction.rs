use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::cycle::date::parse_bill_date;

/// A bank feed row. Negative amounts are money out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merchant_name: Option<String>,
    pub amount: f64,
    pub date: String,
    #[serde(default)]
    pub pending: bool,
}

impl Transaction {
    pub fn is_settled_outflow(&self) -> bool {
        !self.pending && self.amount < 0.0
    }

    pub fn abs_amount(&self) -> f64 {
        self.amount.abs()
    }

    pub fn posted_on(&self) -> Option<NaiveDate> {
        parse_bill_date(&self.date)
    }

    /// Merchant name when the feed cleaned one up, otherwise the raw name.
    pub fn display_name(&self) -> &str {
        self.merchant_name
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .unwrap_or(&self.name)
    }
}
