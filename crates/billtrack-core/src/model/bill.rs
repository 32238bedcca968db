use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::cycle::date::{Recurrence, format_iso_date, parse_bill_date};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BillStatus {
    Pending,
    Overdue,
    DueSoon,
    Upcoming,
    Paid,
    Skipped,
}

impl BillStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Overdue => "overdue",
            Self::DueSoon => "due-soon",
            Self::Upcoming => "upcoming",
            Self::Paid => "paid",
            Self::Skipped => "skipped",
        }
    }

    /// Sort rank; lower values are listed first.
    pub const fn priority(self) -> u8 {
        match self {
            Self::Overdue => 1,
            Self::DueSoon => 2,
            Self::Upcoming | Self::Pending => 3,
            Self::Skipped => 4,
            Self::Paid => 5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PaymentSource {
    Manual,
    #[serde(alias = "external_feed", alias = "bank")]
    ExternalFeed,
}

impl PaymentSource {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Manual => "manual",
            Self::ExternalFeed => "external-feed",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Manual => "manual entry",
            Self::ExternalFeed => "bank transaction",
        }
    }
}

/// One satisfied cycle. Never mutated after `mark_paid` creates it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRecord {
    pub amount: f64,
    pub paid_date: String,
    pub due_date: String,
    pub source: PaymentSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bill {
    pub id: String,
    pub name: String,
    pub amount: f64,
    pub recurrence: Recurrence,
    pub due_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_due_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_due_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<BillStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_paid: Option<bool>,
    #[serde(default)]
    pub payment_history: Vec<PaymentRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_payment: Option<PaymentRecord>,
    #[serde(default)]
    pub linked_transaction_ids: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped_due_dates: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurring_template_id: Option<String>,
}

impl Bill {
    pub fn new(
        id: &str,
        name: &str,
        amount: f64,
        recurrence: Recurrence,
        due_date: NaiveDate,
    ) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            amount,
            recurrence,
            due_date: format_iso_date(&due_date),
            last_due_date: None,
            next_due_date: None,
            status: None,
            is_paid: None,
            payment_history: Vec::new(),
            last_payment: None,
            linked_transaction_ids: BTreeSet::new(),
            skipped_due_dates: Vec::new(),
            recurring_template_id: None,
        }
    }

    /// Stored value describing the active cycle: `nextDueDate`, else `dueDate`.
    pub fn current_due_label(&self) -> &str {
        self.next_due_date.as_deref().unwrap_or(&self.due_date)
    }

    pub fn current_due_date(&self) -> Option<NaiveDate> {
        self.next_due_date
            .as_deref()
            .and_then(parse_bill_date)
            .or_else(|| parse_bill_date(&self.due_date))
    }

    /// Anchor the cycle calculator advances from.
    pub fn anchor_due_date(&self) -> Option<NaiveDate> {
        self.last_due_date
            .as_deref()
            .and_then(parse_bill_date)
            .or_else(|| parse_bill_date(&self.due_date))
    }

    pub fn latest_payment(&self) -> Option<&PaymentRecord> {
        self.last_payment
            .as_ref()
            .or_else(|| self.payment_history.last())
    }

    pub fn is_linked_to(&self, transaction_id: &str) -> bool {
        self.linked_transaction_ids.contains(transaction_id)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{Bill, BillStatus, PaymentSource};
    use crate::cycle::date::Recurrence;

    #[test]
    fn bill_round_trips_camel_case_record_fields() {
        let record = json!({
            "id": "bill_1",
            "name": "Netflix",
            "amount": 15.49,
            "recurrence": "monthly",
            "dueDate": "2024-11-01",
            "lastDueDate": "2024-10-01",
            "isPaid": true,
            "status": "paid",
            "linkedTransactionIds": ["txn_9"],
            "recurringTemplateId": "tpl_1"
        });
        let parsed: Result<Bill, _> = serde_json::from_value(record);
        assert!(parsed.is_ok());
        if let Ok(bill) = parsed {
            assert_eq!(bill.recurrence, Recurrence::Monthly);
            assert_eq!(bill.status, Some(BillStatus::Paid));
            assert!(bill.is_linked_to("txn_9"));
            assert!(bill.payment_history.is_empty());
            assert_eq!(bill.recurring_template_id.as_deref(), Some("tpl_1"));
        }
    }

    #[test]
    fn string_amounts_are_rejected() {
        let record = json!({
            "id": "bill_1",
            "name": "Rent",
            "amount": "1200",
            "recurrence": "monthly",
            "dueDate": "2025-01-01"
        });
        let parsed: Result<Bill, _> = serde_json::from_value(record);
        assert!(parsed.is_err());
    }

    #[test]
    fn current_due_date_falls_back_to_base_due_date() {
        let mut bill = Bill::new(
            "bill_1",
            "Gym",
            30.0,
            Recurrence::Monthly,
            chrono::NaiveDate::from_ymd_opt(2025, 1, 5).unwrap_or_default(),
        );
        bill.next_due_date = Some("garbage".to_string());
        assert_eq!(
            bill.current_due_date(),
            chrono::NaiveDate::from_ymd_opt(2025, 1, 5)
        );
        assert_eq!(bill.current_due_label(), "garbage");
    }

    #[test]
    fn payment_source_serializes_kebab_case() {
        let value = serde_json::to_value(PaymentSource::ExternalFeed);
        assert!(value.is_ok());
        if let Ok(value) = value {
            assert_eq!(value, json!("external-feed"));
        }
    }
}
