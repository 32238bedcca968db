use std::collections::BTreeSet;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

use crate::cycle::date::{Recurrence, parse_bill_date};
use crate::model::Bill;
use crate::{CoreError, CoreResult};

/// Source of generated bill instances. Instances point back through
/// `recurringTemplateId`; the template holds no list of its instances.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecurringTemplate {
    pub id: String,
    pub name: String,
    pub amount: f64,
    pub recurrence: Recurrence,
    pub start_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TemplateSyncPlan {
    pub add: Vec<Bill>,
    pub update: Vec<Bill>,
    pub remove: Vec<Bill>,
    pub preserve: Vec<Bill>,
}

impl TemplateSyncPlan {
    pub fn is_noop(&self) -> bool {
        self.add.is_empty() && self.update.is_empty() && self.remove.is_empty()
    }
}

/// Due dates the template wants from its start through `horizon`, capped by
/// its end date.
pub fn desired_due_dates(template: &RecurringTemplate, horizon: NaiveDate) -> CoreResult<Vec<NaiveDate>> {
    let start = parse_bill_date(&template.start_date)
        .ok_or_else(|| CoreError::invalid_bill_date(&template.id, &template.start_date))?;
    let last = match template.end_date.as_deref() {
        Some(raw) => parse_bill_date(raw)
            .ok_or_else(|| CoreError::invalid_bill_date(&template.id, raw))?
            .min(horizon),
        None => horizon,
    };

    let mut dates = Vec::new();
    let mut candidate = start;
    while candidate <= last {
        dates.push(candidate);
        if !template.recurrence.is_recurring() {
            break;
        }
        candidate = template.recurrence.advance_anchored(candidate, start.day());
    }
    Ok(dates)
}

/// Diffs the template's desired instances against `existing` bills.
///
/// Only bills carrying the template's id take part. Paid instances are
/// always preserved. Unpaid instances on a desired date are updated when
/// name, amount or recurrence drifted, and preserved otherwise. Unpaid
/// instances off the schedule, or duplicating a date, are removed. Desired
/// dates with no instance are added.
pub fn plan_template_sync(
    template: &RecurringTemplate,
    existing: &[Bill],
    horizon: NaiveDate,
) -> CoreResult<TemplateSyncPlan> {
    let desired = desired_due_dates(template, horizon)?;
    let mut open: BTreeSet<NaiveDate> = desired.iter().copied().collect();
    let mut plan = TemplateSyncPlan::default();

    let instances = existing
        .iter()
        .filter(|bill| bill.recurring_template_id.as_deref() == Some(template.id.as_str()));
    for bill in instances {
        let due = parse_bill_date(&bill.due_date);
        if has_payment(bill) {
            if let Some(due) = due {
                open.remove(&due);
            }
            plan.preserve.push(bill.clone());
            continue;
        }

        match due {
            Some(due) if open.remove(&due) => {
                if matches_template(bill, template) {
                    plan.preserve.push(bill.clone());
                } else {
                    let mut updated = bill.clone();
                    updated.name = template.name.clone();
                    updated.amount = template.amount;
                    updated.recurrence = template.recurrence;
                    plan.update.push(updated);
                }
            }
            _ => plan.remove.push(bill.clone()),
        }
    }

    for due in desired.into_iter().filter(|due| open.contains(due)) {
        let mut bill = Bill::new(
            &format!("bill_{}", Ulid::new()),
            &template.name,
            template.amount,
            template.recurrence,
            due,
        );
        bill.recurring_template_id = Some(template.id.clone());
        plan.add.push(bill);
    }

    Ok(plan)
}

fn has_payment(bill: &Bill) -> bool {
    bill.last_payment.is_some() || !bill.payment_history.is_empty()
}

fn matches_template(bill: &Bill, template: &RecurringTemplate) -> bool {
    bill.name == template.name
        && (bill.amount - template.amount).abs() < 0.005
        && bill.recurrence == template.recurrence
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::{RecurringTemplate, desired_due_dates, plan_template_sync};
    use crate::cycle::date::{Recurrence, format_iso_date};
    use crate::cycle::tracker::{MarkPaidOptions, mark_paid};
    use crate::model::Bill;

    fn date(value: &str) -> NaiveDate {
        let parsed = NaiveDate::parse_from_str(value, "%Y-%m-%d");
        assert!(parsed.is_ok());
        parsed.unwrap_or(NaiveDate::MIN)
    }

    fn template(amount: f64) -> RecurringTemplate {
        RecurringTemplate {
            id: "tpl_rent".to_string(),
            name: "Rent".to_string(),
            amount,
            recurrence: Recurrence::Monthly,
            start_date: "2025-01-31".to_string(),
            end_date: None,
        }
    }

    fn instance(id: &str, due: &str, amount: f64) -> Bill {
        let mut bill = Bill::new(id, "Rent", amount, Recurrence::Monthly, date(due));
        bill.recurring_template_id = Some("tpl_rent".to_string());
        bill
    }

    #[test]
    fn desired_dates_follow_month_end_anchor() {
        let dates = desired_due_dates(&template(1200.0), date("2025-04-30"));
        assert!(dates.is_ok());
        if let Ok(dates) = dates {
            assert_eq!(
                dates.iter().map(format_iso_date).collect::<Vec<String>>(),
                vec!["2025-01-31", "2025-02-28", "2025-03-31", "2025-04-30"]
            );
        }
    }

    #[test]
    fn end_date_caps_schedule() {
        let mut capped = template(1200.0);
        capped.end_date = Some("2025-02-28".to_string());
        let dates = desired_due_dates(&capped, date("2025-12-31"));
        assert!(dates.is_ok());
        if let Ok(dates) = dates {
            assert_eq!(dates.len(), 2);
        }
    }

    #[test]
    fn sync_classifies_add_update_remove_preserve() {
        let paid = mark_paid(
            &instance("jan", "2025-01-31", 1100.0),
            date("2025-01-30"),
            MarkPaidOptions::default(),
        );
        assert!(paid.is_ok());
        let Ok(paid) = paid else {
            return;
        };
        let existing = vec![
            paid,
            instance("feb", "2025-02-28", 1100.0),
            instance("stray", "2025-02-15", 1100.0),
            Bill::new("other", "Gym", 30.0, Recurrence::Monthly, date("2025-02-01")),
        ];

        let plan = plan_template_sync(&template(1200.0), &existing, date("2025-03-31"));
        assert!(plan.is_ok());
        if let Ok(plan) = plan {
            let ids = |bills: &[Bill]| bills.iter().map(|b| b.id.clone()).collect::<Vec<String>>();
            assert_eq!(ids(&plan.preserve), vec!["jan"]);
            assert_eq!(ids(&plan.update), vec!["feb"]);
            assert!((plan.update[0].amount - 1200.0).abs() < f64::EPSILON);
            assert_eq!(ids(&plan.remove), vec!["stray"]);
            assert_eq!(plan.add.len(), 1);
            assert_eq!(plan.add[0].due_date, "2025-03-31");
            assert_eq!(plan.add[0].recurring_template_id.as_deref(), Some("tpl_rent"));
            assert!(!plan.is_noop());
        }
    }

    #[test]
    fn in_sync_template_is_a_noop() {
        let existing = vec![
            instance("jan", "2025-01-31", 1200.0),
            instance("feb", "2025-02-28", 1200.0),
        ];
        let plan = plan_template_sync(&template(1200.0), &existing, date("2025-02-28"));
        assert!(plan.is_ok());
        if let Ok(plan) = plan {
            assert!(plan.is_noop());
            assert_eq!(plan.preserve.len(), 2);
        }
    }

    #[test]
    fn bad_start_date_is_an_error() {
        let mut broken = template(1200.0);
        broken.start_date = "soon".to_string();
        let plan = plan_template_sync(&broken, &[], date("2025-02-28"));
        assert!(plan.is_err());
    }
}
