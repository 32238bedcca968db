use chrono::{Duration, NaiveDate};
use tracing::{debug, info};

use crate::CoreResult;
use crate::config::EngineConfig;
use crate::cycle::tracker::{
    self, MarkPaidOptions, PaymentEligibility, StatusAssessment, TrackedBill,
};
use crate::events::{BillEvent, BillEventListener, EventBus};
use crate::matching::approval::{self, ReconcileOutcome};
use crate::matching::matcher::{BillMatcher, MatchResult};
use crate::model::{Bill, Transaction};
use crate::payday::{self, Payday};
use crate::query;

/// Days ahead used as the "due before" cutoff when no payday is known.
pub const FALLBACK_CUTOFF_DAYS: i64 = 14;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MatchMode {
    #[default]
    Strict,
    Reconciliation,
}

/// Configured entry point. Holds no bills; every call takes its inputs and
/// the reference date explicitly.
#[derive(Debug, Default)]
pub struct BillEngine {
    config: EngineConfig,
    events: EventBus,
}

impl BillEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            events: EventBus::new(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn subscribe(&mut self, listener: Box<dyn BillEventListener>) {
        self.events.subscribe(listener);
    }

    pub fn process(&self, bills: &[Bill], today: NaiveDate) -> Vec<Bill> {
        tracker::process_with_policy(bills, today, self.config.cycle_policy)
    }

    pub fn status_of(&self, bill: &Bill, today: NaiveDate) -> StatusAssessment {
        tracker::determine_status(bill, today, self.config.due_soon_days)
    }

    pub fn sorted(&self, bills: &[Bill], today: NaiveDate) -> Vec<TrackedBill> {
        tracker::sort_by_priority(bills, today, self.config.due_soon_days)
    }

    pub fn can_pay(&self, bill: &Bill) -> PaymentEligibility {
        tracker::can_pay(bill)
    }

    pub fn mark_paid(
        &self,
        bill: &Bill,
        paid_date: NaiveDate,
        options: MarkPaidOptions,
    ) -> CoreResult<Bill> {
        let paid = tracker::mark_paid(bill, paid_date, options)?;
        if let Some(payment) = paid.last_payment.as_ref() {
            info!(bill_id = %paid.id, due_date = %payment.due_date, "marked bill paid");
            self.events.publish(&BillEvent::BillPaid {
                bill_id: paid.id.clone(),
                due_date: payment.due_date.clone(),
                source: payment.source,
                transaction_id: payment.transaction_id.clone(),
            });
        }
        Ok(paid)
    }

    pub fn skip_cycle(&self, bill: &Bill) -> CoreResult<Bill> {
        let skipped = tracker::skip_cycle(bill)?;
        if let Some(due_date) = skipped.last_due_date.as_ref() {
            info!(bill_id = %skipped.id, due_date = %due_date, "skipped bill cycle");
            self.events.publish(&BillEvent::CycleSkipped {
                bill_id: skipped.id.clone(),
                due_date: due_date.clone(),
            });
        }
        Ok(skipped)
    }

    pub fn matcher(&self, mode: MatchMode) -> BillMatcher {
        match mode {
            MatchMode::Strict => BillMatcher::new(self.config.strict_matching),
            MatchMode::Reconciliation => BillMatcher::new(self.config.reconciliation_matching),
        }
    }

    pub fn match_strict(&self, transaction: &Transaction, bill: &Bill) -> Option<MatchResult> {
        self.matcher(MatchMode::Strict)
            .match_transaction(transaction, bill)
    }

    pub fn match_all(
        &self,
        transactions: &[Transaction],
        bills: &[Bill],
        mode: MatchMode,
    ) -> Vec<MatchResult> {
        self.matcher(mode).match_all(transactions, bills)
    }

    /// Processes `bills` for `today`, then auto-approves matches from the
    /// reconciliation policy.
    pub fn reconcile(
        &self,
        bills: &[Bill],
        transactions: &[Transaction],
        today: NaiveDate,
    ) -> ReconcileOutcome {
        let processed = self.process(bills, today);
        let outcome = approval::reconcile(
            &self.matcher(MatchMode::Reconciliation),
            &processed,
            transactions,
            self.config.approval_policy(),
            &self.events,
        );
        info!(
            approved = outcome.approved.len(),
            rejected = outcome.rejected.len(),
            generated = outcome.generated.len(),
            "reconciliation finished"
        );
        outcome
    }

    pub fn next_payday(&self, today: NaiveDate) -> CoreResult<Payday> {
        payday::next_payday(&self.config.pay_schedules, today)
    }

    /// Next payday when one is configured, else `today` plus the fallback
    /// window.
    pub fn due_cutoff(&self, today: NaiveDate) -> (NaiveDate, Option<Payday>) {
        match self.next_payday(today) {
            Ok(payday) => (payday.date, Some(payday)),
            Err(error) => {
                debug!(code = %error.code, "no payday for cutoff; using fallback window");
                (today + Duration::days(FALLBACK_CUTOFF_DAYS), None)
            }
        }
    }

    pub fn owed_before(&self, bills: &[Bill], cutoff: NaiveDate, today: NaiveDate) -> Vec<TrackedBill> {
        query::owed_before(bills, cutoff, today, self.config.due_soon_days)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::{BillEngine, MatchMode};
    use crate::config::EngineConfig;
    use crate::cycle::date::Recurrence;
    use crate::cycle::tracker::{CyclePolicy, MarkPaidOptions};
    use crate::events::{BillEvent, RecordingListener};
    use crate::model::{Bill, BillStatus, IntervalSchedule, PaySchedules, Transaction};

    fn date(value: &str) -> NaiveDate {
        let parsed = NaiveDate::parse_from_str(value, "%Y-%m-%d");
        assert!(parsed.is_ok());
        parsed.unwrap_or(NaiveDate::MIN)
    }

    fn txn(id: &str, name: &str, amount: f64, day: &str) -> Transaction {
        Transaction {
            id: id.to_string(),
            name: name.to_string(),
            merchant_name: None,
            amount,
            date: day.to_string(),
            pending: false,
        }
    }

    #[test]
    fn engine_publishes_to_subscribed_listeners() {
        let recorder = RecordingListener::new();
        let mut engine = BillEngine::default();
        engine.subscribe(Box::new(recorder.clone()));

        let bill = Bill::new("b1", "Gym", 30.0, Recurrence::Monthly, date("2025-03-01"));
        let paid = engine.mark_paid(&bill, date("2025-03-01"), MarkPaidOptions::default());
        assert!(paid.is_ok());
        let skipped = engine.skip_cycle(&bill);
        assert!(skipped.is_ok());

        let events = recorder.snapshot();
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], BillEvent::BillPaid { .. }));
        assert!(matches!(events[1], BillEvent::CycleSkipped { .. }));
    }

    #[test]
    fn configured_cycle_policy_drives_process() {
        let bill = Bill::new("b1", "Phone", 60.0, Recurrence::Monthly, date("2025-01-05"));
        let held = BillEngine::default().process(&[bill.clone()], date("2025-03-20"));
        assert_eq!(held[0].next_due_date.as_deref(), Some("2025-01-05"));

        let rolling = BillEngine::new(EngineConfig {
            cycle_policy: CyclePolicy::RollForward,
            ..EngineConfig::default()
        });
        let rolled = rolling.process(&[bill], date("2025-03-20"));
        assert_eq!(rolled[0].next_due_date.as_deref(), Some("2025-04-05"));
    }

    #[test]
    fn due_soon_window_comes_from_config() {
        let engine = BillEngine::new(EngineConfig {
            due_soon_days: 3,
            ..EngineConfig::default()
        });
        let bill = Bill::new("b1", "Water", 40.0, Recurrence::Monthly, date("2025-06-06"));
        assert_eq!(engine.status_of(&bill, date("2025-06-01")).status, BillStatus::Upcoming);
        assert_eq!(engine.status_of(&bill, date("2025-06-03")).status, BillStatus::DueSoon);
    }

    #[test]
    fn loose_mode_uses_reconciliation_tolerances() {
        let engine = BillEngine::default();
        let bills = vec![Bill::new("b1", "City Power", 80.0, Recurrence::Monthly, date("2025-01-10"))];
        let rows = vec![txn("t1", "Grocery Mart", -81.75, "2025-01-19")];
        assert!(engine.match_all(&rows, &bills, MatchMode::Strict).is_empty());
        assert_eq!(engine.match_all(&rows, &bills, MatchMode::Reconciliation).len(), 1);
        assert!(engine.match_strict(&rows[0], &bills[0]).is_none());
    }

    #[test]
    fn reconcile_processes_before_matching() {
        let engine = BillEngine::default();
        let mut bill = Bill::new("b1", "Internet", 60.0, Recurrence::Monthly, date("2025-01-10"));
        bill.status = Some(BillStatus::Paid);
        bill.is_paid = Some(true);
        let outcome = engine.reconcile(
            &[bill],
            &[txn("t1", "INTERNET CO", -60.0, "2025-01-10")],
            date("2025-01-09"),
        );
        assert_eq!(outcome.approved.len(), 1);
        assert_eq!(outcome.bills[0].next_due_date.as_deref(), Some("2025-02-10"));
    }

    #[test]
    fn due_cutoff_prefers_payday_then_falls_back() {
        let today = date("2025-12-10");
        let (cutoff, payday) = BillEngine::default().due_cutoff(today);
        assert_eq!(cutoff, date("2025-12-24"));
        assert!(payday.is_none());

        let engine = BillEngine::new(EngineConfig {
            pay_schedules: PaySchedules {
                interval: Some(IntervalSchedule {
                    last_paid_date: "2025-12-04".to_string(),
                    amount: 1000.0,
                    interval_days: 14,
                }),
                monthly: None,
            },
            ..EngineConfig::default()
        });
        let (cutoff, payday) = engine.due_cutoff(today);
        assert_eq!(cutoff, date("2025-12-18"));
        assert!(payday.is_some());
    }
}
