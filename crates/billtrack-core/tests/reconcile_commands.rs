mod support;

use billtrack_core::commands::matches::{self, MatchRunOptions};
use billtrack_core::commands::payday::{self, PaydayRunOptions};
use billtrack_core::commands::reconcile::{self, ReconcileRunOptions};
use serde_json::{Value, json};
use support::billtrack_testkit::{
    Workspace, bill, date, payload, row_ids, rows, transaction, workspace,
};

fn seed(ws: &Workspace) -> (std::path::PathBuf, std::path::PathBuf) {
    let bills = ws.fixture(
        "bills.json",
        &[
            bill("netflix", "Netflix", 15.49, "monthly", "2024-11-01"),
            bill("power", "City Power", 80.0, "monthly", "2024-11-10"),
        ],
    );
    let transactions = ws.fixture(
        "transactions.json",
        &[
            transaction("t_netflix", "NETFLIX.COM", -15.49, "2024-11-01"),
            transaction("t_random", "Random Merchant", -250.0, "2024-12-01"),
            transaction("t_power", "CITY POWER", -81.50, "2024-11-19"),
            json!({
                "id": "t_refund",
                "name": "NETFLIX.COM",
                "amount": 15.49,
                "date": "2024-11-02",
            }),
        ],
    );
    (bills, transactions)
}

#[test]
fn strict_and_loose_matching_differ_on_tolerances() {
    let temp = workspace("billtrack-match");
    assert!(temp.is_ok());
    if let Ok(ws) = temp {
        let (bills_path, transactions_path) = seed(&ws);

        let strict = payload(matches::run_with_options(MatchRunOptions {
            bills_path: bills_path.clone(),
            transactions_path: transactions_path.clone(),
            today: date("2024-10-30"),
            loose: false,
            home_override: ws.home(),
        }));
        assert_eq!(strict["data"]["mode"], "strict");
        assert_eq!(strict["data"]["policy_version"], "match/v1");
        let strict_rows = rows(&strict);
        assert_eq!(row_ids(&strict_rows, "transaction_id"), vec!["t_netflix"]);
        assert_eq!(strict_rows[0]["confidence"], 1.0);
        assert_eq!(strict["data"]["unmatched_transactions"], 2);

        let loose = payload(matches::run_with_options(MatchRunOptions {
            bills_path,
            transactions_path,
            today: date("2024-10-30"),
            loose: true,
            home_override: ws.home(),
        }));
        let loose_rows = rows(&loose);
        assert_eq!(row_ids(&loose_rows, "bill_id"), vec!["netflix", "power"]);
        assert_eq!(loose_rows[1]["date_offset_days"], 9);
        assert_eq!(loose["data"]["unmatched_transactions"], 1);
    }
}

#[test]
fn reconcile_auto_approves_and_generates_next_occurrences() {
    let temp = workspace("billtrack-reconcile");
    assert!(temp.is_ok());
    if let Ok(ws) = temp {
        let (bills_path, transactions_path) = seed(&ws);

        let value = payload(reconcile::run_with_options(ReconcileRunOptions {
            bills_path,
            transactions_path,
            today: date("2024-10-30"),
            home_override: ws.home(),
        }));
        assert_eq!(value["command"], "reconcile");

        let approved = value["data"]["approved"].as_array().cloned().unwrap_or_default();
        assert_eq!(row_ids(&approved, "bill_id"), vec!["netflix", "power"]);
        assert_eq!(
            value["data"]["rejected"].as_array().map(Vec::len),
            Some(0)
        );

        let bills = value["data"]["bills"].as_array().cloned().unwrap_or_default();
        assert_eq!(bills[0]["nextDueDate"], "2024-12-01");
        assert_eq!(bills[0]["lastPayment"]["source"], "external-feed");
        assert_eq!(bills[0]["lastPayment"]["transactionId"], "t_netflix");
        assert_eq!(bills[1]["nextDueDate"], "2024-12-10");
        assert_eq!(bills[1]["lastPayment"]["amount"], 81.5);

        let generated = value["data"]["generated"].as_array().cloned().unwrap_or_default();
        assert_eq!(generated.len(), 2);
        assert_eq!(generated[0]["dueDate"], "2024-12-01");
        assert!(
            generated[0]["id"]
                .as_str()
                .is_some_and(|id| id.starts_with("bill_"))
        );
    }
}

#[test]
fn reconcile_rejects_matches_below_configured_floor() {
    let temp = workspace("billtrack-reconcile-floor");
    assert!(temp.is_ok());
    if let Ok(ws) = temp {
        ws.write_config(&json!({"autoApproveMinConfidence": 1.0}));
        let bills_path = ws.fixture(
            "bills.json",
            &[bill("netflix", "Netflix", 15.49, "monthly", "2024-11-01")],
        );
        let transactions_path = ws.fixture(
            "transactions.json",
            &[transaction("t1", "NETFLIX", -19.99, "2024-11-02")],
        );

        let value = payload(reconcile::run_with_options(ReconcileRunOptions {
            bills_path,
            transactions_path,
            today: date("2024-10-30"),
            home_override: ws.home(),
        }));
        let rejected = value["data"]["rejected"].as_array().cloned().unwrap_or_default();
        assert_eq!(rejected.len(), 1);
        assert_eq!(rejected[0]["transaction_id"], "t1");
        assert!(
            rejected[0]["reason"]
                .as_str()
                .is_some_and(|reason| reason.contains("below the auto-approve minimum"))
        );
        assert_eq!(value["data"]["approved"], Value::Array(Vec::new()));
        assert_eq!(value["data"]["bills"][0]["nextDueDate"], "2024-11-01");
        assert!(value["data"]["bills"][0].get("lastPayment").is_none());
    }
}

#[test]
fn payday_ignores_zero_amount_schedule() {
    let temp = workspace("billtrack-payday");
    assert!(temp.is_ok());
    if let Ok(ws) = temp {
        ws.write_config(&json!({
            "paySchedules": {
                "interval": {"lastPaidDate": "2025-12-04", "amount": 1000, "intervalDays": 14},
                "monthly": {"amount": 0, "daysOfMonth": [15, 30]}
            }
        }));

        let value = payload(payday::run_with_options(PaydayRunOptions {
            today: date("2025-12-10"),
            home_override: ws.home(),
        }));
        assert_eq!(value["data"]["source"], "A");
        assert_eq!(value["data"]["amount"], 1000.0);
        assert_eq!(value["data"]["date"], "2025-12-18");
    }
}

#[test]
fn payday_without_schedules_is_a_domain_error() {
    let temp = workspace("billtrack-payday-missing");
    assert!(temp.is_ok());
    if let Ok(ws) = temp {
        let result = payday::run_with_options(PaydayRunOptions {
            today: date("2025-12-10"),
            home_override: ws.home(),
        });
        assert!(result.is_err());
        if let Err(error) = result {
            assert_eq!(error.code, "no_payday_information");
            assert_eq!(error.message, "No payday information available.");
        }
    }
}
