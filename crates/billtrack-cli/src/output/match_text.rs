use std::io;

use serde_json::Value;

use super::format::{self, Column};

pub fn render_match(data: &Value) -> io::Result<String> {
    let rows = data
        .get("rows")
        .and_then(Value::as_array)
        .ok_or_else(|| io::Error::other("match output requires rows"))?;
    let mode = data.get("mode").and_then(Value::as_str).unwrap_or("strict");
    let unmatched = data
        .get("unmatched_transactions")
        .and_then(Value::as_u64)
        .unwrap_or(0);

    if rows.is_empty() {
        return Ok(format!(
            "No transactions matched a bill ({mode} tolerances, {} unmatched).",
            unmatched
        ));
    }

    let mut lines = vec![
        format!(
            "Matched {} ({mode} tolerances):",
            format::plural(rows.len(), "transaction", "transactions")
        ),
        String::new(),
    ];
    lines.extend(match_table(rows, None));

    if unmatched > 0 {
        lines.push(String::new());
        lines.push(format!(
            "{unmatched} settled outgoing transaction(s) did not match any bill."
        ));
    }
    if mode == "strict" {
        lines.push(String::new());
        lines.push("Run with --loose to use the wider reconciliation tolerances.".to_string());
    }
    Ok(lines.join("\n"))
}

pub fn render_reconcile(data: &Value) -> io::Result<String> {
    let approved = data
        .get("approved")
        .and_then(Value::as_array)
        .ok_or_else(|| io::Error::other("reconcile output requires approved rows"))?;
    let rejected = data
        .get("rejected")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();
    let generated = data
        .get("generated")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();

    if approved.is_empty() && rejected.is_empty() {
        return Ok("No transactions matched a bill. Nothing was reconciled.".to_string());
    }

    let mut lines = vec![format!(
        "Reconciled {} as paid.",
        format::plural(approved.len(), "bill", "bills")
    )];

    if !approved.is_empty() {
        lines.push(String::new());
        lines.push("Approved:".to_string());
        lines.extend(match_table(approved, None));
    }

    if !rejected.is_empty() {
        lines.push(String::new());
        lines.push("Needs review:".to_string());
        lines.extend(match_table(&rejected, Some("reason")));
    }

    if !generated.is_empty() {
        lines.push(String::new());
        lines.push("Next occurrences created:".to_string());
        lines.extend(generated.iter().map(|bill| {
            format!(
                "  {}  {}  {}",
                bill.get("dueDate").and_then(Value::as_str).unwrap_or("unknown"),
                bill.get("name").and_then(Value::as_str).unwrap_or("unknown"),
                bill.get("id").and_then(Value::as_str).unwrap_or("unknown"),
            )
        }));
    }

    lines.push(String::new());
    lines.push("Run with --json to get the updated bill records for saving.".to_string());
    Ok(lines.join("\n"))
}

pub fn render_payday(data: &Value) -> io::Result<String> {
    let date = data
        .get("date")
        .and_then(Value::as_str)
        .ok_or_else(|| io::Error::other("payday output requires date"))?;
    let days_until = data.get("days_until").and_then(Value::as_i64).unwrap_or(0);
    let when = match days_until {
        0 => "today".to_string(),
        1 => "tomorrow".to_string(),
        days => format!("in {days} days"),
    };

    let mut lines = vec![format!("Next payday is {date} ({when})."), String::new()];
    lines.extend(format::key_value_rows(
        &[
            (
                "Amount:",
                format::format_amount(data.get("amount").and_then(Value::as_f64).unwrap_or(0.0)),
            ),
            (
                "Schedule:",
                format!(
                    "{} ({})",
                    data.get("source_label")
                        .and_then(Value::as_str)
                        .unwrap_or("unknown"),
                    data.get("source").and_then(Value::as_str).unwrap_or("?")
                ),
            ),
        ],
        2,
    ));
    Ok(lines.join("\n"))
}

fn match_table(rows: &[Value], extra: Option<&str>) -> Vec<String> {
    let mut columns = vec![
        Column::left("Date"),
        Column::left("Transaction"),
        Column::right("Amount"),
        Column::left("Bill"),
        Column::left("Due"),
        Column::right("Confidence"),
    ];
    if extra.is_some() {
        columns.push(Column::left("Reason"));
    }

    let table_rows = rows
        .iter()
        .map(|row| {
            let text = |key: &str| {
                row.get(key)
                    .and_then(Value::as_str)
                    .unwrap_or("unknown")
                    .to_string()
            };
            let mut cells = vec![
                text("transaction_date"),
                text("transaction_name"),
                format::format_amount(
                    row.get("transaction_amount")
                        .and_then(Value::as_f64)
                        .unwrap_or(0.0),
                ),
                text("bill_name"),
                text("bill_due_date"),
                format::format_confidence(
                    row.get("confidence").and_then(Value::as_f64).unwrap_or(0.0),
                ),
            ];
            if let Some(key) = extra {
                cells.push(text(key));
            }
            cells
        })
        .collect::<Vec<Vec<String>>>();

    format::render_table_or_blocks(&columns, &table_rows, format::terminal_width(), "Match")
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use super::{render_match, render_payday, render_reconcile};

    fn match_row(transaction_id: &str, bill_name: &str, confidence: f64) -> Value {
        json!({
            "transaction_id": transaction_id,
            "transaction_name": "NETFLIX.COM",
            "transaction_amount": -15.49,
            "transaction_date": "2024-11-01",
            "bill_id": "netflix",
            "bill_name": bill_name,
            "bill_amount": 15.49,
            "bill_due_date": "2024-11-01",
            "confidence": confidence,
            "name_match": true,
            "amount_match": true,
            "date_match": true,
            "date_offset_days": 0,
        })
    }

    #[test]
    fn match_lists_rows_and_suggests_loose_mode() {
        let data = json!({
            "policy_version": "match/v1",
            "mode": "strict",
            "today": "2024-10-30",
            "unmatched_transactions": 2,
            "rows": [match_row("t1", "Netflix", 1.0)],
        });

        let rendered = render_match(&data);
        assert!(rendered.is_ok());
        if let Ok(text) = rendered {
            assert!(text.starts_with("Matched 1 transaction (strict tolerances):"));
            assert!(text.contains("-$15.49"));
            assert!(text.contains("100%"));
            assert!(text.contains("2 settled outgoing transaction(s) did not match any bill."));
            assert!(text.ends_with("Run with --loose to use the wider reconciliation tolerances."));
        }
    }

    #[test]
    fn reconcile_groups_approved_rejected_and_generated() {
        let mut rejected = match_row("t2", "Gym", 2.0 / 3.0);
        rejected["reason"] = json!("confidence below the auto-approve minimum");
        let data = json!({
            "policy_version": "match/v1",
            "today": "2024-10-30",
            "approved": [match_row("t1", "Netflix", 1.0)],
            "rejected": [rejected],
            "bills": [],
            "generated": [{"id": "bill_01", "name": "Netflix", "dueDate": "2024-12-01"}],
        });

        let rendered = render_reconcile(&data);
        assert!(rendered.is_ok());
        if let Ok(text) = rendered {
            assert!(text.starts_with("Reconciled 1 bill as paid."));
            assert!(text.contains("Approved:"));
            assert!(text.contains("Needs review:"));
            assert!(text.contains("67%"));
            assert!(text.contains("Next occurrences created:"));
            assert!(text.contains("  2024-12-01  Netflix  bill_01"));
        }
    }

    #[test]
    fn reconcile_with_nothing_matched() {
        let data = json!({"approved": [], "rejected": [], "bills": [], "generated": []});
        let rendered = render_reconcile(&data);
        assert!(rendered.is_ok());
        if let Ok(text) = rendered {
            assert_eq!(text, "No transactions matched a bill. Nothing was reconciled.");
        }
    }

    #[test]
    fn payday_shows_source_and_countdown() {
        let data = json!({
            "date": "2025-12-18",
            "days_until": 8,
            "source": "A",
            "source_label": "interval schedule",
            "amount": 1000.0,
        });

        let rendered = render_payday(&data);
        assert!(rendered.is_ok());
        if let Ok(text) = rendered {
            assert!(text.starts_with("Next payday is 2025-12-18 (in 8 days)."));
            assert!(text.contains("  Amount:    $1000.00"));
            assert!(text.contains("  Schedule:  interval schedule (A)"));
        }
    }
}
