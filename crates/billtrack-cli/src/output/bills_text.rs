use std::io;

use serde_json::Value;

use super::format::{self, Column};

pub fn render_process(data: &Value) -> io::Result<String> {
    let rows = rows_of(data, "bills process")?;
    let today = str_field(data, "today");

    if rows.is_empty() {
        return Ok(format!("No bills to process as of {today}."));
    }

    let mut lines = vec![
        format!(
            "Processed {} as of {today}.",
            format::plural(rows.len(), "bill", "bills")
        ),
        String::new(),
    ];
    lines.extend(bill_table(rows));
    lines.push(String::new());
    lines.push("Run with --json to get the updated bill records for saving.".to_string());
    Ok(lines.join("\n"))
}

pub fn render_status(data: &Value) -> io::Result<String> {
    let rows = rows_of(data, "bills status")?;
    let today = str_field(data, "today");

    if rows.is_empty() {
        return Ok(format!("No bills tracked as of {today}."));
    }

    let counts = data.get("counts").cloned().unwrap_or(Value::Null);
    let count = |key: &str| counts.get(key).and_then(Value::as_u64).unwrap_or(0);

    let mut lines = vec![format!("Bill status as of {today}:"), String::new()];
    lines.extend(format::key_value_rows(
        &[
            ("Overdue:", count("overdue").to_string()),
            ("Due soon:", count("due_soon").to_string()),
            ("Upcoming:", count("upcoming").to_string()),
            ("Pending:", count("pending").to_string()),
            ("Skipped:", count("skipped").to_string()),
            ("Paid:", count("paid").to_string()),
        ],
        2,
    ));
    lines.push(String::new());
    lines.extend(bill_table(rows));
    Ok(lines.join("\n"))
}

pub fn render_due(data: &Value) -> io::Result<String> {
    let rows = rows_of(data, "bills due")?;
    let cutoff = str_field(data, "cutoff");
    let cutoff_source = str_field(data, "cutoff_source");
    let total = data
        .get("total_amount")
        .and_then(Value::as_f64)
        .unwrap_or(0.0);

    let cutoff_label = match (cutoff_source, data.get("payday")) {
        ("payday", Some(payday)) => format!(
            "{cutoff} (next payday, {} from the {})",
            format::format_amount(payday.get("amount").and_then(Value::as_f64).unwrap_or(0.0)),
            str_field(payday, "source_label")
        ),
        ("fallback", _) => format!("{cutoff} (no payday configured, two-week window)"),
        _ => cutoff.to_string(),
    };

    let mut lines = format::key_value_rows(
        &[
            ("Owed before:", cutoff_label),
            ("Total owed:", format::format_amount(total)),
        ],
        0,
    );
    lines.push(String::new());

    if rows.is_empty() {
        lines.push("Nothing is due before the cutoff.".to_string());
    } else {
        lines.extend(bill_table(rows));
    }
    Ok(lines.join("\n"))
}

pub fn render_pay(data: &Value) -> io::Result<String> {
    let bill = data
        .get("bill")
        .ok_or_else(|| io::Error::other("bills pay output requires bill"))?;
    let name = str_field(bill, "name");

    if data.get("applied").and_then(Value::as_bool) != Some(true) {
        let reason = str_field(data, "reason");
        return Ok([
            format!("No payment recorded for {name}."),
            String::new(),
            format!("  {reason}"),
        ]
        .join("\n"));
    }

    let payment = data.get("payment").cloned().unwrap_or(Value::Null);
    let mut lines = vec![format!("Recorded payment for {name}."), String::new()];
    lines.extend(format::key_value_rows(
        &[
            (
                "Amount:",
                format::format_amount(payment.get("amount").and_then(Value::as_f64).unwrap_or(0.0)),
            ),
            ("Paid on:", str_field(&payment, "paidDate").to_string()),
            ("Cycle due:", str_field(&payment, "dueDate").to_string()),
            ("Next due:", str_field(bill, "nextDueDate").to_string()),
        ],
        2,
    ));
    lines.push(String::new());
    lines.push("Run with --json to get the updated bill record for saving.".to_string());
    Ok(lines.join("\n"))
}

fn bill_table(rows: &[Value]) -> Vec<String> {
    let columns = [
        Column::left("Due"),
        Column::left("Bill"),
        Column::right("Amount"),
        Column::left("Recurrence"),
        Column::left("Status"),
    ];

    let table_rows = rows
        .iter()
        .map(|row| {
            vec![
                str_field(row, "due_date").to_string(),
                str_field(row, "name").to_string(),
                format::format_amount(row.get("amount").and_then(Value::as_f64).unwrap_or(0.0)),
                str_field(row, "recurrence").to_string(),
                status_label(row),
            ]
        })
        .collect::<Vec<Vec<String>>>();

    format::render_table_or_blocks(&columns, &table_rows, format::terminal_width(), "Bill")
}

fn status_label(row: &Value) -> String {
    let status = str_field(row, "status");
    match status {
        "overdue" => match row.get("days_overdue").and_then(Value::as_i64) {
            Some(days) => format!("overdue {}", format::plural(days_count(days), "day", "days")),
            None => status.to_string(),
        },
        "due-soon" => match row.get("days_until_due").and_then(Value::as_i64) {
            Some(0) => "due today".to_string(),
            Some(days) => format!("due in {}", format::plural(days_count(days), "day", "days")),
            None => "due soon".to_string(),
        },
        _ => status.to_string(),
    }
}

fn days_count(days: i64) -> usize {
    usize::try_from(days).unwrap_or(0)
}

fn rows_of<'a>(data: &'a Value, command: &str) -> io::Result<&'a Vec<Value>> {
    data.get("rows")
        .and_then(Value::as_array)
        .ok_or_else(|| io::Error::other(format!("{command} output requires rows")))
}

fn str_field<'a>(value: &'a Value, key: &str) -> &'a str {
    value.get(key).and_then(Value::as_str).unwrap_or("unknown")
}
