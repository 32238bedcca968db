use billtrack_core::CoreError;
use serde_json::Value;

pub fn render_error(error: &CoreError) -> String {
    let mut lines = vec![
        "Something went wrong, but it's easy to fix.".to_string(),
        String::new(),
        format!("  Error:    {}", error.code),
        format!("  Details:  {}", error.message),
    ];

    if let Some(data) = &error.data {
        if let Some(bill_id) = data.get("bill_id").and_then(Value::as_str) {
            lines.push(format!("  Bill:     {bill_id}"));
        }
        if let Some(stored) = data.get("stored_value").and_then(Value::as_str) {
            lines.push(format!("  Stored:   {stored}"));
        }
    }

    lines.push(String::new());
    lines.push("What to do next:".to_string());

    if error.recovery_steps.is_empty() {
        lines.push("  1. Retry the command.".to_string());
    } else {
        for (index, step) in error.recovery_steps.iter().enumerate() {
            lines.push(format!("  {}. {step}", index + 1));
        }
    }

    lines.join("\n")
}
