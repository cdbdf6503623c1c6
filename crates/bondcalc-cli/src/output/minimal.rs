use serde_json::Value;

/// Print just the key answer from the output.
///
/// A portfolio report prints one `YYYY/MM: amount` line per month. Otherwise
/// look for well-known result fields in order of priority, then fall back to
/// the first field in the result object.
pub fn print_minimal(value: &Value) {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    if let Some(Value::Array(months)) = result_obj.get("months") {
        for m in months {
            if let (Some(month), Some(total)) = (m.get("month"), m.get("total")) {
                println!("{}: {}", format_minimal(month), format_minimal(total));
            }
        }
        return;
    }

    // Priority list of key output fields
    let priority_keys = ["ytm_pct", "ytm", "coupon_rate_pct", "current_yield_pct", "coupon_count"];

    if let Value::Object(map) = result_obj {
        for key in &priority_keys {
            if let Some(val) = map.get(*key) {
                if !val.is_null() {
                    println!("{}", format_minimal(val));
                    return;
                }
            }
        }

        if let Some((key, val)) = map.iter().next() {
            println!("{}: {}", key, format_minimal(val));
            return;
        }
    }

    println!("{}", format_minimal(result_obj));
}

fn format_minimal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
