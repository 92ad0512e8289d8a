use serde_json::Value;

use crate::endpoint::Endpoint;

/// One endpoint name per line.
pub fn render_names(endpoints: &[Endpoint]) -> String {
    endpoints
        .iter()
        .map(|ep| ep.name.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Names with the description of each method and the data it expects.
pub fn render_listing(endpoints: &[Endpoint]) -> String {
    let mut out = String::from("Available API endpoints:");

    for endpoint in endpoints {
        out.push_str("\n  ");
        out.push_str(&endpoint.name);

        let single = endpoint.operations.len() == 1;
        for op in &endpoint.operations {
            if single {
                out.push_str(&format!(": {}", op.description));
            } else {
                out.push_str(&format!("\n    {}: {}", op.method, op.description));
            }

            if let Some(data) = op.data.as_deref().filter(|_| op.method.takes_data()) {
                out.push_str(&format!(" (data: {})", data));
            }
        }
    }

    out
}

/// Text to print for a response body, `None` when the body is blank or
/// holds an empty/zero/false JSON value.
///
/// JSON objects are pretty-printed; anything else is echoed trimmed.
pub fn render_response(body: &str) -> Option<String> {
    let text = body.trim();
    if text.is_empty() {
        return None;
    }
    match serde_json::from_str::<Value>(text) {
        Ok(value) if is_blank(&value) => None,
        Ok(value @ Value::Object(_)) => {
            Some(serde_json::to_string_pretty(&value).unwrap_or_else(|_| text.to_string()))
        }
        _ => Some(text.to_string()),
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}
