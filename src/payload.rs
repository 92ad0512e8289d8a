use serde_json::{Map, Number, Value};

use crate::endpoint::Operation;
use crate::error::ControlError;

#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Text that already is valid JSON, sent byte for byte.
    Raw(String),
    Json(Value),
}

impl Payload {
    pub fn body(&self) -> String {
        match self {
            Payload::Raw(text) => text.clone(),
            Payload::Json(value) => value.to_string(),
        }
    }
}

/// Turns `data` into a body for `operation` of endpoint `name`.
///
/// JSON objects and data for schema-less operations pass through unchanged.
/// A scalar given to an object schema with a single required property is
/// wrapped as `{property: value}`, converting it to a number when the
/// property is numeric.
pub fn shape(
    name: &str,
    data: &str,
    operation: Option<&Operation>,
) -> Result<Payload, ControlError> {
    let parsed = serde_json::from_str::<Value>(data).ok();

    if matches!(parsed, Some(Value::Object(_))) {
        return Ok(Payload::Raw(data.to_string()));
    }

    let passthrough = || match &parsed {
        Some(_) => Payload::Raw(data.to_string()),
        None => Payload::Json(Value::String(data.to_string())),
    };

    let Some(operation) = operation else {
        return Ok(passthrough());
    };
    let Some(schema) = operation.schema.as_ref() else {
        return Ok(passthrough());
    };
    if schema.get("type").and_then(Value::as_str) != Some("object") {
        return Ok(passthrough());
    }

    let required: Vec<&str> = schema
        .get("required")
        .and_then(Value::as_array)
        .map(|keys| keys.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();

    let [key] = required.as_slice() else {
        return Err(ControlError::Payload(format!(
            "{} {} requires an object",
            name, operation.method
        )));
    };

    let property_type = schema
        .pointer(&format!("/properties/{}/type", escape_pointer(key)))
        .and_then(Value::as_str);

    let fallback = parsed.unwrap_or_else(|| Value::String(data.to_string()));
    let value = match property_type {
        Some("number") | Some("integer") => to_number(data).map(Value::Number).unwrap_or(fallback),
        _ => fallback,
    };

    let mut object = Map::new();
    object.insert((*key).to_string(), value);
    Ok(Payload::Json(Value::Object(object)))
}

fn to_number(data: &str) -> Option<Number> {
    let value: f64 = data.trim().parse().ok()?;
    if !value.is_finite() {
        return None;
    }
    if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        Some(Number::from(value as i64))
    } else {
        Number::from_f64(value)
    }
}

fn escape_pointer(key: &str) -> String {
    key.replace('~', "~0").replace('/', "~1")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoint::Method;
    use serde_json::json;

    fn post(schema: Option<Value>) -> Operation {
        Operation {
            method: Method::Post,
            description: "Set the volume".to_string(),
            data: Some("volume".to_string()),
            schema,
        }
    }

    fn volume_schema() -> Value {
        json!({
            "type": "object",
            "properties": { "volume": { "type": "number" } },
            "required": ["volume"]
        })
    }

    #[test]
    fn schemaless_data_is_forwarded_unchanged() {
        assert_eq!(shape("setVolume", "50", Some(&post(None))).unwrap().body(), "50");
        assert_eq!(shape("setVolume", "1.50", None).unwrap().body(), "1.50");
    }

    #[test]
    fn plain_text_becomes_a_json_string() {
        assert_eq!(
            shape("search", "never gonna", None).unwrap().body(),
            "\"never gonna\""
        );
    }

    #[test]
    fn objects_pass_through_verbatim() {
        let data = r#"{ "volume": 10 }"#;
        let payload = shape("volume", data, Some(&post(Some(volume_schema())))).unwrap();
        assert_eq!(payload, Payload::Raw(data.to_string()));
    }

    #[test]
    fn scalar_is_wrapped_and_converted_to_number() {
        let op = post(Some(volume_schema()));
        assert_eq!(
            shape("volume", "50", Some(&op)).unwrap(),
            Payload::Json(json!({ "volume": 50 }))
        );
        assert_eq!(
            shape("volume", "12.5", Some(&op)).unwrap(),
            Payload::Json(json!({ "volume": 12.5 }))
        );
        assert_eq!(
            shape("volume", "loud", Some(&op)).unwrap(),
            Payload::Json(json!({ "volume": "loud" }))
        );
    }

    #[test]
    fn non_numeric_property_keeps_parsed_value() {
        let op = post(Some(json!({
            "type": "object",
            "properties": { "videoId": { "type": "string" } },
            "required": ["videoId"]
        })));
        assert_eq!(
            shape("queue", "dQw4w9WgXcQ", Some(&op)).unwrap(),
            Payload::Json(json!({ "videoId": "dQw4w9WgXcQ" }))
        );
        assert_eq!(
            shape("queue", "true", Some(&op)).unwrap(),
            Payload::Json(json!({ "videoId": true }))
        );
    }

    #[test]
    fn non_object_schema_passes_through() {
        let op = post(Some(json!({ "type": "number" })));
        assert_eq!(
            shape("seek-to", "7", Some(&op)).unwrap(),
            Payload::Raw("7".to_string())
        );
    }

    #[test]
    fn ambiguous_object_schema_is_rejected() {
        let op = post(Some(json!({
            "type": "object",
            "properties": { "a": {}, "b": {} },
            "required": ["a", "b"]
        })));
        let err = shape("volume", "1", Some(&op)).unwrap_err();
        assert_eq!(err.to_string(), "volume POST requires an object");
    }
}
