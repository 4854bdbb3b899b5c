use std::collections::BTreeMap;

use serde_json::Value;

use crate::contract::NotificationBody;

/// Derives one string attribute per top-level field of `message`.
///
/// Lists are joined with `,` first; every value is then JSON-encoded, so a
/// string field `Y` becomes the attribute value `"Y"` including quotes.
pub fn message_attributes(message: &NotificationBody) -> BTreeMap<String, String> {
    message
        .iter()
        .map(|(key, value)| (key.clone(), attribute_value(value)))
        .collect()
}

fn attribute_value(value: &Value) -> String {
    match value {
        Value::Array(items) => {
            let joined = items
                .iter()
                .map(|item| match item {
                    Value::String(text) => text.clone(),
                    other => other.to_string(),
                })
                .collect::<Vec<_>>()
                .join(",");
            Value::String(joined).to_string()
        }
        other => other.to_string(),
    }
}
