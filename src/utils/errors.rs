use serde_json::{Map, Value};

use crate::models::{ErrorDetails, FieldMessage};

/// Keys checked in order for a human readable error message
const MESSAGE_KEYS: [&str; 4] = ["error", "detail", "errors", "message"];

/// Extract a displayable error from a 4xx response body
///
/// Tries `error`, `detail`, `errors` and `message` in that order. Any of
/// them may hold a plain string or a field-keyed map. A body that is itself a
/// field-keyed map, e.g. `{"username": ["A user with that username already exists."]}`,
/// becomes an itemized list. Anything else yields `fallback`.
pub fn extract_error_details(body: &Value, fallback: &str) -> ErrorDetails {
    let Some(object) = body.as_object() else {
        return ErrorDetails::message(fallback);
    };

    for key in MESSAGE_KEYS {
        match object.get(key) {
            Some(Value::String(text)) if !text.trim().is_empty() => {
                return ErrorDetails::message(text.clone());
            }
            Some(Value::Object(fields)) => {
                if let Some(items) = field_messages(fields) {
                    return ErrorDetails::Fields(items);
                }
            }
            Some(Value::Array(items)) => {
                let texts: Vec<String> = items.iter().filter_map(message_text).collect();
                if !texts.is_empty() {
                    return ErrorDetails::message(texts.join(" "));
                }
            }
            _ => {}
        }
    }

    field_messages(object)
        .map(ErrorDetails::Fields)
        .unwrap_or_else(|| ErrorDetails::message(fallback))
}

/// Flatten `{field: message | [message, ...]}` into items, or `None` if the
/// map does not have that shape
fn field_messages(fields: &Map<String, Value>) -> Option<Vec<FieldMessage>> {
    if fields.is_empty() {
        return None;
    }

    let mut items = Vec::new();
    for (field, value) in fields {
        match value {
            Value::String(text) if text.trim().is_empty() => {}
            Value::String(text) => items.push(FieldMessage {
                field: field.clone(),
                message: text.clone(),
            }),
            Value::Array(messages) if !messages.is_empty() => {
                for message in messages {
                    items.push(FieldMessage {
                        field: field.clone(),
                        message: message_text(message)?,
                    });
                }
            }
            _ => return None,
        }
    }

    if items.is_empty() {
        None
    } else {
        Some(items)
    }
}

fn message_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}
