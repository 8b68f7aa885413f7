//! Masks secrets in a config snapshot before it is printed.

use serde_json::Value;

const SENSITIVE_KEYS: &[&str] = &["apiKey", "api_key", "token", "secret", "password"];

/// Replace every sensitive field with its first four characters plus `***`.
pub fn redact(value: &Value) -> Value {
    redact_recursive(value, "")
}

fn is_sensitive_key(key: &str) -> bool {
    SENSITIVE_KEYS.iter().any(|k| k.eq_ignore_ascii_case(key))
}

fn mask(s: &str) -> String {
    if s.chars().count() > 8 {
        format!("{}***", s.chars().take(4).collect::<String>())
    } else {
        "***".to_string()
    }
}

fn redact_recursive(value: &Value, key: &str) -> Value {
    match value {
        Value::String(s) if is_sensitive_key(key) && !s.is_empty() => Value::String(mask(s)),
        Value::Array(items) => Value::Array(items.iter().map(|v| redact_recursive(v, key)).collect()),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), redact_recursive(v, k)))
                .collect(),
        ),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn masks_api_key() {
        let redacted = redact(&json!({ "model": { "apiKey": "sk-or-v1-abcdef123456" } }));
        let key = redacted["model"]["apiKey"].as_str().unwrap();
        assert_eq!(key, "sk-o***");
    }

    #[test]
    fn short_secrets_are_fully_masked() {
        let redacted = redact(&json!({ "token": "abc" }));
        assert_eq!(redacted["token"], "***");
    }

    #[test]
    fn leaves_other_fields_alone() {
        let value = json!({ "firm": { "name": "Harbor & Vale" }, "logging": { "level": "debug" } });
        assert_eq!(redact(&value), value);
    }
}
