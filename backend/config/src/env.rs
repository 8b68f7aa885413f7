//! Environment handling for config values.
//!
//! String values may reference `${VAR_NAME}` (uppercase names only), resolved
//! at load time; `$${VAR}` stays as a literal `${VAR}`. A few well-known
//! variables also override config fields directly.

use std::collections::HashMap;

use anyhow::Result;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde_json::Value;
use tracing::{debug, warn};

use crate::schema::{LexDeskConfig, ModelConfig, ServerConfig};

/// `${VAR}` with an optional leading `$` marking an escape.
static ENV_VAR_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\$?)\$\{([A-Z_][A-Z0-9_]*)\}").unwrap());

pub const PORT_VAR: &str = "LEXDESK_PORT";
pub const BIND_VAR: &str = "LEXDESK_BIND";
pub const API_KEY_VAR: &str = "OPENROUTER_API_KEY";
pub const MODEL_VAR: &str = "LEXDESK_MODEL";

#[derive(Debug, thiserror::Error)]
#[error("Missing env var \"{var_name}\" referenced at config path: {config_path}")]
pub struct MissingEnvVarError {
    pub var_name: String,
    pub config_path: String,
}

/// Substitute `${VAR}` references throughout a config value tree.
///
/// Fails on the first variable that is unset or empty.
pub fn resolve_env_vars(value: &Value) -> Result<Value> {
    resolve_env_vars_with(value, &std::env::vars().collect())
}

pub fn resolve_env_vars_with(value: &Value, env: &HashMap<String, String>) -> Result<Value> {
    Ok(substitute_value(value, env, "")?)
}

fn substitute_value(
    value: &Value,
    env: &HashMap<String, String>,
    path: &str,
) -> Result<Value, MissingEnvVarError> {
    match value {
        Value::String(s) => substitute_string(s, env, path).map(Value::String),
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(i, v)| substitute_value(v, env, &format!("{path}[{i}]")))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        Value::Object(map) => {
            let mut out = serde_json::Map::with_capacity(map.len());
            for (key, v) in map {
                let child = if path.is_empty() {
                    key.clone()
                } else {
                    format!("{path}.{key}")
                };
                out.insert(key.clone(), substitute_value(v, env, &child)?);
            }
            Ok(Value::Object(out))
        }
        other => Ok(other.clone()),
    }
}

fn substitute_string(
    s: &str,
    env: &HashMap<String, String>,
    path: &str,
) -> Result<String, MissingEnvVarError> {
    if !s.contains("${") {
        return Ok(s.to_string());
    }

    let mut missing = None;
    let replaced = ENV_VAR_PATTERN.replace_all(s, |caps: &Captures| {
        let name = &caps[2];
        if !caps[1].is_empty() {
            return format!("${{{name}}}");
        }
        match env.get(name) {
            Some(val) if !val.is_empty() => val.clone(),
            _ => {
                missing.get_or_insert_with(|| MissingEnvVarError {
                    var_name: name.to_string(),
                    config_path: path.to_string(),
                });
                String::new()
            }
        }
    });

    match missing {
        Some(err) => Err(err),
        None => Ok(replaced.into_owned()),
    }
}

/// Apply overrides from the process environment.
pub fn apply_env_overrides(config: LexDeskConfig) -> LexDeskConfig {
    apply_env_overrides_with(config, &std::env::vars().collect())
}

pub fn apply_env_overrides_with(
    mut config: LexDeskConfig,
    env: &HashMap<String, String>,
) -> LexDeskConfig {
    let get = |name: &str| env.get(name).filter(|v| !v.trim().is_empty());

    if let Some(raw) = get(PORT_VAR) {
        match raw.trim().parse::<u16>() {
            Ok(port) => {
                debug!(port, "Port overridden from {PORT_VAR}");
                config.server.get_or_insert_with(ServerConfig::default).port = Some(port);
            }
            Err(_) => warn!(value = %raw, "Ignoring {PORT_VAR}: not a port number"),
        }
    }
    if let Some(bind) = get(BIND_VAR) {
        config.server.get_or_insert_with(ServerConfig::default).bind = Some(bind.clone());
    }
    if let Some(key) = get(API_KEY_VAR) {
        config.model.get_or_insert_with(ModelConfig::default).api_key = Some(key.clone());
    }
    if let Some(model) = get(MODEL_VAR) {
        config.model.get_or_insert_with(ModelConfig::default).model = Some(model.clone());
    }
    config
}

/// Env var names referenced anywhere in a value tree.
pub fn collect_referenced_vars(value: &Value) -> Vec<String> {
    let mut vars = Vec::new();
    collect_vars(value, &mut vars);
    vars.sort();
    vars.dedup();
    vars
}

fn collect_vars(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::String(s) => out.extend(
            ENV_VAR_PATTERN
                .captures_iter(s)
                .filter(|caps| caps[1].is_empty())
                .map(|caps| caps[2].to_string()),
        ),
        Value::Array(items) => items.iter().for_each(|v| collect_vars(v, out)),
        Value::Object(map) => map.values().for_each(|v| collect_vars(v, out)),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn substitutes_nested_values() {
        let value = json!({ "model": { "apiKey": "${OPENROUTER_API_KEY}", "baseUrl": "https://${HOST}/v1" } });
        let resolved =
            resolve_env_vars_with(&value, &env(&[("OPENROUTER_API_KEY", "sk-1"), ("HOST", "proxy")]))
                .unwrap();
        assert_eq!(resolved["model"]["apiKey"], "sk-1");
        assert_eq!(resolved["model"]["baseUrl"], "https://proxy/v1");
    }

    #[test]
    fn missing_var_names_the_path() {
        let value = json!({ "model": { "apiKey": "${NOPE}" } });
        let err = resolve_env_vars_with(&value, &HashMap::new()).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("NOPE"));
        assert!(msg.contains("model.apiKey"));
    }

    #[test]
    fn escaped_reference_is_kept_literally() {
        let value = json!({ "firm": { "name": "$${FIRM}" } });
        let resolved = resolve_env_vars_with(&value, &HashMap::new()).unwrap();
        assert_eq!(resolved["firm"]["name"], "${FIRM}");
    }

    #[test]
    fn lowercase_names_are_not_references() {
        let value = json!("${lower}");
        assert_eq!(resolve_env_vars_with(&value, &HashMap::new()).unwrap(), value);
    }

    #[test]
    fn overrides_apply_and_bad_port_is_ignored() {
        let config = apply_env_overrides_with(
            LexDeskConfig::default(),
            &env(&[
                ("LEXDESK_PORT", "8088"),
                ("OPENROUTER_API_KEY", "sk-env"),
                ("LEXDESK_MODEL", "anthropic/claude-3.5-sonnet"),
            ]),
        );
        assert_eq!(config.port(), 8088);
        assert_eq!(config.api_key(), Some("sk-env"));
        assert_eq!(config.model_id(), "anthropic/claude-3.5-sonnet");

        let config =
            apply_env_overrides_with(LexDeskConfig::default(), &env(&[("LEXDESK_PORT", "http")]));
        assert!(config.server.is_none());
    }

    #[test]
    fn collects_referenced_vars_once() {
        let value = json!({ "a": "${B} ${A}", "b": ["${A}", "$${C}"] });
        assert_eq!(collect_referenced_vars(&value), vec!["A", "B"]);
    }
}
