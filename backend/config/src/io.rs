//! Config file location and loading.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde_json::Value;
use tokio::fs;
use tracing::{debug, info};

const CONFIG_FILE_NAME: &str = "config.yaml";

pub const CONFIG_DIR_VAR: &str = "LEXDESK_CONFIG_DIR";

/// Resolve the LexDesk config directory.
/// Priority: `LEXDESK_CONFIG_DIR` env > `~/.lexdesk/` > `./.lexdesk/`
pub fn config_dir() -> PathBuf {
    if let Ok(dir) = std::env::var(CONFIG_DIR_VAR) {
        if !dir.trim().is_empty() {
            return PathBuf::from(dir);
        }
    }
    dirs::home_dir()
        .map(|home| home.join(".lexdesk"))
        .unwrap_or_else(|| PathBuf::from(".lexdesk"))
}

pub fn config_file_path(config_dir: &Path) -> PathBuf {
    config_dir.join(CONFIG_FILE_NAME)
}

/// Read the config file as an untyped tree, before env substitution.
///
/// A missing or empty file yields an empty object (first run).
pub async fn load_raw(path: &Path) -> Result<Value> {
    if !fs::try_exists(path).await.unwrap_or(false) {
        debug!(path = %path.display(), "Config file does not exist; using defaults");
        return Ok(Value::Object(Default::default()));
    }

    let raw = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let value: Value = serde_yaml::from_str(&raw)
        .with_context(|| format!("Failed to parse config YAML at: {}", path.display()))?;

    info!(path = %path.display(), "Loaded config");
    Ok(match value {
        Value::Null => Value::Object(Default::default()),
        other => other,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_file_is_an_empty_object() {
        let dir = tempfile::tempdir().unwrap();
        let value = load_raw(&config_file_path(dir.path())).await.unwrap();
        assert_eq!(value, Value::Object(Default::default()));
    }

    #[tokio::test]
    async fn reads_yaml_tree() {
        let dir = tempfile::tempdir().unwrap();
        let path = config_file_path(dir.path());
        tokio::fs::write(&path, "server:\n  port: 4000\n").await.unwrap();
        let value = load_raw(&path).await.unwrap();
        assert_eq!(value["server"]["port"], 4000);
    }

    #[tokio::test]
    async fn broken_yaml_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = config_file_path(dir.path());
        tokio::fs::write(&path, "server: [unclosed\n").await.unwrap();
        let err = load_raw(&path).await.unwrap_err();
        assert!(err.to_string().contains("config.yaml"));
    }
}
