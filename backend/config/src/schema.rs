//! LexDesk runtime configuration schema.
//!
//! Every section is optional on disk; `defaults::apply_all_defaults` fills
//! the gaps, and the accessors below read the filled values.

use serde::{Deserialize, Serialize};

use crate::defaults::{
    DEFAULT_BIND, DEFAULT_FIRM_NAME, DEFAULT_LOG_DIR, DEFAULT_LOG_LEVEL, DEFAULT_MAX_STEPS,
    DEFAULT_MAX_TOKENS, DEFAULT_MODEL, DEFAULT_PORT, DEFAULT_PROVIDER, DEFAULT_STEP_TIMEOUT_SECS,
    DEFAULT_TEMPERATURE, DEFAULT_TIMEZONE, DEFAULT_TOOL_TIMEOUT_SECS,
};

/// Root configuration, usually `~/.lexdesk/config.yaml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LexDeskConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server: Option<ServerConfig>,

    /// Model provider used by the planner
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<ModelConfig>,

    /// Dispatch loop limits
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dispatch: Option<DispatchConfig>,

    /// Firm identity used in templated emails and documents
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub firm: Option<FirmConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelConfig {
    /// `openrouter` or `scripted`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchConfig {
    /// Tool-execution rounds allowed per request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_steps: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step_timeout_secs: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_timeout_secs: Option<u64>,
    /// Reject reschedules that cannot be matched to an existing booking
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strict_reschedule: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FirmConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub office_location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggingConfig {
    /// `trace`, `debug`, `info`, `warn` or `error`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<String>,
    /// JSON console output instead of plain text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub json: Option<bool>,
}

impl LexDeskConfig {
    pub fn bind(&self) -> &str {
        self.server
            .as_ref()
            .and_then(|s| s.bind.as_deref())
            .unwrap_or(DEFAULT_BIND)
    }

    pub fn port(&self) -> u16 {
        self.server
            .as_ref()
            .and_then(|s| s.port)
            .unwrap_or(DEFAULT_PORT)
    }

    pub fn provider(&self) -> &str {
        self.model
            .as_ref()
            .and_then(|m| m.provider.as_deref())
            .unwrap_or(DEFAULT_PROVIDER)
    }

    pub fn model_id(&self) -> &str {
        self.model
            .as_ref()
            .and_then(|m| m.model.as_deref())
            .unwrap_or(DEFAULT_MODEL)
    }

    pub fn api_key(&self) -> Option<&str> {
        self.model.as_ref().and_then(|m| m.api_key.as_deref())
    }

    pub fn base_url(&self) -> Option<&str> {
        self.model.as_ref().and_then(|m| m.base_url.as_deref())
    }

    pub fn temperature(&self) -> f32 {
        self.model
            .as_ref()
            .and_then(|m| m.temperature)
            .unwrap_or(DEFAULT_TEMPERATURE)
    }

    pub fn max_tokens(&self) -> u32 {
        self.model
            .as_ref()
            .and_then(|m| m.max_tokens)
            .unwrap_or(DEFAULT_MAX_TOKENS)
    }

    pub fn max_steps(&self) -> usize {
        self.dispatch
            .as_ref()
            .and_then(|d| d.max_steps)
            .unwrap_or(DEFAULT_MAX_STEPS)
    }

    pub fn step_timeout_secs(&self) -> u64 {
        self.dispatch
            .as_ref()
            .and_then(|d| d.step_timeout_secs)
            .unwrap_or(DEFAULT_STEP_TIMEOUT_SECS)
    }

    pub fn tool_timeout_secs(&self) -> u64 {
        self.dispatch
            .as_ref()
            .and_then(|d| d.tool_timeout_secs)
            .unwrap_or(DEFAULT_TOOL_TIMEOUT_SECS)
    }

    pub fn strict_reschedule(&self) -> bool {
        self.dispatch
            .as_ref()
            .and_then(|d| d.strict_reschedule)
            .unwrap_or(false)
    }

    pub fn firm_name(&self) -> &str {
        self.firm
            .as_ref()
            .and_then(|f| f.name.as_deref())
            .unwrap_or(DEFAULT_FIRM_NAME)
    }

    pub fn office_location(&self) -> Option<&str> {
        self.firm.as_ref().and_then(|f| f.office_location.as_deref())
    }

    pub fn timezone(&self) -> &str {
        self.firm
            .as_ref()
            .and_then(|f| f.timezone.as_deref())
            .unwrap_or(DEFAULT_TIMEZONE)
    }

    pub fn log_level(&self) -> &str {
        self.logging
            .as_ref()
            .and_then(|l| l.level.as_deref())
            .unwrap_or(DEFAULT_LOG_LEVEL)
    }

    pub fn log_dir(&self) -> &str {
        self.logging
            .as_ref()
            .and_then(|l| l.dir.as_deref())
            .unwrap_or(DEFAULT_LOG_DIR)
    }

    pub fn log_json(&self) -> bool {
        self.logging.as_ref().and_then(|l| l.json).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_camel_case_yaml() {
        let yaml = r#"
server:
  port: 8080
model:
  provider: openrouter
  apiKey: sk-test
  maxTokens: 512
dispatch:
  maxSteps: 4
  strictReschedule: true
firm:
  name: Harbor & Vale LLP
  officeLocation: 12 Main St
"#;
        let config: LexDeskConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.port(), 8080);
        assert_eq!(config.bind(), DEFAULT_BIND);
        assert_eq!(config.api_key(), Some("sk-test"));
        assert_eq!(config.max_tokens(), 512);
        assert_eq!(config.max_steps(), 4);
        assert!(config.strict_reschedule());
        assert_eq!(config.firm_name(), "Harbor & Vale LLP");
        assert_eq!(config.office_location(), Some("12 Main St"));
    }

    #[test]
    fn empty_config_reads_defaults() {
        let config = LexDeskConfig::default();
        assert_eq!(config.port(), DEFAULT_PORT);
        assert_eq!(config.provider(), DEFAULT_PROVIDER);
        assert!(!config.strict_reschedule());
        assert!(config.api_key().is_none());
    }
}
