//! Config defaults: fills every unset field of a parsed config.

use crate::schema::{
    DispatchConfig, FirmConfig, LexDeskConfig, LoggingConfig, ModelConfig, ServerConfig,
};

pub const DEFAULT_BIND: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 3000;

pub const DEFAULT_PROVIDER: &str = "openrouter";
pub const DEFAULT_MODEL: &str = "openai/gpt-4o";
pub const DEFAULT_TEMPERATURE: f32 = 0.2;
pub const DEFAULT_MAX_TOKENS: u32 = 1024;

/// Tool-execution rounds per request.
pub const DEFAULT_MAX_STEPS: usize = 8;
pub const DEFAULT_STEP_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_TOOL_TIMEOUT_SECS: u64 = 30;

pub const DEFAULT_FIRM_NAME: &str = "Your Law Firm";
pub const DEFAULT_TIMEZONE: &str = "America/Los_Angeles";

pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_LOG_DIR: &str = "logs";

/// Apply all defaults to a freshly loaded config.
pub fn apply_all_defaults(config: LexDeskConfig) -> LexDeskConfig {
    let config = apply_server_defaults(config);
    let config = apply_model_defaults(config);
    let config = apply_dispatch_defaults(config);
    let config = apply_firm_defaults(config);
    apply_logging_defaults(config)
}

fn apply_server_defaults(mut config: LexDeskConfig) -> LexDeskConfig {
    let server = config.server.get_or_insert_with(ServerConfig::default);
    server.bind.get_or_insert_with(|| DEFAULT_BIND.to_string());
    server.port.get_or_insert(DEFAULT_PORT);
    config
}

fn apply_model_defaults(mut config: LexDeskConfig) -> LexDeskConfig {
    let model = config.model.get_or_insert_with(ModelConfig::default);
    model.provider.get_or_insert_with(|| DEFAULT_PROVIDER.to_string());
    model.model.get_or_insert_with(|| DEFAULT_MODEL.to_string());
    model.temperature.get_or_insert(DEFAULT_TEMPERATURE);
    model.max_tokens.get_or_insert(DEFAULT_MAX_TOKENS);
    config
}

fn apply_dispatch_defaults(mut config: LexDeskConfig) -> LexDeskConfig {
    let dispatch = config.dispatch.get_or_insert_with(DispatchConfig::default);
    dispatch.max_steps.get_or_insert(DEFAULT_MAX_STEPS);
    dispatch.step_timeout_secs.get_or_insert(DEFAULT_STEP_TIMEOUT_SECS);
    dispatch.tool_timeout_secs.get_or_insert(DEFAULT_TOOL_TIMEOUT_SECS);
    dispatch.strict_reschedule.get_or_insert(false);
    config
}

/// Office location stays unset; documents then use a placeholder.
fn apply_firm_defaults(mut config: LexDeskConfig) -> LexDeskConfig {
    let firm = config.firm.get_or_insert_with(FirmConfig::default);
    firm.name.get_or_insert_with(|| DEFAULT_FIRM_NAME.to_string());
    firm.timezone.get_or_insert_with(|| DEFAULT_TIMEZONE.to_string());
    config
}

fn apply_logging_defaults(mut config: LexDeskConfig) -> LexDeskConfig {
    let logging = config.logging.get_or_insert_with(LoggingConfig::default);
    logging.level.get_or_insert_with(|| DEFAULT_LOG_LEVEL.to_string());
    logging.dir.get_or_insert_with(|| DEFAULT_LOG_DIR.to_string());
    logging.json.get_or_insert(false);
    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fills_every_section() {
        let config = apply_all_defaults(LexDeskConfig::default());
        let server = config.server.as_ref().unwrap();
        assert_eq!(server.port, Some(DEFAULT_PORT));
        let dispatch = config.dispatch.as_ref().unwrap();
        assert_eq!(dispatch.max_steps, Some(DEFAULT_MAX_STEPS));
        assert_eq!(dispatch.strict_reschedule, Some(false));
        assert!(config.firm.as_ref().unwrap().office_location.is_none());
        assert_eq!(config.logging.as_ref().unwrap().level.as_deref(), Some("info"));
    }

    #[test]
    fn keeps_explicit_values() {
        let config = LexDeskConfig {
            dispatch: Some(DispatchConfig {
                max_steps: Some(3),
                ..DispatchConfig::default()
            }),
            ..LexDeskConfig::default()
        };
        let config = apply_all_defaults(config);
        let dispatch = config.dispatch.unwrap();
        assert_eq!(dispatch.max_steps, Some(3));
        assert_eq!(dispatch.tool_timeout_secs, Some(DEFAULT_TOOL_TIMEOUT_SECS));
    }
}
