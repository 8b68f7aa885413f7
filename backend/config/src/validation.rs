//! Config validation: collects every problem in one pass.

use thiserror::Error;

use crate::schema::LexDeskConfig;

const PROVIDERS: &[&str] = &["openrouter", "scripted"];
const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

#[derive(Debug, Error)]
#[error("Config validation error at '{path}': {message}")]
pub struct ConfigValidationError {
    pub path: String,
    pub message: String,
}

#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }

    fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }
}

pub fn validate(config: &LexDeskConfig) -> ValidationReport {
    let mut report = ValidationReport::default();
    validate_server(config, &mut report);
    validate_model(config, &mut report);
    validate_dispatch(config, &mut report);
    validate_firm(config, &mut report);
    validate_logging(config, &mut report);
    report
}

fn validate_server(config: &LexDeskConfig, report: &mut ValidationReport) {
    if config.bind().parse::<std::net::IpAddr>().is_err() {
        report.error("server.bind", format!("'{}' is not an IP address", config.bind()));
    }
    if config.port() == 0 {
        report.error("server.port", "Port must be non-zero");
    }
}

fn validate_model(config: &LexDeskConfig, report: &mut ValidationReport) {
    let provider = config.provider();
    if !PROVIDERS.contains(&provider) {
        report.error(
            "model.provider",
            format!("Unknown provider '{provider}' (expected one of: {})", PROVIDERS.join(", ")),
        );
    }
    if provider == "openrouter" && config.api_key().map_or(true, |k| k.trim().is_empty()) {
        report.warn(
            "model.apiKey",
            "No API key configured; model requests will be rejected upstream",
        );
    }
    if config.model_id().trim().is_empty() {
        report.error("model.model", "Model id cannot be empty");
    }
    let temperature = config.temperature();
    if !(0.0..=2.0).contains(&temperature) {
        report.error("model.temperature", format!("{temperature} is outside 0.0..=2.0"));
    }
    if config.max_tokens() == 0 {
        report.error("model.maxTokens", "Must be at least 1");
    }
}

fn validate_dispatch(config: &LexDeskConfig, report: &mut ValidationReport) {
    if config.max_steps() == 0 {
        report.error("dispatch.maxSteps", "Must allow at least one tool round");
    } else if config.max_steps() > 32 {
        report.warn("dispatch.maxSteps", "More than 32 tool rounds per request is unusual");
    }
    if config.step_timeout_secs() == 0 {
        report.error("dispatch.stepTimeoutSecs", "Must be at least 1 second");
    }
    if config.tool_timeout_secs() == 0 {
        report.error("dispatch.toolTimeoutSecs", "Must be at least 1 second");
    }
}

fn validate_firm(config: &LexDeskConfig, report: &mut ValidationReport) {
    if config.firm_name().trim().is_empty() {
        report.error("firm.name", "Firm name cannot be empty");
    }
    if !config.timezone().contains('/') && config.timezone() != "UTC" {
        report.warn(
            "firm.timezone",
            format!("'{}' does not look like an IANA timezone", config.timezone()),
        );
    }
}

fn validate_logging(config: &LexDeskConfig, report: &mut ValidationReport) {
    let level = config.log_level().to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        report.warn(
            "logging.level",
            format!("Unknown level '{}'; falling back to info", config.log_level()),
        );
    }
}
