//! `lexdesk-config`: LexDesk runtime configuration.
//!
//! Load pipeline: YAML file -> `${VAR}` substitution -> environment
//! overrides -> defaults -> validation.

pub mod defaults;
pub mod env;
pub mod io;
pub mod redact;
pub mod schema;
pub mod validation;

use std::path::Path;

use anyhow::{Context, Result, bail};
use tracing::{debug, error, warn};

pub use defaults::apply_all_defaults;
pub use env::{
    MissingEnvVarError, apply_env_overrides, apply_env_overrides_with, collect_referenced_vars,
    resolve_env_vars, resolve_env_vars_with,
};
pub use io::{config_dir, config_file_path, load_raw};
pub use redact::redact;
pub use schema::LexDeskConfig;
pub use validation::{ConfigValidationError, ValidationReport, validate};

/// Read, substitute, override and default a config without validating it.
///
/// Callers that install a log subscriber from the config use this, then
/// [`check`] once logging is up.
pub async fn load(path: &Path) -> Result<LexDeskConfig> {
    let raw = load_raw(path).await?;
    let referenced = collect_referenced_vars(&raw);
    if !referenced.is_empty() {
        debug!(vars = ?referenced, "Resolving env references in config");
    }
    let value = resolve_env_vars(&raw).context("Failed to resolve env vars in config")?;
    let config: LexDeskConfig = serde_json::from_value(value)
        .with_context(|| format!("Invalid config at {}", path.display()))?;
    Ok(apply_all_defaults(apply_env_overrides(config)))
}

/// Apply defaults and validate an already-parsed config.
pub fn prepare(config: LexDeskConfig) -> Result<LexDeskConfig> {
    let config = apply_all_defaults(config);
    check(&config)?;
    Ok(config)
}

/// Validate, logging every warning and error; errors abort.
pub fn check(config: &LexDeskConfig) -> Result<()> {
    let report = validate(config);
    for warning in &report.warnings {
        warn!(path = %warning.path, message = %warning.message, "Config warning");
    }
    for err in &report.errors {
        error!(path = %err.path, message = %err.message, "Config error");
    }
    if let Some(first) = report.errors.first() {
        bail!(
            "{first}{}",
            match report.errors.len() {
                1 => String::new(),
                n => format!(" (and {} more)", n - 1),
            }
        );
    }
    Ok(())
}
