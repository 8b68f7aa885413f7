//! Builds the dispatch runtime from a loaded config.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::info;

use lexdesk_agent::{AgentRunner, RunnerSettings};
use lexdesk_config::LexDeskConfig;
use lexdesk_planner::{
    ModelPlanner, OpenRouterProvider, PlannerSettings, ProviderRegistry, ScriptedProvider,
    ScriptedTurn,
};
use lexdesk_tools::{Collaborators, FirmProfile, ToolSettings, default_registry};

/// Reply used by the `scripted` provider, which never reaches a model.
const OFFLINE_REPLY: &str = "LexDesk is running in offline mode with the scripted model \
     provider. Configure an OpenRouter API key to enable the assistant.";

pub fn tool_settings(config: &LexDeskConfig) -> ToolSettings {
    ToolSettings {
        firm: FirmProfile {
            name: config.firm_name().to_string(),
            office_location: config.office_location().map(str::to_string),
            timezone: config.timezone().to_string(),
        },
        strict_reschedule: config.strict_reschedule(),
        simulate_latency: true,
    }
}

pub fn provider_registry(config: &LexDeskConfig) -> ProviderRegistry {
    let mut providers = ProviderRegistry::new();
    if let Some(key) = config.api_key() {
        let provider = match config.base_url() {
            Some(url) => OpenRouterProvider::new(key).with_base_url(url),
            None => OpenRouterProvider::new(key),
        };
        providers.register(Arc::new(provider));
        info!("Registered OpenRouter provider");
    }
    providers.register(Arc::new(ScriptedProvider::repeating(
        ScriptedTurn::new().text(OFFLINE_REPLY),
    )));
    providers
}

/// Wire simulated collaborators, the tool registry, the planner and the runner.
pub fn build_runner(config: &LexDeskConfig) -> Result<AgentRunner> {
    let registry = default_registry(&Collaborators::simulated(), &tool_settings(config))
        .context("building tool registry")?;

    let provider = provider_registry(config)
        .get(config.provider())
        .with_context(|| {
            format!(
                "model provider '{}' is not available; is OPENROUTER_API_KEY set?",
                config.provider()
            )
        })?;
    let planner = ModelPlanner::new(
        provider,
        PlannerSettings {
            model: config.model_id().to_string(),
            max_tokens: config.max_tokens(),
            temperature: config.temperature(),
        },
    );
    info!(
        provider = planner.provider_name(),
        model = planner.model(),
        tools = registry.len(),
        "Dispatch runtime ready"
    );

    let settings = RunnerSettings {
        max_steps: config.max_steps(),
        step_timeout: Duration::from_secs(config.step_timeout_secs()),
        tool_timeout: Duration::from_secs(config.tool_timeout_secs()),
    };
    Ok(AgentRunner::new(planner, Arc::new(registry), settings))
}

#[cfg(test)]
mod tests {
    use super::*;
    use lexdesk_config::schema::ModelConfig;

    fn scripted_config() -> LexDeskConfig {
        lexdesk_config::prepare(LexDeskConfig {
            model: Some(ModelConfig {
                provider: Some("scripted".into()),
                ..ModelConfig::default()
            }),
            ..LexDeskConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn scripted_provider_builds_without_a_key() {
        let runner = build_runner(&scripted_config()).unwrap();
        assert_eq!(runner.registry().len(), 8);
    }

    #[test]
    fn openrouter_without_key_is_reported() {
        let config = lexdesk_config::prepare(LexDeskConfig::default()).unwrap();
        let err = build_runner(&config).err().unwrap();
        assert!(format!("{err:#}").contains("OPENROUTER_API_KEY"));
    }

    #[test]
    fn registry_lists_openrouter_only_with_a_key() {
        assert_eq!(provider_registry(&scripted_config()).list(), vec!["scripted"]);

        let config = LexDeskConfig {
            model: Some(ModelConfig {
                api_key: Some("sk-or-test".into()),
                ..ModelConfig::default()
            }),
            ..LexDeskConfig::default()
        };
        assert_eq!(
            provider_registry(&config).list(),
            vec!["openrouter", "scripted"]
        );
    }
}
