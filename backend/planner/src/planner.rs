use std::sync::Arc;

use tracing::{debug, info, warn};

use lexdesk_core::{CompletionRequest, CompletionStream, DeskError, LlmProvider, Message, ToolDefinition};

/// Model parameters sent with every turn.
#[derive(Debug, Clone)]
pub struct PlannerSettings {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for PlannerSettings {
    fn default() -> Self {
        Self {
            model: "openai/gpt-4o".to_string(),
            max_tokens: 1024,
            temperature: 0.2,
        }
    }
}

/// Opens model turns against one provider with fixed settings.
#[derive(Clone)]
pub struct ModelPlanner {
    provider: Arc<dyn LlmProvider>,
    settings: PlannerSettings,
}

impl ModelPlanner {
    pub fn new(provider: Arc<dyn LlmProvider>, settings: PlannerSettings) -> Self {
        Self { provider, settings }
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    pub fn model(&self) -> &str {
        &self.settings.model
    }

    /// Start a streamed completion over the conversation so far.
    pub async fn open_turn(
        &self,
        messages: &[Message],
        tools: Vec<ToolDefinition>,
    ) -> Result<CompletionStream, DeskError> {
        let request = CompletionRequest {
            model: self.settings.model.clone(),
            messages: messages.to_vec(),
            tools,
            max_tokens: self.settings.max_tokens,
            temperature: self.settings.temperature,
        };

        debug!(
            provider = %self.provider.name(),
            model = %request.model,
            messages = request.messages.len(),
            "Opening model turn"
        );

        match self.provider.stream(&request).await {
            Ok(stream) => {
                info!(provider = %self.provider.name(), "Model turn opened");
                Ok(stream)
            }
            Err(e) => {
                warn!(provider = %self.provider.name(), error = %e, "Provider failed");
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::scripted::{ScriptedProvider, ScriptedTurn};

    #[tokio::test]
    async fn forwards_settings_and_conversation() {
        let provider = Arc::new(ScriptedProvider::new(vec![ScriptedTurn::new().text("hi")]));
        let planner = ModelPlanner::new(
            provider.clone(),
            PlannerSettings {
                model: "test-model".into(),
                max_tokens: 77,
                temperature: 0.0,
            },
        );

        planner
            .open_turn(&[Message::system("sys"), Message::user("hello")], Vec::new())
            .await
            .unwrap();

        let requests = provider.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].model, "test-model");
        assert_eq!(requests[0].max_tokens, 77);
        assert_eq!(requests[0].messages[1].content, "hello");
    }
}
