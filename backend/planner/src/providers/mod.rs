pub mod openrouter;
pub mod scripted;

use std::collections::HashMap;
use std::sync::Arc;

use lexdesk_core::{DeskError, LlmProvider};

/// Registry of completion providers, looked up by name.
pub struct ProviderRegistry {
    providers: HashMap<String, Arc<dyn LlmProvider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self {
            providers: HashMap::new(),
        }
    }

    /// Register a provider under its own name.
    pub fn register(&mut self, provider: Arc<dyn LlmProvider>) {
        self.providers.insert(provider.name().to_string(), provider);
    }

    pub fn get(&self, name: &str) -> Result<Arc<dyn LlmProvider>, DeskError> {
        self.providers.get(name).cloned().ok_or_else(|| {
            DeskError::Config(format!(
                "unknown model provider '{name}' (available: {})",
                self.list().join(", ")
            ))
        })
    }

    /// Registered provider names, sorted.
    pub fn list(&self) -> Vec<String> {
        let mut names: Vec<String> = self.providers.keys().cloned().collect();
        names.sort();
        names
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}
