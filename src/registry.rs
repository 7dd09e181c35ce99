use crate::provider::{ChatProvider, ProviderTag};
use std::collections::HashMap;
use std::sync::Arc;

/// Central registry mapping provider tags to their clients.
pub struct ProviderRegistry {
    providers: HashMap<ProviderTag, Arc<dyn ChatProvider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self {
            providers: HashMap::new(),
        }
    }

    /// Register a client for `tag`, replacing any previous one.
    pub fn register(&mut self, tag: ProviderTag, provider: Arc<dyn ChatProvider>) {
        if self.providers.insert(tag, provider).is_some() {
            tracing::warn!(provider = %tag, "Replaced previously registered provider");
        }
    }

    /// Builder-style variant of [`register`](Self::register).
    pub fn with(mut self, tag: ProviderTag, provider: Arc<dyn ChatProvider>) -> Self {
        self.register(tag, provider);
        self
    }

    pub fn get(&self, tag: ProviderTag) -> Option<&Arc<dyn ChatProvider>> {
        self.providers.get(&tag)
    }

    pub fn has_provider(&self, tag: ProviderTag) -> bool {
        self.providers.contains_key(&tag)
    }

    /// All registered tags, in a stable order.
    pub fn tags(&self) -> Vec<ProviderTag> {
        ProviderTag::ALL
            .into_iter()
            .filter(|tag| self.providers.contains_key(tag))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Tell every registered client to drop its per-user state.
    pub fn reset_all(&self) {
        for (tag, provider) in &self.providers {
            provider.reset();
            tracing::debug!(provider = %tag, "Provider state reset");
        }
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}
