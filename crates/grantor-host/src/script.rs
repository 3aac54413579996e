use std::collections::HashMap;

use grantor_types::Capability;
use serde::{Deserialize, Serialize};

/// What the simulated user does when a runtime prompt shows a capability.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptDecision {
    Allow,
    #[default]
    Deny,
    /// Deny and tick "don't ask again".
    DenyAlways,
}

/// What the simulated user does on a settings screen.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettingsDecision {
    Allow,
    #[default]
    Deny,
}

/// Per-capability decisions. Capabilities without an entry are denied.
#[derive(Clone, Debug, Default)]
pub struct UserScript {
    prompts: HashMap<Capability, PromptDecision>,
    settings: HashMap<Capability, SettingsDecision>,
}

impl UserScript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allow `capability` wherever it is asked for.
    pub fn allow(self, capability: Capability) -> Self {
        self.on_prompt(capability, PromptDecision::Allow)
            .on_settings(capability, SettingsDecision::Allow)
    }

    pub fn deny(self, capability: Capability) -> Self {
        self.on_prompt(capability, PromptDecision::Deny)
            .on_settings(capability, SettingsDecision::Deny)
    }

    pub fn deny_always(self, capability: Capability) -> Self {
        self.on_prompt(capability, PromptDecision::DenyAlways)
            .on_settings(capability, SettingsDecision::Deny)
    }

    pub fn on_prompt(mut self, capability: Capability, decision: PromptDecision) -> Self {
        self.prompts.insert(capability, decision);
        self
    }

    pub fn on_settings(mut self, capability: Capability, decision: SettingsDecision) -> Self {
        self.settings.insert(capability, decision);
        self
    }

    pub fn prompt_decision(&self, capability: Capability) -> PromptDecision {
        self.prompts.get(&capability).copied().unwrap_or_default()
    }

    pub fn settings_decision(&self, capability: Capability) -> SettingsDecision {
        self.settings.get(&capability).copied().unwrap_or_default()
    }
}
