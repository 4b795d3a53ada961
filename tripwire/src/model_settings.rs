//! Per-call model configuration.
//!
//! Every field is optional: `None` means "let the provider decide". The
//! adapter maps each `None` to an omitted request field, never to `null`.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Truncation strategy for the model's context window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Truncation {
    /// Drop items from the middle of the conversation when it overflows.
    Auto,
    /// Fail the request when the conversation overflows.
    Disabled,
}

/// Reasoning effort for reasoning-capable models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReasoningEffort {
    /// Minimal reasoning.
    Low,
    /// Balanced reasoning.
    Medium,
    /// Maximal reasoning.
    High,
}

/// Reasoning configuration sent verbatim to the provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reasoning {
    /// How much effort the model spends reasoning.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effort: Option<ReasoningEffort>,
    /// Reasoning summary mode (`"auto"`, `"concise"`, `"detailed"`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

/// Settings to use when calling a model.
///
/// Not every provider honours every setting.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSettings {
    /// Sampling temperature.
    pub temperature: Option<f32>,
    /// Nucleus sampling parameter.
    pub top_p: Option<f32>,
    /// Frequency penalty (Chat Completions only; ignored by the Responses API).
    pub frequency_penalty: Option<f32>,
    /// Presence penalty (Chat Completions only; ignored by the Responses API).
    pub presence_penalty: Option<f32>,
    /// Tool choice: `"auto"`, `"required"`, `"none"`, a built-in tool
    /// name, or the name of a function tool.
    pub tool_choice: Option<String>,
    /// Whether the model may emit several tool calls in one turn.
    pub parallel_tool_calls: Option<bool>,
    /// Context truncation strategy.
    pub truncation: Option<Truncation>,
    /// Maximum number of output tokens.
    pub max_tokens: Option<u32>,
    /// Whether the provider should store the response.
    pub store: Option<bool>,
    /// Reasoning configuration.
    pub reasoning: Option<Reasoning>,
    /// Metadata attached to the response.
    pub metadata: Option<HashMap<String, String>>,
}

impl ModelSettings {
    /// Create empty settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set temperature.
    #[must_use]
    pub const fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set top-p sampling.
    #[must_use]
    pub const fn with_top_p(mut self, top_p: f32) -> Self {
        self.top_p = Some(top_p);
        self
    }

    /// Set tool choice.
    #[must_use]
    pub fn with_tool_choice(mut self, tool_choice: impl Into<String>) -> Self {
        self.tool_choice = Some(tool_choice.into());
        self
    }

    /// Set whether parallel tool calls are allowed.
    #[must_use]
    pub const fn with_parallel_tool_calls(mut self, parallel: bool) -> Self {
        self.parallel_tool_calls = Some(parallel);
        self
    }

    /// Set the truncation strategy.
    #[must_use]
    pub const fn with_truncation(mut self, truncation: Truncation) -> Self {
        self.truncation = Some(truncation);
        self
    }

    /// Set max output tokens.
    #[must_use]
    pub const fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Set whether the response is stored by the provider.
    #[must_use]
    pub const fn with_store(mut self, store: bool) -> Self {
        self.store = Some(store);
        self
    }

    /// Set reasoning configuration.
    #[must_use]
    pub fn with_reasoning(mut self, reasoning: Reasoning) -> Self {
        self.reasoning = Some(reasoning);
        self
    }

    /// Add a metadata entry.
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }

    /// Overlay the explicit values of `override_settings` onto `self`.
    ///
    /// Fields the override leaves as `None` keep their current value.
    #[must_use]
    pub fn resolve(&self, override_settings: Option<&Self>) -> Self {
        let Some(o) = override_settings else {
            return self.clone();
        };
        Self {
            temperature: o.temperature.or(self.temperature),
            top_p: o.top_p.or(self.top_p),
            frequency_penalty: o.frequency_penalty.or(self.frequency_penalty),
            presence_penalty: o.presence_penalty.or(self.presence_penalty),
            tool_choice: o.tool_choice.clone().or_else(|| self.tool_choice.clone()),
            parallel_tool_calls: o.parallel_tool_calls.or(self.parallel_tool_calls),
            truncation: o.truncation.or(self.truncation),
            max_tokens: o.max_tokens.or(self.max_tokens),
            store: o.store.or(self.store),
            reasoning: o.reasoning.clone().or_else(|| self.reasoning.clone()),
            metadata: o.metadata.clone().or_else(|| self.metadata.clone()),
        }
    }
}
