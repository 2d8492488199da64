//! Configuration schema for calcbot.toml.

use crate::chat::prompt::SYSTEM_INSTRUCTION;
use serde::{Deserialize, Serialize};

/// Environment variable holding the Gemini API key.
pub const API_KEY_ENV: &str = "GOOGLE_API_KEY";

/// Environment variable overriding the model identifier.
pub const MODEL_ENV: &str = "CALCBOT_MODEL";

/// Root configuration structure. Fixed for the lifetime of the process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalculatorConfig {
    /// Gemini model identifier.
    pub model: String,

    /// Sampling temperature (0 = greedy).
    pub temperature: f64,

    /// Generative Language API base URL.
    pub api_url: String,

    /// API key. Usually supplied through the environment instead.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Tool names advertised to the model.
    pub tools: Vec<String>,

    /// System instruction for the chat prompt.
    pub system_prompt: String,
}

impl Default for CalculatorConfig {
    fn default() -> Self {
        Self {
            model: "gemini-2.0-flash".into(),
            temperature: 0.0,
            api_url: "https://generativelanguage.googleapis.com".into(),
            api_key: None,
            tools: vec![
                "add".into(),
                "subtract".into(),
                "multiply".into(),
                "divide".into(),
            ],
            system_prompt: SYSTEM_INSTRUCTION.into(),
        }
    }
}

impl CalculatorConfig {
    /// Overlay values found in the environment through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup(API_KEY_ENV).filter(|k| !k.trim().is_empty()) {
            self.api_key = Some(key);
        }
        if let Some(model) = lookup(MODEL_ENV).filter(|m| !m.trim().is_empty()) {
            self.model = model;
        }
    }
}
