//! Prompt template: a fixed system instruction plus the user's raw input.

use crate::types::{ChatMessage, Prompt};
use tracing::debug;

/// Default system instruction.
pub const SYSTEM_INSTRUCTION: &str =
    "You are an AI calculator. You can add, subtract, multiply, or divide numbers.";

/// Placeholder replaced by the user's line.
pub const USER_INPUT_PLACEHOLDER: &str = "{userInput}";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    system: String,
    user: String,
}

impl PromptTemplate {
    pub fn new(system: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            user: USER_INPUT_PLACEHOLDER.to_string(),
        }
    }

    pub fn system(&self) -> &str {
        &self.system
    }

    /// Render a two-message prompt: system instruction, then the user turn.
    pub fn render(&self, user_input: &str) -> Prompt {
        let user = self.user.replace(USER_INPUT_PLACEHOLDER, user_input);
        debug!("Rendered prompt ({} chars of user input)", user_input.len());
        Prompt::Messages(vec![ChatMessage::system(&self.system), ChatMessage::user(user)])
    }
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self::new(SYSTEM_INSTRUCTION)
    }
}
