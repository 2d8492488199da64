//! Shared types used across the calculator runtime.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Chat loop state machine
// ---------------------------------------------------------------------------

/// States the interactive loop moves through on every turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    /// Started, example not yet run.
    Idle,
    /// Prompt written, waiting for a line on stdin.
    AwaitingInput,
    /// Prompt sent, waiting for the model.
    AwaitingModelResponse,
    /// Writing the reply to stdout.
    Printing,
}

impl fmt::Display for LoopState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::AwaitingInput => write!(f, "awaiting_input"),
            Self::AwaitingModelResponse => write!(f, "awaiting_model_response"),
            Self::Printing => write!(f, "printing"),
        }
    }
}

impl Default for LoopState {
    fn default() -> Self {
        Self::Idle
    }
}

// ---------------------------------------------------------------------------
// Inference types
// ---------------------------------------------------------------------------

/// A chat message sent to the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
}

/// What gets sent through the model binding.
#[derive(Debug, Clone, PartialEq)]
pub enum Prompt {
    /// A bare string, used by the illustrative example.
    Text(String),
    /// A rendered template: system instruction followed by the user turn.
    Messages(Vec<ChatMessage>),
}

impl Prompt {
    /// Flatten into chat messages; raw text becomes a single user message.
    pub fn to_messages(&self) -> Vec<ChatMessage> {
        match self {
            Self::Text(text) => vec![ChatMessage::user(text.clone())],
            Self::Messages(messages) => messages.clone(),
        }
    }
}

/// A tool call request from the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub name: String,
    pub arguments: serde_json::Value,
}

/// Response from inference including potential tool calls.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelResponse {
    pub content: String,
    pub tool_calls: Vec<ToolCall>,
    pub usage: TokenUsage,
}

impl ModelResponse {
    /// The only invocation the chat loop reports.
    pub fn first_tool_call(&self) -> Option<&ToolCall> {
        self.tool_calls.first()
    }
}

/// Token usage from an inference call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}
