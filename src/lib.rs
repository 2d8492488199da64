//! Calcbot: an interactive AI calculator.
//!
//! Forwards user text to a Gemini model that knows about four arithmetic
//! tools, and prints the reply together with any tool the model chose.

pub mod chat;
pub mod config;
pub mod inference;
pub mod tools;
pub mod types;
