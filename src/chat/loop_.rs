//! Interactive read-prompt-print loop.
//!
//! One illustrative query runs first, then each line read from the input is
//! rendered through the prompt template, sent to the model, and the reply is
//! printed. Tool calls chosen by the model are reported, never executed.

use crate::chat::prompt::PromptTemplate;
use crate::inference::ModelBinding;
use crate::tools::ToolRegistry;
use crate::types::*;
use anyhow::Result;
use serde_json::Value;
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, info, warn};

/// Query sent once at startup.
pub const EXAMPLE_QUERY: &str = "What is 12 multiplied by 9?";

/// Printed after every reply.
pub const SEPARATOR: &str = "——————————————";

/// Input prompt.
pub const USER_PROMPT: &str = "You: ";

/// Drives the example query and the chat cycle against one model binding.
pub struct ChatLoop<M> {
    binding: M,
    template: PromptTemplate,
    registry: ToolRegistry,
    state: LoopState,
}

impl<M: ModelBinding> ChatLoop<M> {
    pub fn new(binding: M, template: PromptTemplate, registry: ToolRegistry) -> Self {
        Self {
            binding,
            template,
            registry,
            state: LoopState::Idle,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    fn transition(&mut self, next: LoopState) {
        debug!("Chat loop: {} -> {}", self.state, next);
        self.state = next;
    }

    /// Send the hardcoded example query as raw text and report the outcome.
    pub async fn run_example<W: Write>(&mut self, out: &mut W) -> Result<ModelResponse> {
        writeln!(out, "\nExample: Multiply Tool Usage")?;
        out.flush()?;

        self.transition(LoopState::AwaitingModelResponse);
        let response = self
            .binding
            .invoke(&Prompt::Text(EXAMPLE_QUERY.to_string()))
            .await?;

        self.transition(LoopState::Printing);
        writeln!(out, "AI Response: {}", response.content)?;
        match response.first_tool_call() {
            Some(call) => {
                self.check_call(call);
                writeln!(out, "Tool Called: {}", call.name)?;
                writeln!(out, "Tool Args: {}", render_arguments(&call.arguments))?;
            }
            None => writeln!(out, "No tools were used.")?,
        }
        writeln!(out, "{}\n", SEPARATOR)?;
        out.flush()?;

        self.transition(LoopState::Idle);
        Ok(response)
    }

    /// Handle one line of user input.
    pub async fn turn<W: Write>(&mut self, user_input: &str, out: &mut W) -> Result<ModelResponse> {
        let prompt = self.template.render(user_input);

        self.transition(LoopState::AwaitingModelResponse);
        let response = self.binding.invoke(&prompt).await?;

        self.transition(LoopState::Printing);
        writeln!(out, "AI: {}", response.content)?;
        if let Some(call) = response.first_tool_call() {
            self.check_call(call);
            if response.tool_calls.len() > 1 {
                debug!(
                    "Reporting first of {} tool calls, dropping the rest",
                    response.tool_calls.len()
                );
            }
            writeln!(out, "Used Tool: {}", call.name)?;
            writeln!(out, "Tool Args: {}", render_arguments(&call.arguments))?;
        }
        writeln!(out, "{}", SEPARATOR)?;
        out.flush()?;

        Ok(response)
    }

    /// Read lines until end of input. Returns the number of completed turns.
    pub async fn run<R, W>(&mut self, input: R, out: &mut W) -> Result<u64>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        let mut lines = input.lines();
        let mut turns = 0u64;

        loop {
            self.transition(LoopState::AwaitingInput);
            write!(out, "{}", USER_PROMPT)?;
            out.flush()?;

            let Some(line) = lines.next_line().await? else {
                writeln!(out)?;
                out.flush()?;
                break;
            };

            self.turn(&line, out).await?;
            turns += 1;
        }

        info!("Input closed after {} turns", turns);
        self.transition(LoopState::Idle);
        Ok(turns)
    }

    /// Validate a reported call against the registry; failures are only logged.
    fn check_call(&self, call: &ToolCall) {
        if let Err(e) = self.registry.validate(call) {
            warn!("Model requested an invalid tool call: {}", e);
        }
    }
}

/// Format tool arguments as `{a: 12, b: 9}`, keys in sorted order.
pub fn render_arguments(args: &Value) -> String {
    match args {
        Value::Object(map) => {
            let fields: Vec<String> = map
                .iter()
                .map(|(key, value)| format!("{}: {}", key, render_value(value)))
                .collect();
            format!("{{{}}}", fields.join(", "))
        }
        other => render_value(other),
    }
}

fn render_value(value: &Value) -> String {
    match value {
        Value::Number(n) if n.is_f64() => n
            .as_f64()
            .map(render_float)
            .unwrap_or_else(|| n.to_string()),
        other => other.to_string(),
    }
}

/// Plain notation in `1e-6..1e21`, exponent notation (`1e+300`) outside it.
fn render_float(f: f64) -> String {
    let magnitude = f.abs();
    if f == 0.0 || !f.is_finite() || (1e-6..1e21).contains(&magnitude) {
        return f.to_string();
    }
    let exp = format!("{:e}", f);
    match exp.split_once('e') {
        Some((mantissa, power)) if !power.starts_with('-') => format!("{}e+{}", mantissa, power),
        _ => exp,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    /// Replies with canned responses in order and records every prompt.
    #[derive(Clone, Default)]
    struct ScriptedBinding {
        responses: Arc<Mutex<Vec<ModelResponse>>>,
        prompts: Arc<Mutex<Vec<Prompt>>>,
    }

    impl ScriptedBinding {
        fn new(responses: Vec<ModelResponse>) -> Self {
            Self {
                responses: Arc::new(Mutex::new(responses)),
                prompts: Arc::new(Mutex::new(Vec::new())),
            }
        }

        fn prompts(&self) -> Vec<Prompt> {
            self.prompts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ModelBinding for ScriptedBinding {
        async fn invoke(&self, prompt: &Prompt) -> Result<ModelResponse> {
            self.prompts.lock().unwrap().push(prompt.clone());
            let mut responses = self.responses.lock().unwrap();
            if responses.is_empty() {
                anyhow::bail!("no scripted response left");
            }
            Ok(responses.remove(0))
        }
    }

    fn reply(text: &str, calls: &[(&str, Value)]) -> ModelResponse {
        ModelResponse {
            content: text.into(),
            tool_calls: calls
                .iter()
                .map(|(name, arguments)| ToolCall {
                    name: (*name).into(),
                    arguments: arguments.clone(),
                })
                .collect(),
            usage: TokenUsage::default(),
        }
    }

    fn chat(binding: ScriptedBinding) -> ChatLoop<ScriptedBinding> {
        ChatLoop::new(binding, PromptTemplate::default(), ToolRegistry::arithmetic())
    }

    #[test]
    fn renders_arguments_compactly() {
        assert_eq!(render_arguments(&json!({"a": 12, "b": 9})), "{a: 12, b: 9}");
        assert_eq!(render_arguments(&json!({"a": 7.0, "b": 2.5})), "{a: 7, b: 2.5}");
        assert_eq!(render_arguments(&json!({})), "{}");
        assert_eq!(render_arguments(&json!({"a": "x"})), "{a: \"x\"}");
    }

    #[test]
    fn extreme_floats_use_exponent_notation() {
        assert_eq!(render_arguments(&json!({"b": 1e300, "a": 12})), "{a: 12, b: 1e+300}");
        assert_eq!(render_arguments(&json!({"a": -2.5e21, "b": 1.5e-7})), "{a: -2.5e+21, b: 1.5e-7}");
        assert_eq!(render_arguments(&json!({"a": 1e20, "b": 0.000001})), "{a: 100000000000000000000, b: 0.000001}");
        assert_eq!(render_arguments(&json!({"a": 0.0})), "{a: 0}");
    }

    #[tokio::test]
    async fn reply_without_tools_prints_only_text() {
        let mut chat = chat(ScriptedBinding::new(vec![reply("Hello there", &[])]));
        let mut out = Vec::new();
        chat.turn("hi", &mut out).await.unwrap();

        let out = String::from_utf8(out).unwrap();
        assert_eq!(out, format!("AI: Hello there\n{}\n", SEPARATOR));
        assert!(!out.contains("Tool"));
    }

    #[tokio::test]
    async fn single_tool_call_is_reported() {
        let binding = ScriptedBinding::new(vec![reply("", &[("multiply", json!({"a": 12, "b": 9}))])]);
        let mut chat = chat(binding);
        let mut out = Vec::new();
        chat.turn("12 times 9", &mut out).await.unwrap();

        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("Used Tool: multiply\n"));
        assert!(out.contains("Tool Args: {a: 12, b: 9}\n"));
    }

    #[tokio::test]
    async fn only_first_of_several_calls_is_reported() {
        let binding = ScriptedBinding::new(vec![reply(
            "",
            &[
                ("add", json!({"a": 1, "b": 2})),
                ("divide", json!({"a": 8, "b": 4})),
            ],
        )]);
        let mut chat = chat(binding);
        let mut out = Vec::new();
        let response = chat.turn("both", &mut out).await.unwrap();

        let out = String::from_utf8(out).unwrap();
        assert_eq!(response.tool_calls.len(), 2);
        assert!(out.contains("Used Tool: add"));
        assert!(!out.contains("divide"));
        assert_eq!(out.matches("Tool Args:").count(), 1);
    }

    #[tokio::test]
    async fn example_sends_raw_text() {
        let binding = ScriptedBinding::new(vec![reply(
            "108",
            &[("multiply", json!({"a": 12, "b": 9}))],
        )]);
        let mut chat = chat(binding.clone());
        let mut out = Vec::new();
        chat.run_example(&mut out).await.unwrap();

        assert_eq!(binding.prompts(), vec![Prompt::Text(EXAMPLE_QUERY.into())]);
        let out = String::from_utf8(out).unwrap();
        assert!(out.starts_with("\nExample: Multiply Tool Usage\n"));
        assert!(out.contains("AI Response: 108\n"));
        assert!(out.contains("Tool Called: multiply\n"));
        assert!(out.contains("Tool Args: {a: 12, b: 9}\n"));
        assert_eq!(chat.state(), LoopState::Idle);
    }

    #[tokio::test]
    async fn example_without_tools_says_so() {
        let mut chat = chat(ScriptedBinding::new(vec![reply("It is 108.", &[])]));
        let mut out = Vec::new();
        chat.run_example(&mut out).await.unwrap();
        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("No tools were used.\n"));
        assert!(!out.contains("Tool Called"));
    }

    #[tokio::test]
    async fn loop_reads_until_eof_and_forwards_input_verbatim() {
        let binding = ScriptedBinding::new(vec![reply("one", &[]), reply("two", &[])]);
        let mut chat = chat(binding.clone());
        let input: &[u8] = b"first line\r\n\n";
        let mut out = Vec::new();

        let turns = chat.run(input, &mut out).await.unwrap();
        assert_eq!(turns, 2);

        let users: Vec<String> = binding
            .prompts()
            .iter()
            .map(|p| p.to_messages()[1].content.clone())
            .collect();
        assert_eq!(users, vec!["first line".to_string(), String::new()]);

        let out = String::from_utf8(out).unwrap();
        assert_eq!(out.matches(USER_PROMPT).count(), 3);
        assert!(out.contains("AI: one\n"));
        assert!(out.contains("AI: two\n"));
    }

    #[tokio::test]
    async fn model_errors_end_the_loop() {
        let mut chat = chat(ScriptedBinding::new(Vec::new()));
        let input: &[u8] = b"anything\n";
        let mut out = Vec::new();
        assert!(chat.run(input, &mut out).await.is_err());
        assert_eq!(chat.state(), LoopState::AwaitingModelResponse);
    }

    #[tokio::test]
    async fn invalid_calls_are_still_reported() {
        let binding = ScriptedBinding::new(vec![reply("", &[("sqrt", json!({"x": 4}))])]);
        let mut chat = chat(binding);
        let mut out = Vec::new();
        chat.turn("root of 4", &mut out).await.unwrap();
        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("Used Tool: sqrt"));
        assert!(out.contains("Tool Args: {x: 4}"));
    }
}
