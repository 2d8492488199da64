//! Model inference via the Gemini `generateContent` API.
//!
//! Tools are advertised as function declarations; any `functionCall` parts in
//! the reply come back as [`ToolCall`]s.

use super::ModelBinding;
use crate::config::{CalculatorConfig, API_KEY_ENV};
use crate::tools::{ToolDefinition, ToolRegistry};
use crate::types::*;
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Inference client bound to one model, one temperature and one tool set.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    base_url: String,
    api_key: Option<String>,
    model: String,
    temperature: f64,
    tools: Vec<ToolDefinition>,
    http: reqwest::Client,
}

// -- Gemini request/response types ------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<ContentPayload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<ContentPayload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<ToolPayload<'a>>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct ContentPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<TextPart>,
}

#[derive(Debug, Serialize)]
struct TextPart {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ToolPayload<'a> {
    function_declarations: Vec<FunctionDeclaration<'a>>,
}

#[derive(Debug, Serialize)]
struct FunctionDeclaration<'a> {
    name: &'a str,
    description: &'a str,
    parameters: &'a serde_json::Value,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponsePart {
    text: Option<String>,
    function_call: Option<FunctionCallPayload>,
}

#[derive(Debug, Deserialize)]
struct FunctionCallPayload {
    name: String,
    #[serde(default)]
    args: serde_json::Value,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct UsageMetadata {
    prompt_token_count: u32,
    candidates_token_count: u32,
    total_token_count: u32,
}

impl GeminiClient {
    /// Create a client from the frozen run configuration and the tools to advertise.
    pub fn new(config: &CalculatorConfig, registry: &ToolRegistry) -> Self {
        Self {
            base_url: config.api_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            temperature: config.temperature,
            tools: registry.definitions(),
            http: reqwest::Client::new(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }

    fn build_request(&self, prompt: &Prompt) -> GenerateRequest<'_> {
        let mut system_parts = Vec::new();
        let mut contents = Vec::new();

        for message in prompt.to_messages() {
            match message.role {
                ChatRole::System => system_parts.push(TextPart {
                    text: message.content,
                }),
                ChatRole::User => contents.push(ContentPayload {
                    role: Some("user"),
                    parts: vec![TextPart {
                        text: message.content,
                    }],
                }),
            }
        }

        let system_instruction = if system_parts.is_empty() {
            None
        } else {
            Some(ContentPayload {
                role: None,
                parts: system_parts,
            })
        };

        let tools = if self.tools.is_empty() {
            None
        } else {
            Some(vec![ToolPayload {
                function_declarations: self
                    .tools
                    .iter()
                    .map(|t| FunctionDeclaration {
                        name: &t.name,
                        description: &t.description,
                        parameters: &t.parameters,
                    })
                    .collect(),
            }])
        };

        GenerateRequest {
            contents,
            system_instruction,
            tools,
            generation_config: GenerationConfig {
                temperature: self.temperature,
            },
        }
    }
}

fn parse_response(body: GenerateResponse) -> ModelResponse {
    let parts = body
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|c| c.parts)
        .unwrap_or_default();

    let mut content = String::new();
    let mut tool_calls = Vec::new();
    for part in parts {
        if let Some(text) = part.text {
            content.push_str(&text);
        }
        if let Some(fc) = part.function_call {
            let arguments = if fc.args.is_null() {
                serde_json::Value::Object(Default::default())
            } else {
                fc.args
            };
            tool_calls.push(ToolCall {
                name: fc.name,
                arguments,
            });
        }
    }

    let usage = body
        .usage_metadata
        .map(|u| TokenUsage {
            prompt_tokens: u.prompt_token_count,
            completion_tokens: u.candidates_token_count,
            total_tokens: u.total_token_count,
        })
        .unwrap_or_default();

    ModelResponse {
        content,
        tool_calls,
        usage,
    }
}

#[async_trait]
impl ModelBinding for GeminiClient {
    async fn invoke(&self, prompt: &Prompt) -> Result<ModelResponse> {
        let Some(api_key) = self.api_key.as_deref() else {
            bail!("{} is not set; cannot reach the model", API_KEY_ENV);
        };

        let request = self.build_request(prompt);
        debug!(
            "Inference request to model: {} ({} messages, {} tools)",
            self.model,
            request.contents.len(),
            self.tools.len()
        );

        let resp = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .json(&request)
            .send()
            .await
            .context("Inference request failed")?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            bail!("Inference failed ({}): {}", status, body);
        }

        let body: GenerateResponse = resp
            .json()
            .await
            .context("Failed to parse inference response")?;
        let response = parse_response(body);

        info!(
            "Model replied: {} chars, {} tool calls, {} tokens",
            response.content.len(),
            response.tool_calls.len(),
            response.usage.total_tokens
        );
        Ok(response)
    }
}
