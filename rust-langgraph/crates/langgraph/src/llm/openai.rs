//! OpenAI-compatible Chat Completions client (`ChatOpenAI`).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{LlmClient, LlmError, LlmRequest, LlmResponse};
use crate::message::{Message, ToolCall};
use crate::tool_source::ToolSpec;

/// Default API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Client configuration.
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: String,
    /// Base URL without trailing slash; any OpenAI-compatible endpoint works.
    pub base_url: String,
    /// Model id, e.g. `gpt-4o`.
    pub model: String,
    pub temperature: Option<f32>,
}

impl OpenAiConfig {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: model.into(),
            temperature: None,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

#[derive(Debug, Serialize)]
struct WireFunctionCall<'a> {
    name: &'a str,
    arguments: &'a str,
}

#[derive(Debug, Serialize)]
struct WireToolCall<'a> {
    id: &'a str,
    #[serde(rename = "type")]
    kind: &'static str,
    function: WireFunctionCall<'a>,
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<WireToolCall<'a>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct WireFunction<'a> {
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    parameters: &'a Value,
}

#[derive(Debug, Serialize)]
struct WireTool<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    function: WireFunction<'a>,
}

#[derive(Debug, Serialize)]
struct RequestBody<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<WireTool<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    parallel_tool_calls: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct ResponseFunctionCall {
    name: String,
    #[serde(default)]
    arguments: String,
}

#[derive(Debug, Deserialize)]
struct ResponseToolCall {
    id: String,
    function: ResponseFunctionCall,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
    #[serde(default)]
    tool_calls: Vec<ResponseToolCall>,
}

#[derive(Debug, Deserialize)]
struct ResponseChoice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseBody {
    choices: Vec<ResponseChoice>,
}

fn wire_message(message: &Message) -> WireMessage<'_> {
    match message {
        Message::System { content } => WireMessage {
            role: "system",
            content: Some(content.as_str()),
            tool_calls: None,
            tool_call_id: None,
        },
        Message::User { content } => WireMessage {
            role: "user",
            content: Some(content.as_str()),
            tool_calls: None,
            tool_call_id: None,
        },
        Message::Assistant {
            content,
            tool_calls,
        } => WireMessage {
            role: "assistant",
            content: (!content.is_empty() || tool_calls.is_empty()).then_some(content.as_str()),
            tool_calls: (!tool_calls.is_empty()).then(|| {
                tool_calls
                    .iter()
                    .map(|tc| WireToolCall {
                        id: &tc.id,
                        kind: "function",
                        function: WireFunctionCall {
                            name: &tc.name,
                            arguments: &tc.arguments,
                        },
                    })
                    .collect()
            }),
            tool_call_id: None,
        },
        Message::Tool {
            tool_call_id,
            content,
            ..
        } => WireMessage {
            role: "tool",
            content: Some(content.as_str()),
            tool_calls: None,
            tool_call_id: Some(tool_call_id.as_str()),
        },
    }
}

fn wire_tool(spec: &ToolSpec) -> WireTool<'_> {
    WireTool {
        kind: "function",
        function: WireFunction {
            name: &spec.name,
            description: spec.description.as_deref(),
            parameters: &spec.input_schema,
        },
    }
}

/// OpenAI-compatible Chat Completions client implementing `LlmClient`.
#[derive(Debug, Clone)]
pub struct ChatOpenAI {
    config: OpenAiConfig,
    client: reqwest::Client,
}

impl ChatOpenAI {
    pub fn with_config(config: OpenAiConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn build_body<'a>(&'a self, request: &'a LlmRequest) -> RequestBody<'a> {
        let tools: Vec<WireTool<'a>> = request.tools.iter().map(wire_tool).collect();
        // The API rejects parallel_tool_calls when no tools are sent.
        let parallel_tool_calls = (!tools.is_empty()).then_some(request.parallel_tool_calls);
        RequestBody {
            model: &self.config.model,
            messages: request.messages.iter().map(wire_message).collect(),
            temperature: self.config.temperature,
            tools,
            parallel_tool_calls,
        }
    }
}

fn parse_response(text: &str) -> Result<LlmResponse, LlmError> {
    let parsed: ResponseBody =
        serde_json::from_str(text).map_err(|e| LlmError::Parsing(format!("{e}: {text}")))?;
    let message = parsed
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| LlmError::Api("response has no choices".to_string()))?
        .message;
    let tool_calls = message
        .tool_calls
        .into_iter()
        .map(|tc| ToolCall {
            id: tc.id,
            name: tc.function.name,
            arguments: tc.function.arguments,
        })
        .collect();
    Ok(LlmResponse {
        content: message.content.unwrap_or_default(),
        tool_calls,
    })
}

#[async_trait]
impl LlmClient for ChatOpenAI {
    async fn invoke(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        let url = format!("{}/chat/completions", self.config.base_url);
        let body = self.build_body(request);
        tracing::debug!(
            model = %self.config.model,
            messages = body.messages.len(),
            tools = body.tools.len(),
            "chat completion request"
        );
        let res = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::Network(e.to_string()))?;
        let status = res.status();
        let text = res
            .text()
            .await
            .map_err(|e| LlmError::Network(e.to_string()))?;
        if !status.is_success() {
            return Err(match status.as_u16() {
                401 | 403 => LlmError::Auth(text),
                429 => LlmError::RateLimit(text),
                400..=499 => LlmError::InvalidRequest(text),
                _ => LlmError::Api(text),
            });
        }
        parse_response(&text)
    }
}
