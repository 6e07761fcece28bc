//! Chat-completion client (`POST {base_url}/chat/completions`).

use crate::config::FileGenerationConfig;
use crate::tools::FunctionSchemaConverter;
use async_trait::async_trait;
use helm_application::{GenerationError, GenerationRequest, TextGenerator};
use helm_domain::{GenerationResponse, ToolCall, truncate};
use reqwest::Client;
use serde_json::{Value, json};
use std::collections::HashMap;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

pub struct OpenAiCompatibleGenerator {
    client: Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

/// Validate the base URL: http or https only, and plain http only for
/// local servers when a key would be sent.
fn validate_base_url(base_url: &str, has_key: bool) -> Result<(), String> {
    let parsed = reqwest::Url::parse(base_url)
        .map_err(|e| format!("Invalid base_url '{}': {}", base_url, e))?;
    let host = parsed.host_str().unwrap_or("");

    match parsed.scheme() {
        "https" => Ok(()),
        "http" => {
            let is_localhost = matches!(host, "localhost" | "127.0.0.1" | "[::1]" | "::1");
            if is_localhost || !has_key {
                Ok(())
            } else {
                Err(format!(
                    "HTTP is not allowed for remote URLs when an API key is set (base_url: '{}')",
                    base_url
                ))
            }
        }
        scheme => Err(format!(
            "Unsupported URL scheme '{}' in base_url '{}'",
            scheme, base_url
        )),
    }
}

impl OpenAiCompatibleGenerator {
    pub fn new(
        base_url: &str,
        model: impl Into<String>,
        api_key: Option<String>,
    ) -> Result<Self, GenerationError> {
        validate_base_url(base_url, api_key.is_some()).map_err(GenerationError::RequestFailed)?;
        // No client timeout: every call is bounded by the caller.
        let client = Client::builder().build().map_err(|e| {
            GenerationError::Connection(format!("Failed to build HTTP client: {}", e))
        })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.into(),
            api_key,
        })
    }

    pub fn from_config(config: &FileGenerationConfig) -> Result<Self, GenerationError> {
        Self::new(&config.base_url, config.model.as_str(), config.api_key())
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn request_body(&self, request: &GenerationRequest) -> Value {
        let messages: Vec<Value> = request
            .messages
            .iter()
            .map(|m| json!({ "role": m.role.as_str(), "content": m.content }))
            .collect();
        let sampling = &request.sampling;

        let mut body = json!({
            "model": self.model,
            "messages": messages,
            "temperature": sampling.temperature,
            "top_p": sampling.top_p,
            "top_k": sampling.top_k,
        });
        if !sampling.stop.is_empty() {
            body["stop"] = json!(sampling.stop);
        }
        if !request.tools.is_empty() {
            body["tools"] = json!(FunctionSchemaConverter::tools_schema(&request.tools));
        }
        body
    }

    async fn send(&self, body: &Value) -> Result<GenerationResponse, GenerationError> {
        let url = format!("{}/chat/completions", self.base_url);
        let mut builder = self.client.post(&url).json(body);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await.map_err(map_transport_error)?;
        let status = response.status();
        let text = response.text().await.map_err(map_transport_error)?;

        if !status.is_success() {
            warn!(status = %status, "Generation API error");
            return Err(GenerationError::RequestFailed(format!(
                "{}: {}",
                status,
                truncate(text.trim(), 300)
            )));
        }
        debug!(response = %truncate(&text, 2000), "Generation response");

        let data: Value = serde_json::from_str(&text)
            .map_err(|e| GenerationError::MalformedResponse(e.to_string()))?;
        parse_response(&data)
    }
}

fn map_transport_error(e: reqwest::Error) -> GenerationError {
    if e.is_timeout() {
        GenerationError::Timeout
    } else if e.is_connect() {
        GenerationError::Connection(e.to_string())
    } else {
        GenerationError::RequestFailed(e.to_string())
    }
}

/// Decode the first choice: text content plus structured tool calls.
fn parse_response(data: &Value) -> Result<GenerationResponse, GenerationError> {
    let message = data["choices"]
        .get(0)
        .map(|choice| &choice["message"])
        .ok_or_else(|| GenerationError::MalformedResponse("no choices in response".to_string()))?;

    let content = message["content"].as_str().unwrap_or_default();
    let mut response = GenerationResponse::from_text(content);

    for call in message["tool_calls"].as_array().into_iter().flatten() {
        let function = &call["function"];
        let Some(name) = function["name"].as_str().filter(|n| !n.is_empty()) else {
            continue;
        };
        // Arguments arrive as a JSON string; some servers send an object.
        let arguments = match &function["arguments"] {
            Value::String(raw) if raw.trim().is_empty() => Ok(HashMap::new()),
            Value::String(raw) => serde_json::from_str::<HashMap<String, Value>>(raw),
            Value::Object(map) => Ok(map.clone().into_iter().collect()),
            _ => Ok(HashMap::new()),
        };
        match arguments {
            Ok(arguments) => {
                response = response.with_call(ToolCall {
                    tool_name: name.to_string(),
                    arguments,
                })
            }
            Err(e) => warn!(tool = name, error = %e, "Dropping tool call with unparsable arguments"),
        }
    }

    Ok(response)
}

#[async_trait]
impl TextGenerator for OpenAiCompatibleGenerator {
    async fn generate(
        &self,
        request: GenerationRequest,
        cancel: &CancellationToken,
    ) -> Result<GenerationResponse, GenerationError> {
        let body = self.request_body(&request);
        debug!(
            model = %self.model,
            temperature = request.sampling.temperature,
            tools = request.tools.len(),
            "Calling generation API"
        );
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(GenerationError::Cancelled),
            result = self.send(&body) => result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use helm_domain::{Message, SamplingParams, ToolDefinition, ToolTier};

    #[test]
    fn test_https_accepted() {
        assert!(validate_base_url("https://api.openai.com/v1", true).is_ok());
    }

    #[test]
    fn test_http_localhost_accepted() {
        assert!(validate_base_url("http://localhost:11434/v1", true).is_ok());
        assert!(validate_base_url("http://127.0.0.1:8080", true).is_ok());
    }

    #[test]
    fn test_http_remote_rejected_with_key() {
        let err = validate_base_url("http://api.example.com", true).unwrap_err();
        assert!(err.contains("HTTP is not allowed"));
        assert!(validate_base_url("http://gpu-box.lan:8000", false).is_ok());
    }

    #[test]
    fn test_invalid_url_rejected() {
        assert!(validate_base_url("not a url", false).is_err());
        assert!(validate_base_url("ftp://example.com", false).is_err());
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let generator =
            OpenAiCompatibleGenerator::new("http://localhost:11434/v1/", "llama3.1", None).unwrap();
        assert_eq!(generator.base_url, "http://localhost:11434/v1");
    }

    #[test]
    fn test_request_body_carries_sampling_and_tools() {
        let generator =
            OpenAiCompatibleGenerator::new("http://localhost:11434/v1", "llama3.1", None).unwrap();
        let request = GenerationRequest::new(
            vec![Message::system("sys"), Message::user("hello")],
            SamplingParams::for_attempt(1, &["\n".to_string()]),
        )
        .with_tools(vec![ToolDefinition::new(
            "lights_on",
            "Turn on the lights",
            ToolTier::Common,
        )]);

        let body = generator.request_body(&request);
        assert_eq!(body["model"], "llama3.1");
        assert_eq!(body["messages"][1]["role"], "user");
        assert_eq!(body["messages"][1]["content"], "hello");
        assert_eq!(body["stop"][0], "\n");
        assert_eq!(body["top_k"], request.sampling.top_k);
        assert_eq!(body["tools"][0]["function"]["name"], "lights_on");
    }

    #[test]
    fn test_request_body_without_tools_or_stop() {
        let generator =
            OpenAiCompatibleGenerator::new("http://localhost:11434/v1", "llama3.1", None).unwrap();
        let request = GenerationRequest::new(vec![Message::user("hi")], SamplingParams::initial());
        let body = generator.request_body(&request);
        assert!(body.get("tools").is_none());
        assert!(body.get("stop").is_none());
    }

    #[test]
    fn test_parse_text_response() {
        let data = json!({
            "choices": [{ "message": { "role": "assistant", "content": "lights_on" } }]
        });
        let response = parse_response(&data).unwrap();
        assert_eq!(response.text, "lights_on");
        assert!(!response.has_calls());
    }

    #[test]
    fn test_parse_tool_calls() {
        let data = json!({
            "choices": [{ "message": {
                "content": null,
                "tool_calls": [
                    { "id": "1", "type": "function",
                      "function": { "name": "set_flaps", "arguments": "{\"angle\": 30}" } },
                    { "id": "2", "type": "function",
                      "function": { "name": "gear_down", "arguments": "{not json" } }
                ]
            } }]
        });
        let response = parse_response(&data).unwrap();
        assert_eq!(response.text, "");
        assert_eq!(response.calls.len(), 1);
        let call = response.call_for("set_flaps").unwrap();
        assert_eq!(call.arguments["angle"], 30);
    }

    #[test]
    fn test_parse_without_choices_is_malformed() {
        let err = parse_response(&json!({ "choices": [] })).unwrap_err();
        assert!(matches!(err, GenerationError::MalformedResponse(_)));
    }
}
