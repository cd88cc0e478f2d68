//! GeminiApiOracle - Direct REST API implementation of the shopping oracle.
//!
//! Multi-turn chat keeps its own history and replays it on every
//! `generateContent` call. Search and maps tools are enabled per session and
//! their grounding chunks are surfaced as citations.

use std::time::Duration;

use ascend_core::assistant::{
    AssistantError, ChatConfig, ChatSession, Citation, ConversationalOracle, GeoLocation,
    OracleReply, OracleTool,
};
use ascend_core::config::GeminiConfig;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";
const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Oracle implementation that talks to the Gemini HTTP API.
#[derive(Clone)]
pub struct GeminiApiOracle {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiApiOracle {
    /// Creates a new oracle with the provided API key and model.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Result<Self, AssistantError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| AssistantError::oracle(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            model: model.into(),
            base_url: BASE_URL.to_string(),
        })
    }

    /// Builds from secret.json; `model_name` there wins over `default_model`.
    pub fn from_config(config: &GeminiConfig, default_model: &str) -> Result<Self, AssistantError> {
        let model = config
            .model_name
            .clone()
            .unwrap_or_else(|| default_model.to_string());
        Self::new(config.api_key.clone(), model)
    }

    /// Overrides the API root (for proxies and tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    async fn send_request(
        &self,
        body: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, AssistantError> {
        let url = format!(
            "{}/{model}:generateContent?key={api_key}",
            self.base_url,
            model = self.model,
            api_key = self.api_key
        );

        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|err| AssistantError::Oracle {
                status_code: None,
                message: format!("Gemini API request failed: {err}"),
                is_retryable: err.is_connect() || err.is_timeout(),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read Gemini error body".to_string());
            return Err(map_http_error(status, body_text));
        }

        response
            .json()
            .await
            .map_err(|err| AssistantError::oracle(format!("Failed to parse Gemini response: {err}")))
    }
}

#[async_trait]
impl ConversationalOracle for GeminiApiOracle {
    async fn start_chat(&self, config: ChatConfig) -> Result<Box<dyn ChatSession>, AssistantError> {
        tracing::info!(
            "[GeminiApiOracle] Starting chat on {} with {} tool(s), location {}",
            self.model,
            config.tools.len(),
            if config.location.is_some() { "known" } else { "unknown" }
        );

        Ok(Box::new(GeminiChatSession {
            oracle: self.clone(),
            system_instruction: Content::system(&config.system_instruction),
            tools: build_tools(&config.tools),
            tool_config: config.location.map(ToolConfig::from_location),
            history: Mutex::new(Vec::new()),
        }))
    }

    async fn generate(&self, prompt: &str) -> Result<String, AssistantError> {
        let request = GenerateContentRequest {
            contents: vec![Content::user(prompt)],
            system_instruction: None,
            tools: Vec::new(),
            tool_config: None,
        };

        let response = self.send_request(&request).await?;
        extract_reply(response).map(|reply| reply.text)
    }
}

/// A Gemini conversation. History only grows on successful exchanges.
pub struct GeminiChatSession {
    oracle: GeminiApiOracle,
    system_instruction: Content,
    tools: Vec<Tool>,
    tool_config: Option<ToolConfig>,
    history: Mutex<Vec<Content>>,
}

#[async_trait]
impl ChatSession for GeminiChatSession {
    async fn send_message(&self, message: &str) -> Result<OracleReply, AssistantError> {
        let mut history = self.history.lock().await;

        let mut contents = history.clone();
        contents.push(Content::user(message));

        let request = GenerateContentRequest {
            contents,
            system_instruction: Some(self.system_instruction.clone()),
            tools: self.tools.clone(),
            tool_config: self.tool_config.clone(),
        };

        let response = self.oracle.send_request(&request).await?;
        let reply = extract_reply(response)?;

        history.push(Content::user(message));
        history.push(Content::model(&reply.text));

        Ok(reply)
    }
}

fn build_tools(tools: &[OracleTool]) -> Vec<Tool> {
    tools
        .iter()
        .map(|tool| match tool {
            OracleTool::WebSearch => Tool {
                google_search: Some(EmptyObject {}),
                google_maps: None,
            },
            OracleTool::Maps => Tool {
                google_search: None,
                google_maps: Some(EmptyObject {}),
            },
        })
        .collect()
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Tool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_config: Option<ToolConfig>,
}

#[derive(Debug, Clone, Serialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<Part>,
}

impl Content {
    fn user(text: &str) -> Self {
        Self::with_role(Some("user"), text)
    }

    fn model(text: &str) -> Self {
        Self::with_role(Some("model"), text)
    }

    fn system(text: &str) -> Self {
        Self::with_role(None, text)
    }

    fn with_role(role: Option<&str>, text: &str) -> Self {
        Self {
            role: role.map(str::to_string),
            parts: vec![Part {
                text: text.to_string(),
            }],
        }
    }
}

#[derive(Debug, Clone, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Clone, Serialize)]
struct EmptyObject {}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct Tool {
    #[serde(skip_serializing_if = "Option::is_none")]
    google_search: Option<EmptyObject>,
    #[serde(skip_serializing_if = "Option::is_none")]
    google_maps: Option<EmptyObject>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct ToolConfig {
    retrieval_config: RetrievalConfig,
}

impl ToolConfig {
    fn from_location(location: GeoLocation) -> Self {
        Self {
            retrieval_config: RetrievalConfig {
                lat_lng: LatLng {
                    latitude: location.latitude,
                    longitude: location.longitude,
                },
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct RetrievalConfig {
    lat_lng: LatLng,
}

#[derive(Debug, Clone, Serialize)]
struct LatLng {
    latitude: f64,
    longitude: f64,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<ContentResponse>,
    grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Deserialize)]
struct ContentResponse {
    #[serde(default)]
    parts: Vec<PartResponse>,
}

#[derive(Deserialize)]
struct PartResponse {
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroundingMetadata {
    #[serde(default)]
    grounding_chunks: Vec<GroundingChunk>,
}

#[derive(Deserialize)]
struct GroundingChunk {
    web: Option<GroundingSource>,
    maps: Option<GroundingSource>,
}

#[derive(Deserialize)]
struct GroundingSource {
    uri: Option<String>,
    title: Option<String>,
}

#[derive(Deserialize)]
struct ErrorWrapper {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[allow(dead_code)]
    code: Option<i32>,
    message: Option<String>,
    status: Option<String>,
}

fn extract_reply(response: GenerateContentResponse) -> Result<OracleReply, AssistantError> {
    let candidate = response
        .candidates
        .and_then(|candidates| candidates.into_iter().next())
        .ok_or_else(|| AssistantError::oracle("Gemini API returned no candidates"))?;

    let text: String = candidate
        .content
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect()
        })
        .unwrap_or_default();

    let citations = candidate
        .grounding_metadata
        .map(|metadata| extract_citations(metadata.grounding_chunks))
        .unwrap_or_default();

    if text.trim().is_empty() && citations.is_empty() {
        return Err(AssistantError::oracle(
            "Gemini API returned no text in the response candidates",
        ));
    }

    Ok(OracleReply::text(text).with_citations(citations))
}

/// Web and maps sources with a URI, de-duplicated in order.
fn extract_citations(chunks: Vec<GroundingChunk>) -> Vec<Citation> {
    let mut citations: Vec<Citation> = Vec::new();

    for source in chunks.into_iter().filter_map(|chunk| chunk.web.or(chunk.maps)) {
        let Some(uri) = source.uri.filter(|uri| !uri.is_empty()) else {
            continue;
        };
        if citations.iter().any(|c| c.uri == uri) {
            continue;
        }
        let title = source
            .title
            .filter(|title| !title.is_empty())
            .unwrap_or_else(|| uri.clone());
        citations.push(Citation { title, uri });
    }

    citations
}

fn map_http_error(status: StatusCode, body: String) -> AssistantError {
    let message = serde_json::from_str::<ErrorWrapper>(&body)
        .map(|wrapper| {
            let status_text = wrapper.error.status.unwrap_or_default();
            let msg = wrapper.error.message.unwrap_or_else(|| body.clone());
            if status_text.is_empty() {
                msg
            } else {
                format!("{status_text}: {msg}")
            }
        })
        .unwrap_or_else(|_| body.clone());

    let is_retryable = matches!(
        status,
        StatusCode::TOO_MANY_REQUESTS
            | StatusCode::INTERNAL_SERVER_ERROR
            | StatusCode::BAD_GATEWAY
            | StatusCode::SERVICE_UNAVAILABLE
            | StatusCode::GATEWAY_TIMEOUT
    );

    AssistantError::Oracle {
        status_code: Some(status.as_u16()),
        message,
        is_retryable,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: serde_json::Value) -> GenerateContentResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_request_shape() {
        let request = GenerateContentRequest {
            contents: vec![Content::user("hello")],
            system_instruction: Some(Content::system("be nice")),
            tools: build_tools(&[OracleTool::WebSearch, OracleTool::Maps]),
            tool_config: Some(ToolConfig::from_location(GeoLocation {
                latitude: 15.35,
                longitude: 44.2,
            })),
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            json!({
                "contents": [{"role": "user", "parts": [{"text": "hello"}]}],
                "systemInstruction": {"parts": [{"text": "be nice"}]},
                "tools": [{"googleSearch": {}}, {"googleMaps": {}}],
                "toolConfig": {"retrievalConfig": {"latLng": {"latitude": 15.35, "longitude": 44.2}}}
            })
        );
    }

    #[test]
    fn test_request_without_location_omits_tool_config() {
        let request = GenerateContentRequest {
            contents: vec![Content::user("hi")],
            system_instruction: None,
            tools: Vec::new(),
            tool_config: None,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert!(value.get("toolConfig").is_none());
        assert!(value.get("tools").is_none());
        assert!(value.get("systemInstruction").is_none());
    }

    #[test]
    fn test_extract_plain_reply() {
        let reply = extract_reply(parse(json!({
            "candidates": [{"content": {"role": "model", "parts": [{"text": "hi"}]}}]
        })))
        .unwrap();

        assert_eq!(reply.text, "hi");
        assert!(reply.citations.is_empty());
    }

    #[test]
    fn test_extract_joins_parts_and_citations() {
        let reply = extract_reply(parse(json!({
            "candidates": [{
                "content": {"parts": [{"text": "Try "}, {"text": "the Onyx pack."}]},
                "groundingMetadata": {"groundingChunks": [
                    {"web": {"uri": "https://a.example", "title": "A"}},
                    {"maps": {"uri": "https://maps.example/x", "title": ""}},
                    {"web": {"uri": "https://a.example", "title": "A again"}},
                    {"retrievedContext": {"uri": "ignored"}}
                ]}
            }]
        })))
        .unwrap();

        assert_eq!(reply.text, "Try the Onyx pack.");
        assert_eq!(
            reply.citations,
            vec![
                Citation {
                    title: "A".to_string(),
                    uri: "https://a.example".to_string()
                },
                Citation {
                    title: "https://maps.example/x".to_string(),
                    uri: "https://maps.example/x".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_extract_empty_is_error() {
        assert!(extract_reply(parse(json!({"candidates": []}))).is_err());
        assert!(extract_reply(parse(json!({}))).is_err());
    }

    #[test]
    fn test_map_http_error() {
        let body = r#"{"error": {"code": 429, "message": "Quota exceeded", "status": "RESOURCE_EXHAUSTED"}}"#;
        match map_http_error(StatusCode::TOO_MANY_REQUESTS, body.to_string()) {
            AssistantError::Oracle {
                status_code,
                message,
                is_retryable,
            } => {
                assert_eq!(status_code, Some(429));
                assert_eq!(message, "RESOURCE_EXHAUSTED: Quota exceeded");
                assert!(is_retryable);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_map_http_error_plain_body() {
        match map_http_error(StatusCode::BAD_REQUEST, "nope".to_string()) {
            AssistantError::Oracle {
                message,
                is_retryable,
                ..
            } => {
                assert_eq!(message, "nope");
                assert!(!is_retryable);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_oracle_error() {
        let oracle = GeminiApiOracle::new("key", DEFAULT_GEMINI_MODEL)
            .unwrap()
            .with_base_url("http://127.0.0.1:9/v1beta/models");
        let session = oracle
            .start_chat(ChatConfig::with_grounding("rules", None))
            .await
            .unwrap();

        let err = session.send_message("hello").await.unwrap_err();
        assert!(matches!(err, AssistantError::Oracle { status_code: None, .. }));
    }
}
