//! Gemini Live transport over a websocket.
//!
//! One writer task drains the outbound chunk channel into the socket; one
//! reader task turns server frames into [`LiveEvent`]s. Both stop when the
//! handle's cancellation token fires.

use ascend_core::assistant::AssistantError;
use ascend_core::assistant::live::{
    LiveConfig, LiveEvent, LiveHandle, LiveLink, LiveTransport, RealtimeInput,
};
use ascend_core::config::GeminiConfig;
use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;

const LIVE_ENDPOINT: &str = "wss://generativelanguage.googleapis.com/ws/google.ai.generativelanguage.v1beta.GenerativeService.BidiGenerateContent";

/// Opens Gemini Live sessions.
#[derive(Clone)]
pub struct GeminiLiveTransport {
    api_key: String,
    endpoint: String,
}

impl GeminiLiveTransport {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            endpoint: LIVE_ENDPOINT.to_string(),
        }
    }

    pub fn from_config(config: &GeminiConfig) -> Self {
        Self::new(config.api_key.clone())
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[async_trait]
impl LiveTransport for GeminiLiveTransport {
    async fn connect(&self, config: &LiveConfig) -> Result<LiveLink, AssistantError> {
        let url = format!("{}?key={}", self.endpoint, self.api_key);

        let (socket, _) = connect_async(url.as_str())
            .await
            .map_err(|e| AssistantError::voice_setup(format!("Live connection failed: {e}")))?;
        let (mut sink, mut stream) = socket.split();

        sink.send(Message::Text(setup_message(config).to_string()))
            .await
            .map_err(|e| AssistantError::voice_setup(format!("Live setup failed: {e}")))?;

        tracing::info!("[GeminiLive] Connected to {}", config.model);

        let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<RealtimeInput>();
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel::<LiveEvent>();
        let cancel = CancellationToken::new();

        let writer_cancel = cancel.clone();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = writer_cancel.cancelled() => break,
                    chunk = outbound_rx.recv() => {
                        let Some(chunk) = chunk else { break };
                        let frame = realtime_input_message(&chunk).to_string();
                        if let Err(e) = sink.send(Message::Text(frame)).await {
                            tracing::warn!("[GeminiLive] Failed to send audio chunk: {}", e);
                            break;
                        }
                    }
                }
            }
            let _ = sink.close().await;
            tracing::debug!("[GeminiLive] Writer stopped");
        });

        let reader_cancel = cancel.clone();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = reader_cancel.cancelled() => break,
                    frame = stream.next() => {
                        let events = match frame {
                            Some(Ok(Message::Text(text))) => parse_server_message(&text),
                            Some(Ok(Message::Binary(bytes))) => match std::str::from_utf8(&bytes) {
                                Ok(text) => parse_server_message(text),
                                Err(_) => {
                                    tracing::warn!("[GeminiLive] Ignoring non-UTF-8 binary frame");
                                    Vec::new()
                                }
                            },
                            Some(Ok(Message::Close(_))) | None => {
                                let _ = inbound_tx.send(LiveEvent::Closed);
                                break;
                            }
                            Some(Ok(_)) => Vec::new(),
                            Some(Err(e)) => {
                                let _ = inbound_tx.send(LiveEvent::Error(e.to_string()));
                                break;
                            }
                        };

                        for event in events {
                            if inbound_tx.send(event).is_err() {
                                return;
                            }
                        }
                    }
                }
            }
            tracing::debug!("[GeminiLive] Reader stopped");
        });

        Ok(LiveLink {
            outbound: outbound_tx,
            inbound: inbound_rx,
            handle: Box::new(GeminiLiveHandle { cancel }),
        })
    }
}

struct GeminiLiveHandle {
    cancel: CancellationToken,
}

#[async_trait]
impl LiveHandle for GeminiLiveHandle {
    async fn close(&self) {
        if !self.cancel.is_cancelled() {
            tracing::info!("[GeminiLive] Closing session");
            self.cancel.cancel();
        }
    }
}

fn setup_message(config: &LiveConfig) -> Value {
    let mut setup = json!({
        "model": format!("models/{}", config.model),
        "generationConfig": {
            "responseModalities": ["AUDIO"],
            "speechConfig": {
                "voiceConfig": {
                    "prebuiltVoiceConfig": { "voiceName": config.voice_name }
                }
            }
        },
        "outputAudioTranscription": {}
    });

    if let Some(instruction) = &config.system_instruction {
        setup["systemInstruction"] = json!({ "parts": [{ "text": instruction }] });
    }

    json!({ "setup": setup })
}

fn realtime_input_message(chunk: &RealtimeInput) -> Value {
    json!({
        "realtimeInput": {
            "mediaChunks": [{ "mimeType": chunk.mime_type, "data": chunk.data }]
        }
    })
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ServerMessage {
    setup_complete: Option<Value>,
    server_content: Option<ServerContent>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ServerContent {
    model_turn: Option<ModelTurn>,
    output_transcription: Option<Transcription>,
    #[serde(default)]
    interrupted: bool,
    #[serde(default)]
    turn_complete: bool,
}

#[derive(Deserialize)]
struct ModelTurn {
    #[serde(default)]
    parts: Vec<TurnPart>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TurnPart {
    inline_data: Option<InlineData>,
}

#[derive(Deserialize)]
struct InlineData {
    data: String,
}

#[derive(Deserialize)]
struct Transcription {
    text: Option<String>,
}

/// Maps one server frame to events, in the order they must be handled:
/// an interruption flushes playback before any audio in the same frame.
fn parse_server_message(text: &str) -> Vec<LiveEvent> {
    let message: ServerMessage = match serde_json::from_str(text) {
        Ok(message) => message,
        Err(e) => {
            tracing::warn!("[GeminiLive] Ignoring malformed server frame: {}", e);
            return Vec::new();
        }
    };

    let mut events = Vec::new();

    if message.setup_complete.is_some() {
        events.push(LiveEvent::Ready);
    }

    if let Some(content) = message.server_content {
        if content.interrupted {
            events.push(LiveEvent::Interrupted);
        }

        if let Some(turn) = content.model_turn {
            events.extend(
                turn.parts
                    .into_iter()
                    .filter_map(|part| part.inline_data)
                    .filter(|inline| !inline.data.is_empty())
                    .map(|inline| LiveEvent::Audio { data: inline.data }),
            );
        }

        if let Some(text) = content.output_transcription.and_then(|t| t.text) {
            if !text.is_empty() {
                events.push(LiveEvent::Transcript(text));
            }
        }

        if content.turn_complete {
            events.push(LiveEvent::TurnComplete);
        }
    }

    events
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setup_message() {
        let config = LiveConfig {
            model: "gemini-live".to_string(),
            voice_name: "Zephyr".to_string(),
            system_instruction: Some("be brief".to_string()),
        };

        let value = setup_message(&config);
        assert_eq!(value["setup"]["model"], "models/gemini-live");
        assert_eq!(
            value["setup"]["generationConfig"]["responseModalities"],
            json!(["AUDIO"])
        );
        assert_eq!(
            value["setup"]["generationConfig"]["speechConfig"]["voiceConfig"]["prebuiltVoiceConfig"]
                ["voiceName"],
            "Zephyr"
        );
        assert_eq!(
            value["setup"]["systemInstruction"]["parts"][0]["text"],
            "be brief"
        );
    }

    #[test]
    fn test_setup_without_instruction() {
        let config = LiveConfig {
            model: "m".to_string(),
            voice_name: "Zephyr".to_string(),
            system_instruction: None,
        };
        assert!(setup_message(&config)["setup"].get("systemInstruction").is_none());
    }

    #[test]
    fn test_realtime_input_message() {
        let chunk = RealtimeInput::pcm(16_000, "AAA=".to_string());
        let value = realtime_input_message(&chunk);
        assert_eq!(
            value,
            json!({"realtimeInput": {"mediaChunks": [{"mimeType": "audio/pcm;rate=16000", "data": "AAA="}]}})
        );
    }

    #[test]
    fn test_parse_setup_complete() {
        assert_eq!(parse_server_message(r#"{"setupComplete": {}}"#), vec![LiveEvent::Ready]);
    }

    #[test]
    fn test_parse_audio_and_turn_complete() {
        let frame = r#"{"serverContent": {
            "modelTurn": {"parts": [{"inlineData": {"mimeType": "audio/pcm;rate=24000", "data": "AQI="}}, {"text": "x"}]},
            "outputTranscription": {"text": "Hello"},
            "turnComplete": true
        }}"#;

        assert_eq!(
            parse_server_message(frame),
            vec![
                LiveEvent::Audio {
                    data: "AQI=".to_string()
                },
                LiveEvent::Transcript("Hello".to_string()),
                LiveEvent::TurnComplete,
            ]
        );
    }

    #[test]
    fn test_parse_interrupted_first() {
        let frame = r#"{"serverContent": {"interrupted": true, "modelTurn": {"parts": [{"inlineData": {"data": "AQI="}}]}}}"#;
        let events = parse_server_message(frame);
        assert_eq!(events[0], LiveEvent::Interrupted);
        assert_eq!(events.len(), 2);
    }

    #[test]
    fn test_parse_garbage() {
        assert!(parse_server_message("not json").is_empty());
        assert!(parse_server_message("{}").is_empty());
    }
}
