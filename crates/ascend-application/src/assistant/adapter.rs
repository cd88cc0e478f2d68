//! Assistant session adapter: text chat, transcript and voice mode lifecycle.

use std::sync::Arc;
use std::time::Duration;

use ascend_core::assistant::geo::{GeolocationProvider, locate_or_unknown};
use ascend_core::assistant::prompt::{build_system_instruction, product_description_prompt};
use ascend_core::assistant::{
    AssistantError, AssistantMode, ChatConfig, ChatMessage, ChatSession, ConversationalOracle,
    OracleReply,
};
use ascend_core::catalog::Product;
use ascend_core::settings::Language;
use tokio::sync::Mutex;

use super::voice::{VoiceBackend, VolumeMeter, VoiceSession};

/// Text used when description generation fails or returns nothing.
pub const DESCRIPTION_FALLBACK: &str = "Experience premium quality with our latest collection.";

const DEFAULT_GEOLOCATION_TIMEOUT: Duration = Duration::from_secs(8);

struct AdapterState {
    mode: AssistantMode,
    session: Option<Arc<dyn ChatSession>>,
    system_instruction: Option<String>,
    transcript: Vec<ChatMessage>,
    voice: Option<VoiceSession>,
    /// Ticket of a `start_voice` still connecting; cleared by `stop_voice`.
    pending_voice: Option<u64>,
    next_voice_ticket: u64,
    /// Bumped by `shutdown`; replies carrying an older epoch are discarded.
    epoch: u64,
}

impl Default for AdapterState {
    fn default() -> Self {
        Self {
            mode: AssistantMode::Uninitialized,
            session: None,
            system_instruction: None,
            transcript: Vec::new(),
            voice: None,
            pending_voice: None,
            next_voice_ticket: 1,
            epoch: 0,
        }
    }
}

/// Assistant session adapter.
///
/// Owns the single chat session of the process, its transcript and the
/// optional live voice session. Modes move
/// `Uninitialized -> TextReady <-> VoiceActive`.
///
/// Oracle failures during text chat are absorbed into
/// [`ascend_core::assistant::FALLBACK_REPLY`]; only misuse (calling before
/// `initialize`) and voice setup failures reach the caller.
pub struct AssistantAdapter {
    oracle: Arc<dyn ConversationalOracle>,
    geolocation: Option<Arc<dyn GeolocationProvider>>,
    geolocation_timeout: Duration,
    voice_backend: Option<VoiceBackend>,
    volume: VolumeMeter,
    state: Mutex<AdapterState>,
}

impl AssistantAdapter {
    pub fn new(oracle: Arc<dyn ConversationalOracle>) -> Self {
        Self {
            oracle,
            geolocation: None,
            geolocation_timeout: DEFAULT_GEOLOCATION_TIMEOUT,
            voice_backend: None,
            volume: VolumeMeter::default(),
            state: Mutex::new(AdapterState::default()),
        }
    }

    /// Biases the maps tool with this provider's position.
    pub fn with_geolocation(
        mut self,
        provider: Arc<dyn GeolocationProvider>,
        timeout: Duration,
    ) -> Self {
        self.geolocation = Some(provider);
        self.geolocation_timeout = timeout;
        self
    }

    /// Enables voice mode.
    pub fn with_voice(mut self, backend: VoiceBackend) -> Self {
        self.voice_backend = Some(backend);
        self
    }

    pub async fn mode(&self) -> AssistantMode {
        self.state.lock().await.mode
    }

    /// Microphone level of the latest captured frame; 0.0 outside voice mode.
    pub fn volume(&self) -> f32 {
        self.volume.get()
    }

    /// Creates the chat session seeded with `catalog`.
    ///
    /// Calling it again replaces the session with one built from the new
    /// catalog. Geolocation failures only drop the location line.
    pub async fn initialize(&self, catalog: &[Product]) -> Result<(), AssistantError> {
        let location =
            locate_or_unknown(self.geolocation.as_deref(), self.geolocation_timeout).await;
        let instruction = build_system_instruction(catalog, location)?;

        let session: Arc<dyn ChatSession> = Arc::from(
            self.oracle
                .start_chat(ChatConfig::with_grounding(instruction.clone(), location))
                .await?,
        );

        let mut state = self.state.lock().await;
        state.session = Some(session);
        state.system_instruction = Some(instruction);
        if state.mode == AssistantMode::Uninitialized {
            state.mode = AssistantMode::TextReady;
        }

        tracing::info!(
            "[Assistant] Session initialized with {} product(s), location {}",
            catalog.len(),
            if location.is_some() { "known" } else { "unknown" }
        );
        Ok(())
    }

    /// Returns the transcript, seeding the welcome message when empty.
    pub async fn open_chat(&self, language: Language) -> Vec<ChatMessage> {
        let mut state = self.state.lock().await;
        if state.transcript.is_empty() {
            state.transcript.push(ChatMessage::welcome(language));
        }
        state.transcript.clone()
    }

    pub async fn transcript(&self) -> Vec<ChatMessage> {
        self.state.lock().await.transcript.clone()
    }

    /// Sends one user message.
    ///
    /// Fails only with [`AssistantError::Uninitialized`]. Oracle failures
    /// yield the fallback reply and are not retried.
    pub async fn send_text(&self, message: &str) -> Result<OracleReply, AssistantError> {
        let (session, epoch) = {
            let mut state = self.state.lock().await;
            let session = state.session.clone().ok_or(AssistantError::Uninitialized)?;
            state.transcript.push(ChatMessage::user(message));
            (session, state.epoch)
        };

        let reply = match session.send_message(message).await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::error!("[Assistant] Oracle request failed: {}", e);
                OracleReply::fallback()
            }
        };

        let mut state = self.state.lock().await;
        if state.epoch == epoch {
            state.transcript.push(ChatMessage::model(reply.clone()));
        } else {
            tracing::debug!("[Assistant] Discarding reply that arrived after shutdown");
        }

        Ok(reply)
    }

    /// Starts a live voice session on top of text chat.
    ///
    /// Any setup failure leaves the adapter in `TextReady` and is returned
    /// once as [`AssistantError::VoiceSetup`]. A start that is overtaken by
    /// `stop_voice` while connecting closes only its own link and leaves the
    /// devices alone, since a newer session may already own them.
    pub async fn start_voice(&self) -> Result<(), AssistantError> {
        let (backend, ticket, instruction) = {
            let mut state = self.state.lock().await;
            match state.mode {
                AssistantMode::Uninitialized => return Err(AssistantError::Uninitialized),
                AssistantMode::VoiceActive => return Err(AssistantError::VoiceAlreadyActive),
                AssistantMode::TextReady => {}
            }
            let Some(backend) = self.voice_backend.as_ref() else {
                return Err(AssistantError::voice_setup("voice mode is not configured"));
            };

            let ticket = state.next_voice_ticket;
            state.next_voice_ticket += 1;
            state.pending_voice = Some(ticket);
            state.mode = AssistantMode::VoiceActive;
            (backend, ticket, state.system_instruction.clone())
        };

        let connected = VoiceSession::connect(backend, instruction).await;

        let mut state = self.state.lock().await;
        if state.pending_voice != Some(ticket) {
            drop(state);
            return match connected {
                Ok(link) => {
                    link.handle.close().await;
                    tracing::debug!("[Voice] Discarding link of a start that was stopped");
                    Err(AssistantError::voice_setup("voice mode was stopped while connecting"))
                }
                Err(e) => {
                    tracing::warn!("[Voice] Failed to start voice mode: {}", e);
                    Err(e)
                }
            };
        }
        state.pending_voice = None;

        // Devices are opened under the lock so no stop or restart interleaves.
        let started = match connected {
            Ok(link) => VoiceSession::start(backend, link, self.volume.clone()).await,
            Err(e) => Err(e),
        };

        match started {
            Ok(session) => {
                state.voice = Some(session);
                tracing::info!("[Voice] Voice mode started");
                Ok(())
            }
            Err(e) => {
                state.mode = AssistantMode::TextReady;
                drop(state);
                self.volume.reset();
                tracing::warn!("[Voice] Failed to start voice mode: {}", e);
                Err(e)
            }
        }
    }

    /// Ends voice mode, releasing capture, playback and the live link.
    /// Safe to call at any time.
    pub async fn stop_voice(&self) {
        let session = {
            let mut state = self.state.lock().await;
            state.pending_voice = None;
            if state.mode == AssistantMode::VoiceActive {
                state.mode = AssistantMode::TextReady;
            }
            state.voice.take()
        };

        if let (Some(session), Some(backend)) = (session, self.voice_backend.as_ref()) {
            session.close(backend).await;
            tracing::info!("[Voice] Voice mode stopped");
        }
        self.volume.reset();
    }

    /// Tears the adapter down: stops voice, drops the chat session and
    /// ignores replies still in flight.
    pub async fn shutdown(&self) {
        self.stop_voice().await;

        let mut state = self.state.lock().await;
        state.epoch += 1;
        state.session = None;
        state.system_instruction = None;
        state.transcript.clear();
        state.mode = AssistantMode::Uninitialized;
        tracing::info!("[Assistant] Session shut down");
    }

    /// One-shot marketing copy for a product; never fails.
    pub async fn generate_product_description(&self, name: &str, category: &str) -> String {
        let prompt = product_description_prompt(name, category);
        match self.oracle.generate(&prompt).await {
            Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
            Ok(_) => DESCRIPTION_FALLBACK.to_string(),
            Err(e) => {
                tracing::warn!("[Assistant] Description generation failed: {}", e);
                DESCRIPTION_FALLBACK.to_string()
            }
        }
    }
}
