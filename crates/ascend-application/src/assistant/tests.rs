use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;

use ascend_core::assistant::audio::{DecodedAudio, encode_frame};
use ascend_core::assistant::device::{AudioCapture, CaptureFrame, PlaybackSink};
use ascend_core::assistant::geo::GeolocationProvider;
use ascend_core::assistant::live::{
    LiveConfig, LiveEvent, LiveHandle, LiveLink, LiveTransport, OUTPUT_SAMPLE_RATE, RealtimeInput,
};
use ascend_core::assistant::{
    AssistantError, AssistantMode, ChatConfig, ChatRole, ChatSession, Citation,
    ConversationalOracle, FALLBACK_REPLY, GeoLocation, OracleReply, OracleTool,
};
use ascend_core::catalog::{Product, default_products};
use ascend_core::error::{AscendError, Result as AscendResult};
use ascend_core::settings::Language;
use async_trait::async_trait;
use tokio::sync::{Notify, mpsc};

use super::*;

// ---------------------------------------------------------------------------
// Oracle mocks
// ---------------------------------------------------------------------------

#[derive(Default)]
struct ScriptedOracle {
    reply: StdMutex<Option<Result<OracleReply, AssistantError>>>,
    generated: StdMutex<Option<Result<String, AssistantError>>>,
    configs: StdMutex<Vec<ChatConfig>>,
    gate: Option<Arc<Notify>>,
}

impl ScriptedOracle {
    fn replying(reply: Result<OracleReply, AssistantError>) -> Self {
        Self {
            reply: StdMutex::new(Some(reply)),
            ..Default::default()
        }
    }

    fn gated(reply: OracleReply, gate: Arc<Notify>) -> Self {
        Self {
            reply: StdMutex::new(Some(Ok(reply))),
            gate: Some(gate),
            ..Default::default()
        }
    }

    fn generating(result: Result<String, AssistantError>) -> Self {
        Self {
            generated: StdMutex::new(Some(result)),
            ..Default::default()
        }
    }

    fn last_config(&self) -> ChatConfig {
        self.configs.lock().unwrap().last().cloned().unwrap()
    }
}

struct ScriptedSession {
    reply: Result<OracleReply, AssistantError>,
    gate: Option<Arc<Notify>>,
}

#[async_trait]
impl ChatSession for ScriptedSession {
    async fn send_message(&self, _message: &str) -> Result<OracleReply, AssistantError> {
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        self.reply.clone()
    }
}

#[async_trait]
impl ConversationalOracle for ScriptedOracle {
    async fn start_chat(&self, config: ChatConfig) -> Result<Box<dyn ChatSession>, AssistantError> {
        self.configs.lock().unwrap().push(config);
        let reply = self
            .reply
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| Ok(OracleReply::text("ok")));
        Ok(Box::new(ScriptedSession {
            reply,
            gate: self.gate.clone(),
        }))
    }

    async fn generate(&self, _prompt: &str) -> Result<String, AssistantError> {
        self.generated
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| Ok(String::new()))
    }
}

struct FixedLocation(Option<GeoLocation>);

#[async_trait]
impl GeolocationProvider for FixedLocation {
    async fn locate(&self) -> AscendResult<GeoLocation> {
        self.0
            .ok_or_else(|| AscendError::network("permission denied"))
    }
}

fn catalog() -> Vec<Product> {
    default_products()
}

fn adapter_with(oracle: ScriptedOracle) -> (Arc<ScriptedOracle>, AssistantAdapter) {
    let oracle = Arc::new(oracle);
    let adapter = AssistantAdapter::new(oracle.clone());
    (oracle, adapter)
}

// ---------------------------------------------------------------------------
// Voice mocks
// ---------------------------------------------------------------------------

#[derive(Default)]
struct MockHandle {
    closed: Arc<AtomicUsize>,
}

#[async_trait]
impl LiveHandle for MockHandle {
    async fn close(&self) {
        self.closed.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Default)]
struct MockTransport {
    fail: bool,
    /// Holds the next connect until notified.
    gate: StdMutex<Option<Arc<Notify>>>,
    attempts: AtomicUsize,
    configs: StdMutex<Vec<LiveConfig>>,
    sent: StdMutex<Option<mpsc::UnboundedReceiver<RealtimeInput>>>,
    events: StdMutex<Option<mpsc::UnboundedSender<LiveEvent>>>,
    closed: Arc<AtomicUsize>,
}

impl MockTransport {
    fn server(&self) -> mpsc::UnboundedSender<LiveEvent> {
        self.events.lock().unwrap().clone().unwrap()
    }

    fn drain_sent(&self) -> Vec<RealtimeInput> {
        let mut guard = self.sent.lock().unwrap();
        let rx = guard.as_mut().unwrap();
        let mut chunks = Vec::new();
        while let Ok(chunk) = rx.try_recv() {
            chunks.push(chunk);
        }
        chunks
    }
}

#[async_trait]
impl LiveTransport for MockTransport {
    async fn connect(&self, config: &LiveConfig) -> Result<LiveLink, AssistantError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        let gate = self.gate.lock().unwrap().take();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        if self.fail {
            return Err(AssistantError::voice_setup("connection refused"));
        }
        self.configs.lock().unwrap().push(config.clone());

        let (out_tx, out_rx) = mpsc::unbounded_channel();
        let (in_tx, in_rx) = mpsc::unbounded_channel();
        *self.sent.lock().unwrap() = Some(out_rx);
        *self.events.lock().unwrap() = Some(in_tx);

        Ok(LiveLink {
            outbound: out_tx,
            inbound: in_rx,
            handle: Box::new(MockHandle {
                closed: self.closed.clone(),
            }),
        })
    }
}

#[derive(Default)]
struct MockCapture {
    deny: bool,
    frames: StdMutex<Option<mpsc::UnboundedSender<CaptureFrame>>>,
    closed: AtomicBool,
}

impl MockCapture {
    fn push(&self, samples: Vec<f32>) {
        let guard = self.frames.lock().unwrap();
        guard
            .as_ref()
            .unwrap()
            .send(CaptureFrame {
                samples,
                sample_rate: 16_000,
            })
            .unwrap();
    }
}

#[async_trait]
impl AudioCapture for MockCapture {
    async fn open(
        &self,
        _sample_rate: u32,
    ) -> Result<mpsc::UnboundedReceiver<CaptureFrame>, AssistantError> {
        if self.deny {
            return Err(AssistantError::voice_setup("microphone permission denied"));
        }
        let (tx, rx) = mpsc::unbounded_channel();
        *self.frames.lock().unwrap() = Some(tx);
        self.closed.store(false, Ordering::SeqCst);
        Ok(rx)
    }

    fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

#[derive(Default)]
struct MockPlayback {
    played: StdMutex<Vec<(f64, f64)>>,
    flushes: AtomicUsize,
    closed: AtomicBool,
}

impl PlaybackSink for MockPlayback {
    fn open(&self, _sample_rate: u32) -> Result<(), AssistantError> {
        self.closed.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn current_time(&self) -> f64 {
        0.0
    }

    fn play_at(&self, start: f64, audio: DecodedAudio) {
        self.played.lock().unwrap().push((start, audio.duration()));
    }

    fn flush(&self) {
        self.flushes.fetch_add(1, Ordering::SeqCst);
    }

    fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

struct VoiceRig {
    transport: Arc<MockTransport>,
    capture: Arc<MockCapture>,
    playback: Arc<MockPlayback>,
    adapter: AssistantAdapter,
}

async fn voice_rig(transport: MockTransport, capture: MockCapture) -> VoiceRig {
    let transport = Arc::new(transport);
    let capture = Arc::new(capture);
    let playback = Arc::new(MockPlayback::default());

    let adapter = AssistantAdapter::new(Arc::new(ScriptedOracle::default())).with_voice(
        VoiceBackend {
            transport: transport.clone(),
            capture: capture.clone(),
            playback: playback.clone(),
            model: "live-model".to_string(),
            voice_name: "Zephyr".to_string(),
        },
    );
    adapter.initialize(&catalog()).await.unwrap();

    VoiceRig {
        transport,
        capture,
        playback,
        adapter,
    }
}

async fn wait_until(mut condition: impl FnMut() -> bool) {
    for _ in 0..200 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("condition not met in time");
}

fn audio_chunk(seconds: f64) -> LiveEvent {
    let samples = vec![0.25_f32; (seconds * f64::from(OUTPUT_SAMPLE_RATE)) as usize];
    LiveEvent::Audio {
        data: encode_frame(&samples, OUTPUT_SAMPLE_RATE, OUTPUT_SAMPLE_RATE).data,
    }
}

// ---------------------------------------------------------------------------
// Text chat
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_send_text_before_initialize_fails() {
    let (_, adapter) = adapter_with(ScriptedOracle::replying(Ok(OracleReply::text("hi"))));

    let err = adapter.send_text("hello").await.unwrap_err();
    assert_eq!(err, AssistantError::Uninitialized);
    assert_eq!(adapter.mode().await, AssistantMode::Uninitialized);
    assert!(adapter.transcript().await.is_empty());
}

#[tokio::test]
async fn test_send_text_returns_oracle_reply_verbatim() {
    let (_, adapter) = adapter_with(ScriptedOracle::replying(Ok(OracleReply::text("hi"))));
    adapter.initialize(&catalog()).await.unwrap();
    assert_eq!(adapter.mode().await, AssistantMode::TextReady);

    let reply = adapter.send_text("hello").await.unwrap();
    assert_eq!(reply.text, "hi");
    assert!(reply.citations.is_empty());

    let transcript = adapter.transcript().await;
    assert_eq!(transcript.len(), 2);
    assert_eq!(transcript[0].role, ChatRole::User);
    assert_eq!(transcript[0].text, "hello");
    assert_eq!(transcript[1].role, ChatRole::Model);
    assert_eq!(transcript[1].text, "hi");
}

#[tokio::test]
async fn test_citations_are_kept() {
    let citation = Citation {
        title: "Trends".to_string(),
        uri: "https://example.com/trends".to_string(),
    };
    let (_, adapter) = adapter_with(ScriptedOracle::replying(Ok(
        OracleReply::text("Watches are in.").with_citations(vec![citation.clone()]),
    )));
    adapter.initialize(&catalog()).await.unwrap();

    let reply = adapter.send_text("what's trending?").await.unwrap();
    assert_eq!(reply.citations, vec![citation.clone()]);
    assert_eq!(adapter.transcript().await[1].citations, vec![citation]);
}

#[tokio::test]
async fn test_oracle_failure_becomes_fallback_reply() {
    let (_, adapter) = adapter_with(ScriptedOracle::replying(Err(AssistantError::oracle(
        "503 unavailable",
    ))));
    adapter.initialize(&catalog()).await.unwrap();

    let reply = adapter.send_text("hello").await.unwrap();
    assert_eq!(reply.text, FALLBACK_REPLY);
    assert!(reply.is_fallback());
    assert_eq!(adapter.mode().await, AssistantMode::TextReady);
}

#[tokio::test]
async fn test_initialize_enables_grounding_tools_and_catalog() {
    let (oracle, adapter) = adapter_with(ScriptedOracle::default());
    adapter.initialize(&catalog()).await.unwrap();

    let config = oracle.last_config();
    assert_eq!(config.tools, vec![OracleTool::WebSearch, OracleTool::Maps]);
    assert_eq!(config.location, None);
    for product in catalog() {
        assert!(config.system_instruction.contains(&product.name));
        assert!(
            config
                .system_instruction
                .contains(&format!("ID: {}", product.id))
        );
    }
    assert!(config.system_instruction.contains("Unknown"));
}

#[tokio::test]
async fn test_initialize_uses_location_when_available() {
    let location = GeoLocation {
        latitude: 15.35,
        longitude: 44.2,
    };
    let oracle = Arc::new(ScriptedOracle::default());
    let adapter = AssistantAdapter::new(oracle.clone()).with_geolocation(
        Arc::new(FixedLocation(Some(location))),
        Duration::from_secs(1),
    );
    adapter.initialize(&catalog()).await.unwrap();

    assert_eq!(oracle.last_config().location, Some(location));
}

#[tokio::test]
async fn test_geolocation_failure_fails_open() {
    let oracle = Arc::new(ScriptedOracle::default());
    let adapter = AssistantAdapter::new(oracle.clone())
        .with_geolocation(Arc::new(FixedLocation(None)), Duration::from_secs(1));

    adapter.initialize(&catalog()).await.unwrap();
    assert_eq!(oracle.last_config().location, None);
    assert_eq!(adapter.mode().await, AssistantMode::TextReady);
}

#[tokio::test]
async fn test_open_chat_seeds_welcome_once() {
    let (_, adapter) = adapter_with(ScriptedOracle::default());

    let first = adapter.open_chat(Language::Ar).await;
    assert_eq!(first.len(), 1);
    assert_eq!(first[0].id, "welcome");

    let second = adapter.open_chat(Language::En).await;
    assert_eq!(second, first);
}

#[tokio::test]
async fn test_reply_after_shutdown_is_discarded() {
    let gate = Arc::new(Notify::new());
    let oracle = Arc::new(ScriptedOracle::gated(OracleReply::text("late"), gate.clone()));
    let adapter = Arc::new(AssistantAdapter::new(oracle));
    adapter.initialize(&catalog()).await.unwrap();

    let in_flight = {
        let adapter = adapter.clone();
        tokio::spawn(async move { adapter.send_text("hello").await })
    };
    for _ in 0..200 {
        if adapter.transcript().await.len() == 1 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    assert_eq!(adapter.transcript().await.len(), 1);

    adapter.shutdown().await;
    gate.notify_one();

    let reply = in_flight.await.unwrap().unwrap();
    assert_eq!(reply.text, "late");
    assert!(adapter.transcript().await.is_empty());
    assert_eq!(adapter.mode().await, AssistantMode::Uninitialized);
    assert_eq!(
        adapter.send_text("again").await.unwrap_err(),
        AssistantError::Uninitialized
    );
}

#[tokio::test]
async fn test_product_description_fallbacks() {
    let (_, adapter) = adapter_with(ScriptedOracle::generating(Ok(
        "  Timeless precision.  ".to_string()
    )));
    assert_eq!(
        adapter
            .generate_product_description("Aether Chronograph V2", "Watches")
            .await,
        "Timeless precision."
    );

    let (_, adapter) = adapter_with(ScriptedOracle::generating(Ok("   ".to_string())));
    assert_eq!(
        adapter.generate_product_description("X", "Y").await,
        DESCRIPTION_FALLBACK
    );

    let (_, adapter) =
        adapter_with(ScriptedOracle::generating(Err(AssistantError::oracle("down"))));
    assert_eq!(
        adapter.generate_product_description("X", "Y").await,
        DESCRIPTION_FALLBACK
    );
}

// ---------------------------------------------------------------------------
// Voice
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_start_voice_before_initialize_fails() {
    let adapter = AssistantAdapter::new(Arc::new(ScriptedOracle::default()));
    assert_eq!(
        adapter.start_voice().await.unwrap_err(),
        AssistantError::Uninitialized
    );
}

#[tokio::test]
async fn test_start_voice_without_backend_is_setup_error() {
    let (_, adapter) = adapter_with(ScriptedOracle::default());
    adapter.initialize(&catalog()).await.unwrap();

    let err = adapter.start_voice().await.unwrap_err();
    assert!(matches!(err, AssistantError::VoiceSetup(_)));
    assert_eq!(adapter.mode().await, AssistantMode::TextReady);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_voice_uplink_sends_frames_in_order() {
    let rig = voice_rig(MockTransport::default(), MockCapture::default()).await;
    rig.adapter.start_voice().await.unwrap();
    assert_eq!(rig.adapter.mode().await, AssistantMode::VoiceActive);

    let config = rig.transport.configs.lock().unwrap()[0].clone();
    assert_eq!(config.model, "live-model");
    assert_eq!(config.voice_name, "Zephyr");
    assert!(config.system_instruction.is_some());

    rig.capture.push(vec![0.5; 160]);
    rig.capture.push(vec![0.0; 320]);
    rig.capture.push(vec![-0.5; 480]);

    let mut sent = Vec::new();
    wait_until(|| {
        sent.extend(rig.transport.drain_sent());
        sent.len() == 3
    })
    .await;

    assert!(sent.iter().all(|c| c.mime_type == "audio/pcm;rate=16000"));
    let lengths: Vec<usize> = sent.iter().map(|c| c.data.len()).collect();
    assert!(lengths[0] < lengths[1] && lengths[1] < lengths[2]);
    assert!((rig.adapter.volume() - 0.5).abs() < 1e-6);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_voice_downlink_schedules_back_to_back() {
    let rig = voice_rig(MockTransport::default(), MockCapture::default()).await;
    rig.adapter.start_voice().await.unwrap();

    let server = rig.transport.server();
    server.send(LiveEvent::Ready).unwrap();
    server.send(audio_chunk(1.0)).unwrap();
    server.send(audio_chunk(0.5)).unwrap();
    server.send(audio_chunk(2.0)).unwrap();

    wait_until(|| rig.playback.played.lock().unwrap().len() == 3).await;

    let played = rig.playback.played.lock().unwrap().clone();
    let mut cumulative = 0.0;
    for (start, duration) in played {
        assert!((start - cumulative).abs() < 1e-9);
        cumulative += duration;
    }
    assert!((cumulative - 3.5).abs() < 1e-9);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_interruption_flushes_and_restarts_clock() {
    let rig = voice_rig(MockTransport::default(), MockCapture::default()).await;
    rig.adapter.start_voice().await.unwrap();

    let server = rig.transport.server();
    server.send(audio_chunk(1.0)).unwrap();
    server.send(LiveEvent::Interrupted).unwrap();
    server.send(audio_chunk(0.5)).unwrap();

    wait_until(|| rig.playback.played.lock().unwrap().len() == 2).await;

    assert_eq!(rig.playback.flushes.load(Ordering::SeqCst), 1);
    assert_eq!(rig.playback.played.lock().unwrap()[1].0, 0.0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_stop_voice_releases_everything_and_is_idempotent() {
    let rig = voice_rig(MockTransport::default(), MockCapture::default()).await;
    rig.adapter.start_voice().await.unwrap();
    rig.capture.push(vec![0.8; 64]);
    wait_until(|| rig.adapter.volume() > 0.0).await;

    rig.adapter.stop_voice().await;

    assert_eq!(rig.adapter.mode().await, AssistantMode::TextReady);
    assert_eq!(rig.adapter.volume(), 0.0);
    assert!(rig.capture.closed.load(Ordering::SeqCst));
    assert!(rig.playback.closed.load(Ordering::SeqCst));
    assert_eq!(rig.transport.closed.load(Ordering::SeqCst), 1);

    rig.adapter.stop_voice().await;
    assert_eq!(rig.transport.closed.load(Ordering::SeqCst), 1);
    assert_eq!(rig.adapter.mode().await, AssistantMode::TextReady);

    // Text chat still works after voice.
    assert_eq!(rig.adapter.send_text("hi").await.unwrap().text, "ok");
}

#[tokio::test]
async fn test_start_voice_twice_is_rejected() {
    let rig = voice_rig(MockTransport::default(), MockCapture::default()).await;
    rig.adapter.start_voice().await.unwrap();

    assert_eq!(
        rig.adapter.start_voice().await.unwrap_err(),
        AssistantError::VoiceAlreadyActive
    );
    rig.adapter.stop_voice().await;
}

#[tokio::test]
async fn test_start_stopped_while_connecting_keeps_newer_session_devices() {
    let gate = Arc::new(Notify::new());
    let transport = MockTransport {
        gate: StdMutex::new(Some(gate.clone())),
        ..Default::default()
    };
    let rig = voice_rig(transport, MockCapture::default()).await;

    let stale = rig.adapter.start_voice();
    let restart = async {
        wait_until(|| rig.transport.attempts.load(Ordering::SeqCst) == 1).await;
        rig.adapter.stop_voice().await;
        rig.adapter.start_voice().await.unwrap();
        gate.notify_one();
    };
    let (stale, ()) = tokio::join!(stale, restart);

    assert!(matches!(stale.unwrap_err(), AssistantError::VoiceSetup(_)));
    assert_eq!(rig.adapter.mode().await, AssistantMode::VoiceActive);
    assert!(!rig.capture.closed.load(Ordering::SeqCst));
    assert!(rig.capture.frames.lock().unwrap().is_some());
    assert!(!rig.playback.closed.load(Ordering::SeqCst));
    // Only the stale link was closed.
    assert_eq!(rig.transport.closed.load(Ordering::SeqCst), 1);

    rig.adapter.stop_voice().await;
    assert!(rig.capture.closed.load(Ordering::SeqCst));
    assert_eq!(rig.transport.closed.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_microphone_denied_reverts_to_text() {
    let capture = MockCapture {
        deny: true,
        ..Default::default()
    };
    let rig = voice_rig(MockTransport::default(), capture).await;

    let err = rig.adapter.start_voice().await.unwrap_err();
    assert!(err.is_user_actionable());
    assert!(matches!(err, AssistantError::VoiceSetup(_)));
    assert_eq!(rig.adapter.mode().await, AssistantMode::TextReady);
    assert_eq!(rig.transport.closed.load(Ordering::SeqCst), 1);
    assert_eq!(rig.adapter.volume(), 0.0);
}

#[tokio::test]
async fn test_connection_failure_reverts_to_text() {
    let transport = MockTransport {
        fail: true,
        ..Default::default()
    };
    let rig = voice_rig(transport, MockCapture::default()).await;

    let err = rig.adapter.start_voice().await.unwrap_err();
    assert!(matches!(err, AssistantError::VoiceSetup(_)));
    assert_eq!(rig.adapter.mode().await, AssistantMode::TextReady);
    assert!(rig.capture.frames.lock().unwrap().is_none());

    // A later attempt is allowed and fails the same way.
    assert!(matches!(
        rig.adapter.start_voice().await.unwrap_err(),
        AssistantError::VoiceSetup(_)
    ));
}

#[tokio::test]
async fn test_shutdown_stops_voice() {
    let rig = voice_rig(MockTransport::default(), MockCapture::default()).await;
    rig.adapter.start_voice().await.unwrap();

    rig.adapter.shutdown().await;

    assert_eq!(rig.adapter.mode().await, AssistantMode::Uninitialized);
    assert!(rig.capture.closed.load(Ordering::SeqCst));
    assert_eq!(rig.transport.closed.load(Ordering::SeqCst), 1);
}
