//! Test doubles for the capability ports.

use crate::{
    CoreResult, MiseError,
    ports::{
        AudioSinkPort, CaptureMode, CapturePort, CaptureSink, CaptureSubscription,
        GenerationPort, GenerationRequest, LocalSpeechPort, RemoteSynthesisPort, SpeechOptions,
        VoiceInfo,
    },
    recipe::Recipe,
    session::{CookingSession, SessionHandle},
};

use std::{
    collections::VecDeque,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
};

use async_trait::async_trait;
use tokio::sync::watch;

pub(crate) fn recipe(steps: &[&str]) -> Recipe {
    Recipe {
        name: "Test Omelette".to_string(),
        prep_time: "10min".to_string(),
        ingredients: vec!["2 eggs".to_string(), "50g feta".to_string()],
        instructions: steps.iter().map(|s| s.to_string()).collect(),
        difficulty: "Easy".to_string(),
    }
}

#[allow(clippy::unwrap_used)]
pub(crate) fn session_with(steps: &[&str]) -> SessionHandle {
    let session = CookingSession::new(Arc::new(recipe(steps))).unwrap();
    Arc::new(tokio::sync::Mutex::new(Some(session)))
}

/// Replies from a script, in order; fails once the script runs out.
#[derive(Default)]
pub(crate) struct ScriptedGeneration {
    replies: Mutex<VecDeque<CoreResult<String>>>,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl ScriptedGeneration {
    pub(crate) fn replying(replies: Vec<CoreResult<String>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::default(),
        })
    }

    #[allow(clippy::unwrap_used)]
    pub(crate) fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl GenerationPort for ScriptedGeneration {
    #[allow(clippy::unwrap_used)]
    async fn generate(&self, request: GenerationRequest) -> CoreResult<String> {
        self.requests.lock().unwrap().push(request);
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(MiseError::generation("script exhausted")))
    }
}

/// Capture port that records acquisitions and tracks live subscriptions.
#[derive(Default)]
pub(crate) struct FakeCapture {
    pub(crate) unavailable: AtomicBool,
    pub(crate) fail_acquire: AtomicBool,
    pub(crate) live: Arc<AtomicUsize>,
    sinks: Mutex<Vec<(CaptureMode, CaptureSink)>>,
}

impl FakeCapture {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn unavailable() -> Arc<Self> {
        let capture = Self::default();
        capture.unavailable.store(true, Ordering::SeqCst);
        Arc::new(capture)
    }

    #[allow(clippy::unwrap_used)]
    pub(crate) fn acquisitions(&self) -> Vec<(CaptureMode, CaptureSink)> {
        self.sinks.lock().unwrap().clone()
    }

    #[allow(clippy::unwrap_used)]
    pub(crate) fn latest_sink(&self) -> CaptureSink {
        self.sinks.lock().unwrap().last().unwrap().1.clone()
    }

    pub(crate) fn live(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }
}

impl CapturePort for FakeCapture {
    fn is_available(&self) -> bool {
        !self.unavailable.load(Ordering::SeqCst)
    }

    #[allow(clippy::unwrap_used)]
    fn acquire(
        &self,
        mode: CaptureMode,
        sink: CaptureSink,
    ) -> CoreResult<Box<dyn CaptureSubscription>> {
        self.sinks.lock().unwrap().push((mode, sink));
        if self.fail_acquire.load(Ordering::SeqCst) {
            return Err(MiseError::device("microphone busy"));
        }
        self.live.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeSubscription {
            live: Arc::clone(&self.live),
            released: false,
        }))
    }
}

struct FakeSubscription {
    live: Arc<AtomicUsize>,
    released: bool,
}

impl FakeSubscription {
    fn release(&mut self) {
        if !self.released {
            self.released = true;
            self.live.fetch_sub(1, Ordering::SeqCst);
        }
    }
}

impl CaptureSubscription for FakeSubscription {
    fn stop(&mut self) {
        self.release();
    }

    fn abort(&mut self) {
        self.release();
    }
}

impl Drop for FakeSubscription {
    fn drop(&mut self) {
        self.release();
    }
}

/// Remote synthesis returning fixed bytes or failing.
#[derive(Default)]
pub(crate) struct FakeSynthesis {
    pub(crate) fail: bool,
    pub(crate) inputs: Mutex<Vec<String>>,
}

#[async_trait]
impl RemoteSynthesisPort for FakeSynthesis {
    #[allow(clippy::unwrap_used)]
    async fn synthesize(&self, text: &str) -> CoreResult<Vec<u8>> {
        self.inputs.lock().unwrap().push(text.to_string());
        if self.fail {
            Err(MiseError::synthesis("quota exceeded"))
        } else {
            Ok(vec![0xFF, 0xFB, 0x90])
        }
    }
}

/// Audio sink that records what it was asked to play.
#[derive(Default)]
pub(crate) struct FakeSink {
    pub(crate) fail: bool,
    pub(crate) played: Mutex<Vec<Vec<u8>>>,
}

#[async_trait]
impl AudioSinkPort for FakeSink {
    #[allow(clippy::unwrap_used)]
    async fn play(&self, audio: Vec<u8>) -> CoreResult<()> {
        self.played.lock().unwrap().push(audio);
        if self.fail {
            Err(MiseError::playback("device unplugged"))
        } else {
            Ok(())
        }
    }
}

/// On-device synthesizer whose catalog becomes ready on demand.
pub(crate) struct FakeLocalSpeech {
    pub(crate) available: bool,
    catalog: watch::Sender<Option<Vec<VoiceInfo>>>,
    pub(crate) spoken: Mutex<Vec<(String, SpeechOptions)>>,
}

impl FakeLocalSpeech {
    pub(crate) fn with_catalog(voices: Option<Vec<VoiceInfo>>) -> Arc<Self> {
        Arc::new(Self {
            available: true,
            catalog: watch::Sender::new(voices),
            spoken: Mutex::default(),
        })
    }

    pub(crate) fn publish(&self, voices: Vec<VoiceInfo>) {
        self.catalog.send_replace(Some(voices));
    }

    #[allow(clippy::unwrap_used)]
    pub(crate) fn spoken(&self) -> Vec<(String, SpeechOptions)> {
        self.spoken.lock().unwrap().clone()
    }
}

#[async_trait]
impl LocalSpeechPort for FakeLocalSpeech {
    fn is_available(&self) -> bool {
        self.available
    }

    fn voices(&self) -> Vec<VoiceInfo> {
        self.catalog.borrow().clone().unwrap_or_default()
    }

    async fn voices_ready(&self) {
        let mut rx = self.catalog.subscribe();
        let _ = rx.wait_for(Option::is_some).await;
    }

    #[allow(clippy::unwrap_used)]
    async fn speak(&self, text: &str, options: &SpeechOptions) -> CoreResult<()> {
        self.spoken
            .lock()
            .unwrap()
            .push((text.to_string(), options.clone()));
        Ok(())
    }
}

pub(crate) fn voice(name: &str, language: &str) -> VoiceInfo {
    VoiceInfo {
        name: name.to_string(),
        language: Some(language.to_string()),
    }
}
