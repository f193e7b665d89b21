use crate::{
    CoreResult, MiseError,
    audio::{AudioCapturer, Endpoint, SpeechRecognizer, UtteranceDetector},
    ports::{
        CaptureErrorKind, CaptureEvent, CaptureMode, CapturePort, CaptureSink, CaptureSubscription,
    },
};

use std::{
    panic::Location,
    path::Path,
    sync::{
        Arc, Mutex,
        atomic::{AtomicU8, Ordering},
        mpsc as std_mpsc,
    },
    thread,
    time::{Duration, Instant},
};

use error_location::ErrorLocation;
use tracing::{debug, error, info, instrument, warn};

const POLL_INTERVAL: Duration = Duration::from_millis(50);

const RUNNING: u8 = 0;
const STOPPING: u8 = 1;
const ABORTED: u8 = 2;

/// Speech capture from the default microphone, transcribed locally with
/// Whisper.
///
/// Each subscription runs its own worker thread that records, endpoints,
/// and transcribes. Only one worker is meant to be live at a time; an
/// aborted worker exits at its next poll without reporting anything.
pub struct MicrophoneCapture {
    recognizer: Option<Arc<Mutex<SpeechRecognizer>>>,
    input_present: bool,
    no_speech_timeout: Duration,
}

impl MicrophoneCapture {
    /// Load the Whisper model and probe for an input device.
    ///
    /// A missing model or microphone leaves the port unavailable rather
    /// than failing, so the rest of the app still runs.
    #[instrument(skip(model_path))]
    pub fn new<P: AsRef<Path>>(model_path: P, use_gpu: bool, no_speech_timeout: Duration) -> Self {
        let recognizer = match SpeechRecognizer::load(model_path, use_gpu) {
            Ok(recognizer) => Some(Arc::new(Mutex::new(recognizer))),
            Err(e) => {
                warn!(error = ?e, "Speech recognizer unavailable");
                None
            }
        };

        let input_present = AudioCapturer::input_device_present();
        if !input_present {
            warn!("No microphone found");
        }

        Self {
            recognizer,
            input_present,
            no_speech_timeout,
        }
    }
}

impl CapturePort for MicrophoneCapture {
    fn is_available(&self) -> bool {
        self.recognizer.is_some() && self.input_present
    }

    #[instrument(skip(self, sink), fields(generation = sink.generation()))]
    fn acquire(
        &self,
        mode: CaptureMode,
        sink: CaptureSink,
    ) -> CoreResult<Box<dyn CaptureSubscription>> {
        let recognizer = self.recognizer.clone().ok_or_else(|| MiseError::CapabilityMissing {
            capability: "speech recognition".to_string(),
            location: ErrorLocation::from(Location::caller()),
        })?;

        let control = Arc::new(AtomicU8::new(RUNNING));
        let (ready_tx, ready_rx) = std_mpsc::sync_channel(1);

        let worker = CaptureWorker {
            mode,
            sink,
            recognizer,
            control: Arc::clone(&control),
            no_speech_timeout: self.no_speech_timeout,
        };

        thread::Builder::new()
            .name("mise-capture".to_string())
            .spawn(move || worker.run(ready_tx))
            .map_err(|e| MiseError::device(format!("Failed to spawn capture thread: {}", e)))?;

        // The device is opened on the worker thread; wait for the outcome.
        match ready_rx.recv() {
            Ok(Ok(())) => Ok(Box::new(MicrophoneSubscription { control })),
            Ok(Err(e)) => Err(e),
            Err(_) => Err(MiseError::device("Capture thread exited during startup")),
        }
    }
}

struct MicrophoneSubscription {
    control: Arc<AtomicU8>,
}

impl CaptureSubscription for MicrophoneSubscription {
    fn stop(&mut self) {
        let _ = self
            .control
            .compare_exchange(RUNNING, STOPPING, Ordering::AcqRel, Ordering::Acquire);
    }

    fn abort(&mut self) {
        self.control.store(ABORTED, Ordering::Release);
    }
}

impl Drop for MicrophoneSubscription {
    fn drop(&mut self) {
        self.abort();
    }
}

struct CaptureWorker {
    mode: CaptureMode,
    sink: CaptureSink,
    recognizer: Arc<Mutex<SpeechRecognizer>>,
    control: Arc<AtomicU8>,
    no_speech_timeout: Duration,
}

impl CaptureWorker {
    fn run(self, ready: std_mpsc::SyncSender<CoreResult<()>>) {
        let mut capturer = match AudioCapturer::new().and_then(|mut c| c.start().map(|()| c)) {
            Ok(capturer) => capturer,
            Err(e) => {
                let _ = ready.send(Err(e));
                return;
            }
        };
        let _ = ready.send(Ok(()));

        let generation = self.sink.generation();
        info!(generation, mode = ?self.mode, "Capture worker listening");
        self.sink.emit(CaptureEvent::Started);

        let outcome = self.listen(&mut capturer);
        capturer.stop();

        match outcome {
            Some(Ok(())) => self.sink.emit(CaptureEvent::Ended),
            Some(Err(kind)) => {
                self.sink.emit(CaptureEvent::Error(kind));
                self.sink.emit(CaptureEvent::Ended);
            }
            None => debug!(generation, "Capture worker aborted"),
        }
    }

    /// `None` when aborted; nothing may be reported after an abort.
    fn listen(&self, capturer: &mut AudioCapturer) -> Option<Result<(), CaptureErrorKind>> {
        let sample_rate = capturer.sample_rate();
        let mut detector = UtteranceDetector::new(sample_rate);
        let mut quiet_since = Instant::now();

        loop {
            thread::sleep(POLL_INTERVAL);

            match self.control.load(Ordering::Acquire) {
                ABORTED => return None,
                STOPPING => {
                    // Samples recorded since the last poll belong to the utterance.
                    if let Endpoint::Utterance(speech) = detector.push(&capturer.take_samples()) {
                        return self.deliver(&speech, sample_rate).map(|r| r.map(|_| ()));
                    }
                    return match detector.finish() {
                        Some(speech) => self.deliver(&speech, sample_rate).map(|r| r.map(|_| ())),
                        None => Some(Ok(())),
                    };
                }
                _ => {}
            }

            let samples = capturer.take_samples();
            match detector.push(&samples) {
                Endpoint::Utterance(speech) => {
                    match self.deliver(&speech, sample_rate)? {
                        Ok(true) if self.mode == CaptureMode::SingleShot => return Some(Ok(())),
                        Ok(_) => quiet_since = Instant::now(),
                        Err(kind) => return Some(Err(kind)),
                    }
                }
                Endpoint::Pending if detector.in_speech() => quiet_since = Instant::now(),
                Endpoint::Pending => {
                    if quiet_since.elapsed() >= self.no_speech_timeout {
                        debug!("No speech before timeout");
                        return Some(Err(CaptureErrorKind::NoSpeech));
                    }
                }
            }
        }
    }

    /// Transcribe and emit. `Ok(true)` when a non-empty result was emitted.
    fn deliver(
        &self,
        speech: &[f32],
        sample_rate: u32,
    ) -> Option<Result<bool, CaptureErrorKind>> {
        let text = {
            let mut recognizer = self.recognizer.lock().unwrap_or_else(|e| {
                error!("Recognizer lock poisoned, recovering: {}", e);
                e.into_inner()
            });
            recognizer.transcribe(speech, sample_rate)
        };

        if self.control.load(Ordering::Acquire) == ABORTED {
            return None;
        }

        match text {
            Ok(text) if text.trim().is_empty() => Some(Ok(false)),
            Ok(text) => {
                self.sink.emit(CaptureEvent::Result(vec![text]));
                Some(Ok(true))
            }
            Err(e) => {
                warn!(error = ?e, "Transcription failed");
                Some(Err(CaptureErrorKind::Other(e.to_string())))
            }
        }
    }
}
