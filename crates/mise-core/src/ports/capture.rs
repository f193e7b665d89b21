use crate::{CoreResult, voice::ControllerInput};

use tokio::sync::mpsc;
use tracing::trace;

/// How long a capture subscription keeps listening.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureMode {
    /// One utterance, then stop.
    SingleShot,
    /// Keep listening across utterances (hands-free).
    Continuous,
}

/// Why the capture device reported an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureErrorKind {
    /// Nothing was said before the device timed out.
    NoSpeech,
    /// Any other device failure.
    Other(String),
}

/// Events a capture subscription reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureEvent {
    /// The device began listening.
    Started,
    /// Recognised speech, best alternative first.
    Result(Vec<String>),
    /// The device failed.
    Error(CaptureErrorKind),
    /// The device stopped listening.
    Ended,
}

/// Where a capture subscription delivers its events.
///
/// Events are tagged with the generation of the subscription that produced
/// them, so the controller can discard events from a superseded one.
#[derive(Debug, Clone)]
pub struct CaptureSink {
    generation: u64,
    tx: mpsc::UnboundedSender<ControllerInput>,
}

impl CaptureSink {
    /// Sink delivering events for `generation` into a controller queue.
    pub fn new(generation: u64, tx: mpsc::UnboundedSender<ControllerInput>) -> Self {
        Self { generation, tx }
    }

    /// Generation of the subscription this sink belongs to.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Deliver an event. Safe to call from any thread.
    pub fn emit(&self, event: CaptureEvent) {
        if self
            .tx
            .send(ControllerInput::Capture {
                generation: self.generation,
                event,
            })
            .is_err()
        {
            trace!(generation = self.generation, "Controller gone, capture event dropped");
        }
    }
}

/// An active capture subscription. Dropping it must release the device.
pub trait CaptureSubscription: Send {
    /// Finish the current utterance, then end.
    fn stop(&mut self);

    /// Release the device now and report nothing further.
    fn abort(&mut self);
}

/// The speech capture primitive.
pub trait CapturePort: Send + Sync {
    /// Whether capture works in this environment.
    fn is_available(&self) -> bool;

    /// Start a new subscription delivering events to `sink`.
    ///
    /// # Errors
    ///
    /// Returns an error if the device could not be opened.
    fn acquire(&self, mode: CaptureMode, sink: CaptureSink)
    -> CoreResult<Box<dyn CaptureSubscription>>;
}
