use mise_core::{
    CoreResult,
    ports::{CaptureEvent, CaptureMode, CapturePort, CaptureSink, CaptureSubscription},
};

use std::sync::{
    Arc, Mutex, MutexGuard,
    atomic::{AtomicU64, Ordering},
};

use tracing::{debug, error};

struct Listener {
    id: u64,
    mode: CaptureMode,
    sink: CaptureSink,
}

/// Capture backend fed by `> utterance` lines instead of a microphone.
///
/// Behaves like a device that hears exactly what was typed: a single-shot
/// subscription ends after one utterance, a continuous one keeps listening.
#[derive(Default)]
pub struct KeyboardCapture {
    listener: Arc<Mutex<Option<Listener>>>,
    next_id: AtomicU64,
}

impl KeyboardCapture {
    /// Create a backend with no active subscription.
    pub fn new() -> Self {
        Self::default()
    }

    /// Hand an utterance to the active subscription.
    ///
    /// Returns `false` when nothing is listening.
    pub fn deliver(&self, utterance: &str) -> bool {
        let mut guard = lock(&self.listener);
        let Some(listener) = guard.as_ref() else {
            return false;
        };

        debug!(generation = listener.sink.generation(), "Typed utterance delivered");
        listener
            .sink
            .emit(CaptureEvent::Result(vec![utterance.to_string()]));

        if listener.mode == CaptureMode::SingleShot {
            listener.sink.emit(CaptureEvent::Ended);
            *guard = None;
        }
        true
    }

    /// Whether a subscription is waiting for input.
    pub fn is_listening(&self) -> bool {
        lock(&self.listener).is_some()
    }
}

impl CapturePort for KeyboardCapture {
    fn is_available(&self) -> bool {
        true
    }

    fn acquire(
        &self,
        mode: CaptureMode,
        sink: CaptureSink,
    ) -> CoreResult<Box<dyn CaptureSubscription>> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        sink.emit(CaptureEvent::Started);

        *lock(&self.listener) = Some(Listener { id, mode, sink });

        Ok(Box::new(KeyboardSubscription {
            id,
            listener: Arc::clone(&self.listener),
        }))
    }
}

struct KeyboardSubscription {
    id: u64,
    listener: Arc<Mutex<Option<Listener>>>,
}

impl KeyboardSubscription {
    fn release(&self, report_end: bool) {
        // A newer subscription may already own the slot.
        match lock(&self.listener).take_if(|l| l.id == self.id) {
            Some(listener) if report_end => listener.sink.emit(CaptureEvent::Ended),
            _ => {}
        }
    }
}

impl CaptureSubscription for KeyboardSubscription {
    fn stop(&mut self) {
        self.release(true);
    }

    fn abort(&mut self) {
        self.release(false);
    }
}

impl Drop for KeyboardSubscription {
    fn drop(&mut self) {
        self.release(false);
    }
}

fn lock(listener: &Mutex<Option<Listener>>) -> MutexGuard<'_, Option<Listener>> {
    listener.lock().unwrap_or_else(|e| {
        error!("Keyboard capture lock poisoned, recovering: {}", e);
        e.into_inner()
    })
}
