use crate::{
    narration::NarrationService,
    ports::{CaptureEvent, CapturePort, CaptureSink, CaptureSubscription},
    session::CookingAssistant,
    voice::{
        RestartTimer, VoiceEffect, VoiceEvent, VoiceMode, VoiceSessionState, VoiceSettings,
        VoiceStatus, WakePhraseMatcher,
    },
};

use std::{collections::VecDeque, sync::Arc};

use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, instrument, warn};

/// Messages consumed by the controller task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControllerInput {
    /// Begin voice input in a mode.
    Start(VoiceMode),
    /// Cancel voice input.
    Stop,
    /// Event from a capture subscription.
    Capture {
        /// Generation of the subscription that produced it.
        generation: u64,
        /// The event.
        event: CaptureEvent,
    },
    /// A restart timer fired.
    RestartDue {
        /// Generation the timer was scheduled under.
        generation: u64,
    },
    /// Stop and exit the controller task.
    Shutdown,
}

/// Things the user should be told about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoiceNotice {
    /// Speech capture does not work in this environment.
    CapabilityMissing,
    /// Hands-free mode stopped after repeated device errors.
    RetriesExhausted {
        /// Consecutive errors seen.
        attempts: u32,
    },
    /// A command was handled.
    Exchange {
        /// What the user said (wake phrase removed).
        user: String,
        /// What the assistant replied.
        assistant: String,
    },
}

/// Cloneable handle for driving the controller from the UI.
#[derive(Debug, Clone)]
pub struct VoiceHandle {
    tx: mpsc::UnboundedSender<ControllerInput>,
    status_rx: watch::Receiver<VoiceStatus>,
}

impl VoiceHandle {
    /// Start voice input in `mode`.
    pub fn start(&self, mode: VoiceMode) {
        self.send(ControllerInput::Start(mode));
    }

    /// Cancel voice input and any pending restart.
    pub fn stop(&self) {
        self.send(ControllerInput::Stop);
    }

    /// Turn hands-free mode on, or off if it is already on.
    pub fn toggle_hands_free(&self) {
        if self.status().mode == VoiceMode::HandsFree {
            self.stop();
        } else {
            self.start(VoiceMode::HandsFree);
        }
    }

    /// Ask the controller task to exit.
    pub fn shutdown(&self) {
        self.send(ControllerInput::Shutdown);
    }

    /// Latest published status.
    pub fn status(&self) -> VoiceStatus {
        *self.status_rx.borrow()
    }

    /// Receiver that is notified on every status change.
    pub fn subscribe(&self) -> watch::Receiver<VoiceStatus> {
        self.status_rx.clone()
    }

    fn send(&self, input: ControllerInput) {
        if self.tx.send(input).is_err() {
            warn!("Voice controller is not running");
        }
    }
}

/// Owns the voice session state and carries out its effects.
///
/// Runs as a single task: each input, including command dispatch and the
/// spoken reply, is handled to completion before the next one is read.
pub struct VoiceSessionController {
    state: VoiceSessionState,
    settings: VoiceSettings,
    wake: WakePhraseMatcher,
    capture: Arc<dyn CapturePort>,
    assistant: CookingAssistant,
    narration: Arc<NarrationService>,
    subscription: Option<Box<dyn CaptureSubscription>>,
    restart: RestartTimer,
    tx: mpsc::UnboundedSender<ControllerInput>,
    rx: mpsc::UnboundedReceiver<ControllerInput>,
    status_tx: watch::Sender<VoiceStatus>,
    notices_tx: mpsc::UnboundedSender<VoiceNotice>,
}

impl VoiceSessionController {
    /// Create a controller, its UI handle, and the notice stream.
    pub fn new(
        capture: Arc<dyn CapturePort>,
        assistant: CookingAssistant,
        narration: Arc<NarrationService>,
        wake: WakePhraseMatcher,
        settings: VoiceSettings,
    ) -> (Self, VoiceHandle, mpsc::UnboundedReceiver<VoiceNotice>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let (status_tx, status_rx) = watch::channel(VoiceStatus::default());
        let (notices_tx, notices_rx) = mpsc::unbounded_channel();

        let handle = VoiceHandle {
            tx: tx.clone(),
            status_rx,
        };

        let controller = Self {
            state: VoiceSessionState::default(),
            settings,
            wake,
            capture,
            assistant,
            narration,
            subscription: None,
            restart: RestartTimer::default(),
            tx,
            rx,
            status_tx,
            notices_tx,
        };

        (controller, handle, notices_rx)
    }

    /// Process inputs until shutdown.
    #[instrument(skip(self))]
    pub async fn run(mut self) {
        info!("Voice controller started");

        while let Some(input) = self.rx.recv().await {
            if !self.handle(input).await {
                break;
            }
        }

        self.release_all();
        info!("Voice controller stopped");
    }

    /// Current state.
    pub fn state(&self) -> &VoiceSessionState {
        &self.state
    }

    /// Whether a capture subscription is currently held.
    pub fn has_subscription(&self) -> bool {
        self.subscription.is_some()
    }

    pub(crate) fn restart_scheduled(&self) -> bool {
        self.restart.is_scheduled()
    }

    /// Next queued input (timer firings and capture events land here too).
    pub(crate) async fn next_input(&mut self) -> Option<ControllerInput> {
        self.rx.recv().await
    }

    /// Handle one input. Returns `false` once shutdown was requested.
    pub(crate) async fn handle(&mut self, input: ControllerInput) -> bool {
        let event = match input {
            ControllerInput::Start(mode) if mode != VoiceMode::Off => {
                if self.capture.is_available() {
                    VoiceEvent::Start(mode)
                } else {
                    VoiceEvent::Unsupported
                }
            }
            ControllerInput::Start(_) | ControllerInput::Stop => VoiceEvent::Stop,
            ControllerInput::Capture { generation, event } => {
                VoiceEvent::Capture { generation, event }
            }
            ControllerInput::RestartDue { generation } => VoiceEvent::RestartDue { generation },
            ControllerInput::Shutdown => {
                self.process(VoiceEvent::Stop).await;
                return false;
            }
        };

        self.process(event).await;
        true
    }

    async fn process(&mut self, event: VoiceEvent) {
        let mut queue = VecDeque::from([event]);

        while let Some(event) = queue.pop_front() {
            let effects = self.state.apply(event, &self.wake, &self.settings);
            self.publish_status();

            for effect in effects {
                if let Some(follow_up) = self.execute(effect).await {
                    queue.push_back(follow_up);
                }
            }
        }

        self.publish_status();
    }

    async fn execute(&mut self, effect: VoiceEffect) -> Option<VoiceEvent> {
        match effect {
            VoiceEffect::Acquire { mode, generation } => {
                // Superseded subscriptions are aborted, never stopped gracefully.
                self.abort_subscription();

                let sink = CaptureSink::new(generation, self.tx.clone());
                match self.capture.acquire(mode, sink) {
                    Ok(subscription) => {
                        debug!(?mode, generation, "Capture acquired");
                        self.subscription = Some(subscription);
                        None
                    }
                    Err(e) => {
                        warn!(error = ?e, generation, "Capture acquisition failed");
                        Some(VoiceEvent::AcquireFailed {
                            generation,
                            reason: e.to_string(),
                        })
                    }
                }
            }
            VoiceEffect::Abort => {
                self.abort_subscription();
                None
            }
            VoiceEffect::Release => {
                if let Some(mut subscription) = self.subscription.take() {
                    subscription.stop();
                }
                None
            }
            VoiceEffect::Dispatch(command) => {
                self.dispatch(&command).await;
                Some(VoiceEvent::DispatchDone)
            }
            VoiceEffect::ScheduleRestart { delay, generation } => {
                self.restart.schedule(delay, generation, self.tx.clone());
                None
            }
            VoiceEffect::CancelRestart => {
                self.restart.cancel();
                None
            }
            VoiceEffect::ReportCapabilityMissing => {
                error!("Speech capture is not supported in this environment");
                self.notify(VoiceNotice::CapabilityMissing);
                None
            }
            VoiceEffect::ReportRetriesExhausted { attempts } => {
                self.notify(VoiceNotice::RetriesExhausted { attempts });
                None
            }
        }
    }

    #[instrument(skip(self))]
    async fn dispatch(&mut self, command: &str) {
        let exchange = self.assistant.respond(command).await;

        self.notify(VoiceNotice::Exchange {
            user: exchange.user,
            assistant: exchange.assistant.clone(),
        });

        if let Err(e) = self.narration.speak(&exchange.assistant).await {
            warn!(error = ?e, "Reply playback failed");
        }
    }

    fn abort_subscription(&mut self) {
        if let Some(mut subscription) = self.subscription.take() {
            subscription.abort();
        }
    }

    fn release_all(&mut self) {
        self.restart.cancel();
        self.abort_subscription();
        self.publish_status();
    }

    fn publish_status(&self) {
        let status = self.state.status();
        self.status_tx.send_if_modified(|current| {
            if *current == status {
                false
            } else {
                *current = status;
                true
            }
        });
    }

    fn notify(&self, notice: VoiceNotice) {
        if self.notices_tx.send(notice).is_err() {
            debug!("No listener for voice notices");
        }
    }
}
