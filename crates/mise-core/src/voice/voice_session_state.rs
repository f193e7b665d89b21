//! The voice session state machine.
//!
//! [`VoiceSessionState::apply`] is the single transition function. It never
//! performs I/O; it returns the [`VoiceEffect`]s the controller must carry
//! out, in order.

use crate::{
    ports::{CaptureErrorKind, CaptureEvent, CaptureMode},
    voice::{VoiceSettings, WakePhraseMatcher},
};

use std::{fmt, time::Duration};

use tracing::{debug, trace, warn};

/// Which kind of voice input is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VoiceMode {
    /// Voice input is off.
    #[default]
    Off,
    /// One utterance, treated as a command.
    SingleShot,
    /// Continuous listening, commands gated by the wake phrase.
    HandsFree,
}

impl VoiceMode {
    fn capture_mode(self) -> CaptureMode {
        match self {
            VoiceMode::HandsFree => CaptureMode::Continuous,
            VoiceMode::Off | VoiceMode::SingleShot => CaptureMode::SingleShot,
        }
    }
}

/// What the controller is doing right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VoicePhase {
    /// Nothing in progress.
    #[default]
    Idle,
    /// Waiting for speech.
    Listening,
    /// Handling a command.
    Processing,
}

/// Read-only view of the controller for rendering status text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VoiceStatus {
    /// Active mode.
    pub mode: VoiceMode,
    /// Current phase.
    pub phase: VoicePhase,
}

impl fmt::Display for VoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match (self.mode, self.phase) {
            (_, VoicePhase::Processing) => "Thinking...",
            (VoiceMode::HandsFree, _) => "Hands-free: say \"Hey Mise\" and then your question",
            (VoiceMode::SingleShot, _) => "Listening...",
            (VoiceMode::Off, _) => "Voice input off",
        };
        f.write_str(text)
    }
}

/// Inputs to the state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoiceEvent {
    /// User asked for voice input in a mode. `Off` behaves like [`VoiceEvent::Stop`].
    Start(VoiceMode),
    /// User cancelled voice input.
    Stop,
    /// `start` was requested but capture is unsupported here.
    Unsupported,
    /// The capture device reported an event.
    Capture {
        /// Generation of the subscription that produced the event.
        generation: u64,
        /// What happened.
        event: CaptureEvent,
    },
    /// Opening the capture device failed.
    AcquireFailed {
        /// Generation the acquisition was made under.
        generation: u64,
        /// Why it failed.
        reason: String,
    },
    /// Command dispatch, including the spoken reply, finished.
    DispatchDone,
    /// A scheduled resubscription timer fired.
    RestartDue {
        /// Generation the timer was scheduled under.
        generation: u64,
    },
}

/// Work the controller performs after a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoiceEffect {
    /// Abort any existing subscription, then open a new one.
    Acquire {
        /// Device mode.
        mode: CaptureMode,
        /// Tag for the new subscription's events.
        generation: u64,
    },
    /// Cancel the active subscription immediately.
    Abort,
    /// Let the active subscription end gracefully.
    Release,
    /// Handle a command.
    Dispatch(String),
    /// Resubscribe after a delay.
    ScheduleRestart {
        /// How long to wait.
        delay: Duration,
        /// Generation the restart belongs to.
        generation: u64,
    },
    /// Discard any pending restart timer.
    CancelRestart,
    /// Tell the user capture is unsupported.
    ReportCapabilityMissing,
    /// Tell the user hands-free gave up after repeated device errors.
    ReportRetriesExhausted {
        /// Consecutive errors seen.
        attempts: u32,
    },
}

/// The controller's entire mutable state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VoiceSessionState {
    mode: VoiceMode,
    phase: VoicePhase,
    pending_restart: bool,
    generation: u64,
    error_streak: u32,
    unsupported_reported: bool,
}

impl VoiceSessionState {
    /// Active mode.
    pub fn mode(&self) -> VoiceMode {
        self.mode
    }

    /// Current phase.
    pub fn phase(&self) -> VoicePhase {
        self.phase
    }

    /// Whether a resubscription timer is outstanding.
    pub fn pending_restart(&self) -> bool {
        self.pending_restart
    }

    /// Current subscription generation.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Consecutive unexpected device errors in hands-free mode.
    pub fn error_streak(&self) -> u32 {
        self.error_streak
    }

    /// Snapshot for rendering.
    pub fn status(&self) -> VoiceStatus {
        VoiceStatus {
            mode: self.mode,
            phase: self.phase,
        }
    }

    /// Apply one event and return the effects to execute, in order.
    pub fn apply(
        &mut self,
        event: VoiceEvent,
        wake: &WakePhraseMatcher,
        settings: &VoiceSettings,
    ) -> Vec<VoiceEffect> {
        match event {
            VoiceEvent::Start(VoiceMode::Off) | VoiceEvent::Stop => self.stop(),
            VoiceEvent::Start(mode) => self.start(mode),
            VoiceEvent::Unsupported => self.unsupported(),
            VoiceEvent::Capture { generation, event } => {
                if generation != self.generation {
                    trace!(generation, current = self.generation, "Stale capture event ignored");
                    return Vec::new();
                }
                self.on_capture(event, wake, settings)
            }
            VoiceEvent::AcquireFailed { generation, reason } => {
                if generation != self.generation {
                    return Vec::new();
                }
                self.on_capture(
                    CaptureEvent::Error(CaptureErrorKind::Other(reason)),
                    wake,
                    settings,
                )
            }
            VoiceEvent::DispatchDone => self.on_dispatch_done(settings),
            VoiceEvent::RestartDue { generation } => self.on_restart_due(generation),
        }
    }

    fn start(&mut self, mode: VoiceMode) -> Vec<VoiceEffect> {
        debug!(?mode, previous = ?self.mode, "Voice input starting");

        self.mode = mode;
        self.phase = VoicePhase::Listening;
        self.pending_restart = false;
        self.error_streak = 0;

        vec![VoiceEffect::CancelRestart, self.next_acquisition()]
    }

    fn stop(&mut self) -> Vec<VoiceEffect> {
        debug!(mode = ?self.mode, "Voice input stopping");

        self.mode = VoiceMode::Off;
        self.phase = VoicePhase::Idle;
        self.pending_restart = false;
        self.error_streak = 0;
        // Invalidates any timer or late device event from before the stop.
        self.generation += 1;

        vec![VoiceEffect::CancelRestart, VoiceEffect::Abort]
    }

    fn unsupported(&mut self) -> Vec<VoiceEffect> {
        self.mode = VoiceMode::Off;
        self.phase = VoicePhase::Idle;
        self.pending_restart = false;

        if self.unsupported_reported {
            return Vec::new();
        }
        self.unsupported_reported = true;
        vec![VoiceEffect::ReportCapabilityMissing]
    }

    fn next_acquisition(&mut self) -> VoiceEffect {
        self.generation += 1;
        VoiceEffect::Acquire {
            mode: self.mode.capture_mode(),
            generation: self.generation,
        }
    }

    fn finish_single_shot(&mut self) -> Vec<VoiceEffect> {
        self.mode = VoiceMode::Off;
        self.phase = VoicePhase::Idle;
        vec![VoiceEffect::Release]
    }

    fn schedule_restart(&mut self, delay: Duration) -> Vec<VoiceEffect> {
        if self.pending_restart {
            return Vec::new();
        }
        self.pending_restart = true;
        vec![VoiceEffect::ScheduleRestart {
            delay,
            generation: self.generation,
        }]
    }

    fn on_capture(
        &mut self,
        event: CaptureEvent,
        wake: &WakePhraseMatcher,
        settings: &VoiceSettings,
    ) -> Vec<VoiceEffect> {
        if self.phase != VoicePhase::Listening {
            trace!(?event, phase = ?self.phase, "Capture event outside listening ignored");
            return Vec::new();
        }

        match event {
            CaptureEvent::Started => Vec::new(),
            CaptureEvent::Result(alternatives) => {
                let transcript = alternatives
                    .first()
                    .map(|t| t.trim().to_string())
                    .unwrap_or_default();
                self.on_transcript(transcript, wake)
            }
            CaptureEvent::Error(kind) => self.on_device_error(kind, settings),
            CaptureEvent::Ended => match self.mode {
                VoiceMode::HandsFree => self.schedule_restart(settings.end_restart_delay),
                VoiceMode::SingleShot => self.finish_single_shot(),
                VoiceMode::Off => Vec::new(),
            },
        }
    }

    fn on_transcript(&mut self, transcript: String, wake: &WakePhraseMatcher) -> Vec<VoiceEffect> {
        if transcript.is_empty() {
            return Vec::new();
        }

        let command = match self.mode {
            VoiceMode::SingleShot => transcript,
            VoiceMode::HandsFree => match wake.strip(&transcript) {
                Some(command) if !command.is_empty() => command,
                Some(_) => {
                    debug!("Wake phrase without a command");
                    return Vec::new();
                }
                None => {
                    trace!(transcript = %transcript, "No wake phrase, still listening");
                    return Vec::new();
                }
            },
            VoiceMode::Off => return Vec::new(),
        };

        // Processing must be set before the capture is aborted so the
        // abort's own end event cannot schedule a restart.
        self.phase = VoicePhase::Processing;
        self.error_streak = 0;
        // Anything the aborted subscription already queued is stale from here.
        self.generation += 1;
        self.pending_restart = false;

        vec![VoiceEffect::Abort, VoiceEffect::Dispatch(command)]
    }

    fn on_device_error(
        &mut self,
        kind: CaptureErrorKind,
        settings: &VoiceSettings,
    ) -> Vec<VoiceEffect> {
        match (self.mode, kind) {
            (VoiceMode::SingleShot, kind) => {
                debug!(?kind, "Single-shot capture failed");
                self.finish_single_shot()
            }
            (VoiceMode::HandsFree, CaptureErrorKind::NoSpeech) => {
                self.schedule_restart(settings.no_speech_retry_delay)
            }
            (VoiceMode::HandsFree, CaptureErrorKind::Other(reason)) => {
                self.error_streak += 1;

                if let Some(max) = settings.max_error_retries
                    && self.error_streak > max
                {
                    let attempts = self.error_streak;
                    warn!(attempts, reason = %reason, "Hands-free capture giving up");
                    let mut effects = self.stop();
                    effects.push(VoiceEffect::ReportRetriesExhausted { attempts });
                    return effects;
                }

                let delay = settings.backoff_for(self.error_streak);
                warn!(
                    attempt = self.error_streak,
                    delay_ms = delay.as_millis(),
                    reason = %reason,
                    "Capture error, re-acquiring after backoff"
                );

                // Late events from the failed device must not shorten the
                // backoff or dispatch; this replaces any shorter pending restart.
                self.generation += 1;
                self.pending_restart = true;
                vec![
                    VoiceEffect::Abort,
                    VoiceEffect::ScheduleRestart {
                        delay,
                        generation: self.generation,
                    },
                ]
            }
            (VoiceMode::Off, _) => Vec::new(),
        }
    }

    fn on_dispatch_done(&mut self, settings: &VoiceSettings) -> Vec<VoiceEffect> {
        if self.phase != VoicePhase::Processing {
            return Vec::new();
        }

        match self.mode {
            VoiceMode::HandsFree => {
                self.phase = VoicePhase::Listening;
                self.schedule_restart(settings.post_speech_delay)
            }
            VoiceMode::SingleShot | VoiceMode::Off => {
                self.mode = VoiceMode::Off;
                self.phase = VoicePhase::Idle;
                Vec::new()
            }
        }
    }

    fn on_restart_due(&mut self, generation: u64) -> Vec<VoiceEffect> {
        if generation != self.generation
            || !self.pending_restart
            || self.mode != VoiceMode::HandsFree
            || self.phase == VoicePhase::Processing
        {
            trace!(generation, current = self.generation, "Restart timer ignored");
            return Vec::new();
        }

        self.pending_restart = false;
        self.phase = VoicePhase::Listening;
        vec![self.next_acquisition()]
    }
}
