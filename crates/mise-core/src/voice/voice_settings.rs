use std::time::Duration;

/// Timing and retry policy for the voice session controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceSettings {
    /// Pause after a reply before listening again, so the assistant does
    /// not hear itself.
    pub post_speech_delay: Duration,
    /// Resubscribe delay after a no-speech timeout.
    pub no_speech_retry_delay: Duration,
    /// Resubscribe delay after the device ends on its own.
    pub end_restart_delay: Duration,
    /// First backoff after an unexpected device error.
    pub error_backoff: Duration,
    /// Ceiling for the doubling backoff.
    pub error_backoff_max: Duration,
    /// Consecutive device errors tolerated before hands-free gives up.
    /// `None` retries forever.
    pub max_error_retries: Option<u32>,
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            post_speech_delay: Duration::from_millis(1000),
            no_speech_retry_delay: Duration::from_millis(300),
            end_restart_delay: Duration::from_millis(300),
            error_backoff: Duration::from_millis(2000),
            error_backoff_max: Duration::from_millis(2000),
            max_error_retries: None,
        }
    }
}

impl VoiceSettings {
    /// Backoff before the `attempt`-th retry (1-based) after device errors.
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        let ceiling = self.error_backoff_max.max(self.error_backoff);
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.error_backoff.saturating_mul(factor).min(ceiling)
    }
}
