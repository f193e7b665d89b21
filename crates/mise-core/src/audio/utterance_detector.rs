//! Energy-based endpointing of spoken utterances.

use std::time::Duration;

use tracing::{debug, trace};

/// RMS level above which a block counts as speech.
pub const ENERGY_THRESHOLD: f32 = 0.02;
/// Shortest speech worth transcribing.
pub const MIN_SPEECH: Duration = Duration::from_millis(300);
/// Silence that closes an utterance.
pub const TRAILING_SILENCE: Duration = Duration::from_millis(800);

/// Result of feeding a block of samples.
#[derive(Debug, Clone, PartialEq)]
pub enum Endpoint {
    /// No complete utterance yet.
    Pending,
    /// Speech followed by enough silence.
    Utterance(Vec<f32>),
}

/// Accumulates speech and reports an utterance once it is followed by
/// silence. Works at the capture device's own sample rate.
#[derive(Debug)]
pub struct UtteranceDetector {
    speech: Vec<f32>,
    voiced_samples: usize,
    silence_samples: usize,
    min_speech_samples: usize,
    trailing_silence_samples: usize,
    threshold: f32,
}

impl UtteranceDetector {
    pub fn new(sample_rate: u32) -> Self {
        Self::with_threshold(sample_rate, ENERGY_THRESHOLD)
    }

    pub fn with_threshold(sample_rate: u32, threshold: f32) -> Self {
        Self {
            speech: Vec::new(),
            voiced_samples: 0,
            silence_samples: 0,
            min_speech_samples: samples_for(sample_rate, MIN_SPEECH),
            trailing_silence_samples: samples_for(sample_rate, TRAILING_SILENCE),
            threshold,
        }
    }

    /// Whether speech has started since the last reset.
    pub fn in_speech(&self) -> bool {
        !self.speech.is_empty()
    }

    pub fn push(&mut self, samples: &[f32]) -> Endpoint {
        if samples.is_empty() {
            return Endpoint::Pending;
        }

        let energy = rms(samples);
        let is_speech = energy > self.threshold;

        if !self.in_speech() {
            if is_speech {
                trace!(energy, "Speech started");
                self.speech.extend_from_slice(samples);
                self.voiced_samples = samples.len();
                self.silence_samples = 0;
            }
            return Endpoint::Pending;
        }

        self.speech.extend_from_slice(samples);
        if is_speech {
            self.voiced_samples += samples.len();
            self.silence_samples = 0;
        } else {
            self.silence_samples += samples.len();
        }

        if self.silence_samples < self.trailing_silence_samples {
            return Endpoint::Pending;
        }

        if self.voiced_samples < self.min_speech_samples {
            trace!(voiced = self.voiced_samples, "Too short, discarded");
            self.reset();
            return Endpoint::Pending;
        }

        debug!(samples = self.speech.len(), "Utterance complete");
        self.voiced_samples = 0;
        self.silence_samples = 0;
        Endpoint::Utterance(std::mem::take(&mut self.speech))
    }

    /// Flush speech in progress, if it is long enough to transcribe.
    pub fn finish(&mut self) -> Option<Vec<f32>> {
        let long_enough = self.voiced_samples >= self.min_speech_samples;
        let speech = std::mem::take(&mut self.speech);
        self.reset();
        long_enough.then_some(speech)
    }

    pub fn reset(&mut self) {
        self.speech.clear();
        self.voiced_samples = 0;
        self.silence_samples = 0;
    }
}

/// Root mean square level of a block.
pub fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum: f32 = samples.iter().map(|s| s * s).sum();
    (sum / samples.len() as f32).sqrt()
}

fn samples_for(sample_rate: u32, duration: Duration) -> usize {
    (u128::from(sample_rate) * duration.as_millis() / 1000) as usize
}
