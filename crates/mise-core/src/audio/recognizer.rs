use crate::{
    CoreResult,
    audio::{Resampler, SttEngine},
};

use std::{path::Path, time::Instant};

use tracing::{info, instrument};

/// Sample rate Whisper expects.
pub const WHISPER_SAMPLE_RATE: u32 = 16_000;

/// Turns one recorded utterance into text: resample, then transcribe.
pub struct SpeechRecognizer {
    engine: SttEngine,
}

impl SpeechRecognizer {
    /// Load the Whisper model.
    ///
    /// # Errors
    ///
    /// Returns [`crate::MiseError::ModelNotFound`] if the file is missing.
    #[track_caller]
    pub fn load<P: AsRef<Path>>(model_path: P, use_gpu: bool) -> CoreResult<Self> {
        Ok(Self {
            engine: SttEngine::new(model_path, use_gpu)?,
        })
    }

    /// Transcribe mono samples recorded at `sample_rate`.
    ///
    /// Blocks for as long as Whisper takes; call it from a worker thread.
    #[track_caller]
    #[instrument(skip(self, samples))]
    pub fn transcribe(&mut self, samples: &[f32], sample_rate: u32) -> CoreResult<String> {
        let start = Instant::now();

        let transcription = if sample_rate == WHISPER_SAMPLE_RATE {
            self.engine.transcribe(samples)?
        } else {
            let resampled = Resampler::new(sample_rate, WHISPER_SAMPLE_RATE)?.resample(samples)?;
            self.engine.transcribe(&resampled)?
        };

        info!(
            duration_ms = start.elapsed().as_millis(),
            text_len = transcription.len(),
            "Utterance transcribed"
        );

        Ok(transcription)
    }
}
