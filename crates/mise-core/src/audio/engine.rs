use crate::{CoreResult, MiseError};

use std::{panic::Location, path::Path, sync::LazyLock};

use error_location::ErrorLocation;
use regex::Regex;
use tracing::{debug, info, instrument};
use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters};

/// Biases decoding toward the words a cook actually says.
const KITCHEN_PROMPT: &str =
    "Hey Mise, next step. Repeat that. Go back. How long do I simmer the onions?";

// Whisper annotates silence and background noise as `[BLANK_AUDIO]`, `(water running)`.
static ANNOTATION: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"\[[^\]]*\]|\([^)]*\)|\*[^*]*\*").ok());

/// Whisper speech-to-text over 16kHz mono samples.
pub struct SttEngine {
    ctx: WhisperContext,
}

impl SttEngine {
    #[track_caller]
    #[instrument(skip(model_path))]
    pub fn new<P: AsRef<Path>>(model_path: P, use_gpu: bool) -> CoreResult<Self> {
        let path = model_path.as_ref();
        let Some(path_str) = path.to_str().filter(|_| path.exists()) else {
            return Err(MiseError::ModelNotFound {
                path: path.to_path_buf(),
                location: ErrorLocation::from(Location::caller()),
            });
        };

        let mut params = WhisperContextParameters::default();
        params.use_gpu(use_gpu);

        let ctx = WhisperContext::new_with_params(path_str, params)
            .map_err(|e| transcription_failed(Box::new(e)))?;

        info!(model_path = ?path, use_gpu, "Whisper model loaded");

        Ok(Self { ctx })
    }

    /// Transcribe one short utterance, dropping non-speech annotations.
    #[track_caller]
    #[instrument(skip(self, samples))]
    pub fn transcribe(&mut self, samples: &[f32]) -> CoreResult<String> {
        if samples.is_empty() {
            return Err(MiseError::NoAudioCaptured {
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let mut params = FullParams::new(SamplingStrategy::Greedy { best_of: 1 });
        params.set_language(Some("en"));
        params.set_initial_prompt(KITCHEN_PROMPT);
        params.set_no_context(true);
        params.set_single_segment(true);
        params.set_suppress_blank(true);
        params.set_suppress_nst(true);
        params.set_print_progress(false);
        params.set_print_special(false);
        params.set_print_realtime(false);
        params.set_print_timestamps(false);

        let mut state = self.ctx.create_state().map_err(|e| transcription_failed(Box::new(e)))?;
        state.full(params, samples).map_err(|e| transcription_failed(Box::new(e)))?;

        let segments = (0..state.full_n_segments())
            .map(|i| {
                state
                    .get_segment(i)
                    .map(|segment| segment.to_string())
                    .ok_or_else(|| transcription_failed(format!("Failed to get segment {}", i).into()))
            })
            .collect::<CoreResult<Vec<_>>>()?;

        let transcription = clean_transcript(&segments.join(" "));

        debug!(
            sample_count = samples.len(),
            segment_count = segments.len(),
            text_len = transcription.len(),
            "Transcription complete"
        );

        Ok(transcription)
    }
}

#[track_caller]
fn transcription_failed(source: Box<dyn std::error::Error + Send + Sync>) -> MiseError {
    MiseError::TranscriptionFailed {
        source,
        location: ErrorLocation::from(Location::caller()),
    }
}

/// Strip bracketed annotations and collapse whitespace.
///
/// An utterance that was only noise comes back empty.
pub(crate) fn clean_transcript(raw: &str) -> String {
    let stripped = match ANNOTATION.as_ref() {
        Some(annotation) => annotation.replace_all(raw, " "),
        None => raw.into(),
    };
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}
