use crate::{CoreResult, MiseError};

use std::panic::Location;

use audioadapter_buffers::direct::InterleavedSlice;
use error_location::ErrorLocation;
use rubato::{Fft, FixedSync, Resampler as RubatoResampler};
use tracing::{debug, instrument};

const CHUNK_SIZE: usize = 1024;
const SUB_CHUNKS: usize = 2;

/// Mono sample rate converter.
///
/// Used in both directions: microphone audio down to Whisper's 16kHz, and
/// decoded speech up to the output device rate.
pub struct Resampler {
    resampler: Fft<f32>,
    input_rate: u32,
    output_rate: u32,
}

impl Resampler {
    #[track_caller]
    #[instrument]
    pub fn new(input_rate: u32, output_rate: u32) -> CoreResult<Self> {
        let resampler = Fft::<f32>::new(
            input_rate as usize,
            output_rate as usize,
            CHUNK_SIZE,
            SUB_CHUNKS,
            1,
            FixedSync::Input,
        )
        .map_err(|e| resampling_error(format!("Failed to create resampler: {}", e)))?;

        debug!(input_rate, output_rate, "Resampler initialized");

        Ok(Self {
            resampler,
            input_rate,
            output_rate,
        })
    }

    pub fn output_rate(&self) -> u32 {
        self.output_rate
    }

    #[track_caller]
    #[instrument(skip(self, samples))]
    pub fn resample(&mut self, samples: &[f32]) -> CoreResult<Vec<f32>> {
        if samples.is_empty() {
            return Ok(Vec::new());
        }

        let estimated_len =
            (samples.len() as f64 * self.output_rate as f64 / self.input_rate as f64) as usize;
        let mut output = Vec::with_capacity(estimated_len);
        let output_frames = self.resampler.output_frames_max();
        let mut output_chunk = vec![0.0f32; output_frames];

        for chunk in samples.chunks(CHUNK_SIZE) {
            let mut input_chunk = chunk.to_vec();
            input_chunk.resize(CHUNK_SIZE, 0.0);

            let input_adapter = InterleavedSlice::new(&input_chunk, 1, CHUNK_SIZE)
                .map_err(|e| resampling_error(format!("Failed to create input adapter: {}", e)))?;

            let mut output_adapter = InterleavedSlice::new_mut(&mut output_chunk, 1, output_frames)
                .map_err(|e| resampling_error(format!("Failed to create output adapter: {}", e)))?;

            let (_input_frames, written) = self
                .resampler
                .process_into_buffer(&input_adapter, &mut output_adapter, None)
                .map_err(|e| resampling_error(format!("Resampling failed: {}", e)))?;

            output.extend_from_slice(&output_chunk[..written]);
        }

        output.truncate(estimated_len);

        debug!(
            input_len = samples.len(),
            output_len = output.len(),
            input_rate = self.input_rate,
            output_rate = self.output_rate,
            "Resampled audio"
        );

        Ok(output)
    }
}

#[track_caller]
fn resampling_error(reason: String) -> MiseError {
    MiseError::ResamplingError {
        reason,
        location: ErrorLocation::from(Location::caller()),
    }
}
