use crate::{
    CoreResult, MiseError,
    audio::{Resampler, capture::downmix},
    ports::AudioSinkPort,
};

use std::{
    io::Cursor,
    panic::Location,
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
    thread,
    time::{Duration, Instant},
};

use async_trait::async_trait;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use error_location::ErrorLocation;
use tracing::{debug, error, instrument};

/// Grace period past the expected duration before playback is abandoned.
const PLAYBACK_SLACK: Duration = Duration::from_millis(500);

/// Plays synthesized MP3 speech on the default output device.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpeakerPlayback;

impl SpeakerPlayback {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl AudioSinkPort for SpeakerPlayback {
    #[instrument(skip(self, audio), fields(bytes = audio.len()))]
    async fn play(&self, audio: Vec<u8>) -> CoreResult<()> {
        tokio::task::spawn_blocking(move || play_blocking(&audio))
            .await
            .map_err(|e| MiseError::playback(format!("Playback task failed: {}", e)))?
    }
}

/// Decoded mono PCM.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct DecodedAudio {
    pub(crate) samples: Vec<f32>,
    pub(crate) sample_rate: u32,
}

/// Decode MP3 bytes into mono f32 samples.
#[track_caller]
pub(crate) fn decode_mp3(data: &[u8]) -> CoreResult<DecodedAudio> {
    let mut decoder = minimp3::Decoder::new(Cursor::new(data));
    let mut samples = Vec::new();
    let mut sample_rate = 0u32;

    loop {
        match decoder.next_frame() {
            Ok(frame) => {
                sample_rate = u32::try_from(frame.sample_rate).unwrap_or_default();
                let pcm: Vec<f32> = frame.data.iter().map(|&s| f32::from(s) / 32768.0).collect();
                samples.extend(downmix(&pcm, frame.channels));
            }
            Err(minimp3::Error::Eof) => break,
            Err(e) => {
                return Err(MiseError::PlaybackFailed {
                    reason: format!("MP3 decode error: {}", e),
                    location: ErrorLocation::from(Location::caller()),
                });
            }
        }
    }

    if samples.is_empty() || sample_rate == 0 {
        return Err(MiseError::playback("No audio frames in synthesized speech"));
    }

    Ok(DecodedAudio {
        samples,
        sample_rate,
    })
}

fn play_blocking(audio: &[u8]) -> CoreResult<()> {
    let decoded = decode_mp3(audio)?;

    let device = cpal::default_host()
        .default_output_device()
        .ok_or(MiseError::NoSpeakerFound {
            location: ErrorLocation::from(Location::caller()),
        })?;

    let config: cpal::StreamConfig = device
        .default_output_config()
        .map_err(|e| MiseError::playback(format!("Failed to get output config: {}", e)))?
        .into();

    let samples = if config.sample_rate == decoded.sample_rate {
        decoded.samples
    } else {
        Resampler::new(decoded.sample_rate, config.sample_rate)?.resample(&decoded.samples)?
    };

    let channels = usize::from(config.channels.max(1));
    let total = samples.len();
    let samples = Arc::new(samples);
    let position = Arc::new(AtomicUsize::new(0));
    let finished = Arc::new(AtomicBool::new(false));

    let stream = {
        let samples = Arc::clone(&samples);
        let position = Arc::clone(&position);
        let finished = Arc::clone(&finished);

        device
            .build_output_stream(
                &config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    for frame in data.chunks_mut(channels) {
                        let pos = position.load(Ordering::Relaxed);
                        let sample = match samples.get(pos) {
                            Some(&sample) => {
                                position.store(pos + 1, Ordering::Relaxed);
                                sample
                            }
                            None => {
                                finished.store(true, Ordering::Release);
                                0.0
                            }
                        };
                        frame.fill(sample);
                    }
                },
                |err| {
                    error!("Audio playback error: {}", err);
                },
                None,
            )
            .map_err(|e| MiseError::playback(format!("Failed to build output stream: {}", e)))?
    };

    stream
        .play()
        .map_err(|e| MiseError::playback(format!("Failed to start output stream: {}", e)))?;

    let expected = Duration::from_millis(total as u64 * 1000 / u64::from(config.sample_rate.max(1)));
    let deadline = Instant::now() + expected + PLAYBACK_SLACK;

    while !finished.load(Ordering::Acquire) {
        if Instant::now() > deadline {
            return Err(MiseError::playback("Playback did not finish in time"));
        }
        thread::sleep(Duration::from_millis(50));
    }

    drop(stream);
    debug!(samples = total, "Playback complete");

    Ok(())
}
