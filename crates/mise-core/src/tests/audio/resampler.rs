use crate::{WHISPER_SAMPLE_RATE, audio::Resampler};

const MIC_SAMPLE_RATE: u32 = 44_100;
const SPEECH_SAMPLE_RATE: u32 = 24_000;
const DEVICE_SAMPLE_RATE: u32 = 48_000;
const LENGTH_TOLERANCE: u64 = 200;
const MAX_AMPLITUDE: f32 = 1.5;

fn tone(len: usize, step: f32) -> Vec<f32> {
    (0..len).map(|i| (i as f32 * step).sin() * 0.5).collect()
}

fn close_to(actual: usize, expected: usize) -> bool {
    (actual as i64 - expected as i64).unsigned_abs() < LENGTH_TOLERANCE
}

/// WHAT: One second of 44.1kHz microphone audio becomes ~one second at 16kHz
/// WHY: Whisper only accepts 16kHz and laptop microphones rarely run at it
#[test]
#[allow(clippy::unwrap_used)]
fn given_44khz_microphone_audio_when_resampling_for_whisper_then_length_matches_16khz() {
    // Given
    let mut resampler = Resampler::new(MIC_SAMPLE_RATE, WHISPER_SAMPLE_RATE).unwrap();
    let input = tone(MIC_SAMPLE_RATE as usize, 0.05);

    // When
    let output = resampler.resample(&input).unwrap();

    // Then
    assert!(
        close_to(output.len(), WHISPER_SAMPLE_RATE as usize),
        "Expected ~{} samples, got {}",
        WHISPER_SAMPLE_RATE,
        output.len()
    );
    assert!(output.iter().all(|s| s.is_finite() && s.abs() <= MAX_AMPLITUDE));
}

/// WHAT: 24kHz synthesized speech is upsampled to a 48kHz output device
/// WHY: Remote narration arrives at the voice model's rate, not the speaker's
#[test]
#[allow(clippy::unwrap_used)]
fn given_24khz_speech_when_resampling_for_playback_then_length_doubles() {
    // Given
    let mut resampler = Resampler::new(SPEECH_SAMPLE_RATE, DEVICE_SAMPLE_RATE).unwrap();
    let input = tone(SPEECH_SAMPLE_RATE as usize / 2, 0.1);

    // When
    let output = resampler.resample(&input).unwrap();

    // Then
    assert_eq!(resampler.output_rate(), DEVICE_SAMPLE_RATE);
    assert!(
        close_to(output.len(), input.len() * 2),
        "Expected ~{} samples, got {}",
        input.len() * 2,
        output.len()
    );
    assert!(output.iter().all(|s| s.is_finite()));
}

/// WHAT: An empty recording resamples to nothing
/// WHY: A capture stopped before any audio arrived must not fail recognition
#[test]
#[allow(clippy::unwrap_used)]
fn given_no_samples_when_resampling_then_output_is_empty() {
    // Given
    let mut resampler = Resampler::new(DEVICE_SAMPLE_RATE, WHISPER_SAMPLE_RATE).unwrap();

    // When
    let output = resampler.resample(&[]).unwrap();

    // Then
    assert!(output.is_empty());
}
