use crate::audio::{
    Endpoint, UtteranceDetector,
    utterance_detector::{ENERGY_THRESHOLD, rms},
};

const RATE: u32 = 16_000;
// 100ms blocks
const BLOCK: usize = 1_600;

fn speech() -> Vec<f32> {
    vec![0.3; BLOCK]
}

fn silence() -> Vec<f32> {
    vec![0.0; BLOCK]
}

fn feed(detector: &mut UtteranceDetector, block: &[f32], times: usize) -> Vec<Endpoint> {
    (0..times).map(|_| detector.push(block)).collect()
}

/// WHAT: Speech followed by trailing silence yields one utterance
/// WHY: Each spoken command is transcribed once it is finished
#[test]
fn given_speech_then_silence_when_pushing_then_utterance_reported() {
    // Given: 500ms of speech
    let mut detector = UtteranceDetector::new(RATE);
    feed(&mut detector, &speech(), 5);
    assert!(detector.in_speech());

    // When: 800ms of silence
    let endpoints = feed(&mut detector, &silence(), 8);

    // Then: Only the last block completes the utterance, silence included
    assert!(endpoints[..7].iter().all(|e| *e == Endpoint::Pending));
    match &endpoints[7] {
        Endpoint::Utterance(samples) => assert_eq!(samples.len(), 13 * BLOCK),
        Endpoint::Pending => unreachable!("utterance expected"),
    }
    assert!(!detector.in_speech());
}

/// WHAT: Short noise bursts are discarded
/// WHY: A clatter in the kitchen is not a command
#[test]
fn given_short_burst_when_silence_follows_then_discarded() {
    // Given: 100ms burst
    let mut detector = UtteranceDetector::new(RATE);
    detector.push(&speech());

    // When: Trailing silence
    let endpoints = feed(&mut detector, &silence(), 8);

    // Then: Nothing reported, detector reset
    assert!(endpoints.iter().all(|e| *e == Endpoint::Pending));
    assert!(!detector.in_speech());
}

/// WHAT: Leading silence is not buffered
/// WHY: Whisper gets only the speech and what follows it
#[test]
fn given_silence_only_when_pushing_then_nothing_buffered() {
    // Given
    let mut detector = UtteranceDetector::new(RATE);

    // When
    feed(&mut detector, &silence(), 20);

    // Then
    assert!(!detector.in_speech());
    assert_eq!(detector.finish(), None);
}

/// WHAT: finish flushes speech that is long enough
/// WHY: Stopping a single-shot capture mid-sentence still transcribes it
#[test]
fn given_speech_in_progress_when_finishing_then_flushed() {
    // Given: 400ms of speech, no silence yet
    let mut detector = UtteranceDetector::new(RATE);
    feed(&mut detector, &speech(), 4);

    // When
    let flushed = detector.finish();

    // Then
    assert_eq!(flushed.map(|s| s.len()), Some(4 * BLOCK));
    assert!(!detector.in_speech());
}

/// WHAT: RMS of a constant block is its magnitude; empty is zero
/// WHY: The threshold compares against this level
#[test]
fn given_blocks_when_measuring_rms_then_level_matches() {
    // Given / When / Then
    assert!((rms(&[-0.5, 0.5, -0.5, 0.5]) - 0.5).abs() < 1e-6);
    assert!(rms(&[]).abs() < f32::EPSILON);
    assert!(rms(&[0.01; 16]) < ENERGY_THRESHOLD);
}
