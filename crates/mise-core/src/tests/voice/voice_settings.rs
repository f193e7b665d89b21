use crate::voice::VoiceSettings;

use std::time::Duration;

/// WHAT: Default backoff is constant
/// WHY: Matches the fixed two-second retry of the original behaviour
#[test]
fn given_default_settings_when_computing_backoff_then_constant() {
    // Given: Defaults
    let settings = VoiceSettings::default();

    // When / Then: Every attempt waits two seconds
    for attempt in 1..=5 {
        assert_eq!(settings.backoff_for(attempt), Duration::from_secs(2));
    }
}

/// WHAT: A raised ceiling doubles the wait up to the ceiling
/// WHY: Repeated device failures should back off instead of hammering
#[test]
fn given_raised_ceiling_when_computing_backoff_then_doubles_and_caps() {
    // Given: 500ms base, 3s ceiling
    let settings = VoiceSettings {
        error_backoff: Duration::from_millis(500),
        error_backoff_max: Duration::from_secs(3),
        ..Default::default()
    };

    // When / Then: 0.5, 1, 2, 3, 3
    let waits: Vec<_> = (1..=5).map(|a| settings.backoff_for(a).as_millis()).collect();
    assert_eq!(waits, vec![500, 1000, 2000, 3000, 3000]);
}
