use crate::{CoreResult, MiseError};

use std::panic::Location;

use error_location::ErrorLocation;
use regex::Regex;
use tracing::debug;

/// Wake phrase patterns tolerant of how recognisers mishear "Hey Mise".
pub const DEFAULT_WAKE_PATTERNS: &[&str] = &[
    r"\b(?:hey|hay|hi|hei)[\s,.!-]*(?:mise|meez|meeze|mees|meese|mease|mize|miz)\b",
    r"\b(?:hey|hay)[\s,.!-]*(?:miss|mis|niece|knees|mitts)\b",
    r"\b(?:okay|ok)[\s,.!-]*(?:mise|meez|mees)\b",
];

/// Detects a wake phrase in a transcript and strips it off.
#[derive(Debug, Clone)]
pub struct WakePhraseMatcher {
    patterns: Vec<Regex>,
}

impl WakePhraseMatcher {
    /// Compile case-insensitive wake phrase patterns.
    ///
    /// # Errors
    ///
    /// Returns [`MiseError::InvalidWakePattern`] for the first pattern that
    /// is not a valid regex.
    #[track_caller]
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> CoreResult<Self> {
        let compiled = patterns
            .iter()
            .map(|pattern| {
                let pattern = pattern.as_ref();
                Regex::new(&format!("(?i){}", pattern)).map_err(|source| {
                    MiseError::InvalidWakePattern {
                        pattern: pattern.to_string(),
                        source,
                        location: ErrorLocation::from(Location::caller()),
                    }
                })
            })
            .collect::<CoreResult<Vec<_>>>()?;

        debug!(pattern_count = compiled.len(), "Wake phrase matcher compiled");

        Ok(Self { patterns: compiled })
    }

    /// Matcher for the built-in "Hey Mise" variants.
    ///
    /// # Errors
    ///
    /// Only fails if the built-in patterns are invalid.
    #[track_caller]
    pub fn with_defaults() -> CoreResult<Self> {
        Self::new(DEFAULT_WAKE_PATTERNS)
    }

    /// The command following the earliest wake phrase in `transcript`.
    ///
    /// Returns `None` when no pattern matches. The returned command has the
    /// wake phrase, anything before it, and leading punctuation removed; it
    /// may be empty when the user only said the wake phrase.
    pub fn strip(&self, transcript: &str) -> Option<String> {
        let end = self
            .patterns
            .iter()
            .filter_map(|re| re.find(transcript))
            .min_by_key(|m| (m.start(), std::cmp::Reverse(m.end())))?
            .end();

        let command = transcript[end..]
            .trim_start_matches(|c: char| c.is_whitespace() || c.is_ascii_punctuation())
            .trim_end();

        Some(command.to_string())
    }
}
