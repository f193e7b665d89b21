/// What a spoken command asks for.
///
/// Matching is by substring on the lower-cased utterance, checked in this
/// order: next, repeat/again, previous/back. Anything else is a question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoiceCommand {
    /// Go to the next step.
    Next,
    /// Read the current step again.
    Repeat,
    /// Go to the previous step.
    Previous,
    /// Ask the model.
    Question(String),
}

impl VoiceCommand {
    /// Classify an utterance.
    pub fn classify(utterance: &str) -> Self {
        let lower = utterance.to_lowercase();

        if lower.contains("next") {
            VoiceCommand::Next
        } else if lower.contains("repeat") || lower.contains("again") {
            VoiceCommand::Repeat
        } else if lower.contains("previous") || lower.contains("back") {
            VoiceCommand::Previous
        } else {
            VoiceCommand::Question(utterance.to_string())
        }
    }
}
