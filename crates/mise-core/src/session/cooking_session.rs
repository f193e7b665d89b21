use crate::{CoreResult, MiseError, recipe::Recipe};

use std::{panic::Location, sync::Arc};

use error_location::ErrorLocation;
use uuid::Uuid;

/// Who said a transcript line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// The cook.
    User,
    /// The assistant.
    Assistant,
}

/// One line of the cooking conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptEntry {
    /// Speaker.
    pub role: Role,
    /// What was said.
    pub text: String,
}

/// Outcome of a relative step move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepMove {
    /// The current step changed to this index.
    Moved(usize),
    /// Already on the first step.
    AtStart,
    /// Already on the last step.
    AtEnd,
}

/// Progress through one recipe.
///
/// `current_step` always indexes an existing instruction.
#[derive(Debug, Clone)]
pub struct CookingSession {
    id: Uuid,
    recipe: Arc<Recipe>,
    current_step: usize,
    transcript: Vec<TranscriptEntry>,
}

impl CookingSession {
    /// Begin cooking `recipe` at its first step.
    ///
    /// # Errors
    ///
    /// Returns [`MiseError::EmptyRecipe`] if the recipe has no instructions.
    #[track_caller]
    pub fn new(recipe: Arc<Recipe>) -> CoreResult<Self> {
        if recipe.instructions.is_empty() {
            return Err(MiseError::EmptyRecipe {
                name: recipe.name.clone(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        Ok(Self {
            id: Uuid::new_v4(),
            recipe,
            current_step: 0,
            transcript: Vec::new(),
        })
    }

    /// Identifier used to correlate log lines.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// The recipe being cooked.
    pub fn recipe(&self) -> &Arc<Recipe> {
        &self.recipe
    }

    /// Zero-based current step.
    pub fn current_step(&self) -> usize {
        self.current_step
    }

    /// Whether the current step is the last one.
    pub fn is_last_step(&self) -> bool {
        self.current_step + 1 >= self.recipe.step_count()
    }

    /// `"Step {n}: {text}"` for the current step.
    pub fn current_announcement(&self) -> String {
        self.recipe
            .announce_step(self.current_step)
            .unwrap_or_default()
    }

    /// Move to the next step unless already on the last.
    pub fn advance(&mut self) -> StepMove {
        if self.is_last_step() {
            return StepMove::AtEnd;
        }
        self.current_step += 1;
        StepMove::Moved(self.current_step)
    }

    /// Move to the previous step unless already on the first.
    pub fn retreat(&mut self) -> StepMove {
        if self.current_step == 0 {
            return StepMove::AtStart;
        }
        self.current_step -= 1;
        StepMove::Moved(self.current_step)
    }

    /// Jump to a zero-based step.
    ///
    /// # Errors
    ///
    /// Returns [`MiseError::StepOutOfRange`] and leaves the step unchanged
    /// when `index` is past the last instruction.
    #[track_caller]
    pub fn go_to(&mut self, index: usize) -> CoreResult<()> {
        let len = self.recipe.step_count();
        if index >= len {
            return Err(MiseError::StepOutOfRange {
                index,
                len,
                location: ErrorLocation::from(Location::caller()),
            });
        }
        self.current_step = index;
        Ok(())
    }

    /// Append the cook's words and the reply to the transcript.
    pub fn record(&mut self, user: impl Into<String>, assistant: impl Into<String>) {
        self.transcript.push(TranscriptEntry {
            role: Role::User,
            text: user.into(),
        });
        self.transcript.push(TranscriptEntry {
            role: Role::Assistant,
            text: assistant.into(),
        });
    }

    /// The conversation so far, oldest first.
    pub fn transcript(&self) -> &[TranscriptEntry] {
        &self.transcript
    }
}
