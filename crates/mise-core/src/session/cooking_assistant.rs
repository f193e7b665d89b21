use crate::{
    CoreResult, MiseError,
    ports::{GenerationPort, GenerationRequest},
    recipe::{Photo, Recipe, prompt_builder},
    session::{CookingSession, StepMove, VoiceCommand},
};

use std::{panic::Location, sync::Arc};

use error_location::ErrorLocation;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// The cooking session shared between the view and the voice controller.
pub type SessionHandle = Arc<Mutex<Option<CookingSession>>>;

/// Reply when "next" is asked on the last step.
pub const END_OF_RECIPE_REPLY: &str = "That was the last step. Enjoy your meal!";
/// Reply when "previous" is asked on the first step.
pub const START_OF_RECIPE_REPLY: &str = "You're already on the first step.";
/// Reply when a command arrives outside a cooking session.
pub const NO_SESSION_REPLY: &str = "Pick a recipe and start cooking first.";
/// Reply when the model returned nothing usable.
pub const EMPTY_ANSWER_REPLY: &str = "Sorry, I could not process that.";
/// Reply when the model call failed.
pub const FAILED_ANSWER_REPLY: &str = "Sorry, there was an error processing your request.";
/// Label recorded in the transcript for a progress photo.
pub const PROGRESS_PHOTO_LABEL: &str = "[progress photo]";

/// One handled command: what was said and what was answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exchange {
    /// The cook's words.
    pub user: String,
    /// The assistant's reply, to be spoken.
    pub assistant: String,
}

/// Answers spoken commands against the active cooking session.
#[derive(Clone)]
pub struct CookingAssistant {
    generation: Arc<dyn GenerationPort>,
    session: SessionHandle,
}

impl CookingAssistant {
    /// Create an assistant answering questions with `generation`.
    pub fn new(generation: Arc<dyn GenerationPort>, session: SessionHandle) -> Self {
        Self {
            generation,
            session,
        }
    }

    /// The shared session handle.
    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    /// Handle one command and record it in the transcript.
    ///
    /// Never fails: model errors become a spoken fallback.
    #[instrument(skip(self))]
    pub async fn respond(&self, utterance: &str) -> Exchange {
        let command = VoiceCommand::classify(utterance);

        // Step commands are answered under the lock; a question leaves it
        // for the model call.
        let outcome = {
            let mut guard = self.session.lock().await;
            let Some(session) = guard.as_mut() else {
                debug!("Command without a cooking session");
                return Exchange {
                    user: utterance.to_string(),
                    assistant: NO_SESSION_REPLY.to_string(),
                };
            };

            match command {
                VoiceCommand::Next => Ok(match session.advance() {
                    StepMove::AtEnd => END_OF_RECIPE_REPLY.to_string(),
                    StepMove::Moved(_) | StepMove::AtStart => session.current_announcement(),
                }),
                VoiceCommand::Repeat => Ok(session.current_announcement()),
                VoiceCommand::Previous => Ok(match session.retreat() {
                    StepMove::AtStart => START_OF_RECIPE_REPLY.to_string(),
                    StepMove::Moved(_) | StepMove::AtEnd => session.current_announcement(),
                }),
                VoiceCommand::Question(question) => Err(question),
            }
            .inspect(|reply| session.record(utterance, reply.clone()))
        };

        let assistant = match outcome {
            Ok(reply) => reply,
            Err(question) => self.answer_question(&question).await,
        };

        Exchange {
            user: utterance.to_string(),
            assistant,
        }
    }

    /// Ask the vision model to judge a photo of the dish against the
    /// current step, recording the feedback in the transcript.
    ///
    /// # Errors
    ///
    /// Returns [`MiseError::NoActiveSession`] outside a session, or the
    /// generation error.
    #[instrument(skip(self, photo))]
    pub async fn review_progress(&self, photo: Photo) -> CoreResult<String> {
        let (session_id, recipe, step) = self.snapshot().await.ok_or_else(no_session)?;

        let prompt = prompt_builder::build_progress_prompt(&recipe, step);
        let feedback = self
            .generation
            .generate(GenerationRequest::with_image(prompt, photo))
            .await?;

        let feedback = feedback.trim().to_string();
        if feedback.is_empty() {
            return Err(MiseError::generation("empty progress feedback"));
        }

        info!(%session_id, step, "Progress feedback received");
        self.record_if_current(session_id, PROGRESS_PHOTO_LABEL, &feedback)
            .await;

        Ok(feedback)
    }

    async fn answer_question(&self, question: &str) -> String {
        // The lock is released before the model call.
        let Some((session_id, recipe, step)) = self.snapshot().await else {
            return NO_SESSION_REPLY.to_string();
        };

        let prompt = prompt_builder::build_question_prompt(&recipe, step, question);
        let answer = match self.generation.generate(GenerationRequest::text(prompt)).await {
            Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
            Ok(_) => fallback_answer(&recipe, question, EMPTY_ANSWER_REPLY),
            Err(e) => {
                warn!(error = ?e, %session_id, "Question answering failed");
                fallback_answer(&recipe, question, FAILED_ANSWER_REPLY)
            }
        };

        self.record_if_current(session_id, question, &answer).await;
        answer
    }

    async fn snapshot(&self) -> Option<(Uuid, Arc<Recipe>, usize)> {
        let guard = self.session.lock().await;
        guard
            .as_ref()
            .map(|s| (s.id(), Arc::clone(s.recipe()), s.current_step()))
    }

    async fn record_if_current(&self, session_id: Uuid, user: &str, assistant: &str) {
        let mut guard = self.session.lock().await;
        match guard.as_mut() {
            Some(session) if session.id() == session_id => session.record(user, assistant),
            _ => debug!(%session_id, "Session ended before the reply, not recorded"),
        }
    }
}

fn fallback_answer(recipe: &Recipe, question: &str, apology: &str) -> String {
    let lower = question.to_lowercase();
    if (lower.contains("ingredient") || lower.contains("how much")) && !recipe.ingredients.is_empty()
    {
        format!("You'll need: {}", recipe.ingredient_summary())
    } else {
        apology.to_string()
    }
}

#[track_caller]
fn no_session() -> MiseError {
    MiseError::NoActiveSession {
        location: ErrorLocation::from(Location::caller()),
    }
}
