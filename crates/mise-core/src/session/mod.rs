mod cooking_assistant;
mod cooking_session;
mod voice_command;

pub use {
    cooking_assistant::{
        CookingAssistant, EMPTY_ANSWER_REPLY, END_OF_RECIPE_REPLY, Exchange, FAILED_ANSWER_REPLY,
        NO_SESSION_REPLY, PROGRESS_PHOTO_LABEL, START_OF_RECIPE_REPLY, SessionHandle,
    },
    cooking_session::{CookingSession, Role, StepMove, TranscriptEntry},
    voice_command::VoiceCommand,
};
