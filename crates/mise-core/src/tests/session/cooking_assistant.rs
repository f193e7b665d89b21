use crate::{
    MiseError,
    recipe::Photo,
    session::{
        CookingAssistant, END_OF_RECIPE_REPLY, FAILED_ANSWER_REPLY, NO_SESSION_REPLY,
        PROGRESS_PHOTO_LABEL, START_OF_RECIPE_REPLY, SessionHandle,
    },
    tests::support::{ScriptedGeneration, session_with},
};

use std::sync::Arc;

use tokio::sync::Mutex;

const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\0";

async fn step(session: &SessionHandle) -> Option<usize> {
    session.lock().await.as_ref().map(|s| s.current_step())
}

/// WHAT: "next" on the last step keeps the index and gives the end notice
/// WHY: Running off the end of the recipe is not an error
#[tokio::test]
async fn given_last_step_when_next_then_end_notice_and_index_kept() {
    // Given: A one-step recipe
    let session = session_with(&["Serve"]);
    let assistant = CookingAssistant::new(ScriptedGeneration::replying(vec![]), session.clone());

    // When: Asking for the next step
    let exchange = assistant.respond("next").await;

    // Then: End notice, still on step one
    assert_eq!(exchange.assistant, END_OF_RECIPE_REPLY);
    assert_eq!(step(&session).await, Some(0));
}

/// WHAT: "previous" on the first step keeps the index and gives the start notice
/// WHY: Symmetric with the end-of-recipe case
#[tokio::test]
async fn given_first_step_when_previous_then_start_notice() {
    // Given: A two-step recipe on step one
    let session = session_with(&["Whisk", "Cook"]);
    let assistant = CookingAssistant::new(ScriptedGeneration::replying(vec![]), session.clone());

    // When: Going back
    let exchange = assistant.respond("go back").await;

    // Then: Start notice, still on step one
    assert_eq!(exchange.assistant, START_OF_RECIPE_REPLY);
    assert_eq!(step(&session).await, Some(0));
}

/// WHAT: Every branch is recorded in the transcript
/// WHY: The cooking screen shows the whole conversation
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_repeat_when_responding_then_announcement_recorded() {
    // Given: A session
    let session = session_with(&["Whisk", "Cook"]);
    let assistant = CookingAssistant::new(ScriptedGeneration::replying(vec![]), session.clone());

    // When: Asking to repeat
    let exchange = assistant.respond("say that again").await;

    // Then: Current step announced and recorded
    assert_eq!(exchange.assistant, "Step 1: Whisk");
    let guard = session.lock().await;
    let transcript = guard.as_ref().unwrap().transcript();
    assert_eq!(transcript.len(), 2);
    assert_eq!(transcript[0].text, "say that again");
}

/// WHAT: Questions go to the model with recipe context
/// WHY: Answers must be about this recipe
#[tokio::test]
async fn given_question_when_model_answers_then_answer_returned_with_context_prompt() {
    // Given: A model with one answer
    let session = session_with(&["Whisk", "Cook"]);
    let generation = ScriptedGeneration::replying(vec![Ok(" Medium heat. \n".to_string())]);
    let assistant = CookingAssistant::new(generation.clone(), session.clone());

    // When: Asking a question
    let exchange = assistant.respond("how hot should the pan be").await;

    // Then: Trimmed answer, prompt has recipe context
    assert_eq!(exchange.assistant, "Medium heat.");
    let requests = generation.requests();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].prompt.contains("1. Whisk"));
    assert!(requests[0].prompt.contains("how hot should the pan be"));
}

/// WHAT: Ingredient questions fall back to the ingredient list on failure
/// WHY: The list answers "how much" questions without the model
#[tokio::test]
async fn given_model_failure_when_asking_about_ingredients_then_ingredient_list() {
    // Given: A failing model
    let session = session_with(&["Whisk"]);
    let assistant = CookingAssistant::new(
        ScriptedGeneration::replying(vec![Err(MiseError::generation("503"))]),
        session,
    );

    // When: Asking how much of something
    let exchange = assistant.respond("how much feta do I need").await;

    // Then: The ingredient summary
    assert_eq!(exchange.assistant, "You'll need: 2 eggs, 50g feta");
}

/// WHAT: Other questions fall back to a fixed apology on failure
/// WHY: Generation failures must never crash the session
#[tokio::test]
async fn given_model_failure_when_asking_other_question_then_apology() {
    // Given: A failing model
    let session = session_with(&["Whisk"]);
    let assistant = CookingAssistant::new(
        ScriptedGeneration::replying(vec![Err(MiseError::generation("503"))]),
        session,
    );

    // When: Asking something else
    let exchange = assistant.respond("can I freeze this").await;

    // Then: Apology
    assert_eq!(exchange.assistant, FAILED_ANSWER_REPLY);
}

/// WHAT: Commands outside a session get a prompt to pick a recipe
/// WHY: Voice input may be on before cooking starts
#[tokio::test]
async fn given_no_session_when_responding_then_pick_recipe_reply() {
    // Given: No session
    let session: SessionHandle = Arc::new(Mutex::new(None));
    let assistant = CookingAssistant::new(ScriptedGeneration::replying(vec![]), session);

    // When: Saying next
    let exchange = assistant.respond("next").await;

    // Then: Pick-a-recipe reply
    assert_eq!(exchange.assistant, NO_SESSION_REPLY);
}

/// WHAT: Progress photos are sent inline and the feedback recorded
/// WHY: Photo feedback is part of the cooking conversation
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_photo_when_reviewing_progress_then_inline_request_and_recorded() {
    // Given: A session and a model with feedback
    let session = session_with(&["Whisk", "Cook"]);
    let generation = ScriptedGeneration::replying(vec![Ok("Looks fluffy.".to_string())]);
    let assistant = CookingAssistant::new(generation.clone(), session.clone());
    let photo = Photo::from_bytes(PNG_MAGIC.to_vec()).unwrap();

    // When: Reviewing progress
    let feedback = assistant.review_progress(photo).await.unwrap();

    // Then: Image sent, feedback recorded
    assert_eq!(feedback, "Looks fluffy.");
    assert!(generation.requests()[0].image.is_some());
    let guard = session.lock().await;
    let transcript = guard.as_ref().unwrap().transcript();
    assert_eq!(transcript[0].text, PROGRESS_PHOTO_LABEL);
    assert_eq!(transcript[1].text, "Looks fluffy.");
}
