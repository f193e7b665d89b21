use crate::{
    CookingAssistant, CoreResult, MiseError, Photo, Preferences, Screen, ViewController,
    tests::support::ScriptedGeneration,
    view::status_text,
    voice::{VoiceMode, VoicePhase, VoiceStatus},
};

use std::sync::Arc;

const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\0";

const TWO_RECIPES: &str = r#"Sure! [
  {"name":"Feta Omelette","prepTime":"10min","ingredients":["2 eggs","feta"],"instructions":["Whisk the eggs","Cook gently","Fold in the feta"],"difficulty":"Easy"},
  {"name":"Shakshuka","prepTime":"30min","ingredients":["eggs","tomatoes"],"instructions":["Simmer tomatoes","Crack in eggs"],"difficulty":"Medium"}
]"#;

fn controller(replies: Vec<CoreResult<String>>) -> (ViewController, Arc<ScriptedGeneration>) {
    let generation = ScriptedGeneration::replying(replies);
    let assistant = CookingAssistant::new(generation.clone(), Default::default());
    (ViewController::new(generation.clone(), assistant, 2), generation)
}

fn eggs() -> Preferences {
    Preferences {
        ingredients: "eggs, feta".to_string(),
        ..Default::default()
    }
}

#[allow(clippy::unwrap_used)]
async fn cooking(replies: Vec<CoreResult<String>>) -> ViewController {
    let script = std::iter::once(Ok(TWO_RECIPES.to_string()))
        .chain(replies)
        .collect();
    let (mut view, _) = controller(script);
    view.generate_recipes(eggs()).await.unwrap();
    view.select_recipe(0).unwrap();
    view.start_cooking().await.unwrap();
    view
}

/// WHAT: Generation needs ingredient text or a photo
/// WHY: An empty request produces useless recipes
#[tokio::test]
async fn given_no_ingredients_when_generating_then_missing_ingredients_and_no_call() {
    // Given: Blank preferences
    let (mut view, generation) = controller(vec![]);
    let preferences = Preferences {
        ingredients: "   ".to_string(),
        ..Default::default()
    };

    // When: Generating
    let result = view.generate_recipes(preferences).await;

    // Then: Rejected before the model is called
    assert!(matches!(result, Err(MiseError::MissingIngredients { .. })));
    assert!(generation.requests().is_empty());
    assert_eq!(view.screen(), Screen::Preferences);
}

/// WHAT: Generated recipes are stored and the recommendations screen shown
/// WHY: The user picks from the list next
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_ingredients_when_generating_then_recipes_listed() {
    // Given
    let (mut view, generation) = controller(vec![Ok(TWO_RECIPES.to_string())]);

    // When
    let names: Vec<String> = view
        .generate_recipes(eggs())
        .await
        .unwrap()
        .iter()
        .map(|r| r.name.clone())
        .collect();

    // Then
    assert_eq!(names, vec!["Feta Omelette", "Shakshuka"]);
    assert_eq!(view.screen(), Screen::Recommendations);
    assert!(generation.requests()[0].image.is_none());
}

/// WHAT: Detected ingredients are sent as text, not the photo
/// WHY: Two smaller calls beat one large multimodal prompt
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_photo_when_detection_succeeds_then_recipe_prompt_is_text_only() {
    // Given: Detection then recipes
    let (mut view, generation) = controller(vec![
        Ok("tomatoes, basil".to_string()),
        Ok(TWO_RECIPES.to_string()),
    ]);
    let preferences = Preferences {
        ingredient_image: Some(Photo::from_bytes(PNG_MAGIC.to_vec()).unwrap()),
        ..Default::default()
    };

    // When
    view.generate_recipes(preferences).await.unwrap();

    // Then: The detected list is in the recipe prompt
    let requests = generation.requests();
    assert_eq!(requests.len(), 2);
    assert!(requests[0].image.is_some());
    assert!(requests[1].image.is_none());
    assert!(requests[1].prompt.contains("tomatoes, basil"));
}

/// WHAT: Failed detection sends the photo with the recipe prompt
/// WHY: The model can still read the picture itself
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_photo_when_detection_fails_then_photo_sent_inline() {
    // Given: Detection fails, recipes succeed
    let (mut view, generation) = controller(vec![
        Err(MiseError::generation("vision overloaded")),
        Ok(TWO_RECIPES.to_string()),
    ]);
    let preferences = Preferences {
        ingredient_image: Some(Photo::from_bytes(PNG_MAGIC.to_vec()).unwrap()),
        ..Default::default()
    };

    // When
    view.generate_recipes(preferences).await.unwrap();

    // Then
    let requests = generation.requests();
    assert_eq!(requests.len(), 2);
    assert!(requests[1].image.is_some());
}

/// WHAT: A failed model call surfaces as GenerationFailed
/// WHY: The screen shows the error and keeps the old list
#[tokio::test]
async fn given_model_error_when_generating_then_generation_failed_and_screen_kept() {
    // Given
    let (mut view, _) = controller(vec![Err(MiseError::generation("503"))]);

    // When
    let result = view.generate_recipes(eggs()).await;

    // Then
    assert!(matches!(result, Err(MiseError::GenerationFailed { .. })));
    assert_eq!(view.screen(), Screen::Preferences);
}

/// WHAT: Cooking needs a selected recipe
/// WHY: There is nothing to announce otherwise
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_no_selection_when_starting_then_no_recipe_selected() {
    // Given: Recipes but no selection
    let (mut view, _) = controller(vec![Ok(TWO_RECIPES.to_string())]);
    view.generate_recipes(eggs()).await.unwrap();

    // When / Then
    assert!(matches!(
        view.start_cooking().await,
        Err(MiseError::NoRecipeSelected { .. })
    ));
    assert!(matches!(
        view.select_recipe(5),
        Err(MiseError::RecipeOutOfRange { index: 5, len: 2, .. })
    ));
}

/// WHAT: Starting announces step one and shows the cooking screen
/// WHY: The first step is read aloud immediately
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_selected_recipe_when_starting_then_first_step_announced() {
    // Given
    let (mut view, _) = controller(vec![Ok(TWO_RECIPES.to_string())]);
    view.generate_recipes(eggs()).await.unwrap();
    view.select_recipe(1).unwrap();

    // When
    let announcement = view.start_cooking().await.unwrap();

    // Then
    assert_eq!(announcement, "Step 1: Simmer tomatoes");
    assert_eq!(view.screen(), Screen::Cooking);
    assert!(view.session().lock().await.is_some());
}

/// WHAT: Step buttons move within bounds
/// WHY: The ends of the recipe report no movement instead of wrapping
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_cooking_when_stepping_then_bounded_navigation() {
    // Given
    let view = cooking(vec![]).await;

    // When / Then
    assert_eq!(view.previous_step().await.unwrap(), None);
    assert_eq!(
        view.next_step().await.unwrap().as_deref(),
        Some("Step 2: Cook gently")
    );
    assert_eq!(
        view.go_to_step(2).await.unwrap(),
        "Step 3: Fold in the feta"
    );
    assert_eq!(view.next_step().await.unwrap(), None);
    assert!(matches!(
        view.go_to_step(3).await,
        Err(MiseError::StepOutOfRange { index: 3, len: 3, .. })
    ));
    assert_eq!(view.current_step().await.unwrap(), "Step 3: Fold in the feta");
}

/// WHAT: Leaving cooking drops the session; back from the list returns to preferences
/// WHY: Voice commands after leaving must not act on a stale recipe
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_cooking_when_going_back_twice_then_preferences_without_session() {
    // Given
    let mut view = cooking(vec![]).await;

    // When: Back once
    view.back().await;

    // Then: Recipe list, session gone
    assert_eq!(view.screen(), Screen::Recommendations);
    assert!(view.session().lock().await.is_none());
    assert!(matches!(
        view.next_step().await,
        Err(MiseError::NoActiveSession { .. })
    ));

    // When: Back again
    view.back().await;

    // Then
    assert_eq!(view.screen(), Screen::Preferences);
}

/// WHAT: Progress photos are reviewed against the current step
/// WHY: The transcript shows the photo check alongside spoken questions
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_cooking_when_checking_progress_then_feedback_recorded() {
    // Given
    let view = cooking(vec![Ok("Looks golden, flip it now.".to_string())]).await;
    let photo = Photo::from_bytes(PNG_MAGIC.to_vec()).unwrap();

    // When
    let feedback = view.check_progress(photo).await.unwrap();

    // Then
    assert_eq!(feedback, "Looks golden, flip it now.");
    assert_eq!(view.transcript().await.unwrap().len(), 2);
}

/// WHAT: Status text is hidden while voice is off
/// WHY: The idle UI shows no voice line
#[test]
fn given_voice_statuses_when_rendering_then_text_only_while_active() {
    // Given / When / Then
    assert_eq!(status_text(VoiceStatus::default()), None);
    assert_eq!(
        status_text(VoiceStatus {
            mode: VoiceMode::SingleShot,
            phase: VoicePhase::Listening,
        })
        .as_deref(),
        Some("Listening...")
    );
    assert_eq!(
        status_text(VoiceStatus {
            mode: VoiceMode::HandsFree,
            phase: VoicePhase::Processing,
        })
        .as_deref(),
        Some("Thinking...")
    );
}
