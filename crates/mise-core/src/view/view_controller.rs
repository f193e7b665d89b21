use crate::{
    CoreResult, MiseError,
    ports::{GenerationPort, GenerationRequest},
    recipe::{
        ParseFallback, Photo, Preferences, Recipe, RecipeStore, parse_recipes, prompt_builder,
    },
    session::{CookingAssistant, CookingSession, SessionHandle, StepMove, TranscriptEntry},
    view::Screen,
    voice::{VoiceMode, VoiceStatus},
};

use std::{panic::Location, sync::Arc};

use error_location::ErrorLocation;
use tracing::{debug, info, instrument, warn};

/// Drives the preferences, recommendations and cooking screens.
pub struct ViewController {
    generation: Arc<dyn GenerationPort>,
    assistant: CookingAssistant,
    store: RecipeStore,
    screen: Screen,
    recipe_count: usize,
}

impl ViewController {
    /// Create a controller generating `recipe_count` recipes per request.
    ///
    /// `generation` handles recipe requests; the assistant carries its own
    /// model for cooking questions and shares the session handle.
    pub fn new(
        generation: Arc<dyn GenerationPort>,
        assistant: CookingAssistant,
        recipe_count: usize,
    ) -> Self {
        Self {
            generation,
            assistant,
            store: RecipeStore::default(),
            screen: Screen::default(),
            recipe_count: recipe_count.max(1),
        }
    }

    /// The visible screen.
    pub fn screen(&self) -> Screen {
        self.screen
    }

    /// Recipes from the last generation.
    pub fn recipes(&self) -> &[Arc<Recipe>] {
        self.store.recipes()
    }

    /// The selected recipe.
    pub fn selected_recipe(&self) -> Option<Arc<Recipe>> {
        self.store.selected()
    }

    /// The shared cooking session.
    pub fn session(&self) -> &SessionHandle {
        self.assistant.session()
    }

    /// Generate recipes from a snapshot of the preferences.
    ///
    /// # Errors
    ///
    /// Returns [`MiseError::MissingIngredients`] when neither ingredient
    /// text nor a photo was supplied, and [`MiseError::GenerationFailed`]
    /// when the model call fails.
    #[instrument(skip(self, preferences))]
    pub async fn generate_recipes(&mut self, preferences: Preferences) -> CoreResult<&[Arc<Recipe>]> {
        if !preferences.has_ingredient_source() {
            return Err(MiseError::MissingIngredients {
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let detected = match &preferences.ingredient_image {
            Some(photo) => self.detect_ingredients(photo.clone()).await,
            None => None,
        };

        let prompt =
            prompt_builder::build_recipe_prompt(&preferences, detected.as_deref(), self.recipe_count);

        // Without a usable ingredient list the photo itself goes with the prompt.
        let request = match (&preferences.ingredient_image, &detected) {
            (Some(photo), None) => GenerationRequest::with_image(prompt, photo.clone()),
            _ => GenerationRequest::text(prompt),
        };

        let raw = self.generation.generate(request).await.map_err(|e| match e {
            MiseError::GenerationFailed { .. } => e,
            other => MiseError::generation(other.to_string()),
        })?;

        let fallback = ParseFallback {
            ingredients_text: preferences.ingredients_text().to_string(),
            detected_ingredients: detected,
            prep_time: preferences.cooking_time.map(|t| t.label().to_string()),
        };
        let recipes = parse_recipes(&raw, &fallback);
        info!(count = recipes.len(), "Recipes generated");

        self.store.replace(recipes);
        self.screen = Screen::Recommendations;
        Ok(self.store.recipes())
    }

    async fn detect_ingredients(&self, photo: Photo) -> Option<String> {
        let request =
            GenerationRequest::with_image(prompt_builder::build_ingredient_detection_prompt(), photo);

        match self.generation.generate(request).await {
            Ok(text) => {
                let text = text.trim().to_string();
                debug!(detected = %text, "Ingredients read from photo");
                (!text.is_empty()).then_some(text)
            }
            Err(e) => {
                warn!(error = ?e, "Ingredient detection failed, sending photo inline");
                None
            }
        }
    }

    /// Select a recipe by zero-based index.
    ///
    /// # Errors
    ///
    /// Returns [`MiseError::RecipeOutOfRange`] for an unknown index.
    #[track_caller]
    pub fn select_recipe(&mut self, index: usize) -> CoreResult<Arc<Recipe>> {
        self.store.select(index)
    }

    /// Start cooking the selected recipe and return the first step
    /// announcement.
    ///
    /// # Errors
    ///
    /// Returns [`MiseError::NoRecipeSelected`] or [`MiseError::EmptyRecipe`].
    #[instrument(skip(self))]
    pub async fn start_cooking(&mut self) -> CoreResult<String> {
        let recipe = self.store.selected().ok_or(MiseError::NoRecipeSelected {
            location: ErrorLocation::from(Location::caller()),
        })?;

        let session = CookingSession::new(recipe)?;
        let announcement = session.current_announcement();
        info!(session_id = %session.id(), recipe = %session.recipe().name, "Cooking started");

        *self.session().lock().await = Some(session);
        self.screen = Screen::Cooking;
        Ok(announcement)
    }

    /// Drop the session and return to the recipe list.
    pub async fn leave_cooking(&mut self) {
        if let Some(session) = self.session().lock().await.take() {
            info!(session_id = %session.id(), "Cooking session ended");
        }
        self.screen = Screen::Recommendations;
    }

    /// Return to the preferences screen, ending any session.
    pub async fn back_to_preferences(&mut self) {
        self.leave_cooking().await;
        self.screen = Screen::Preferences;
    }

    /// Go back one screen.
    pub async fn back(&mut self) {
        match self.screen {
            Screen::Cooking => self.leave_cooking().await,
            Screen::Recommendations | Screen::Preferences => self.back_to_preferences().await,
        }
    }

    /// Advance one step. `None` when already on the last step.
    ///
    /// # Errors
    ///
    /// Returns [`MiseError::NoActiveSession`] outside cooking.
    pub async fn next_step(&self) -> CoreResult<Option<String>> {
        self.with_session(|session| match session.advance() {
            StepMove::Moved(_) => Some(session.current_announcement()),
            StepMove::AtEnd | StepMove::AtStart => None,
        })
        .await
    }

    /// Go back one step. `None` when already on the first step.
    ///
    /// # Errors
    ///
    /// Returns [`MiseError::NoActiveSession`] outside cooking.
    pub async fn previous_step(&self) -> CoreResult<Option<String>> {
        self.with_session(|session| match session.retreat() {
            StepMove::Moved(_) => Some(session.current_announcement()),
            StepMove::AtStart | StepMove::AtEnd => None,
        })
        .await
    }

    /// Jump to a zero-based step.
    ///
    /// # Errors
    ///
    /// Returns [`MiseError::StepOutOfRange`] or [`MiseError::NoActiveSession`].
    pub async fn go_to_step(&self, index: usize) -> CoreResult<String> {
        self.with_session(|session| {
            session.go_to(index)?;
            Ok(session.current_announcement())
        })
        .await?
    }

    /// The current step announcement.
    ///
    /// # Errors
    ///
    /// Returns [`MiseError::NoActiveSession`] outside cooking.
    pub async fn current_step(&self) -> CoreResult<String> {
        self.with_session(|session| session.current_announcement())
            .await
    }

    /// The conversation recorded in the current session.
    ///
    /// # Errors
    ///
    /// Returns [`MiseError::NoActiveSession`] outside cooking.
    pub async fn transcript(&self) -> CoreResult<Vec<TranscriptEntry>> {
        self.with_session(|session| session.transcript().to_vec())
            .await
    }

    /// Feedback on a photo of the dish in progress.
    ///
    /// # Errors
    ///
    /// Returns [`MiseError::NoActiveSession`] outside cooking, or the
    /// generation error.
    pub async fn check_progress(&self, photo: Photo) -> CoreResult<String> {
        self.assistant.review_progress(photo).await
    }

    async fn with_session<T>(&self, f: impl FnOnce(&mut CookingSession) -> T) -> CoreResult<T> {
        let mut guard = self.session().lock().await;
        let session = guard.as_mut().ok_or(MiseError::NoActiveSession {
            location: ErrorLocation::from(Location::caller()),
        })?;
        Ok(f(session))
    }
}

/// User-facing voice status line, `None` while voice input is off.
pub fn status_text(status: VoiceStatus) -> Option<String> {
    (status.mode != VoiceMode::Off).then(|| status.to_string())
}
