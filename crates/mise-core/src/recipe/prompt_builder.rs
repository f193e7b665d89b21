//! Natural-language requests sent to the generation model.
//!
//! Everything here is a pure function of its inputs. Optional preferences the
//! user left empty are omitted entirely rather than rendered as placeholders.

use crate::recipe::{Preferences, Recipe};

use std::fmt::Write;

/// Number of recipes requested when the caller has no preference.
pub const DEFAULT_RECIPE_COUNT: usize = 3;

const RECIPE_FORMAT_INSTRUCTIONS: &str = "\
For each recipe, provide:
1. Recipe name
2. Prep time
3. Ingredients list
4. Step-by-step instructions
5. Difficulty level

Respond with a JSON array of objects with exactly these keys: \
\"name\" (string), \"prepTime\" (string), \"ingredients\" (array of strings), \
\"instructions\" (array of strings, one step per element), \"difficulty\" (string).";

/// Build the recipe generation request.
///
/// `detected_ingredients` is the ingredient list a vision model read from the
/// user's photo, when one was supplied and recognised.
pub fn build_recipe_prompt(
    preferences: &Preferences,
    detected_ingredients: Option<&str>,
    count: usize,
) -> String {
    let count = count.max(1);
    let mut prompt = String::with_capacity(1024);

    let noun = if count == 1 { "suggestion" } else { "suggestions" };
    let _ = writeln!(
        prompt,
        "Generate {} recipe {} based on the following criteria:",
        count, noun
    );

    if let Some(time) = preferences.cooking_time {
        let _ = writeln!(prompt, "- Cooking time: {}", time);
    }

    let _ = writeln!(prompt, "- Type of dish: {}", preferences.dish_type);

    if let Some(name) = preferences.dish_name() {
        let _ = writeln!(prompt, "- Specific dish requested: {}", name);
    }

    if !preferences.mood.is_empty() {
        let _ = writeln!(prompt, "- Mood/flavor profile: {}", join_labels(&preferences.mood));
    }

    if !preferences.dietary.is_empty() {
        let _ = writeln!(
            prompt,
            "- Dietary preferences: {}",
            join_labels(&preferences.dietary)
        );
    }

    if !preferences.ingredients_text().is_empty() {
        let _ = writeln!(
            prompt,
            "- Available ingredients: {}",
            preferences.ingredients_text()
        );
    }

    match detected_ingredients.map(str::trim).filter(|s| !s.is_empty()) {
        Some(detected) => {
            let _ = writeln!(prompt, "- Ingredients seen in the user's photo: {}", detected);
        }
        None if preferences.ingredient_image.is_some() => {
            let _ = writeln!(prompt, "- The attached photo shows the available ingredients.");
        }
        None => {}
    }

    prompt.push('\n');
    prompt.push_str(RECIPE_FORMAT_INSTRUCTIONS);
    prompt
}

/// Ask a vision model to read the ingredients in a photo.
pub fn build_ingredient_detection_prompt() -> String {
    "List every food ingredient you can identify in this photo. \
     Reply with a single comma-separated line of ingredient names and nothing else."
        .to_string()
}

/// Context-augmented prompt for a free-form question asked mid-recipe.
pub fn build_question_prompt(recipe: &Recipe, step_index: usize, question: &str) -> String {
    let mut prompt = String::with_capacity(1024);

    let _ = writeln!(
        prompt,
        "You are a helpful cooking assistant guiding someone through the recipe \"{}\".",
        recipe.name
    );
    push_recipe_context(&mut prompt, recipe, step_index);
    let _ = writeln!(prompt, "The cook asks: \"{}\"", question);
    prompt.push_str(
        "Answer concisely in one to three sentences. \
         The answer will be read aloud, so do not use lists or formatting.",
    );
    prompt
}

/// Ask a vision model to judge a photo of the dish against the current step.
pub fn build_progress_prompt(recipe: &Recipe, step_index: usize) -> String {
    let mut prompt = String::with_capacity(1024);

    let _ = writeln!(
        prompt,
        "You are a helpful cooking assistant. The attached photo shows the cook's progress on \"{}\".",
        recipe.name
    );
    push_recipe_context(&mut prompt, recipe, step_index);
    prompt.push_str(
        "Say whether the dish looks right for this step and give one practical tip. \
         Keep it to two sentences suitable for reading aloud.",
    );
    prompt
}

fn push_recipe_context(prompt: &mut String, recipe: &Recipe, step_index: usize) {
    prompt.push_str("Ingredients:\n");
    for ingredient in &recipe.ingredients {
        let _ = writeln!(prompt, "- {}", ingredient);
    }

    prompt.push_str("Instructions:\n");
    for (i, step) in recipe.instructions.iter().enumerate() {
        let _ = writeln!(prompt, "{}. {}", i + 1, step);
    }

    if let Some(current) = recipe.step(step_index) {
        let _ = writeln!(
            prompt,
            "The cook is currently on step {}: {}",
            step_index + 1,
            current
        );
    }
}

fn join_labels<T: std::fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
