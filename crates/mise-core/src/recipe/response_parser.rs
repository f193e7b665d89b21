//! Best-effort extraction of recipes from free-form model output.
//!
//! The generation model is asked for a JSON array but is not bound to one,
//! so parsing degrades through three tiers and never fails.

use crate::recipe::Recipe;

use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, warn};

const DEFAULT_DIFFICULTY: &str = "Medium";
const FLEXIBLE_PREP_TIME: &str = "Flexible";
const NO_INSTRUCTIONS: &str = "No instructions were provided.";
const UNTITLED: &str = "Untitled Recipe";

/// First `[` through last `]`, across lines.
static ARRAY_SPAN: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"(?s)\[.*\]").ok());

/// What the user supplied, used when the model output has no usable structure.
#[derive(Debug, Clone, Default)]
pub struct ParseFallback {
    /// The ingredient text the user typed.
    pub ingredients_text: String,
    /// Ingredients read from the user's photo.
    pub detected_ingredients: Option<String>,
    /// The requested cooking time label.
    pub prep_time: Option<String>,
}

impl ParseFallback {
    fn prep_time(&self) -> String {
        self.prep_time
            .clone()
            .unwrap_or_else(|| FLEXIBLE_PREP_TIME.to_string())
    }

    fn ingredient_list(&self) -> Vec<String> {
        let source = if self.ingredients_text.trim().is_empty() {
            self.detected_ingredients.as_deref().unwrap_or_default()
        } else {
            self.ingredients_text.as_str()
        };

        source
            .split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// Parse generated text into at least one recipe.
pub fn parse_recipes(raw: &str, fallback: &ParseFallback) -> Vec<Recipe> {
    let span = ARRAY_SPAN
        .as_ref()
        .and_then(|re| re.find(raw))
        .map(|m| m.as_str());

    let recipes = match span {
        Some(json) => match serde_json::from_str::<Vec<Recipe>>(json) {
            Ok(recipes) if !recipes.is_empty() => {
                debug!(count = recipes.len(), "Parsed structured recipes");
                recipes
            }
            Ok(_) => {
                warn!("Model returned an empty recipe array");
                vec![whole_text_recipe(raw, fallback)]
            }
            Err(e) => {
                warn!(error = %e, "Recipe JSON did not parse, using raw text");
                vec![whole_text_recipe(raw, fallback)]
            }
        },
        None => {
            debug!("No JSON array in model output, splitting lines");
            vec![line_split_recipe(raw, fallback)]
        }
    };

    recipes.into_iter().map(normalize).collect()
}

fn line_split_recipe(raw: &str, fallback: &ParseFallback) -> Recipe {
    Recipe {
        name: "Generated Recipe".to_string(),
        prep_time: fallback.prep_time(),
        ingredients: fallback.ingredient_list(),
        instructions: raw
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect(),
        difficulty: DEFAULT_DIFFICULTY.to_string(),
    }
}

fn whole_text_recipe(raw: &str, fallback: &ParseFallback) -> Recipe {
    Recipe {
        name: "Recipe Suggestion".to_string(),
        prep_time: fallback.prep_time(),
        ingredients: vec!["See details below".to_string()],
        instructions: vec![raw.to_string()],
        difficulty: DEFAULT_DIFFICULTY.to_string(),
    }
}

/// Every recipe must be cookable step by step.
fn normalize(mut recipe: Recipe) -> Recipe {
    if recipe.name.trim().is_empty() {
        recipe.name = UNTITLED.to_string();
    }
    recipe.instructions.retain(|step| !step.trim().is_empty());
    if recipe.instructions.is_empty() {
        recipe.instructions.push(NO_INSTRUCTIONS.to_string());
    }
    if recipe.difficulty.trim().is_empty() {
        recipe.difficulty = DEFAULT_DIFFICULTY.to_string();
    }
    recipe
}
