mod preferences;
pub mod prompt_builder;
#[allow(clippy::module_inception)]
mod recipe;
mod recipe_store;
pub mod response_parser;

pub use {
    preferences::{CookingTime, Dietary, DishType, Photo, Mood, Preferences},
    recipe::Recipe,
    recipe_store::RecipeStore,
    response_parser::{ParseFallback, parse_recipes},
};
