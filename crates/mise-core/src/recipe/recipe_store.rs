use crate::{CoreResult, MiseError, recipe::Recipe};

use std::{panic::Location, sync::Arc};

use error_location::ErrorLocation;

/// The generated recipes and the one the user picked.
#[derive(Debug, Default)]
pub struct RecipeStore {
    recipes: Vec<Arc<Recipe>>,
    selected: Option<usize>,
}

impl RecipeStore {
    /// Replace the recipe list and clear the selection.
    pub fn replace(&mut self, recipes: Vec<Recipe>) {
        self.recipes = recipes.into_iter().map(Arc::new).collect();
        self.selected = None;
    }

    /// All recipes in generation order.
    pub fn recipes(&self) -> &[Arc<Recipe>] {
        &self.recipes
    }

    /// Select a recipe by zero-based index.
    ///
    /// # Errors
    ///
    /// Returns [`MiseError::RecipeOutOfRange`] if the index is not in the list.
    #[track_caller]
    pub fn select(&mut self, index: usize) -> CoreResult<Arc<Recipe>> {
        let recipe = self
            .recipes
            .get(index)
            .cloned()
            .ok_or(MiseError::RecipeOutOfRange {
                index,
                len: self.recipes.len(),
                location: ErrorLocation::from(Location::caller()),
            })?;

        self.selected = Some(index);
        Ok(recipe)
    }

    /// The selected recipe, if any.
    pub fn selected(&self) -> Option<Arc<Recipe>> {
        self.selected.and_then(|i| self.recipes.get(i).cloned())
    }
}
