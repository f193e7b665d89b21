use serde::{Deserialize, Serialize};

/// A generated recipe.
///
/// Field names on the wire follow the JSON shape requested from the model:
/// `name`, `prepTime`, `ingredients`, `instructions`, `difficulty`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Preparation time as the model phrased it.
    #[serde(default)]
    pub prep_time: String,
    /// Ingredient lines, in order.
    #[serde(default)]
    pub ingredients: Vec<String>,
    /// Instruction steps, in order.
    #[serde(default)]
    pub instructions: Vec<String>,
    /// Difficulty label, e.g. "Easy".
    #[serde(default)]
    pub difficulty: String,
}

impl Recipe {
    /// Number of instruction steps.
    pub fn step_count(&self) -> usize {
        self.instructions.len()
    }

    /// Instruction text for a zero-based step index.
    pub fn step(&self, index: usize) -> Option<&str> {
        self.instructions.get(index).map(String::as_str)
    }

    /// Spoken announcement for a step, numbered from one.
    pub fn announce_step(&self, index: usize) -> Option<String> {
        self.step(index)
            .map(|text| format!("Step {}: {}", index + 1, text))
    }

    /// Ingredients joined for reading aloud.
    pub fn ingredient_summary(&self) -> String {
        self.ingredients.join(", ")
    }
}
