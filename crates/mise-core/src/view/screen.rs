use std::fmt;

/// The three screens of the cooking flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Screen {
    /// Collecting preferences.
    #[default]
    Preferences,
    /// Choosing among generated recipes.
    Recommendations,
    /// Cooking a recipe step by step.
    Cooking,
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Screen::Preferences => "preferences",
            Screen::Recommendations => "recommendations",
            Screen::Cooking => "cooking",
        })
    }
}
