use crate::{CoreResult, MiseError};

use std::{fmt, panic::Location};

use error_location::ErrorLocation;
use image::ImageFormat;

/// Declares a closed set of form options with their display labels.
macro_rules! option_set {
    ($(#[$meta:meta])* $name:ident { $($(#[$vmeta:meta])* $variant:ident => $label:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($(#[$vmeta])* $variant),+
        }

        impl $name {
            /// Every option, in form order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Label shown to the user and embedded in prompts.
            pub fn label(self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }

            /// Case-insensitive lookup by label.
            pub fn from_label(label: &str) -> Option<Self> {
                let wanted = label.trim();
                Self::ALL
                    .iter()
                    .copied()
                    .find(|option| option.label().eq_ignore_ascii_case(wanted))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }
    };
}

option_set! {
    /// Maximum time the cook wants to spend.
    CookingTime {
        /// Half an hour.
        ThirtyMinutes => "30min",
        /// One hour.
        OneHour => "1hour",
        /// Two hours.
        TwoHours => "2hours",
        /// Open-ended.
        MoreThanTwoHours => "2+hours",
    }
}

option_set! {
    /// Course the recipe should fit.
    DishType {
        /// Starter.
        Appetizer => "appetizer",
        /// Main.
        MainCourse => "main course",
        /// Sweet course.
        Dessert => "dessert",
        /// Small bite.
        Snack => "snack",
        /// Beverages.
        Drinks => "drinks",
    }
}

option_set! {
    /// Flavor profile the cook is in the mood for.
    Mood {
        /// Hot.
        Spicy => "spicy",
        /// Hearty.
        ComfortFood => "comfort food",
        /// Light.
        Healthy => "healthy",
        /// Cheese-forward.
        Cheesy => "cheesy",
        /// Tangy.
        Sour => "sour",
        /// Sugary.
        Sweet => "sweet",
    }
}

option_set! {
    /// Dietary constraint.
    Dietary {
        /// Protein-rich.
        HighProtein => "high-protein",
        /// No meat.
        Vegetarian => "vegetarian",
        /// No animal products.
        Vegan => "vegan",
        /// No gluten.
        GlutenFree => "gluten-free",
        /// No dairy.
        DairyFree => "dairy-free",
    }
}

impl Default for DishType {
    fn default() -> Self {
        DishType::MainCourse
    }
}

/// Photo bytes with a sniffed MIME type.
#[derive(Clone, PartialEq, Eq)]
pub struct Photo {
    bytes: Vec<u8>,
    mime_type: &'static str,
}

impl Photo {
    /// Wrap raw image bytes, detecting the format from magic bytes.
    ///
    /// # Errors
    ///
    /// Returns [`MiseError::InvalidImage`] if the bytes are not a known
    /// image format.
    #[track_caller]
    pub fn from_bytes(bytes: Vec<u8>) -> CoreResult<Self> {
        let format = image::guess_format(&bytes).map_err(|e| MiseError::InvalidImage {
            reason: format!("Unrecognised image data: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        let mime_type = match format {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::WebP => "image/webp",
            ImageFormat::Gif => "image/gif",
            other => {
                return Err(MiseError::InvalidImage {
                    reason: format!("Unsupported image format: {:?}", other),
                    location: ErrorLocation::from(Location::caller()),
                });
            }
        };

        Ok(Self { bytes, mime_type })
    }

    /// Raw image bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// MIME type sent alongside the bytes.
    pub fn mime_type(&self) -> &'static str {
        self.mime_type
    }
}

impl fmt::Debug for Photo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Photo")
            .field("mime_type", &self.mime_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Recipe preferences collected from the user.
///
/// Cloned into each generation request, so later edits never affect a
/// request that is already in flight.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Preferences {
    /// Maximum cooking time, if the user chose one.
    pub cooking_time: Option<CookingTime>,
    /// Course type.
    pub dish_type: DishType,
    /// Selected moods, in the order they were picked.
    pub mood: Vec<Mood>,
    /// Selected dietary constraints, in the order they were picked.
    pub dietary: Vec<Dietary>,
    /// Free-text ingredient list.
    pub ingredients: String,
    /// A specific dish the user asked for.
    pub dish_name: Option<String>,
    /// Optional photo of the available ingredients.
    pub ingredient_image: Option<Photo>,
}

impl Preferences {
    /// Select the mood if absent, deselect it if present.
    pub fn toggle_mood(&mut self, mood: Mood) {
        toggle(&mut self.mood, mood);
    }

    /// Select the dietary constraint if absent, deselect it if present.
    pub fn toggle_dietary(&mut self, dietary: Dietary) {
        toggle(&mut self.dietary, dietary);
    }

    /// Ingredient text with surrounding whitespace removed.
    pub fn ingredients_text(&self) -> &str {
        self.ingredients.trim()
    }

    /// Dish name, ignoring blank input.
    pub fn dish_name(&self) -> Option<&str> {
        self.dish_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }

    /// Whether there is anything to cook from.
    pub fn has_ingredient_source(&self) -> bool {
        !self.ingredients_text().is_empty() || self.ingredient_image.is_some()
    }
}

fn toggle<T: PartialEq>(items: &mut Vec<T>, value: T) {
    if let Some(pos) = items.iter().position(|item| *item == value) {
        items.remove(pos);
    } else {
        items.push(value);
    }
}
