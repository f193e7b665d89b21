//! Plain-text rendering of screens, replies and voice notices.

use mise_core::{
    Preferences, Recipe, VoiceNotice,
    session::{Role, TranscriptEntry},
};

use std::{io::Write, sync::Arc};

pub(crate) const PROMPT: &str = "mise> ";

const HELP: &str = "\
Preferences:
  time <30min|1hour|2hours|2+hours|any>   cooking time
  dish <appetizer|main course|dessert|snack|drinks>
  mood <name>, diet <name>                 toggle a mood or dietary need
  ingredients <text>                       what you have
  name [dish]                              ask for a specific dish
  photo [path]                             ingredient photo (empty clears)
  generate                                 suggest recipes
Recipes:
  select <n>                               start cooking recipe n
Cooking:
  next, prev, step <n>, repeat             move through the steps
  listen                                   speak one command
  handsfree                                toggle \"Hey Mise\" listening
  stop                                     stop listening
  > <words>                                type what you would say
  progress <path>                          photo check of your dish
  transcript                               conversation so far
General:
  back, help, quit";

pub(crate) fn help(out: &mut impl Write) -> std::io::Result<()> {
    writeln!(out, "{}", HELP)
}

pub(crate) fn preferences(out: &mut impl Write, preferences: &Preferences) -> std::io::Result<()> {
    let time = preferences
        .cooking_time
        .map_or_else(|| "any".to_string(), |t| t.to_string());
    writeln!(out, "Time: {}  Dish: {}", time, preferences.dish_type)?;

    if !preferences.mood.is_empty() {
        writeln!(out, "Mood: {}", join(&preferences.mood))?;
    }
    if !preferences.dietary.is_empty() {
        writeln!(out, "Diet: {}", join(&preferences.dietary))?;
    }
    if let Some(name) = preferences.dish_name() {
        writeln!(out, "Dish name: {}", name)?;
    }
    if !preferences.ingredients_text().is_empty() {
        writeln!(out, "Ingredients: {}", preferences.ingredients_text())?;
    }
    if let Some(photo) = &preferences.ingredient_image {
        writeln!(out, "Photo: {} ({} bytes)", photo.mime_type(), photo.bytes().len())?;
    }
    Ok(())
}

pub(crate) fn recipes(out: &mut impl Write, recipes: &[Arc<Recipe>]) -> std::io::Result<()> {
    for (index, recipe) in recipes.iter().enumerate() {
        writeln!(
            out,
            "{}. {} ({}, {})",
            index + 1,
            recipe.name,
            recipe.prep_time,
            recipe.difficulty
        )?;
        writeln!(out, "   {}", recipe.ingredient_summary())?;
    }
    writeln!(out, "Type 'select <n>' to start cooking.")
}

pub(crate) fn recipe(out: &mut impl Write, recipe: &Recipe) -> std::io::Result<()> {
    writeln!(out, "== {} ==", recipe.name)?;
    writeln!(out, "Ingredients: {}", recipe.ingredient_summary())?;
    writeln!(out, "{} steps", recipe.step_count())
}

pub(crate) fn reply(out: &mut impl Write, text: &str) -> std::io::Result<()> {
    writeln!(out, "Mise: {}", text)
}

pub(crate) fn exchange(out: &mut impl Write, user: &str, assistant: &str) -> std::io::Result<()> {
    writeln!(out, "You: {}", user)?;
    reply(out, assistant)
}

pub(crate) fn transcript(out: &mut impl Write, entries: &[TranscriptEntry]) -> std::io::Result<()> {
    if entries.is_empty() {
        return writeln!(out, "Nothing said yet.");
    }
    for entry in entries {
        let speaker = match entry.role {
            Role::User => "You",
            Role::Assistant => "Mise",
        };
        writeln!(out, "{}: {}", speaker, entry.text)?;
    }
    Ok(())
}

pub(crate) fn notice(out: &mut impl Write, notice: &VoiceNotice) -> std::io::Result<()> {
    match notice {
        VoiceNotice::CapabilityMissing => writeln!(
            out,
            "Speech recognition is not available here. Check the microphone and Whisper model, or set [voice].capture = \"keyboard\"."
        ),
        VoiceNotice::RetriesExhausted { attempts } => writeln!(
            out,
            "Hands-free listening stopped after {} microphone errors.",
            attempts
        ),
        VoiceNotice::Exchange { user, assistant } => exchange(out, user, assistant),
    }
}

pub(crate) fn status(out: &mut impl Write, text: Option<&str>) -> std::io::Result<()> {
    writeln!(out, "[{}]", text.unwrap_or("Voice input off"))
}

pub(crate) fn error(out: &mut impl Write, error: &dyn std::fmt::Display) -> std::io::Result<()> {
    writeln!(out, "Error: {}", error)
}

pub(crate) fn prompt(out: &mut impl Write) -> std::io::Result<()> {
    write!(out, "{}", PROMPT)?;
    out.flush()
}

fn join<T: std::fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
