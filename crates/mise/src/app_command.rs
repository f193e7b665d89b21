use crate::{AppError, AppResult};

use std::{path::PathBuf, str::FromStr};

use mise_core::{CookingTime, Dietary, DishType, Mood};

/// Commands typed at the prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    /// Set the cooking time; `None` clears it.
    SetCookingTime(Option<CookingTime>),
    /// Set the dish type.
    SetDishType(DishType),
    /// Toggle a mood.
    ToggleMood(Mood),
    /// Toggle a dietary constraint.
    ToggleDietary(Dietary),
    /// Replace the ingredient text.
    SetIngredients(String),
    /// Set a specific dish; `None` clears it.
    SetDishName(Option<String>),
    /// Attach an ingredient photo; `None` removes it.
    SetPhoto(Option<PathBuf>),
    /// Generate recipes from the preferences.
    Generate,
    /// Select a recipe (zero-based) and start cooking.
    Select(usize),
    /// Next step.
    Next,
    /// Previous step.
    Previous,
    /// Jump to a step (zero-based).
    Step(usize),
    /// Read the current step again.
    Repeat,
    /// Listen for one command.
    Listen,
    /// Toggle hands-free listening.
    HandsFree,
    /// Stop voice input.
    StopVoice,
    /// Ask for feedback on a photo of the dish.
    Progress(PathBuf),
    /// A spoken utterance, for the keyboard capture backend.
    Say(String),
    /// Show the conversation for the current recipe.
    Transcript,
    /// Previous screen.
    Back,
    /// List commands.
    Help,
    /// Exit.
    Quit,
}

impl FromStr for AppCommand {
    type Err = AppError;

    #[track_caller]
    fn from_str(line: &str) -> AppResult<Self> {
        let line = line.trim();

        if let Some(utterance) = line.strip_prefix('>') {
            let utterance = utterance.trim();
            if utterance.is_empty() {
                return Err(AppError::invalid_command("say something after '>'"));
            }
            return Ok(AppCommand::Say(utterance.to_string()));
        }

        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        let command = match word.to_lowercase().as_str() {
            "time" => match rest {
                "" | "any" => AppCommand::SetCookingTime(None),
                label => AppCommand::SetCookingTime(Some(lookup(
                    label,
                    CookingTime::from_label,
                    CookingTime::ALL,
                )?)),
            },
            "dish" => AppCommand::SetDishType(lookup(rest, DishType::from_label, DishType::ALL)?),
            "mood" => AppCommand::ToggleMood(lookup(rest, Mood::from_label, Mood::ALL)?),
            "diet" => AppCommand::ToggleDietary(lookup(rest, Dietary::from_label, Dietary::ALL)?),
            "ingredients" => AppCommand::SetIngredients(rest.to_string()),
            "name" => AppCommand::SetDishName(non_empty(rest)),
            "photo" => AppCommand::SetPhoto(non_empty(rest).map(PathBuf::from)),
            "generate" => AppCommand::Generate,
            "select" => AppCommand::Select(one_based(rest)?),
            "next" => AppCommand::Next,
            "prev" | "previous" => AppCommand::Previous,
            "step" => AppCommand::Step(one_based(rest)?),
            "repeat" => AppCommand::Repeat,
            "listen" => AppCommand::Listen,
            "handsfree" => AppCommand::HandsFree,
            "stop" => AppCommand::StopVoice,
            "progress" => match non_empty(rest) {
                Some(path) => AppCommand::Progress(PathBuf::from(path)),
                None => return Err(AppError::invalid_command("progress needs a photo path")),
            },
            "transcript" => AppCommand::Transcript,
            "back" => AppCommand::Back,
            "help" | "?" => AppCommand::Help,
            "quit" | "exit" => AppCommand::Quit,
            other => {
                return Err(AppError::invalid_command(format!(
                    "unknown command '{}' (type 'help')",
                    other
                )));
            }
        };

        Ok(command)
    }
}

#[track_caller]
fn lookup<T: Copy + std::fmt::Display>(
    label: &str,
    parse: fn(&str) -> Option<T>,
    all: &[T],
) -> AppResult<T> {
    parse(label).ok_or_else(|| {
        let choices: Vec<String> = all.iter().map(ToString::to_string).collect();
        AppError::invalid_command(format!(
            "'{}' is not one of: {}",
            label,
            choices.join(", ")
        ))
    })
}

#[track_caller]
fn one_based(number: &str) -> AppResult<usize> {
    match number.parse::<usize>() {
        Ok(n) if n >= 1 => Ok(n - 1),
        _ => Err(AppError::invalid_command(format!(
            "expected a number from 1, got '{}'",
            number
        ))),
    }
}

fn non_empty(text: &str) -> Option<String> {
    (!text.is_empty()).then(|| text.to_string())
}
