//! Operator interaction.
//! The resolver talks to a [`Prompter`]; the binary uses dialoguer, tests and
//! `--yes` runs use [`DefaultPrompter`].

use std::fmt;
use std::io;

use dialoguer::{theme::ColorfulTheme, Input, Select};

use crate::error::{Error, Result};

/// One selectable answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    pub label: String,
    pub hint: String,
}

impl Choice {
    pub fn new<L: Into<String>, H: Into<String>>(label: L, hint: H) -> Self {
        Self { label: label.into(), hint: hint.into() }
    }
}

impl fmt::Display for Choice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.hint.is_empty() {
            f.write_str(&self.label)
        } else {
            write!(f, "{} ({})", self.label, self.hint)
        }
    }
}

/// Validation callback for free-text answers; `Err` carries the message shown
/// to the operator.
pub type TextValidator<'a> = &'a dyn Fn(&str) -> std::result::Result<(), String>;

pub trait Prompter {
    /// Asks for free text until `validate` accepts it.
    fn text(&self, prompt: &str, default: Option<&str>, validate: TextValidator) -> Result<String>;

    /// Asks the operator to pick one of `choices`, returning its index.
    fn select(&self, prompt: &str, choices: &[Choice], default: usize) -> Result<usize>;
}

/// Interactive prompter backed by dialoguer.
#[derive(Default)]
pub struct DialoguerPrompter {
    theme: ColorfulTheme,
}

impl DialoguerPrompter {
    pub fn new() -> Self {
        Self::default()
    }
}

fn map_dialoguer_error(err: dialoguer::Error) -> Error {
    match err {
        dialoguer::Error::IO(e) if e.kind() == io::ErrorKind::Interrupted => Error::Cancelled,
        dialoguer::Error::IO(e) => Error::Io { path: "<terminal>".into(), source: e },
    }
}

impl Prompter for DialoguerPrompter {
    fn text(&self, prompt: &str, default: Option<&str>, validate: TextValidator) -> Result<String> {
        let mut input = Input::<String>::with_theme(&self.theme).with_prompt(prompt);
        if let Some(default) = default {
            input = input.default(default.to_string());
        }
        input
            .validate_with(|value: &String| validate(value))
            .interact_text()
            .map_err(map_dialoguer_error)
    }

    fn select(&self, prompt: &str, choices: &[Choice], default: usize) -> Result<usize> {
        Select::with_theme(&self.theme)
            .with_prompt(prompt)
            .items(choices)
            .default(default)
            .interact_opt()
            .map_err(map_dialoguer_error)?
            .ok_or(Error::Cancelled)
    }
}

/// Non-interactive prompter answering every question with its default.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultPrompter;

impl Prompter for DefaultPrompter {
    fn text(&self, prompt: &str, default: Option<&str>, validate: TextValidator) -> Result<String> {
        let value = default.ok_or_else(|| {
            Error::validation("input", format!("'{prompt}' has no default in non-interactive mode"))
        })?;
        validate(value).map_err(|msg| Error::validation("input", msg))?;
        Ok(value.to_string())
    }

    fn select(&self, _prompt: &str, choices: &[Choice], default: usize) -> Result<usize> {
        if default < choices.len() {
            Ok(default)
        } else {
            Err(Error::validation("input", "default choice out of range"))
        }
    }
}
