//! Error handling for create-amp.
//! Defines the error taxonomy shared by every stage of project generation.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Individual project name rules, reported so the operator knows exactly
/// which constraint was violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameRule {
    Empty,
    SurroundingWhitespace,
    LeadingDot,
    LeadingUnderscore,
    TooLong,
    Uppercase,
    UnsafeCharacters,
    Blocklisted,
    ReservedBuiltin,
    MalformedScope,
}

impl fmt::Display for NameRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            NameRule::Empty => "name must not be empty",
            NameRule::SurroundingWhitespace => {
                "name must not have leading or trailing whitespace"
            }
            NameRule::LeadingDot => "name must not start with a '.'",
            NameRule::LeadingUnderscore => "name must not start with an '_'",
            NameRule::TooLong => "name must be at most 214 characters",
            NameRule::Uppercase => "name must not contain capital letters",
            NameRule::UnsafeCharacters => {
                "name may only contain URL-safe characters (a-z, 0-9, '-', '_', '.', '~')"
            }
            NameRule::Blocklisted => "name is blocklisted",
            NameRule::ReservedBuiltin => "name collides with a core module name",
            NameRule::MalformedScope => "scoped names must look like '@scope/name'",
        };
        f.write_str(msg)
    }
}

/// Reason attached to a validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    Name(NameRule),
    Message(String),
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::Name(rule) => write!(f, "{rule}"),
            Violation::Message(msg) => f.write_str(msg),
        }
    }
}

/// Custom error types for create-amp operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Operator input that cannot be used to generate a project.
    #[error("Invalid {field}: {violation}.")]
    Validation { field: &'static str, violation: Violation },

    #[error("Target directory '{}' already exists and is not empty.", .path.display())]
    TargetNotEmpty { path: PathBuf },

    #[error("Template '{key}' not found in corpus (expected directory '{}').", .path.display())]
    TemplateNotFound { key: String, path: PathBuf },

    /// Represents errors that occur during file system operations
    #[error("IO error at '{}': {source}.", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot merge '{}' at key '{key}': {reason}.", .path.display())]
    MergeConflict { path: PathBuf, key: String, reason: String },

    #[error("Malformed fragment '{}' (line {line}): {reason}.", .path.display())]
    MalformedFragment { path: PathBuf, line: usize, reason: String },

    #[error("Invalid package manifest '{}': {reason}.", .path.display())]
    InvalidManifest { path: PathBuf, reason: String },

    #[error("Inclusion rules error: {0}.")]
    Rules(String),

    #[error("{tool} failed: {message}.")]
    ExternalTool { tool: String, message: String },

    #[error("Network error: {0}.")]
    Network(String),

    #[error("Operation cancelled.")]
    Cancelled,

    #[error("Generation interrupted.")]
    Interrupted,

    #[error("Git error: {0}.")]
    Git2Error(#[from] git2::Error),

    #[error("JSON error: {0}.")]
    Json(#[from] serde_json::Error),

    #[error("Template rendering error: {0}.")]
    MinijinjaError(#[from] minijinja::Error),
}

impl Error {
    /// Wraps an I/O error with the path it happened on.
    pub fn io<P: Into<PathBuf>>(path: P) -> impl FnOnce(std::io::Error) -> Error {
        let path = path.into();
        move |source| Error::Io { path, source }
    }

    pub fn validation<S: Into<String>>(field: &'static str, message: S) -> Error {
        Error::Validation { field, violation: Violation::Message(message.into()) }
    }
}

/// Convenience type alias for Results with create-amp's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Default error handler that prints the error and exits the program.
///
/// Cancellation is not a failure: a notice is printed and the process exits
/// with status 0. Everything else exits with status 1.
pub fn default_error_handler(err: Error) {
    match err {
        Error::Cancelled => {
            eprintln!("{err}");
            std::process::exit(0);
        }
        _ => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    }
}
