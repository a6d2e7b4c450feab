//! create-amp scaffolds Amp-powered applications from a layered template
//! corpus: it resolves the operator's choices, selects template layers,
//! substitutes placeholders, applies conditional inclusion and manifest
//! merges, then optionally initializes git and installs dependencies.

/// Template corpus catalog
pub mod catalog;

/// Command-line interface module for create-amp
pub mod cli;

/// Axis enums and the resolved project configuration
pub mod config;

/// Common constants
pub mod constants;

/// Substitution context and network lookup table
pub mod context;

/// Process environment captured once at startup
pub mod environment;

/// Error types and handling for create-amp
pub mod error;

/// Post-generation git initialization and dependency installation
pub mod hooks;

/// Whole-file skip rules and addition fragments
pub mod inclusion;

/// Ctrl-C handling
pub mod interrupt;

/// Template corpus retrieval from a local path or git repository
pub mod loader;

/// Logging setup
pub mod logger;

/// JSON deep merge and package manifest checks
pub mod manifest;

/// Project materialization
/// Combines all components to generate the final output
pub mod processor;

/// User input and interaction handling
pub mod prompt;

/// Generated README and .gitignore
pub mod readme;

/// Turns command-line flags and answers into a project configuration
pub mod resolver;

/// Maps a configuration onto ordered template layers
pub mod selector;

/// Placeholder substitution and binary detection
pub mod substitute;

/// Project name validation and path resolution
pub mod validate;
