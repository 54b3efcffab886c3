//! Error types for checkall
//!
//! A non-zero exit status from a verification command is not an error:
//! it is an outcome, handled by the driver's abort rule. The variants
//! here cover everything that prevents the sweep from running at all.

use std::io;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the checkall CLI
#[derive(Error, Debug)]
pub enum Error {
    // === Configuration Errors ===
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration file: {0}")]
    ConfigParse(String),

    #[error("Duplicate feature '{0}' in feature list")]
    DuplicateFeature(String),

    #[error("Unknown verification command '{0}'. Expected one of: check, clippy, build, test")]
    UnknownCommand(String),

    // === Manifest Errors ===
    #[error("Failed to read manifest '{path}': {error}")]
    ManifestRead { path: String, error: String },

    #[error("Failed to parse manifest '{path}': {error}")]
    ManifestParse { path: String, error: String },

    // === Tool Errors ===
    #[error("Build tool '{0}' not found on PATH")]
    ToolNotFound(String),

    #[error("Failed to spawn '{command}': {error}")]
    Spawn {
        command: String,
        #[source]
        error: io::Error,
    },

    // === IO Errors ===
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    // === Internal Errors ===
    #[error("Internal error: {0}")]
    Internal(String),
}
