use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// The input a value (or a rejected key) came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer {
    CommandLine,
    File,
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Layer::CommandLine => f.write_str("the command line"),
            Layer::File => f.write_str("a config file"),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid command line: {0}")]
    CommandLine(#[source] clap::Error),

    #[error("Option '{option}' cannot be set from {layer}")]
    SchemaViolation { option: String, layer: Layer },

    #[error("Unknown key '{key}' in {path} (line {line})")]
    UnknownKey {
        key: String,
        path: PathBuf,
        line: usize,
    },

    #[error("Unknown keys in config file")]
    UnknownKeys(Vec<ConfigError>),

    #[error("Failed to parse {path}: {source}")]
    FileParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    IniParse {
        path: PathBuf,
        source: ini::ParseError,
    },

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid value for '{key}' in {path}: {reason}")]
    InvalidFileValue {
        key: String,
        path: PathBuf,
        reason: String,
    },

    #[error("Option '{option}' has an invalid value: {value}")]
    Validation { option: String, value: String },

    #[error("Duplicate {kind} '{name}' in schema")]
    DuplicateName { kind: &'static str, name: String },

    #[error("'{name}' is reserved for a built-in flag")]
    ReservedName { name: String },

    #[error("Invalid name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    #[error(
        "App name is required to discover a config file; \
         call .app_name() or .file_name() on the builder"
    )]
    AppNameRequired,

    #[error("Internal error: {0}")]
    Internal(String),
}
