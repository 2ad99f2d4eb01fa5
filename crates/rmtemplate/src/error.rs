//! Error types for the rmtemplate crate

use crate::types::State;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while building rule tables or running a resource
#[derive(Error, Debug)]
pub enum Error {
    /// A rule pattern failed to compile
    #[error("invalid pattern in rule '{rule}': {source}")]
    InvalidPattern {
        rule: String,
        #[source]
        source: regex::Error,
    },

    /// Two rules in one table share a name
    #[error("duplicate rule name: {0}")]
    DuplicateRule(String),

    /// A rule name was referenced that the table does not contain
    #[error("unknown rule: {0}")]
    UnknownRule(String),

    /// A template failed to compile or evaluate
    #[error("failed to evaluate template '{template}': {source}")]
    Template {
        template: String,
        #[source]
        source: minijinja::Error,
    },

    /// A state that needs desired configuration got none
    #[error("value of config parameter must not be empty for state {0}")]
    EmptyWant(State),

    /// The parsed state needs offline device output
    #[error("value of running_config parameter must not be empty for state parsed")]
    MissingRunningConfig,

    /// A state that talks to the device was run without a connection
    #[error("state {0} requires a device connection")]
    MissingConnection(State),

    /// Rule file could not be decoded
    #[error("invalid rule file {}: {message}", .path.display())]
    RuleFile { path: PathBuf, message: String },

    /// Rule document could not be decoded
    #[error("invalid rule table: {0}")]
    RuleDocument(String),

    /// Template output could not be converted to a data tree
    #[error("failed to convert template output: {0}")]
    Conversion(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Failure reported by a facts or connection collaborator
    #[error(transparent)]
    Device(#[from] anyhow::Error),
}

/// Result type for rmtemplate operations
pub type Result<T> = std::result::Result<T, Error>;
