//! Transform Errors
//!
//! Every failure raised while binding jobs to config tasks or expanding
//! them into chunks. All of them abort the whole transform run.

use thiserror::Error;

/// Errors produced by the update-verify chunking transform.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransformError {
    /// No config task in the kind dependencies provides this job's name.
    #[error("Job '{job}': no update-verify config task found with a matching name")]
    NoConfigTask { job: String },

    /// Two config tasks derive the same name.
    #[error("Config tasks '{first}' and '{second}' both provide job name '{name}'")]
    DuplicateConfigTask {
        name: String,
        first: String,
        second: String,
    },

    /// A dependency task's label does not start with `<kind>-` and it has
    /// no `name` attribute.
    #[error("Task '{label}' does not have a name (label must start with '{kind}-' or a name attribute must be set)")]
    UnnamedTask { label: String, kind: String },

    #[error("Job '{job}' has no extra.chunks value")]
    MissingChunkCount { job: String },

    #[error("Job '{job}': extra.chunks must be a non-negative integer, got {value}")]
    InvalidChunkCount { job: String, value: String },

    /// A required field is absent from a dependency task definition.
    #[error("Task '{label}' is missing required field '{field}'")]
    MissingField { label: String, field: String },

    #[error("Job '{job}' has no treeherder symbol")]
    MissingSymbol { job: String },

    #[error("Job '{job}': malformed treeherder symbol '{symbol}'")]
    MalformedSymbol { job: String, symbol: String },
}

/// Result alias used across the transform.
pub type Result<T> = std::result::Result<T, TransformError>;
