//! Unified error types for apidiff.
//!
//! Dispatch mismatches are never errors: a constraint or rule that does not
//! apply simply does nothing. Errors are reserved for malformed input
//! (snapshots that break their own invariants, records missing the entity a
//! rule requires) and for configuration problems.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for apidiff operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ApiDiffError {
    /// Errors while building an API snapshot
    #[error("Invalid snapshot: {context}")]
    Snapshot {
        context: String,
        #[source]
        source: SnapshotErrorKind,
    },

    /// Errors raised by a constraint during detection
    #[error("Detection failed: {context}")]
    Detection {
        context: String,
        #[source]
        source: DetectionErrorKind,
    },

    /// Errors raised by an evaluation rule
    #[error("Rule evaluation failed: {context}")]
    Evaluation {
        context: String,
        #[source]
        source: EvaluationErrorKind,
    },

    /// IO errors with context
    #[error("IO error at {path:?}: {message}")]
    Io {
        path: Option<PathBuf>,
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Configuration errors
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Validation errors
    #[error("Validation failed: {0}")]
    Validation(String),
}

/// Specific snapshot error kinds
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum SnapshotErrorKind {
    #[error("Entity id must not be empty")]
    EmptyId,

    #[error("Duplicate entity id: {id}")]
    DuplicateEntity { id: String },

    #[error("Entry key '{key}' does not match entity id '{id}'")]
    KeyMismatch { key: String, id: String },
}

/// Specific detection error kinds
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum DetectionErrorKind {
    #[error("Constraint '{constraint}' failed: {message}")]
    CheckerFailed { constraint: String, message: String },
}

/// Specific evaluation error kinds
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum EvaluationErrorKind {
    #[error("Missing {side} entity for {kind}")]
    MissingEntity { kind: String, side: &'static str },

    #[error("Expected {expected} entity for {kind}, found {found}")]
    UnexpectedEntityKind {
        kind: String,
        expected: String,
        found: String,
    },

    #[error("Missing data field '{field}' for {kind}")]
    MissingData { kind: String, field: String },
}

/// Convenient Result type alias for apidiff operations
pub type Result<T> = std::result::Result<T, ApiDiffError>;

impl ApiDiffError {
    /// Create a snapshot error with context
    pub fn snapshot(context: impl Into<String>, source: SnapshotErrorKind) -> Self {
        Self::Snapshot {
            context: context.into(),
            source,
        }
    }

    /// Create a detection error with context
    pub fn detection(context: impl Into<String>, source: DetectionErrorKind) -> Self {
        Self::Detection {
            context: context.into(),
            source,
        }
    }

    /// Create an evaluation error with context
    pub fn evaluation(context: impl Into<String>, source: EvaluationErrorKind) -> Self {
        Self::Evaluation {
            context: context.into(),
            source,
        }
    }

    /// Create a detection error for a checker that produced malformed output
    pub fn checker_failed(constraint: impl Into<String>, message: impl Into<String>) -> Self {
        let constraint = constraint.into();
        Self::detection(
            format!("constraint {constraint}"),
            DetectionErrorKind::CheckerFailed {
                constraint,
                message: message.into(),
            },
        )
    }

    /// Create an evaluation error for a record missing one of its entities
    pub fn missing_entity(kind: impl Into<String>, side: &'static str) -> Self {
        let kind = kind.into();
        Self::evaluation(
            format!("record {kind}"),
            EvaluationErrorKind::MissingEntity { kind, side },
        )
    }

    /// Create an IO error with path context
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let message = format!("{source}");
        Self::Io {
            path: Some(path.into()),
            message,
            source,
        }
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}

// ============================================================================
// Conversions from existing error types
// ============================================================================

impl From<std::io::Error> for ApiDiffError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            path: None,
            message: format!("{err}"),
            source: err,
        }
    }
}

impl From<serde_yaml::Error> for ApiDiffError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Config(err.to_string())
    }
}

// ============================================================================
// Error context extension trait
// ============================================================================

/// Extension trait for adding context to errors.
///
/// The context string is prepended to the error's existing context, so a
/// failure deep inside a rule reads like `evaluating RemoveFunction: record
/// RemoveFunction`.
pub trait ErrorContext<T> {
    /// Add context to an error.
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context from a closure (only called on error).
    fn with_context<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>;
}

impl<T, E: Into<ApiDiffError>> ErrorContext<T> for std::result::Result<T, E> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        let ctx: String = context.into();
        self.map_err(|e| add_context_to_error(e.into(), &ctx))
    }

    fn with_context<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>,
    {
        self.map_err(|e| {
            let ctx: String = f().into();
            add_context_to_error(e.into(), &ctx)
        })
    }
}

fn add_context_to_error(err: ApiDiffError, new_ctx: &str) -> ApiDiffError {
    match err {
        ApiDiffError::Snapshot { context, source } => ApiDiffError::Snapshot {
            context: chain_context(new_ctx, &context),
            source,
        },
        ApiDiffError::Detection { context, source } => ApiDiffError::Detection {
            context: chain_context(new_ctx, &context),
            source,
        },
        ApiDiffError::Evaluation { context, source } => ApiDiffError::Evaluation {
            context: chain_context(new_ctx, &context),
            source,
        },
        ApiDiffError::Io {
            path,
            message,
            source,
        } => ApiDiffError::Io {
            path,
            message: chain_context(new_ctx, &message),
            source,
        },
        ApiDiffError::Config(msg) => ApiDiffError::Config(chain_context(new_ctx, &msg)),
        ApiDiffError::Validation(msg) => ApiDiffError::Validation(chain_context(new_ctx, &msg)),
    }
}

/// Chain two context strings as "`new`: `existing`".
fn chain_context(new: &str, existing: &str) -> String {
    if existing.is_empty() {
        new.to_string()
    } else {
        format!("{new}: {existing}")
    }
}

/// Extension trait for Option types to convert to errors with context.
pub trait OptionContext<T> {
    /// Convert None to an error built by a closure.
    fn or_error<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> ApiDiffError;
}

impl<T> OptionContext<T> for Option<T> {
    fn or_error<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> ApiDiffError,
    {
        self.ok_or_else(f)
    }
}
