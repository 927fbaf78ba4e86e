//! Errors raised while building a contract body.
//!
//! Every failure aborts the call that raised it. A builder that returned an
//! error is poisoned and refuses further calls.
use thiserror::Error;

use crate::path::Path;

pub type Result<T, E = BuildError> = std::result::Result<T, E>;

/// Which container a frame (or a call) deals with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContainerKind {
    Object,
    Array,
}

impl std::fmt::Display for ContainerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContainerKind::Object => f.write_str("object"),
            ContainerKind::Array => f.write_str("array"),
        }
    }
}

/// Coarse classification used by callers that only care about the family.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// The call sequence does not fit the document being built.
    Structural,
    /// A date/time pattern or expression could not be understood.
    Format,
    /// Some other caller-supplied input was rejected (regex, example, bounds, config).
    Input,
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum BuildError {
    #[error("cannot close past the root container")]
    PopRoot,

    #[error("`{call}` needs an {expected} container but the current one is an {found} (at `{path}`)")]
    ContainerMismatch {
        call: &'static str,
        expected: ContainerKind,
        found: ContainerKind,
        path: Path,
    },

    #[error("cannot graft at `{path}`: {reason}")]
    GraftTarget { path: Path, reason: &'static str },

    #[error("{open} container(s) still open at `{path}`")]
    Unclosed { open: usize, path: Path },

    #[error("builder already failed; start a new one")]
    Poisoned,

    #[error("invalid date/time pattern `{pattern}`: {reason}")]
    Pattern { pattern: String, reason: String },

    #[error("invalid date/time expression `{expression}`: {reason}")]
    Expression { expression: String, reason: String },

    #[error("invalid regex `{pattern}`: {reason}")]
    Regex { pattern: String, reason: String },

    #[error("example `{example}` does not match `{pattern}`")]
    ExampleMismatch { pattern: String, example: String },

    #[error("minimum length {min} exceeds maximum length {max}")]
    Cardinality { min: usize, max: usize },

    #[error("at JSON path {path} → {reason}")]
    Config { path: String, reason: String },
}

impl BuildError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            BuildError::PopRoot
            | BuildError::ContainerMismatch { .. }
            | BuildError::GraftTarget { .. }
            | BuildError::Unclosed { .. }
            | BuildError::Poisoned => ErrorKind::Structural,
            BuildError::Pattern { .. } | BuildError::Expression { .. } => ErrorKind::Format,
            BuildError::Regex { .. }
            | BuildError::ExampleMismatch { .. }
            | BuildError::Cardinality { .. }
            | BuildError::Config { .. } => ErrorKind::Input,
        }
    }

    pub fn is_structural(&self) -> bool {
        self.kind() == ErrorKind::Structural
    }

    pub fn is_format(&self) -> bool {
        self.kind() == ErrorKind::Format
    }

    pub(crate) fn pattern(pattern: &str, reason: impl Into<String>) -> Self {
        BuildError::Pattern { pattern: pattern.to_string(), reason: reason.into() }
    }

    pub(crate) fn expression(expression: &str, reason: impl Into<String>) -> Self {
        BuildError::Expression { expression: expression.to_string(), reason: reason.into() }
    }
}
