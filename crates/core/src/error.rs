//! Fatal errors and non-fatal warnings produced by a conversion.

use std::fmt;

use thiserror::Error;

/// A failure that aborts the whole conversion.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// A `$ref` pointer could not be resolved to a node of the document.
    #[error("cannot resolve reference `{pointer}`: {reason}")]
    Resolution {
        /// The pointer as written in the document.
        pointer: String,
        /// Why resolution failed.
        reason: String,
    },

    /// The document does not have a usable top-level shape.
    #[error("malformed document: {0}")]
    MalformedDocument(String),

    /// The namespace option is not a valid (dotted) identifier.
    #[error("invalid namespace `{0}`")]
    InvalidNamespace(String),

    /// The input text is neither JSON nor YAML.
    #[error("failed to parse input: {0}")]
    Parse(String),
}

impl ConvertError {
    pub(crate) fn resolution(pointer: &str, reason: impl Into<String>) -> Self {
        Self::Resolution {
            pointer: pointer.to_string(),
            reason: reason.into(),
        }
    }
}

/// Category of a non-fatal issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningKind {
    /// A schema construct that cannot be expressed and was replaced by `any`.
    UnsupportedConstruct,
    /// Two declarations sanitized to the same name; one was suffixed.
    DuplicateName,
    /// A reference cycle made only of type aliases; the closing reference became `any`.
    CircularAlias,
}

impl fmt::Display for WarningKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            WarningKind::UnsupportedConstruct => "unsupported construct",
            WarningKind::DuplicateName => "duplicate name",
            WarningKind::CircularAlias => "circular alias",
        };
        f.write_str(label)
    }
}

/// A non-fatal issue collected while converting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    /// What went wrong.
    pub kind: WarningKind,
    /// JSON pointer of the schema node the warning is about.
    pub pointer: String,
    /// Human readable detail.
    pub message: String,
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}: {}", self.kind, self.pointer, self.message)
    }
}
