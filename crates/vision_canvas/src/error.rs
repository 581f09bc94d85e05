//! Error types for annotation persistence.

use thiserror::Error;

/// Errors that can occur while loading annotations from JSON.
#[derive(Error, Debug)]
pub enum AnnotationError {
    /// JSON parsing or serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// No kind with this tag is registered
    #[error("Unknown annotation kind: {kind}")]
    UnknownKind {
        /// The tag found in the record
        kind: String,
    },

    /// The record's fields do not match the geometry of its kind
    #[error("Annotation kind '{kind}' expects {expected} geometry")]
    ShapeMismatch {
        /// The tag found in the record
        kind: String,
        /// Geometry the registered kind expects
        expected: String,
    },
}

impl AnnotationError {
    /// Create an unknown kind error.
    pub fn unknown_kind(kind: impl Into<String>) -> Self {
        Self::UnknownKind { kind: kind.into() }
    }

    /// Create a shape mismatch error.
    pub fn shape_mismatch(kind: impl Into<String>, expected: impl Into<String>) -> Self {
        Self::ShapeMismatch {
            kind: kind.into(),
            expected: expected.into(),
        }
    }
}
