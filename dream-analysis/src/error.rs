//! Error types for dream-analysis
//!
//! Errors fall into two severities:
//! - **Fatal** (startup): model artifacts missing or corrupt. The process cannot serve.
//! - **Per-request**: the embedding/inference backend failed for one text.
//!   Surfaced to the caller as-is; the core never retries.

use std::path::PathBuf;
use thiserror::Error;

/// Analysis error type
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Required artifact directory or file is absent
    #[error("Model unavailable: {reason} ({})", path.display())]
    ModelUnavailable { path: PathBuf, reason: String },

    /// Artifact exists but cannot be parsed or has inconsistent shapes
    #[error("Corrupt model artifact {}: {reason}", path.display())]
    ArtifactCorrupt { path: PathBuf, reason: String },

    /// Embedding or classifier backend failed for this request
    #[error("Analysis failed: {0}")]
    Inference(String),

    /// Caller-side validation failure (empty text, malformed month, ...)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// dream-common error
    #[error("Common error: {0}")]
    Common(#[from] dream_common::Error),
}

impl AnalysisError {
    /// True for errors that mean the process cannot serve any request
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            AnalysisError::ModelUnavailable { .. } | AnalysisError::ArtifactCorrupt { .. }
        )
    }

    pub(crate) fn unavailable(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        AnalysisError::ModelUnavailable {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn corrupt(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        AnalysisError::ArtifactCorrupt {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// Result type for analysis operations
pub type AnalysisResult<T> = Result<T, AnalysisError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_classification() {
        assert!(AnalysisError::unavailable("/models/valence", "directory missing").is_fatal());
        assert!(AnalysisError::corrupt("/models/facets/weights.json", "bad shape").is_fatal());
        assert!(!AnalysisError::Inference("backend timeout".into()).is_fatal());
        assert!(!AnalysisError::InvalidInput("empty text".into()).is_fatal());
    }

    #[test]
    fn test_unavailable_message_names_path() {
        let err = AnalysisError::unavailable("/models/valence", "directory missing");
        let msg = err.to_string();
        assert!(msg.contains("/models/valence"), "message was: {}", msg);
        assert!(msg.contains("directory missing"));
    }

    #[test]
    fn test_common_error_is_wrapped_not_fatal() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "bad root");
        let err: AnalysisError = dream_common::Error::from(io).into();
        assert!(matches!(err, AnalysisError::Common(_)));
        assert!(!err.is_fatal());
        assert!(err.to_string().contains("bad root"));
    }
}
