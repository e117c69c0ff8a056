use std::path::PathBuf;
use thiserror::Error;

use crate::PartitionKey;

/// Why a manifest could not produce any documents.
#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("cannot open manifest {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("manifest is missing the document count line")]
    MissingCount,

    #[error("manifest count is not a number: {0:?}")]
    InvalidCount(String),

    #[error("manifest count must be positive, got {0}")]
    NonPositiveCount(i64),
}

/// Main error type for pipeline runs
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("invalid configuration: {0}")]
    Configuration(String),

    #[error("manifest error: {0}")]
    Manifest(#[from] ManifestError),

    #[error("manifest lists no documents")]
    EmptyManifest,

    #[error("failed to write partition {partition}: {source}")]
    OutputWrite {
        partition: PartitionKey,
        #[source]
        source: std::io::Error,
    },

    #[error("index is frozen; no merges are accepted after the map phase")]
    IndexFrozen,

    #[error("summary serialization error: {0}")]
    Summary(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PipelineError>;

impl PipelineError {
    /// Failures that happen before any worker starts and leave no output behind.
    pub fn is_setup_failure(&self) -> bool {
        matches!(
            self,
            PipelineError::Configuration(_) | PipelineError::Manifest(_) | PipelineError::EmptyManifest
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PipelineError::from(ManifestError::NonPositiveCount(0));
        assert_eq!(err.to_string(), "manifest error: manifest count must be positive, got 0");

        let err = PipelineError::OutputWrite {
            partition: PartitionKey::ALL[2],
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(err.to_string(), "failed to write partition c: denied");
    }

    #[test]
    fn test_setup_failures() {
        assert!(PipelineError::EmptyManifest.is_setup_failure());
        assert!(PipelineError::Configuration("x".into()).is_setup_failure());
        assert!(!PipelineError::IndexFrozen.is_setup_failure());
    }
}
