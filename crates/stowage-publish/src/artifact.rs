//! Artifact describing the objects written by a publish run.

use std::fmt;

use serde::{Deserialize, Serialize};
use stowage_core::{Artifact, Result};

use crate::{PRODUCER_ID, TRACING_TARGET};

/// Result of a successful publish.
///
/// `files` mirrors the source artifact's local file list, in the same
/// order, rather than the remote keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedArtifact {
    id: String,
    bucket: String,
    prefix: String,
    files: Vec<String>,
}

impl UploadedArtifact {
    /// Creates an artifact for `files` published under `bucket`/`prefix`.
    pub fn new(bucket: impl Into<String>, prefix: impl Into<String>, files: Vec<String>) -> Self {
        Self {
            id: String::new(),
            bucket: bucket.into(),
            prefix: prefix.into(),
            files,
        }
    }

    /// Sets the artifact identifier.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Bucket the files were written to.
    pub fn store_location_bucket(&self) -> &str {
        &self.bucket
    }

    /// Key prefix the files were written under.
    pub fn store_location_prefix(&self) -> &str {
        &self.prefix
    }
}

impl Artifact for UploadedArtifact {
    fn id(&self) -> &str {
        &self.id
    }

    fn producer_id(&self) -> &str {
        PRODUCER_ID
    }

    fn files(&self) -> &[String] {
        &self.files
    }

    fn describe(&self) -> String {
        self.to_string()
    }

    // Remote objects outlive the descriptor.
    fn destroy(&self) -> Result<()> {
        tracing::debug!(
            target: TRACING_TARGET,
            bucket = %self.bucket,
            prefix = %self.prefix,
            "Uploaded artifact released, remote objects kept"
        );
        Ok(())
    }
}

impl fmt::Display for UploadedArtifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Uploaded files: {}.", self.files.join(", "))
    }
}
