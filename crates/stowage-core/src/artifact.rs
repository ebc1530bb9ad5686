//! Build-output artifacts exchanged with the host pipeline.

use serde::{Deserialize, Serialize};

use crate::Result;

/// A unit of build output.
///
/// Artifacts are produced by one pipeline step and consumed by the next.
/// The [`producer_id`](Artifact::producer_id) lets downstream steps tell
/// where an artifact came from.
pub trait Artifact: Send + Sync {
    /// Opaque identifier, may be empty.
    fn id(&self) -> &str;

    /// Stable tag identifying the component that produced this artifact.
    fn producer_id(&self) -> &str;

    /// Ordered file paths making up this artifact.
    fn files(&self) -> &[String];

    /// Human-readable summary.
    fn describe(&self) -> String;

    /// Releases whatever the artifact owns.
    fn destroy(&self) -> Result<()>;
}

/// Artifact made of files on the local filesystem, as handed over by a
/// build step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalArtifact {
    id: String,
    producer_id: String,
    files: Vec<String>,
}

impl LocalArtifact {
    /// Creates an artifact over `files` tagged with `producer_id`.
    pub fn new<I, S>(producer_id: impl Into<String>, files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: String::new(),
            producer_id: producer_id.into(),
            files: files.into_iter().map(Into::into).collect(),
        }
    }

    /// Sets the artifact identifier.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }
}

impl Artifact for LocalArtifact {
    fn id(&self) -> &str {
        &self.id
    }

    fn producer_id(&self) -> &str {
        &self.producer_id
    }

    fn files(&self) -> &[String] {
        &self.files
    }

    fn describe(&self) -> String {
        format!("Local files: {}.", self.files.join(", "))
    }

    // The files belong to the build that produced them.
    fn destroy(&self) -> Result<()> {
        Ok(())
    }
}
