//! Convenience re-exports.

pub use crate::artifact::UploadedArtifact;
pub use crate::config::PublishConfig;
pub use crate::orchestrator::{PostProcessOutput, UploadOrchestrator};
pub use crate::validator::ConfigValidator;
