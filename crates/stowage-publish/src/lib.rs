#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod artifact;
mod config;
mod orchestrator;
mod validator;

#[doc(hidden)]
pub mod prelude;

pub use artifact::UploadedArtifact;
pub use config::PublishConfig;
pub use orchestrator::{PostProcessOutput, UploadOrchestrator, remote_key};
pub use validator::ConfigValidator;

/// Producer tag carried by every [`UploadedArtifact`].
pub const PRODUCER_ID: &str = "stowage.post-processor.object-upload";

/// Content type sent with every uploaded object.
pub const CONTENT_TYPE: &str = "application/x-tar";

/// Tracing target for publishing operations.
pub const TRACING_TARGET: &str = "stowage_publish";
