#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

/// Tracing target for messages forwarded from the host UI.
pub const TRACING_TARGET_UI: &str = "stowage_core::ui";

mod artifact;
mod error;
mod ui;

pub mod template;

#[doc(hidden)]
pub mod prelude;

pub use artifact::{Artifact, LocalArtifact};
pub use error::{BoxedError, Error, ErrorKind, Result, ValidationErrors};
pub use template::{TemplateContext, TemplateError, UserVariables};
pub use ui::{TracingUi, Ui};
