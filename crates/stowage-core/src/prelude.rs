//! Convenience re-exports.

pub use crate::artifact::{Artifact, LocalArtifact};
pub use crate::error::{Error, ErrorKind, Result, ValidationErrors};
pub use crate::template::{TemplateContext, UserVariables};
pub use crate::ui::{TracingUi, Ui};
