//! Mock implementations of the host and storage capabilities.
//!
//! These are useful for unit and integration testing of the publisher
//! without network access.

mod store;
mod ui;

pub use store::{MockContainer, MockObjectStore, MockSession, PutRecord};
pub use ui::RecordingUi;
