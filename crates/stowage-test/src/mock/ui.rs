//! UI double that keeps every message.

use std::sync::{Arc, Mutex, PoisonError};

use stowage_core::Ui;

/// [`Ui`] that records messages in order.
///
/// Clones share the same message log.
#[derive(Debug, Clone, Default)]
pub struct RecordingUi {
    messages: Arc<Mutex<Vec<String>>>,
}

impl RecordingUi {
    /// Creates an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every message received so far.
    pub fn messages(&self) -> Vec<String> {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Ui for RecordingUi {
    fn message(&self, message: &str) {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message.to_owned());
    }
}
