//! Host user-interface channel.

use std::sync::Arc;

use crate::TRACING_TARGET_UI;

/// Fire-and-forget progress channel provided by the host.
///
/// Messages are informational only; nothing reads them back to make
/// control decisions.
pub trait Ui: Send + Sync {
    /// Shows a single line of progress to the user.
    fn message(&self, message: &str);
}

impl<T: Ui + ?Sized> Ui for &T {
    fn message(&self, message: &str) {
        (**self).message(message);
    }
}

impl<T: Ui + ?Sized> Ui for Arc<T> {
    fn message(&self, message: &str) {
        (**self).message(message);
    }
}

/// [`Ui`] that forwards messages to `tracing` at info level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingUi;

impl Ui for TracingUi {
    fn message(&self, message: &str) {
        tracing::info!(target: TRACING_TARGET_UI, "{message}");
    }
}
