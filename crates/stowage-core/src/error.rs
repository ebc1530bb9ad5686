//! Structured error handling for publishing operations.

use std::fmt;

use hipstr::HipStr;
use strum::{AsRefStr, Display, EnumString, IntoStaticStr};
use thiserror::Error;

/// Type alias for boxed dynamic errors that can be sent across threads.
pub type BoxedError = Box<dyn std::error::Error + Send + Sync>;

/// Type alias for Results with our custom Error type.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Categories of errors that can occur while configuring or publishing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[derive(AsRefStr, Display, EnumString, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    /// Raw configuration could not be decoded.
    ConfigDecode,
    /// A required configuration field is empty.
    MissingField,
    /// Variable substitution in a configuration value failed.
    TemplateResolution,
    /// The configured region is not a known region.
    InvalidRegion,
    /// Credentials were rejected while configuring.
    Credential,
    /// Aggregate of every problem found while validating configuration.
    Validation,
    /// Publishing was attempted before a successful configuration.
    NotConfigured,
    /// Authentication failed while publishing.
    Auth,
    /// A local artifact file could not be read.
    LocalRead,
    /// Writing an object to the store failed.
    Upload,
    /// Unknown error occurred.
    #[default]
    Unknown,
}

impl ErrorKind {
    /// Whether errors of this kind are collected and reported together
    /// instead of aborting configuration immediately.
    #[must_use]
    pub const fn is_accumulated(&self) -> bool {
        matches!(
            self,
            Self::MissingField | Self::TemplateResolution | Self::InvalidRegion | Self::Credential
        )
    }
}

/// Structured error type with classification and context tracking.
#[must_use]
#[derive(Debug, Error)]
#[error("[{kind}]{}", message.as_ref().map(|m| format!(": {m}")).unwrap_or_default())]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Primary error message.
    pub message: Option<HipStr<'static>>,
    /// Underlying source error, if any.
    #[source]
    pub source: Option<BoxedError>,
    /// Additional context information.
    pub context: Option<HipStr<'static>>,
}

impl Error {
    /// Creates a new error with the given kind.
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: None,
            source: None,
            context: None,
        }
    }

    /// Creates a new error from a source error.
    pub fn from_source(kind: ErrorKind, source: impl Into<BoxedError>) -> Self {
        Self {
            kind,
            message: None,
            source: Some(source.into()),
            context: None,
        }
    }

    /// Creates the aggregate error reported when configuration is invalid.
    pub fn validation(errors: ValidationErrors) -> Self {
        Self::new(ErrorKind::Validation)
            .with_message(errors.to_string())
            .with_source(errors)
    }

    /// Adds a message to this error.
    pub fn with_message(mut self, message: impl Into<HipStr<'static>>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Sets the source of the error.
    pub fn with_source(mut self, source: impl Into<BoxedError>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Adds context to the error.
    pub fn with_context(mut self, context: impl Into<HipStr<'static>>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Returns the error kind.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the message, or the kind name when no message was set.
    #[must_use]
    pub fn reason(&self) -> String {
        match &self.message {
            Some(message) => message.to_string(),
            None => self.kind.to_string(),
        }
    }

    /// Returns the individual problems behind a [`ErrorKind::Validation`] error.
    #[must_use]
    pub fn validation_errors(&self) -> Option<&ValidationErrors> {
        self.source.as_deref()?.downcast_ref::<ValidationErrors>()
    }
}

/// Ordered list of problems found while validating configuration.
///
/// Order is the order in which the checks ran, so the report is stable
/// across runs for the same input.
#[derive(Debug, Default)]
pub struct ValidationErrors(Vec<Error>);

impl ValidationErrors {
    /// Creates an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a single problem.
    pub fn push(&mut self, error: Error) {
        self.0.push(error);
    }

    /// Returns `true` if no problem was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of recorded problems.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterates over the recorded problems in discovery order.
    pub fn iter(&self) -> std::slice::Iter<'_, Error> {
        self.0.iter()
    }

    /// Returns the kinds of the recorded problems in discovery order.
    pub fn kinds(&self) -> Vec<ErrorKind> {
        self.0.iter().map(Error::kind).collect()
    }

    /// Returns `value` if nothing was recorded, the aggregate error otherwise.
    pub fn into_result<T>(self, value: T) -> Result<T> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(Error::validation(self))
        }
    }
}

impl Extend<Error> for ValidationErrors {
    fn extend<I: IntoIterator<Item = Error>>(&mut self, iter: I) {
        self.0.extend(iter);
    }
}

impl FromIterator<Error> for ValidationErrors {
    fn from_iter<I: IntoIterator<Item = Error>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for ValidationErrors {
    type IntoIter = std::vec::IntoIter<Error>;
    type Item = Error;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} error(s) occurred:", self.0.len())?;
        for error in &self.0 {
            write!(f, "\n* {error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn test_error_builder_pattern() {
        let error = Error::new(ErrorKind::Upload)
            .with_message("write rejected")
            .with_context("1 of 3 files uploaded");

        assert_eq!(error.kind, ErrorKind::Upload);
        assert_eq!(error.message.as_deref(), Some("write rejected"));
        assert_eq!(error.context.as_deref(), Some("1 of 3 files uploaded"));
    }

    #[test]
    fn test_error_display() {
        let error = Error::new(ErrorKind::MissingField).with_message("bucket must be set");
        assert_eq!(error.to_string(), "[missing_field]: bucket must be set");

        let bare = Error::new(ErrorKind::NotConfigured);
        assert_eq!(bare.to_string(), "[not_configured]");
    }

    #[test]
    fn test_reason_falls_back_to_kind() {
        let error = Error::new(ErrorKind::Auth).with_message("token expired");
        assert_eq!(error.reason(), "token expired");

        let bare = Error::new(ErrorKind::Auth);
        assert_eq!(bare.reason(), "auth");
    }

    #[test]
    fn test_validation_lists_every_problem() {
        let errors: ValidationErrors = [
            Error::new(ErrorKind::MissingField).with_message("access_key must be set"),
            Error::new(ErrorKind::MissingField).with_message("bucket must be set"),
        ]
        .into_iter()
        .collect();

        let error = errors.into_result(()).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Validation);

        let display = error.to_string();
        assert!(display.contains("2 error(s) occurred"));
        assert!(display.contains("* [missing_field]: access_key must be set"));
        assert!(display.contains("* [missing_field]: bucket must be set"));

        let inner = error.validation_errors().unwrap();
        assert_eq!(inner.kinds(), vec![ErrorKind::MissingField; 2]);
    }

    #[test]
    fn test_empty_validation_passes_value_through() {
        let value = ValidationErrors::new().into_result(7).unwrap();
        assert_eq!(value, 7);
    }

    #[test]
    fn test_validation_errors_absent_on_other_kinds() {
        let error = Error::new(ErrorKind::Auth);
        assert!(error.validation_errors().is_none());
    }

    #[test]
    fn test_accumulated_kinds() {
        assert!(ErrorKind::MissingField.is_accumulated());
        assert!(ErrorKind::TemplateResolution.is_accumulated());
        assert!(ErrorKind::Credential.is_accumulated());
        assert!(ErrorKind::InvalidRegion.is_accumulated());

        assert!(!ErrorKind::ConfigDecode.is_accumulated());
        assert!(!ErrorKind::Upload.is_accumulated());
        assert!(!ErrorKind::Auth.is_accumulated());
    }

    #[test]
    fn test_from_str() {
        assert_eq!(
            ErrorKind::from_str("local_read").unwrap(),
            ErrorKind::LocalRead
        );
        assert_eq!(ErrorKind::from_str("unknown").unwrap(), ErrorKind::Unknown);
        assert!(ErrorKind::from_str("invalid").is_err());
    }
}
