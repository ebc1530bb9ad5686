//! `{{ ... }}` substitution for configuration values.
//!
//! Supported functions:
//!
//! - ``{{user `name`}}``: value of the user variable `name`
//! - `{{timestamp}}`: Unix seconds at context creation
//! - `{{isotime}}`: RFC 3339 UTC time at context creation
//! - `{{uuid}}`: a freshly generated UUID
//!
//! Everything outside `{{ }}` is copied verbatim.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use jiff::Timestamp;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single `{{ function argument }}` action.
static ACTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*(\w+)(?:\s+(.*?))?\s*\}\}").unwrap_or_else(|e| unreachable!("{e}"))
});

/// Errors raised while resolving a template.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TemplateError {
    /// A `{{` without a matching `}}`.
    #[error("unterminated template action starting at '{0}'")]
    Unterminated(String),
    /// The action names no known function.
    #[error("function '{0}' not defined")]
    UnknownFunction(String),
    /// A known function was called with a malformed argument.
    #[error("invalid argument for '{function}': {argument}")]
    InvalidArgument {
        /// Function being called.
        function: String,
        /// Raw argument text.
        argument: String,
    },
    /// `user` referenced a variable that was never supplied.
    #[error("user variable '{0}' not found")]
    UnknownVariable(String),
}

/// User-supplied variables read by the `user` template function.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserVariables(BTreeMap<String, String>);

impl UserVariables {
    /// Creates an empty variable set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a variable.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    /// Adds or replaces a variable in place.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    /// Looks up a variable.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }
}

impl<K, V> FromIterator<(K, V)> for UserVariables
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Evaluation context for configuration templates.
///
/// The clock is captured once, so every value resolved through the same
/// context sees the same `timestamp` and `isotime`.
#[derive(Debug, Clone)]
pub struct TemplateContext {
    user_vars: UserVariables,
    timestamp: Timestamp,
}

impl TemplateContext {
    /// Creates a context over `user_vars`, capturing the current time.
    pub fn new(user_vars: UserVariables) -> Self {
        Self {
            user_vars,
            timestamp: Timestamp::now(),
        }
    }

    /// Pins the time seen by `timestamp` and `isotime`.
    pub fn with_timestamp(mut self, timestamp: Timestamp) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Resolves every action in `input`.
    pub fn process(&self, input: &str) -> Result<String, TemplateError> {
        let mut output = String::with_capacity(input.len());
        let mut last = 0;

        for captures in ACTION.captures_iter(input) {
            let Some(action) = captures.get(0) else {
                continue;
            };
            let literal = &input[last..action.start()];
            check_literal(literal)?;
            output.push_str(literal);
            output.push_str(&self.evaluate(&captures)?);
            last = action.end();
        }

        let literal = &input[last..];
        check_literal(literal)?;
        output.push_str(literal);
        Ok(output)
    }

    fn evaluate(&self, captures: &Captures<'_>) -> Result<String, TemplateError> {
        let function = captures.get(1).map_or("", |m| m.as_str());
        let argument = captures
            .get(2)
            .map(|m| m.as_str().trim())
            .filter(|a| !a.is_empty());

        match (function, argument) {
            ("user", Some(argument)) => {
                let name = unquote(argument).ok_or_else(|| TemplateError::InvalidArgument {
                    function: function.to_owned(),
                    argument: argument.to_owned(),
                })?;
                self.user_vars
                    .get(name)
                    .map(str::to_owned)
                    .ok_or_else(|| TemplateError::UnknownVariable(name.to_owned()))
            }
            ("user", None) => Err(TemplateError::InvalidArgument {
                function: function.to_owned(),
                argument: String::new(),
            }),
            ("timestamp", None) => Ok(self.timestamp.as_second().to_string()),
            ("isotime", None) => Ok(self.timestamp.strftime("%Y-%m-%dT%H:%M:%SZ").to_string()),
            ("uuid", None) => Ok(Uuid::new_v4().to_string()),
            (function, None) => Err(TemplateError::UnknownFunction(function.to_owned())),
            (function, Some(argument)) => {
                Err(TemplateError::UnknownFunction(format!("{function} {argument}")))
            }
        }
    }
}

impl Default for TemplateContext {
    fn default() -> Self {
        Self::new(UserVariables::default())
    }
}

/// Rejects text between actions that still opens one.
///
/// A `{{` left over here either never closes or does not start with a
/// function name.
fn check_literal(literal: &str) -> Result<(), TemplateError> {
    let Some(start) = literal.find("{{") else {
        return Ok(());
    };

    let rest = &literal[start..];
    match rest[2..].find("}}") {
        Some(end) => Err(TemplateError::UnknownFunction(rest[2..end + 2].trim().to_owned())),
        None => Err(TemplateError::Unterminated(rest.to_owned())),
    }
}

/// Strips one pair of matching backquotes or double quotes.
fn unquote(argument: &str) -> Option<&str> {
    ['`', '"'].into_iter().find_map(|quote| {
        argument
            .strip_prefix(quote)
            .and_then(|inner| inner.strip_suffix(quote))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> TemplateContext {
        let vars = UserVariables::new()
            .with("bucket", "releases")
            .with("empty", "");
        TemplateContext::new(vars).with_timestamp(Timestamp::from_second(1_700_000_000).unwrap())
    }

    #[test]
    fn test_plain_text_passes_through() {
        assert_eq!(context().process("builds/v1").unwrap(), "builds/v1");
        assert_eq!(context().process("").unwrap(), "");
    }

    #[test]
    fn test_user_variable() {
        let ctx = context();
        assert_eq!(ctx.process("{{user `bucket`}}").unwrap(), "releases");
        assert_eq!(
            ctx.process("s3-{{ user \"bucket\" }}-eu").unwrap(),
            "s3-releases-eu"
        );
        assert_eq!(ctx.process("{{user `empty`}}").unwrap(), "");
    }

    #[test]
    fn test_unknown_user_variable() {
        let err = context().process("{{user `missing`}}").unwrap_err();
        assert_eq!(err, TemplateError::UnknownVariable("missing".into()));
    }

    #[test]
    fn test_user_requires_quoted_name() {
        let err = context().process("{{user bucket}}").unwrap_err();
        assert!(matches!(err, TemplateError::InvalidArgument { .. }));

        let err = context().process("{{user}}").unwrap_err();
        assert!(matches!(err, TemplateError::InvalidArgument { .. }));
    }

    #[test]
    fn test_clock_functions() {
        let ctx = context();
        assert_eq!(ctx.process("{{timestamp}}").unwrap(), "1700000000");
        assert_eq!(ctx.process("{{isotime}}").unwrap(), "2023-11-14T22:13:20Z");
    }

    #[test]
    fn test_uuid_function() {
        let value = context().process("{{uuid}}").unwrap();
        assert!(Uuid::parse_str(&value).is_ok());
    }

    #[test]
    fn test_unknown_function() {
        let err = context().process("{{nope}}").unwrap_err();
        assert_eq!(err, TemplateError::UnknownFunction("nope".into()));
    }

    #[test]
    fn test_unterminated_action() {
        let err = context().process("path/{{user `bucket`").unwrap_err();
        assert!(matches!(err, TemplateError::Unterminated(_)));

        let err = context().process("{{timestamp}}/{{uuid").unwrap_err();
        assert_eq!(err, TemplateError::Unterminated("{{uuid".into()));
    }

    #[test]
    fn test_action_without_function_name() {
        let err = context().process("a/{{ }}/b").unwrap_err();
        assert_eq!(err, TemplateError::UnknownFunction(String::new()));
    }

    #[test]
    fn test_multiple_actions_and_literals() {
        let ctx = context();
        assert_eq!(
            ctx.process("{{user `bucket`}}/{{timestamp}}/x").unwrap(),
            "releases/1700000000/x"
        );
        assert_eq!(ctx.process("a}}b").unwrap(), "a}}b");
    }
}
