//! S3 credential pair.

use std::fmt;

use serde::Serialize;
use stowage_core::{Error, ErrorKind, Result};

/// Environment variable pairs consulted when no credentials are given.
const ENV_CREDENTIALS: &[(&str, &str)] = &[
    ("AWS_ACCESS_KEY_ID", "AWS_SECRET_ACCESS_KEY"),
    ("AWS_ACCESS_KEY", "AWS_SECRET_KEY"),
];

/// Authenticated S3 session holding a static credential pair.
///
/// The secret key is never serialized and is masked in debug output.
#[derive(Clone, Serialize)]
pub struct S3Session {
    access_key: String,
    #[serde(skip_serializing)]
    secret_key: String,
}

impl S3Session {
    /// Creates a session from an explicit credential pair.
    pub fn new(access_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            access_key: access_key.into(),
            secret_key: secret_key.into(),
        }
    }

    /// Builds a session from the given pair, or from the environment when
    /// both halves are empty.
    pub(crate) fn resolve<F>(access_key: &str, secret_key: &str, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if access_key.is_empty() && secret_key.is_empty() {
            return ENV_CREDENTIALS
                .iter()
                .find_map(|(access_var, secret_var)| {
                    let access = env(access_var).filter(|v| !v.is_empty())?;
                    let secret = env(secret_var).filter(|v| !v.is_empty())?;
                    Some(Self::new(access, secret))
                })
                .ok_or_else(|| {
                    Error::new(ErrorKind::Auth).with_message(
                        "no credentials given and AWS_ACCESS_KEY_ID/AWS_SECRET_ACCESS_KEY not set",
                    )
                });
        }

        if access_key.is_empty() {
            return Err(Error::new(ErrorKind::Auth).with_message("access key is empty"));
        }

        if secret_key.is_empty() {
            return Err(Error::new(ErrorKind::Auth).with_message("secret key is empty"));
        }

        Ok(Self::new(access_key, secret_key))
    }

    /// Returns the access key.
    #[inline]
    pub fn access_key(&self) -> &str {
        &self.access_key
    }

    /// Returns the secret key.
    #[inline]
    pub fn secret_key(&self) -> &str {
        &self.secret_key
    }

    /// Returns the access key with everything past the first 4 characters masked.
    pub fn access_key_masked(&self) -> String {
        mask(&self.access_key)
    }
}

impl fmt::Debug for S3Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("S3Session")
            .field("access_key", &self.access_key_masked())
            .field("secret_key", &"***")
            .finish()
    }
}

/// Shows the first 4 characters of `value` followed by `***`.
pub fn mask(value: &str) -> String {
    match value.char_indices().nth(4) {
        Some((end, _)) => format!("{}***", &value[..end]),
        None => "*".repeat(value.chars().count()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn explicit_pair() {
        let session = S3Session::resolve("AKIAEXAMPLE", "secret", no_env).unwrap();
        assert_eq!(session.access_key(), "AKIAEXAMPLE");
        assert_eq!(session.secret_key(), "secret");
    }

    #[test]
    fn half_pair_is_rejected() {
        let err = S3Session::resolve("AKIAEXAMPLE", "", no_env).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Auth);

        let err = S3Session::resolve("", "secret", no_env).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Auth);
    }

    #[test]
    fn empty_pair_falls_back_to_environment() {
        let env = |name: &str| match name {
            "AWS_ACCESS_KEY" => Some("AKIAFROMENV".to_owned()),
            "AWS_SECRET_KEY" => Some("envsecret".to_owned()),
            _ => None,
        };

        let session = S3Session::resolve("", "", env).unwrap();
        assert_eq!(session.access_key(), "AKIAFROMENV");
        assert_eq!(session.secret_key(), "envsecret");
    }

    #[test]
    fn empty_pair_without_environment() {
        let err = S3Session::resolve("", "", no_env).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Auth);
    }

    #[test]
    fn debug_masks_secrets() {
        let session = S3Session::new("AKIAEXAMPLE", "topsecret");
        let debug = format!("{session:?}");
        assert!(debug.contains("AKIA***"));
        assert!(!debug.contains("topsecret"));
        assert!(!debug.contains("AKIAEXAMPLE"));
    }

    #[test]
    fn mask_short_values() {
        assert_eq!(mask("abc"), "***");
        assert_eq!(mask(""), "");
        assert_eq!(mask("abcdef"), "abcd***");
    }
}
