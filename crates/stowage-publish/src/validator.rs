//! Configuration validation with error accumulation.
//!
//! Decoding failures abort immediately. Everything after decoding
//! (required options, template resolution, region lookup, credentials)
//! is checked in full and reported as one [`ErrorKind::Validation`] error.

use serde_json::Value;
use stowage_core::{Error, ErrorKind, Result, TemplateContext, ValidationErrors};
use stowage_object::ObjectStore;
use stowage_object::s3::mask;

use crate::TRACING_TARGET;
use crate::config::PublishConfig;

/// One template-resolved option.
struct Field {
    name: &'static str,
    slot: fn(&mut PublishConfig) -> &mut String,
    required: bool,
}

/// Options in the order they are checked and reported.
const FIELDS: [Field; 5] = [
    Field {
        name: "access_key",
        slot: access_key,
        required: true,
    },
    Field {
        name: "secret_key",
        slot: secret_key,
        required: true,
    },
    Field {
        name: "region",
        slot: region,
        required: true,
    },
    Field {
        name: "bucket",
        slot: bucket,
        required: true,
    },
    Field {
        name: "path",
        slot: path,
        required: true,
    },
];

fn access_key(config: &mut PublishConfig) -> &mut String {
    &mut config.access_key
}

fn secret_key(config: &mut PublishConfig) -> &mut String {
    &mut config.secret_key
}

fn region(config: &mut PublishConfig) -> &mut String {
    &mut config.region
}

fn bucket(config: &mut PublishConfig) -> &mut String {
    &mut config.bucket
}

fn path(config: &mut PublishConfig) -> &mut String {
    &mut config.path
}

/// Turns raw configuration fragments into a resolved [`PublishConfig`].
pub struct ConfigValidator<'a, S> {
    store: &'a S,
    context: TemplateContext,
}

impl<'a, S: ObjectStore> ConfigValidator<'a, S> {
    /// Creates a validator checking credentials against `store`.
    pub fn new(store: &'a S, context: TemplateContext) -> Self {
        Self { store, context }
    }

    /// Decodes, resolves, and checks `fragments`.
    ///
    /// Authenticates against the store exactly once, even when earlier
    /// checks already failed.
    pub async fn validate(&self, fragments: &[Value]) -> Result<PublishConfig> {
        let mut config = PublishConfig::decode(fragments)?;
        let mut errors = ValidationErrors::new();
        let mut region_ok = true;

        for field in &FIELDS {
            let slot = (field.slot)(&mut config);
            let (resolved, field_errors) = check_field(field, slot.as_str(), &self.context);
            if field.name == "region" {
                region_ok = field_errors.is_empty();
            }
            *slot = resolved;
            errors.extend(field_errors);
        }

        if region_ok {
            if let Some(error) = self.check_region(&config.region) {
                errors.push(error);
            }
        }
        if let Some(error) = self.check_credentials(&config).await {
            errors.push(error);
        }

        if !errors.is_empty() {
            tracing::warn!(
                target: TRACING_TARGET,
                error_count = errors.len(),
                "Configuration rejected"
            );
            return errors.into_result(config);
        }

        tracing::info!(
            target: TRACING_TARGET,
            access_key = %mask(&config.access_key),
            bucket = %config.bucket,
            prefix = %config.path,
            region = %config.region,
            "Configuration validated"
        );

        Ok(config)
    }

    fn check_region(&self, region: &str) -> Option<Error> {
        let err = self.store.resolve_region(region).err()?;
        if err.kind().is_accumulated() {
            return Some(err);
        }

        Some(
            Error::new(ErrorKind::InvalidRegion)
                .with_message(format!("error resolving region '{region}': {}", err.reason()))
                .with_source(err),
        )
    }

    async fn check_credentials(&self, config: &PublishConfig) -> Option<Error> {
        let err = self
            .store
            .authenticate(&config.access_key, &config.secret_key)
            .await
            .err()?;

        Some(
            Error::new(ErrorKind::Credential)
                .with_message(format!("error processing credentials: {}", err.reason()))
                .with_source(err),
        )
    }
}

/// Resolves one option, returning the resolved value and any problems.
///
/// On resolution failure the raw value is returned unchanged.
fn check_field(field: &Field, raw: &str, context: &TemplateContext) -> (String, Vec<Error>) {
    let mut errors = Vec::new();
    let name = field.name;

    if field.required && raw.is_empty() {
        errors.push(
            Error::new(ErrorKind::MissingField).with_message(format!("{name} must be set")),
        );
    }

    let resolved = match context.process(raw) {
        Ok(value) => {
            if field.required && !raw.is_empty() && value.is_empty() {
                errors.push(
                    Error::new(ErrorKind::MissingField)
                        .with_message(format!("{name} resolved to an empty value")),
                );
            }
            value
        }
        Err(e) => {
            errors.push(
                Error::new(ErrorKind::TemplateResolution)
                    .with_message(format!("error processing {name}: {e}"))
                    .with_source(e),
            );
            raw.to_owned()
        }
    };

    tracing::trace!(
        target: TRACING_TARGET,
        field = name,
        error_count = errors.len(),
        "Option checked"
    );

    (resolved, errors)
}
