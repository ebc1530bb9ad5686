//! Publisher configuration decoded from raw key/value fragments.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use stowage_core::{Error, ErrorKind, Result};
use stowage_object::s3::mask;

/// Configuration for a publish run.
///
/// Every option defaults to an empty string so that missing options are
/// reported by validation rather than by decoding.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PublishConfig {
    /// Storage credential id.
    pub access_key: String,
    /// Storage credential secret.
    #[serde(skip_serializing)]
    pub secret_key: String,
    /// Destination bucket name.
    pub bucket: String,
    /// Key prefix every file is written under.
    pub path: String,
    /// Provider region identifier.
    pub region: String,
}

impl PublishConfig {
    /// Merges `fragments` key by key, later fragments winning, and decodes
    /// the result.
    ///
    /// `null` fragments are skipped. Any other non-object fragment,
    /// unknown key, or mistyped value is a [`ErrorKind::ConfigDecode`] error.
    pub fn decode(fragments: &[Value]) -> Result<Self> {
        let mut merged = Map::new();

        for (index, fragment) in fragments.iter().enumerate() {
            match fragment {
                Value::Object(map) => {
                    merged.extend(map.iter().map(|(k, v)| (k.clone(), v.clone())));
                }
                Value::Null => {}
                other => {
                    return Err(Error::new(ErrorKind::ConfigDecode).with_message(format!(
                        "configuration fragment {index} must be an object, got {}",
                        value_kind(other)
                    )));
                }
            }
        }

        serde_json::from_value(Value::Object(merged)).map_err(|e| {
            Error::new(ErrorKind::ConfigDecode)
                .with_message(format!("failed to decode configuration: {e}"))
                .with_source(e)
        })
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

impl fmt::Debug for PublishConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PublishConfig")
            .field("access_key", &mask(&self.access_key))
            .field("secret_key", &"***")
            .field("bucket", &self.bucket)
            .field("path", &self.path)
            .field("region", &self.region)
            .finish()
    }
}
