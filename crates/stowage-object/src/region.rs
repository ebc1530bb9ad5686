use serde::{Deserialize, Serialize};
use stowage_core::{Error, ErrorKind, Result};
use url::Url;

/// Region identifiers accepted by [`Region::lookup`].
pub const KNOWN_REGIONS: &[&str] = &[
    "us-east-1",
    "us-east-2",
    "us-west-1",
    "us-west-2",
    "ca-central-1",
    "eu-west-1",
    "eu-west-2",
    "eu-west-3",
    "eu-central-1",
    "eu-north-1",
    "ap-northeast-1",
    "ap-northeast-2",
    "ap-southeast-1",
    "ap-southeast-2",
    "ap-south-1",
    "sa-east-1",
];

/// A provider region and the endpoint serving it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    name: String,
    endpoint: Url,
}

impl Region {
    /// Resolves a known S3 region.
    pub fn lookup(identifier: &str) -> Option<Self> {
        if !KNOWN_REGIONS.contains(&identifier) {
            return None;
        }

        let endpoint = match identifier {
            "us-east-1" => Url::parse("https://s3.amazonaws.com"),
            other => Url::parse(&format!("https://s3.{other}.amazonaws.com")),
        }
        .ok()?;

        Some(Self {
            name: identifier.to_owned(),
            endpoint,
        })
    }

    /// Resolves a known S3 region, failing with [`ErrorKind::InvalidRegion`].
    pub fn resolve(identifier: &str) -> Result<Self> {
        Self::lookup(identifier).ok_or_else(|| {
            Error::new(ErrorKind::InvalidRegion)
                .with_message(format!("unknown region: '{identifier}'"))
        })
    }

    /// Creates a region served by a custom endpoint (MinIO, R2, ...).
    pub fn custom(name: impl Into<String>, endpoint: Url) -> Self {
        Self {
            name: name.into(),
            endpoint,
        }
    }

    /// Returns the region identifier.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the endpoint URL.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Returns the endpoint without a trailing slash.
    pub fn base_url(&self) -> &str {
        self.endpoint.as_str().trim_end_matches('/')
    }
}
