//! S3-compatible store using [`object_store::aws::AmazonS3Builder`].
//!
//! Works with AWS S3 out of the box, and with MinIO or any other
//! S3-compatible service through [`S3Store::with_endpoint`].

mod session;

use bytes::Bytes;
use object_store::aws::AmazonS3Builder;
pub use session::{S3Session, mask};
use stowage_core::{Error, ErrorKind, Result};
use url::Url;

use crate::client::{ObjectStoreClient, PutOutput};
use crate::region::Region;
use crate::store::{AccessPolicy, ObjectStore};
use crate::TRACING_TARGET;

/// Handle to a single bucket.
#[derive(Debug, Clone)]
pub struct S3Container {
    bucket: String,
    base_url: String,
    client: ObjectStoreClient,
}

impl S3Container {
    /// Returns the bucket name.
    pub fn bucket(&self) -> &str {
        &self.bucket
    }
}

/// [`ObjectStore`] backed by Amazon S3 or an S3-compatible service.
#[derive(Debug, Clone, Default)]
pub struct S3Store {
    endpoint: Option<Url>,
}

impl S3Store {
    /// Unique identifier of this provider.
    pub const ID: &str = "s3";

    /// Creates a store talking to AWS S3.
    pub fn new() -> Self {
        Self::default()
    }

    /// Routes every region to `endpoint` (e.g. `http://localhost:9000`).
    pub fn with_endpoint(mut self, endpoint: Url) -> Self {
        self.endpoint = Some(endpoint);
        self
    }
}

#[async_trait::async_trait]
impl ObjectStore for S3Store {
    type Container = S3Container;
    type Session = S3Session;

    async fn authenticate(&self, access_key: &str, secret_key: &str) -> Result<S3Session> {
        let session = S3Session::resolve(access_key, secret_key, |name| std::env::var(name).ok())?;

        tracing::debug!(
            target: TRACING_TARGET,
            provider = Self::ID,
            access_key = %session.access_key_masked(),
            "Credentials resolved"
        );

        Ok(session)
    }

    fn resolve_region(&self, identifier: &str) -> Result<Region> {
        match &self.endpoint {
            Some(endpoint) => Ok(Region::custom(identifier, endpoint.clone())),
            None => Region::resolve(identifier),
        }
    }

    fn open_container(
        &self,
        session: &S3Session,
        region: &Region,
        name: &str,
    ) -> Result<S3Container> {
        let mut builder = AmazonS3Builder::new()
            .with_bucket_name(name)
            .with_region(region.name())
            .with_access_key_id(session.access_key())
            .with_secret_access_key(session.secret_key());

        if self.endpoint.is_some() {
            builder = builder.with_endpoint(region.base_url());
            if region.endpoint().scheme() == "http" {
                builder = builder.with_allow_http(true);
            }
        }

        let store = builder.build().map_err(|e| {
            Error::new(ErrorKind::Upload)
                .with_message(format!("failed to open bucket '{name}': {e}"))
                .with_source(e)
        })?;

        tracing::debug!(
            target: TRACING_TARGET,
            bucket = %name,
            region = %region.name(),
            "Bucket handle opened"
        );

        Ok(S3Container {
            bucket: name.to_owned(),
            base_url: region.base_url().to_owned(),
            client: ObjectStoreClient::new(store),
        })
    }

    async fn put(
        &self,
        container: &S3Container,
        key: &str,
        data: Bytes,
        content_type: &str,
        access: AccessPolicy,
    ) -> Result<PutOutput> {
        // S3 applies the private canned ACL when no ACL header is sent.
        match access {
            AccessPolicy::Private => {}
        }

        container.client.put(key, data, Some(content_type)).await
    }

    fn locator_for(&self, container: &S3Container, key: &str) -> String {
        format!("{}/{}/{}", container.base_url, container.bucket, key)
    }
}
