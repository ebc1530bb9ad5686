//! The object store capability consumed by the publisher.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use stowage_core::Result;
use strum::{AsRefStr, Display};

use crate::client::PutOutput;
use crate::region::Region;

/// Canned access policy applied to written objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[derive(AsRefStr, Display, Serialize, Deserialize)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
#[non_exhaustive]
pub enum AccessPolicy {
    /// Only the bucket owner can read the object.
    #[default]
    Private,
}

/// Remote key/value object storage organized into named containers.
///
/// Implementations own any provider state (auth tables, region lists),
/// so callers never touch globals. The handles returned by
/// [`authenticate`](Self::authenticate) and
/// [`open_container`](Self::open_container) are released when dropped.
#[async_trait::async_trait]
pub trait ObjectStore: Send + Sync {
    /// Authenticated session.
    type Session: Send + Sync;
    /// Handle to a named container (bucket) within an endpoint.
    type Container: Send + Sync;

    /// Obtains a session for the given credential pair.
    async fn authenticate(&self, access_key: &str, secret_key: &str) -> Result<Self::Session>;

    /// Resolves a region identifier to a concrete endpoint.
    fn resolve_region(&self, identifier: &str) -> Result<Region> {
        Region::resolve(identifier)
    }

    /// Returns a handle to container `name`.
    ///
    /// No existence check is made; a missing container surfaces on the
    /// first write.
    fn open_container(
        &self,
        session: &Self::Session,
        region: &Region,
        name: &str,
    ) -> Result<Self::Container>;

    /// Writes `data` under `key`, replacing any existing object.
    ///
    /// The key the object actually landed under is returned in
    /// [`PutOutput::location`].
    async fn put(
        &self,
        container: &Self::Container,
        key: &str,
        data: Bytes,
        content_type: &str,
        access: AccessPolicy,
    ) -> Result<PutOutput>;

    /// Returns a human-readable locator for the stored location `key`.
    fn locator_for(&self, container: &Self::Container, key: &str) -> String;
}
