//! Thin client over [`object_store::ObjectStore`].
//!
//! [`ObjectStoreClient`] is a cloneable wrapper around
//! `Arc<dyn ObjectStore>` taking human-readable string keys. Every public
//! method is instrumented with [`tracing`].
//!
//! Keys go through [`object_path`], so the stored location is the
//! normalized form of the key. [`PutOutput::location`] reports it.

use std::sync::Arc;

use bytes::Bytes;
use futures::TryStreamExt;
use object_store::path::Path;
use object_store::{Attribute, ObjectMeta, ObjectStore, PutMode, PutOptions, PutPayload};
use stowage_core::{Error, ErrorKind, Result};

mod get_output;
mod put_output;

pub use get_output::GetOutput;
pub use put_output::PutOutput;

/// Converts a string key to the object path it is stored under.
///
/// Empty segments (`a//b`, a leading or trailing `/`) are dropped and
/// `.` or `..` segments are percent-encoded, so an absolute local path
/// appended to a prefix lands one level below the prefix.
pub fn object_path(key: &str) -> Path {
    Path::from(key)
}

/// Cloneable handle to any [`ObjectStore`] backend.
#[derive(Clone, Debug)]
pub struct ObjectStoreClient(pub Arc<dyn ObjectStore>);

impl ObjectStoreClient {
    /// Wrap a concrete [`ObjectStore`] implementation.
    pub fn new(store: impl ObjectStore) -> Self {
        Self(Arc::new(store))
    }

    /// Upload `data` to `key`, overwriting any existing object.
    #[tracing::instrument(name = "object.put", skip(self, data), fields(key, size = data.len()))]
    pub async fn put(
        &self,
        key: &str,
        data: Bytes,
        content_type: Option<&str>,
    ) -> Result<PutOutput> {
        let path = object_path(key);
        let payload = PutPayload::from(data);
        let mut opts = PutOptions {
            mode: PutMode::Overwrite,
            ..Default::default()
        };
        if let Some(ct) = content_type {
            opts.attributes
                .insert(Attribute::ContentType, ct.to_string().into());
        }
        let result = self
            .0
            .put_opts(&path, payload, opts)
            .await
            .map_err(|e| from_object_store(ErrorKind::Upload, e))?;
        Ok(PutOutput::new(path.to_string(), result))
    }

    /// Retrieve the raw bytes and content-type stored at `key`.
    #[tracing::instrument(name = "object.get", skip(self), fields(key))]
    pub async fn get(&self, key: &str) -> Result<GetOutput> {
        let path = object_path(key);
        let result = self
            .0
            .get(&path)
            .await
            .map_err(|e| from_object_store(ErrorKind::Unknown, e))?;
        let content_type = result
            .attributes
            .get(&Attribute::ContentType)
            .map(|v| v.to_string());
        let data = result
            .bytes()
            .await
            .map_err(|e| from_object_store(ErrorKind::Unknown, e))?;
        Ok(GetOutput { data, content_type })
    }

    /// List object metadata under `prefix`.
    #[tracing::instrument(name = "object.list", skip(self), fields(prefix))]
    pub async fn list(&self, prefix: &str) -> Result<Vec<ObjectMeta>> {
        let prefix = if prefix.is_empty() {
            None
        } else {
            Some(object_path(prefix))
        };
        self.0
            .list(prefix.as_ref())
            .try_collect()
            .await
            .map_err(|e| from_object_store(ErrorKind::Unknown, e))
    }
}

/// Convert an [`object_store::Error`] into a crate [`Error`] of `kind`.
fn from_object_store(kind: ErrorKind, err: object_store::Error) -> Error {
    Error::new(kind).with_message(err.to_string()).with_source(err)
}

#[cfg(test)]
mod tests {
    use object_store::memory::InMemory;

    use super::*;

    fn test_client() -> ObjectStoreClient {
        ObjectStoreClient::new(InMemory::new())
    }

    #[tokio::test]
    async fn put_and_get() {
        let client = test_client();
        let data = Bytes::from("hello world");
        client
            .put("test.tar", data.clone(), Some("application/x-tar"))
            .await
            .unwrap();

        let result = client.get("test.tar").await.unwrap();
        assert_eq!(result.data, data);
        assert_eq!(result.content_type.as_deref(), Some("application/x-tar"));
    }

    #[tokio::test]
    async fn put_overwrites() {
        let client = test_client();
        client.put("a.bin", Bytes::from("one"), None).await.unwrap();
        client.put("a.bin", Bytes::from("two"), None).await.unwrap();

        let result = client.get("a.bin").await.unwrap();
        assert_eq!(result.data, Bytes::from("two"));
    }

    #[tokio::test]
    async fn put_returns_result() {
        let client = test_client();
        let result = client
            .put("etag.bin", Bytes::from("x"), None)
            .await
            .unwrap();
        assert!(result.e_tag.is_some());
    }

    #[tokio::test]
    async fn get_missing() {
        let client = test_client();
        assert!(client.get("missing").await.is_err());
    }

    #[tokio::test]
    async fn put_reports_stored_location() {
        let client = test_client();
        let keys = [
            ("builds/v1/image.tar", "builds/v1/image.tar"),
            ("builds/v1//tmp/out/image.tar", "builds/v1/tmp/out/image.tar"),
            ("builds/v1/../dist/image.tar", "builds/v1/%2E%2E/dist/image.tar"),
            ("builds/v1/./a.tar", "builds/v1/%2E/a.tar"),
        ];

        for (key, expected) in keys {
            let output = client.put(key, Bytes::from(key), None).await.unwrap();
            assert_eq!(output.location, expected);
        }

        let mut stored: Vec<_> = client
            .list("")
            .await
            .unwrap()
            .into_iter()
            .map(|meta| meta.location.to_string())
            .collect();
        stored.sort();

        let mut expected: Vec<_> = keys.iter().map(|(_, location)| *location).collect();
        expected.sort();
        assert_eq!(stored, expected);
    }

    #[tokio::test]
    async fn get_by_requested_key_after_normalization() {
        let client = test_client();
        client
            .put("builds/v1//tmp/out/image.tar", Bytes::from("tar"), None)
            .await
            .unwrap();

        let result = client.get("builds/v1//tmp/out/image.tar").await.unwrap();
        assert_eq!(result.data, Bytes::from("tar"));
    }

    #[tokio::test]
    async fn list() {
        let client = test_client();
        for i in 0..3 {
            client
                .put(&format!("dir/file{i}.tar"), Bytes::from(format!("{i}")), None)
                .await
                .unwrap();
        }

        let items = client.list("dir").await.unwrap();
        assert_eq!(items.len(), 3);
    }
}
