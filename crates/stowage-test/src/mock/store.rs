//! In-memory object store with failure injection.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use bytes::Bytes;
use object_store::memory::InMemory;
use stowage_core::{Error, ErrorKind, Result};
use stowage_object::{AccessPolicy, GetOutput, ObjectStore, ObjectStoreClient, PutOutput, Region};

/// Session handed out by [`MockObjectStore`].
#[derive(Debug, Clone)]
pub struct MockSession {
    /// Access key the session was created with.
    pub access_key: String,
}

/// Container handle handed out by [`MockObjectStore`].
#[derive(Debug, Clone)]
pub struct MockContainer {
    /// Bucket name.
    pub bucket: String,
    /// Region the container was opened in.
    pub region: Region,
}

/// One attempted write, successful or not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutRecord {
    /// Target bucket.
    pub bucket: String,
    /// Object key as given by the caller.
    pub key: String,
    /// Content type sent with the write.
    pub content_type: String,
    /// Access policy sent with the write.
    pub access: AccessPolicy,
    /// Payload size in bytes.
    pub size: usize,
}

#[derive(Debug, Default)]
struct Inner {
    credentials: Mutex<Option<(String, String)>>,
    // 1-based call numbers, 0 when unset.
    fail_auth_from: AtomicUsize,
    fail_put_on: AtomicUsize,
    auth_calls: AtomicUsize,
    puts: Mutex<Vec<PutRecord>>,
    buckets: Mutex<HashMap<String, ObjectStoreClient>>,
}

/// [`ObjectStore`] keeping objects in memory, one store per bucket.
///
/// Clones share the same objects, settings and call log, so a test can
/// hand one clone to the code under test and inspect the other. The
/// builder methods change that shared state, so they affect every clone.
#[derive(Debug, Clone, Default)]
pub struct MockObjectStore {
    inner: Arc<Inner>,
}

impl MockObjectStore {
    /// Creates a store accepting any non-empty credential pair.
    pub fn new() -> Self {
        Self::default()
    }

    /// Only accepts exactly this credential pair.
    pub fn with_credentials(self, access_key: &str, secret_key: &str) -> Self {
        *lock(&self.inner.credentials) = Some((access_key.to_owned(), secret_key.to_owned()));
        self
    }

    /// Rejects the `call`-th authentication (1-based) and every one after it.
    pub fn fail_authentication_from(self, call: usize) -> Self {
        self.inner.fail_auth_from.store(call, Ordering::SeqCst);
        self
    }

    /// Fails the `call`-th write (1-based).
    pub fn fail_put_on(self, call: usize) -> Self {
        self.inner.fail_put_on.store(call, Ordering::SeqCst);
        self
    }

    /// Number of authentication attempts so far.
    pub fn auth_calls(&self) -> usize {
        self.inner.auth_calls.load(Ordering::SeqCst)
    }

    /// Every attempted write, in order.
    pub fn puts(&self) -> Vec<PutRecord> {
        lock(&self.inner.puts).clone()
    }

    /// Keys of every attempted write, in order.
    pub fn put_keys(&self) -> Vec<String> {
        self.puts().into_iter().map(|r| r.key).collect()
    }

    /// Reads a stored object back.
    pub async fn object(&self, bucket: &str, key: &str) -> Result<GetOutput> {
        self.bucket(bucket).get(key).await
    }

    /// Sorted locations of every object stored in `bucket`.
    pub async fn locations(&self, bucket: &str) -> Result<Vec<String>> {
        let mut locations: Vec<_> = self
            .bucket(bucket)
            .list("")
            .await?
            .into_iter()
            .map(|meta| meta.location.to_string())
            .collect();
        locations.sort();
        Ok(locations)
    }

    /// Number of objects currently stored in `bucket`.
    pub async fn object_count(&self, bucket: &str) -> Result<usize> {
        Ok(self.locations(bucket).await?.len())
    }

    fn bucket(&self, name: &str) -> ObjectStoreClient {
        lock(&self.inner.buckets)
            .entry(name.to_owned())
            .or_insert_with(|| ObjectStoreClient::new(InMemory::new()))
            .clone()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[async_trait::async_trait]
impl ObjectStore for MockObjectStore {
    type Container = MockContainer;
    type Session = MockSession;

    async fn authenticate(&self, access_key: &str, secret_key: &str) -> Result<MockSession> {
        let call = self.inner.auth_calls.fetch_add(1, Ordering::SeqCst) + 1;

        let fail_from = self.inner.fail_auth_from.load(Ordering::SeqCst);
        if fail_from != 0 && call >= fail_from {
            return Err(
                Error::new(ErrorKind::Auth).with_message("authentication service unavailable")
            );
        }

        if access_key.is_empty() || secret_key.is_empty() {
            return Err(Error::new(ErrorKind::Auth).with_message("credentials are incomplete"));
        }

        let expected = lock(&self.inner.credentials).clone();
        if let Some((expected_access, expected_secret)) = expected {
            if access_key != expected_access || secret_key != expected_secret {
                return Err(Error::new(ErrorKind::Auth)
                    .with_message("the security token included in the request is invalid"));
            }
        }

        Ok(MockSession {
            access_key: access_key.to_owned(),
        })
    }

    fn open_container(
        &self,
        _session: &MockSession,
        region: &Region,
        name: &str,
    ) -> Result<MockContainer> {
        Ok(MockContainer {
            bucket: name.to_owned(),
            region: region.clone(),
        })
    }

    async fn put(
        &self,
        container: &MockContainer,
        key: &str,
        data: Bytes,
        content_type: &str,
        access: AccessPolicy,
    ) -> Result<PutOutput> {
        let call = {
            let mut puts = lock(&self.inner.puts);
            puts.push(PutRecord {
                bucket: container.bucket.clone(),
                key: key.to_owned(),
                content_type: content_type.to_owned(),
                access,
                size: data.len(),
            });
            puts.len()
        };

        if self.inner.fail_put_on.load(Ordering::SeqCst) == call {
            return Err(Error::new(ErrorKind::Upload).with_message("injected write failure"));
        }

        self.bucket(&container.bucket)
            .put(key, data, Some(content_type))
            .await
    }

    fn locator_for(&self, container: &MockContainer, key: &str) -> String {
        format!("mock://{}/{key}", container.bucket)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn container(store: &MockObjectStore) -> MockContainer {
        let session = MockSession {
            access_key: "AKIA".to_owned(),
        };
        let region = store.resolve_region("us-east-1").unwrap();
        store.open_container(&session, &region, "bucket").unwrap()
    }

    #[tokio::test]
    async fn accepts_any_pair_by_default() {
        let store = MockObjectStore::new();
        assert!(store.authenticate("a", "b").await.is_ok());
        assert!(store.authenticate("", "b").await.is_err());
        assert_eq!(store.auth_calls(), 2);
    }

    #[tokio::test]
    async fn rejects_wrong_pair() {
        let store = MockObjectStore::new().with_credentials("AKIA", "secret");
        assert!(store.authenticate("AKIA", "secret").await.is_ok());

        let err = store.authenticate("AKIA", "wrong").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Auth);
    }

    #[tokio::test]
    async fn fails_authentication_from_call() {
        let store = MockObjectStore::new().fail_authentication_from(2);
        assert!(store.authenticate("a", "b").await.is_ok());
        assert!(store.authenticate("a", "b").await.is_err());
        assert!(store.authenticate("a", "b").await.is_err());
    }

    #[tokio::test]
    async fn stores_and_records_puts() {
        let store = MockObjectStore::new();
        let container = container(&store);
        store
            .put(
                &container,
                "p/a.tar",
                Bytes::from("abc"),
                "application/x-tar",
                AccessPolicy::Private,
            )
            .await
            .unwrap();

        let object = store.object("bucket", "p/a.tar").await.unwrap();
        assert_eq!(object.data, Bytes::from("abc"));
        assert_eq!(store.put_keys(), vec!["p/a.tar".to_owned()]);
        assert_eq!(store.puts()[0].size, 3);
        assert_eq!(store.object_count("bucket").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn fails_selected_put() {
        let store = MockObjectStore::new().fail_put_on(2);
        let container = container(&store);

        for (i, expect_ok) in [true, false, true].into_iter().enumerate() {
            let result = store
                .put(
                    &container,
                    &format!("{i}"),
                    Bytes::from("x"),
                    "text/plain",
                    AccessPolicy::Private,
                )
                .await;
            assert_eq!(result.is_ok(), expect_ok);
        }

        assert_eq!(store.puts().len(), 3);
        assert_eq!(store.object_count("bucket").await.unwrap(), 2);
    }

    #[tokio::test]
    async fn put_reports_normalized_location() {
        let store = MockObjectStore::new();
        let container = container(&store);
        let output = store
            .put(
                &container,
                "p//tmp/a.tar",
                Bytes::from("abc"),
                "application/x-tar",
                AccessPolicy::Private,
            )
            .await
            .unwrap();

        assert_eq!(output.location, "p/tmp/a.tar");
        assert_eq!(store.put_keys(), vec!["p//tmp/a.tar".to_owned()]);
        assert_eq!(store.locations("bucket").await.unwrap(), vec!["p/tmp/a.tar".to_owned()]);
        assert_eq!(store.object_count("other").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn settings_apply_to_existing_clones() {
        let store = MockObjectStore::new();
        let clone = store.clone();
        assert!(clone.authenticate("a", "b").await.is_ok());

        let store = store.fail_authentication_from(2);
        assert!(clone.authenticate("a", "b").await.is_err());
        assert_eq!(store.auth_calls(), 2);
        assert_eq!(clone.auth_calls(), 2);
    }

    #[test]
    fn clones_share_log() {
        let store = MockObjectStore::new();
        let clone = store.clone();
        let container = container(&clone);
        assert_eq!(container.bucket, "bucket");
        assert_eq!(clone.locator_for(&container, "k"), "mock://bucket/k");
        assert_eq!(store.auth_calls(), clone.auth_calls());
    }
}
