//! Sequential upload of a source artifact to the object store.

use bytes::Bytes;
use serde_json::Value;
use stowage_core::{Artifact, Error, ErrorKind, Result, TemplateContext, Ui, UserVariables};
use stowage_object::{AccessPolicy, ObjectStore};

use crate::artifact::UploadedArtifact;
use crate::config::PublishConfig;
use crate::validator::ConfigValidator;
use crate::{CONTENT_TYPE, TRACING_TARGET};

/// Returns the remote key for `local_path` under `prefix`.
///
/// The local path is appended verbatim, so its directory structure is
/// preserved below the prefix. The store may normalize the key further;
/// see [`stowage_object::object_path`].
pub fn remote_key(prefix: &str, local_path: &str) -> String {
    format!("{prefix}/{local_path}")
}

/// Outcome of a successful [`UploadOrchestrator::post_process`].
#[derive(Debug)]
pub struct PostProcessOutput {
    /// Descriptor of the uploaded objects.
    pub artifact: UploadedArtifact,
    /// Whether the host should keep the source artifact. Always `false`.
    pub keep_original: bool,
}

/// Publishes artifacts to an [`ObjectStore`].
///
/// [`configure`](Self::configure) must succeed before
/// [`post_process`](Self::post_process) is called. Files are uploaded one
/// at a time in source order and the first failure aborts the run.
/// Objects written before a failure are left in place.
#[derive(Debug)]
pub struct UploadOrchestrator<S> {
    store: S,
    config: Option<PublishConfig>,
}

impl<S: ObjectStore> UploadOrchestrator<S> {
    /// Creates an unconfigured orchestrator over `store`.
    pub fn new(store: S) -> Self {
        Self {
            store,
            config: None,
        }
    }

    /// Returns the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Returns the validated configuration, if any.
    pub fn config(&self) -> Option<&PublishConfig> {
        self.config.as_ref()
    }

    /// Validates `fragments` and keeps the resolved configuration.
    ///
    /// A failed call leaves the orchestrator unconfigured.
    pub async fn configure(&mut self, fragments: &[Value], user_vars: UserVariables) -> Result<()> {
        self.config = None;

        let context = TemplateContext::new(user_vars);
        let config = ConfigValidator::new(&self.store, context)
            .validate(fragments)
            .await?;

        self.config = Some(config);
        Ok(())
    }

    /// Uploads every file of `artifact` and describes the result.
    pub async fn post_process(
        &self,
        ui: &dyn Ui,
        artifact: &dyn Artifact,
    ) -> Result<PostProcessOutput> {
        let config = self.config.as_ref().ok_or_else(|| {
            Error::new(ErrorKind::NotConfigured)
                .with_message("configure must succeed before publishing")
        })?;

        let session = self
            .store
            .authenticate(&config.access_key, &config.secret_key)
            .await
            .map_err(|e| {
                Error::new(ErrorKind::Auth)
                    .with_message(format!("failed to authenticate: {}", e.reason()))
                    .with_source(e)
            })?;

        let region = self.store.resolve_region(&config.region)?;
        let container = self
            .store
            .open_container(&session, &region, &config.bucket)?;

        let files = artifact.files();
        tracing::info!(
            target: TRACING_TARGET,
            bucket = %config.bucket,
            prefix = %config.path,
            file_count = files.len(),
            "Publishing artifact"
        );

        let mut uploaded = Vec::with_capacity(files.len());
        for path in files {
            ui.message(&format!("Uploading artifact: {path}"));

            let data = tokio::fs::read(path).await.map_err(|e| {
                let error = Error::new(ErrorKind::LocalRead)
                    .with_message(format!("failed to read '{path}': {e}"))
                    .with_source(e);
                with_progress(error, &uploaded, files.len())
            })?;

            let key = remote_key(&config.path, path);
            let size = data.len();
            let output = self
                .store
                .put(
                    &container,
                    &key,
                    Bytes::from(data),
                    CONTENT_TYPE,
                    AccessPolicy::Private,
                )
                .await
                .map_err(|e| {
                    let error = Error::new(ErrorKind::Upload)
                        .with_message(format!(
                            "failed to upload '{path}' to '{key}': {}",
                            e.reason()
                        ))
                        .with_source(e);
                    with_progress(error, &uploaded, files.len())
                })?;

            tracing::debug!(
                target: TRACING_TARGET,
                key = %key,
                location = %output.location,
                size,
                "Object written"
            );

            let locator = self.store.locator_for(&container, &output.location);
            ui.message(&format!("Uploaded artifact to: {locator}"));
            uploaded.push(output.location);
        }

        let artifact = UploadedArtifact::new(&config.bucket, &config.path, files.to_vec());
        tracing::info!(
            target: TRACING_TARGET,
            bucket = %config.bucket,
            file_count = uploaded.len(),
            "Artifact published"
        );

        Ok(PostProcessOutput {
            artifact,
            keep_original: false,
        })
    }
}

/// Records which objects were written before `error` aborted the run.
///
/// `uploaded` holds stored locations.
fn with_progress(error: Error, uploaded: &[String], total: usize) -> Error {
    tracing::warn!(
        target: TRACING_TARGET,
        uploaded = uploaded.len(),
        total,
        error = %error,
        "Publishing aborted, written objects are left in place"
    );

    let context = if uploaded.is_empty() {
        format!("0 of {total} files uploaded before failure")
    } else {
        format!(
            "{} of {total} files uploaded before failure: {}",
            uploaded.len(),
            uploaded.join(", ")
        )
    };

    error.with_context(context)
}
