//! Result type for [`ObjectStoreClient::put`](super::ObjectStoreClient::put).

/// Acknowledgement of a successful write.
#[derive(Debug, Clone, Default)]
pub struct PutOutput {
    /// Key the object was stored under, after path normalization.
    ///
    /// This can differ from the requested key: empty segments are dropped
    /// and `.` or `..` segments are percent-encoded.
    pub location: String,
    /// Unique identifier for the newly created object, if the backend provides one.
    pub e_tag: Option<String>,
    /// A version indicator for the newly created object, if the backend provides one.
    pub version: Option<String>,
}

impl PutOutput {
    pub(crate) fn new(location: String, result: object_store::PutResult) -> Self {
        Self {
            location,
            e_tag: result.e_tag,
            version: result.version,
        }
    }
}
