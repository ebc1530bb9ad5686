//! Convenience re-exports.

pub use crate::client::{GetOutput, ObjectStoreClient, PutOutput, object_path};
pub use crate::region::Region;
pub use crate::s3::{S3Container, S3Session, S3Store};
pub use crate::store::{AccessPolicy, ObjectStore};
