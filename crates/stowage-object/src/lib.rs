#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

pub mod client;
/// Known regions and their endpoints.
pub mod region;
/// S3 implementation of [`ObjectStore`].
pub mod s3;
mod store;

#[doc(hidden)]
pub mod prelude;

pub use client::{GetOutput, ObjectStoreClient, PutOutput, object_path};
pub use region::Region;
pub use s3::{S3Container, S3Session, S3Store};
pub use store::{AccessPolicy, ObjectStore};

/// Tracing target for object store operations.
pub const TRACING_TARGET: &str = "stowage_object";
