//! Storage module
//!
//! Object storage access for both the input JSON trees and the output
//! tables.
//!
//! # Overview
//!
//! - `s3://bucket/prefix` and `s3a://bucket/prefix` - AWS S3
//! - `file:///abs/path`, `/abs/path` or `./rel/path` - local filesystem
//! - in-memory stores for tests

mod location;

pub use location::StorageLocation;
