//! Storage locations (S3 and local filesystem)

use crate::config::AwsCredentials;
use crate::error::{Error, Result};
use bytes::Bytes;
use futures::TryStreamExt;
use object_store::aws::AmazonS3Builder;
use object_store::local::LocalFileSystem;
use object_store::memory::InMemory;
use object_store::path::{Path as ObjectPath, PathPart};
use object_store::{ObjectMeta, ObjectStore};
use std::path::PathBuf;
use std::sync::Arc;
use url::Url;

/// A directory-like location inside an object store
#[derive(Debug, Clone)]
pub struct StorageLocation {
    /// The object store implementation
    store: Arc<dyn ObjectStore>,
    /// Key prefix within the store
    prefix: ObjectPath,
    /// Scheme and bucket (or local directory) used when printing paths
    base: String,
}

impl StorageLocation {
    /// Open an existing location
    ///
    /// Supported formats:
    /// - `s3://bucket/path/` or `s3a://bucket/path/` - AWS S3
    /// - `file:///abs/path`, `/abs/path` or `./path` - local filesystem
    ///
    /// A local directory that does not exist is an error.
    pub fn parse(url: &str, credentials: &AwsCredentials) -> Result<Self> {
        Self::open(url, credentials, false)
    }

    /// Open a location, creating a local directory if needed
    pub fn parse_or_create(url: &str, credentials: &AwsCredentials) -> Result<Self> {
        Self::open(url, credentials, true)
    }

    fn open(url: &str, credentials: &AwsCredentials, create: bool) -> Result<Self> {
        if url.starts_with("s3://") || url.starts_with("s3a://") {
            Self::parse_s3(url, credentials)
        } else {
            Self::parse_local(url, create)
        }
    }

    /// Parse an S3 URL
    fn parse_s3(url: &str, credentials: &AwsCredentials) -> Result<Self> {
        let parsed = Url::parse(url)?;
        let bucket = parsed
            .host_str()
            .filter(|b| !b.is_empty())
            .ok_or_else(|| Error::config(format!("S3 URL has no bucket: {url}")))?;

        let mut builder = AmazonS3Builder::from_env().with_bucket_name(bucket);
        if let Some(key) = &credentials.access_key_id {
            builder = builder.with_access_key_id(key);
        }
        if let Some(secret) = &credentials.secret_access_key {
            builder = builder.with_secret_access_key(secret);
        }
        if let Some(region) = &credentials.region {
            builder = builder.with_region(region);
        }

        let store = builder
            .build()
            .map_err(|e| Error::config(format!("Failed to create S3 client: {e}")))?;

        Ok(Self {
            store: Arc::new(store),
            prefix: ObjectPath::from(parsed.path()),
            base: format!("s3://{bucket}"),
        })
    }

    /// Parse a local filesystem path
    fn parse_local(path: &str, create: bool) -> Result<Self> {
        let dir = if path.starts_with("file://") {
            Url::parse(path)?
                .to_file_path()
                .map_err(|()| Error::config(format!("Invalid file URL: {path}")))?
        } else {
            PathBuf::from(path)
        };

        if create {
            std::fs::create_dir_all(&dir).map_err(|e| {
                Error::storage(format!("Failed to create directory {}: {e}", dir.display()))
            })?;
        } else if !dir.is_dir() {
            return Err(Error::storage(format!(
                "Directory does not exist: {}",
                dir.display()
            )));
        }

        let store = LocalFileSystem::new_with_prefix(&dir).map_err(|e| {
            Error::storage(format!("Failed to open {}: {e}", dir.display()))
        })?;

        Ok(Self {
            store: Arc::new(store),
            prefix: ObjectPath::default(),
            base: dir.display().to_string().trim_end_matches('/').to_string(),
        })
    }

    /// An empty in-memory location
    pub fn in_memory(name: &str) -> Self {
        Self::from_store(Arc::new(InMemory::new()), "", format!("memory://{name}"))
    }

    /// Wrap an existing store
    pub fn from_store(store: Arc<dyn ObjectStore>, prefix: &str, base: impl Into<String>) -> Self {
        Self {
            store,
            prefix: ObjectPath::from(prefix),
            base: base.into(),
        }
    }

    /// Sub-location sharing the same store
    #[must_use]
    pub fn child(&self, segment: &str) -> Self {
        Self {
            store: Arc::clone(&self.store),
            prefix: self.prefix.child(segment),
            base: self.base.clone(),
        }
    }

    /// Printable URL of this location
    pub fn url(&self) -> String {
        self.display(&self.prefix)
    }

    /// Printable URL of an object
    pub fn display(&self, path: &ObjectPath) -> String {
        if path.as_ref().is_empty() {
            self.base.clone()
        } else {
            format!("{}/{path}", self.base)
        }
    }

    /// Object path for raw (unencoded) segments below this location
    pub fn path(&self, segments: &[&str]) -> ObjectPath {
        ObjectPath::from_iter(
            self.prefix
                .parts()
                .chain(segments.iter().map(|s| PathPart::from(*s))),
        )
    }

    /// Object path for an already-encoded relative key such as `a/b=1/c`
    pub fn path_from_key(&self, key: &str) -> Result<ObjectPath> {
        let full = if self.prefix.as_ref().is_empty() {
            key.to_string()
        } else {
            format!("{}/{key}", self.prefix)
        };
        ObjectPath::parse(&full)
            .map_err(|e| Error::storage(format!("Invalid object key '{key}': {e}")))
    }

    /// Encoded key of `path` relative to this location
    pub fn relative_key(&self, path: &ObjectPath) -> Option<String> {
        let parts: Vec<String> = path
            .prefix_match(&self.prefix)?
            .map(|p| p.as_ref().to_string())
            .collect();
        Some(parts.join("/"))
    }

    /// Decoded segments of `path` relative to this location
    pub fn relative_segments(&self, path: &ObjectPath) -> Option<Vec<String>> {
        Some(
            path.prefix_match(&self.prefix)?
                .map(|p| decode_segment(p.as_ref()))
                .collect(),
        )
    }

    /// List every object below this location, sorted by key
    pub async fn list(&self) -> Result<Vec<ObjectMeta>> {
        let prefix = (!self.prefix.as_ref().is_empty()).then_some(&self.prefix);
        let mut objects: Vec<ObjectMeta> = self
            .store
            .list(prefix)
            .try_collect()
            .await
            .map_err(|e| Error::storage(format!("Failed to list {}: {e}", self.url())))?;
        objects.sort_by(|a, b| a.location.cmp(&b.location));
        Ok(objects)
    }

    /// Read a whole object
    pub async fn get(&self, path: &ObjectPath) -> Result<Bytes> {
        let result = self
            .store
            .get(path)
            .await
            .map_err(|e| Error::storage(format!("Failed to read {}: {e}", self.display(path))))?;
        result
            .bytes()
            .await
            .map_err(|e| Error::storage(format!("Failed to read {}: {e}", self.display(path))))
    }

    /// Write a whole object, replacing any previous content
    pub async fn put(&self, path: &ObjectPath, data: Bytes) -> Result<String> {
        self.store
            .put(path, data.into())
            .await
            .map_err(|e| Error::storage(format!("Failed to write {}: {e}", self.display(path))))?;
        Ok(self.display(path))
    }

    /// Whether an object exists
    pub async fn exists(&self, path: &ObjectPath) -> Result<bool> {
        match self.store.head(path).await {
            Ok(_) => Ok(true),
            Err(object_store::Error::NotFound { .. }) => Ok(false),
            Err(e) => Err(Error::storage(format!(
                "Failed to stat {}: {e}",
                self.display(path)
            ))),
        }
    }

    /// Delete an object
    pub async fn delete(&self, path: &ObjectPath) -> Result<()> {
        match self.store.delete(path).await {
            Ok(()) | Err(object_store::Error::NotFound { .. }) => Ok(()),
            Err(e) => Err(Error::storage(format!(
                "Failed to delete {}: {e}",
                self.display(path)
            ))),
        }
    }
}

/// Undo the percent-encoding object_store applies to path segments
fn decode_segment(segment: &str) -> String {
    urlencoding::decode(segment).map_or_else(|_| segment.to_string(), |s| s.into_owned())
}
