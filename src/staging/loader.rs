//! Loading a whole input tree into staging records

use super::decoder::decode_jsonl;
use super::records::StagingRecord;
use crate::error::{Error, Result};
use crate::storage::StorageLocation;
use futures::{StreamExt, TryStreamExt};
use std::time::Instant;
use tracing::{debug, info};

/// Staging records for one input tree
#[derive(Debug)]
pub struct Staged<T> {
    /// Records in input order (object keys sorted, then line order)
    pub records: Vec<T>,
    /// Number of objects read
    pub objects: usize,
    /// Number of malformed lines kept as all-null records
    pub malformed: usize,
}

/// Load every `*.json` object below `<input>/<T::SOURCE>/`
///
/// Objects are fetched concurrently (at most `concurrency` at a time) but
/// their records are concatenated in key order, so the result is
/// deterministic. An empty or unreadable tree is fatal.
pub async fn load_staging<T: StagingRecord>(
    input: &StorageLocation,
    concurrency: usize,
) -> Result<Staged<T>> {
    let start = Instant::now();
    let source = input.child(T::SOURCE);

    let paths: Vec<_> = source
        .list()
        .await?
        .into_iter()
        .map(|meta| meta.location)
        .filter(|path| path.extension() == Some("json"))
        .collect();

    if paths.is_empty() {
        return Err(Error::EmptyInput {
            prefix: source.url(),
        });
    }

    debug!(source = %source.url(), objects = paths.len(), "Reading staging objects");

    let bodies: Vec<_> = futures::stream::iter(paths.iter())
        .map(|path| {
            let source = &source;
            async move {
                let bytes = source.get(path).await?;
                Ok::<_, Error>((source.display(path), bytes))
            }
        })
        .buffered(concurrency.max(1))
        .try_collect()
        .await?;

    let mut records = Vec::new();
    let mut malformed = 0;
    for (name, bytes) in &bodies {
        let body = String::from_utf8_lossy(bytes);
        let decoded = decode_jsonl::<T>(&body, name);
        debug!(object = %name, records = decoded.records.len(), "Decoded object");
        malformed += decoded.malformed;
        records.extend(decoded.records);
    }

    info!(
        source = T::SOURCE,
        objects = bodies.len(),
        records = records.len(),
        malformed,
        duration_ms = start.elapsed().as_millis() as u64,
        "Loaded staging records"
    );

    Ok(Staged {
        records,
        objects: bodies.len(),
        malformed,
    })
}
