//! Full-row deduplication

use crate::tables::{Artist, Song};
use std::collections::HashSet;
use std::hash::Hash;

/// Hashable image of a row, equal exactly when every column is equal
pub trait RowKey {
    type Key: Hash + Eq;

    fn row_key(&self) -> Self::Key;
}

/// Keep the first occurrence of every distinct row, preserving order
pub fn distinct<T: RowKey>(rows: impl IntoIterator<Item = T>) -> Vec<T> {
    let mut seen = HashSet::new();
    rows.into_iter()
        .filter(|row| seen.insert(row.row_key()))
        .collect()
}

/// Bit pattern of a double for equality; `-0.0 == 0.0` and all NaNs are one value
fn float_bits(value: Option<f64>) -> Option<u64> {
    value.map(|v| {
        if v == 0.0 {
            0.0_f64.to_bits()
        } else if v.is_nan() {
            f64::NAN.to_bits()
        } else {
            v.to_bits()
        }
    })
}

impl RowKey for Song {
    type Key = (String, Option<String>, Option<String>, Option<i32>, Option<u64>);

    fn row_key(&self) -> Self::Key {
        (
            self.song_id.clone(),
            self.title.clone(),
            self.artist_id.clone(),
            self.year,
            float_bits(self.duration),
        )
    }
}

impl RowKey for Artist {
    type Key = (
        String,
        Option<String>,
        Option<String>,
        Option<u64>,
        Option<u64>,
    );

    fn row_key(&self) -> Self::Key {
        (
            self.artist_id.clone(),
            self.name.clone(),
            self.location.clone(),
            float_bits(self.latitude),
            float_bits(self.longitude),
        )
    }
}
