//! JSON Lines decoding into staging records

use super::records::StagingRecord;
use crate::types::JsonValue;
use tracing::warn;

/// Records decoded from one input object
#[derive(Debug)]
pub struct DecodedObject<T> {
    /// Records in line order
    pub records: Vec<T>,
    /// Lines that were not JSON objects (kept as all-null records)
    pub malformed: usize,
}

/// Decode a JSON Lines body (one JSON object per line)
///
/// Blank lines are skipped. A line that fails to parse as an object still
/// produces a record, with every field null.
pub fn decode_jsonl<T: StagingRecord>(body: &str, object: &str) -> DecodedObject<T> {
    let mut records = Vec::new();
    let mut malformed = 0;

    for (line_num, line) in body.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match parse_object::<T>(line) {
            Ok(record) => records.push(record),
            Err(e) => {
                warn!(
                    object,
                    line = line_num + 1,
                    error = %e,
                    "Malformed {} record, keeping it as nulls",
                    T::SOURCE
                );
                malformed += 1;
                records.push(T::default());
            }
        }
    }

    DecodedObject { records, malformed }
}

/// Parse one line, accepting only JSON objects
fn parse_object<T: StagingRecord>(line: &str) -> Result<T, String> {
    match serde_json::from_str::<JsonValue>(line).map_err(|e| e.to_string())? {
        value @ JsonValue::Object(_) => serde_json::from_value(value).map_err(|e| e.to_string()),
        other => Err(format!("expected a JSON object, found {}", json_kind(&other))),
    }
}

fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "an array",
        JsonValue::Object(_) => "an object",
    }
}
