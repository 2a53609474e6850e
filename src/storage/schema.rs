/// Versioned envelopes for everything written to the key-value store.
use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const SCHEMA_VERSION: u32 = 1;

#[derive(Serialize)]
struct EnvelopeRef<'a, T> {
    version: u32,
    records: &'a T,
}

#[derive(Deserialize)]
struct Envelope {
    version: u32,
    records: Value,
}

#[derive(Debug, PartialEq)]
pub enum Decoded<T> {
    Current(T),
    /// Bare array written before envelopes existed; should be rewritten.
    Migrated(T),
}

#[derive(Debug, PartialEq)]
pub enum SchemaError {
    UnsupportedVersion(u32),
    Malformed(String),
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaError::UnsupportedVersion(version) => {
                write!(f, "unsupported schema version {version} (expected {SCHEMA_VERSION})")
            }
            SchemaError::Malformed(reason) => write!(f, "malformed record blob: {reason}"),
        }
    }
}

impl std::error::Error for SchemaError {}

pub fn encode<T: Serialize>(records: &T) -> serde_json::Result<String> {
    serde_json::to_string(&EnvelopeRef {
        version: SCHEMA_VERSION,
        records,
    })
}

pub fn decode<T: DeserializeOwned>(raw: &str) -> Result<Decoded<T>, SchemaError> {
    let value: Value =
        serde_json::from_str(raw).map_err(|err| SchemaError::Malformed(err.to_string()))?;
    if value.is_array() {
        return serde_json::from_value(value)
            .map(Decoded::Migrated)
            .map_err(|err| SchemaError::Malformed(err.to_string()));
    }
    let envelope: Envelope =
        serde_json::from_value(value).map_err(|err| SchemaError::Malformed(err.to_string()))?;
    if envelope.version != SCHEMA_VERSION {
        return Err(SchemaError::UnsupportedVersion(envelope.version));
    }
    serde_json::from_value(envelope.records)
        .map(Decoded::Current)
        .map_err(|err| SchemaError::Malformed(err.to_string()))
}
