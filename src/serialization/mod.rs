//! CBOR serialization for governance state snapshots.
//!
//! - Snapshots use CBOR via `ciborium` (notices and events stay JSON)
//! - Encoding is deterministic, so equal states hash equally
//! - New snapshot fields carry `#[serde(default)]`

use serde::{de::DeserializeOwned, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Serialization errors.
#[derive(Debug, Error)]
pub enum SerializationError {
    /// CBOR encoding failed.
    #[error("CBOR encoding failed: {0}")]
    Encode(String),

    /// CBOR decoding failed.
    #[error("CBOR decoding failed: {0}")]
    Decode(String),
}

/// Serialize to CBOR bytes.
pub fn to_cbor<T: Serialize>(value: &T) -> Result<Vec<u8>, SerializationError> {
    let mut bytes = Vec::new();
    ciborium::into_writer(value, &mut bytes)
        .map_err(|e| SerializationError::Encode(format!("{:?}", e)))?;
    Ok(bytes)
}

/// Deserialize from CBOR bytes.
pub fn from_cbor<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, SerializationError> {
    ciborium::from_reader(bytes).map_err(|e| SerializationError::Decode(format!("{:?}", e)))
}

/// Hex-encoded SHA-256 of the CBOR encoding of `value`.
pub fn cbor_digest<T: Serialize>(value: &T) -> Result<String, SerializationError> {
    let bytes = to_cbor(value)?;
    Ok(hex::encode(Sha256::digest(&bytes)))
}
