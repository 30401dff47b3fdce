//! Hex text encoding for byte fields in JSON artifacts.
//!
//! Use with `#[serde(with = "crate::core::hex_serde::bytes")]` or
//! `#[serde(with = "crate::core::hex_serde::digest")]`.

/// `Vec<u8>` as a lowercase hex string.
pub mod bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    /// Serialize bytes as hex.
    pub fn serialize<S: Serializer>(value: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(value))
    }

    /// Deserialize bytes from hex.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let text = String::deserialize(deserializer)?;
        hex::decode(&text).map_err(serde::de::Error::custom)
    }
}

/// `[u8; 32]` as a 64-character hex string.
pub mod digest {
    use serde::{Deserialize, Deserializer, Serializer};
    use crate::core::hash::Digest32;

    /// Serialize a digest as hex.
    pub fn serialize<S: Serializer>(value: &Digest32, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(value))
    }

    /// Deserialize a digest from hex.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Digest32, D::Error> {
        let text = String::deserialize(deserializer)?;
        let mut out = [0u8; 32];
        hex::decode_to_slice(&text, &mut out).map_err(serde::de::Error::custom)?;
        Ok(out)
    }
}
