//! Job fingerprints: blake3 over the JSON form of a declaration.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::Result;

/// Serialized as a 64-char lowercase hex string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint(blake3::Hash);

impl Fingerprint {
    pub fn to_hex(&self) -> String {
        self.0.to_hex().to_string()
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl Serialize for Fingerprint {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Fingerprint {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let hex = String::deserialize(deserializer)?;
        blake3::Hash::from_hex(&hex)
            .map(Fingerprint)
            .map_err(serde::de::Error::custom)
    }
}

/// `serde_json::Map` is ordered by key, so equal declarations fingerprint
/// equal regardless of source key order.
pub fn hash_serde<T: Serialize>(v: &T) -> Result<Fingerprint> {
    let bytes = serde_json::to_vec(v)?;
    Ok(Fingerprint(blake3::hash(&bytes)))
}
