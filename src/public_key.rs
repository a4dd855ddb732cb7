use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt::{Display, Formatter};
use thiserror::Error;

#[derive(Error, Debug, Clone, Eq, PartialEq)]
pub enum PublicKeyError {
    #[error("invalid hex string: {0}")]
    InvalidHex(String),

    #[error("invalid public key length. Expected: {expected} but got: {actual}")]
    InvalidLength { expected: usize, actual: usize },
}

pub const PUBLIC_KEY_BYTE_COUNT: usize = 32;

/// The address that owns a transaction output: the bytes of an Ed25519 verifying key.
#[derive(Debug, Copy, Clone, Hash, Ord, PartialOrd, Eq, PartialEq)]
pub struct PublicKey([u8; PUBLIC_KEY_BYTE_COUNT]);

impl PublicKey {
    pub const fn new(public_key: [u8; PUBLIC_KEY_BYTE_COUNT]) -> Self {
        Self(public_key)
    }

    pub fn as_bytes(&self) -> &[u8; PUBLIC_KEY_BYTE_COUNT] {
        &self.0
    }

    pub fn from_hex(s: &str) -> Result<Self, PublicKeyError> {
        let bytes = hex::decode(s).map_err(|e| PublicKeyError::InvalidHex(e.to_string()))?;
        if bytes.len() != PUBLIC_KEY_BYTE_COUNT {
            return Err(PublicKeyError::InvalidLength {
                expected: PUBLIC_KEY_BYTE_COUNT,
                actual: bytes.len(),
            });
        }
        let mut public_key = [0; PUBLIC_KEY_BYTE_COUNT];
        public_key.copy_from_slice(&bytes);
        Ok(Self(public_key))
    }
}

impl Display for PublicKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl Serialize for PublicKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            serializer.serialize_str(&hex::encode(self.0))
        } else {
            self.0.serialize(serializer)
        }
    }
}

impl<'de> Deserialize<'de> for PublicKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        if deserializer.is_human_readable() {
            deserializer.deserialize_str(PublicKeyVisitor)
        } else {
            <[u8; PUBLIC_KEY_BYTE_COUNT]>::deserialize(deserializer).map(PublicKey::new)
        }
    }
}

struct PublicKeyVisitor;

impl<'de> Visitor<'de> for PublicKeyVisitor {
    type Value = PublicKey;

    fn expecting(&self, formatter: &mut Formatter) -> std::fmt::Result {
        formatter.write_str("a hex-encoded Ed25519 public key")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        PublicKey::from_hex(v).map_err(E::custom)
    }
}
