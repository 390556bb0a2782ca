use std::fmt::Display;

use anyhow::Context;
use blake3::Hash;

/// Content checksum of a durably encoded file.
///
/// Computed over the raw bytes before encoding and checked again after decoding,
/// so a stored payload either reproduces the original file or fails loudly.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Checksum(pub Hash);

impl Checksum {
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self(blake3::hash(bytes))
    }

    pub fn to_hex(&self) -> String {
        self.0.to_hex().to_string()
    }

    pub fn from_hex(hex: &str) -> anyhow::Result<Self> {
        Ok(Self(
            Hash::from_hex(hex).with_context(|| format!("invalid checksum {hex}"))?,
        ))
    }
}

impl Display for Checksum {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}
