//! Account and validator address types.

use blake2::{Blake2b512, Digest};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::AgoraError;

/// An account address (`agora1...`).
///
/// Governors are identified by their account address.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Address(String);

impl Address {
    /// The standard prefix for all account addresses.
    pub const PREFIX: &'static str = "agora1";

    /// Longest accepted address, in bytes.
    pub const MAX_LEN: usize = 255;

    /// Create an address from a raw string without validation.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Parse and validate an address string.
    pub fn parse(raw: &str) -> Result<Self, AgoraError> {
        let addr = Self(raw.to_string());
        if addr.is_valid() {
            Ok(addr)
        } else {
            Err(AgoraError::InvalidAddress(raw.to_string()))
        }
    }

    /// Deterministic address of a named module account.
    ///
    /// The first 20 bytes of Blake2b-512 over the module name, hex encoded.
    pub fn module(name: &str) -> Self {
        let digest = Blake2b512::digest(name.as_bytes());
        Self(format!("{}{}", Self::PREFIX, hex::encode(&digest[..20])))
    }

    /// Return the raw address string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// Validate that this address is well-formed.
    pub fn is_valid(&self) -> bool {
        self.0.starts_with(Self::PREFIX)
            && self.0.len() > Self::PREFIX.len()
            && self.0.len() <= Self::MAX_LEN
            && self.0.bytes().all(|b| b.is_ascii_alphanumeric())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Address {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// A validator operator address (`agoravaloper1...`).
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ValidatorAddress(String);

impl ValidatorAddress {
    pub const PREFIX: &'static str = "agoravaloper1";
    pub const MAX_LEN: usize = Address::MAX_LEN;

    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    pub fn is_valid(&self) -> bool {
        self.0.starts_with(Self::PREFIX)
            && self.0.len() > Self::PREFIX.len()
            && self.0.len() <= Self::MAX_LEN
            && self.0.bytes().all(|b| b.is_ascii_alphanumeric())
    }
}

impl fmt::Display for ValidatorAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ValidatorAddress {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}
