//! Top-level error type shared across crates.

use thiserror::Error;

/// Common error type for parsing and arithmetic on the shared types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AgoraError {
    #[error("invalid decimal: {0}")]
    InvalidDecimal(String),

    #[error("invalid coins: {0}")]
    InvalidCoins(String),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("arithmetic overflow")]
    Overflow,

    #[error("root degree {0} is out of range")]
    RootOutOfRange(u64),

    #[error("division by zero")]
    DivisionByZero,
}
