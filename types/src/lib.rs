//! Fundamental types for the agora governance engine.
//!
//! This crate defines the core types shared across every other crate in the workspace:
//! account and validator addresses, timestamps, the fixed-point `Dec` used for
//! all stake and ratio arithmetic, and multi-denom `Coins`.

pub mod address;
pub mod coin;
pub mod dec;
pub mod error;
pub mod time;

pub use address::{Address, ValidatorAddress};
pub use coin::{Coin, Coins};
pub use dec::Dec;
pub use error::AgoraError;
pub use time::Timestamp;
