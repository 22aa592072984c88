//! Nullable infrastructure for deterministic testing.
//!
//! Every collaborator of the governance engine (storage, clock, staking,
//! bank, accounts) is abstracted behind a trait. This crate provides
//! test-friendly implementations that:
//! - Return deterministic values
//! - Can be controlled programmatically
//! - Never touch the filesystem or network
//!
//! Usage: swap real implementations for nullables in tests.

pub mod accounts;
pub mod bank;
pub mod clock;
pub mod staking;
pub mod store;

pub use accounts::NullAccounts;
pub use bank::NullBank;
pub use clock::NullClock;
pub use staking::NullStaking;
pub use store::MemStore;
