//! Nullable account keeper.

use agora_providers::AccountProvider;
use agora_types::Address;

/// Resolves module accounts to their deterministic addresses.
#[derive(Default)]
pub struct NullAccounts;

impl NullAccounts {
    pub fn new() -> Self {
        Self
    }
}

impl AccountProvider for NullAccounts {
    fn module_address(&self, name: &str) -> Address {
        Address::module(name)
    }
}
