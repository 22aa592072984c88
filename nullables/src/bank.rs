//! Nullable bank: in-memory balances with burn tracking.

use agora_providers::{BankProvider, ProviderError};
use agora_types::{Address, Coins};
use std::collections::BTreeMap;
use std::sync::Mutex;

/// An in-memory bank.
///
/// Balances start empty; fund accounts with [`NullBank::mint`]. Burned
/// coins are accumulated so tests can assert on deposit burns.
#[derive(Default)]
pub struct NullBank {
    balances: Mutex<BTreeMap<Address, Coins>>,
    burned: Mutex<Coins>,
}

impl NullBank {
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit `amount` to `address` out of thin air.
    pub fn mint(&self, address: &Address, amount: &Coins) {
        let mut balances = self.balances.lock().unwrap();
        let entry = balances.entry(address.clone()).or_default();
        *entry = entry.checked_add(amount).unwrap();
    }

    /// Replace the balance of `address`.
    pub fn set_balance(&self, address: &Address, amount: Coins) {
        self.balances.lock().unwrap().insert(address.clone(), amount);
    }

    pub fn balance(&self, address: &Address) -> Coins {
        self.balances
            .lock()
            .unwrap()
            .get(address)
            .cloned()
            .unwrap_or_default()
    }

    /// Everything burned so far.
    pub fn burned(&self) -> Coins {
        self.burned.lock().unwrap().clone()
    }
}

impl BankProvider for NullBank {
    fn all_balances(&self, address: &Address) -> Result<Coins, ProviderError> {
        Ok(self.balance(address))
    }

    fn send_coins(&self, from: &Address, to: &Address, amount: &Coins) -> Result<(), ProviderError> {
        let mut balances = self.balances.lock().unwrap();
        let have = balances.get(from).cloned().unwrap_or_default();
        let remaining = have
            .checked_sub(amount)
            .ok_or_else(|| ProviderError::InsufficientFunds {
                address: from.to_string(),
                needed: amount.to_string(),
                available: have.to_string(),
            })?;
        let received = balances
            .get(to)
            .cloned()
            .unwrap_or_default()
            .checked_add(amount)
            .ok_or_else(|| ProviderError::Bank("balance overflow".into()))?;
        balances.insert(from.clone(), remaining);
        balances.insert(to.clone(), received);
        Ok(())
    }

    fn burn_coins(&self, module: &Address, amount: &Coins) -> Result<(), ProviderError> {
        let mut balances = self.balances.lock().unwrap();
        let have = balances.get(module).cloned().unwrap_or_default();
        let remaining = have
            .checked_sub(amount)
            .ok_or_else(|| ProviderError::InsufficientFunds {
                address: module.to_string(),
                needed: amount.to_string(),
                available: have.to_string(),
            })?;
        balances.insert(module.clone(), remaining);
        let mut burned = self.burned.lock().unwrap();
        *burned = burned
            .checked_add(amount)
            .ok_or_else(|| ProviderError::Bank("burn overflow".into()))?;
        Ok(())
    }
}
