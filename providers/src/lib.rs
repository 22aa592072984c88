//! Interfaces to the modules governance consumes but does not own.
//!
//! The governance engine is constructed with one implementation of each
//! trait. Production wiring plugs in the real staking and bank modules;
//! tests use the deterministic doubles from `agora-nullables`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use agora_types::{Address, Coins, Dec, Timestamp, ValidatorAddress};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("insufficient funds in {address}: need {needed}, have {available}")]
    InsufficientFunds {
        address: String,
        needed: String,
        available: String,
    },

    #[error("unknown validator: {0}")]
    UnknownValidator(String),

    #[error("staking error: {0}")]
    Staking(String),

    #[error("bank error: {0}")]
    Bank(String),
}

/// Snapshot of a validator as seen by governance.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorInfo {
    pub operator: ValidatorAddress,
    /// The account controlling the validator; its votes are the validator's.
    pub account: Address,
    /// Tokens bonded to the validator.
    pub bonded_tokens: u128,
    /// Total shares issued to all delegators of this validator.
    pub delegator_shares: Dec,
    pub bonded: bool,
}

impl ValidatorInfo {
    /// Voting power of `shares` of this validator:
    /// `shares * bonded_tokens / delegator_shares`.
    pub fn power_of(&self, shares: Dec) -> Option<Dec> {
        if self.delegator_shares.is_zero() {
            return Some(Dec::ZERO);
        }
        shares.mul_int_quo(self.bonded_tokens, self.delegator_shares)
    }

    /// Tokens backing `shares`, truncated.
    pub fn tokens_of(&self, shares: Dec) -> u128 {
        self.power_of(shares)
            .and_then(|p| p.checked_truncate())
            .unwrap_or(0)
    }
}

/// A (delegator, validator) bond.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelegationInfo {
    pub delegator: Address,
    pub validator: ValidatorAddress,
    pub shares: Dec,
}

/// Read access to the staking module.
pub trait StakingProvider {
    /// Bonded validators ordered by descending power.
    fn bonded_validators_by_power(&self) -> Result<Vec<ValidatorInfo>, ProviderError>;

    fn validator(&self, operator: &ValidatorAddress) -> Result<Option<ValidatorInfo>, ProviderError>;

    /// Every delegation of `delegator`, ordered by validator.
    fn delegations(&self, delegator: &Address) -> Result<Vec<DelegationInfo>, ProviderError>;

    fn delegation(
        &self,
        delegator: &Address,
        validator: &ValidatorAddress,
    ) -> Result<Option<DelegationInfo>, ProviderError>;

    fn total_bonded_tokens(&self) -> Result<u128, ProviderError>;
}

/// Balance movements on behalf of governance.
pub trait BankProvider {
    fn all_balances(&self, address: &Address) -> Result<Coins, ProviderError>;

    fn send_coins(&self, from: &Address, to: &Address, amount: &Coins) -> Result<(), ProviderError>;

    /// Destroy `amount` held by the module account `module`.
    fn burn_coins(&self, module: &Address, amount: &Coins) -> Result<(), ProviderError>;
}

/// Account resolution.
pub trait AccountProvider {
    /// The address of the module account named `name`, created on first use.
    fn module_address(&self, name: &str) -> Address;
}

/// Callbacks the staking module fires around delegation changes.
///
/// Governance implements this to keep governor share totals in step with
/// the underlying stake.
pub trait StakingHooks {
    type Error;

    /// Called while the staking module still reports the old shares.
    fn before_delegation_shares_modified(
        &mut self,
        delegator: &Address,
        validator: &ValidatorAddress,
        now: Timestamp,
    ) -> Result<(), Self::Error>;

    /// Called once the staking module reports the new shares, or no
    /// delegation at all if it was removed.
    fn after_delegation_modified(
        &mut self,
        delegator: &Address,
        validator: &ValidatorAddress,
        now: Timestamp,
    ) -> Result<(), Self::Error>;
}
