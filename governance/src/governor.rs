//! Governors and the governance delegation ledger.
//!
//! A delegator assigns all of its staking delegations to at most one
//! governor. For every (governor, validator) pair the ledger keeps the sum
//! of the shares its delegators hold with that validator, so the tally can
//! compute a governor's inherited power without walking its delegators.
//! Staking hooks keep those sums in step with the underlying stake.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info};

use agora_providers::StakingProvider;
use agora_types::{Address, Dec, Timestamp, ValidatorAddress};

use crate::params::Params;
use crate::state::GovState;
use crate::GovernanceError;

const MAX_MONIKER_LEN: usize = 70;
const MAX_IDENTITY_LEN: usize = 3000;
const MAX_WEBSITE_LEN: usize = 140;
const MAX_SECURITY_CONTACT_LEN: usize = 140;
const MAX_DETAILS_LEN: usize = 280;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GovernorStatus {
    Active,
    Inactive,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GovernorDescription {
    pub moniker: String,
    pub identity: String,
    pub website: String,
    pub security_contact: String,
    pub details: String,
}

impl GovernorDescription {
    pub fn validate(&self) -> Result<(), GovernanceError> {
        let fields = [
            ("moniker", &self.moniker, MAX_MONIKER_LEN),
            ("identity", &self.identity, MAX_IDENTITY_LEN),
            ("website", &self.website, MAX_WEBSITE_LEN),
            ("security contact", &self.security_contact, MAX_SECURITY_CONTACT_LEN),
            ("details", &self.details, MAX_DETAILS_LEN),
        ];
        for (name, value, max) in fields {
            if value.len() > max {
                return Err(GovernanceError::InvalidMessage(format!(
                    "governor {name} too long: {} > {max}",
                    value.len()
                )));
            }
        }
        if self.moniker.trim().is_empty() {
            return Err(GovernanceError::InvalidMessage(
                "governor moniker cannot be empty".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Governor {
    pub address: Address,
    pub description: GovernorDescription,
    pub status: GovernorStatus,
    pub last_status_change_time: Option<Timestamp>,
}

impl Governor {
    pub fn is_active(&self) -> bool {
        self.status == GovernorStatus::Active
    }
}

/// Bookkeeping of governance delegations and governor share totals.
pub struct GovernorLedger<'a> {
    state: GovState<'a>,
    staking: &'a dyn StakingProvider,
}

impl<'a> GovernorLedger<'a> {
    pub fn new(state: GovState<'a>, staking: &'a dyn StakingProvider) -> Self {
        Self { state, staking }
    }

    /// Assign `delegator` to `governor` and add its current shares to the
    /// governor's totals.
    pub fn delegate(&self, delegator: &Address, governor: &Address) -> Result<(), GovernanceError> {
        if let Some(existing) = self.state.governance_delegation(delegator)? {
            return Err(GovernanceError::GovernorDelegation(format!(
                "{delegator} is already delegated to {existing}"
            )));
        }
        self.state.set_governance_delegation(delegator, governor)?;
        for d in self.staking.delegations(delegator)? {
            self.add_shares(governor, &d.validator, d.shares)?;
        }
        debug!(%delegator, %governor, "governance delegation added");
        Ok(())
    }

    /// Remove the assignment of `delegator`, returning its former governor.
    /// Delegators without a governor are a no-op.
    pub fn undelegate(&self, delegator: &Address) -> Result<Option<Address>, GovernanceError> {
        let Some(governor) = self.state.governance_delegation(delegator)? else {
            return Ok(None);
        };
        for d in self.staking.delegations(delegator)? {
            self.sub_shares(&governor, &d.validator, d.shares)?;
        }
        self.state.remove_governance_delegation(delegator)?;
        debug!(%delegator, %governor, "governance delegation removed");
        Ok(Some(governor))
    }

    pub fn redelegate(&self, delegator: &Address, governor: &Address) -> Result<(), GovernanceError> {
        self.undelegate(delegator)?;
        self.delegate(delegator, governor)
    }

    /// Subtract the delegation's current shares from the assigned governor.
    pub fn before_delegation_shares_modified(
        &self,
        delegator: &Address,
        validator: &ValidatorAddress,
    ) -> Result<(), GovernanceError> {
        let Some(governor) = self.state.governance_delegation(delegator)? else {
            return Ok(());
        };
        if let Some(d) = self.staking.delegation(delegator, validator)? {
            self.sub_shares(&governor, validator, d.shares)?;
        }
        Ok(())
    }

    /// Re-add the delegation's new shares, and deactivate an active
    /// governor whose self-delegation fell below the minimum.
    pub fn after_delegation_modified(
        &self,
        delegator: &Address,
        validator: &ValidatorAddress,
        params: &Params,
        now: Timestamp,
    ) -> Result<(), GovernanceError> {
        if let Some(governor) = self.state.governance_delegation(delegator)? {
            if let Some(d) = self.staking.delegation(delegator, validator)? {
                self.add_shares(&governor, validator, d.shares)?;
            }
        }
        if let Some(gov) = self.state.governor(delegator)? {
            if gov.is_active() {
                let bonded = self.self_delegation_tokens(delegator)?;
                if bonded < params.min_governor_self_delegation {
                    info!(
                        governor = %delegator,
                        bonded,
                        min = params.min_governor_self_delegation,
                        "governor self-delegation below minimum, deactivating"
                    );
                    self.deactivate(gov, now)?;
                }
            }
        }
        Ok(())
    }

    /// Mark a governor inactive and drop its delegation to itself.
    pub fn deactivate(&self, mut governor: Governor, now: Timestamp) -> Result<(), GovernanceError> {
        governor.status = GovernorStatus::Inactive;
        governor.last_status_change_time = Some(now);
        self.state.set_governor(&governor)?;
        if self.state.governance_delegation(&governor.address)?.as_ref() == Some(&governor.address) {
            self.undelegate(&governor.address)?;
        }
        Ok(())
    }

    /// Mark a governor active and delegate it to itself, moving it away
    /// from any other governor first.
    pub fn activate(&self, mut governor: Governor, now: Timestamp) -> Result<(), GovernanceError> {
        governor.status = GovernorStatus::Active;
        governor.last_status_change_time = Some(now);
        self.state.set_governor(&governor)?;
        match self.state.governance_delegation(&governor.address)? {
            Some(current) if current == governor.address => Ok(()),
            Some(_) => self.redelegate(&governor.address, &governor.address),
            None => self.delegate(&governor.address, &governor.address),
        }
    }

    /// Tokens `address` has bonded to bonded validators.
    pub fn self_delegation_tokens(&self, address: &Address) -> Result<u128, GovernanceError> {
        let mut total = 0u128;
        for d in self.staking.delegations(address)? {
            if let Some(v) = self.staking.validator(&d.validator)? {
                if v.bonded {
                    total = total.saturating_add(v.tokens_of(d.shares));
                }
            }
        }
        Ok(total)
    }

    /// Power represented by a governor through bonded validators.
    pub fn voting_power(&self, governor: &Address) -> Result<Dec, GovernanceError> {
        let mut power = Dec::ZERO;
        for (validator, shares) in self.state.governor_val_shares_of(governor)? {
            if let Some(v) = self.staking.validator(&validator)? {
                if v.bonded {
                    power = power.saturating_add(v.power_of(shares).unwrap_or(Dec::ZERO));
                }
            }
        }
        Ok(power)
    }

    /// Expected share totals of a governor, recomputed from staking.
    pub fn expected_val_shares(
        &self,
        governor: &Address,
    ) -> Result<BTreeMap<ValidatorAddress, Dec>, GovernanceError> {
        let mut totals: BTreeMap<ValidatorAddress, Dec> = BTreeMap::new();
        for delegator in self.state.delegators_of(governor)? {
            for d in self.staking.delegations(&delegator)? {
                let entry = totals.entry(d.validator).or_insert(Dec::ZERO);
                *entry = entry.saturating_add(d.shares);
            }
        }
        totals.retain(|_, shares| !shares.is_zero());
        Ok(totals)
    }

    fn add_shares(
        &self,
        governor: &Address,
        validator: &ValidatorAddress,
        shares: Dec,
    ) -> Result<(), GovernanceError> {
        if shares.is_zero() {
            return Ok(());
        }
        let current = self
            .state
            .governor_val_shares(governor, validator)?
            .unwrap_or(Dec::ZERO);
        let total = current.checked_add(shares).ok_or_else(|| {
            GovernanceError::Invariant(format!("governor {governor} shares overflow"))
        })?;
        self.state.set_governor_val_shares(governor, validator, total)
    }

    fn sub_shares(
        &self,
        governor: &Address,
        validator: &ValidatorAddress,
        shares: Dec,
    ) -> Result<(), GovernanceError> {
        if shares.is_zero() {
            return Ok(());
        }
        let current = self
            .state
            .governor_val_shares(governor, validator)?
            .unwrap_or(Dec::ZERO);
        let remaining = current.checked_sub(shares).ok_or_else(|| {
            GovernanceError::Invariant(format!(
                "governor {governor} shares with {validator} would go negative: {current} - {shares}"
            ))
        })?;
        if remaining.is_zero() {
            self.state.remove_governor_val_shares(governor, validator)
        } else {
            self.state
                .set_governor_val_shares(governor, validator, remaining)
        }
    }
}
