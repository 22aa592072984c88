//! Nullable staking: validators and delegations held in memory.
//!
//! Shares are minted at the validator's current exchange rate, so a
//! slashed validator issues more shares per token, the same way a real
//! staking module does.

use agora_providers::{DelegationInfo, ProviderError, StakingProvider, ValidatorInfo};
use agora_types::{Address, Dec, ValidatorAddress};
use std::collections::BTreeMap;
use std::sync::Mutex;

/// Tokens per unit of consensus power.
pub const POWER_REDUCTION: u128 = 1_000_000;

#[derive(Default)]
pub struct NullStaking {
    validators: Mutex<BTreeMap<ValidatorAddress, ValidatorInfo>>,
    delegations: Mutex<BTreeMap<(Address, ValidatorAddress), Dec>>,
}

impl NullStaking {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an empty validator controlled by `account`.
    pub fn add_validator(&self, operator: &ValidatorAddress, account: &Address, bonded: bool) {
        self.validators.lock().unwrap().insert(
            operator.clone(),
            ValidatorInfo {
                operator: operator.clone(),
                account: account.clone(),
                bonded_tokens: 0,
                delegator_shares: Dec::ZERO,
                bonded,
            },
        );
    }

    pub fn set_bonded(&self, operator: &ValidatorAddress, bonded: bool) {
        if let Some(v) = self.validators.lock().unwrap().get_mut(operator) {
            v.bonded = bonded;
        }
    }

    /// Convert consensus power units to tokens.
    pub fn tokens_from_consensus_power(&self, power: u64) -> u128 {
        power as u128 * POWER_REDUCTION
    }

    /// Bond `tokens` from `delegator` to `validator`; returns the shares issued.
    pub fn delegate(
        &self,
        delegator: &Address,
        validator: &ValidatorAddress,
        tokens: u128,
    ) -> Result<Dec, ProviderError> {
        let mut validators = self.validators.lock().unwrap();
        let v = validators
            .get_mut(validator)
            .ok_or_else(|| ProviderError::UnknownValidator(validator.to_string()))?;
        let shares = if v.delegator_shares.is_zero() || v.bonded_tokens == 0 {
            Dec::from_u128(tokens)
        } else {
            v.delegator_shares
                .mul_int_quo(tokens, Dec::from_u128(v.bonded_tokens))
                .ok_or_else(|| overflow("share issuance"))?
        };
        let bonded = v
            .bonded_tokens
            .checked_add(tokens)
            .ok_or_else(|| overflow("bonded tokens"))?;
        let total_shares = v
            .delegator_shares
            .checked_add(shares)
            .ok_or_else(|| overflow("delegator shares"))?;
        let mut delegations = self.delegations.lock().unwrap();
        let entry = delegations
            .entry((delegator.clone(), validator.clone()))
            .or_insert(Dec::ZERO);
        *entry = entry
            .checked_add(shares)
            .ok_or_else(|| overflow("delegation shares"))?;
        v.bonded_tokens = bonded;
        v.delegator_shares = total_shares;
        Ok(shares)
    }

    /// Remove `shares` of `delegator`'s bond with `validator`.
    pub fn undelegate(
        &self,
        delegator: &Address,
        validator: &ValidatorAddress,
        shares: Dec,
    ) -> Result<(), ProviderError> {
        let mut validators = self.validators.lock().unwrap();
        let v = validators
            .get_mut(validator)
            .ok_or_else(|| ProviderError::UnknownValidator(validator.to_string()))?;
        let mut delegations = self.delegations.lock().unwrap();
        let key = (delegator.clone(), validator.clone());
        let remaining = delegations
            .get(&key)
            .and_then(|held| held.checked_sub(shares))
            .ok_or_else(|| {
                ProviderError::Staking(format!("{delegator} holds fewer than {shares} shares"))
            })?;
        let tokens = v.tokens_of(shares);
        v.bonded_tokens = v.bonded_tokens.saturating_sub(tokens);
        v.delegator_shares = v.delegator_shares.saturating_sub(shares);
        if remaining.is_zero() {
            delegations.remove(&key);
        } else {
            delegations.insert(key, remaining);
        }
        Ok(())
    }

    /// Burn `fraction` of the validator's tokens without touching shares.
    pub fn slash(&self, validator: &ValidatorAddress, fraction: Dec) -> Result<(), ProviderError> {
        let mut validators = self.validators.lock().unwrap();
        let v = validators
            .get_mut(validator)
            .ok_or_else(|| ProviderError::UnknownValidator(validator.to_string()))?;
        let burned = fraction
            .min(Dec::ONE)
            .mul_int_truncate(v.bonded_tokens)
            .ok_or_else(|| overflow("slash amount"))?;
        v.bonded_tokens -= burned;
        Ok(())
    }
}

fn overflow(what: &str) -> ProviderError {
    ProviderError::Staking(format!("{what} overflow"))
}

impl StakingProvider for NullStaking {
    fn bonded_validators_by_power(&self) -> Result<Vec<ValidatorInfo>, ProviderError> {
        let mut bonded: Vec<ValidatorInfo> = self
            .validators
            .lock()
            .unwrap()
            .values()
            .filter(|v| v.bonded)
            .cloned()
            .collect();
        bonded.sort_by(|a, b| {
            b.bonded_tokens
                .cmp(&a.bonded_tokens)
                .then_with(|| a.operator.cmp(&b.operator))
        });
        Ok(bonded)
    }

    fn validator(&self, operator: &ValidatorAddress) -> Result<Option<ValidatorInfo>, ProviderError> {
        Ok(self.validators.lock().unwrap().get(operator).cloned())
    }

    fn delegations(&self, delegator: &Address) -> Result<Vec<DelegationInfo>, ProviderError> {
        Ok(self
            .delegations
            .lock()
            .unwrap()
            .iter()
            .filter(|((d, _), _)| d == delegator)
            .map(|((d, v), shares)| DelegationInfo {
                delegator: d.clone(),
                validator: v.clone(),
                shares: *shares,
            })
            .collect())
    }

    fn delegation(
        &self,
        delegator: &Address,
        validator: &ValidatorAddress,
    ) -> Result<Option<DelegationInfo>, ProviderError> {
        Ok(self
            .delegations
            .lock()
            .unwrap()
            .get(&(delegator.clone(), validator.clone()))
            .map(|shares| DelegationInfo {
                delegator: delegator.clone(),
                validator: validator.clone(),
                shares: *shares,
            }))
    }

    fn total_bonded_tokens(&self) -> Result<u128, ProviderError> {
        Ok(self
            .validators
            .lock()
            .unwrap()
            .values()
            .filter(|v| v.bonded)
            .map(|v| v.bonded_tokens)
            .sum())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delegate_issues_shares_one_to_one() {
        let staking = NullStaking::new();
        let val = ValidatorAddress::new("agoravaloper1a");
        let alice = Address::new("agora1alice");
        staking.add_validator(&val, &Address::new("agora1a"), true);
        let shares = staking.delegate(&alice, &val, 500).unwrap();
        assert_eq!(shares, Dec::from_int(500));
        assert_eq!(staking.total_bonded_tokens().unwrap(), 500);
        assert_eq!(
            staking.delegation(&alice, &val).unwrap().unwrap().shares,
            Dec::from_int(500)
        );
    }

    #[test]
    fn test_slash_changes_exchange_rate() {
        let staking = NullStaking::new();
        let val = ValidatorAddress::new("agoravaloper1a");
        let alice = Address::new("agora1alice");
        let bob = Address::new("agora1bob");
        staking.add_validator(&val, &Address::new("agora1a"), true);
        staking.delegate(&alice, &val, 100).unwrap();
        staking.slash(&val, Dec::percent(50)).unwrap();
        // 50 tokens now back 100 shares, so 50 more tokens mint 100 shares
        assert_eq!(staking.delegate(&bob, &val, 50).unwrap(), Dec::from_int(100));
        let v = staking.validator(&val).unwrap().unwrap();
        assert_eq!(v.power_of(Dec::from_int(100)).unwrap(), Dec::from_int(50));
    }

    #[test]
    fn test_unbonded_validators_excluded() {
        let staking = NullStaking::new();
        let a = ValidatorAddress::new("agoravaloper1a");
        let b = ValidatorAddress::new("agoravaloper1b");
        let alice = Address::new("agora1alice");
        staking.add_validator(&a, &Address::new("agora1a"), true);
        staking.add_validator(&b, &Address::new("agora1b"), false);
        staking.delegate(&alice, &a, 10).unwrap();
        staking.delegate(&alice, &b, 90).unwrap();
        let bonded = staking.bonded_validators_by_power().unwrap();
        assert_eq!(bonded.len(), 1);
        assert_eq!(staking.total_bonded_tokens().unwrap(), 10);
        assert_eq!(staking.delegations(&alice).unwrap().len(), 2);
        assert_eq!(staking.tokens_from_consensus_power(3), 3_000_000);
    }

    #[test]
    fn test_undelegate_removes_empty_bond() {
        let staking = NullStaking::new();
        let val = ValidatorAddress::new("agoravaloper1a");
        let alice = Address::new("agora1alice");
        staking.add_validator(&val, &Address::new("agora1a"), true);
        staking.delegate(&alice, &val, 10).unwrap();
        staking.undelegate(&alice, &val, Dec::from_int(10)).unwrap();
        assert!(staking.delegation(&alice, &val).unwrap().is_none());
        assert_eq!(staking.total_bonded_tokens().unwrap(), 0);
    }

    #[test]
    fn test_unknown_validator_is_an_error() {
        let staking = NullStaking::new();
        let val = ValidatorAddress::new("agoravaloper1missing");
        let alice = Address::new("agora1alice");
        let err = staking.delegate(&alice, &val, 1).unwrap_err();
        assert!(matches!(err, ProviderError::UnknownValidator(_)));
        assert!(staking.slash(&val, Dec::percent(1)).is_err());
    }

    #[test]
    fn test_overdrawn_undelegate_leaves_bond_intact() {
        let staking = NullStaking::new();
        let val = ValidatorAddress::new("agoravaloper1a");
        let alice = Address::new("agora1alice");
        staking.add_validator(&val, &Address::new("agora1a"), true);
        staking.delegate(&alice, &val, 10).unwrap();
        assert!(staking.undelegate(&alice, &val, Dec::from_int(11)).is_err());
        assert_eq!(staking.total_bonded_tokens().unwrap(), 10);
    }

    #[test]
    fn test_delegate_beyond_u64_tokens() {
        let staking = NullStaking::new();
        let val = ValidatorAddress::new("agoravaloper1a");
        let alice = Address::new("agora1alice");
        staking.add_validator(&val, &Address::new("agora1a"), true);
        let tokens = 5_000_000_000_000_000_000_000u128;
        assert_eq!(staking.delegate(&alice, &val, tokens).unwrap(), Dec::from_u128(tokens));
        assert_eq!(staking.total_bonded_tokens().unwrap(), tokens);
        assert!(staking.delegate(&alice, &val, u128::MAX).is_err());
    }
}
