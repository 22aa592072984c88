//! Consistency checks over the whole module state.
//!
//! Each check returns `Ok(())` when it holds and a fatal
//! `GovernanceError::Invariant` describing the first violation otherwise.

use agora_types::Coins;

use crate::engine::GovernanceEngine;
use crate::governor::GovernorLedger;
use crate::GovernanceError;

impl GovernanceEngine {
    /// The module account holds exactly the sum of all live deposits.
    pub fn module_account_invariant(&self) -> Result<(), GovernanceError> {
        let mut expected = Coins::empty();
        for deposit in self.state().all_deposits()? {
            expected = expected
                .checked_add(&deposit.amount)
                .ok_or_else(|| GovernanceError::Invariant("deposit sum overflow".into()))?;
        }
        let balance = self.bank.all_balances(&self.module_address)?;
        if balance != expected {
            return Err(GovernanceError::Invariant(format!(
                "module account holds {balance}, deposits sum to {expected}"
            )));
        }
        Ok(())
    }

    /// Every governor's per-validator share totals match the staking
    /// delegations of its delegators.
    pub fn governor_val_shares_invariant(&self) -> Result<(), GovernanceError> {
        let state = self.state();
        let ledger = GovernorLedger::new(state, self.staking.as_ref());
        for governor in state.governors()? {
            let expected = ledger.expected_val_shares(&governor.address)?;
            let mut stored: Vec<_> = state.governor_val_shares_of(&governor.address)?;
            stored.retain(|(_, shares)| !shares.is_zero());
            let matches = stored.len() == expected.len()
                && stored
                    .iter()
                    .all(|(validator, shares)| expected.get(validator) == Some(shares));
            if !matches {
                return Err(GovernanceError::Invariant(format!(
                    "governor {} val shares diverge from staking delegations",
                    governor.address
                )));
            }
        }
        Ok(())
    }

    pub fn assert_invariants(&self) -> Result<(), GovernanceError> {
        self.module_account_invariant()?;
        self.governor_val_shares_invariant()
    }
}
