//! The governance engine: owns the module's state handle and collaborators.
//!
//! Transaction handling lives in `msg_server`, per-block processing in
//! `scheduler`, read access in `query` and chain import/export in
//! `genesis`; all of them are `impl GovernanceEngine` blocks.

use std::sync::Arc;

use agora_providers::{AccountProvider, BankProvider, StakingHooks, StakingProvider};
use agora_store::{CacheStore, KvStore};
use agora_types::{Address, Coins, Timestamp, ValidatorAddress};
use tracing::debug;

use crate::config::GovConfig;
use crate::governor::GovernorLedger;
use crate::hooks::{GovEvent, GovHooks, NoopHooks};
use crate::proposal::ProposalStatus;
use crate::queue::QueueManager;
use crate::router::Router;
use crate::state::GovState;
use crate::GovernanceError;

/// Name of the governance module account.
pub const MODULE_NAME: &str = "gov";

pub struct GovernanceEngine {
    pub(crate) store: Arc<dyn KvStore>,
    pub(crate) staking: Arc<dyn StakingProvider>,
    pub(crate) bank: Arc<dyn BankProvider>,
    pub(crate) router: Router,
    pub(crate) hooks: Box<dyn GovHooks>,
    pub(crate) config: GovConfig,
    pub(crate) module_address: Address,
    pending_events: Vec<GovEvent>,
}

impl GovernanceEngine {
    /// Build an engine over `store`, with the governance handlers
    /// registered and no-op hooks.
    pub fn new(
        store: Arc<dyn KvStore>,
        staking: Arc<dyn StakingProvider>,
        bank: Arc<dyn BankProvider>,
        accounts: &dyn AccountProvider,
        config: GovConfig,
    ) -> Self {
        let module_address = accounts.module_address(MODULE_NAME);
        Self {
            store,
            staking,
            bank,
            router: Router::with_gov_handlers(module_address.clone()),
            hooks: Box::new(NoopHooks),
            config,
            module_address,
            pending_events: Vec::new(),
        }
    }

    pub fn config(&self) -> &GovConfig {
        &self.config
    }

    /// The module account holding all deposits.
    pub fn module_address(&self) -> &Address {
        &self.module_address
    }

    /// Register handlers of other modules here.
    pub fn router_mut(&mut self) -> &mut Router {
        &mut self.router
    }

    pub fn set_hooks(&mut self, hooks: Box<dyn GovHooks>) {
        self.hooks = hooks;
    }

    /// Drain pending events for the node to process.
    pub fn drain_events(&mut self) -> Vec<GovEvent> {
        std::mem::take(&mut self.pending_events)
    }

    pub(crate) fn emit(&mut self, event: GovEvent) {
        self.pending_events.push(event);
    }

    pub(crate) fn state(&self) -> GovState<'_> {
        GovState::new(self.store.as_ref())
    }

    /// Run `f` against a staged overlay of the store. Writes are committed
    /// only when `f` succeeds; on error they are dropped together with the
    /// events `f` emitted.
    pub(crate) fn staged<T>(
        &mut self,
        f: impl FnOnce(&mut Self, GovState<'_>) -> Result<T, GovernanceError>,
    ) -> Result<T, GovernanceError> {
        let store = Arc::clone(&self.store);
        let cache = CacheStore::new(store.as_ref());
        let emitted = self.pending_events.len();
        match f(self, GovState::new(&cache)) {
            Ok(value) => {
                cache.commit()?;
                Ok(value)
            }
            Err(e) => {
                self.pending_events.truncate(emitted);
                Err(e)
            }
        }
    }

    /// Remove a proposal from its queue, drop its votes and delete it.
    /// Deposits are left to the caller. Deleting a missing proposal is an
    /// invariant violation.
    pub fn delete_proposal(&self, id: u64, now: Timestamp) -> Result<(), GovernanceError> {
        let state = self.state();
        let proposal = state.proposal(id)?.ok_or_else(|| {
            GovernanceError::Invariant(format!("cannot delete missing proposal {id}"))
        })?;
        let params = state.params()?;
        let queues = QueueManager::new(state);
        match proposal.status {
            ProposalStatus::DepositPeriod => queues.leave_deposit_period(&params, &proposal, now)?,
            ProposalStatus::VotingPeriod => queues.leave_voting_period(&params, &proposal, now)?,
            _ => {}
        }
        for vote in state.votes(id)? {
            state.remove_vote(id, &vote.voter)?;
        }
        state.remove_proposal(id)?;
        debug!(proposal_id = id, "proposal deleted");
        Ok(())
    }

    /// Return every deposit on `id` to its depositor and delete the records.
    pub(crate) fn refund_and_delete_deposits(&self, id: u64) -> Result<(), GovernanceError> {
        let state = self.state();
        for deposit in state.deposits(id)? {
            self.bank
                .send_coins(&self.module_address, &deposit.depositor, &deposit.amount)?;
            state.remove_deposit(id, &deposit.depositor)?;
        }
        Ok(())
    }

    /// Burn every deposit on `id` and delete the records.
    pub(crate) fn delete_and_burn_deposits(&self, id: u64) -> Result<(), GovernanceError> {
        let state = self.state();
        let mut total = Coins::empty();
        for deposit in state.deposits(id)? {
            total = total
                .checked_add(&deposit.amount)
                .ok_or_else(|| GovernanceError::Invariant("deposit sum overflow".into()))?;
            state.remove_deposit(id, &deposit.depositor)?;
        }
        if !total.is_empty() {
            self.bank.burn_coins(&self.module_address, &total)?;
        }
        Ok(())
    }
}

impl StakingHooks for GovernanceEngine {
    type Error = GovernanceError;

    fn before_delegation_shares_modified(
        &mut self,
        delegator: &Address,
        validator: &ValidatorAddress,
        _now: Timestamp,
    ) -> Result<(), GovernanceError> {
        GovernorLedger::new(self.state(), self.staking.as_ref())
            .before_delegation_shares_modified(delegator, validator)
    }

    fn after_delegation_modified(
        &mut self,
        delegator: &Address,
        validator: &ValidatorAddress,
        now: Timestamp,
    ) -> Result<(), GovernanceError> {
        let state = self.state();
        let params = state.params()?;
        GovernorLedger::new(state, self.staking.as_ref())
            .after_delegation_modified(delegator, validator, &params, now)
    }
}
