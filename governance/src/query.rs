//! Read-only queries over governance state.

use std::collections::BTreeMap;

use agora_providers::StakingProvider;
use agora_types::{Address, Coins, Dec, Timestamp, ValidatorAddress};

use crate::config::GovConfig;
use crate::engine::GovernanceEngine;
use crate::governor::{Governor, GovernorLedger};
use crate::kind::{classify, ProposalKinds};
use crate::params::Params;
use crate::participation::{EmaKind, ParticipationTracker};
use crate::proposal::{Deposit, Proposal, ProposalStatus, TallyResult, Vote};
use crate::state::GovState;
use crate::tally::TallyEngine;
use crate::throttler::DepositThrottler;
use crate::GovernanceError;

pub struct Querier<'a> {
    state: GovState<'a>,
    staking: &'a dyn StakingProvider,
    config: &'a GovConfig,
}

impl GovernanceEngine {
    pub fn querier(&self) -> Querier<'_> {
        Querier {
            state: self.state(),
            staking: self.staking.as_ref(),
            config: &self.config,
        }
    }
}

impl Querier<'_> {
    pub fn proposal(&self, id: u64) -> Result<Proposal, GovernanceError> {
        self.state.require_proposal(id)
    }

    /// Proposals in ascending id order, optionally only those in `status`.
    pub fn proposals(&self, status: Option<ProposalStatus>) -> Result<Vec<Proposal>, GovernanceError> {
        let mut all = self.state.proposals()?;
        if let Some(status) = status {
            all.retain(|p| p.status == status);
        }
        Ok(all)
    }

    pub fn proposal_kinds(&self, id: u64) -> Result<ProposalKinds, GovernanceError> {
        Ok(classify(&self.proposal(id)?.messages))
    }

    pub fn vote(&self, id: u64, voter: &Address) -> Result<Option<Vote>, GovernanceError> {
        self.state.vote(id, voter)
    }

    pub fn votes(&self, id: u64) -> Result<Vec<Vote>, GovernanceError> {
        self.state.votes(id)
    }

    pub fn deposit(&self, id: u64, depositor: &Address) -> Result<Option<Deposit>, GovernanceError> {
        self.state.deposit(id, depositor)
    }

    pub fn deposits(&self, id: u64) -> Result<Vec<Deposit>, GovernanceError> {
        self.state.deposits(id)
    }

    /// The final result of a closed proposal, the running count of one in
    /// its voting period, and zero before voting starts.
    pub fn tally(&self, id: u64) -> Result<TallyResult, GovernanceError> {
        let proposal = self.proposal(id)?;
        match proposal.status {
            ProposalStatus::DepositPeriod => Ok(TallyResult::default()),
            ProposalStatus::VotingPeriod => {
                let params = self.state.params()?;
                Ok(TallyEngine::new(self.state, self.staking, self.config)
                    .preview(&params, &proposal)?
                    .result)
            }
            _ => Ok(proposal.final_tally_result),
        }
    }

    pub fn params(&self) -> Result<Params, GovernanceError> {
        self.state.params()
    }

    pub fn constitution(&self) -> Result<String, GovernanceError> {
        self.state.constitution()
    }

    /// Deposit needed to enter the voting period at `now`.
    pub fn min_deposit(&self, now: Timestamp) -> Result<Coins, GovernanceError> {
        DepositThrottler::deposit().current(&self.state, &self.state.params()?, now)
    }

    /// Deposit needed at submission at `now`.
    pub fn min_initial_deposit(&self, now: Timestamp) -> Result<Coins, GovernanceError> {
        DepositThrottler::initial_deposit().current(&self.state, &self.state.params()?, now)
    }

    pub fn quorum(&self, kind: EmaKind) -> Result<Dec, GovernanceError> {
        ParticipationTracker::new(self.state).quorum(&self.state.params()?, kind)
    }

    pub fn participation_ema(&self, kind: EmaKind) -> Result<Dec, GovernanceError> {
        ParticipationTracker::new(self.state).ema(kind)
    }

    pub fn governor(&self, address: &Address) -> Result<Option<Governor>, GovernanceError> {
        self.state.governor(address)
    }

    pub fn governors(&self) -> Result<Vec<Governor>, GovernanceError> {
        self.state.governors()
    }

    pub fn governance_delegation(&self, delegator: &Address) -> Result<Option<Address>, GovernanceError> {
        self.state.governance_delegation(delegator)
    }

    /// Delegators currently assigned to `governor`.
    pub fn governance_delegations(&self, governor: &Address) -> Result<Vec<Address>, GovernanceError> {
        self.state.delegators_of(governor)
    }

    pub fn governor_val_shares(
        &self,
        governor: &Address,
    ) -> Result<BTreeMap<ValidatorAddress, Dec>, GovernanceError> {
        Ok(self.state.governor_val_shares_of(governor)?.into_iter().collect())
    }

    pub fn governor_voting_power(&self, governor: &Address) -> Result<Dec, GovernanceError> {
        GovernorLedger::new(self.state, self.staking).voting_power(governor)
    }
}
