//! Chain import and export.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::info;

use agora_types::{Address, Coins, Dec, Timestamp};

use crate::engine::GovernanceEngine;
use crate::governor::{Governor, GovernorLedger};
use crate::params::Params;
use crate::participation::{EmaKind, ParticipationTracker, INITIAL_PARTICIPATION_EMA};
use crate::proposal::{Deposit, LastMinDeposit, Proposal, ProposalStatus, QuorumCheckQueueEntry, Vote};
use crate::queue::voting_window;
use crate::state::Queue;
use crate::GovernanceError;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GovernanceDelegation {
    pub delegator: Address,
    pub governor: Address,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisState {
    pub starting_proposal_id: u64,
    pub params: Params,
    pub proposals: Vec<Proposal>,
    pub deposits: Vec<Deposit>,
    pub votes: Vec<Vote>,
    pub constitution: String,
    pub last_min_deposit: Option<LastMinDeposit>,
    pub last_min_initial_deposit: Option<LastMinDeposit>,
    pub participation_ema: Dec,
    pub law_participation_ema: Dec,
    pub constitution_amendment_participation_ema: Dec,
    pub governors: Vec<Governor>,
    pub governance_delegations: Vec<GovernanceDelegation>,
}

impl Default for GenesisState {
    fn default() -> Self {
        Self {
            starting_proposal_id: 1,
            params: Params::default(),
            proposals: Vec::new(),
            deposits: Vec::new(),
            votes: Vec::new(),
            constitution: String::new(),
            last_min_deposit: None,
            last_min_initial_deposit: None,
            participation_ema: INITIAL_PARTICIPATION_EMA,
            law_participation_ema: INITIAL_PARTICIPATION_EMA,
            constitution_amendment_participation_ema: INITIAL_PARTICIPATION_EMA,
            governors: Vec::new(),
            governance_delegations: Vec::new(),
        }
    }
}

fn invalid(reason: impl Into<String>) -> GovernanceError {
    GovernanceError::InvalidGenesis(reason.into())
}

impl GenesisState {
    pub fn validate(&self) -> Result<(), GovernanceError> {
        if self.starting_proposal_id == 0 {
            return Err(invalid("starting proposal id must be positive"));
        }
        self.params
            .validate()
            .map_err(|e| invalid(format!("params: {e}")))?;

        let mut ids = BTreeSet::new();
        for p in &self.proposals {
            if !ids.insert(p.id) {
                return Err(invalid(format!("duplicate proposal {}", p.id)));
            }
            if p.id >= self.starting_proposal_id {
                return Err(invalid(format!(
                    "proposal {} is not below the starting id {}",
                    p.id, self.starting_proposal_id
                )));
            }
            if p.status == ProposalStatus::VotingPeriod {
                voting_window(p).map_err(|e| invalid(e.to_string()))?;
            }
        }

        let mut deposit_keys = BTreeSet::new();
        for d in &self.deposits {
            if !ids.contains(&d.proposal_id) {
                return Err(invalid(format!("deposit on unknown proposal {}", d.proposal_id)));
            }
            if !deposit_keys.insert((d.proposal_id, d.depositor.clone())) {
                return Err(invalid(format!(
                    "duplicate deposit by {} on proposal {}",
                    d.depositor, d.proposal_id
                )));
            }
            if d.amount.is_empty() || !d.amount.is_valid() {
                return Err(invalid(format!("invalid deposit amount {}", d.amount)));
            }
        }

        let mut vote_keys = BTreeSet::new();
        for v in &self.votes {
            if !ids.contains(&v.proposal_id) {
                return Err(invalid(format!("vote on unknown proposal {}", v.proposal_id)));
            }
            if !vote_keys.insert((v.proposal_id, v.voter.clone())) {
                return Err(invalid(format!(
                    "duplicate vote by {} on proposal {}",
                    v.voter, v.proposal_id
                )));
            }
        }

        for (name, ema) in [
            ("participation", self.participation_ema),
            ("law participation", self.law_participation_ema),
            ("constitution amendment participation", self.constitution_amendment_participation_ema),
        ] {
            if ema > Dec::ONE {
                return Err(invalid(format!("{name} EMA {ema} above one")));
            }
        }

        let mut governors = BTreeSet::new();
        for g in &self.governors {
            if !governors.insert(g.address.clone()) {
                return Err(invalid(format!("duplicate governor {}", g.address)));
            }
            g.description
                .validate()
                .map_err(|e| invalid(format!("governor {}: {e}", g.address)))?;
        }
        let mut delegators = BTreeSet::new();
        for d in &self.governance_delegations {
            if !governors.contains(&d.governor) {
                return Err(invalid(format!(
                    "{} delegates to unknown governor {}",
                    d.delegator, d.governor
                )));
            }
            if !delegators.insert(d.delegator.clone()) {
                return Err(invalid(format!("duplicate governance delegation of {}", d.delegator)));
            }
        }
        Ok(())
    }

    /// Sum of all deposits.
    pub fn total_deposits(&self) -> Result<Coins, GovernanceError> {
        self.deposits.iter().try_fold(Coins::empty(), |acc, d| {
            acc.checked_add(&d.amount)
                .ok_or_else(|| invalid("deposit sum overflow"))
        })
    }
}

impl GovernanceEngine {
    /// Load `genesis`, rebuilding queues, counters, quorum checks and
    /// governor share totals. A module balance that does not match the
    /// deposits is fatal.
    pub fn init_genesis(&mut self, genesis: &GenesisState, now: Timestamp) -> Result<(), GovernanceError> {
        genesis.validate()?;
        let total = genesis.total_deposits()?;
        let balance = self.bank.all_balances(&self.module_address)?;
        if balance != total {
            return Err(GovernanceError::Invariant(format!(
                "gov module balance {balance} does not match deposits {total}"
            )));
        }

        let state = self.state();
        state.set_next_proposal_id(genesis.starting_proposal_id)?;
        state.set_params(&genesis.params)?;
        state.set_constitution(&genesis.constitution)?;
        state.set_ema(EmaKind::General, genesis.participation_ema)?;
        state.set_ema(EmaKind::Law, genesis.law_participation_ema)?;
        state.set_ema(EmaKind::ConstitutionAmendment, genesis.constitution_amendment_participation_ema)?;
        if let Some(last) = &genesis.last_min_deposit {
            state.set_last_min_deposit(last)?;
        }
        if let Some(last) = &genesis.last_min_initial_deposit {
            state.set_last_min_initial_deposit(last)?;
        }

        for d in &genesis.deposits {
            state.set_deposit(d)?;
        }
        for v in &genesis.votes {
            state.set_vote(v)?;
        }

        let (mut inactive, mut active) = (0u64, 0u64);
        for p in &genesis.proposals {
            match p.status {
                ProposalStatus::DepositPeriod => {
                    state.insert_queue(Queue::Inactive, p.deposit_end_time, p.id)?;
                    inactive += 1;
                }
                ProposalStatus::VotingPeriod => {
                    let (start, end) = voting_window(p)?;
                    state.insert_queue(Queue::Active, end, p.id)?;
                    active += 1;
                    if genesis.params.quorum_check_enabled() {
                        let timeout = start.plus_secs(genesis.params.quorum_timeout_secs);
                        state.insert_quorum_check(
                            timeout,
                            p.id,
                            &QuorumCheckQueueEntry {
                                quorum_timeout_time: timeout,
                                quorum_check_count: genesis.params.quorum_check_count,
                                quorum_checks_done: 0,
                            },
                        )?;
                    }
                }
                _ => {}
            }
            state.set_proposal(p)?;
        }
        state.set_inactive_count(inactive)?;
        state.set_active_count(active)?;

        for g in &genesis.governors {
            state.set_governor(g)?;
        }
        let ledger = GovernorLedger::new(state, self.staking.as_ref());
        for d in &genesis.governance_delegations {
            ledger.delegate(&d.delegator, &d.governor)?;
        }

        info!(
            proposals = genesis.proposals.len(),
            governors = genesis.governors.len(),
            time = now.as_secs(),
            "governance genesis loaded"
        );
        Ok(())
    }

    pub fn export_genesis(&self) -> Result<GenesisState, GovernanceError> {
        let state = self.state();
        let participation = ParticipationTracker::new(state);
        Ok(GenesisState {
            starting_proposal_id: state
                .next_proposal_id()?
                .ok_or_else(|| GovernanceError::Invariant("starting proposal id not set".into()))?,
            params: state.params()?,
            proposals: state.proposals()?,
            deposits: state.all_deposits()?,
            votes: state.all_votes()?,
            constitution: state.constitution()?,
            last_min_deposit: state.last_min_deposit()?,
            last_min_initial_deposit: state.last_min_initial_deposit()?,
            participation_ema: participation.ema(EmaKind::General)?,
            law_participation_ema: participation.ema(EmaKind::Law)?,
            constitution_amendment_participation_ema: participation.ema(EmaKind::ConstitutionAmendment)?,
            governors: state.governors()?,
            governance_delegations: state
                .governance_delegations()?
                .into_iter()
                .map(|(delegator, governor)| GovernanceDelegation { delegator, governor })
                .collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::governor::{GovernorDescription, GovernorStatus};
    use crate::proposal::TallyResult;

    fn proposal(id: u64, status: ProposalStatus) -> Proposal {
        Proposal {
            id,
            messages: vec![],
            status,
            final_tally_result: TallyResult::default(),
            submit_time: Timestamp::new(0),
            deposit_end_time: Timestamp::new(100),
            total_deposit: Coins::empty(),
            voting_start_time: None,
            voting_end_time: None,
            metadata: String::new(),
            title: "t".into(),
            summary: "s".into(),
            proposer: Address::new("agora1alice"),
            failed_reason: String::new(),
        }
    }

    #[test]
    fn test_default_is_valid() {
        GenesisState::default().validate().unwrap();
    }

    #[test]
    fn test_proposal_ids_below_starting_id() {
        let mut g = GenesisState::default();
        g.proposals.push(proposal(1, ProposalStatus::DepositPeriod));
        assert!(g.validate().is_err());
        g.starting_proposal_id = 2;
        g.validate().unwrap();
    }

    #[test]
    fn test_voting_proposal_needs_window() {
        let mut g = GenesisState {
            starting_proposal_id: 5,
            ..Default::default()
        };
        g.proposals.push(proposal(1, ProposalStatus::VotingPeriod));
        assert!(g.validate().is_err());
    }

    #[test]
    fn test_orphan_deposit_rejected() {
        let mut g = GenesisState::default();
        g.deposits.push(Deposit {
            proposal_id: 9,
            depositor: Address::new("agora1alice"),
            amount: Coins::single("stake", 1),
        });
        assert!(matches!(g.validate(), Err(GovernanceError::InvalidGenesis(_))));
    }

    #[test]
    fn test_delegation_to_unknown_governor_rejected() {
        let mut g = GenesisState::default();
        g.governance_delegations.push(GovernanceDelegation {
            delegator: Address::new("agora1alice"),
            governor: Address::new("agora1gov"),
        });
        assert!(g.validate().is_err());
        g.governors.push(Governor {
            address: Address::new("agora1gov"),
            description: GovernorDescription {
                moniker: "gov".into(),
                ..Default::default()
            },
            status: GovernorStatus::Active,
            last_status_change_time: None,
        });
        g.validate().unwrap();
    }

    #[test]
    fn test_ema_above_one_rejected() {
        let g = GenesisState {
            law_participation_ema: Dec::from_int(2),
            ..Default::default()
        };
        assert!(g.validate().is_err());
    }
}
