//! Hooks other modules register on proposal lifecycle points, and the
//! events governance emits for the node to process.

use serde::{Deserialize, Serialize};

use agora_types::{Address, Coins, Timestamp};

use crate::governor::GovernorStatus;
use crate::proposal::{ProposalStatus, WeightedVoteOption};
use crate::GovernanceError;

/// Lifecycle callbacks. Every method defaults to a no-op.
pub trait GovHooks {
    fn after_proposal_submission(&mut self, _proposal_id: u64) -> Result<(), GovernanceError> {
        Ok(())
    }

    fn after_proposal_deposit(
        &mut self,
        _proposal_id: u64,
        _depositor: &Address,
    ) -> Result<(), GovernanceError> {
        Ok(())
    }

    fn after_proposal_vote(&mut self, _proposal_id: u64, _voter: &Address) -> Result<(), GovernanceError> {
        Ok(())
    }

    /// The proposal was dropped at the end of its deposit period.
    fn after_proposal_failed_min_deposit(&mut self, _proposal_id: u64) -> Result<(), GovernanceError> {
        Ok(())
    }

    fn after_proposal_voting_period_ended(&mut self, _proposal_id: u64) -> Result<(), GovernanceError> {
        Ok(())
    }
}

pub struct NoopHooks;

impl GovHooks for NoopHooks {}

/// Events emitted by the engine, drained by the caller after each message
/// or block.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GovEvent {
    ProposalSubmitted {
        proposal_id: u64,
        proposer: Address,
    },
    ProposalDeposit {
        proposal_id: u64,
        depositor: Address,
        amount: Coins,
    },
    /// The deposit reached the min deposit and voting started.
    VotingPeriodStarted {
        proposal_id: u64,
        voting_end_time: Timestamp,
    },
    ProposalVote {
        proposal_id: u64,
        voter: Address,
        options: Vec<WeightedVoteOption>,
    },
    /// Deposit period ended without reaching the min deposit.
    ProposalDropped {
        proposal_id: u64,
        deposits_burned: bool,
    },
    QuorumCheck {
        proposal_id: u64,
        reached: bool,
        checks_done: u64,
    },
    VotingPeriodExtended {
        proposal_id: u64,
        voting_end_time: Timestamp,
    },
    ProposalFinalized {
        proposal_id: u64,
        status: ProposalStatus,
        deposits_burned: bool,
        failed_reason: Option<String>,
    },
    GovernorCreated {
        governor: Address,
    },
    GovernorEdited {
        governor: Address,
    },
    GovernorStatusChanged {
        governor: Address,
        status: GovernorStatus,
    },
    GovernanceDelegated {
        delegator: Address,
        governor: Address,
    },
    GovernanceUndelegated {
        delegator: Address,
        governor: Address,
    },
}

impl GovEvent {
    /// The proposal the event concerns, if any.
    pub fn proposal_id(&self) -> Option<u64> {
        match self {
            Self::ProposalSubmitted { proposal_id, .. }
            | Self::ProposalDeposit { proposal_id, .. }
            | Self::VotingPeriodStarted { proposal_id, .. }
            | Self::ProposalVote { proposal_id, .. }
            | Self::ProposalDropped { proposal_id, .. }
            | Self::QuorumCheck { proposal_id, .. }
            | Self::VotingPeriodExtended { proposal_id, .. }
            | Self::ProposalFinalized { proposal_id, .. } => Some(*proposal_id),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Counting {
        submitted: Vec<u64>,
    }

    impl GovHooks for Counting {
        fn after_proposal_submission(&mut self, proposal_id: u64) -> Result<(), GovernanceError> {
            self.submitted.push(proposal_id);
            Ok(())
        }
    }

    #[test]
    fn test_default_methods_are_noops() {
        let mut hooks = Counting::default();
        hooks.after_proposal_submission(7).unwrap();
        hooks.after_proposal_vote(7, &Address::new("agora1x")).unwrap();
        hooks.after_proposal_voting_period_ended(7).unwrap();
        assert_eq!(hooks.submitted, vec![7]);
    }

    #[test]
    fn test_event_proposal_id() {
        let e = GovEvent::ProposalDropped {
            proposal_id: 3,
            deposits_burned: false,
        };
        assert_eq!(e.proposal_id(), Some(3));
        let e = GovEvent::GovernorCreated {
            governor: Address::new("agora1g"),
        };
        assert_eq!(e.proposal_id(), None);
    }

    #[test]
    fn test_events_serialize_for_the_node() {
        let e = GovEvent::VotingPeriodExtended {
            proposal_id: 4,
            voting_end_time: Timestamp::new(1_000),
        };
        let json = serde_json::to_string(&e).unwrap();
        assert!(json.contains("VotingPeriodExtended"));
        assert_eq!(serde_json::from_str::<GovEvent>(&json).unwrap(), e);
    }
}
