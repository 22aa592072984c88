//! Proposal, deposit and vote records.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use agora_types::{Address, Coins, Dec, Timestamp};

use crate::msgs::AnyMsg;
use crate::GovernanceError;

/// Lifecycle status of a proposal.
///
/// `DepositPeriod -> VotingPeriod -> {Passed, Rejected, Failed}`; a
/// proposal that never reaches the min deposit is deleted instead.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ProposalStatus {
    DepositPeriod,
    VotingPeriod,
    Passed,
    Rejected,
    /// Passed the vote but its messages failed to execute.
    Failed,
}

impl ProposalStatus {
    pub fn is_final(&self) -> bool {
        matches!(self, Self::Passed | Self::Rejected | Self::Failed)
    }
}

impl fmt::Display for ProposalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::DepositPeriod => "deposit_period",
            Self::VotingPeriod => "voting_period",
            Self::Passed => "passed",
            Self::Rejected => "rejected",
            Self::Failed => "failed",
        };
        write!(f, "{}", s)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum VoteOption {
    Yes,
    Abstain,
    No,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightedVoteOption {
    pub option: VoteOption,
    pub weight: Dec,
}

impl WeightedVoteOption {
    pub fn new(option: VoteOption, weight: Dec) -> Self {
        Self { option, weight }
    }
}

/// A single option with full weight.
pub fn single_vote(option: VoteOption) -> Vec<WeightedVoteOption> {
    vec![WeightedVoteOption::new(option, Dec::ONE)]
}

/// Weights must each lie in (0, 1], cover distinct options and sum to one.
pub fn validate_weighted_options(options: &[WeightedVoteOption]) -> Result<(), GovernanceError> {
    if options.is_empty() {
        return Err(GovernanceError::InvalidVote("no vote options".into()));
    }
    let mut seen = BTreeSet::new();
    let mut total = Dec::ZERO;
    for o in options {
        if !seen.insert(o.option) {
            return Err(GovernanceError::InvalidVote(format!(
                "duplicate option {:?}",
                o.option
            )));
        }
        if o.weight.is_zero() || o.weight > Dec::ONE {
            return Err(GovernanceError::InvalidVote(format!(
                "weight {} out of range",
                o.weight
            )));
        }
        total = total.saturating_add(o.weight);
    }
    if total != Dec::ONE {
        return Err(GovernanceError::InvalidVote(format!(
            "weights sum to {total}, expected 1"
        )));
    }
    Ok(())
}

/// Voting power per option.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TallyResult {
    pub yes_count: Dec,
    pub abstain_count: Dec,
    pub no_count: Dec,
}

impl TallyResult {
    pub fn add(&mut self, option: VoteOption, power: Dec) {
        let slot = match option {
            VoteOption::Yes => &mut self.yes_count,
            VoteOption::Abstain => &mut self.abstain_count,
            VoteOption::No => &mut self.no_count,
        };
        *slot = slot.saturating_add(power);
    }

    pub fn total(&self) -> Dec {
        self.yes_count
            .saturating_add(self.abstain_count)
            .saturating_add(self.no_count)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal {
    pub id: u64,
    pub messages: Vec<AnyMsg>,
    pub status: ProposalStatus,
    pub final_tally_result: TallyResult,
    pub submit_time: Timestamp,
    pub deposit_end_time: Timestamp,
    pub total_deposit: Coins,
    pub voting_start_time: Option<Timestamp>,
    pub voting_end_time: Option<Timestamp>,
    pub metadata: String,
    pub title: String,
    pub summary: String,
    pub proposer: Address,
    /// Why execution failed, empty otherwise.
    pub failed_reason: String,
}

/// A deposit, accumulated per (proposal, depositor).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deposit {
    pub proposal_id: u64,
    pub depositor: Address,
    pub amount: Coins,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    pub proposal_id: u64,
    pub voter: Address,
    pub options: Vec<WeightedVoteOption>,
    pub metadata: String,
}

/// Pending quorum check for a proposal in its voting period.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuorumCheckQueueEntry {
    /// `voting_start + quorum_timeout`.
    pub quorum_timeout_time: Timestamp,
    pub quorum_check_count: u64,
    pub quorum_checks_done: u64,
}

/// Anchor of a deposit throttler.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastMinDeposit {
    pub value: Coins,
    pub time: Timestamp,
}
