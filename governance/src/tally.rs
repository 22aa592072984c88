//! Vote tallying.
//!
//! Voting power is stake: a voter's power is the sum over its delegations
//! to bonded validators of `shares * bonded_tokens / delegator_shares`,
//! split across its weighted options. Active governors that voted add the
//! power of their delegators who did not vote themselves. A delegator who
//! voted directly is recorded while the votes are walked and its shares
//! are deducted from its governor's totals before the governor is counted.
//!
//! With validator inheritance switched on, a validator whose operator
//! account voted also votes every remaining share of its delegators that
//! no direct vote or voting governor already covers.

use std::collections::BTreeMap;
use tracing::trace;

use agora_providers::{StakingProvider, ValidatorInfo};
use agora_types::{Address, Dec, ValidatorAddress};

use crate::config::GovConfig;
use crate::kind::classify;
use crate::params::Params;
use crate::participation::ParticipationTracker;
use crate::proposal::{Proposal, TallyResult, WeightedVoteOption};
use crate::state::GovState;
use crate::GovernanceError;

/// Result of tallying one proposal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TallyOutcome {
    pub passes: bool,
    pub burn_deposits: bool,
    /// Voting power over total bonded tokens, at most one.
    pub participation: Dec,
    pub result: TallyResult,
}

/// Power totals before the outcome rules are applied.
struct Aggregate {
    result: TallyResult,
    total_power: Dec,
    total_bonded: u128,
}

struct GovernorTally {
    val_shares: Vec<(ValidatorAddress, Dec)>,
    /// Shares of delegators who voted themselves, per validator.
    deductions: BTreeMap<ValidatorAddress, Dec>,
    vote: Option<Vec<WeightedVoteOption>>,
}

pub struct TallyEngine<'a> {
    state: GovState<'a>,
    staking: &'a dyn StakingProvider,
    validator_inheritance: bool,
}

impl<'a> TallyEngine<'a> {
    pub fn new(state: GovState<'a>, staking: &'a dyn StakingProvider, config: &GovConfig) -> Self {
        Self {
            state,
            staking,
            validator_inheritance: config.validator_inheritance,
        }
    }

    /// Final tally. Votes are deleted once counted.
    pub fn tally(&self, params: &Params, proposal: &Proposal) -> Result<TallyOutcome, GovernanceError> {
        let agg = self.aggregate(proposal, true)?;
        self.decide(params, proposal, agg)
    }

    /// Read-only tally of the votes cast so far.
    pub fn preview(&self, params: &Params, proposal: &Proposal) -> Result<TallyOutcome, GovernanceError> {
        let agg = self.aggregate(proposal, false)?;
        self.decide(params, proposal, agg)
    }

    /// Whether the votes cast so far meet the proposal's quorum.
    pub fn has_reached_quorum(&self, params: &Params, proposal: &Proposal) -> Result<bool, GovernanceError> {
        let agg = self.aggregate(proposal, false)?;
        let Some(participation) = participation(&agg)? else {
            return Ok(false);
        };
        let (quorum, _) = ParticipationTracker::new(self.state)
            .quorum_and_threshold(params, classify(&proposal.messages))?;
        Ok(participation >= quorum)
    }

    fn decide(&self, params: &Params, proposal: &Proposal, agg: Aggregate) -> Result<TallyOutcome, GovernanceError> {
        let fail = |burn: bool, participation: Dec, result: TallyResult| TallyOutcome {
            passes: false,
            burn_deposits: burn,
            participation,
            result,
        };

        let Some(participation) = participation(&agg)? else {
            return Ok(fail(false, Dec::ZERO, agg.result));
        };
        let kinds = classify(&proposal.messages);
        let (quorum, threshold) =
            ParticipationTracker::new(self.state).quorum_and_threshold(params, kinds)?;
        trace!(
            proposal_id = proposal.id,
            %kinds,
            %participation,
            %quorum,
            %threshold,
            "tally inputs"
        );

        if participation < quorum {
            return Ok(fail(params.burn_vote_quorum, participation, agg.result));
        }
        let non_abstain = agg.total_power.saturating_sub(agg.result.abstain_count);
        if non_abstain.is_zero() {
            return Ok(fail(false, participation, agg.result));
        }
        let yes_ratio = agg
            .result
            .yes_count
            .checked_quo(non_abstain)
            .ok_or_else(|| GovernanceError::Invariant("yes ratio overflow".into()))?;
        if yes_ratio > threshold {
            return Ok(TallyOutcome {
                passes: true,
                burn_deposits: false,
                participation,
                result: agg.result,
            });
        }
        Ok(fail(false, participation, agg.result))
    }

    fn aggregate(&self, proposal: &Proposal, finalize: bool) -> Result<Aggregate, GovernanceError> {
        let validators: BTreeMap<ValidatorAddress, ValidatorInfo> = self
            .staking
            .bonded_validators_by_power()?
            .into_iter()
            .map(|v| (v.operator.clone(), v))
            .collect();
        let operators: BTreeMap<Address, ValidatorAddress> = validators
            .values()
            .map(|v| (v.account.clone(), v.operator.clone()))
            .collect();

        let mut governors: BTreeMap<Address, GovernorTally> = BTreeMap::new();
        for g in self.state.governors()? {
            if g.is_active() {
                let val_shares = self.state.governor_val_shares_of(&g.address)?;
                governors.insert(
                    g.address,
                    GovernorTally {
                        val_shares,
                        deductions: BTreeMap::new(),
                        vote: None,
                    },
                );
            }
        }

        let mut result = TallyResult::default();
        let mut total_power = Dec::ZERO;
        let mut voted_shares: BTreeMap<ValidatorAddress, Dec> = BTreeMap::new();
        let mut validator_votes: BTreeMap<ValidatorAddress, Vec<WeightedVoteOption>> = BTreeMap::new();

        for vote in self.state.votes(proposal.id)? {
            if let Some(g) = governors.get_mut(&vote.voter) {
                g.vote = Some(vote.options.clone());
            }
            if self.validator_inheritance {
                if let Some(op) = operators.get(&vote.voter) {
                    validator_votes.insert(op.clone(), vote.options.clone());
                }
            }

            let governor = self.state.governance_delegation(&vote.voter)?;
            for d in self.staking.delegations(&vote.voter)? {
                let Some(v) = validators.get(&d.validator) else {
                    continue;
                };
                if let Some(g) = governor.as_ref().and_then(|g| governors.get_mut(g)) {
                    add_to(&mut g.deductions, &d.validator, d.shares);
                }
                add_to(&mut voted_shares, &d.validator, d.shares);
                let power = power_of(v, d.shares)?;
                distribute(&mut result, &vote.options, power)?;
                total_power = total_power.saturating_add(power);
            }

            if finalize {
                self.state.remove_vote(proposal.id, &vote.voter)?;
            }
        }

        let mut governed_shares: BTreeMap<ValidatorAddress, Dec> = BTreeMap::new();
        for (address, g) in &governors {
            let Some(options) = &g.vote else {
                continue;
            };
            for (validator, shares) in &g.val_shares {
                let Some(v) = validators.get(validator) else {
                    continue;
                };
                let deducted = g.deductions.get(validator).copied().unwrap_or(Dec::ZERO);
                let effective = shares.checked_sub(deducted).ok_or_else(|| {
                    GovernanceError::Invariant(format!(
                        "governor {address} deductions {deducted} exceed shares {shares} with {validator}"
                    ))
                })?;
                add_to(&mut governed_shares, validator, effective);
                let power = power_of(v, effective)?;
                distribute(&mut result, options, power)?;
                total_power = total_power.saturating_add(power);
            }
        }

        for (operator, options) in &validator_votes {
            let Some(v) = validators.get(operator) else {
                continue;
            };
            let covered = voted_shares
                .get(operator)
                .copied()
                .unwrap_or(Dec::ZERO)
                .saturating_add(governed_shares.get(operator).copied().unwrap_or(Dec::ZERO));
            let inherited = v.delegator_shares.saturating_sub(covered);
            let power = power_of(v, inherited)?;
            distribute(&mut result, options, power)?;
            total_power = total_power.saturating_add(power);
        }

        Ok(Aggregate {
            result,
            total_power,
            total_bonded: self.staking.total_bonded_tokens()?,
        })
    }
}

/// `total_power / total_bonded`, `None` when nothing is bonded.
fn participation(agg: &Aggregate) -> Result<Option<Dec>, GovernanceError> {
    if agg.total_bonded == 0 {
        return Ok(None);
    }
    let bonded = Dec::from_u128(agg.total_bonded);
    let ratio = agg
        .total_power
        .checked_quo(bonded)
        .ok_or_else(|| GovernanceError::Invariant("participation overflow".into()))?;
    Ok(Some(ratio.min(Dec::ONE)))
}

fn power_of(validator: &ValidatorInfo, shares: Dec) -> Result<Dec, GovernanceError> {
    validator.power_of(shares).ok_or_else(|| {
        GovernanceError::Invariant(format!("voting power overflow for {}", validator.operator))
    })
}

fn distribute(result: &mut TallyResult, options: &[WeightedVoteOption], power: Dec) -> Result<(), GovernanceError> {
    for o in options {
        let share = power
            .checked_mul(o.weight)
            .ok_or_else(|| GovernanceError::Invariant("weighted power overflow".into()))?;
        result.add(o.option, share);
    }
    Ok(())
}

fn add_to(map: &mut BTreeMap<ValidatorAddress, Dec>, validator: &ValidatorAddress, shares: Dec) {
    let entry = map.entry(validator.clone()).or_insert(Dec::ZERO);
    *entry = entry.saturating_add(shares);
}
