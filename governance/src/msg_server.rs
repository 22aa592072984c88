//! Transaction messages: proposals, deposits, votes and governors.
//!
//! Every handler runs against a staged overlay of the store that is only
//! committed once the handler, its hooks and its coin transfer all
//! succeeded, so a rejected message leaves no trace. Coins move last.

use std::sync::Arc;

use tracing::{debug, info};

use agora_types::{Address, Coin, Coins, Dec, Timestamp};

use crate::engine::GovernanceEngine;
use crate::governor::{Governor, GovernorLedger, GovernorStatus};
use crate::hooks::GovEvent;
use crate::msgs::{
    MsgCreateGovernor, MsgDelegateGovernor, MsgDeposit, MsgEditGovernor, MsgSubmitProposal,
    MsgUndelegateGovernor, MsgUpdateGovernorStatus, MsgVote,
};
use crate::params::Params;
use crate::proposal::{validate_weighted_options, Deposit, Proposal, ProposalStatus, TallyResult, Vote};
use crate::queue::QueueManager;
use crate::router::MessageRouter;
use crate::state::GovState;
use crate::throttler::DepositThrottler;
use crate::GovernanceError;

/// A deposit must reach `ratio * min_deposit` in at least one denom.
fn check_min_deposit_ratio(amount: &Coins, min_deposit: &Coins, ratio: Dec) -> Result<(), GovernanceError> {
    if ratio.is_zero() {
        return Ok(());
    }
    let mut needed = Vec::with_capacity(min_deposit.len());
    for coin in min_deposit.iter() {
        let need = ratio
            .mul_int_truncate(coin.amount)
            .ok_or_else(|| GovernanceError::Invariant("min deposit ratio overflow".into()))?;
        let got = amount.amount_of(&coin.denom);
        if got > 0 && got >= need {
            return Ok(());
        }
        needed.push(Coin::new(coin.denom.clone(), need));
    }
    Err(GovernanceError::DepositBelowMinRatio {
        got: amount.to_string(),
        min: Coins::new(needed).map(|c| c.to_string()).unwrap_or_default(),
    })
}

impl GovernanceEngine {
    /// Submit a proposal with its initial deposit. Returns the new id.
    pub fn submit_proposal(&mut self, msg: MsgSubmitProposal, now: Timestamp) -> Result<u64, GovernanceError> {
        self.validate_proposal_content(&msg)?;
        self.staged(|engine, state| engine.stage_submit_proposal(state, msg, now))
    }

    fn stage_submit_proposal(
        &mut self,
        state: GovState<'_>,
        msg: MsgSubmitProposal,
        now: Timestamp,
    ) -> Result<u64, GovernanceError> {
        let params = state.params()?;

        let floor = &params.min_initial_deposit_throttler.floor_value;
        if !msg.initial_deposit.is_valid() || !msg.initial_deposit.denoms_subset_of(floor) {
            return Err(GovernanceError::InvalidDeposit(format!(
                "initial deposit {} must only use {}",
                msg.initial_deposit, floor
            )));
        }
        let min_initial = DepositThrottler::initial_deposit().current(&state, &params, now)?;
        if !msg.initial_deposit.is_all_gte(&min_initial) {
            return Err(GovernanceError::InsufficientInitialDeposit {
                need: min_initial.to_string(),
                got: msg.initial_deposit.to_string(),
            });
        }
        let id = state
            .next_proposal_id()?
            .ok_or_else(|| GovernanceError::Invariant("starting proposal id not set".into()))?;
        let next_id = id
            .checked_add(1)
            .ok_or_else(|| GovernanceError::Invariant("proposal id overflow".into()))?;

        let mut proposal = Proposal {
            id,
            messages: msg.messages,
            status: ProposalStatus::DepositPeriod,
            final_tally_result: TallyResult::default(),
            submit_time: now,
            deposit_end_time: now.plus_secs(params.max_deposit_period_secs),
            total_deposit: Coins::empty(),
            voting_start_time: None,
            voting_end_time: None,
            metadata: msg.metadata,
            title: msg.title,
            summary: msg.summary,
            proposer: msg.proposer.clone(),
            failed_reason: String::new(),
        };
        state.set_next_proposal_id(next_id)?;
        state.set_proposal(&proposal)?;
        QueueManager::new(state).enter_deposit_period(&params, &proposal, now)?;

        self.hooks.after_proposal_submission(id)?;
        info!(proposal_id = id, proposer = %msg.proposer, "proposal submitted");
        self.emit(GovEvent::ProposalSubmitted {
            proposal_id: id,
            proposer: msg.proposer.clone(),
        });

        if !msg.initial_deposit.is_empty() {
            self.add_deposit(state, &params, &mut proposal, &msg.proposer, &msg.initial_deposit, now)?;
            self.bank
                .send_coins(&msg.proposer, &self.module_address, &msg.initial_deposit)?;
        }
        Ok(id)
    }

    /// Deposit on a proposal in its deposit or voting period. Returns
    /// whether the deposit started the voting period.
    pub fn deposit(&mut self, msg: MsgDeposit, now: Timestamp) -> Result<bool, GovernanceError> {
        require_valid_address(&msg.depositor, "depositor")?;
        self.staged(|engine, state| engine.stage_deposit(state, msg, now))
    }

    fn stage_deposit(&mut self, state: GovState<'_>, msg: MsgDeposit, now: Timestamp) -> Result<bool, GovernanceError> {
        let params = state.params()?;

        let mut proposal = state.require_proposal(msg.proposal_id)?;
        if !matches!(
            proposal.status,
            ProposalStatus::DepositPeriod | ProposalStatus::VotingPeriod
        ) {
            return Err(GovernanceError::ProposalClosed(proposal.id));
        }
        let floor = &params.min_deposit_throttler.floor_value;
        if msg.amount.is_empty() || !msg.amount.is_valid() {
            return Err(GovernanceError::InvalidDeposit(format!("invalid amount {}", msg.amount)));
        }
        if !msg.amount.denoms_subset_of(floor) {
            return Err(GovernanceError::InvalidDeposit(format!(
                "deposit {} must only use {}",
                msg.amount, floor
            )));
        }
        let min_deposit = DepositThrottler::deposit().current(&state, &params, now)?;
        check_min_deposit_ratio(&msg.amount, &min_deposit, params.min_deposit_ratio)?;

        let activated = self.add_deposit(state, &params, &mut proposal, &msg.depositor, &msg.amount, now)?;
        self.bank
            .send_coins(&msg.depositor, &self.module_address, &msg.amount)?;
        Ok(activated)
    }

    /// Cast or replace a vote.
    pub fn vote(&mut self, msg: MsgVote, _now: Timestamp) -> Result<(), GovernanceError> {
        require_valid_address(&msg.voter, "voter")?;
        self.staged(|engine, state| engine.stage_vote(state, msg))
    }

    fn stage_vote(&mut self, state: GovState<'_>, msg: MsgVote) -> Result<(), GovernanceError> {
        let proposal = state.require_proposal(msg.proposal_id)?;
        if proposal.status != ProposalStatus::VotingPeriod {
            return Err(GovernanceError::InactiveProposal(proposal.id));
        }
        validate_weighted_options(&msg.options)?;
        if msg.metadata.len() > self.config.max_metadata_len {
            return Err(GovernanceError::MetadataTooLong {
                got: msg.metadata.len(),
                max: self.config.max_metadata_len,
            });
        }

        state.set_vote(&Vote {
            proposal_id: proposal.id,
            voter: msg.voter.clone(),
            options: msg.options.clone(),
            metadata: msg.metadata,
        })?;
        self.hooks.after_proposal_vote(proposal.id, &msg.voter)?;
        debug!(proposal_id = proposal.id, voter = %msg.voter, "vote cast");
        self.emit(GovEvent::ProposalVote {
            proposal_id: proposal.id,
            voter: msg.voter,
            options: msg.options,
        });
        Ok(())
    }

    /// Register the sender as an active governor, delegated to itself.
    pub fn create_governor(&mut self, msg: MsgCreateGovernor, now: Timestamp) -> Result<(), GovernanceError> {
        require_valid_address(&msg.address, "governor")?;
        self.staged(|engine, state| engine.stage_create_governor(state, msg, now))
    }

    fn stage_create_governor(
        &mut self,
        state: GovState<'_>,
        msg: MsgCreateGovernor,
        now: Timestamp,
    ) -> Result<(), GovernanceError> {
        let staking = Arc::clone(&self.staking);
        let params = state.params()?;

        if state.governor(&msg.address)?.is_some() {
            return Err(GovernanceError::GovernorExists(msg.address.to_string()));
        }
        msg.description.validate()?;
        let ledger = GovernorLedger::new(state, staking.as_ref());
        check_self_delegation(&ledger, &params, &msg.address)?;

        ledger.activate(
            Governor {
                address: msg.address.clone(),
                description: msg.description,
                status: GovernorStatus::Active,
                last_status_change_time: None,
            },
            now,
        )?;
        info!(governor = %msg.address, "governor created");
        self.emit(GovEvent::GovernorCreated {
            governor: msg.address,
        });
        Ok(())
    }

    pub fn edit_governor(&mut self, msg: MsgEditGovernor, _now: Timestamp) -> Result<(), GovernanceError> {
        require_valid_address(&msg.address, "governor")?;
        self.staged(|engine, state| engine.stage_edit_governor(state, msg))
    }

    fn stage_edit_governor(&mut self, state: GovState<'_>, msg: MsgEditGovernor) -> Result<(), GovernanceError> {
        let mut governor = state
            .governor(&msg.address)?
            .ok_or_else(|| GovernanceError::GovernorNotFound(msg.address.to_string()))?;
        msg.description.validate()?;
        governor.description = msg.description;
        state.set_governor(&governor)?;
        self.emit(GovEvent::GovernorEdited {
            governor: msg.address,
        });
        Ok(())
    }

    /// Switch a governor between active and inactive, at most once per
    /// status change period.
    pub fn update_governor_status(
        &mut self,
        msg: MsgUpdateGovernorStatus,
        now: Timestamp,
    ) -> Result<(), GovernanceError> {
        require_valid_address(&msg.address, "governor")?;
        self.staged(|engine, state| engine.stage_update_governor_status(state, msg, now))
    }

    fn stage_update_governor_status(
        &mut self,
        state: GovState<'_>,
        msg: MsgUpdateGovernorStatus,
        now: Timestamp,
    ) -> Result<(), GovernanceError> {
        let staking = Arc::clone(&self.staking);
        let params = state.params()?;

        let governor = state
            .governor(&msg.address)?
            .ok_or_else(|| GovernanceError::GovernorNotFound(msg.address.to_string()))?;
        if governor.status == msg.status {
            return Err(GovernanceError::InvalidMessage(format!(
                "governor {} already has status {:?}",
                msg.address, msg.status
            )));
        }
        if let Some(last) = governor.last_status_change_time {
            let allowed = last.plus_secs(params.governor_status_change_period_secs);
            if now < allowed {
                return Err(GovernanceError::GovernorStatusChangeTooSoon {
                    address: msg.address.to_string(),
                    allowed_at: allowed.as_secs(),
                });
            }
        }

        let ledger = GovernorLedger::new(state, staking.as_ref());
        match msg.status {
            GovernorStatus::Active => {
                check_self_delegation(&ledger, &params, &msg.address)?;
                ledger.activate(governor, now)?;
            }
            GovernorStatus::Inactive => ledger.deactivate(governor, now)?,
        }
        info!(governor = %msg.address, status = ?msg.status, "governor status changed");
        self.emit(GovEvent::GovernorStatusChanged {
            governor: msg.address,
            status: msg.status,
        });
        Ok(())
    }

    /// Assign the sender's stake to an active governor, replacing any
    /// previous assignment.
    pub fn delegate_governor(&mut self, msg: MsgDelegateGovernor, _now: Timestamp) -> Result<(), GovernanceError> {
        require_valid_address(&msg.delegator, "delegator")?;
        require_valid_address(&msg.governor, "governor")?;
        self.staged(|engine, state| engine.stage_delegate_governor(state, msg))
    }

    fn stage_delegate_governor(
        &mut self,
        state: GovState<'_>,
        msg: MsgDelegateGovernor,
    ) -> Result<(), GovernanceError> {
        let staking = Arc::clone(&self.staking);

        let target = state
            .governor(&msg.governor)?
            .ok_or_else(|| GovernanceError::GovernorNotFound(msg.governor.to_string()))?;
        if !target.is_active() {
            return Err(GovernanceError::GovernorInactive(msg.governor.to_string()));
        }
        reject_active_governor(&state, &msg.delegator)?;

        let ledger = GovernorLedger::new(state, staking.as_ref());
        match state.governance_delegation(&msg.delegator)? {
            Some(current) if current == msg.governor => {
                return Err(GovernanceError::GovernorDelegation(format!(
                    "{} is already delegated to {}",
                    msg.delegator, msg.governor
                )));
            }
            Some(_) => ledger.redelegate(&msg.delegator, &msg.governor)?,
            None => ledger.delegate(&msg.delegator, &msg.governor)?,
        }
        self.emit(GovEvent::GovernanceDelegated {
            delegator: msg.delegator,
            governor: msg.governor,
        });
        Ok(())
    }

    pub fn undelegate_governor(
        &mut self,
        msg: MsgUndelegateGovernor,
        _now: Timestamp,
    ) -> Result<(), GovernanceError> {
        require_valid_address(&msg.delegator, "delegator")?;
        self.staged(|engine, state| engine.stage_undelegate_governor(state, msg))
    }

    fn stage_undelegate_governor(
        &mut self,
        state: GovState<'_>,
        msg: MsgUndelegateGovernor,
    ) -> Result<(), GovernanceError> {
        let staking = Arc::clone(&self.staking);

        reject_active_governor(&state, &msg.delegator)?;
        if state.governance_delegation(&msg.delegator)?.is_none() {
            return Err(GovernanceError::GovernorDelegation(format!(
                "{} has no governance delegation",
                msg.delegator
            )));
        }
        let ledger = GovernorLedger::new(state, staking.as_ref());
        if let Some(governor) = ledger.undelegate(&msg.delegator)? {
            self.emit(GovEvent::GovernanceUndelegated {
                delegator: msg.delegator,
                governor,
            });
        }
        Ok(())
    }

    /// Stateless checks on a submission, before anything is charged.
    fn validate_proposal_content(&self, msg: &MsgSubmitProposal) -> Result<(), GovernanceError> {
        require_valid_address(&msg.proposer, "proposer")?;
        if msg.title.trim().is_empty() {
            return Err(GovernanceError::InvalidProposalContent("title cannot be empty".into()));
        }
        if msg.title.len() > self.config.max_title_len {
            return Err(GovernanceError::InvalidProposalContent(format!(
                "title too long: {} > {}",
                msg.title.len(),
                self.config.max_title_len
            )));
        }
        if msg.summary.trim().is_empty() {
            return Err(GovernanceError::InvalidProposalContent("summary cannot be empty".into()));
        }
        if msg.summary.len() > self.config.max_summary_len {
            return Err(GovernanceError::InvalidProposalContent(format!(
                "summary too long: {} > {}",
                msg.summary.len(),
                self.config.max_summary_len
            )));
        }
        if msg.metadata.len() > self.config.max_metadata_len {
            return Err(GovernanceError::MetadataTooLong {
                got: msg.metadata.len(),
                max: self.config.max_metadata_len,
            });
        }

        for m in &msg.messages {
            let handler = self
                .router
                .handler(&m.type_url)
                .ok_or_else(|| GovernanceError::NoHandler(m.type_url.clone()))?;
            let signers = handler.signers(m)?;
            if signers.as_slice() != std::slice::from_ref(&self.module_address) {
                let got: Vec<String> = signers.iter().map(|s| s.to_string()).collect();
                return Err(GovernanceError::InvalidSigner {
                    expected: self.module_address.to_string(),
                    got: got.join(","),
                });
            }
            handler.validate(m)?;
        }
        Ok(())
    }

    /// Record a deposit and start the voting period once the total reaches
    /// the min deposit. The caller moves the coins afterwards.
    fn add_deposit(
        &mut self,
        state: GovState<'_>,
        params: &Params,
        proposal: &mut Proposal,
        depositor: &Address,
        amount: &Coins,
        now: Timestamp,
    ) -> Result<bool, GovernanceError> {
        let overflow = || GovernanceError::Invariant("deposit overflow".into());
        proposal.total_deposit = proposal.total_deposit.checked_add(amount).ok_or_else(overflow)?;
        let mut deposit = state.deposit(proposal.id, depositor)?.unwrap_or(Deposit {
            proposal_id: proposal.id,
            depositor: depositor.clone(),
            amount: Coins::empty(),
        });
        deposit.amount = deposit.amount.checked_add(amount).ok_or_else(overflow)?;
        state.set_deposit(&deposit)?;

        let activated = proposal.status == ProposalStatus::DepositPeriod
            && proposal
                .total_deposit
                .is_all_gte(&DepositThrottler::deposit().current(&state, params, now)?);
        if activated {
            let queues = QueueManager::new(state);
            queues.leave_deposit_period(params, proposal, now)?;
            proposal.status = ProposalStatus::VotingPeriod;
            proposal.voting_start_time = Some(now);
            proposal.voting_end_time = Some(now.plus_secs(params.voting_period_secs));
            queues.enter_voting_period(params, proposal, now)?;
        }
        state.set_proposal(proposal)?;

        self.hooks.after_proposal_deposit(proposal.id, depositor)?;
        debug!(proposal_id = proposal.id, %depositor, %amount, total = %proposal.total_deposit, "deposit added");
        self.emit(GovEvent::ProposalDeposit {
            proposal_id: proposal.id,
            depositor: depositor.clone(),
            amount: amount.clone(),
        });
        if let (true, Some(end)) = (activated, proposal.voting_end_time) {
            info!(proposal_id = proposal.id, voting_end = end.as_secs(), "voting period started");
            self.emit(GovEvent::VotingPeriodStarted {
                proposal_id: proposal.id,
                voting_end_time: end,
            });
        }
        Ok(activated)
    }
}

fn require_valid_address(address: &Address, role: &str) -> Result<(), GovernanceError> {
    if address.is_valid() {
        Ok(())
    } else {
        Err(GovernanceError::InvalidMessage(format!("invalid {role} address {address}")))
    }
}

fn check_self_delegation(
    ledger: &GovernorLedger<'_>,
    params: &Params,
    address: &Address,
) -> Result<(), GovernanceError> {
    let have = ledger.self_delegation_tokens(address)?;
    if have < params.min_governor_self_delegation {
        return Err(GovernanceError::InsufficientGovernorSelfDelegation {
            address: address.to_string(),
            have,
            need: params.min_governor_self_delegation,
        });
    }
    Ok(())
}

/// Active governors vote their own stake and cannot hand it elsewhere.
fn reject_active_governor(state: &GovState<'_>, delegator: &Address) -> Result<(), GovernanceError> {
    if let Some(own) = state.governor(delegator)? {
        if own.is_active() {
            return Err(GovernanceError::GovernorDelegation(format!(
                "{delegator} is an active governor"
            )));
        }
    }
    Ok(())
}
