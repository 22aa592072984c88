//! Queue transitions.
//!
//! Every move of a proposal into or out of the inactive and active queues
//! goes through [`QueueManager`], which keeps the queue entry, the matching
//! counter and the throttler anchor in step. The throttler driven by a
//! counter is re-anchored before that counter changes.

use tracing::trace;

use agora_types::Timestamp;

use crate::params::Params;
use crate::proposal::{Proposal, QuorumCheckQueueEntry};
use crate::state::{GovState, Queue};
use crate::throttler::DepositThrottler;
use crate::GovernanceError;

pub struct QueueManager<'a> {
    state: GovState<'a>,
}

impl<'a> QueueManager<'a> {
    pub fn new(state: GovState<'a>) -> Self {
        Self { state }
    }

    /// Insert into the inactive queue at the deposit end time.
    pub fn enter_deposit_period(
        &self,
        params: &Params,
        proposal: &Proposal,
        now: Timestamp,
    ) -> Result<(), GovernanceError> {
        DepositThrottler::initial_deposit().re_anchor(&self.state, params, now)?;
        let count = self.state.inactive_count()?;
        self.state.set_inactive_count(count + 1)?;
        self.state
            .insert_queue(Queue::Inactive, proposal.deposit_end_time, proposal.id)?;
        trace!(proposal_id = proposal.id, inactive = count + 1, "entered inactive queue");
        Ok(())
    }

    pub fn leave_deposit_period(
        &self,
        params: &Params,
        proposal: &Proposal,
        now: Timestamp,
    ) -> Result<(), GovernanceError> {
        DepositThrottler::initial_deposit().re_anchor(&self.state, params, now)?;
        let count = self.state.inactive_count()?;
        let next = count.checked_sub(1).ok_or_else(|| {
            GovernanceError::Invariant("inactive proposal count underflow".into())
        })?;
        self.state.set_inactive_count(next)?;
        self.state
            .remove_queue(Queue::Inactive, proposal.deposit_end_time, proposal.id)?;
        Ok(())
    }

    /// Insert into the active queue at the voting end time, and schedule
    /// the first quorum check when enabled.
    pub fn enter_voting_period(
        &self,
        params: &Params,
        proposal: &Proposal,
        now: Timestamp,
    ) -> Result<(), GovernanceError> {
        let (start, end) = voting_window(proposal)?;
        DepositThrottler::deposit().re_anchor(&self.state, params, now)?;
        let count = self.state.active_count()?;
        self.state.set_active_count(count + 1)?;
        self.state.insert_queue(Queue::Active, end, proposal.id)?;
        if params.quorum_check_enabled() {
            let timeout = start.plus_secs(params.quorum_timeout_secs);
            self.state.insert_quorum_check(
                timeout,
                proposal.id,
                &QuorumCheckQueueEntry {
                    quorum_timeout_time: timeout,
                    quorum_check_count: params.quorum_check_count,
                    quorum_checks_done: 0,
                },
            )?;
        }
        trace!(proposal_id = proposal.id, active = count + 1, "entered active queue");
        Ok(())
    }

    /// Remove from the active queue and drop any pending quorum check.
    pub fn leave_voting_period(
        &self,
        params: &Params,
        proposal: &Proposal,
        now: Timestamp,
    ) -> Result<(), GovernanceError> {
        let (start, end) = voting_window(proposal)?;
        DepositThrottler::deposit().re_anchor(&self.state, params, now)?;
        let count = self.state.active_count()?;
        let next = count
            .checked_sub(1)
            .ok_or_else(|| GovernanceError::Invariant("active proposal count underflow".into()))?;
        self.state.set_active_count(next)?;
        self.state.remove_queue(Queue::Active, end, proposal.id)?;
        self.remove_quorum_checks(proposal.id, start)?;
        Ok(())
    }

    /// Move an active proposal to a new voting end time.
    pub fn reschedule_voting_end(
        &self,
        id: u64,
        old_end: Timestamp,
        new_end: Timestamp,
    ) -> Result<(), GovernanceError> {
        self.state.remove_queue(Queue::Active, old_end, id)?;
        self.state.insert_queue(Queue::Active, new_end, id)
    }

    pub fn schedule_quorum_check(
        &self,
        time: Timestamp,
        id: u64,
        entry: &QuorumCheckQueueEntry,
    ) -> Result<(), GovernanceError> {
        self.state.insert_quorum_check(time, id, entry)
    }

    pub fn unschedule_quorum_check(&self, time: Timestamp, id: u64) -> Result<(), GovernanceError> {
        self.state.remove_quorum_check(time, id)
    }

    /// Remove every quorum check of `id` scheduled at or after `from`.
    pub fn remove_quorum_checks(&self, id: u64, from: Timestamp) -> Result<(), GovernanceError> {
        for (time, entry_id, _) in self.state.quorum_checks_from(from)? {
            if entry_id == id {
                self.state.remove_quorum_check(time, id)?;
            }
        }
        Ok(())
    }

    pub fn inactive_due(&self, now: Timestamp) -> Result<Vec<(Timestamp, u64)>, GovernanceError> {
        self.state.queue_due(Queue::Inactive, now)
    }

    pub fn active_due(&self, now: Timestamp) -> Result<Vec<(Timestamp, u64)>, GovernanceError> {
        self.state.queue_due(Queue::Active, now)
    }

    pub fn quorum_checks_due(
        &self,
        now: Timestamp,
    ) -> Result<Vec<(Timestamp, u64, QuorumCheckQueueEntry)>, GovernanceError> {
        self.state.quorum_checks_due(now)
    }
}

pub(crate) fn voting_window(proposal: &Proposal) -> Result<(Timestamp, Timestamp), GovernanceError> {
    match (proposal.voting_start_time, proposal.voting_end_time) {
        (Some(start), Some(end)) => Ok((start, end)),
        _ => Err(GovernanceError::Invariant(format!(
            "proposal {} has no voting window",
            proposal.id
        ))),
    }
}
