//! Per-block processing.
//!
//! `end_block` runs once per block, after all transactions:
//!
//! 1. time-triggered throttler decreases
//! 2. proposals whose deposit period ended are dropped
//! 3. due quorum checks run, possibly extending the voting period
//! 4. proposals whose voting period ended are tallied and executed
//!
//! Queues are scanned in (time, id) order so every replica processes the
//! same proposals in the same order.

use std::sync::Arc;

use tracing::{info, info_span, warn};

use agora_store::CacheStore;
use agora_types::Timestamp;
use agora_utils::format_duration;

use crate::engine::GovernanceEngine;
use crate::hooks::GovEvent;
use crate::kind::classify;
use crate::participation::ParticipationTracker;
use crate::proposal::{Proposal, ProposalStatus, QuorumCheckQueueEntry};
use crate::queue::{voting_window, QueueManager};
use crate::router::{ExecContext, MessageRouter};
use crate::state::GovState;
use crate::tally::TallyEngine;
use crate::throttler::DepositThrottler;
use crate::GovernanceError;

impl GovernanceEngine {
    /// Process the end of the block at `now`.
    ///
    /// Failed proposal messages are recorded on the proposal; any error
    /// returned from here must abort the block.
    pub fn end_block(&mut self, now: Timestamp) -> Result<(), GovernanceError> {
        let span = info_span!("gov_end_block", time = now.as_secs());
        let _enter = span.enter();

        let store = Arc::clone(&self.store);
        let state = GovState::new(store.as_ref());
        let params = state.params()?;
        DepositThrottler::deposit().on_tick(&state, &params, now)?;
        DepositThrottler::initial_deposit().on_tick(&state, &params, now)?;

        self.drop_expired_deposit_periods(state, now)?;
        self.run_quorum_checks(state, now)?;
        self.finalize_ended_votes(state, now)?;
        Ok(())
    }

    fn drop_expired_deposit_periods(&mut self, state: GovState<'_>, now: Timestamp) -> Result<(), GovernanceError> {
        for (_, id) in QueueManager::new(state).inactive_due(now)? {
            let params = state.params()?;
            self.delete_proposal(id, now)?;
            let burned = params.burn_proposal_deposit_prevote;
            if burned {
                self.delete_and_burn_deposits(id)?;
            } else {
                self.refund_and_delete_deposits(id)?;
            }
            self.hooks.after_proposal_failed_min_deposit(id)?;
            info!(proposal_id = id, deposits_burned = burned, "proposal dropped: min deposit not reached");
            self.emit(GovEvent::ProposalDropped {
                proposal_id: id,
                deposits_burned: burned,
            });
        }
        Ok(())
    }

    fn run_quorum_checks(&mut self, state: GovState<'_>, now: Timestamp) -> Result<(), GovernanceError> {
        let queues = QueueManager::new(state);
        for (check_time, id, entry) in queues.quorum_checks_due(now)? {
            queues.unschedule_quorum_check(check_time, id)?;
            let mut proposal = state.proposal(id)?.ok_or_else(|| {
                GovernanceError::Invariant(format!("quorum check for missing proposal {id}"))
            })?;
            if proposal.status != ProposalStatus::VotingPeriod {
                continue;
            }
            let params = state.params()?;
            let (start, end) = voting_window(&proposal)?;
            let reached = TallyEngine::new(state, self.staking.as_ref(), &self.config)
                .has_reached_quorum(&params, &proposal)?;
            self.emit(GovEvent::QuorumCheck {
                proposal_id: id,
                reached,
                checks_done: entry.quorum_checks_done,
            });

            if reached {
                // quorum reached late: give voters a full period after the timeout
                if entry.quorum_checks_done > 0 {
                    let remaining = params
                        .voting_period_secs
                        .saturating_sub(params.quorum_timeout_secs);
                    let new_end = now
                        .plus_secs(remaining)
                        .min(start.plus_secs(params.max_voting_period_extension_secs));
                    if new_end > end {
                        queues.reschedule_voting_end(id, end, new_end)?;
                        proposal.voting_end_time = Some(new_end);
                        state.set_proposal(&proposal)?;
                        info!(
                            proposal_id = id,
                            voting_end = new_end.as_secs(),
                            extension = %format_duration(end.elapsed_since(new_end)),
                            "voting period extended"
                        );
                        self.emit(GovEvent::VotingPeriodExtended {
                            proposal_id: id,
                            voting_end_time: new_end,
                        });
                    }
                }
                continue;
            }

            let done = entry.quorum_checks_done + 1;
            if done < entry.quorum_check_count && now < end {
                let period = end.as_secs().saturating_sub(entry.quorum_timeout_time.as_secs());
                let interval = period / entry.quorum_check_count;
                if interval == 0 {
                    continue;
                }
                let mut next = check_time.plus_secs(interval);
                while next <= now {
                    next = next.plus_secs(interval);
                }
                if next < end {
                    queues.schedule_quorum_check(
                        next,
                        id,
                        &QuorumCheckQueueEntry {
                            quorum_checks_done: done,
                            ..entry
                        },
                    )?;
                }
            }
        }
        Ok(())
    }

    fn finalize_ended_votes(&mut self, state: GovState<'_>, now: Timestamp) -> Result<(), GovernanceError> {
        for (_, id) in QueueManager::new(state).active_due(now)? {
            let mut proposal = state.proposal(id)?.ok_or_else(|| {
                GovernanceError::Invariant(format!("active queue references missing proposal {id}"))
            })?;
            let params = state.params()?;
            let outcome = TallyEngine::new(state, self.staking.as_ref(), &self.config)
                .tally(&params, &proposal)?;

            if outcome.burn_deposits {
                self.delete_and_burn_deposits(id)?;
            } else {
                self.refund_and_delete_deposits(id)?;
            }
            QueueManager::new(state).leave_voting_period(&params, &proposal, now)?;

            if outcome.passes {
                match self.execute_messages(&proposal, now)? {
                    None => proposal.status = ProposalStatus::Passed,
                    Some(reason) => {
                        warn!(proposal_id = id, %reason, "proposal passed but execution failed");
                        proposal.status = ProposalStatus::Failed;
                        proposal.failed_reason = reason;
                    }
                }
            } else {
                proposal.status = ProposalStatus::Rejected;
            }
            proposal.final_tally_result = outcome.result;
            state.set_proposal(&proposal)?;

            ParticipationTracker::new(state).record(classify(&proposal.messages), outcome.participation)?;
            self.hooks.after_proposal_voting_period_ended(id)?;
            info!(
                proposal_id = id,
                status = %proposal.status,
                participation = %outcome.participation,
                "proposal tallied"
            );
            self.emit(GovEvent::ProposalFinalized {
                proposal_id: id,
                status: proposal.status,
                deposits_burned: outcome.burn_deposits,
                failed_reason: (!proposal.failed_reason.is_empty()).then(|| proposal.failed_reason.clone()),
            });
        }
        Ok(())
    }

    /// Run every message of a passed proposal against a staged overlay,
    /// committed only if all succeed. Returns the failure reason otherwise.
    fn execute_messages(&self, proposal: &Proposal, now: Timestamp) -> Result<Option<String>, GovernanceError> {
        let cache = CacheStore::new(self.store.as_ref());
        let ctx = ExecContext {
            store: &cache,
            block_time: now,
        };
        for (i, msg) in proposal.messages.iter().enumerate() {
            let Some(handler) = self.router.handler(&msg.type_url) else {
                return Ok(Some(format!("message {i}: no handler for {}", msg.type_url)));
            };
            if let Err(e) = handler.execute(&ctx, msg) {
                if e.is_fatal() {
                    return Err(e);
                }
                return Ok(Some(format!("message {i}: {e}")));
            }
        }
        cache.commit()?;
        Ok(None)
    }
}
