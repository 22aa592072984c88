//! On-chain governance decision engine.
//!
//! Proposals collect deposits, enter a voting period once the dynamic
//! minimum deposit is reached, and are tallied stake-weighted at the end of
//! it. Quorum adapts to an EMA of past participation; the minimum deposits
//! adapt to how many proposals are open. Delegators may follow a governor
//! instead of their validators.
//!
//! The engine never reads the wall clock: every entry point takes the
//! block time.

pub mod config;
pub mod constitution;
pub mod engine;
pub mod error;
pub mod genesis;
pub mod governor;
pub mod handlers;
pub mod hooks;
pub mod invariants;
pub mod kind;
pub mod msg_server;
pub mod msgs;
pub mod params;
pub mod participation;
pub mod proposal;
pub mod query;
pub mod queue;
pub mod router;
pub mod scheduler;
pub mod state;
pub mod tally;
pub mod throttler;

pub use config::GovConfig;
pub use engine::{GovernanceEngine, MODULE_NAME};
pub use error::GovernanceError;
pub use genesis::{GenesisState, GovernanceDelegation};
pub use governor::{Governor, GovernorDescription, GovernorStatus};
pub use hooks::{GovEvent, GovHooks, NoopHooks};
pub use kind::{classify, ProposalKinds};
pub use msgs::AnyMsg;
pub use params::{Params, QuorumRange, ThrottlerParams};
pub use participation::EmaKind;
pub use proposal::{Deposit, Proposal, ProposalStatus, TallyResult, Vote, VoteOption, WeightedVoteOption};
pub use query::Querier;
pub use router::{ExecContext, MessageRouter, MsgHandler, Router};
pub use tally::{TallyEngine, TallyOutcome};
pub use throttler::DepositThrottler;
