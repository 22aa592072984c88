//! Message routing.
//!
//! Proposals embed messages of any module. The router maps a message's
//! `type_url` to the handler that validates and executes it; a message
//! without a handler cannot be submitted.

use std::collections::BTreeMap;

use agora_store::KvStore;
use agora_types::{Address, Timestamp};

use crate::handlers::{ConstitutionAmendmentHandler, ProposeLawHandler, UpdateParamsHandler};
use crate::msgs::{AnyMsg, MsgProposeConstitutionAmendment, MsgProposeLaw, MsgUpdateParams, TypedMsg};
use crate::GovernanceError;

/// What a handler sees while executing: the store it may write to and
/// the block time.
///
/// During proposal execution `store` is a staged overlay; its writes only
/// reach the real store when every message of the proposal succeeds.
pub struct ExecContext<'a> {
    pub store: &'a dyn KvStore,
    pub block_time: Timestamp,
}

pub trait MsgHandler {
    /// Accounts that must have authorized the message.
    fn signers(&self, msg: &AnyMsg) -> Result<Vec<Address>, GovernanceError>;

    /// Stateless checks run at submission.
    fn validate(&self, _msg: &AnyMsg) -> Result<(), GovernanceError> {
        Ok(())
    }

    fn execute(&self, ctx: &ExecContext<'_>, msg: &AnyMsg) -> Result<(), GovernanceError>;
}

/// Handler lookup by type URL.
pub trait MessageRouter {
    fn handler(&self, type_url: &str) -> Option<&dyn MsgHandler>;
}

#[derive(Default)]
pub struct Router {
    handlers: BTreeMap<String, Box<dyn MsgHandler>>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// A router with the governance module's own handlers, authorized by
    /// `authority`.
    pub fn with_gov_handlers(authority: Address) -> Self {
        let mut router = Self::new();
        router.register(
            MsgUpdateParams::TYPE_URL,
            Box::new(UpdateParamsHandler::new(authority.clone())),
        );
        router.register(
            MsgProposeLaw::TYPE_URL,
            Box::new(ProposeLawHandler::new(authority.clone())),
        );
        router.register(
            MsgProposeConstitutionAmendment::TYPE_URL,
            Box::new(ConstitutionAmendmentHandler::new(authority)),
        );
        router
    }

    /// Register `handler` for `type_url`, replacing any previous one.
    pub fn register(&mut self, type_url: impl Into<String>, handler: Box<dyn MsgHandler>) {
        self.handlers.insert(type_url.into(), handler);
    }

    pub fn type_urls(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(String::as_str)
    }
}

impl MessageRouter for Router {
    fn handler(&self, type_url: &str) -> Option<&dyn MsgHandler> {
        self.handlers.get(type_url).map(|h| h.as_ref())
    }
}
