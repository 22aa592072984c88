use thiserror::Error;

use agora_providers::ProviderError;
use agora_store::StoreError;

#[derive(Debug, Error)]
pub enum GovernanceError {
    #[error("proposal {0} not found")]
    ProposalNotFound(u64),

    #[error("proposal {0} is not in its voting period")]
    InactiveProposal(u64),

    #[error("proposal {0} no longer accepts deposits")]
    ProposalClosed(u64),

    #[error("invalid proposal content: {0}")]
    InvalidProposalContent(String),

    #[error("metadata too long: {got} > {max} bytes")]
    MetadataTooLong { got: usize, max: usize },

    #[error("invalid vote: {0}")]
    InvalidVote(String),

    #[error("no handler registered for message type {0}")]
    NoHandler(String),

    #[error("invalid signer: expected {expected}, got {got}")]
    InvalidSigner { expected: String, got: String },

    #[error("invalid message: {0}")]
    InvalidMessage(String),

    #[error("initial deposit too low: need {need}, got {got}")]
    InsufficientInitialDeposit { need: String, got: String },

    #[error("invalid deposit: {0}")]
    InvalidDeposit(String),

    #[error("deposit {got} is below the minimum ratio of the min deposit ({min})")]
    DepositBelowMinRatio { got: String, min: String },

    #[error("invalid params: {0}")]
    InvalidParams(String),

    #[error("invalid genesis: {0}")]
    InvalidGenesis(String),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("governor {0} already exists")]
    GovernorExists(String),

    #[error("governor {0} not found")]
    GovernorNotFound(String),

    #[error("governor {0} is inactive")]
    GovernorInactive(String),

    #[error("governor {address} changed status too recently, next change allowed at {allowed_at}")]
    GovernorStatusChangeTooSoon { address: String, allowed_at: u64 },

    #[error("governor {address} self-delegation {have} is below the minimum {need}")]
    InsufficientGovernorSelfDelegation { address: String, have: u128, need: u128 },

    #[error("governor delegation error: {0}")]
    GovernorDelegation(String),

    #[error("collaborator error: {0}")]
    Provider(#[from] ProviderError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("message execution failed: {0}")]
    Execution(String),

    #[error("invariant violated: {0}")]
    Invariant(String),
}

impl GovernanceError {
    /// Whether block processing must abort.
    ///
    /// Everything else is either a rejected transaction or a failure that
    /// is recorded on the proposal.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Invariant(_) | Self::Store(_))
    }
}

pub(crate) fn encoding_error(e: bincode::Error) -> GovernanceError {
    GovernanceError::Store(StoreError::Serialization(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_classification() {
        assert!(GovernanceError::Invariant("x".into()).is_fatal());
        assert!(GovernanceError::Store(StoreError::Corruption("x".into())).is_fatal());
        assert!(!GovernanceError::ProposalNotFound(1).is_fatal());
        assert!(!GovernanceError::Execution("boom".into()).is_fatal());
        assert!(!GovernanceError::Provider(ProviderError::Bank("x".into())).is_fatal());
    }
}
