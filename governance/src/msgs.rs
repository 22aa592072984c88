//! Messages: the envelope embedded in proposals and the governance
//! module's own message types.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use agora_types::{Address, Coins};

use crate::governor::{GovernorDescription, GovernorStatus};
use crate::params::Params;
use crate::proposal::WeightedVoteOption;
use crate::GovernanceError;

/// A type-tagged, encoded message.
///
/// Proposals carry arbitrary messages of any module; the router decides
/// who handles them by `type_url`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnyMsg {
    pub type_url: String,
    pub value: Vec<u8>,
}

/// A message type with a stable type URL.
pub trait TypedMsg: Serialize + DeserializeOwned {
    const TYPE_URL: &'static str;
}

impl AnyMsg {
    pub fn pack<M: TypedMsg>(msg: &M) -> Result<Self, GovernanceError> {
        let value =
            bincode::serialize(msg).map_err(|e| GovernanceError::InvalidMessage(e.to_string()))?;
        Ok(Self {
            type_url: M::TYPE_URL.to_string(),
            value,
        })
    }

    pub fn unpack<M: TypedMsg>(&self) -> Result<M, GovernanceError> {
        if self.type_url != M::TYPE_URL {
            return Err(GovernanceError::InvalidMessage(format!(
                "expected {}, got {}",
                M::TYPE_URL,
                self.type_url
            )));
        }
        bincode::deserialize(&self.value).map_err(|e| GovernanceError::InvalidMessage(e.to_string()))
    }

    pub fn is<M: TypedMsg>(&self) -> bool {
        self.type_url == M::TYPE_URL
    }
}

// ── Messages executable by proposals ───────────────────────────────────

/// Replace the governance params.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgUpdateParams {
    pub authority: Address,
    pub params: Params,
}

impl TypedMsg for MsgUpdateParams {
    const TYPE_URL: &'static str = "/agora.gov.v1.MsgUpdateParams";
}

/// A signalling proposal that is held to the law quorum and threshold.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgProposeLaw {
    pub authority: Address,
}

impl TypedMsg for MsgProposeLaw {
    const TYPE_URL: &'static str = "/agora.gov.v1.MsgProposeLaw";
}

/// A unified diff against the current constitution.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgProposeConstitutionAmendment {
    pub authority: Address,
    pub amendment: String,
}

impl TypedMsg for MsgProposeConstitutionAmendment {
    const TYPE_URL: &'static str = "/agora.gov.v1.MsgProposeConstitutionAmendment";
}

// ── Transaction messages ───────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgSubmitProposal {
    pub messages: Vec<AnyMsg>,
    pub initial_deposit: Coins,
    pub proposer: Address,
    pub metadata: String,
    pub title: String,
    pub summary: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgDeposit {
    pub proposal_id: u64,
    pub depositor: Address,
    pub amount: Coins,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgVote {
    pub proposal_id: u64,
    pub voter: Address,
    pub options: Vec<WeightedVoteOption>,
    pub metadata: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgCreateGovernor {
    pub address: Address,
    pub description: GovernorDescription,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgEditGovernor {
    pub address: Address,
    pub description: GovernorDescription,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgUpdateGovernorStatus {
    pub address: Address,
    pub status: GovernorStatus,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgDelegateGovernor {
    pub delegator: Address,
    pub governor: Address,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgUndelegateGovernor {
    pub delegator: Address,
}
