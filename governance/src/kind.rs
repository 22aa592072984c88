//! Proposal kind classification.
//!
//! The kind of a proposal decides which quorum, threshold and
//! participation EMA apply to it.

use std::fmt;

use crate::msgs::{AnyMsg, MsgProposeConstitutionAmendment, MsgProposeLaw};

/// Bitmask over the kinds present in a proposal's messages.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ProposalKinds(u8);

impl ProposalKinds {
    pub const ANY: u8 = 1;
    pub const LAW: u8 = 1 << 1;
    pub const CONSTITUTION_AMENDMENT: u8 = 1 << 2;

    pub fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    pub fn bits(&self) -> u8 {
        self.0
    }

    pub fn is_any(&self) -> bool {
        self.0 & Self::ANY != 0
    }

    pub fn is_law(&self) -> bool {
        self.0 & Self::LAW != 0
    }

    pub fn is_constitution_amendment(&self) -> bool {
        self.0 & Self::CONSTITUTION_AMENDMENT != 0
    }
}

impl fmt::Display for ProposalKinds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names = Vec::new();
        if self.is_any() {
            names.push("any");
        }
        if self.is_law() {
            names.push("law");
        }
        if self.is_constitution_amendment() {
            names.push("constitution_amendment");
        }
        write!(f, "{}", names.join("|"))
    }
}

/// Classify a proposal by its messages. No messages means `ANY`.
pub fn classify(messages: &[AnyMsg]) -> ProposalKinds {
    if messages.is_empty() {
        return ProposalKinds(ProposalKinds::ANY);
    }
    let bits = messages.iter().fold(0u8, |acc, msg| {
        acc | if msg.is::<MsgProposeLaw>() {
            ProposalKinds::LAW
        } else if msg.is::<MsgProposeConstitutionAmendment>() {
            ProposalKinds::CONSTITUTION_AMENDMENT
        } else {
            ProposalKinds::ANY
        }
    });
    ProposalKinds(bits)
}
