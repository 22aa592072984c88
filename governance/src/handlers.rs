//! Handlers for the messages the governance module executes itself.

use tracing::info;

use agora_types::Address;

use crate::constitution::{apply_amendment, validate_amendment};
use crate::msgs::{AnyMsg, MsgProposeConstitutionAmendment, MsgProposeLaw, MsgUpdateParams};
use crate::router::{ExecContext, MsgHandler};
use crate::state::GovState;
use crate::GovernanceError;

fn check_authority(expected: &Address, got: &Address) -> Result<(), GovernanceError> {
    if expected != got {
        return Err(GovernanceError::InvalidSigner {
            expected: expected.to_string(),
            got: got.to_string(),
        });
    }
    Ok(())
}

pub struct UpdateParamsHandler {
    authority: Address,
}

impl UpdateParamsHandler {
    pub fn new(authority: Address) -> Self {
        Self { authority }
    }
}

impl MsgHandler for UpdateParamsHandler {
    fn signers(&self, msg: &AnyMsg) -> Result<Vec<Address>, GovernanceError> {
        Ok(vec![msg.unpack::<MsgUpdateParams>()?.authority])
    }

    fn validate(&self, msg: &AnyMsg) -> Result<(), GovernanceError> {
        msg.unpack::<MsgUpdateParams>()?.params.validate()
    }

    fn execute(&self, ctx: &ExecContext<'_>, msg: &AnyMsg) -> Result<(), GovernanceError> {
        let msg: MsgUpdateParams = msg.unpack()?;
        check_authority(&self.authority, &msg.authority)?;
        msg.params.validate()?;
        GovState::new(ctx.store).set_params(&msg.params)?;
        info!("governance params updated");
        Ok(())
    }
}

/// Law proposals only signal; passing one has no state effect.
pub struct ProposeLawHandler {
    authority: Address,
}

impl ProposeLawHandler {
    pub fn new(authority: Address) -> Self {
        Self { authority }
    }
}

impl MsgHandler for ProposeLawHandler {
    fn signers(&self, msg: &AnyMsg) -> Result<Vec<Address>, GovernanceError> {
        Ok(vec![msg.unpack::<MsgProposeLaw>()?.authority])
    }

    fn execute(&self, _ctx: &ExecContext<'_>, msg: &AnyMsg) -> Result<(), GovernanceError> {
        let msg: MsgProposeLaw = msg.unpack()?;
        check_authority(&self.authority, &msg.authority)
    }
}

pub struct ConstitutionAmendmentHandler {
    authority: Address,
}

impl ConstitutionAmendmentHandler {
    pub fn new(authority: Address) -> Self {
        Self { authority }
    }
}

impl MsgHandler for ConstitutionAmendmentHandler {
    fn signers(&self, msg: &AnyMsg) -> Result<Vec<Address>, GovernanceError> {
        Ok(vec![msg.unpack::<MsgProposeConstitutionAmendment>()?.authority])
    }

    fn validate(&self, msg: &AnyMsg) -> Result<(), GovernanceError> {
        validate_amendment(&msg.unpack::<MsgProposeConstitutionAmendment>()?.amendment)
    }

    fn execute(&self, ctx: &ExecContext<'_>, msg: &AnyMsg) -> Result<(), GovernanceError> {
        let msg: MsgProposeConstitutionAmendment = msg.unpack()?;
        check_authority(&self.authority, &msg.authority)?;
        let state = GovState::new(ctx.store);
        let current = state.constitution()?;
        let amended = apply_amendment(&current, &msg.amendment)
            .map_err(|e| GovernanceError::Execution(e.to_string()))?;
        state.set_constitution(&amended)?;
        info!(len = amended.len(), "constitution amended");
        Ok(())
    }
}
