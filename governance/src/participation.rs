//! Participation tracking and dynamic quorum.
//!
//! Each proposal kind keeps an exponential moving average of voter
//! turnout. The quorum for a kind slides between its configured bounds
//! with that EMA: high recent turnout raises the bar, low turnout lowers it.

use tracing::debug;

use agora_types::Dec;

use crate::kind::ProposalKinds;
use crate::params::Params;
use crate::state::GovState;
use crate::GovernanceError;

/// EMA value before the first finalized proposal of a kind.
pub const INITIAL_PARTICIPATION_EMA: Dec = Dec::from_raw(500_000_000_000_000_000);

/// Weight of the previous EMA in an update.
const EMA_DECAY: Dec = Dec::from_raw(800_000_000_000_000_000);

/// Weight of the new sample in an update.
const EMA_SAMPLE: Dec = Dec::from_raw(200_000_000_000_000_000);

/// Which participation EMA.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum EmaKind {
    General,
    Law,
    ConstitutionAmendment,
}

/// `0.8 * old + 0.2 * participation`.
pub fn next_ema(old: Dec, participation: Dec) -> Dec {
    let kept = EMA_DECAY.checked_mul(old).unwrap_or(old);
    let sample = EMA_SAMPLE
        .checked_mul(participation.min(Dec::ONE))
        .unwrap_or(Dec::ZERO);
    kept.saturating_add(sample).min(Dec::ONE)
}

pub struct ParticipationTracker<'a> {
    state: GovState<'a>,
}

impl<'a> ParticipationTracker<'a> {
    pub fn new(state: GovState<'a>) -> Self {
        Self { state }
    }

    pub fn ema(&self, kind: EmaKind) -> Result<Dec, GovernanceError> {
        Ok(self
            .state
            .stored_ema(kind)?
            .unwrap_or(INITIAL_PARTICIPATION_EMA))
    }

    /// Fold `participation` into the EMAs of every kind present in `kinds`.
    pub fn record(&self, kinds: ProposalKinds, participation: Dec) -> Result<(), GovernanceError> {
        for kind in ema_kinds(kinds) {
            let old = self.ema(kind)?;
            let new = next_ema(old, participation);
            debug!(?kind, %old, %new, %participation, "participation EMA updated");
            self.state.set_ema(kind, new)?;
        }
        Ok(())
    }

    /// Dynamic quorum of one kind.
    pub fn quorum(&self, params: &Params, kind: EmaKind) -> Result<Dec, GovernanceError> {
        let range = match kind {
            EmaKind::General => params.quorum_range,
            EmaKind::Law => params.law_quorum_range,
            EmaKind::ConstitutionAmendment => params.constitution_amendment_quorum_range,
        };
        Ok(range.at(self.ema(kind)?))
    }

    /// Quorum and threshold for a proposal of `kinds`.
    ///
    /// Starts from the general values and raises each to the stricter value
    /// of every other kind present.
    pub fn quorum_and_threshold(
        &self,
        params: &Params,
        kinds: ProposalKinds,
    ) -> Result<(Dec, Dec), GovernanceError> {
        let mut quorum = self.quorum(params, EmaKind::General)?;
        let mut threshold = params.threshold;
        if kinds.is_law() {
            quorum = quorum.max(self.quorum(params, EmaKind::Law)?);
            threshold = threshold.max(params.law_threshold);
        }
        if kinds.is_constitution_amendment() {
            quorum = quorum.max(self.quorum(params, EmaKind::ConstitutionAmendment)?);
            threshold = threshold.max(params.constitution_amendment_threshold);
        }
        Ok((quorum, threshold))
    }
}

fn ema_kinds(kinds: ProposalKinds) -> Vec<EmaKind> {
    let mut out = Vec::with_capacity(3);
    if kinds.is_any() {
        out.push(EmaKind::General);
    }
    if kinds.is_law() {
        out.push(EmaKind::Law);
    }
    if kinds.is_constitution_amendment() {
        out.push(EmaKind::ConstitutionAmendment);
    }
    out
}
