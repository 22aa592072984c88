//! Governance parameters.
//!
//! Params are consensus state: they are stored with the rest of the
//! governance records and only change through a passed `MsgUpdateParams`
//! proposal (or at genesis). Every replacement goes through
//! [`Params::validate`].

use serde::{Deserialize, Serialize};

use agora_types::{Coins, Dec};

use crate::GovernanceError;

const DAY: u64 = 86_400;

/// Configuration of one deposit throttler.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThrottlerParams {
    /// The throttled value never drops below this.
    pub floor_value: Coins,
    /// Length of one time-triggered decrease tick.
    pub update_period_secs: u64,
    /// Proposal count the throttler steers towards.
    pub target: u64,
    /// Growth rate per unit of distance above the target.
    pub increase_ratio: Dec,
    /// Decay rate per unit of distance below the target.
    pub decrease_ratio: Dec,
    /// k in `distance^(1/k)`.
    pub sensitivity: u64,
}

impl ThrottlerParams {
    fn validate(&self, name: &str) -> Result<(), GovernanceError> {
        let bad = |msg: &str| Err(GovernanceError::InvalidParams(format!("{name}: {msg}")));
        if self.floor_value.is_empty() || !self.floor_value.is_valid() {
            return bad("floor value must be a non-empty valid coin set");
        }
        if self.update_period_secs == 0 {
            return bad("update period must be positive");
        }
        if self.increase_ratio.is_zero() || self.increase_ratio >= Dec::ONE {
            return bad("increase ratio must be in (0, 1)");
        }
        if self.decrease_ratio.is_zero() || self.decrease_ratio >= Dec::ONE {
            return bad("decrease ratio must be in (0, 1)");
        }
        if self.sensitivity == 0 {
            return bad("sensitivity must be at least 1");
        }
        Ok(())
    }
}

/// Bounds of a participation-driven dynamic quorum.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuorumRange {
    pub min: Dec,
    pub max: Dec,
}

impl QuorumRange {
    pub fn new(min: Dec, max: Dec) -> Self {
        Self { min, max }
    }

    /// `min + (max - min) * ema`.
    pub fn at(&self, ema: Dec) -> Dec {
        let spread = self.max.saturating_sub(self.min);
        let scaled = spread.checked_mul(ema.min(Dec::ONE)).unwrap_or(spread);
        self.min.saturating_add(scaled)
    }

    fn validate(&self, name: &str) -> Result<(), GovernanceError> {
        if self.min.is_zero() || self.min > self.max || self.max > Dec::ONE {
            return Err(GovernanceError::InvalidParams(format!(
                "{name}: quorum range must satisfy 0 < min <= max <= 1, got [{}, {}]",
                self.min, self.max
            )));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Params {
    pub min_deposit_throttler: ThrottlerParams,
    pub min_initial_deposit_throttler: ThrottlerParams,
    pub max_deposit_period_secs: u64,
    pub voting_period_secs: u64,
    pub threshold: Dec,
    pub law_threshold: Dec,
    pub constitution_amendment_threshold: Dec,
    pub quorum_range: QuorumRange,
    pub law_quorum_range: QuorumRange,
    pub constitution_amendment_quorum_range: QuorumRange,
    /// Burn deposits of proposals that miss quorum.
    pub burn_vote_quorum: bool,
    /// Burn deposits of proposals dropped in the deposit period.
    pub burn_proposal_deposit_prevote: bool,
    /// Fraction of the current min deposit a single deposit must reach.
    pub min_deposit_ratio: Dec,
    /// Delay after voting start before the first quorum check.
    pub quorum_timeout_secs: u64,
    /// Voting never ends later than `voting_start + this`.
    pub max_voting_period_extension_secs: u64,
    /// Number of quorum checks; zero disables the mechanism.
    pub quorum_check_count: u64,
    pub governor_status_change_period_secs: u64,
    /// Bonded tokens a governor must self-delegate to stay active.
    pub min_governor_self_delegation: u128,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            min_deposit_throttler: ThrottlerParams {
                floor_value: Coins::single("stake", 10_000_000),
                update_period_secs: 7 * DAY,
                target: 2,
                increase_ratio: Dec::percent(5),
                decrease_ratio: Dec::from_raw(25_000_000_000_000_000),
                sensitivity: 2,
            },
            min_initial_deposit_throttler: ThrottlerParams {
                floor_value: Coins::single("stake", 1_000_000),
                update_period_secs: DAY,
                target: 100,
                increase_ratio: Dec::percent(1),
                decrease_ratio: Dec::from_raw(5_000_000_000_000_000),
                sensitivity: 2,
            },
            max_deposit_period_secs: 14 * DAY,
            voting_period_secs: 21 * DAY,
            threshold: Dec::percent(67),
            law_threshold: Dec::percent(90),
            constitution_amendment_threshold: Dec::percent(90),
            quorum_range: QuorumRange::new(Dec::percent(20), Dec::percent(80)),
            law_quorum_range: QuorumRange::new(Dec::percent(25), Dec::percent(80)),
            constitution_amendment_quorum_range: QuorumRange::new(
                Dec::percent(35),
                Dec::percent(80),
            ),
            burn_vote_quorum: false,
            burn_proposal_deposit_prevote: false,
            min_deposit_ratio: Dec::percent(1),
            quorum_timeout_secs: 20 * DAY,
            max_voting_period_extension_secs: 28 * DAY,
            quorum_check_count: 0,
            governor_status_change_period_secs: 28 * DAY,
            min_governor_self_delegation: 10_000_000,
        }
    }
}

impl Params {
    pub fn validate(&self) -> Result<(), GovernanceError> {
        let bad = |msg: String| Err(GovernanceError::InvalidParams(msg));

        self.min_deposit_throttler.validate("min deposit throttler")?;
        self.min_initial_deposit_throttler
            .validate("min initial deposit throttler")?;

        if self.max_deposit_period_secs == 0 {
            return bad("max deposit period must be positive".into());
        }
        if self.voting_period_secs == 0 {
            return bad("voting period must be positive".into());
        }

        for (name, t) in [
            ("threshold", self.threshold),
            ("law threshold", self.law_threshold),
            ("constitution amendment threshold", self.constitution_amendment_threshold),
        ] {
            if t.is_zero() || t > Dec::ONE {
                return bad(format!("{name} must be in (0, 1], got {t}"));
            }
        }
        if self.threshold > self.law_threshold
            || self.law_threshold > self.constitution_amendment_threshold
        {
            return bad(
                "thresholds must be ordered threshold <= law <= constitution amendment".into(),
            );
        }

        self.quorum_range.validate("quorum range")?;
        self.law_quorum_range.validate("law quorum range")?;
        self.constitution_amendment_quorum_range
            .validate("constitution amendment quorum range")?;
        let ranges = [
            self.quorum_range,
            self.law_quorum_range,
            self.constitution_amendment_quorum_range,
        ];
        if ranges.windows(2).any(|w| w[0].min > w[1].min || w[0].max > w[1].max) {
            return bad(
                "quorum ranges must be ordered any <= law <= constitution amendment".into(),
            );
        }

        if self.min_deposit_ratio > Dec::ONE {
            return bad(format!(
                "min deposit ratio must be in [0, 1], got {}",
                self.min_deposit_ratio
            ));
        }

        if self.quorum_check_count > 0 {
            if self.quorum_timeout_secs >= self.voting_period_secs {
                return bad("quorum timeout must be shorter than the voting period".into());
            }
            if self.max_voting_period_extension_secs < self.voting_period_secs {
                return bad(
                    "max voting period extension must be at least the voting period".into(),
                );
            }
        }
        Ok(())
    }

    /// Whether quorum checks run during voting.
    pub fn quorum_check_enabled(&self) -> bool {
        self.quorum_check_count > 0
    }
}
