//! Self-tuning minimum deposits.
//!
//! Two throttlers share one control loop: the min deposit steers the
//! number of proposals in their voting period towards a target, the min
//! initial deposit does the same for proposals in their deposit period.
//!
//! Each throttler keeps an anchor `(value, time)`. The current value is
//! derived from the anchor on every read:
//!
//! ```text
//! distance = |count - target|
//! count > target:  factor = 1 + increase * distance^(1/k), applied once
//! count <= target: factor = 1 - decrease * distance^(1/k), applied per
//!                  elapsed update period
//! value = max(truncate(anchor * factor^n), floor)   (per denom)
//! ```
//!
//! The anchor is re-taken right before the count changes, and on the
//! first block after a full decrease period has elapsed.

use tracing::{debug, warn};

use agora_types::{Coin, Coins, Dec, Timestamp};

use crate::params::{Params, ThrottlerParams};
use crate::proposal::LastMinDeposit;
use crate::state::GovState;
use crate::GovernanceError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ThrottlerKind {
    /// Min deposit to enter the voting period, driven by the active count.
    Deposit,
    /// Min deposit at submission, driven by the inactive count.
    InitialDeposit,
}

/// `distance^(1/k)`, falling back to `k = 1` when the root is not computable.
fn kth_root(distance: u64, k: u64) -> Dec {
    let d = Dec::from_int(distance);
    match d.approx_root(k) {
        Ok(root) => root,
        Err(e) => {
            warn!(distance, k, error = %e, "throttler root failed, falling back to k = 1");
            d
        }
    }
}

/// The throttled value at `now` for a given anchor and count.
pub fn compute_min_deposit(
    cfg: &ThrottlerParams,
    anchor: &LastMinDeposit,
    count: u64,
    now: Timestamp,
) -> Result<Coins, GovernanceError> {
    let (factor, exponent) = if count > cfg.target {
        let step = cfg
            .increase_ratio
            .checked_mul(kth_root(count - cfg.target, cfg.sensitivity))
            .ok_or_else(|| GovernanceError::Invariant("throttler increase overflow".into()))?;
        (Dec::ONE.saturating_add(step), 1)
    } else {
        let step = cfg
            .decrease_ratio
            .checked_mul(kth_root(cfg.target - count, cfg.sensitivity))
            .ok_or_else(|| GovernanceError::Invariant("throttler decrease overflow".into()))?;
        let ticks = anchor.time.elapsed_since(now) / cfg.update_period_secs.max(1);
        (Dec::ONE.saturating_sub(step), ticks)
    };
    let multiplier = factor
        .checked_pow(exponent)
        .ok_or_else(|| GovernanceError::Invariant("throttler factor overflow".into()))?;

    let mut coins = Vec::with_capacity(cfg.floor_value.len());
    for floor in cfg.floor_value.iter() {
        let base = match anchor.value.amount_of(&floor.denom) {
            0 => floor.amount,
            n => n,
        };
        let scaled = multiplier
            .mul_int_truncate(base)
            .ok_or_else(|| GovernanceError::Invariant("min deposit overflow".into()))?;
        coins.push(Coin::new(floor.denom.clone(), scaled.max(floor.amount)));
    }
    Coins::new(coins).map_err(|e| GovernanceError::Invariant(e.to_string()))
}

pub struct DepositThrottler {
    kind: ThrottlerKind,
}

impl DepositThrottler {
    pub const fn deposit() -> Self {
        Self {
            kind: ThrottlerKind::Deposit,
        }
    }

    pub const fn initial_deposit() -> Self {
        Self {
            kind: ThrottlerKind::InitialDeposit,
        }
    }

    pub fn kind(&self) -> ThrottlerKind {
        self.kind
    }

    fn config<'p>(&self, params: &'p Params) -> &'p ThrottlerParams {
        match self.kind {
            ThrottlerKind::Deposit => &params.min_deposit_throttler,
            ThrottlerKind::InitialDeposit => &params.min_initial_deposit_throttler,
        }
    }

    fn count(&self, state: &GovState<'_>) -> Result<u64, GovernanceError> {
        match self.kind {
            ThrottlerKind::Deposit => state.active_count(),
            ThrottlerKind::InitialDeposit => state.inactive_count(),
        }
    }

    /// The stored anchor, or the floor anchored at `now`.
    fn anchor(
        &self,
        state: &GovState<'_>,
        params: &Params,
        now: Timestamp,
    ) -> Result<LastMinDeposit, GovernanceError> {
        let stored = match self.kind {
            ThrottlerKind::Deposit => state.last_min_deposit()?,
            ThrottlerKind::InitialDeposit => state.last_min_initial_deposit()?,
        };
        Ok(stored.unwrap_or_else(|| LastMinDeposit {
            value: self.config(params).floor_value.clone(),
            time: now,
        }))
    }

    fn set_anchor(&self, state: &GovState<'_>, anchor: &LastMinDeposit) -> Result<(), GovernanceError> {
        match self.kind {
            ThrottlerKind::Deposit => state.set_last_min_deposit(anchor),
            ThrottlerKind::InitialDeposit => state.set_last_min_initial_deposit(anchor),
        }
    }

    /// The current minimum.
    pub fn current(
        &self,
        state: &GovState<'_>,
        params: &Params,
        now: Timestamp,
    ) -> Result<Coins, GovernanceError> {
        let anchor = self.anchor(state, params, now)?;
        compute_min_deposit(self.config(params), &anchor, self.count(state)?, now)
    }

    /// Re-anchor at the current value. Call before the driving count changes.
    pub fn re_anchor(
        &self,
        state: &GovState<'_>,
        params: &Params,
        now: Timestamp,
    ) -> Result<Coins, GovernanceError> {
        let value = self.current(state, params, now)?;
        debug!(throttler = ?self.kind, min = %value, "throttler re-anchored");
        self.set_anchor(
            state,
            &LastMinDeposit {
                value: value.clone(),
                time: now,
            },
        )?;
        Ok(value)
    }

    /// Time-triggered decrease. No-op unless the count is at or below the
    /// target and at least one full update period has elapsed.
    pub fn on_tick(
        &self,
        state: &GovState<'_>,
        params: &Params,
        now: Timestamp,
    ) -> Result<(), GovernanceError> {
        let cfg = self.config(params);
        if self.count(state)? > cfg.target {
            return Ok(());
        }
        let anchor = self.anchor(state, params, now)?;
        if anchor.time.elapsed_since(now) < cfg.update_period_secs {
            return Ok(());
        }
        self.re_anchor(state, params, now)?;
        Ok(())
    }
}
