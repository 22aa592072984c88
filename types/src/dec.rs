//! Fixed-point decimal with 18 fractional digits.
//!
//! Every ratio in the engine (quorum, threshold, EMA, throttler factors,
//! validator shares and voting power) is a `Dec`. Values are unsigned
//! 256-bit raw integers scaled by 10^18, so arithmetic is exact integer
//! math and every replica truncates the same way. Any u128 token amount is
//! representable. Products and quotients go through a 512-bit intermediate
//! and only fail when the final result does not fit.

use ruint::aliases::{U256, U512};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::AgoraError;

/// Number of fractional decimal digits.
pub const PRECISION: usize = 18;

const SCALE_U64: u64 = 1_000_000_000_000_000_000;
const SCALE: U256 = U256::from_limbs([SCALE_U64, 0, 0, 0]);
const RAW_ONE: U256 = U256::from_limbs([1, 0, 0, 0]);

/// Largest root degree `approx_root` accepts.
pub const MAX_ROOT_DEGREE: u64 = 100;

/// Unsigned 18-digit fixed-point decimal.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Dec(U256);

impl Dec {
    pub const ZERO: Self = Self(U256::ZERO);
    pub const ONE: Self = Self(SCALE);
    pub const MAX: Self = Self(U256::MAX);
    /// The smallest positive value (10^-18).
    pub const SMALLEST: Self = Self(RAW_ONE);

    /// Build from a raw scaled integer.
    pub const fn from_raw(raw: u128) -> Self {
        Self(U256::from_limbs([raw as u64, (raw >> 64) as u64, 0, 0]))
    }

    pub fn from_int(n: u64) -> Self {
        Self::from_u128(n as u128)
    }

    /// Whole-number value. Every u128 fits.
    pub fn from_u128(n: u128) -> Self {
        Self(U256::from(n) * SCALE)
    }

    /// `num / den` as a decimal.
    pub fn from_ratio(num: u128, den: u128) -> Option<Self> {
        mul_div(U256::from(num), SCALE, U256::from(den)).map(Self)
    }

    /// `n` hundredths (e.g. `percent(5)` is 0.05).
    pub fn percent(n: u64) -> Self {
        Self(U256::from(n) * U256::from(SCALE_U64 / 100))
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    pub fn checked_sub(self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }

    pub fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }

    pub fn saturating_sub(self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }

    /// Truncating product.
    pub fn checked_mul(self, other: Self) -> Option<Self> {
        mul_div(self.0, other.0, SCALE).map(Self)
    }

    /// Truncating quotient; `None` on division by zero or overflow.
    pub fn checked_quo(self, other: Self) -> Option<Self> {
        mul_div(self.0, SCALE, other.0).map(Self)
    }

    /// `self * n` truncated to an integer (e.g. scaling a coin amount).
    pub fn mul_int_truncate(self, n: u128) -> Option<u128> {
        let whole = mul_div(self.0, U256::from(n), SCALE)?;
        u128::try_from(whole).ok()
    }

    /// `self * n / d` keeping full fractional precision.
    ///
    /// This is the stake-to-power conversion
    /// `shares * bonded_tokens / delegator_shares`.
    pub fn mul_int_quo(self, n: u128, d: Self) -> Option<Self> {
        if d.is_zero() {
            return None;
        }
        let num = U512::from(self.0)
            .checked_mul(U512::from(n))?
            .checked_mul(U512::from(SCALE))?;
        U256::checked_from_uint(num / U512::from(d.0)).map(Self)
    }

    /// Integer part, fractional digits dropped. `None` above `u128::MAX`.
    pub fn checked_truncate(&self) -> Option<u128> {
        u128::try_from(self.0 / SCALE).ok()
    }

    /// `self^n` by repeated squaring with truncation at every step.
    pub fn checked_pow(self, mut n: u64) -> Option<Self> {
        let mut base = self;
        let mut acc = Self::ONE;
        while n > 0 {
            if n & 1 == 1 {
                acc = acc.checked_mul(base)?;
            }
            n >>= 1;
            if n > 0 {
                base = base.checked_mul(base)?;
            }
        }
        Some(acc)
    }

    /// Largest decimal `r` such that `r^k <= self`.
    ///
    /// Bisection over raw values, so the result is exact to the last digit
    /// and identical on every platform. Fails for `k == 0` or
    /// `k > MAX_ROOT_DEGREE`; callers fall back to `k = 1`.
    pub fn approx_root(self, k: u64) -> Result<Self, AgoraError> {
        if k == 0 || k > MAX_ROOT_DEGREE {
            return Err(AgoraError::RootOutOfRange(k));
        }
        if k == 1 || self.is_zero() || self == Self::ONE {
            return Ok(self);
        }
        let mut lo = U256::ZERO;
        let mut hi = if self > Self::ONE { self.0 } else { SCALE };
        while lo < hi {
            // upper midpoint, so `lo = mid` always makes progress
            let gap = hi - lo;
            let mid = lo + (gap >> 1) + (gap & RAW_ONE);
            match Self(mid).checked_pow(k) {
                Some(p) if p <= self => lo = mid,
                _ => hi = mid - RAW_ONE,
            }
        }
        Ok(Self(lo))
    }

    pub fn min(self, other: Self) -> Self {
        if self <= other {
            self
        } else {
            other
        }
    }

    pub fn max(self, other: Self) -> Self {
        if self >= other {
            self
        } else {
            other
        }
    }
}

impl fmt::Display for Dec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // the remainder is below 10^18 and fits the low limb
        let frac = (self.0 % SCALE).as_limbs()[0];
        write!(f, "{}.{:0width$}", self.0 / SCALE, frac, width = PRECISION)
    }
}

impl fmt::Debug for Dec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Dec({})", self)
    }
}

impl FromStr for Dec {
    type Err = AgoraError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || AgoraError::InvalidDecimal(s.to_string());
        let (int_part, frac_part) = match s.split_once('.') {
            Some((i, f)) => (i, f),
            None => (s, ""),
        };
        if int_part.is_empty() || !int_part.bytes().all(|b| b.is_ascii_digit()) {
            return Err(bad());
        }
        if frac_part.len() > PRECISION || !frac_part.bytes().all(|b| b.is_ascii_digit()) {
            return Err(bad());
        }
        if s.ends_with('.') {
            return Err(bad());
        }
        let whole: U256 = int_part.parse().map_err(|_| AgoraError::Overflow)?;
        let frac: u64 = if frac_part.is_empty() {
            0
        } else {
            let padded = format!("{:0<width$}", frac_part, width = PRECISION);
            padded.parse().map_err(|_| bad())?
        };
        whole
            .checked_mul(SCALE)
            .and_then(|w| w.checked_add(U256::from(frac)))
            .map(Self)
            .ok_or(AgoraError::Overflow)
    }
}

impl Serialize for Dec {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Dec {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// `floor(a * b / d)`, `None` if `d == 0` or the quotient needs more than
/// 256 bits.
fn mul_div(a: U256, b: U256, d: U256) -> Option<U256> {
    let product = U512::from(a).checked_mul(U512::from(b))?;
    let quotient = product.checked_div(U512::from(d))?;
    U256::checked_from_uint(quotient)
}
