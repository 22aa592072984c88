//! Multi-denomination token amounts.
//!
//! `Coins` is always sorted by denom with no duplicates and no zero
//! amounts, so two equal sets of coins have one canonical encoding.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::AgoraError;

/// A single denomination amount, e.g. `10stake`.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Coin {
    pub denom: String,
    pub amount: u128,
}

impl Coin {
    pub fn new(denom: impl Into<String>, amount: u128) -> Self {
        Self {
            denom: denom.into(),
            amount,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.amount == 0
    }
}

impl fmt::Display for Coin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.amount, self.denom)
    }
}

/// Whether `denom` is a well-formed denomination.
///
/// 3 to 128 characters, starting with a letter, then letters, digits or `/`.
pub fn is_valid_denom(denom: &str) -> bool {
    let bytes = denom.as_bytes();
    (3..=128).contains(&bytes.len())
        && bytes[0].is_ascii_alphabetic()
        && bytes
            .iter()
            .all(|b| b.is_ascii_alphanumeric() || *b == b'/')
}

/// A canonical set of coins.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Coins(Vec<Coin>);

impl Coins {
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    /// Build a canonical set: validates denoms, rejects duplicates, drops
    /// zero amounts and sorts by denom.
    pub fn new(coins: Vec<Coin>) -> Result<Self, AgoraError> {
        let mut coins: Vec<Coin> = coins.into_iter().filter(|c| !c.is_zero()).collect();
        coins.sort_by(|a, b| a.denom.cmp(&b.denom));
        for window in coins.windows(2) {
            if window[0].denom == window[1].denom {
                return Err(AgoraError::InvalidCoins(format!(
                    "duplicate denom {}",
                    window[0].denom
                )));
            }
        }
        if let Some(bad) = coins.iter().find(|c| !is_valid_denom(&c.denom)) {
            return Err(AgoraError::InvalidCoins(format!("invalid denom {}", bad.denom)));
        }
        Ok(Self(coins))
    }

    /// A single-denom set.
    pub fn single(denom: impl Into<String>, amount: u128) -> Self {
        let coin = Coin::new(denom, amount);
        if coin.is_zero() {
            Self::empty()
        } else {
            Self(vec![coin])
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Coin> {
        self.0.iter()
    }

    pub fn denoms(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|c| c.denom.as_str())
    }

    /// Amount of `denom`, zero if absent.
    pub fn amount_of(&self, denom: &str) -> u128 {
        self.0
            .binary_search_by(|c| c.denom.as_str().cmp(denom))
            .map(|i| self.0[i].amount)
            .unwrap_or(0)
    }

    /// Whether every coin of `self` is well-formed and canonical.
    pub fn is_valid(&self) -> bool {
        self.0.iter().all(|c| !c.is_zero() && is_valid_denom(&c.denom))
            && self.0.windows(2).all(|w| w[0].denom < w[1].denom)
    }

    pub fn checked_add(&self, other: &Coins) -> Option<Coins> {
        let mut out: Vec<Coin> = self.0.clone();
        for coin in &other.0 {
            match out.binary_search_by(|c| c.denom.cmp(&coin.denom)) {
                Ok(i) => out[i].amount = out[i].amount.checked_add(coin.amount)?,
                Err(i) => out.insert(i, coin.clone()),
            }
        }
        Some(Self(out))
    }

    /// `self - other`, `None` if any denom would go negative.
    pub fn checked_sub(&self, other: &Coins) -> Option<Coins> {
        let mut out: Vec<Coin> = self.0.clone();
        for coin in &other.0 {
            let i = out.binary_search_by(|c| c.denom.cmp(&coin.denom)).ok()?;
            out[i].amount = out[i].amount.checked_sub(coin.amount)?;
        }
        out.retain(|c| !c.is_zero());
        Some(Self(out))
    }

    /// Every denom of `other` is present in `self` with at least the same amount.
    pub fn is_all_gte(&self, other: &Coins) -> bool {
        other.0.iter().all(|c| self.amount_of(&c.denom) >= c.amount)
    }

    /// Every denom of `self` appears in `allowed`.
    pub fn denoms_subset_of(&self, allowed: &Coins) -> bool {
        self.0.iter().all(|c| allowed.amount_of(&c.denom) > 0)
    }
}

impl From<Coin> for Coins {
    fn from(coin: Coin) -> Self {
        Self::single(coin.denom, coin.amount)
    }
}

impl fmt::Display for Coins {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|c| c.to_string()).collect();
        write!(f, "{}", parts.join(","))
    }
}

impl FromStr for Coins {
    type Err = AgoraError;

    /// Parse `"10stake,5atom"`. The empty string is the empty set.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Ok(Self::empty());
        }
        let mut coins = Vec::new();
        for part in s.split(',') {
            let part = part.trim();
            let split = part
                .find(|ch: char| !ch.is_ascii_digit())
                .ok_or_else(|| AgoraError::InvalidCoins(part.to_string()))?;
            if split == 0 {
                return Err(AgoraError::InvalidCoins(part.to_string()));
            }
            let amount: u128 = part[..split]
                .parse()
                .map_err(|_| AgoraError::InvalidCoins(part.to_string()))?;
            coins.push(Coin::new(&part[split..], amount));
        }
        Self::new(coins)
    }
}
