//! Core type definitions for the fee-auction module.
//!
//! This crate provides the shared data structures used across the auction
//! system: account addresses, coins, auction identifiers, and the auction
//! entity with its bid-acceptance logic. Everything here is pure data with
//! no I/O; all amounts are exact integers and all comparisons are
//! deterministic.

use std::fmt;
use std::str::FromStr;

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};
use serde_with::serde_as;

pub mod auction;
pub mod params;

pub use auction::{Auction, AuctionRef, Bid, BidError, ForwardAuction};
pub use params::{AuctionParams, InvalidParamsError};

// =========================
// ADDRESSES
// =========================

/// Account address (20 bytes), hex-encoded in JSON.
#[serde_as]
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    BorshSerialize,
    BorshDeserialize,
    Serialize,
    Deserialize,
)]
pub struct Address(#[serde_as(as = "serde_with::hex::Hex")] pub [u8; 20]);

impl Address {
    pub const LEN: usize = 20;
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

// =========================
// COINS
// =========================

/// A denominated amount. Amounts are non-negative integers; two coins are
/// only comparable or addable when their denominations match.
#[derive(
    Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize,
)]
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

    /// A zero-amount coin, used to seed the opening bid of a new auction.
    pub fn zero(denom: impl Into<String>) -> Self {
        Self::new(denom, 0)
    }

    pub fn is_zero(&self) -> bool {
        self.amount == 0
    }

    pub fn same_denom(&self, other: &Coin) -> bool {
        self.denom == other.denom
    }

    /// Checked same-denomination addition.
    pub fn checked_add(&self, other: &Coin) -> Result<Coin, CoinError> {
        if !self.same_denom(other) {
            return Err(CoinError::DenomMismatch {
                left: self.denom.clone(),
                right: other.denom.clone(),
            });
        }
        let amount = self
            .amount
            .checked_add(other.amount)
            .ok_or(CoinError::Overflow)?;
        Ok(Coin::new(self.denom.clone(), amount))
    }
}

impl fmt::Display for Coin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.amount, self.denom)
    }
}

/// Errors from coin arithmetic.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoinError {
    #[error("denomination mismatch: {left} vs {right}")]
    DenomMismatch { left: String, right: String },

    #[error("amount overflow")]
    Overflow,
}

// =========================
// AUCTION IDENTIFIERS
// =========================

/// Unique auction identifier. Assigned monotonically at creation, never
/// reused. Encoded big-endian when used as a store key so that direct
/// iteration over auction records visits them in creation order.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    BorshSerialize,
    BorshDeserialize,
    Serialize,
    Deserialize,
)]
pub struct AuctionId(pub u64);

impl AuctionId {
    pub fn to_be_bytes(self) -> [u8; 8] {
        self.0.to_be_bytes()
    }
}

impl fmt::Display for AuctionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for AuctionId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(AuctionId(s.parse()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coin_checked_add() {
        let a = Coin::new("uatom", 10);
        let b = Coin::new("uatom", 32);
        assert_eq!(a.checked_add(&b), Ok(Coin::new("uatom", 42)));
    }

    #[test]
    fn test_coin_denom_mismatch() {
        let a = Coin::new("uatom", 10);
        let b = Coin::new("photon", 1);
        assert!(matches!(
            a.checked_add(&b),
            Err(CoinError::DenomMismatch { .. })
        ));
    }

    #[test]
    fn test_coin_overflow() {
        let a = Coin::new("uatom", u128::MAX);
        let b = Coin::new("uatom", 1);
        assert_eq!(a.checked_add(&b), Err(CoinError::Overflow));
    }

    #[test]
    fn test_auction_id_from_str() {
        assert_eq!("17".parse::<AuctionId>(), Ok(AuctionId(17)));
        assert!("not-a-number".parse::<AuctionId>().is_err());
    }

    #[test]
    fn test_coin_display() {
        assert_eq!(Coin::new("uatom", 100).to_string(), "100uatom");
    }
}
