//! Fee-auction module error types.
//!
//! Everything here is a validation error: it rejects the offending
//! transaction and nothing else. Conditions that would mean divergent
//! state across nodes (a live-index ref without its record, a settlement
//! failure during close) are not represented as variants -- they halt
//! block processing, see the keeper and end-blocker.

use thiserror::Error;

use fee_auction_types::{Address, AuctionId, BidError, Coin};

use crate::keepers::BankError;

/// Errors surfaced to the transaction-processing boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuctionError {
    #[error("auction not found: {0}")]
    AuctionNotFound(AuctionId),

    /// Entity-level rejection: closed, too low, or wrong denomination.
    #[error(transparent)]
    Bid(#[from] BidError),

    #[error("bidder {bidder} lacks the {required} needed to cover the bid")]
    InsufficientFunds { bidder: Address, required: Coin },

    #[error("auction {id} cannot close at height {height}, it runs until height {end_time}")]
    NotYetClosable {
        id: AuctionId,
        height: u64,
        end_time: u64,
    },

    #[error("invalid bid: {0}")]
    InvalidBid(String),

    #[error(transparent)]
    Bank(#[from] BankError),
}
