//! Structured events describing auction state transitions.
//!
//! Handlers and the end-blocker return these so the surrounding chain can
//! index them per block (the equivalent of the SDK's tag system).

use serde::{Deserialize, Serialize};

use fee_auction_types::{Address, AuctionId, Coin};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuctionEvent {
    /// A new auction opened for a swept fee pool.
    AuctionStarted {
        id: AuctionId,
        lot: Coin,
        end_time: u64,
    },

    /// A bid was accepted as the new highest.
    BidPlaced {
        id: AuctionId,
        bidder: Address,
        amount: Coin,
        height: u64,
        new_end_time: u64,
    },

    /// An auction closed and settled. `winner` is absent when the lot went
    /// unsold and rolled back into the pool.
    AuctionClosed {
        id: AuctionId,
        winner: Option<Address>,
        amount: Coin,
    },
}
