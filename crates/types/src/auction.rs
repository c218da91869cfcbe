//! The auction entity and its bid-acceptance logic.
//!
//! An auction here is a forward (ascending-price) auction over a single
//! coin lot. The entity owns the pure state-transition rules: whether a bid
//! is acceptable at a given block height, and how the closing height moves
//! when a bid lands. Coin movement and persistence are the keeper's job.

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

use crate::{Address, AuctionId, Coin};

/// An accepted bid. Only the latest (highest) bid is retained by the
/// registry; `height` records when it was placed for the audit trail.
#[derive(
    Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize,
)]
pub struct Bid {
    pub bidder: Address,
    pub amount: Coin,
    pub height: u64,
}

/// Lightweight scheduling entry: which auction, and the height at which it
/// closes. The authoritative record lives keyed by `id`.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize,
)]
pub struct AuctionRef {
    pub id: AuctionId,
    pub end_time: u64,
}

/// Rejections from the entity-level bid check.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BidError {
    #[error("auction closed at height {end_time}, bid arrived at height {height}")]
    AuctionClosed { height: u64, end_time: u64 },

    #[error("bid of {offered} does not beat the standing bid of {current}")]
    BidTooLow { offered: Coin, current: Coin },

    #[error("bid denomination {offered} does not match settlement denomination {required}")]
    DenomMismatch { offered: String, required: String },
}

/// Forward auction state: bidders compete upward for a fixed lot.
#[derive(
    Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize,
)]
pub struct ForwardAuction {
    pub id: AuctionId,
    /// The coins being given away. Immutable after creation.
    pub lot: Coin,
    /// Highest standing bid. Starts at zero in the settlement denomination.
    pub bid: Coin,
    /// Address of the current highest bidder; absent until the first bid.
    /// While set, this address is owed a refund if outbid and receives the
    /// lot if the auction closes.
    pub bidder: Option<Address>,
    /// Block height at which the auction closes. Bids placed at or before
    /// this height are valid. Moved forward by qualifying bids.
    pub end_time: u64,
    /// Hard ceiling. `end_time` never exceeds this, ever.
    pub max_end_time: u64,
}

impl ForwardAuction {
    pub fn new(
        id: AuctionId,
        lot: Coin,
        initial_bid: Coin,
        end_time: u64,
        max_end_time: u64,
    ) -> Self {
        Self {
            id,
            lot,
            bid: initial_bid,
            bidder: None,
            end_time,
            max_end_time,
        }
    }

    /// Validate and accept a bid, in one step: reject if the auction has
    /// closed or the bid does not strictly beat the standing bid, otherwise
    /// record the new bid/bidder and push the closing height out.
    ///
    /// The new closing height is
    /// `min(max(end_time, height + extension_window), max_end_time)`:
    /// a late bid extends the deadline by the anti-sniping window, but the
    /// deadline never moves backwards and never passes the ceiling.
    pub fn place_bid(
        &mut self,
        height: u64,
        bidder: Address,
        amount: Coin,
        extension_window: u64,
    ) -> Result<Bid, BidError> {
        if height > self.end_time {
            return Err(BidError::AuctionClosed {
                height,
                end_time: self.end_time,
            });
        }
        if !amount.same_denom(&self.bid) {
            return Err(BidError::DenomMismatch {
                offered: amount.denom,
                required: self.bid.denom.clone(),
            });
        }
        // Strictly greater: equal-amount bids are never accepted, so ties
        // cannot arise and no submission-order tie-break exists.
        if amount.amount <= self.bid.amount {
            return Err(BidError::BidTooLow {
                offered: amount,
                current: self.bid.clone(),
            });
        }

        self.bid = amount.clone();
        self.bidder = Some(bidder);
        self.end_time = (height + extension_window)
            .max(self.end_time)
            .min(self.max_end_time);

        Ok(Bid {
            bidder,
            amount,
            height,
        })
    }
}

/// The closed set of auction kinds.
///
/// The surrounding chain only ever opens forward auctions today, but
/// settlement routing and bid acceptance dispatch on the kind so that any
/// future kind must be handled exhaustively.
#[derive(
    Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize,
)]
pub enum Auction {
    Forward(ForwardAuction),
}

impl Auction {
    pub fn id(&self) -> AuctionId {
        match self {
            Auction::Forward(a) => a.id,
        }
    }

    pub fn lot(&self) -> &Coin {
        match self {
            Auction::Forward(a) => &a.lot,
        }
    }

    pub fn bid(&self) -> &Coin {
        match self {
            Auction::Forward(a) => &a.bid,
        }
    }

    pub fn bidder(&self) -> Option<Address> {
        match self {
            Auction::Forward(a) => a.bidder,
        }
    }

    /// Closing height. Auctions close at the end of the block with this
    /// height, so bids placed in that block are still valid.
    pub fn end_time(&self) -> u64 {
        match self {
            Auction::Forward(a) => a.end_time,
        }
    }

    pub fn max_end_time(&self) -> u64 {
        match self {
            Auction::Forward(a) => a.max_end_time,
        }
    }

    pub fn place_bid(
        &mut self,
        height: u64,
        bidder: Address,
        amount: Coin,
        extension_window: u64,
    ) -> Result<Bid, BidError> {
        match self {
            Auction::Forward(a) => a.place_bid(height, bidder, amount, extension_window),
        }
    }

    pub fn to_ref(&self) -> AuctionRef {
        AuctionRef {
            id: self.id(),
            end_time: self.end_time(),
        }
    }
}

impl std::fmt::Display for Auction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Auction::Forward(a) => write!(
                f,
                "forward auction {}: lot {}, bid {}, closes at {} (ceiling {})",
                a.id, a.lot, a.bid, a.end_time, a.max_end_time
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(n: u8) -> Address {
        Address([n; 20])
    }

    fn auction(end_time: u64) -> ForwardAuction {
        ForwardAuction::new(
            AuctionId(1),
            Coin::new("photon", 100),
            Coin::zero("uatom"),
            end_time,
            end_time,
        )
    }

    #[test]
    fn test_initial_window_below_ceiling_extends() {
        // Opens with a 5-block window under a 10-block ceiling: a late bid
        // extends past the initial deadline, up to the ceiling.
        let mut a = ForwardAuction::new(
            AuctionId(1),
            Coin::new("photon", 100),
            Coin::zero("uatom"),
            5,
            10,
        );
        a.place_bid(4, addr(1), Coin::new("uatom", 1), 3).unwrap();
        assert_eq!(a.end_time, 7);
        a.place_bid(7, addr(2), Coin::new("uatom", 2), 3).unwrap();
        assert_eq!(a.end_time, 10);
    }

    #[test]
    fn test_first_bid_accepted_deadline_not_shortened() {
        // Lot 100, endTime 100. A bid at height 50 with a small extension
        // window leaves the deadline where it was.
        let mut a = auction(100);
        let bid = a
            .place_bid(50, addr(1), Coin::new("uatom", 10), 3)
            .unwrap();
        assert_eq!(bid.height, 50);
        assert_eq!(a.bid, Coin::new("uatom", 10));
        assert_eq!(a.bidder, Some(addr(1)));
        assert_eq!(a.end_time, 100);
    }

    #[test]
    fn test_lower_bid_rejected() {
        let mut a = auction(100);
        a.place_bid(50, addr(1), Coin::new("uatom", 10), 3).unwrap();
        let err = a
            .place_bid(51, addr(2), Coin::new("uatom", 5), 3)
            .unwrap_err();
        assert!(matches!(err, BidError::BidTooLow { .. }));
        assert_eq!(a.bidder, Some(addr(1)));
    }

    #[test]
    fn test_equal_bid_rejected() {
        let mut a = auction(100);
        a.place_bid(50, addr(1), Coin::new("uatom", 10), 3).unwrap();
        let err = a
            .place_bid(51, addr(2), Coin::new("uatom", 10), 3)
            .unwrap_err();
        assert!(matches!(err, BidError::BidTooLow { .. }));
    }

    #[test]
    fn test_extension_clamped_to_ceiling() {
        // maxEndTime 60, window 10: a bid at height 55 lands on
        // min(65, 60) = 60.
        let mut a = auction(60);
        a.place_bid(55, addr(1), Coin::new("uatom", 10), 10)
            .unwrap();
        assert_eq!(a.end_time, 60);
        assert_eq!(a.max_end_time, 60);
    }

    #[test]
    fn test_bid_after_end_rejected() {
        let mut a = auction(100);
        let err = a
            .place_bid(101, addr(1), Coin::new("uatom", 10), 3)
            .unwrap_err();
        assert!(matches!(err, BidError::AuctionClosed { .. }));
    }

    #[test]
    fn test_bid_at_end_height_accepted() {
        // Auctions close at the end of the block with height == end_time.
        let mut a = auction(100);
        assert!(a.place_bid(100, addr(1), Coin::new("uatom", 10), 3).is_ok());
    }

    #[test]
    fn test_denom_mismatch_rejected() {
        let mut a = auction(100);
        let err = a
            .place_bid(50, addr(1), Coin::new("photon", 10), 3)
            .unwrap_err();
        assert!(matches!(err, BidError::DenomMismatch { .. }));
    }

    #[test]
    fn test_end_time_never_exceeds_ceiling() {
        let mut a = auction(100);
        let mut amount = 0u128;
        for height in (10..=100).step_by(5) {
            amount += 10;
            a.place_bid(height, addr(1), Coin::new("uatom", amount), 50)
                .unwrap();
            assert!(a.end_time <= a.max_end_time);
        }
    }

    #[test]
    fn test_bid_amount_monotonic() {
        let mut a = auction(1000);
        let mut last = 0u128;
        for (i, offered) in [10u128, 11, 25, 26, 100].into_iter().enumerate() {
            a.place_bid(i as u64, addr(i as u8), Coin::new("uatom", offered), 3)
                .unwrap();
            assert!(a.bid.amount > last);
            last = a.bid.amount;
        }
    }
}
