//! RPC-compatible types for the mock chain.
//!
//! JSON mirrors of the module types: addresses as hex strings, amounts as
//! decimal strings so clients never hit JSON number limits.

use serde::{Deserialize, Serialize};

use fee_auction_types::{Auction, Coin};

/// Current chain position.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockInfo {
    pub height: u64,
}

/// Result of advancing one block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockResult {
    pub height: u64,
    pub events: Vec<fee_auction_module::AuctionEvent>,
}

/// Coin for RPC.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoinRpc {
    pub denom: String,
    /// Decimal string
    pub amount: String,
}

impl From<&Coin> for CoinRpc {
    fn from(coin: &Coin) -> Self {
        Self {
            denom: coin.denom.clone(),
            amount: coin.amount.to_string(),
        }
    }
}

/// Auction record for RPC.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuctionRpc {
    pub id: u64,
    pub kind: String,
    pub lot: CoinRpc,
    pub bid: CoinRpc,
    /// Hex-encoded bidder address, absent until the first bid
    pub bidder: Option<String>,
    pub end_time: u64,
    pub max_end_time: u64,
}

impl From<&Auction> for AuctionRpc {
    fn from(auction: &Auction) -> Self {
        let Auction::Forward(a) = auction;
        Self {
            id: a.id.0,
            kind: "forward".to_string(),
            lot: CoinRpc::from(&a.lot),
            bid: CoinRpc::from(&a.bid),
            bidder: a.bidder.map(|b| b.to_string()),
            end_time: a.end_time,
            max_end_time: a.max_end_time,
        }
    }
}

/// Parameters for placing a bid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceBidParams {
    /// Hex-encoded bidder address
    pub sender: String,
    pub auction_id: u64,
    pub denom: String,
    /// Decimal string
    pub amount: String,
}
