//! Module parameters.
//!
//! All scheduling knobs are explicit configuration handed to the keeper at
//! construction. Defaults mirror the chain's dev settings (5s block times).

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

/// Configuration for the fee-auction module.
#[derive(
    Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize,
)]
pub struct AuctionParams {
    /// A fee auction round opens every `auction_frequency` blocks.
    pub auction_frequency: u64,

    /// Blocks-into-the-cycle at which the round opens: auctions start when
    /// `height % auction_frequency == trigger_offset`.
    pub trigger_offset: u64,

    /// Initial lifetime of a new auction in blocks. At most
    /// `max_auction_duration`; deployments shorten this to leave headroom
    /// for bid extensions.
    pub auction_duration: u64,

    /// Extension ceiling: no auction outlives its opening height by more
    /// than this many blocks.
    pub max_auction_duration: u64,

    /// Blocks by which a qualifying bid pushes the closing height out.
    pub bid_extension_window: u64,

    /// Denomination winning bids are measured in.
    pub settlement_denom: String,
}

impl AuctionParams {
    pub fn validate(&self) -> Result<(), InvalidParamsError> {
        if self.auction_frequency == 0 {
            return Err(InvalidParamsError(
                "auction frequency cannot be zero".into(),
            ));
        }
        if self.trigger_offset >= self.auction_frequency {
            return Err(InvalidParamsError(
                "trigger offset must be below the auction frequency".into(),
            ));
        }
        if self.auction_duration == 0 {
            return Err(InvalidParamsError("auction duration cannot be zero".into()));
        }
        if self.auction_duration > self.max_auction_duration {
            return Err(InvalidParamsError(
                "auction duration cannot exceed the maximum duration".into(),
            ));
        }
        if self.bid_extension_window > self.max_auction_duration {
            return Err(InvalidParamsError(
                "bid extension window cannot exceed the maximum duration".into(),
            ));
        }
        if self.settlement_denom.is_empty() {
            return Err(InvalidParamsError(
                "settlement denomination must not be empty".into(),
            ));
        }
        Ok(())
    }
}

impl Default for AuctionParams {
    fn default() -> Self {
        Self {
            auction_frequency: 25,    // ~2 min
            trigger_offset: 0,
            auction_duration: 10,     // ~1 min
            max_auction_duration: 10,
            bid_extension_window: 3,  // ~30s
            settlement_denom: "uatom".to_string(),
        }
    }
}

/// Rejected parameter set, with the violated constraint.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid auction parameters: {0}")]
pub struct InvalidParamsError(pub String);
