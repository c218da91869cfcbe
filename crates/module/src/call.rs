//! Call messages: the module's transaction-processing surface.

use borsh::{BorshDeserialize, BorshSerialize};

use fee_auction_store::KvStore;
use fee_auction_types::{Address, AuctionId, Coin};

use crate::error::AuctionError;
use crate::events::AuctionEvent;
use crate::keeper::Keeper;
use crate::keepers::{BankKeeper, StakingKeeper};

/// State-changing messages accepted from signed transactions.
#[derive(Clone, Debug, BorshSerialize, BorshDeserialize)]
pub enum AuctionCall {
    /// Place a bid on a live auction.
    PlaceBid {
        auction_id: AuctionId,
        bidder: Address,
        bid: Coin,
    },
}

impl AuctionCall {
    /// Stateless checks that need no ledger access.
    pub fn validate_basic(&self) -> Result<(), AuctionError> {
        match self {
            AuctionCall::PlaceBid { bid, .. } => {
                if bid.is_zero() {
                    return Err(AuctionError::InvalidBid(
                        "bid amount must be positive".to_string(),
                    ));
                }
                if bid.denom.is_empty() {
                    return Err(AuctionError::InvalidBid(
                        "bid denomination must not be empty".to_string(),
                    ));
                }
                Ok(())
            }
        }
    }
}

/// Process one call against the keeper. Runs during the block's
/// transaction phase; the surrounding ledger discards this call's writes
/// if an error comes back.
pub fn handle_call<S, B, K>(
    keeper: &mut Keeper<S, B, K>,
    height: u64,
    call: AuctionCall,
) -> Result<Vec<AuctionEvent>, AuctionError>
where
    S: KvStore,
    B: BankKeeper,
    K: StakingKeeper,
{
    call.validate_basic()?;
    match call {
        AuctionCall::PlaceBid {
            auction_id,
            bidder,
            bid,
        } => {
            let event = keeper.place_bid(height, auction_id, bidder, bid)?;
            Ok(vec![event])
        }
    }
}
