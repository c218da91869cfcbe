//! Read-only query surface.
//!
//! Queries never mutate the ledger and serialize cleanly to JSON for
//! external clients. Live and past auctions both come back as full
//! records; the past ones are the immutable snapshots taken at close.

use serde::{Deserialize, Serialize};

use fee_auction_store::KvStore;
use fee_auction_types::{Auction, AuctionId};

use crate::keeper::Keeper;
use crate::keepers::{BankKeeper, StakingKeeper};

/// Query request types.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum AuctionQuery {
    /// Get one auction by ID.
    GetAuction { auction_id: AuctionId },

    /// All auctions not yet closed, in expiry order.
    ListLive,

    /// Closed-auction records, in expiry order.
    ListPast,
}

/// Query response types.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum AuctionQueryResponse {
    Auction(Option<Auction>),
    Live(Vec<Auction>),
    Past(Vec<Auction>),
}

/// Handle a query.
pub fn handle_query<S, B, K>(
    keeper: &Keeper<S, B, K>,
    query: AuctionQuery,
) -> AuctionQueryResponse
where
    S: KvStore,
    B: BankKeeper,
    K: StakingKeeper,
{
    match query {
        AuctionQuery::GetAuction { auction_id } => {
            AuctionQueryResponse::Auction(keeper.get_auction(auction_id))
        }
        AuctionQuery::ListLive => AuctionQueryResponse::Live(keeper.live_auctions()),
        AuctionQuery::ListPast => AuctionQueryResponse::Past(keeper.past_auctions()),
    }
}
