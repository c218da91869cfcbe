//! Per-block lifecycle driver.
//!
//! Runs exactly once per block, after every transaction in the block has
//! been applied. Opening always happens before the expiry sweep, so an
//! auction opened here closes no earlier than `auction_duration` blocks
//! later and can never appear in its own block's sweep.

use tracing::info;

use fee_auction_store::KvStore;
use fee_auction_types::{Auction, AuctionId};

use crate::events::AuctionEvent;
use crate::keeper::Keeper;
use crate::keepers::{BankKeeper, StakingKeeper};

/// Drive the auction lifecycle for the block at `height`.
///
/// On schedule blocks (`height % frequency == trigger_offset`) the fee
/// pools are swept and one forward auction opens per collected
/// denomination. Then every auction whose closing height has been reached
/// is closed and settled.
///
/// # Panics
///
/// A close failure here means an invariant was broken earlier (the expiry
/// sweep only returns auctions that are present and closable, and
/// settlement at close cannot fail for bids that passed placement-time
/// validation). Continuing would diverge from other nodes, so this halts.
pub fn run_end_block<S, B, K>(keeper: &mut Keeper<S, B, K>, height: u64) -> Vec<AuctionEvent>
where
    S: KvStore,
    B: BankKeeper,
    K: StakingKeeper,
{
    let mut events = Vec::new();

    let params = keeper.params();
    if height % params.auction_frequency == params.trigger_offset {
        let pools = keeper.staking_mut().collect_fee_pools_for_auction();
        for lot in pools {
            let id = keeper.start_forward_auction(height, lot.clone());
            let end_time = expect_auction(keeper, id).end_time();
            events.push(AuctionEvent::AuctionStarted { id, lot, end_time });
        }
    }

    for aref in keeper.expire_auctions(height) {
        match keeper.close_auction(height, aref.id) {
            Ok(event) => events.push(event),
            Err(err) => panic!("failed to close expired auction {}: {err}", aref.id),
        }
    }

    if !events.is_empty() {
        info!(height, count = events.len(), "end-block auction events");
    }
    events
}

fn expect_auction<S, B, K>(keeper: &Keeper<S, B, K>, id: AuctionId) -> Auction
where
    S: KvStore,
    B: BankKeeper,
    K: StakingKeeper,
{
    keeper
        .get_auction(id)
        .unwrap_or_else(|| panic!("freshly started auction {id} is missing"))
}
