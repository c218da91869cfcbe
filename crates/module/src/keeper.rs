//! The auction registry.
//!
//! The keeper is the sole authorized mutator of the auction namespace. It
//! owns ID assignment, the authoritative per-ID records, and two derived
//! indices: a live index keyed `(end_time, id)` so expiry is a single
//! range scan, and an append-only past index of closed records. Every
//! mutation goes through [`Keeper::set_auction`] so the live index always
//! reflects the latest closing height.
//!
//! Key space (all under the module's store namespace):
//!
//! ```text
//! next_id                     -> u64 counter
//! auction/<id BE>             -> Auction record
//! live/<end_time BE><id BE>   -> AuctionRef
//! past/<end_time BE><id BE>   -> Auction record (closed, immutable)
//! ```

use tracing::{debug, info};

use fee_auction_store::codec::{encode, must_decode};
use fee_auction_store::KvStore;
use fee_auction_types::{
    Address, Auction, AuctionId, AuctionParams, AuctionRef, Coin, ForwardAuction,
};

use crate::error::AuctionError;
use crate::events::AuctionEvent;
use crate::keepers::{BankKeeper, StakingKeeper};
use crate::settlement;

const NEXT_ID_KEY: &[u8] = b"next_id";
const AUCTION_PREFIX: &[u8] = b"auction/";
const LIVE_PREFIX: &[u8] = b"live/";
const PAST_PREFIX: &[u8] = b"past/";

fn auction_key(id: AuctionId) -> Vec<u8> {
    let mut key = AUCTION_PREFIX.to_vec();
    key.extend_from_slice(&id.to_be_bytes());
    key
}

/// `(end_time, id)` composite key, big-endian so lexicographic store order
/// is expiry order.
fn indexed_key(prefix: &[u8], end_time: u64, id: AuctionId) -> Vec<u8> {
    let mut key = prefix.to_vec();
    key.extend_from_slice(&end_time.to_be_bytes());
    key.extend_from_slice(&id.to_be_bytes());
    key
}

/// Registry over auctions and their scheduling indices.
pub struct Keeper<S, B, K> {
    store: S,
    bank: B,
    staking: K,
    params: AuctionParams,
}

impl<S, B, K> Keeper<S, B, K>
where
    S: KvStore,
    B: BankKeeper,
    K: StakingKeeper,
{
    pub fn new(store: S, bank: B, staking: K, params: AuctionParams) -> Self {
        Self {
            store,
            bank,
            staking,
            params,
        }
    }

    pub fn params(&self) -> &AuctionParams {
        &self.params
    }

    pub fn bank(&self) -> &B {
        &self.bank
    }

    pub fn bank_mut(&mut self) -> &mut B {
        &mut self.bank
    }

    pub fn staking_mut(&mut self) -> &mut K {
        &mut self.staking
    }

    /// Seed the ID counter. Called once, from genesis.
    pub fn init_next_auction_id(&mut self, id: u64) {
        self.store.set(NEXT_ID_KEY, encode(&id));
    }

    /// Hand out the next auction ID and advance the stored counter. The
    /// counter starts at zero on first access and never goes backwards.
    pub fn next_auction_id(&mut self) -> AuctionId {
        let next: u64 = self
            .store
            .get(NEXT_ID_KEY)
            .map(|bz| must_decode(&bz, "next auction id"))
            .unwrap_or(0);
        self.store.set(NEXT_ID_KEY, encode(&(next + 1)));
        AuctionId(next)
    }

    /// Open a forward auction for `lot`, seeded with a zero bid in the
    /// settlement denomination. Closes at `height + auction_duration`,
    /// with bid extensions capped at `height + max_auction_duration`.
    pub fn start_forward_auction(&mut self, height: u64, lot: Coin) -> AuctionId {
        let id = self.next_auction_id();
        let auction = Auction::Forward(ForwardAuction::new(
            id,
            lot,
            Coin::zero(self.params.settlement_denom.clone()),
            height + self.params.auction_duration,
            height + self.params.max_auction_duration,
        ));
        info!(%auction, "starting auction");
        self.set_auction(&auction);
        id
    }

    pub fn get_auction(&self, id: AuctionId) -> Option<Auction> {
        self.store
            .get(&auction_key(id))
            .map(|bz| must_decode(&bz, "auction record"))
    }

    /// Upsert an auction record and re-index it.
    ///
    /// Because bids move `end_time`, any live ref stored under the old
    /// closing height is removed before the current one is written;
    /// the live index therefore holds exactly one ref per live auction,
    /// and writing the same state twice is a no-op.
    pub fn set_auction(&mut self, auction: &Auction) {
        if let Some(existing) = self.get_auction(auction.id()) {
            self.store
                .delete(&indexed_key(LIVE_PREFIX, existing.end_time(), existing.id()));
        }
        self.store.set(&auction_key(auction.id()), encode(auction));
        self.store.set(
            &indexed_key(LIVE_PREFIX, auction.end_time(), auction.id()),
            encode(&auction.to_ref()),
        );
    }

    /// Place a bid on behalf of `bidder`. Validates, escrows the bid and
    /// refunds the displaced bidder, then persists the updated auction.
    /// On any error no state has changed.
    pub fn place_bid(
        &mut self,
        height: u64,
        id: AuctionId,
        bidder: Address,
        amount: Coin,
    ) -> Result<AuctionEvent, AuctionError> {
        let mut auction = self
            .get_auction(id)
            .ok_or(AuctionError::AuctionNotFound(id))?;

        if !self.bank.has_coins(&bidder, &amount) {
            return Err(AuctionError::InsufficientFunds {
                bidder,
                required: amount,
            });
        }

        // The opening zero bid has no bidder and nothing to refund.
        let displaced = auction
            .bidder()
            .map(|prev| (prev, auction.bid().clone()))
            .filter(|(_, bid)| !bid.is_zero());

        // Entity-level acceptance: validate, record bid/bidder, extend the
        // deadline. Rejection leaves the local copy untouched and nothing
        // has been persisted or transferred yet.
        let bid = auction.place_bid(
            height,
            bidder,
            amount,
            self.params.bid_extension_window,
        )?;

        settlement::escrow_bid(&mut self.bank, &bidder, &bid.amount, displaced)?;
        self.set_auction(&auction);

        debug!(id = %id, bidder = %bidder, amount = %bid.amount, "bid accepted");
        Ok(AuctionEvent::BidPlaced {
            id,
            bidder,
            amount: bid.amount,
            height: bid.height,
            new_end_time: auction.end_time(),
        })
    }

    /// Move every auction whose closing height has been reached out of the
    /// live index and into the past index, returning the expired refs for
    /// settlement. Single deterministic range scan in `(end_time, id)`
    /// order; auctions still running stay untouched.
    ///
    /// The past index stores the full record, so closed auctions stay
    /// queryable after close deletes the primary entry.
    pub fn expire_auctions(&mut self, height: u64) -> Vec<AuctionRef> {
        let start = LIVE_PREFIX.to_vec();
        let end = indexed_key(LIVE_PREFIX, height.saturating_add(1), AuctionId(0));
        let expired: Vec<AuctionRef> = self
            .store
            .range(&start, &end, false)
            .map(|(_, bz)| must_decode(&bz, "live auction ref"))
            .collect();

        for aref in &expired {
            let auction = self.get_auction(aref.id).unwrap_or_else(|| {
                panic!("live index refers to missing auction {}", aref.id)
            });
            self.store
                .delete(&indexed_key(LIVE_PREFIX, aref.end_time, aref.id));
            self.store.set(
                &indexed_key(PAST_PREFIX, aref.end_time, aref.id),
                encode(&auction),
            );
        }
        expired
    }

    /// Close and settle an auction whose closing height has been reached,
    /// then delete its record. A second close of the same ID fails with
    /// `AuctionNotFound`.
    pub fn close_auction(
        &mut self,
        height: u64,
        id: AuctionId,
    ) -> Result<AuctionEvent, AuctionError> {
        let auction = self
            .get_auction(id)
            .ok_or(AuctionError::AuctionNotFound(id))?;

        // The end-blocker only hands us refs from the expiry sweep, but
        // close is also reachable directly, so re-check the height.
        if height < auction.end_time() {
            return Err(AuctionError::NotYetClosable {
                id,
                height,
                end_time: auction.end_time(),
            });
        }

        let sold = settlement::settle_close(
            &mut self.staking,
            &auction,
            &self.params.settlement_denom,
        );

        // Complete the live->past transition even when close is invoked
        // directly, without a prior expiry sweep. Both writes are
        // idempotent, so the end-blocker path is unaffected.
        self.store
            .delete(&indexed_key(LIVE_PREFIX, auction.end_time(), id));
        self.store.set(
            &indexed_key(PAST_PREFIX, auction.end_time(), id),
            encode(&auction),
        );
        self.store.delete(&auction_key(id));

        let winner = if sold { auction.bidder() } else { None };
        info!(id = %id, sold, "closed auction");
        Ok(AuctionEvent::AuctionClosed {
            id,
            winner,
            amount: auction.bid().clone(),
        })
    }

    /// Refs of every auction still in the live index, in expiry order.
    pub fn live_refs(&self) -> Vec<AuctionRef> {
        self.scan_refs(LIVE_PREFIX)
    }

    /// Full records of every live auction, in expiry order.
    ///
    /// A ref whose record is missing means the namespace invariant was
    /// broken by an outside writer; that halts rather than serving
    /// divergent answers.
    pub fn live_auctions(&self) -> Vec<Auction> {
        self.live_refs()
            .into_iter()
            .map(|aref| {
                self.get_auction(aref.id).unwrap_or_else(|| {
                    panic!("live index refers to missing auction {}", aref.id)
                })
            })
            .collect()
    }

    /// Full records of every closed auction, in expiry order. These are
    /// the final snapshots taken at close: lot, winning bidder and amount
    /// stay queryable after the primary record is deleted.
    pub fn past_auctions(&self) -> Vec<Auction> {
        let end = fee_auction_store::prefix_end(PAST_PREFIX)
            .unwrap_or_else(|| panic!("index prefix must have an upper bound"));
        self.store
            .range(PAST_PREFIX, &end, false)
            .map(|(_, bz)| must_decode(&bz, "past auction record"))
            .collect()
    }

    fn scan_refs(&self, prefix: &[u8]) -> Vec<AuctionRef> {
        let end = fee_auction_store::prefix_end(prefix)
            .unwrap_or_else(|| panic!("index prefix must have an upper bound"));
        self.store
            .range(prefix, &end, false)
            .map(|(_, bz)| must_decode(&bz, "auction ref"))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{addr, params, TestBank, TestStaking};
    use fee_auction_store::MemStore;

    type TestKeeper = Keeper<MemStore, TestBank, TestStaking>;

    fn keeper() -> TestKeeper {
        Keeper::new(MemStore::new(), TestBank::new(), TestStaking::new(), params())
    }

    fn keeper_with_balances(balances: &[(Address, &str, u128)]) -> TestKeeper {
        let mut bank = TestBank::new();
        for (address, denom, amount) in balances {
            bank.fund(*address, Coin::new(*denom, *amount));
        }
        Keeper::new(MemStore::new(), bank, TestStaking::new(), params())
    }

    #[test]
    fn test_next_auction_id_monotonic() {
        let mut k = keeper();
        assert_eq!(k.next_auction_id(), AuctionId(0));
        assert_eq!(k.next_auction_id(), AuctionId(1));
        assert_eq!(k.next_auction_id(), AuctionId(2));
    }

    #[test]
    fn test_start_forward_auction() {
        let mut k = keeper();
        let id = k.start_forward_auction(100, Coin::new("photon", 500));

        let auction = k.get_auction(id).unwrap();
        assert_eq!(auction.lot(), &Coin::new("photon", 500));
        assert_eq!(auction.bid(), &Coin::zero("uatom"));
        assert_eq!(auction.bidder(), None);
        assert_eq!(auction.end_time(), 110); // height + max duration
        assert_eq!(auction.max_end_time(), 110);
        assert_eq!(k.live_refs().len(), 1);
    }

    #[test]
    fn test_set_auction_reindexes_on_end_time_change() {
        let mut k = keeper();
        let id = k.start_forward_auction(0, Coin::new("photon", 500));

        let mut auction = k.get_auction(id).unwrap();
        let Auction::Forward(ref mut fwd) = auction;
        fwd.end_time = 7;
        k.set_auction(&auction);

        let refs = k.live_refs();
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].end_time, 7);
    }

    #[test]
    fn test_set_auction_idempotent() {
        let mut k = keeper();
        let id = k.start_forward_auction(0, Coin::new("photon", 500));

        let auction = k.get_auction(id).unwrap();
        k.set_auction(&auction);
        k.set_auction(&auction);

        assert_eq!(k.live_refs().len(), 1);
    }

    #[test]
    fn test_place_bid_escrow_and_refund() {
        let (a, b) = (addr(1), addr(2));
        let mut k = keeper_with_balances(&[(a, "uatom", 50), (b, "uatom", 50)]);
        let id = k.start_forward_auction(0, Coin::new("photon", 500));

        k.place_bid(1, id, a, Coin::new("uatom", 10)).unwrap();
        assert_eq!(k.bank().balance(&a, "uatom"), 40);

        // B outbids A: A is refunded the full 10, B escrows 20.
        k.place_bid(2, id, b, Coin::new("uatom", 20)).unwrap();
        assert_eq!(k.bank().balance(&a, "uatom"), 50);
        assert_eq!(k.bank().balance(&b, "uatom"), 30);

        let auction = k.get_auction(id).unwrap();
        assert_eq!(auction.bidder(), Some(b));
        assert_eq!(auction.bid(), &Coin::new("uatom", 20));
    }

    #[test]
    fn test_place_bid_insufficient_funds() {
        let a = addr(1);
        let mut k = keeper_with_balances(&[(a, "uatom", 5)]);
        let id = k.start_forward_auction(0, Coin::new("photon", 500));

        let err = k.place_bid(1, id, a, Coin::new("uatom", 10)).unwrap_err();
        assert!(matches!(err, AuctionError::InsufficientFunds { .. }));
        assert_eq!(k.bank().balance(&a, "uatom"), 5);
        assert_eq!(k.get_auction(id).unwrap().bidder(), None);
    }

    #[test]
    fn test_place_bid_unknown_auction() {
        let mut k = keeper();
        let err = k
            .place_bid(1, AuctionId(9), addr(1), Coin::new("uatom", 10))
            .unwrap_err();
        assert_eq!(err, AuctionError::AuctionNotFound(AuctionId(9)));
    }

    #[test]
    fn test_rejected_bid_moves_no_coins() {
        let (a, b) = (addr(1), addr(2));
        let mut k = keeper_with_balances(&[(a, "uatom", 50), (b, "uatom", 50)]);
        let id = k.start_forward_auction(0, Coin::new("photon", 500));

        k.place_bid(1, id, a, Coin::new("uatom", 20)).unwrap();
        let err = k.place_bid(2, id, b, Coin::new("uatom", 20)).unwrap_err();
        assert!(matches!(err, AuctionError::Bid(_)));
        assert_eq!(k.bank().balance(&a, "uatom"), 30);
        assert_eq!(k.bank().balance(&b, "uatom"), 50);
    }

    #[test]
    fn test_expire_partitions_by_end_time() {
        let mut k = keeper();
        // End times 10 and 20 (max duration 10).
        let early = k.start_forward_auction(0, Coin::new("photon", 1));
        let late = k.start_forward_auction(10, Coin::new("photon", 2));

        let expired = k.expire_auctions(15);
        assert_eq!(expired.len(), 1);
        assert_eq!(expired[0].id, early);

        let live = k.live_refs();
        assert_eq!(live.len(), 1);
        assert_eq!(live[0].id, late);
        assert_eq!(k.past_auctions().len(), 1);
    }

    #[test]
    fn test_expire_boundary_inclusive() {
        let mut k = keeper();
        let id = k.start_forward_auction(0, Coin::new("photon", 1)); // ends at 10

        assert!(k.expire_auctions(9).is_empty());
        let expired = k.expire_auctions(10);
        assert_eq!(expired.len(), 1);
        assert_eq!(expired[0].id, id);
    }

    #[test]
    fn test_expiry_tracks_extended_end_time() {
        let a = addr(1);
        let mut k = keeper_with_balances(&[(a, "uatom", 50)]);
        let id = k.start_forward_auction(0, Coin::new("photon", 1)); // ends at 10

        // A bid at height 9 would extend the close to 12, but the ceiling
        // clamps it at 10.
        k.place_bid(9, id, a, Coin::new("uatom", 1)).unwrap();
        assert!(k.expire_auctions(9).is_empty());
        assert_eq!(k.expire_auctions(10).len(), 1);
    }

    #[test]
    fn test_close_before_end_rejected() {
        let mut k = keeper();
        let id = k.start_forward_auction(0, Coin::new("photon", 1));

        let err = k.close_auction(5, id).unwrap_err();
        assert!(matches!(err, AuctionError::NotYetClosable { .. }));
        assert!(k.get_auction(id).is_some());
    }

    #[test]
    fn test_close_exactly_once() {
        let a = addr(1);
        let mut k = keeper_with_balances(&[(a, "uatom", 50)]);
        let id = k.start_forward_auction(0, Coin::new("photon", 500));
        k.place_bid(1, id, a, Coin::new("uatom", 10)).unwrap();

        let event = k.close_auction(10, id).unwrap();
        assert_eq!(
            event,
            AuctionEvent::AuctionClosed {
                id,
                winner: Some(a),
                amount: Coin::new("uatom", 10),
            }
        );
        assert_eq!(
            k.staking.repatriated,
            vec![(Coin::new("photon", 500), Coin::new("uatom", 10))]
        );

        // Record is gone and the index entry moved to the past set even
        // though no expiry sweep ran; a second close cannot find it.
        assert!(k.get_auction(id).is_none());
        assert!(k.live_refs().is_empty());
        assert_eq!(k.past_auctions().len(), 1);
        let err = k.close_auction(10, id).unwrap_err();
        assert_eq!(err, AuctionError::AuctionNotFound(id));
    }

    #[test]
    fn test_past_auctions_retain_full_records() {
        let a = addr(1);
        let mut k = keeper_with_balances(&[(a, "uatom", 50)]);
        let id = k.start_forward_auction(0, Coin::new("photon", 500));
        k.place_bid(1, id, a, Coin::new("uatom", 10)).unwrap();

        k.expire_auctions(10);
        k.close_auction(10, id).unwrap();

        // The closed snapshot keeps lot, winner and winning amount, not
        // just the scheduling entry.
        let past = k.past_auctions();
        assert_eq!(past.len(), 1);
        assert_eq!(past[0].id(), id);
        assert_eq!(past[0].lot(), &Coin::new("photon", 500));
        assert_eq!(past[0].bidder(), Some(a));
        assert_eq!(past[0].bid(), &Coin::new("uatom", 10));
    }

    #[test]
    fn test_start_with_shorter_initial_window() {
        let a = addr(1);
        let mut bank = TestBank::new();
        bank.fund(a, Coin::new("uatom", 50));
        let params = AuctionParams {
            auction_duration: 5,
            ..AuctionParams::default()
        };
        let mut k = Keeper::new(MemStore::new(), bank, TestStaking::new(), params);

        let id = k.start_forward_auction(0, Coin::new("photon", 1));
        let auction = k.get_auction(id).unwrap();
        assert_eq!(auction.end_time(), 5);
        assert_eq!(auction.max_end_time(), 10);

        // A late bid extends past the initial window, under the ceiling.
        k.place_bid(5, id, a, Coin::new("uatom", 1)).unwrap();
        assert_eq!(k.get_auction(id).unwrap().end_time(), 8);
    }

    #[test]
    fn test_close_without_sale_rolls_over() {
        let mut k = keeper();
        let id = k.start_forward_auction(0, Coin::new("photon", 500));

        let event = k.close_auction(10, id).unwrap();
        assert_eq!(
            event,
            AuctionEvent::AuctionClosed {
                id,
                winner: None,
                amount: Coin::zero("uatom"),
            }
        );
        assert!(k.staking.repatriated.is_empty());
        assert_eq!(k.staking.rolled_over, vec![Coin::new("photon", 500)]);
    }

    #[test]
    fn test_live_auctions_returns_records_in_expiry_order() {
        let mut k = keeper();
        let late = k.start_forward_auction(10, Coin::new("photon", 2));
        let early = k.start_forward_auction(0, Coin::new("photon", 1));

        let live = k.live_auctions();
        assert_eq!(live.len(), 2);
        assert_eq!(live[0].id(), early);
        assert_eq!(live[1].id(), late);
    }

    #[test]
    #[should_panic(expected = "live index refers to missing auction")]
    fn test_dangling_live_ref_halts() {
        let mut k = keeper();
        let id = k.start_forward_auction(0, Coin::new("photon", 1));
        // Simulate an outside writer breaking the namespace invariant.
        k.store.delete(&auction_key(id));
        k.live_auctions();
    }
}
