//! End-to-end tests for the fee-auction module.
//!
//! These tests drive the module the way the chain does: one
//! `run_end_block` per block after that block's transactions, with
//! in-memory bank and staking collaborators so coin conservation can be
//! checked across whole auction lifecycles.

use std::collections::HashMap;

use fee_auction_module::{
    handle_call, init_genesis, run_end_block, AuctionCall, AuctionError, AuctionEvent,
    AuctionGenesisConfig, BankError, BankKeeper, Keeper, StakingKeeper,
};
use fee_auction_store::MemStore;
use fee_auction_types::{Address, AuctionId, Coin};

/// Balance-table bank keeper.
#[derive(Debug, Default)]
pub struct ChainBank {
    balances: HashMap<(Address, String), u128>,
}

impl ChainBank {
    pub fn fund(&mut self, address: Address, coin: Coin) {
        *self.balances.entry((address, coin.denom)).or_insert(0) += coin.amount;
    }

    pub fn balance(&self, address: &Address, denom: &str) -> u128 {
        self.balances
            .get(&(*address, denom.to_string()))
            .copied()
            .unwrap_or(0)
    }

    pub fn total(&self, denom: &str) -> u128 {
        self.balances
            .iter()
            .filter(|((_, d), _)| d == denom)
            .map(|(_, amount)| amount)
            .sum()
    }
}

impl BankKeeper for ChainBank {
    fn has_coins(&self, address: &Address, amount: &Coin) -> bool {
        self.balance(address, &amount.denom) >= amount.amount
    }

    fn subtract_coins(&mut self, address: &Address, amount: &Coin) -> Result<(), BankError> {
        let balance = self
            .balances
            .entry((*address, amount.denom.clone()))
            .or_insert(0);
        if *balance < amount.amount {
            return Err(BankError::InsufficientBalance {
                address: *address,
                required: amount.clone(),
            });
        }
        *balance -= amount.amount;
        Ok(())
    }

    fn add_coins(&mut self, address: &Address, amount: &Coin) -> Result<(), BankError> {
        *self
            .balances
            .entry((*address, amount.denom.clone()))
            .or_insert(0) += amount.amount;
        Ok(())
    }
}

/// Fee-pool keeper where unsold lots really do roll back into the pool,
/// so re-auctioning can be observed.
#[derive(Debug, Default)]
pub struct ChainStaking {
    pub pools: HashMap<String, u128>,
    /// Winning-bid proceeds returned to fee earnings.
    pub earnings: Vec<Coin>,
    /// Lots handed onward from completed sales.
    pub sold_lots: Vec<Coin>,
}

impl ChainStaking {
    pub fn add_pool(&mut self, coin: Coin) {
        *self.pools.entry(coin.denom).or_insert(0) += coin.amount;
    }
}

impl StakingKeeper for ChainStaking {
    fn collect_fee_pools_for_auction(&mut self) -> Vec<Coin> {
        let mut denoms: Vec<String> = self.pools.keys().cloned().collect();
        denoms.sort();
        denoms
            .into_iter()
            .filter_map(|denom| {
                let amount = self.pools.remove(&denom)?;
                (amount > 0).then(|| Coin::new(denom, amount))
            })
            .collect()
    }

    fn repatriate_fee_earnings(&mut self, lot: &Coin, bid: &Coin) {
        self.sold_lots.push(lot.clone());
        self.earnings.push(bid.clone());
    }

    fn roll_over_fees_from_auction(&mut self, lot: &Coin) {
        self.add_pool(lot.clone());
    }
}

pub type TestChain = Keeper<MemStore, ChainBank, ChainStaking>;

pub fn addr(n: u8) -> Address {
    Address([n; 20])
}

/// A fresh chain with default params (trigger every 25 blocks, 10-block
/// auctions, 3-block extension window, uatom settlement).
pub fn new_chain() -> TestChain {
    let genesis = AuctionGenesisConfig::default();
    genesis.validate().expect("default genesis is valid");
    let mut keeper = Keeper::new(
        MemStore::new(),
        ChainBank::default(),
        ChainStaking::default(),
        genesis.params.clone(),
    );
    init_genesis(&mut keeper, &genesis);
    keeper
}

/// Advance block-by-block through `heights`, collecting emitted events.
pub fn drive(chain: &mut TestChain, heights: impl IntoIterator<Item = u64>) -> Vec<AuctionEvent> {
    heights
        .into_iter()
        .flat_map(|height| run_end_block(chain, height))
        .collect()
}

pub fn place_bid(
    chain: &mut TestChain,
    height: u64,
    bidder: Address,
    amount: u128,
) -> Result<Vec<AuctionEvent>, AuctionError> {
    handle_call(
        chain,
        height,
        AuctionCall::PlaceBid {
            auction_id: AuctionId(0),
            bidder,
            bid: Coin::new("uatom", amount),
        },
    )
}

#[test]
fn test_full_auction_lifecycle() {
    let mut chain = new_chain();
    let (alice, bob) = (addr(1), addr(2));

    // ========================================
    // Phase 1: Collect fees, open the round
    // ========================================

    chain.staking_mut().add_pool(Coin::new("photon", 1_000));
    chain.bank_mut().fund(alice, Coin::new("uatom", 100));
    chain.bank_mut().fund(bob, Coin::new("uatom", 100));

    let events = drive(&mut chain, 1..=25);
    assert_eq!(
        events,
        vec![AuctionEvent::AuctionStarted {
            id: AuctionId(0),
            lot: Coin::new("photon", 1_000),
            end_time: 35,
        }]
    );

    // ========================================
    // Phase 2: Competitive bidding
    // ========================================

    place_bid(&mut chain, 26, alice, 10).unwrap();
    assert_eq!(chain.bank().balance(&alice, "uatom"), 90);

    // Bob outbids: Alice refunded in full, Bob escrowed.
    place_bid(&mut chain, 27, bob, 20).unwrap();
    assert_eq!(chain.bank().balance(&alice, "uatom"), 100);
    assert_eq!(chain.bank().balance(&bob, "uatom"), 80);

    // Alice tries to equal Bob's bid: rejected, nothing moves.
    let err = place_bid(&mut chain, 28, alice, 20).unwrap_err();
    assert!(matches!(err, AuctionError::Bid(_)));
    assert_eq!(chain.bank().balance(&alice, "uatom"), 100);

    // ========================================
    // Phase 3: Close and settle
    // ========================================

    let events = drive(&mut chain, 28..=35);
    assert_eq!(
        events,
        vec![AuctionEvent::AuctionClosed {
            id: AuctionId(0),
            winner: Some(bob),
            amount: Coin::new("uatom", 20),
        }]
    );
    assert_eq!(chain.staking_mut().earnings, vec![Coin::new("uatom", 20)]);
    assert_eq!(
        chain.staking_mut().sold_lots,
        vec![Coin::new("photon", 1_000)]
    );

    // The primary record is gone, but the past index serves the full
    // closed snapshot: lot, winner and winning amount.
    assert!(chain.get_auction(AuctionId(0)).is_none());
    assert_eq!(chain.live_refs().len(), 0);
    let past = chain.past_auctions();
    assert_eq!(past.len(), 1);
    assert_eq!(past[0].lot(), &Coin::new("photon", 1_000));
    assert_eq!(past[0].bidder(), Some(bob));
    assert_eq!(past[0].bid(), &Coin::new("uatom", 20));

    // Bidding against the closed auction now fails as not-found.
    let err = place_bid(&mut chain, 36, alice, 30).unwrap_err();
    assert_eq!(err, AuctionError::AuctionNotFound(AuctionId(0)));
}

#[test]
fn test_coin_conservation() {
    let mut chain = new_chain();
    let bidders: Vec<Address> = (1..=4).map(addr).collect();

    chain.staking_mut().add_pool(Coin::new("photon", 500));
    for bidder in &bidders {
        chain.bank_mut().fund(*bidder, Coin::new("uatom", 1_000));
    }
    let initial_total = chain.bank().total("uatom");

    drive(&mut chain, 1..=25);

    // A pile of competitive bids; every accepted bid escrows the winner
    // and refunds the loser.
    let mut amount = 0u128;
    for round in 0..6usize {
        for (i, bidder) in bidders.iter().enumerate() {
            amount += 7;
            let height = 26 + ((round * bidders.len() + i) / 8) as u64;
            place_bid(&mut chain, height, *bidder, amount).unwrap();
        }
    }

    let events = drive(&mut chain, 28..=35);
    let winning = match events.as_slice() {
        [AuctionEvent::AuctionClosed {
            winner: Some(winner),
            amount,
            ..
        }] => {
            assert_eq!(*winner, bidders[3]); // last and highest bidder
            amount.amount
        }
        other => panic!("unexpected events: {other:?}"),
    };

    // Debits minus refunds equal the final payout: the coins left in the
    // bank plus the settled proceeds add back up to the starting supply.
    let final_total = chain.bank().total("uatom");
    assert_eq!(final_total + winning, initial_total);
    assert_eq!(
        chain.staking_mut().earnings,
        vec![Coin::new("uatom", winning)]
    );
}

#[test]
fn test_unsold_lot_reauctioned_next_round() {
    let mut chain = new_chain();
    chain.staking_mut().add_pool(Coin::new("photon", 300));

    // Round opens at 25, nobody bids, closes at 35: lot rolls back.
    let events = drive(&mut chain, 1..=40);
    assert!(matches!(
        events.as_slice(),
        [
            AuctionEvent::AuctionStarted { .. },
            AuctionEvent::AuctionClosed { winner: None, .. }
        ]
    ));
    assert_eq!(chain.staking_mut().pools.get("photon"), Some(&300));

    // Next trigger block sweeps the rolled-over lot into a new auction
    // with a fresh, never-reused ID.
    let events = drive(&mut chain, 41..=50);
    assert_eq!(
        events,
        vec![AuctionEvent::AuctionStarted {
            id: AuctionId(1),
            lot: Coin::new("photon", 300),
            end_time: 60,
        }]
    );
}

#[test]
fn test_late_bid_extends_auction() {
    let mut chain = new_chain();
    let alice = addr(1);
    chain.staking_mut().add_pool(Coin::new("photon", 100));
    chain.bank_mut().fund(alice, Coin::new("uatom", 100));

    drive(&mut chain, 1..=25); // opens, ends at 35

    // Snipe near the deadline: the 3-block window would push the close
    // from 35 to 37, but the ceiling clamps it back to 35.
    drive(&mut chain, 26..=33);
    let events = place_bid(&mut chain, 34, alice, 10).unwrap();
    assert_eq!(
        events,
        vec![AuctionEvent::BidPlaced {
            id: AuctionId(0),
            bidder: alice,
            amount: Coin::new("uatom", 10),
            height: 34,
            new_end_time: 35,
        }]
    );

    let closed = drive(&mut chain, 34..=35);
    assert_eq!(closed.len(), 1);
}

#[test]
fn test_one_auction_per_denomination() {
    let mut chain = new_chain();
    chain.staking_mut().add_pool(Coin::new("photon", 100));
    chain.staking_mut().add_pool(Coin::new("blurt", 50));

    let events = drive(&mut chain, 1..=25);
    let ids: Vec<AuctionId> = events
        .iter()
        .map(|event| match event {
            AuctionEvent::AuctionStarted { id, .. } => *id,
            other => panic!("unexpected event: {other:?}"),
        })
        .collect();
    assert_eq!(ids, vec![AuctionId(0), AuctionId(1)]);

    let live = chain.live_auctions();
    assert_eq!(live.len(), 2);
    // Swept in denomination order.
    assert_eq!(live[0].lot(), &Coin::new("blurt", 50));
    assert_eq!(live[1].lot(), &Coin::new("photon", 100));
}
