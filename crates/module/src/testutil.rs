//! Shared test doubles for the collaborator traits.

use std::collections::HashMap;

use fee_auction_types::{Address, AuctionParams, Coin};

use crate::keepers::{BankError, BankKeeper, StakingKeeper};

pub fn addr(n: u8) -> Address {
    Address([n; 20])
}

/// Dev-sized parameters: open a round every 25 blocks, 10-block auctions,
/// 3-block anti-sniping window.
pub fn params() -> AuctionParams {
    AuctionParams::default()
}

/// Plain balance map standing in for the bank keeper.
#[derive(Debug, Default)]
pub struct TestBank {
    balances: HashMap<(Address, String), u128>,
}

impl TestBank {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fund(&mut self, address: Address, coin: Coin) {
        *self.balances.entry((address, coin.denom)).or_insert(0) += coin.amount;
    }

    pub fn balance(&self, address: &Address, denom: &str) -> u128 {
        self.balances
            .get(&(*address, denom.to_string()))
            .copied()
            .unwrap_or(0)
    }

    /// Total coins of `denom` across all accounts, for conservation checks.
    pub fn total(&self, denom: &str) -> u128 {
        self.balances
            .iter()
            .filter(|((_, d), _)| d == denom)
            .map(|(_, amount)| amount)
            .sum()
    }
}

impl BankKeeper for TestBank {
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

/// Records fee-pool traffic instead of routing it anywhere.
#[derive(Debug, Default)]
pub struct TestStaking {
    /// Coins waiting to be swept into auctions at the next trigger.
    pub pending_pools: Vec<Coin>,
    /// `(lot, winning bid)` pairs from completed sales.
    pub repatriated: Vec<(Coin, Coin)>,
    /// Lots returned unsold.
    pub rolled_over: Vec<Coin>,
}

impl TestStaking {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StakingKeeper for TestStaking {
    fn collect_fee_pools_for_auction(&mut self) -> Vec<Coin> {
        std::mem::take(&mut self.pending_pools)
    }

    fn repatriate_fee_earnings(&mut self, lot: &Coin, bid: &Coin) {
        self.repatriated.push((lot.clone(), bid.clone()));
    }

    fn roll_over_fees_from_auction(&mut self, lot: &Coin) {
        self.rolled_over.push(lot.clone());
    }
}
