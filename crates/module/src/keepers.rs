//! Collaborator interfaces the auction keeper consumes.
//!
//! The module never reaches into account or fee-pool state directly; it
//! moves coins through these narrow traits, and the surrounding chain
//! wires in its real bank and staking keepers.

use thiserror::Error;

use fee_auction_types::{Address, Coin};

/// Coin transfer failures reported by the bank collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BankError {
    #[error("account {address} holds less than {required}")]
    InsufficientBalance { address: Address, required: Coin },
}

/// Account balance operations.
pub trait BankKeeper {
    /// Whether `address` holds at least `amount` unencumbered.
    fn has_coins(&self, address: &Address, amount: &Coin) -> bool;

    /// Debit `amount` from `address`.
    fn subtract_coins(&mut self, address: &Address, amount: &Coin) -> Result<(), BankError>;

    /// Credit `amount` to `address`. Crediting cannot fail for an address
    /// that has previously held coins; the keeper relies on this when
    /// refunding an outbid bidder.
    fn add_coins(&mut self, address: &Address, amount: &Coin) -> Result<(), BankError>;
}

/// Fee-pool operations on the staking side.
pub trait StakingKeeper {
    /// Drain the fee pools earmarked for auctioning, one coin per
    /// denomination. Called once per schedule trigger.
    fn collect_fee_pools_for_auction(&mut self) -> Vec<Coin>;

    /// A sale happened: route the lot onward and return the winning bid
    /// amount to the validator fee earnings.
    fn repatriate_fee_earnings(&mut self, lot: &Coin, bid: &Coin);

    /// No sale: roll the lot back into the pool for a later auction.
    fn roll_over_fees_from_auction(&mut self, lot: &Coin);
}
