//! The settlement engine: every coin movement tied to an auction state
//! transition.
//!
//! Two moments move coins. When a bid lands, the new bidder's coins go
//! into escrow and the outbid bidder gets theirs back. When an auction
//! closes, the escrowed winning bid and the lot are routed through the
//! staking collaborator. Either all of a step's transfers happen or the
//! enclosing state transition is rejected; the ledger's per-block commit
//! discards partial writes alongside a rejected transaction.

use fee_auction_types::{Address, Auction, Coin};

use crate::keepers::{BankError, BankKeeper, StakingKeeper};

/// Escrow a newly accepted bid and refund the bidder it displaced.
///
/// The caller has already checked the new bidder's balance, so the debit
/// is expected to succeed; the refund credit cannot fail for an address
/// that held the coins moments ago (see [`BankKeeper::add_coins`]).
pub fn escrow_bid<B: BankKeeper>(
    bank: &mut B,
    bidder: &Address,
    amount: &Coin,
    displaced: Option<(Address, Coin)>,
) -> Result<(), BankError> {
    bank.subtract_coins(bidder, amount)?;
    if let Some((prev_bidder, prev_bid)) = displaced {
        bank.add_coins(&prev_bidder, &prev_bid)?;
    }
    Ok(())
}

/// Route lot and proceeds for a closing auction. Returns whether a sale
/// happened.
///
/// A sale requires a non-zero winning bid in the settlement denomination;
/// anything else (no bids, or a foreign-denom opening bid) rolls the lot
/// back into the fee pool for re-auctioning.
pub fn settle_close<K: StakingKeeper>(
    staking: &mut K,
    auction: &Auction,
    settlement_denom: &str,
) -> bool {
    match auction {
        Auction::Forward(a) => {
            if a.bid.denom == settlement_denom && !a.bid.is_zero() {
                staking.repatriate_fee_earnings(&a.lot, &a.bid);
                true
            } else {
                staking.roll_over_fees_from_auction(&a.lot);
                false
            }
        }
    }
}
