//! Fee-auction module: periodic on-chain auctions of collected validator
//! fees.
//!
//! Every `auction_frequency` blocks the end-blocker sweeps the fee pools
//! and opens one forward auction per collected denomination. Bidders
//! compete upward in the settlement denomination; each accepted bid
//! escrows the bidder's coins, refunds the bidder it displaced, and pushes
//! the closing height out by the anti-sniping window (never past the
//! ceiling). When an auction's closing height is reached the end-blocker
//! settles it: sold lots and proceeds are repatriated to the fee earnings,
//! unsold lots roll back into the pool for a later round.
//!
//! Everything is deterministic and single-threaded per block: the ledger
//! is read and written only through the [`fee_auction_store::KvStore`]
//! seam, and all validating nodes replaying the same block reach the same
//! state.
//!
//! # Architecture
//!
//! - `call`: message types for state-changing operations
//! - `keeper`: the registry -- records, ID counter, live/past indices
//! - `settlement`: coin movement on bid placement and close
//! - `end_blocker`: the per-block lifecycle driver
//! - `queries`: read-only state access
//! - `genesis`: initial configuration
//! - `keepers`: bank/staking collaborator traits
//! - `events`, `error`: structured outputs

pub mod call;
pub mod end_blocker;
pub mod error;
pub mod events;
pub mod genesis;
pub mod keeper;
pub mod keepers;
pub mod queries;
pub mod settlement;

#[cfg(test)]
pub(crate) mod testutil;

pub use call::{handle_call, AuctionCall};
pub use end_blocker::run_end_block;
pub use error::AuctionError;
pub use events::AuctionEvent;
pub use genesis::{init_genesis, AuctionGenesisConfig, GenesisValidationError};
pub use keeper::Keeper;
pub use keepers::{BankError, BankKeeper, StakingKeeper};
pub use queries::{handle_query, AuctionQuery, AuctionQueryResponse};
