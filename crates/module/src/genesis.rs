//! Genesis configuration for the fee-auction module.

use serde::{Deserialize, Serialize};

use fee_auction_store::KvStore;
use fee_auction_types::{AuctionParams, InvalidParamsError};

use crate::keeper::Keeper;
use crate::keepers::{BankKeeper, StakingKeeper};

/// Initial state and configuration at chain start.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AuctionGenesisConfig {
    /// Module parameters, handed to the keeper at construction.
    pub params: AuctionParams,

    /// First auction ID to assign. Zero on a fresh chain; a chain restarted
    /// from exported state carries its counter forward so IDs are never
    /// reused.
    pub initial_auction_id: u64,
}

impl AuctionGenesisConfig {
    pub fn validate(&self) -> Result<(), GenesisValidationError> {
        self.params.validate()?;
        Ok(())
    }
}

/// Seed keeper state from a validated genesis config.
pub fn init_genesis<S, B, K>(keeper: &mut Keeper<S, B, K>, genesis: &AuctionGenesisConfig)
where
    S: KvStore,
    B: BankKeeper,
    K: StakingKeeper,
{
    keeper.init_next_auction_id(genesis.initial_auction_id);
}

/// Errors that can occur during genesis validation.
#[derive(Debug, Clone, thiserror::Error)]
pub enum GenesisValidationError {
    #[error(transparent)]
    Params(#[from] InvalidParamsError),
}
