//! Mock chain server for local testing of the fee-auction module.
//!
//! A JSON-RPC server that simulates block production: fund accounts, seed
//! fee pools, advance blocks (which runs the end-blocker), place bids, and
//! query auction state -- all without a real blockchain underneath.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use jsonrpsee::core::async_trait;
use jsonrpsee::proc_macros::rpc;
use jsonrpsee::server::Server;
use jsonrpsee::types::ErrorObjectOwned;
use parking_lot::RwLock;
use tracing::{info, warn};

use fee_auction_module::{
    handle_call, run_end_block, AuctionCall, AuctionGenesisConfig, BankError, BankKeeper, Keeper,
    StakingKeeper,
};
use fee_auction_store::{BlockHook, MemStore, NoopHook};
use fee_auction_types::{Address, AuctionId, Coin, CoinError};

mod types;
use types::*;

/// In-memory bank keeper: a plain balance table.
#[derive(Debug, Default)]
struct MemBank {
    balances: HashMap<(Address, String), u128>,
}

impl MemBank {
    fn fund(&mut self, address: Address, coin: Coin) {
        *self.balances.entry((address, coin.denom)).or_insert(0) += coin.amount;
    }

    fn balance(&self, address: &Address, denom: &str) -> u128 {
        self.balances
            .get(&(*address, denom.to_string()))
            .copied()
            .unwrap_or(0)
    }
}

impl BankKeeper for MemBank {
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

/// In-memory staking keeper: fee pools accumulate per denomination until
/// the next schedule trigger sweeps them into auctions.
#[derive(Debug, Default)]
struct MemStaking {
    pools: HashMap<String, Coin>,
}

impl MemStaking {
    fn add_pool(&mut self, coin: Coin) -> Result<(), CoinError> {
        // Rejecting a deposit must leave the existing pool in place.
        let merged = match self.pools.get(&coin.denom) {
            Some(existing) => existing.checked_add(&coin)?,
            None => coin,
        };
        self.pools.insert(merged.denom.clone(), merged);
        Ok(())
    }
}

impl StakingKeeper for MemStaking {
    fn collect_fee_pools_for_auction(&mut self) -> Vec<Coin> {
        // Sorted by denom so every node sweeps in the same order.
        let mut denoms: Vec<String> = self.pools.keys().cloned().collect();
        denoms.sort();
        denoms
            .into_iter()
            .filter_map(|denom| self.pools.remove(&denom))
            .filter(|coin| !coin.is_zero())
            .collect()
    }

    fn repatriate_fee_earnings(&mut self, lot: &Coin, bid: &Coin) {
        info!(%lot, %bid, "repatriating fee earnings");
    }

    fn roll_over_fees_from_auction(&mut self, lot: &Coin) {
        info!(%lot, "rolling unsold lot back into the pool");
        if let Err(err) = self.add_pool(lot.clone()) {
            warn!(%err, %lot, "fee pool cannot absorb rolled-over lot");
        }
    }
}

/// Hook logging each committed block.
struct LogHook;

impl BlockHook for LogHook {
    fn on_block_committed(&self, height: u64) {
        info!(height, "block committed");
    }
}

/// Shared chain state.
struct ChainState {
    keeper: Keeper<MemStore, MemBank, MemStaking>,
    height: u64,
}

impl ChainState {
    fn new() -> Self {
        let genesis = AuctionGenesisConfig::default();
        let mut keeper = Keeper::new(
            MemStore::new(),
            MemBank::default(),
            MemStaking::default(),
            genesis.params.clone(),
        );
        fee_auction_module::init_genesis(&mut keeper, &genesis);
        Self { keeper, height: 0 }
    }
}

/// RPC API definition for the mock chain.
#[rpc(server)]
pub trait MockChainApi {
    // ============ Admin Methods ============

    /// Advance the chain by one block, running the end-blocker.
    #[method(name = "admin_advanceBlock")]
    async fn admin_advance_block(&self) -> Result<BlockResult, ErrorObjectOwned>;

    /// Credit an account balance.
    #[method(name = "admin_fundAccount")]
    async fn admin_fund_account(
        &self,
        address: String,
        denom: String,
        amount: String,
    ) -> Result<bool, ErrorObjectOwned>;

    /// Add collected fees to a pool awaiting auction.
    #[method(name = "admin_addFeePool")]
    async fn admin_add_fee_pool(
        &self,
        denom: String,
        amount: String,
    ) -> Result<bool, ErrorObjectOwned>;

    // ============ Auction Methods ============

    /// Place a bid on a live auction.
    #[method(name = "auction_placeBid")]
    async fn auction_place_bid(
        &self,
        params: PlaceBidParams,
    ) -> Result<Vec<fee_auction_module::AuctionEvent>, ErrorObjectOwned>;

    // ============ Query Methods ============

    /// Get current block info.
    #[method(name = "chain_getBlockInfo")]
    async fn chain_get_block_info(&self) -> Result<BlockInfo, ErrorObjectOwned>;

    /// Get auction by ID.
    #[method(name = "query_getAuction")]
    async fn query_get_auction(
        &self,
        auction_id: u64,
    ) -> Result<Option<AuctionRpc>, ErrorObjectOwned>;

    /// List all live auctions.
    #[method(name = "query_liveAuctions")]
    async fn query_live_auctions(&self) -> Result<Vec<AuctionRpc>, ErrorObjectOwned>;

    /// List records of all closed auctions.
    #[method(name = "query_pastAuctions")]
    async fn query_past_auctions(&self) -> Result<Vec<AuctionRpc>, ErrorObjectOwned>;

    /// Get an account balance.
    #[method(name = "bank_getBalance")]
    async fn bank_get_balance(
        &self,
        address: String,
        denom: String,
    ) -> Result<String, ErrorObjectOwned>;
}

/// Implementation of the mock chain RPC server. Runs with a no-op block
/// hook unless an observer is wired in.
struct MockChainServer<H = NoopHook> {
    state: Arc<RwLock<ChainState>>,
    hook: H,
}

impl MockChainServer<NoopHook> {
    fn new() -> Self {
        Self::with_hook(NoopHook)
    }
}

impl<H: BlockHook> MockChainServer<H> {
    fn with_hook(hook: H) -> Self {
        Self {
            state: Arc::new(RwLock::new(ChainState::new())),
            hook,
        }
    }
}

fn rpc_error(msg: impl ToString) -> ErrorObjectOwned {
    ErrorObjectOwned::owned(-32000, msg.to_string(), None::<()>)
}

fn parse_address(s: &str) -> Result<Address, ErrorObjectOwned> {
    let bytes = hex::decode(s.trim_start_matches("0x"))
        .map_err(|_| rpc_error("address must be hex"))?;
    if bytes.len() != Address::LEN {
        return Err(rpc_error(format!(
            "address must be {} bytes, got {}",
            Address::LEN,
            bytes.len()
        )));
    }
    let mut addr = [0u8; Address::LEN];
    addr.copy_from_slice(&bytes);
    Ok(Address(addr))
}

fn parse_amount(s: &str) -> Result<u128, ErrorObjectOwned> {
    s.parse()
        .map_err(|_| rpc_error("amount must be a decimal string"))
}

#[async_trait]
impl<H: BlockHook + Send + Sync + 'static> MockChainApiServer for MockChainServer<H> {
    async fn admin_advance_block(&self) -> Result<BlockResult, ErrorObjectOwned> {
        let mut state = self.state.write();
        state.height += 1;
        let height = state.height;
        let events = run_end_block(&mut state.keeper, height);
        self.hook.on_block_committed(height);
        Ok(BlockResult { height, events })
    }

    async fn admin_fund_account(
        &self,
        address: String,
        denom: String,
        amount: String,
    ) -> Result<bool, ErrorObjectOwned> {
        let address = parse_address(&address)?;
        let amount = parse_amount(&amount)?;
        let mut state = self.state.write();
        state.keeper.bank_mut().fund(address, Coin::new(denom, amount));
        Ok(true)
    }

    async fn admin_add_fee_pool(
        &self,
        denom: String,
        amount: String,
    ) -> Result<bool, ErrorObjectOwned> {
        let amount = parse_amount(&amount)?;
        let mut state = self.state.write();
        state
            .keeper
            .staking_mut()
            .add_pool(Coin::new(denom, amount))
            .map_err(rpc_error)?;
        Ok(true)
    }

    async fn auction_place_bid(
        &self,
        params: PlaceBidParams,
    ) -> Result<Vec<fee_auction_module::AuctionEvent>, ErrorObjectOwned> {
        let bidder = parse_address(&params.sender)?;
        let amount = parse_amount(&params.amount)?;
        let call = AuctionCall::PlaceBid {
            auction_id: AuctionId(params.auction_id),
            bidder,
            bid: Coin::new(params.denom, amount),
        };

        let mut state = self.state.write();
        let height = state.height;
        handle_call(&mut state.keeper, height, call).map_err(rpc_error)
    }

    async fn chain_get_block_info(&self) -> Result<BlockInfo, ErrorObjectOwned> {
        let state = self.state.read();
        Ok(BlockInfo {
            height: state.height,
        })
    }

    async fn query_get_auction(
        &self,
        auction_id: u64,
    ) -> Result<Option<AuctionRpc>, ErrorObjectOwned> {
        let state = self.state.read();
        Ok(state
            .keeper
            .get_auction(AuctionId(auction_id))
            .as_ref()
            .map(AuctionRpc::from))
    }

    async fn query_live_auctions(&self) -> Result<Vec<AuctionRpc>, ErrorObjectOwned> {
        let state = self.state.read();
        Ok(state
            .keeper
            .live_auctions()
            .iter()
            .map(AuctionRpc::from)
            .collect())
    }

    async fn query_past_auctions(&self) -> Result<Vec<AuctionRpc>, ErrorObjectOwned> {
        let state = self.state.read();
        Ok(state
            .keeper
            .past_auctions()
            .iter()
            .map(AuctionRpc::from)
            .collect())
    }

    async fn bank_get_balance(
        &self,
        address: String,
        denom: String,
    ) -> Result<String, ErrorObjectOwned> {
        let address = parse_address(&address)?;
        let state = self.state.read();
        Ok(state.keeper.bank().balance(&address, &denom).to_string())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("mock_chain=info".parse()?)
                .add_directive("fee_auction_module=info".parse()?)
                .add_directive("jsonrpsee=warn".parse()?),
        )
        .init();

    let addr: SocketAddr = "127.0.0.1:9944".parse()?;

    info!("Starting mock chain server on {}", addr);

    let server = Server::builder().build(addr).await?;
    let handle = server.start(MockChainServer::with_hook(LogHook).into_rpc());

    info!("Mock chain server running. Press Ctrl+C to stop.");

    tokio::signal::ctrl_c().await?;

    info!("Shutting down...");
    handle.stop()?;
    handle.stopped().await;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fee_pools_accumulate_per_denom() {
        let mut staking = MemStaking::default();
        staking.add_pool(Coin::new("photon", 30)).unwrap();
        staking.add_pool(Coin::new("photon", 12)).unwrap();
        staking.add_pool(Coin::new("blurt", 5)).unwrap();

        let pools = staking.collect_fee_pools_for_auction();
        assert_eq!(
            pools,
            vec![Coin::new("blurt", 5), Coin::new("photon", 42)]
        );
        assert!(staking.collect_fee_pools_for_auction().is_empty());
    }

    #[test]
    fn test_fee_pool_overflow_rejected() {
        let mut staking = MemStaking::default();
        staking.add_pool(Coin::new("photon", u128::MAX)).unwrap();
        assert!(staking.add_pool(Coin::new("photon", 1)).is_err());
        // The pool itself is untouched by the rejected deposit.
        assert_eq!(
            staking.collect_fee_pools_for_auction(),
            vec![Coin::new("photon", u128::MAX)]
        );
    }

    #[tokio::test]
    async fn test_server_defaults_to_noop_hook() {
        let server = MockChainServer::new();
        let first = server.admin_advance_block().await.unwrap();
        assert_eq!(first.height, 1);
        let second = server.admin_advance_block().await.unwrap();
        assert_eq!(second.height, 2);
    }
}
