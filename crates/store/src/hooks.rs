//! Post-commit observer hooks.
//!
//! Diagnostics that want to watch the ledger (balance exports, metrics)
//! register a hook with the surrounding chain and get called after each
//! block commits. Hooks run outside the state-transition path and must
//! never mutate module state.

/// Observer invoked after a block's writes have committed.
pub trait BlockHook {
    fn on_block_committed(&self, height: u64);
}

/// Hook that does nothing. The default when no observer is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopHook;

impl BlockHook for NoopHook {
    fn on_block_committed(&self, _height: u64) {}
}
