//! The ledger-accessor seam for the fee-auction module.
//!
//! Consensus-critical module code never touches a database directly; it
//! reads and writes through [`KvStore`], a deterministic ordered key-value
//! interface scoped to the module's namespace. The surrounding chain
//! provides the real versioned store and its per-block atomic commit; this
//! crate ships [`MemStore`], a `BTreeMap`-backed implementation with the
//! same ordering guarantees, for tests and the mock chain.

use std::collections::BTreeMap;

pub mod codec;
pub mod hooks;

pub use hooks::{BlockHook, NoopHook};

/// A deterministic, ordered key-value store.
///
/// Keys are raw byte strings ordered lexicographically; values are opaque
/// byte blobs. Iteration order is part of the contract: every node must
/// observe identical cursors over identical state.
pub trait KvStore {
    /// Get the value stored under `key`, if any.
    fn get(&self, key: &[u8]) -> Option<Vec<u8>>;

    /// Set `key` to `value`, overwriting any previous value.
    fn set(&mut self, key: &[u8], value: Vec<u8>);

    /// Delete `key`. Deleting an absent key is a no-op.
    fn delete(&mut self, key: &[u8]);

    /// Iterate over `[start, end)` in ascending key order, or descending
    /// when `reverse` is set.
    fn range<'a>(
        &'a self,
        start: &[u8],
        end: &[u8],
        reverse: bool,
    ) -> Box<dyn Iterator<Item = (Vec<u8>, Vec<u8>)> + 'a>;
}

/// Exclusive upper bound for a prefix scan: the prefix with its last
/// non-0xff byte incremented. Returns `None` for an all-0xff prefix (scan
/// to the end of the keyspace instead).
pub fn prefix_end(prefix: &[u8]) -> Option<Vec<u8>> {
    let mut end = prefix.to_vec();
    while let Some(last) = end.last_mut() {
        if *last < 0xff {
            *last += 1;
            return Some(end);
        }
        end.pop();
    }
    None
}

/// In-memory [`KvStore`] for tests and local development.
#[derive(Debug, Default, Clone)]
pub struct MemStore {
    map: BTreeMap<Vec<u8>, Vec<u8>>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl KvStore for MemStore {
    fn get(&self, key: &[u8]) -> Option<Vec<u8>> {
        self.map.get(key).cloned()
    }

    fn set(&mut self, key: &[u8], value: Vec<u8>) {
        self.map.insert(key.to_vec(), value);
    }

    fn delete(&mut self, key: &[u8]) {
        self.map.remove(key);
    }

    fn range<'a>(
        &'a self,
        start: &[u8],
        end: &[u8],
        reverse: bool,
    ) -> Box<dyn Iterator<Item = (Vec<u8>, Vec<u8>)> + 'a> {
        let iter = self
            .map
            .range(start.to_vec()..end.to_vec())
            .map(|(k, v)| (k.clone(), v.clone()));
        if reverse {
            Box::new(iter.rev())
        } else {
            Box::new(iter)
        }
    }
}
