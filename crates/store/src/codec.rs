//! Borsh value codec for ledger entries.
//!
//! Every value the module persists goes through these two functions.
//! Decoding only ever runs against bytes this module wrote, so a decode
//! failure means the ledger namespace was corrupted by something else --
//! an unrecoverable invariant violation, and the process halts rather than
//! risk divergent state across nodes.

use borsh::{BorshDeserialize, BorshSerialize};

/// Serialize a value for storage.
pub fn encode<T: BorshSerialize>(value: &T) -> Vec<u8> {
    borsh::to_vec(value).unwrap_or_else(|err| panic!("borsh encoding cannot fail: {err}"))
}

/// Deserialize a stored value, halting on corruption.
pub fn must_decode<T: BorshDeserialize>(bytes: &[u8], what: &str) -> T {
    T::try_from_slice(bytes)
        .unwrap_or_else(|err| panic!("corrupted ledger entry ({what}): {err}"))
}
