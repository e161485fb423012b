//! Generic nibble trie: a 16-ary radix trie over the bytes of a projected
//! key, with cascading prune on delete and an optional per-instance lock.

pub mod error;
pub mod slot;
pub mod trie;
pub mod utils;

pub use error::{Result, TrieError};
pub use slot::Slot;
pub use trie::{
    BigEndian, DecimalDigits, Key32, KeyProjector, MinimalBytes, StringBytes, SyncTrie, Trie,
    TrieConfig, ValueSink,
};
pub use utils::display::TrieStats;

#[cfg(test)]
mod proptests;
