pub mod config;
pub mod node;
pub mod path;
pub mod sync;
pub mod trie;

pub use config::{TrieConfig, ValueSink};
pub use node::{ByteNode, Level, NibbleGroup};
pub use path::{
    BigEndian, DecimalDigits, Key32, KeyProjector, MinimalBytes, StringBytes, project_all,
};
pub use sync::SyncTrie;
pub use trie::Trie;
