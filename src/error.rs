use thiserror::Error;

/// Errors returned by trie operations.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrieError {
    /// The key projector ended before producing a single byte, so the key has
    /// no terminal node in the trie.
    #[error("key projects to zero bytes")]
    EmptyKey,
}

pub type Result<T> = std::result::Result<T, TrieError>;
