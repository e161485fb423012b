use super::path::{DecimalDigits, KeyProjector};
use std::fmt;

/// Receives values the trie is discarding: the old value on overwrite, the
/// value of a deleted key, and every value left at teardown.
///
/// A sink must not call back into the trie that owns it.
pub trait ValueSink<V>: Send {
    fn release(&mut self, value: V);
}

impl<V, F> ValueSink<V> for F
where
    F: FnMut(V) + Send,
{
    fn release(&mut self, value: V) {
        self(value)
    }
}

/// Construction-time options of a trie.
pub struct TrieConfig<K: ?Sized, V> {
    pub(crate) accessor: Box<dyn KeyProjector<K>>,
    pub(crate) deallocator: Option<Box<dyn ValueSink<V>>>,
}

impl<K: ?Sized, V> TrieConfig<K, V> {
    pub fn with_accessor(accessor: impl KeyProjector<K> + 'static) -> Self {
        TrieConfig {
            accessor: Box::new(accessor),
            deallocator: None,
        }
    }

    pub fn accessor(mut self, accessor: impl KeyProjector<K> + 'static) -> Self {
        self.accessor = Box::new(accessor);
        self
    }

    pub fn deallocator(mut self, deallocator: impl ValueSink<V> + 'static) -> Self {
        self.deallocator = Some(Box::new(deallocator));
        self
    }
}

impl<K: ?Sized, V> Default for TrieConfig<K, V>
where
    DecimalDigits: KeyProjector<K>,
{
    fn default() -> Self {
        TrieConfig::with_accessor(DecimalDigits)
    }
}

impl<K: ?Sized, V> fmt::Debug for TrieConfig<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("TrieConfig")
            .field("deallocator", &self.deallocator.is_some())
            .finish_non_exhaustive()
    }
}
