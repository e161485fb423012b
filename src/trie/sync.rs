use super::config::TrieConfig;
use super::path::{DecimalDigits, KeyProjector};
use super::trie::Trie;
use crate::error::Result;
use crate::utils::display::TrieStats;
use parking_lot::Mutex;

/// A [`Trie`] behind a single per-instance lock.
///
/// Every operation holds the lock for its full duration, including the whole
/// descent or prune, so operations on one instance are fully serialized.
/// The lock is not reentrant: a projector or deallocator that calls back
/// into the same `SyncTrie` deadlocks.
#[derive(Debug)]
pub struct SyncTrie<K: ?Sized, V> {
    inner: Mutex<Trie<K, V>>,
}

impl<K: ?Sized, V> SyncTrie<K, V> {
    pub fn new() -> Self
    where
        DecimalDigits: KeyProjector<K>,
    {
        Self::from(Trie::new())
    }

    pub fn with_config(config: TrieConfig<K, V>) -> Self {
        Self::from(Trie::with_config(config))
    }

    pub fn insert(&self, key: &K, value: V) -> Result<()> {
        self.inner.lock().insert(key, value)
    }

    pub fn search(&self, key: &K) -> V
    where
        V: Default + Clone,
    {
        self.inner.lock().search(key)
    }

    /// Clones the value stored under `key` out of the locked trie.
    pub fn get(&self, key: &K) -> Option<V>
    where
        V: Clone,
    {
        self.inner.lock().get(key).cloned()
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.inner.lock().contains_key(key)
    }

    pub fn delete(&self, key: &K) -> Result<bool> {
        self.inner.lock().delete(key)
    }

    pub fn clear(&self) {
        self.inner.lock().clear()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    pub fn stats(&self) -> TrieStats {
        self.inner.lock().stats()
    }

    /// Runs `f` with the lock held, for sequences of operations that must not
    /// interleave with other threads.
    pub fn with_lock<R>(&self, f: impl FnOnce(&mut Trie<K, V>) -> R) -> R {
        f(&mut self.inner.lock())
    }

    pub fn into_inner(self) -> Trie<K, V> {
        self.inner.into_inner()
    }

    pub fn destroy(self) {
        self.into_inner().destroy()
    }
}

impl<K: ?Sized, V> From<Trie<K, V>> for SyncTrie<K, V> {
    fn from(trie: Trie<K, V>) -> Self {
        SyncTrie {
            inner: Mutex::new(trie),
        }
    }
}

impl<K: ?Sized, V> Default for SyncTrie<K, V>
where
    DecimalDigits: KeyProjector<K>,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod unit_tests {
    use super::*;
    use crate::trie::path::StringBytes;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn sync_trie_is_send_and_sync() {
        assert_send_sync::<SyncTrie<u64, u64>>();
        assert_send_sync::<SyncTrie<str, String>>();
    }

    #[test]
    fn concurrent_disjoint_inserts_and_deletes() {
        let trie = SyncTrie::<u64, u64>::new();

        thread::scope(|s| {
            for t in 0..4u64 {
                let trie = &trie;
                s.spawn(move || {
                    for k in (t * 1000)..(t * 1000 + 500) {
                        trie.insert(&k, k * 2).unwrap();
                    }
                });
            }
        });

        assert_eq!(trie.len(), 2000);
        assert_eq!(trie.search(&1500), 0);
        assert_eq!(trie.search(&3499), 6998);

        thread::scope(|s| {
            for t in 0..4u64 {
                let trie = &trie;
                s.spawn(move || {
                    for k in (t * 1000)..(t * 1000 + 500) {
                        assert_eq!(trie.delete(&k), Ok(true));
                    }
                });
            }
        });

        assert!(trie.is_empty());
        assert_eq!(trie.stats(), TrieStats::default());
    }

    #[test]
    fn contended_overwrites_release_every_replaced_value() {
        let released = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&released);
        let trie = SyncTrie::<str, u64>::with_config(
            TrieConfig::with_accessor(StringBytes).deallocator(move |_: u64| {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        );

        thread::scope(|s| {
            for t in 0..8u64 {
                let trie = &trie;
                s.spawn(move || {
                    for i in 0..100 {
                        trie.insert("shared", t * 100 + i).unwrap();
                    }
                });
            }
        });

        // 800 inserts on one key: all but the surviving value were released
        assert_eq!(released.load(Ordering::SeqCst), 799);
        assert_eq!(trie.len(), 1);

        trie.destroy();
        assert_eq!(released.load(Ordering::SeqCst), 800);
    }

    #[test]
    fn with_lock_runs_atomic_sequence() {
        let trie = SyncTrie::<u64, u64>::new();
        trie.insert(&7, 1).unwrap();

        let previous = trie.with_lock(|inner| {
            let previous = inner.search(&7);
            inner.insert(&7, previous + 1).unwrap();
            previous
        });

        assert_eq!(previous, 1);
        assert_eq!(trie.get(&7), Some(2));
    }

    #[test]
    fn into_inner_keeps_contents() {
        let trie = SyncTrie::<u64, &'static str>::new();
        trie.insert(&10, "ten").unwrap();

        let inner = trie.into_inner();
        assert_eq!(inner.get(&10), Some(&"ten"));
    }
}
