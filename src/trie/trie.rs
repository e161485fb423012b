use super::config::{TrieConfig, ValueSink};
use super::node::Level;
use super::path::{DecimalDigits, KeyProjector, project_all};
use crate::error::{Result, TrieError};
use std::fmt;
use tracing::{debug, trace};

/// Radix trie over the nibbles of a projected key.
///
/// Each key byte takes two hops: the high nibble selects a `NibbleGroup`,
/// the low nibble a `ByteNode`. The node reached by the last byte holds the
/// value. Containers are allocated on insert and pruned on delete as soon as
/// no stored key routes through them.
pub struct Trie<K: ?Sized, V> {
    pub(crate) root: Level<V>,
    projector: Box<dyn KeyProjector<K>>,
    sink: Option<Box<dyn ValueSink<V>>>,
    len: usize,
}

impl<K: ?Sized, V> Trie<K, V> {
    /// Creates an empty trie keyed by the decimal digits of `K`.
    pub fn new() -> Self
    where
        DecimalDigits: KeyProjector<K>,
    {
        Self::with_config(TrieConfig::default())
    }

    pub fn with_config(config: TrieConfig<K, V>) -> Self {
        debug!(deallocator = config.deallocator.is_some(), "created trie");
        Trie {
            root: Level::new(),
            projector: config.accessor,
            sink: config.deallocator,
            len: 0,
        }
    }

    /// Number of stored values.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Stores `value` under `key`. An existing value is handed to the
    /// deallocator before it is replaced.
    pub fn insert(&mut self, key: &K, value: V) -> Result<()> {
        let projector = &*self.projector;
        let mut byte = projector.project(key, 0).ok_or(TrieError::EmptyKey)?;
        let mut index = 0;
        let mut level = &mut self.root;

        let node = loop {
            let node = level.descend_or_insert(byte);
            index += 1;

            match projector.project(key, index) {
                Some(next) => {
                    byte = next;
                    level = &mut node.level;
                }
                None => break node,
            }
        };

        match node.value.replace(value) {
            Some(old) => {
                trace!(key = %hex::encode(project_all(projector, key)), "overwrote value");
                if let Some(sink) = self.sink.as_mut() {
                    sink.release(old);
                }
            }
            None => {
                trace!(key = %hex::encode(project_all(projector, key)), "inserted value");
                self.len += 1;
            }
        }

        Ok(())
    }

    /// Borrows the value stored under `key`, if any.
    pub fn get(&self, key: &K) -> Option<&V> {
        let projector = &*self.projector;
        let mut byte = projector.project(key, 0)?;
        let mut index = 0;
        let mut level = &self.root;

        loop {
            let node = level.descend(byte)?;
            index += 1;

            match projector.project(key, index) {
                Some(next) => {
                    byte = next;
                    level = &node.level;
                }
                None => return node.value.as_ref(),
            }
        }
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.get(key).is_some()
    }

    /// Returns the value stored under `key`, or `V::default()` when there is
    /// none. A stored default value is indistinguishable from a missing key;
    /// use [`Trie::get`] when the difference matters.
    pub fn search(&self, key: &K) -> V
    where
        V: Default + Clone,
    {
        self.get(key).cloned().unwrap_or_default()
    }

    /// Removes the value under `key` and prunes every container that only
    /// existed to reach it. Returns whether a value was removed; deleting a
    /// key that was never inserted changes nothing.
    pub fn delete(&mut self, key: &K) -> Result<bool> {
        let projector = &*self.projector;
        if projector.project(key, 0).is_none() {
            return Err(TrieError::EmptyKey);
        }

        let Some(value) = self.root.delete(projector, key) else {
            return Ok(false);
        };

        trace!(key = %hex::encode(project_all(projector, key)), "deleted value");
        self.len -= 1;
        if let Some(sink) = self.sink.as_mut() {
            sink.release(value);
        }

        Ok(true)
    }

    /// Releases every stored value and frees all containers. The trie stays
    /// usable.
    pub fn clear(&mut self) {
        let released = self.len;
        match self.sink.as_mut() {
            Some(sink) => self.root.drain(&mut |value| sink.release(value)),
            None => self.root.drain(&mut |value| drop(value)),
        }
        self.len = 0;
        debug!(released, "cleared trie");
    }

    /// Tears the trie down, handing every stored value to the deallocator.
    /// Dropping the trie does the same.
    pub fn destroy(self) {
        debug!(len = self.len, "destroying trie");
        drop(self);
    }
}

impl<K: ?Sized, V> Default for Trie<K, V>
where
    DecimalDigits: KeyProjector<K>,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K: ?Sized, V> Drop for Trie<K, V> {
    fn drop(&mut self) {
        if !self.root.is_empty() {
            self.clear();
        }
    }
}

impl<K: ?Sized, V: fmt::Debug> fmt::Debug for Trie<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Trie")
            .field("len", &self.len)
            .field("deallocator", &self.sink.is_some())
            .field("root", &self.root)
            .finish()
    }
}
