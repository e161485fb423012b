use super::path::{KeyProjector, split_nibbles};
use std::array;
use tracing::trace;

//--- Node Kinds ---

/// 16-way fan-out over the high nibble of one key byte. The trie root holds
/// the level for the first byte, every `ByteNode` holds the level for the
/// byte after it.
#[derive(Debug)]
pub struct Level<V> {
    pub(crate) children: u8, // occupied slots in `groups`
    pub(crate) groups: [Option<Box<NibbleGroup<V>>>; 16],
}

/// 16-way fan-out over the low nibble of one key byte.
#[derive(Debug)]
pub struct NibbleGroup<V> {
    pub(crate) children: u8, // occupied slots in `nodes`
    pub(crate) nodes: [Option<Box<ByteNode<V>>>; 16],
}

/// Terminal of one byte position. Occupied when `value` is set; may also
/// route to longer keys through `level`.
#[derive(Debug)]
pub struct ByteNode<V> {
    pub(crate) value: Option<V>,
    pub(crate) level: Level<V>,
}

/// Step result of the delete unwind, passed from a deeper byte position to
/// the one above it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DeleteSignal {
    End,                      // key ended: the caller's node is the terminal node
    Continue { high: usize }, // this frame emptied its group: caller frees slot `high`
    Stop,                     // nothing left to unlink above this frame
}

/// What delete saw at one byte position on the way down, before anything
/// was unlinked.
#[derive(Debug, Clone, Copy)]
struct Frame {
    high: usize,
    low: usize,
    group_children: u8,
    node_children: u8,
    occupied: bool,
}

/// Topmost container a delete unlinks. Everything below it goes too.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Prune {
    Nothing,
    Node { depth: usize },  // node of frame `depth`, out of its group
    Group { depth: usize }, // group of frame `depth`, out of its level
}

impl<V> Level<V> {
    pub fn new() -> Self {
        Self {
            children: 0,
            groups: array::from_fn(|_| None),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.children == 0
    }

    pub fn groups(&self) -> impl Iterator<Item = (usize, &NibbleGroup<V>)> {
        self.groups
            .iter()
            .enumerate()
            .filter_map(|(i, g)| g.as_deref().map(|group| (i, group)))
    }

    fn group_or_insert(&mut self, high: usize) -> &mut NibbleGroup<V> {
        let slot = &mut self.groups[high];
        if slot.is_none() {
            self.children += 1;
        }
        slot.get_or_insert_with(|| Box::new(NibbleGroup::new()))
    }

    /// Unlinks and frees the group at `high`.
    pub(crate) fn release(&mut self, high: usize) {
        if let Some(mut group) = self.groups[high].take() {
            self.children -= 1;
            dismantle(group.detach(), &mut |value| drop(value));
        }
    }

    /// Returns the node for `byte`, allocating the group and node on the way.
    pub(crate) fn descend_or_insert(&mut self, byte: u8) -> &mut ByteNode<V> {
        let (high, low) = split_nibbles(byte);
        self.group_or_insert(high).node_or_insert(low)
    }

    pub(crate) fn descend(&self, byte: u8) -> Option<&ByteNode<V>> {
        let (high, low) = split_nibbles(byte);
        self.groups[high].as_ref()?.nodes[low].as_deref()
    }

    /// Cascading delete of `key` below this level. Takes the value of the
    /// terminal node and unlinks every container that routed only to it.
    /// An absent key leaves the structure untouched.
    pub(crate) fn delete<K: ?Sized>(
        &mut self,
        projector: &dyn KeyProjector<K>,
        key: &K,
    ) -> Option<V> {
        let path = self.trace_path(projector, key)?;
        let prune = unwind(&path);

        let removed = self.node_at_mut(&path)?.value.take();
        if prune != Prune::Nothing {
            trace!(?prune, depth = path.len(), "pruned");
            self.unlink(&path, prune);
        }

        removed
    }

    /// Read-only descent along `key`. `None` if the key is empty or any
    /// container on its path is missing.
    fn trace_path<K: ?Sized>(
        &self,
        projector: &dyn KeyProjector<K>,
        key: &K,
    ) -> Option<Vec<Frame>> {
        let mut path = Vec::new();
        let mut level = self;

        while let Some(byte) = projector.project(key, path.len()) {
            let (high, low) = split_nibbles(byte);

            // a missing container means the key was never inserted
            let group = level.groups[high].as_deref()?;
            let node = group.nodes[low].as_deref()?;

            path.push(Frame {
                high,
                low,
                group_children: group.children,
                node_children: node.level.children,
                occupied: node.is_occupied(),
            });
            level = &node.level;
        }

        (!path.is_empty()).then_some(path)
    }

    /// The level holding the byte after `path`.
    fn level_at_mut(&mut self, path: &[Frame]) -> Option<&mut Level<V>> {
        let mut level = self;
        for frame in path {
            let group = level.groups[frame.high].as_deref_mut()?;
            level = &mut group.nodes[frame.low].as_deref_mut()?.level;
        }
        Some(level)
    }

    fn node_at_mut(&mut self, path: &[Frame]) -> Option<&mut ByteNode<V>> {
        let (last, above) = path.split_last()?;
        let group = self.level_at_mut(above)?.groups[last.high].as_deref_mut()?;
        group.nodes[last.low].as_deref_mut()
    }

    fn unlink(&mut self, path: &[Frame], prune: Prune) -> Option<()> {
        match prune {
            Prune::Nothing => {}
            Prune::Node { depth } => {
                let frame = path[depth];
                let level = self.level_at_mut(&path[..depth])?;
                level.groups[frame.high].as_deref_mut()?.release(frame.low);
            }
            Prune::Group { depth } => {
                self.level_at_mut(&path[..depth])?.release(path[depth].high);
            }
        }
        Some(())
    }

    /// Takes every node out of this level, lowest byte first.
    fn detach(&mut self) -> Vec<Box<ByteNode<V>>> {
        self.children = 0;
        self.groups
            .iter_mut()
            .filter_map(Option::take)
            .flat_map(|mut group| group.detach())
            .collect()
    }

    /// Depth-first teardown: children before their parent's value. Every
    /// stored value is passed to `release` exactly once.
    pub(crate) fn drain(&mut self, release: &mut impl FnMut(V)) {
        dismantle(self.detach(), release);
    }
}

/// Walks the recorded path bottom-up, one signal per byte position, and
/// returns the topmost container left empty by taking the terminal value.
fn unwind(path: &[Frame]) -> Prune {
    let mut prune = Prune::Nothing;
    let mut signal = DeleteSignal::End;

    for (depth, frame) in path.iter().enumerate().rev() {
        let emptied = match signal {
            DeleteSignal::Stop => break,
            // terminal: its value goes, it stays if it still routes elsewhere
            DeleteSignal::End => frame.node_children == 0,
            DeleteSignal::Continue { high } => {
                debug_assert_eq!(high, path[depth + 1].high);
                prune = Prune::Group { depth: depth + 1 };
                // the terminal node of a shorter key stays
                frame.node_children == 1 && !frame.occupied
            }
        };

        signal = if !emptied {
            DeleteSignal::Stop
        } else {
            prune = Prune::Node { depth };
            if frame.group_children > 1 {
                DeleteSignal::Stop
            } else {
                DeleteSignal::Continue { high: frame.high }
            }
        };
    }

    if let DeleteSignal::Continue { .. } = signal {
        prune = Prune::Group { depth: 0 };
    }
    prune
}

/// Frees detached nodes without recursing. Each node is expanded once to
/// queue its children, then released after all of them.
fn dismantle<V>(nodes: Vec<Box<ByteNode<V>>>, release: &mut impl FnMut(V)) {
    let mut pending: Vec<_> = nodes
        .into_iter()
        .rev()
        .map(|node| (node, false))
        .collect();

    while let Some((mut node, expanded)) = pending.pop() {
        if expanded {
            if let Some(value) = node.value.take() {
                release(value);
            }
            continue;
        }

        let children = node.level.detach();
        pending.push((node, true));
        pending.extend(children.into_iter().rev().map(|child| (child, false)));
    }
}

impl<V> Drop for Level<V> {
    fn drop(&mut self) {
        // long chains would otherwise drop one stack frame per byte
        if !self.is_empty() {
            dismantle(self.detach(), &mut |value| drop(value));
        }
    }
}

impl<V> Default for Level<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> NibbleGroup<V> {
    pub fn new() -> Self {
        Self {
            children: 0,
            nodes: array::from_fn(|_| None),
        }
    }

    pub fn nodes(&self) -> impl Iterator<Item = (usize, &ByteNode<V>)> {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(i, n)| n.as_deref().map(|node| (i, node)))
    }

    fn node_or_insert(&mut self, low: usize) -> &mut ByteNode<V> {
        let slot = &mut self.nodes[low];
        if slot.is_none() {
            self.children += 1;
        }
        slot.get_or_insert_with(|| Box::new(ByteNode::new()))
    }

    /// Unlinks and frees the node at `low`.
    pub(crate) fn release(&mut self, low: usize) {
        if let Some(node) = self.nodes[low].take() {
            self.children -= 1;
            dismantle(vec![node], &mut |value| drop(value));
        }
    }

    fn detach(&mut self) -> Vec<Box<ByteNode<V>>> {
        self.children = 0;
        self.nodes.iter_mut().filter_map(Option::take).collect()
    }
}

impl<V> Default for NibbleGroup<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> ByteNode<V> {
    pub fn new() -> Self {
        Self {
            value: None,
            level: Level::new(),
        }
    }

    pub fn value(&self) -> Option<&V> {
        self.value.as_ref()
    }

    pub fn is_occupied(&self) -> bool {
        self.value.is_some()
    }

    pub fn level(&self) -> &Level<V> {
        &self.level
    }
}

impl<V> Default for ByteNode<V> {
    fn default() -> Self {
        Self::new()
    }
}
