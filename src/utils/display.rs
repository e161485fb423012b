use crate::trie::Trie;
use crate::trie::node::{ByteNode, Level};
use std::fmt;

/// Census of the containers reachable from a trie's root.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct TrieStats {
    pub nibble_groups: usize,
    pub byte_nodes: usize,
    pub values: usize,
    /// Containers whose occupied-slot count disagrees with their children.
    pub miscounted: usize,
    /// Containers that lead to no value: empty nibble groups and unoccupied
    /// byte nodes without children. Only an interrupted insert leaves these.
    pub dead_ends: usize,
}

impl TrieStats {
    pub fn containers(&self) -> usize {
        self.nibble_groups + self.byte_nodes
    }

    /// No miscounted or unreachable-value containers.
    pub fn is_consistent(&self) -> bool {
        self.miscounted == 0 && self.dead_ends == 0
    }

    fn walk<V>(&mut self, root: &Level<V>) {
        let mut pending = vec![root];

        while let Some(level) = pending.pop() {
            if level.groups().count() != level.children as usize {
                self.miscounted += 1;
            }

            for (_, group) in level.groups() {
                self.nibble_groups += 1;

                let nodes = group.nodes().count();
                if nodes != group.children as usize {
                    self.miscounted += 1;
                }
                if nodes == 0 {
                    self.dead_ends += 1;
                }

                for (_, node) in group.nodes() {
                    self.byte_nodes += 1;

                    if node.is_occupied() {
                        self.values += 1;
                    } else if node.level().groups().next().is_none() {
                        self.dead_ends += 1;
                    }

                    pending.push(node.level());
                }
            }
        }
    }
}

impl<K: ?Sized, V> Trie<K, V> {
    /// Walks the whole structure and counts what is live.
    pub fn stats(&self) -> TrieStats {
        let mut stats = TrieStats::default();
        stats.walk(&self.root);
        stats
    }
}

impl<K: ?Sized, V: fmt::Debug> Trie<K, V> {
    pub fn print_tree(&self) {
        print!("{}", self);
    }
}

/// Nodes of one level with their full key byte, in byte order.
fn entries<V>(level: &Level<V>) -> Vec<(u8, &ByteNode<V>)> {
    level
        .groups()
        .flat_map(|(high, group)| {
            group
                .nodes()
                .map(move |(low, node)| ((high << 4 | low) as u8, node))
        })
        .collect()
}

fn fmt_levels<V: fmt::Debug>(f: &mut fmt::Formatter, root: &Level<V>) -> fmt::Result {
    // (nodes of a level, next one to print, prefix of its lines)
    let mut stack = vec![(entries(root), 0, String::new())];

    while let Some((nodes, next, prefix)) = stack.last_mut() {
        let Some(&(byte, node)) = nodes.get(*next) else {
            stack.pop();
            continue;
        };
        *next += 1;
        let is_last = *next == nodes.len();
        let connector = if is_last { "└── " } else { "├── " };

        write!(f, "{}{}{}", prefix, connector, hex::encode([byte]))?;
        match node.value() {
            Some(value) => writeln!(f, " = {:?}", value)?,
            None => writeln!(f)?,
        }

        let child_prefix = format!("{}{}", prefix, if is_last { "    " } else { "│   " });
        stack.push((entries(node.level()), 0, child_prefix));
    }

    Ok(())
}

impl<K: ?Sized, V: fmt::Debug> fmt::Display for Trie<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Trie ({} values)", self.len())?;
        fmt_levels(f, &self.root)
    }
}
