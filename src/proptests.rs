use super::trie::{StringBytes, Trie, TrieConfig};

use proptest::prelude::*;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[derive(Clone, Debug)]
enum Op {
    Insert(String, u32),
    Delete(String),
}

fn key() -> impl Strategy<Value = String> {
    // tiny alphabet so keys share prefixes and collide
    "[abc]{1,4}"
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (key(), any::<u32>()).prop_map(|(k, v)| Op::Insert(k, v)),
        2 => key().prop_map(Op::Delete),
    ]
}

fn validate_trie<V>(t: &Trie<str, V>) {
    let stats = t.stats();
    assert_eq!(stats.miscounted, 0, "occupied-slot count out of sync");
    assert_eq!(
        stats.dead_ends, 0,
        "container left behind with no value under it"
    );
    assert_eq!(stats.values, t.len(), "len must match occupied nodes");
}

proptest! {
    #[test]
    fn matches_hashmap_model(ops in prop::collection::vec(op(), 0..200)) {
        let released = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&released);
        let mut trie = Trie::<str, u32>::with_config(
            TrieConfig::with_accessor(StringBytes)
                .deallocator(move |v: u32| sink.lock().unwrap().push(v)),
        );
        let mut model: HashMap<String, u32> = HashMap::new();
        let mut expected_released = Vec::new();

        for op in &ops {
            match op {
                Op::Insert(k, v) => {
                    trie.insert(k, *v).unwrap();
                    if let Some(old) = model.insert(k.clone(), *v) {
                        expected_released.push(old);
                    }
                }
                Op::Delete(k) => {
                    let removed = model.remove(k);
                    prop_assert_eq!(trie.delete(k).unwrap(), removed.is_some());
                    expected_released.extend(removed);
                }
            }
            validate_trie(&trie);
        }

        for (k, v) in &model {
            prop_assert_eq!(trie.get(k), Some(v));
        }
        prop_assert_eq!(&*released.lock().unwrap(), &expected_released);

        // drain everything: back to a fresh trie
        let keys: Vec<String> = model.keys().cloned().collect();
        for k in &keys {
            prop_assert!(trie.delete(k).unwrap());
        }
        prop_assert_eq!(trie.stats().containers(), 0);
        prop_assert!(trie.root.is_empty());
    }

    #[test]
    fn absent_delete_changes_nothing(
        keys in prop::collection::hash_set(key(), 1..20),
        absent in key(),
    ) {
        let mut trie = Trie::<str, u32>::with_config(TrieConfig::with_accessor(StringBytes));
        for (i, k) in keys.iter().enumerate() {
            trie.insert(k, i as u32).unwrap();
        }
        prop_assume!(!keys.contains(&absent));

        let before = trie.stats();
        prop_assert!(!trie.delete(&absent).unwrap());
        prop_assert_eq!(trie.stats(), before);
        for (i, k) in keys.iter().enumerate() {
            prop_assert_eq!(trie.search(k), i as u32);
        }
    }

    #[test]
    fn decimal_keys_round_trip(keys in prop::collection::vec(any::<u64>(), 1..100)) {
        let mut trie = Trie::<u64, u64>::new();
        for k in &keys {
            trie.insert(k, k.wrapping_add(1)).unwrap();
        }
        for k in &keys {
            prop_assert_eq!(trie.search(k), k.wrapping_add(1));
        }
    }
}
