use nibble_trie::{
    BigEndian, Key32, MinimalBytes, Result, Slot, StringBytes, SyncTrie, Trie, TrieConfig,
    TrieError,
};
use rand::random;
use std::sync::Arc;
use std::thread;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();

    // decimal-digit keys
    let mut numbers = Trie::new();
    numbers.insert(&1u64, 100u64)?;
    numbers.insert(&2u64, 200u64)?;
    numbers.insert(&12u64, 1200u64)?;
    info!(
        one = numbers.search(&1),
        two = numbers.search(&2),
        "decimal keys"
    );
    numbers.delete(&1)?;
    info!(
        one = numbers.search(&1),
        twelve = numbers.search(&12),
        "after delete"
    );
    numbers.print_tree();
    numbers.destroy();

    // the same integers, one byte per base-256 digit
    let mut compact = Trie::<u32, u64>::with_config(TrieConfig::with_accessor(MinimalBytes));
    compact.insert(&0x0102, 1)?;
    compact.insert(&0x01, 2)?;
    compact.print_tree();

    // string keys, tagged values, deallocator
    let config = TrieConfig::with_accessor(StringBytes)
        .deallocator(|slot: Slot| info!(?slot, "released"));
    let mut words = Trie::<str, Slot>::with_config(config);
    words.insert("cat", Slot::from(1u8))?;
    words.insert("car", Slot::from(2.5f64))?;
    words.insert("cart", Slot::from(-7i32))?;
    words.delete("cat")?;
    words.print_tree();
    info!(stats = ?words.stats(), "string trie");
    drop(words);

    // hashed fixed-width keys shared across threads
    let config = TrieConfig::with_accessor(BigEndian);
    let shared = Arc::new(SyncTrie::<Key32, u64>::with_config(config));
    let workers: Vec<_> = (0..4)
        .map(|_| {
            let shared = Arc::clone(&shared);
            thread::spawn(move || {
                for _ in 0..250 {
                    let n = random::<u64>();
                    shared.insert(&Key32::keccak(n.to_be_bytes()), n)?;
                }
                Ok::<_, TrieError>(())
            })
        })
        .collect();

    for worker in workers {
        worker.join().expect("worker panicked")?;
    }

    let stats = shared.stats();
    info!(
        len = shared.len(),
        containers = stats.containers(),
        consistent = stats.is_consistent(),
        "hashed keys"
    );

    Ok(())
}
