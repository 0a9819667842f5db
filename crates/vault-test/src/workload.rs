//! Workload generators.

use rand::distributions::Alphanumeric;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Generates a random alphanumeric string.
pub fn random_string(rng: &mut StdRng, len: usize) -> String {
    rng.sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// Generates `count` INSERT statements for `T(id, name)` with ids from 1.
pub fn insert_statements(table: &str, count: usize) -> Vec<String> {
    let mut rng = StdRng::seed_from_u64(42);
    let names = [
        "alice", "bob", "carol", "dave", "eve", "frank", "grace", "heidi",
    ];

    (1..=count)
        .map(|id| {
            let name = names[rng.gen_range(0..names.len())];
            let suffix = random_string(&mut rng, 4);
            format!("INSERT INTO {table} (id, name) VALUES ({id}, '{name}_{suffix}')")
        })
        .collect()
}

/// Generates a shuffled sequence of `count` distinct keys below `bound`.
///
/// # Panics
///
/// Panics if `count > bound`.
pub fn distinct_keys(count: usize, bound: u64, seed: u64) -> Vec<u64> {
    assert!(count as u64 <= bound, "cannot draw {count} keys below {bound}");
    let mut rng = StdRng::seed_from_u64(seed);
    let mut seen = std::collections::HashSet::with_capacity(count);
    let mut keys = Vec::with_capacity(count);
    while keys.len() < count {
        let key = rng.gen_range(0..bound);
        if seen.insert(key) {
            keys.push(key);
        }
    }
    keys
}
