//! Benchmark utilities and helpers.

use rand::distributions::Alphanumeric;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Generates random string data for benchmarks.
pub fn random_string(rng: &mut StdRng, len: usize) -> String {
    rng.sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// Generates `count` distinct keys in random order.
pub fn shuffled_keys(count: usize) -> Vec<u64> {
    let mut rng = StdRng::seed_from_u64(42);
    let mut keys: Vec<u64> = (1..=count as u64).collect();
    for i in (1..keys.len()).rev() {
        let j = rng.gen_range(0..=i);
        keys.swap(i, j);
    }
    keys
}

/// Generates `(id, name)` rows for SQL benchmarks.
pub fn generate_user_rows(count: usize) -> Vec<(u64, String)> {
    let mut rng = StdRng::seed_from_u64(42);
    let names = [
        "alice", "bob", "carol", "dave", "eve", "frank", "grace", "heidi",
    ];

    (1..=count as u64)
        .map(|id| {
            let name = names[rng.gen_range(0..names.len())];
            (id, format!("{}_{}", name, random_string(&mut rng, 6)))
        })
        .collect()
}
