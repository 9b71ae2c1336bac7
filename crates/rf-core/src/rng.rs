//! Per-worker PRNG provisioning
//!
//! The engine rejects a process-wide singleton RNG (see design notes on
//! replacing singleton loggers/PRNGs with per-worker context) in favor of
//! one stream per worker thread, seeded from a run-wide base seed combined
//! with the worker id. Streams are never shared across workers and are
//! never reseeded mid-run — a session's spins and a player's decisions
//! consume from the same worker stream, which is what gives the
//! single-threaded executor reproducible output for a fixed seed.

use rand_chacha::ChaCha8Rng;
use rand_chacha::rand_core::SeedableRng;

/// The PRNG type used throughout the engine. 64-bit, non-cryptographic,
/// fast: ChaCha8 is the teacher's `rand_chacha` dependency, already used for
/// exactly this purpose in the batch-simulation crate.
pub type SimRng = ChaCha8Rng;

/// Derive a worker's PRNG stream from the run's base seed.
///
/// Combines the base seed with the worker id (and, as an extra salt, the
/// current thread id) so that no two workers ever draw from the same
/// stream, even if the worker id space were to collide across process
/// restarts.
pub fn seed_worker_rng(base_seed: u64, worker_id: usize) -> SimRng {
    let thread_salt = thread_id_salt();
    let seed = base_seed
        .wrapping_mul(0x9E37_79B9_7F4A_7C15)
        .wrapping_add(worker_id as u64)
        .wrapping_add(thread_salt);
    SimRng::seed_from_u64(seed)
}

fn thread_id_salt() -> u64 {
    use std::hash::{Hash, Hasher};
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    std::thread::current().id().hash(&mut hasher);
    hasher.finish()
}
