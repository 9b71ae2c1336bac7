//! Simulation-run record (the third record type from the external loader;
//! see spec §6 "Configuration intake").

use serde::{Deserialize, Serialize};

/// Per-run parameters: how many sessions to run per (machine, player) pair,
/// the per-session caps, and the sink's batching knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationRunConfig {
    /// Output directory; a timestamped `simulation_<ts>/` subdirectory is
    /// created under it for each run.
    pub base_dir: String,

    /// Independent sessions run per (machine, player) pair.
    pub sessions_per_pair: u32,

    /// Worker count override; `None` uses hardware concurrency.
    pub threads: Option<usize>,

    /// Base seed combined with worker id to derive each worker's PRNG stream.
    pub seed: u64,

    /// Hard cap on spins per session.
    pub max_spins: u64,

    /// Hard cap on wall-clock session duration, in seconds.
    pub max_wall_duration_secs: f64,

    /// Hard cap on the logical (simulated think-time) clock, in seconds.
    pub max_logical_duration_secs: f64,

    /// Session records buffered before a batch flush to CSV.
    pub batch_write_size: usize,

    /// Spin records buffered before backpressure blocks publishers.
    pub max_spin_buffer_size: usize,

    /// Whether to record per-spin raw records at all.
    pub record_raw_spins: bool,
}

impl Default for SimulationRunConfig {
    fn default() -> Self {
        Self {
            base_dir: "output".to_string(),
            sessions_per_pair: 1000,
            threads: None,
            seed: 0x5EED_0000_0000_0001,
            max_spins: 10_000,
            max_wall_duration_secs: 60.0,
            max_logical_duration_secs: 3600.0,
            batch_write_size: 300,
            max_spin_buffer_size: 10_000,
            record_raw_spins: false,
        }
    }
}
