//! Spin grid assembly

use rand_chacha::rand_core::RngCore;
use serde::{Deserialize, Serialize};

use crate::symbols::{ReelSet, Symbol};

/// A flat, row-major spin grid: `cell(reel, row)` is the symbol visible at
/// that reel column and window row.
///
/// Committed layout (§4.1): row-major, `grid[reel * window_size + row]`.
/// Every accessor in the crate (payline extraction, scatter detection) goes
/// through `cell`/`cell_for_reel` so the layout only needs to be correct in
/// one place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpinGrid {
    pub cells: Vec<Symbol>,
    pub num_reels: usize,
    pub window_size: usize,
}

impl SpinGrid {
    pub fn new(num_reels: usize, window_size: usize, cells: Vec<Symbol>) -> Self {
        assert_eq!(
            cells.len(),
            num_reels * window_size,
            "grid length must equal num_reels * window_size"
        );
        Self {
            cells,
            num_reels,
            window_size,
        }
    }

    #[inline]
    pub fn cell(&self, reel: usize, row: usize) -> Symbol {
        self.cells[reel * self.window_size + row]
    }

    /// All symbols visible on one reel column, top to bottom.
    pub fn column(&self, reel: usize) -> &[Symbol] {
        let start = reel * self.window_size;
        &self.cells[start..start + self.window_size]
    }

    /// Distinct reel columns on which `symbol` appears anywhere in the
    /// window (used by scatter detection, §4.3).
    pub fn columns_containing(&self, symbol: Symbol) -> usize {
        (0..self.num_reels)
            .filter(|&reel| self.column(reel).contains(&symbol))
            .count()
    }
}

/// Sample a spin grid from a reel set: draw a uniform start position per
/// reel and read `window_size` consecutive symbols (§4.1).
pub fn sample_grid(reel_set: &ReelSet, window_size: usize, rng: &mut dyn RngCore) -> SpinGrid {
    let num_reels = reel_set.num_reels();
    let mut cells = Vec::with_capacity(num_reels * window_size);
    for strip in &reel_set.reels {
        let start = (rng.next_u64() as usize) % strip.len();
        cells.extend(strip.window_from(start, window_size));
    }
    SpinGrid::new(num_reels, window_size, cells)
}
