//! Symbol classification and reel strips

use serde::{Deserialize, Serialize};

/// A symbol is a small non-negative integer; its meaning within a machine
/// comes entirely from the categorization it's assigned in `SymbolSet`.
pub type Symbol = u32;

/// How a machine classifies its symbols. Any symbol in `wild` substitutes
/// for any symbol in `normal` when forming a left-anchored run (§4.2); the
/// single `scatter` symbol triggers free spins when it appears on enough
/// distinct reel columns (§4.3), independent of payline position.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymbolSet {
    pub normal: Vec<Symbol>,
    pub wild: Vec<Symbol>,
    pub scatter: Symbol,
}

impl SymbolSet {
    pub fn is_wild(&self, symbol: Symbol) -> bool {
        self.wild.contains(&symbol)
    }

    pub fn is_scatter(&self, symbol: Symbol) -> bool {
        symbol == self.scatter
    }
}

/// An ordered cyclic sequence of symbols backing one reel column.
///
/// *Invariant*: `symbols` is non-empty; read positions wrap modulo
/// `symbols.len()`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReelStrip {
    pub symbols: Vec<Symbol>,
}

impl ReelStrip {
    pub fn new(symbols: Vec<Symbol>) -> Self {
        assert!(!symbols.is_empty(), "reel strip must not be empty");
        Self { symbols }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        false // constructor enforces non-empty
    }

    /// Symbol at `position`, wrapping modulo the strip length.
    #[inline]
    pub fn symbol_at(&self, position: usize) -> Symbol {
        self.symbols[position % self.symbols.len()]
    }

    /// Read `count` consecutive symbols starting at a uniformly sampled
    /// position (§4.1).
    pub fn window_from(&self, start: usize, count: usize) -> Vec<Symbol> {
        (0..count).map(|i| self.symbol_at(start + i)).collect()
    }
}

/// A named, ordered list of reel strips. The order is the strip's source
/// key order (lexicographic), which is what makes a given seed reproduce an
/// identical grid run after run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReelSet {
    pub reels: Vec<ReelStrip>,
}

impl ReelSet {
    pub fn new(reels: Vec<ReelStrip>) -> Self {
        assert!(!reels.is_empty(), "reel set must have at least one reel");
        Self { reels }
    }

    pub fn num_reels(&self) -> usize {
        self.reels.len()
    }
}
