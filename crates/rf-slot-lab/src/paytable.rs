//! Payline definitions and wild-substitution win evaluation (§4.2)

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::spin::SpinGrid;
use crate::symbols::{Symbol, SymbolSet};

/// A fixed sequence of grid row indices, one per reel, specifying which
/// cell of each reel column contributes to this line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payline {
    pub rows: Vec<usize>,
}

impl Payline {
    pub fn straight(row: usize, num_reels: usize) -> Self {
        Self {
            rows: vec![row; num_reels],
        }
    }
}

/// `normal-symbol -> payout vector`, index `k` giving the payout multiplier
/// for `(k + 3)` consecutive matching symbols starting from the leftmost
/// reel. Vectors have length >= 3 (checked at load time, not here).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayTable {
    pub payouts: HashMap<Symbol, Vec<f64>>,
}

impl PayTable {
    pub fn max_payout(&self) -> f64 {
        self.payouts
            .values()
            .flat_map(|row| row.iter().copied())
            .fold(0.0_f64, f64::max)
    }

    /// Payout multiplier for `anchor` at run length `match_count`, clamping
    /// to the last entry for runs longer than the table (§4.2, §8 boundary
    /// test: "a paytable row of length exactly 3 must not crash on 5-of-a-
    /// kind").
    fn payout_for(&self, anchor: Symbol, match_count: usize) -> Option<f64> {
        let row = self.payouts.get(&anchor)?;
        if row.is_empty() {
            return None;
        }
        let idx = (match_count - 3).min(row.len() - 1);
        Some(row[idx])
    }

    /// Evaluate one payline against a grid, returning the win amount in bet
    /// units (caller multiplies by `bet_amount`).
    ///
    /// Contract (§4.2):
    /// - `anchor` is the first non-wild symbol on the line, scanning
    ///   left-to-right; if every symbol is wild, the run is all-wild.
    /// - The run extends from `s0` while each symbol equals `anchor` or is
    ///   wild; the first symbol that is neither ends the run.
    /// - An all-wild run pays the wild's own row if the paytable defines
    ///   one; otherwise it pays nothing.
    /// - Runs under length 3 pay nothing.
    pub fn evaluate_line(
        &self,
        grid: &SpinGrid,
        payline: &Payline,
        symbols: &SymbolSet,
    ) -> f64 {
        let line: Vec<Symbol> = payline
            .rows
            .iter()
            .enumerate()
            .map(|(reel, &row)| grid.cell(reel, row))
            .collect();

        let anchor = line
            .iter()
            .find(|&&s| !symbols.is_wild(s))
            .copied();

        let anchor = match anchor {
            Some(a) => a,
            // All-wild line: pay the wild's own row if one exists.
            None => match line.first() {
                Some(&wild) => wild,
                None => return 0.0,
            },
        };

        let mut match_count = 0usize;
        for &symbol in &line {
            if symbol == anchor || symbols.is_wild(symbol) {
                match_count += 1;
            } else {
                break;
            }
        }

        if match_count < 3 {
            return 0.0;
        }

        self.payout_for(anchor, match_count).unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spin::SpinGrid;

    fn symbols() -> SymbolSet {
        SymbolSet {
            normal: vec![1, 2],
            wild: vec![0],
            scatter: 9,
        }
    }

    #[test]
    fn wild_substitution_extends_run() {
        // W,A,A,A,X -> anchor=A, run=4
        let grid = SpinGrid::new(5, 1, vec![0, 1, 1, 1, 2]);
        let payline = Payline::straight(0, 5);
        let mut payouts = HashMap::new();
        payouts.insert(1, vec![1.0, 2.0, 5.0]);
        let table = PayTable { payouts };
        let win = table.evaluate_line(&grid, &payline, &symbols());
        assert_eq!(win, 2.0);
    }

    #[test]
    fn run_under_three_pays_nothing() {
        let grid = SpinGrid::new(5, 1, vec![1, 2, 1, 2, 1]);
        let payline = Payline::straight(0, 5);
        let mut payouts = HashMap::new();
        payouts.insert(1, vec![1.0, 2.0, 5.0]);
        payouts.insert(2, vec![1.0, 2.0, 5.0]);
        let table = PayTable { payouts };
        assert_eq!(table.evaluate_line(&grid, &payline, &symbols()), 0.0);
    }

    #[test]
    fn run_longer_than_table_clamps_to_last_entry() {
        let grid = SpinGrid::new(5, 1, vec![1, 1, 1, 1, 1]);
        let payline = Payline::straight(0, 5);
        let mut payouts = HashMap::new();
        payouts.insert(1, vec![1.0, 2.0, 5.0]); // length 3, 5-of-a-kind must clamp
        let table = PayTable { payouts };
        assert_eq!(table.evaluate_line(&grid, &payline, &symbols()), 5.0);
    }

    #[test]
    fn all_wild_line_pays_wild_row_if_defined() {
        let grid = SpinGrid::new(5, 1, vec![0, 0, 0, 0, 0]);
        let payline = Payline::straight(0, 5);
        let mut payouts = HashMap::new();
        payouts.insert(0, vec![10.0, 20.0, 50.0]);
        let table = PayTable { payouts };
        assert_eq!(table.evaluate_line(&grid, &payline, &symbols()), 50.0);
    }

    #[test]
    fn all_wild_line_pays_nothing_without_wild_row() {
        let grid = SpinGrid::new(5, 1, vec![0, 0, 0, 0, 0]);
        let payline = Payline::straight(0, 5);
        let table = PayTable {
            payouts: HashMap::new(),
        };
        assert_eq!(table.evaluate_line(&grid, &payline, &symbols()), 0.0);
    }
}
