//! Slot machine: composes a reel set and a paytable into one resolved spin,
//! including scatter-triggered free-spin logic (§4.3, §4.4).

use rand_chacha::rand_core::RngCore;
use serde::{Deserialize, Serialize};

use crate::config::MachineConfig;
use crate::spin::{SpinGrid, sample_grid};

/// The minimum number of distinct scatter reel columns needed to trigger
/// free spins (§1.2, §8 scenario 4/5).
const SCATTER_TRIGGER_COLUMNS: usize = 3;

/// Outcome of resolving one spin. Free-spin state (whether we were in free
/// spins, how many remain) is owned by the session controller, not the
/// machine (§4.6: machine instances are reset to bare config on pool
/// return) — the machine only reports what this one spin produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpinOutcome {
    pub grid: SpinGrid,
    /// Total win across the first `active_lines` paylines, already scaled
    /// by the free-spin multiplier when `in_free_spins` is true.
    pub win: f64,
    /// Whether this spin triggers free spins. Always `false` when
    /// `in_free_spins` is true (§4.3: re-triggering is disabled).
    pub trigger_free_spins: bool,
    /// Remaining free spins after this one, when `in_free_spins` is true.
    pub free_spins_remaining_after: u32,
    pub in_free_spins: bool,
}

/// Composes a machine's reel set and paytable to resolve spins. Carries no
/// mutable state of its own beyond the config it was built from — the
/// instance pool resets it by discarding and rebuilding from the same
/// `MachineConfig` (§4.6).
pub struct SlotMachine {
    config: MachineConfig,
}

impl SlotMachine {
    pub fn new(config: MachineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MachineConfig {
        &self.config
    }

    /// Resolve one spin: sample the grid, evaluate the first `active_lines`
    /// paylines with wild substitution, and check for a scatter-triggered
    /// free-spin grant.
    pub fn spin(
        &self,
        bet: f64,
        in_free_spins: bool,
        remaining: u32,
        rng: &mut dyn RngCore,
    ) -> SpinOutcome {
        let reel_set = self.config.reel_set_for(in_free_spins);
        let grid = sample_grid(reel_set, self.config.window_size, rng);

        let mut win: f64 = self
            .config
            .paylines
            .iter()
            .take(self.config.active_lines)
            .map(|line| self.config.paytable.evaluate_line(&grid, line, &self.config.symbols) * bet)
            .sum();

        if in_free_spins {
            win *= self.config.free_spins_multiplier;
        }

        let scatter_columns = grid.columns_containing(self.config.symbols.scatter);
        // Re-triggering during free-spin mode is disabled (§4.3, §9).
        let trigger_free_spins = !in_free_spins && scatter_columns >= SCATTER_TRIGGER_COLUMNS;

        let free_spins_remaining_after = if in_free_spins {
            remaining.saturating_sub(1)
        } else {
            0
        };

        SpinOutcome {
            grid,
            win,
            trigger_free_spins,
            free_spins_remaining_after,
            in_free_spins,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BetTable;
    use crate::paytable::{PayTable, Payline};
    use crate::symbols::{ReelSet, ReelStrip, SymbolSet};
    use rand_chacha::ChaCha8Rng;
    use rand_chacha::rand_core::SeedableRng;
    use std::collections::{BTreeMap, HashMap};

    fn machine_with(
        reel_sets: BTreeMap<String, ReelSet>,
        paytable: PayTable,
        symbols: SymbolSet,
        window_size: usize,
    ) -> SlotMachine {
        SlotMachine::new(MachineConfig {
            id: "m".to_string(),
            reel_sets,
            paylines: vec![Payline::straight(0, 5)],
            paytable,
            bet_table: BetTable {
                by_currency: BTreeMap::new(),
            },
            symbols,
            window_size,
            active_lines: 1,
            free_spins_count: 10,
            free_spins_multiplier: 2.0,
        })
    }

    /// Scenario 1 (§8): five reels of a single symbol, one payline, always
    /// wins 5-of-a-kind.
    #[test]
    fn trivial_win_scenario() {
        let mut reel_sets = BTreeMap::new();
        reel_sets.insert(
            "normal".to_string(),
            ReelSet::new((0..5).map(|_| ReelStrip::new(vec![1])).collect()),
        );
        let mut payouts = HashMap::new();
        payouts.insert(1, vec![1.0, 2.0, 5.0]);
        let symbols = SymbolSet {
            normal: vec![1],
            wild: vec![],
            scatter: 9,
        };
        let machine = machine_with(reel_sets, PayTable { payouts }, symbols, 1);
        let mut rng = ChaCha8Rng::seed_from_u64(0);

        let mut total_bet = 0.0;
        let mut total_win = 0.0;
        for _ in 0..10 {
            let outcome = machine.spin(1.0, false, 0, &mut rng);
            total_bet += 1.0;
            total_win += outcome.win;
            assert_eq!(outcome.win, 5.0);
        }
        assert_eq!(total_bet, 10.0);
        assert_eq!(total_win, 50.0);
        assert_eq!(total_win / total_bet, 5.0);
    }

    /// Scenario 2 (§8): alternating symbols, no win.
    #[test]
    fn no_pay_spin_scenario() {
        let mut reel_sets = BTreeMap::new();
        reel_sets.insert(
            "normal".to_string(),
            ReelSet::new(vec![
                ReelStrip::new(vec![1]),
                ReelStrip::new(vec![2]),
                ReelStrip::new(vec![1]),
                ReelStrip::new(vec![2]),
                ReelStrip::new(vec![1]),
            ]),
        );
        let mut payouts = HashMap::new();
        payouts.insert(1, vec![1.0, 2.0, 5.0]);
        payouts.insert(2, vec![1.0, 2.0, 5.0]);
        let symbols = SymbolSet {
            normal: vec![1, 2],
            wild: vec![],
            scatter: 9,
        };
        let machine = machine_with(reel_sets, PayTable { payouts }, symbols, 1);
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let outcome = machine.spin(1.0, false, 0, &mut rng);
        assert_eq!(outcome.win, 0.0);
    }

    /// Scenario 3 (§8): wild substitution, W,A,A,A,X -> run=4.
    #[test]
    fn wild_substitution_scenario() {
        let mut reel_sets = BTreeMap::new();
        reel_sets.insert(
            "normal".to_string(),
            ReelSet::new(vec![
                ReelStrip::new(vec![0]), // wild
                ReelStrip::new(vec![1]),
                ReelStrip::new(vec![1]),
                ReelStrip::new(vec![1]),
                ReelStrip::new(vec![5]),
            ]),
        );
        let mut payouts = HashMap::new();
        payouts.insert(1, vec![1.0, 2.0, 5.0]);
        let symbols = SymbolSet {
            normal: vec![1, 5],
            wild: vec![0],
            scatter: 9,
        };
        let machine = machine_with(reel_sets, PayTable { payouts }, symbols, 1);
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let outcome = machine.spin(1.0, false, 0, &mut rng);
        assert_eq!(outcome.win, 2.0);
    }

    /// Scenario 4 (§8): scatter on 3 distinct columns triggers free spins.
    #[test]
    fn scatter_trigger_on_three_columns() {
        let mut reel_sets = BTreeMap::new();
        reel_sets.insert(
            "normal".to_string(),
            ReelSet::new(vec![
                ReelStrip::new(vec![9]), // scatter
                ReelStrip::new(vec![1]),
                ReelStrip::new(vec![9]), // scatter
                ReelStrip::new(vec![1]),
                ReelStrip::new(vec![9]), // scatter
            ]),
        );
        let symbols = SymbolSet {
            normal: vec![1],
            wild: vec![],
            scatter: 9,
        };
        let machine = machine_with(reel_sets, PayTable { payouts: HashMap::new() }, symbols, 1);
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let outcome = machine.spin(1.0, false, 0, &mut rng);
        assert!(outcome.trigger_free_spins);
    }

    /// Scenario 5 (§8): scatter on only 2 columns does not trigger.
    #[test]
    fn scatter_on_two_columns_does_not_trigger() {
        let mut reel_sets = BTreeMap::new();
        reel_sets.insert(
            "normal".to_string(),
            ReelSet::new(vec![
                ReelStrip::new(vec![9]),
                ReelStrip::new(vec![1]),
                ReelStrip::new(vec![9]),
                ReelStrip::new(vec![1]),
                ReelStrip::new(vec![1]),
            ]),
        );
        let symbols = SymbolSet {
            normal: vec![1],
            wild: vec![],
            scatter: 9,
        };
        let machine = machine_with(reel_sets, PayTable { payouts: HashMap::new() }, symbols, 1);
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let outcome = machine.spin(1.0, false, 0, &mut rng);
        assert!(!outcome.trigger_free_spins);
    }

    #[test]
    fn free_spin_mode_never_retriggers() {
        let mut reel_sets = BTreeMap::new();
        reel_sets.insert(
            "normal".to_string(),
            ReelSet::new(vec![
                ReelStrip::new(vec![9]),
                ReelStrip::new(vec![9]),
                ReelStrip::new(vec![9]),
                ReelStrip::new(vec![9]),
                ReelStrip::new(vec![9]),
            ]),
        );
        let symbols = SymbolSet {
            normal: vec![1],
            wild: vec![],
            scatter: 9,
        };
        let machine = machine_with(reel_sets, PayTable { payouts: HashMap::new() }, symbols, 1);
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let outcome = machine.spin(1.0, true, 4, &mut rng);
        assert!(!outcome.trigger_free_spins);
        assert_eq!(outcome.free_spins_remaining_after, 3);
    }

    #[test]
    fn free_spin_multiplier_scales_win() {
        let mut reel_sets = BTreeMap::new();
        reel_sets.insert(
            "normal".to_string(),
            ReelSet::new((0..5).map(|_| ReelStrip::new(vec![1])).collect()),
        );
        let mut payouts = HashMap::new();
        payouts.insert(1, vec![1.0, 2.0, 5.0]);
        let symbols = SymbolSet {
            normal: vec![1],
            wild: vec![],
            scatter: 9,
        };
        let machine = machine_with(reel_sets, PayTable { payouts }, symbols, 1);
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let outcome = machine.spin(1.0, true, 1, &mut rng);
        assert_eq!(outcome.win, 10.0); // 5.0 base * 2.0 multiplier
    }
}
