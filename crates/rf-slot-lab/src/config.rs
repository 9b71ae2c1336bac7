//! Machine configuration and bet tables (§3 "Machine configuration")

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use rf_core::CoreError;

use crate::paytable::{PayTable, Payline};
use crate::symbols::{ReelSet, SymbolSet};

/// For each currency code, an ordered list of admissible bet amounts. A bet
/// is valid iff it's a member of this list *and* <= the current balance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BetTable {
    pub by_currency: BTreeMap<String, Vec<f64>>,
}

impl BetTable {
    pub fn bets_for(&self, currency: &str) -> &[f64] {
        self.by_currency
            .get(currency)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    pub fn is_valid_bet(&self, currency: &str, bet: f64, balance: f64) -> bool {
        bet <= balance && self.bets_for(currency).contains(&bet)
    }
}

/// A machine's full configuration: reel sets, paylines, paytable, bet
/// table, symbol categorization, and the free-spin grant/multiplier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MachineConfig {
    pub id: String,
    /// Reel sets keyed by name ("normal" is required, "bonus" is optional
    /// and used during free spins when present). Stored as a `BTreeMap` so
    /// iteration order is the deterministic lexicographic key order §4.1
    /// requires for seed reproducibility.
    pub reel_sets: BTreeMap<String, ReelSet>,
    pub paylines: Vec<Payline>,
    pub paytable: PayTable,
    pub bet_table: BetTable,
    pub symbols: SymbolSet,
    pub window_size: usize,
    pub active_lines: usize,
    pub free_spins_count: u32,
    pub free_spins_multiplier: f64,
}

impl MachineConfig {
    pub const NORMAL_REEL_SET: &'static str = "normal";
    pub const BONUS_REEL_SET: &'static str = "bonus";

    /// The reel set used while spinning; falls back to `normal` when no
    /// `bonus` set is configured (§4.3).
    pub fn reel_set_for(&self, in_free_spins: bool) -> &ReelSet {
        if in_free_spins {
            if let Some(bonus) = self.reel_sets.get(Self::BONUS_REEL_SET) {
                return bonus;
            }
        }
        self.reel_sets
            .get(Self::NORMAL_REEL_SET)
            .expect("machine config must carry a normal reel set (checked at load time)")
    }

    /// Checks the invariants the core relies on (spec §6): non-empty reel
    /// sets, non-empty paylines, payout vectors of length >= 3,
    /// `active_lines <= paylines.len()`.
    pub fn validate(&self) -> Result<(), CoreError> {
        let fail = |reason: &str| CoreError::InvalidMachine {
            id: self.id.clone(),
            reason: reason.to_string(),
        };

        if !self.reel_sets.contains_key(Self::NORMAL_REEL_SET) {
            return Err(fail("missing 'normal' reel set"));
        }
        for (name, set) in &self.reel_sets {
            if set.reels.is_empty() {
                return Err(fail(&format!("reel set '{name}' has no reels")));
            }
            for reel in &set.reels {
                if reel.symbols.is_empty() {
                    return Err(fail(&format!("reel set '{name}' has an empty reel strip")));
                }
            }
        }
        if self.paylines.is_empty() {
            return Err(fail("no paylines configured"));
        }
        if self.active_lines > self.paylines.len() {
            return Err(fail("active_lines exceeds configured payline count"));
        }
        for (symbol, row) in &self.paytable.payouts {
            if row.len() < 3 {
                return Err(fail(&format!(
                    "paytable row for symbol {symbol} has fewer than 3 entries"
                )));
            }
        }
        Ok(())
    }
}
