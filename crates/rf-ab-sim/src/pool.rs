//! Per-worker instance pool (§4.6).
//!
//! Strictly thread-local: one `InstancePool` lives inside each worker
//! thread and is never shared. `borrow` pops from the local LIFO stack or
//! builds via the factory on a miss; `return` resets the instance and
//! pushes it back if there's room, else drops it.

use std::collections::HashMap;

use rand_chacha::rand_core::RngCore;
use rf_core::Fingerprint;
use rf_players::Player;
use rf_slot_lab::SlotMachine;

use crate::catalog::{MachineCatalog, PlayerCatalog};
use crate::error::ExecutorResult;

pub const DEFAULT_POOL_CAPACITY: usize = 3;

pub struct InstancePool {
    capacity: usize,
    players: HashMap<Fingerprint, Vec<Player>>,
    machines: HashMap<Fingerprint, Vec<SlotMachine>>,
}

impl InstancePool {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            players: HashMap::new(),
            machines: HashMap::new(),
        }
    }

    pub fn borrow_player(
        &mut self,
        fingerprint: &Fingerprint,
        catalog: &PlayerCatalog,
        rng: &mut dyn RngCore,
    ) -> ExecutorResult<Player> {
        if let Some(stack) = self.players.get_mut(fingerprint) {
            if let Some(player) = stack.pop() {
                return Ok(player);
            }
        }
        catalog.build(&fingerprint.player_version, &fingerprint.player_cluster, rng)
    }

    pub fn borrow_machine(
        &mut self,
        fingerprint: &Fingerprint,
        catalog: &MachineCatalog,
    ) -> ExecutorResult<SlotMachine> {
        if let Some(stack) = self.machines.get_mut(fingerprint) {
            if let Some(machine) = stack.pop() {
                return Ok(machine);
            }
        }
        catalog.build(&fingerprint.machine_id)
    }

    /// Reset and return a player to the pool, dropping it if the stack is
    /// already at capacity (§4.6).
    pub fn return_player(&mut self, fingerprint: Fingerprint, mut player: Player, rng: &mut dyn RngCore) {
        player.reset(rng);
        let stack = self.players.entry(fingerprint).or_default();
        if stack.len() < self.capacity {
            stack.push(player);
        }
    }

    /// Return a machine to the pool. `SlotMachine` carries no mutable
    /// runtime state beyond its config, so "reset" is a no-op here.
    pub fn return_machine(&mut self, fingerprint: Fingerprint, machine: SlotMachine) {
        let stack = self.machines.entry(fingerprint).or_default();
        if stack.len() < self.capacity {
            stack.push(machine);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand_chacha::rand_core::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use rf_core::{MachineId, PlayerCluster, PlayerVersion};
    use rf_players::{BalanceDistribution, PlayerProfile};
    use rf_slot_lab::{BetTable, MachineConfig, PayTable, Payline, ReelSet, ReelStrip, SymbolSet};
    use crate::catalog::PlayerEntry;
    use std::collections::BTreeMap as Map;

    fn fingerprint() -> Fingerprint {
        Fingerprint {
            player_version: PlayerVersion::from("v1"),
            player_cluster: PlayerCluster::from("default"),
            machine_id: MachineId::from("m1"),
        }
    }

    fn machine_catalog() -> MachineCatalog {
        let mut catalog = MachineCatalog::default();
        let mut reel_sets = Map::new();
        reel_sets.insert("normal".to_string(), ReelSet::new(vec![ReelStrip::new(vec![1])]));
        catalog.register(
            MachineId::from("m1"),
            MachineConfig {
                id: "m1".to_string(),
                reel_sets,
                paylines: vec![Payline::straight(0, 1)],
                paytable: PayTable {
                    payouts: std::collections::HashMap::new(),
                },
                bet_table: BetTable {
                    by_currency: Map::new(),
                },
                symbols: SymbolSet {
                    normal: vec![1],
                    wild: vec![],
                    scatter: 9,
                },
                window_size: 1,
                active_lines: 1,
                free_spins_count: 10,
                free_spins_multiplier: 1.0,
            },
        );
        catalog
    }

    fn player_catalog() -> PlayerCatalog {
        let mut catalog = PlayerCatalog::default();
        catalog.register(PlayerEntry {
            profile: PlayerProfile {
                id: "p1".to_string(),
                currency: "USD".to_string(),
                model_version: "random".to_string(),
                balance_distribution: BalanceDistribution {
                    mu: 100.0,
                    sigma: 0.0,
                    min: 100.0,
                    max: 100.0,
                },
                config: serde_json::json!({}),
            },
            player_version: PlayerVersion::from("v1"),
            player_cluster: PlayerCluster::from("default"),
        });
        catalog
    }

    #[test]
    fn borrow_builds_on_miss_and_reuses_after_return() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let machines = machine_catalog();
        let players = player_catalog();
        let mut pool = InstancePool::new(2);
        let fp = fingerprint();

        let machine = pool.borrow_machine(&fp, &machines).unwrap();
        pool.return_machine(fp.clone(), machine);
        assert_eq!(pool.machines.get(&fp).map(Vec::len), Some(1));

        let player = pool.borrow_player(&fp, &players, &mut rng).unwrap();
        pool.return_player(fp.clone(), player, &mut rng);
        assert_eq!(pool.players.get(&fp).map(Vec::len), Some(1));
    }

    #[test]
    fn drops_instances_beyond_capacity() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let machines = machine_catalog();
        let mut pool = InstancePool::new(1);
        let fp = fingerprint();

        let m1 = pool.borrow_machine(&fp, &machines).unwrap();
        let m2 = pool.borrow_machine(&fp, &machines).unwrap();
        pool.return_machine(fp.clone(), m1);
        pool.return_machine(fp.clone(), m2);
        assert_eq!(pool.machines.get(&fp).map(Vec::len), Some(1));
        let _ = &mut rng;
    }
}
