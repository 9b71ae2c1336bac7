//! Task distributor (§4.2, §4.7): enumerates every (machine, player,
//! session index) triple the executor must run, up front and before any
//! worker is spawned.

use rf_core::{Fingerprint, MachineId, PlayerCluster, PlayerVersion, SessionId};

use crate::catalog::{MachineCatalog, PlayerCatalog, PlayerEntry};
use crate::error::{ExecutorError, ExecutorResult};

/// One unit of work for a worker: run one session of `player` against
/// `machine`.
#[derive(Debug, Clone)]
pub struct SessionTask {
    pub session_id: SessionId,
    pub machine_id: MachineId,
    pub player_version: PlayerVersion,
    pub player_cluster: PlayerCluster,
}

impl SessionTask {
    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint {
            player_version: self.player_version.clone(),
            player_cluster: self.player_cluster.clone(),
            machine_id: self.machine_id.clone(),
        }
    }
}

/// Validates every machine/player id referenced exists in its catalog
/// (§7 "factory miss for id | startup validation | fatal") and, if so,
/// enumerates the full Cartesian product of machines x players x
/// `sessions_per_pair`, assigning each task a unique sequential
/// `SessionId`.
pub fn build_tasks(
    machines: &MachineCatalog,
    players: &PlayerCatalog,
    sessions_per_pair: u32,
) -> ExecutorResult<Vec<SessionTask>> {
    for entry in players.entries() {
        validate_entry(players, entry)?;
    }

    let mut tasks = Vec::new();
    let mut next_id = 0u64;
    for machine_id in machines.ids() {
        for entry in players.entries() {
            for _ in 0..sessions_per_pair {
                tasks.push(SessionTask {
                    session_id: SessionId(next_id),
                    machine_id: machine_id.clone(),
                    player_version: entry.player_version.clone(),
                    player_cluster: entry.player_cluster.clone(),
                });
                next_id += 1;
            }
        }
    }
    Ok(tasks)
}

fn validate_entry(players: &PlayerCatalog, entry: &PlayerEntry) -> ExecutorResult<()> {
    if !players.contains(&entry.player_version, &entry.player_cluster) {
        return Err(ExecutorError::FactoryMiss {
            kind: "player",
            id: format!("{}/{}", entry.player_version, entry.player_cluster),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rf_players::{BalanceDistribution, PlayerProfile};
    use rf_slot_lab::{BetTable, MachineConfig, PayTable, Payline, ReelSet, ReelStrip, SymbolSet};
    use std::collections::{BTreeMap, HashMap};

    fn machines() -> MachineCatalog {
        let mut catalog = MachineCatalog::default();
        let mut reel_sets = BTreeMap::new();
        reel_sets.insert("normal".to_string(), ReelSet::new(vec![ReelStrip::new(vec![1])]));
        catalog.register(
            MachineId::from("m1"),
            MachineConfig {
                id: "m1".to_string(),
                reel_sets,
                paylines: vec![Payline::straight(0, 1)],
                paytable: PayTable { payouts: HashMap::new() },
                bet_table: BetTable { by_currency: BTreeMap::new() },
                symbols: SymbolSet { normal: vec![1], wild: vec![], scatter: 9 },
                window_size: 1,
                active_lines: 1,
                free_spins_count: 10,
                free_spins_multiplier: 1.0,
            },
        );
        catalog
    }

    fn players() -> PlayerCatalog {
        let mut catalog = PlayerCatalog::default();
        catalog.register(PlayerEntry {
            profile: PlayerProfile {
                id: "p1".to_string(),
                currency: "USD".to_string(),
                model_version: "random".to_string(),
                balance_distribution: BalanceDistribution { mu: 100.0, sigma: 0.0, min: 100.0, max: 100.0 },
                config: serde_json::json!({}),
            },
            player_version: PlayerVersion::from("v1"),
            player_cluster: PlayerCluster::from("default"),
        });
        catalog
    }

    #[test]
    fn enumerates_cartesian_product() {
        let tasks = build_tasks(&machines(), &players(), 4).unwrap();
        assert_eq!(tasks.len(), 4);
        let ids: Vec<u64> = tasks.iter().map(|t| t.session_id.0).collect();
        assert_eq!(ids, vec![0, 1, 2, 3]);
    }
}
