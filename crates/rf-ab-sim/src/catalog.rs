//! Machine and player factories the orchestrator registers at startup
//! (§4.6, §9 "factories become match-style constructors keyed on the
//! model_version tag").

use std::collections::BTreeMap;
use std::sync::Arc;

use rand_chacha::rand_core::RngCore;
use rf_core::{MachineId, PlayerCluster, PlayerId, PlayerVersion};
use rf_players::{Oracle, Player, PlayerProfile, RandomPlayer, V1Player};
use rf_slot_lab::{MachineConfig, SlotMachine};

use crate::error::{ExecutorError, ExecutorResult};

/// Everything the task distributor and player factory need about one
/// registered player profile: the profile itself plus the routing tags
/// that key the instance pool fingerprint (§4.6).
#[derive(Clone)]
pub struct PlayerEntry {
    pub profile: PlayerProfile,
    pub player_version: PlayerVersion,
    pub player_cluster: PlayerCluster,
}

impl PlayerEntry {
    pub fn player_id(&self) -> PlayerId {
        PlayerId(self.profile.id.clone())
    }
}

/// Registered machine configurations, keyed by id. Owned exclusively by
/// the orchestrator; workers see it only through a shared `Arc` (§9
/// "shared-pointer factory graph... ownership is a DAG rooted at the
/// orchestrator").
#[derive(Default)]
pub struct MachineCatalog {
    configs: BTreeMap<MachineId, Arc<MachineConfig>>,
}

impl MachineCatalog {
    pub fn register(&mut self, id: MachineId, config: MachineConfig) {
        self.configs.insert(id, Arc::new(config));
    }

    pub fn ids(&self) -> impl Iterator<Item = &MachineId> {
        self.configs.keys()
    }

    pub fn contains(&self, id: &MachineId) -> bool {
        self.configs.contains_key(id)
    }

    /// Construct a fresh `SlotMachine` for `id` (§4.6 factory miss -> pool
    /// builds on miss; caller validates ids exist before execution begins).
    pub fn build(&self, id: &MachineId) -> ExecutorResult<SlotMachine> {
        let config = self.configs.get(id).ok_or_else(|| ExecutorError::FactoryMiss {
            kind: "machine",
            id: id.as_str().to_string(),
        })?;
        Ok(SlotMachine::new((**config).clone()))
    }
}

/// Registered player profiles and the oracle backends their v1 clusters
/// use, keyed by `(player_version, player_cluster)` (§4.5, §4.6, §9).
#[derive(Default)]
pub struct PlayerCatalog {
    entries: BTreeMap<(PlayerVersion, PlayerCluster), PlayerEntry>,
    oracles: BTreeMap<PlayerCluster, Arc<dyn Oracle>>,
}

impl PlayerCatalog {
    pub fn register(&mut self, entry: PlayerEntry) {
        let key = (entry.player_version.clone(), entry.player_cluster.clone());
        self.entries.insert(key, entry);
    }

    /// Register the oracle backend for a player cluster. Loaded once by
    /// the orchestrator and shared read-only across workers (§6 "must be
    /// thread-safe for read-only inference").
    pub fn register_oracle(&mut self, cluster: PlayerCluster, oracle: Arc<dyn Oracle>) {
        self.oracles.insert(cluster, oracle);
    }

    pub fn entries(&self) -> impl Iterator<Item = &PlayerEntry> {
        self.entries.values()
    }

    pub fn contains(&self, version: &PlayerVersion, cluster: &PlayerCluster) -> bool {
        self.entries.contains_key(&(version.clone(), cluster.clone()))
    }

    pub fn entry(&self, version: &PlayerVersion, cluster: &PlayerCluster) -> ExecutorResult<&PlayerEntry> {
        let key = (version.clone(), cluster.clone());
        self.entries.get(&key).ok_or_else(|| ExecutorError::FactoryMiss {
            kind: "player",
            id: format!("{version}/{cluster}"),
        })
    }

    /// Construct a fresh `Player` for the given fingerprint fields.
    /// Dispatches on `model_version` (§9 "capability-based sum type"):
    /// anything other than `"random"` is a v1, oracle-backed profile.
    pub fn build(
        &self,
        version: &PlayerVersion,
        cluster: &PlayerCluster,
        rng: &mut dyn RngCore,
    ) -> ExecutorResult<Player> {
        let key = (version.clone(), cluster.clone());
        let entry = self.entries.get(&key).ok_or_else(|| ExecutorError::FactoryMiss {
            kind: "player",
            id: format!("{version}/{cluster}"),
        })?;

        if entry.profile.model_version == "random" {
            return Ok(Player::Random(RandomPlayer::new(entry.profile.clone(), rng)));
        }

        let oracle = self.oracles.get(cluster).ok_or_else(|| ExecutorError::FactoryMiss {
            kind: "oracle",
            id: cluster.as_str().to_string(),
        })?;
        Ok(Player::V1(V1Player::new(entry.profile.clone(), Arc::clone(oracle), rng)))
    }
}
