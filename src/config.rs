//! The single configuration document a run is launched from: machine
//! definitions, player profiles, and the run's own knobs (§6 "Configuration
//! intake").

use serde::Deserialize;

use rf_core::{PlayerCluster, PlayerVersion, SimulationRunConfig};
use rf_players::PlayerProfile;
use rf_slot_lab::MachineConfig;

/// One player profile plus the routing tags that key its instance-pool
/// fingerprint. The profile's own `model_version` field only distinguishes
/// the random/v1 *variant*; `player_version`/`player_cluster` are the
/// orchestrator-assigned tags that bind a v1 profile to a specific oracle.
#[derive(Debug, Clone, Deserialize)]
pub struct PlayerCatalogEntry {
    pub profile: PlayerProfile,
    pub player_version: String,
    pub player_cluster: String,
}

impl PlayerCatalogEntry {
    pub fn player_version(&self) -> PlayerVersion {
        PlayerVersion::from(self.player_version.as_str())
    }

    pub fn player_cluster(&self) -> PlayerCluster {
        PlayerCluster::from(self.player_cluster.as_str())
    }
}

/// Top-level shape of `--config`. All three catalogs in one document;
/// `rf_core::load_document` dispatches JSON/YAML by extension.
#[derive(Debug, Deserialize)]
pub struct SimulationConfig {
    pub machines: Vec<MachineConfig>,
    pub players: Vec<PlayerCatalogEntry>,
    #[serde(default)]
    pub run: SimulationRunConfig,
}
