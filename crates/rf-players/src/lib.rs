//! Player behavioral profiles: random and model-driven (v1) decision
//! engines, dispatched through the `Player` sum type.

mod error;
mod observation;
mod oracle;
mod player;
mod profile;

pub use error::*;
pub use observation::*;
pub use oracle::{BetFeatures, HeuristicOracle, Oracle, TerminateFeatures};
pub use player::*;
pub use profile::*;
