//! rf-core: shared ids, errors, and the run-config record used across the
//! slot simulation engine.

mod error;
mod ids;
mod loader;
mod rng;
mod run_config;

pub use error::*;
pub use ids::*;
pub use loader::*;
pub use rng::*;
pub use run_config::*;
