//! Slot machine domain model and spin resolution engine.
//!
//! Reel strips and symbol classification (`symbols`) back a `SpinGrid`
//! (`spin`), which `PayTable` (`paytable`) scores line by line with
//! left-anchored wild substitution. `MachineConfig` (`config`) ties these
//! together with bet tables and free-spin parameters; `SlotMachine`
//! (`engine`) is the entry point that resolves one spin end to end.

pub mod config;
pub mod engine;
pub mod paytable;
pub mod spin;
pub mod symbols;

pub use config::*;
pub use engine::*;
pub use paytable::*;
pub use spin::*;
pub use symbols::*;
