//! Session observation and decision types exchanged between the session
//! controller and a player (§4.4 step 1-2).

use serde::{Deserialize, Serialize};

/// A single past spin, kept for the up-to-10 spin history in an observation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SpinSummary {
    pub bet: f64,
    pub win: f64,
    pub profit: f64,
    pub in_free_spins: bool,
}

/// Everything a player sees before deciding its next action.
#[derive(Debug, Clone, Serialize)]
pub struct SessionObservation<'a> {
    pub balance: f64,
    pub cumulative_profit: f64,
    pub current_win_streak: u32,
    pub current_loss_streak: u32,
    /// Most recent spins first, capped at 10 (§4.4 step 1).
    pub recent_spins: &'a [SpinSummary],
    pub available_bets: &'a [f64],
    pub in_free_spins: bool,
    pub free_spins_remaining: u32,
}

/// A player's response to an observation: the next bet, a think-time delay
/// in seconds, and whether the session should continue.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Decision {
    pub bet: f64,
    pub delay_seconds: f64,
    pub continue_playing: bool,
}
