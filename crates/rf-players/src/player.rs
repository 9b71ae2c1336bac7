//! Player variants: random and model-driven v1 (§4.5, §9 "capability-based
//! sum type" — no shared mutable base state, `Player` dispatches by match).

use std::sync::Arc;

use rand_chacha::rand_core::RngCore;
use serde::{Deserialize, Serialize};

use crate::observation::{Decision, SessionObservation};
use crate::oracle::{BetFeatures, Oracle, TerminateFeatures};
use crate::profile::PlayerProfile;

/// Model-specific knobs for the random profile, read from
/// `PlayerProfile::config` (§4.5).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RandomConfig {
    #[serde(default = "RandomConfig::default_min_delay")]
    pub min_delay: f64,
    #[serde(default = "RandomConfig::default_max_delay")]
    pub max_delay: f64,
    #[serde(default)]
    pub end_probability: f64,
    #[serde(default = "RandomConfig::default_max_consecutive_losses")]
    pub max_consecutive_losses: u32,
    #[serde(default = "RandomConfig::default_session_budget")]
    pub session_budget: f64,
}

impl RandomConfig {
    fn default_min_delay() -> f64 {
        0.0
    }
    fn default_max_delay() -> f64 {
        0.0
    }
    fn default_max_consecutive_losses() -> u32 {
        u32::MAX
    }
    fn default_session_budget() -> f64 {
        f64::INFINITY
    }
}

impl Default for RandomConfig {
    fn default() -> Self {
        Self {
            min_delay: Self::default_min_delay(),
            max_delay: Self::default_max_delay(),
            end_probability: 0.0,
            max_consecutive_losses: Self::default_max_consecutive_losses(),
            session_budget: Self::default_session_budget(),
        }
    }
}

/// Chooses uniformly among affordable bets and terminates on configured
/// probability, loss streak, or budget/balance exhaustion (§4.5).
pub struct RandomPlayer {
    profile: PlayerProfile,
    config: RandomConfig,
    balance: f64,
    consecutive_losses: u32,
}

impl RandomPlayer {
    pub fn new(profile: PlayerProfile, rng: &mut dyn RngCore) -> Self {
        let config = serde_json::from_value(profile.config.clone()).unwrap_or_default();
        let balance = profile.balance_distribution.sample(rng);
        Self {
            profile,
            config,
            balance,
            consecutive_losses: 0,
        }
    }

    pub fn balance(&self) -> f64 {
        self.balance
    }

    pub fn reset(&mut self, rng: &mut dyn RngCore) {
        self.balance = self.profile.balance_distribution.sample(rng);
        self.consecutive_losses = 0;
    }

    fn affordable_bets(&self, available_bets: &[f64]) -> Vec<f64> {
        available_bets
            .iter()
            .copied()
            .filter(|&b| b <= self.balance)
            .collect()
    }

    pub fn decide(&self, observation: &SessionObservation, rng: &mut dyn RngCore) -> Decision {
        let affordable = self.affordable_bets(observation.available_bets);
        if affordable.is_empty() {
            return Decision {
                bet: 0.0,
                delay_seconds: 0.0,
                continue_playing: false,
            };
        }

        let idx = (rng.next_u64() as usize) % affordable.len();
        let bet = affordable[idx];

        let delay_seconds = if self.config.max_delay > self.config.min_delay {
            let span = self.config.max_delay - self.config.min_delay;
            self.config.min_delay + span * uniform_unit(rng)
        } else {
            self.config.min_delay
        };

        let budget_exhausted = -observation.cumulative_profit >= self.config.session_budget;
        let loss_streak_exceeded =
            observation.current_loss_streak >= self.config.max_consecutive_losses;
        let random_stop = self.config.end_probability > 0.0
            && uniform_unit(rng) < self.config.end_probability;

        let continue_playing = !budget_exhausted && !loss_streak_exceeded && !random_stop;

        Decision {
            bet,
            delay_seconds,
            continue_playing,
        }
    }
}

fn uniform_unit(rng: &mut dyn RngCore) -> f64 {
    rng.next_u64() as f64 / u64::MAX as f64
}

/// Weight of one bet amount in the v1 first-bet categorical distribution.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BetWeight {
    pub bet: f64,
    pub weight: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct V1Config {
    #[serde(default)]
    pub bet_weights: Vec<BetWeight>,
    #[serde(default)]
    pub slot_type_constant: f32,
    #[serde(default)]
    pub anomaly_threshold: f32,
}

impl Default for V1Config {
    fn default() -> Self {
        Self {
            bet_weights: Vec::new(),
            slot_type_constant: 0.0,
            anomaly_threshold: 0.9,
        }
    }
}

/// Features carried between spins to fill the lag terms of the oracle's
/// input vectors (§4.5).
#[derive(Debug, Clone, Copy, Default)]
struct PrevSpin {
    bet: f64,
    balance: f64,
    profit: f64,
    basepoint: f64,
    delta_t: f64,
}

/// Model-driven profile: first bet sampled from a categorical distribution,
/// subsequent bets and termination produced by an opaque oracle, with
/// fallback to the random-affordable choice on invalid or failed
/// predictions (§4.5, §7 "oracle prediction failure").
pub struct V1Player {
    profile: PlayerProfile,
    config: V1Config,
    oracle: Arc<dyn Oracle>,
    balance: f64,
    spins_taken: u32,
    win_streak: u32,
    loss_streak: u32,
    prev: PrevSpin,
    random_fallback: RandomConfig,
}

impl V1Player {
    pub fn new(profile: PlayerProfile, oracle: Arc<dyn Oracle>, rng: &mut dyn RngCore) -> Self {
        let config: V1Config = serde_json::from_value(profile.config.clone()).unwrap_or_default();
        let balance = profile.balance_distribution.sample(rng);
        Self {
            profile,
            config,
            oracle,
            balance,
            spins_taken: 0,
            win_streak: 0,
            loss_streak: 0,
            prev: PrevSpin::default(),
            random_fallback: RandomConfig::default(),
        }
    }

    pub fn balance(&self) -> f64 {
        self.balance
    }

    pub fn reset(&mut self, rng: &mut dyn RngCore) {
        self.balance = self.profile.balance_distribution.sample(rng);
        self.spins_taken = 0;
        self.win_streak = 0;
        self.loss_streak = 0;
        self.prev = PrevSpin::default();
    }

    fn affordable_bets(&self, available_bets: &[f64]) -> Vec<f64> {
        available_bets
            .iter()
            .copied()
            .filter(|&b| b <= self.balance)
            .collect()
    }

    fn random_affordable(&self, available_bets: &[f64], rng: &mut dyn RngCore) -> f64 {
        let affordable = self.affordable_bets(available_bets);
        if affordable.is_empty() {
            return 0.0;
        }
        affordable[(rng.next_u64() as usize) % affordable.len()]
    }

    /// Inverse-CDF sample over the normalized `bet_weights` map (§4.5,
    /// §9 "spec specifies inverse-CDF sampling over normalized weights").
    fn categorical_first_bet(&self, available_bets: &[f64], rng: &mut dyn RngCore) -> f64 {
        let total_weight: f64 = self.config.bet_weights.iter().map(|w| w.weight.max(0.0)).sum();
        if total_weight <= 0.0 {
            return self.random_affordable(available_bets, rng);
        }
        let target = uniform_unit(rng) * total_weight;
        let mut cumulative = 0.0;
        for entry in &self.config.bet_weights {
            cumulative += entry.weight.max(0.0);
            if target <= cumulative && entry.bet <= self.balance && available_bets.contains(&entry.bet) {
                return entry.bet;
            }
        }
        self.random_affordable(available_bets, rng)
    }

    fn bet_features(&self, observation: &SessionObservation) -> BetFeatures {
        let streak = self.win_streak as f32 - self.loss_streak as f32;
        [
            observation.balance as f32,
            observation.cumulative_profit as f32,
            streak,
            self.config.slot_type_constant,
            self.prev.basepoint as f32,
            self.prev.delta_t as f32,
            self.prev.profit as f32,
            self.prev.profit as f32, // delta_payout: last spin's win delta tracked via profit
            self.prev.bet as f32,
            self.prev.basepoint as f32,
            self.prev.profit as f32,
            if self.profile.currency == "USD" { 1.0 } else { 0.0 },
        ]
    }

    fn terminate_features(&self, observation: &SessionObservation, current_bet: f64) -> TerminateFeatures {
        let streak = self.win_streak as f32 - self.loss_streak as f32;
        [
            observation.balance as f32,
            observation.cumulative_profit as f32,
            current_bet as f32,
            streak,
            self.win_streak as f32,
            self.prev.bet as f32,
            self.prev.balance as f32,
            self.prev.profit as f32,
        ]
    }

    pub fn decide(&self, observation: &SessionObservation, rng: &mut dyn RngCore) -> Decision {
        let bet = if self.spins_taken == 0 {
            self.categorical_first_bet(observation.available_bets, rng)
        } else {
            let features = self.bet_features(observation);
            match self.oracle.predict_bet(&features) {
                Ok(predicted) if predicted > 0.0 && observation.available_bets.contains(&(predicted as f64)) => {
                    predicted as f64
                }
                _ => self.random_affordable(observation.available_bets, rng),
            }
        };

        if bet <= 0.0 {
            return Decision {
                bet: 0.0,
                delay_seconds: self.random_fallback.min_delay,
                continue_playing: false,
            };
        }

        let features = self.terminate_features(observation, bet);
        let continue_playing = match self.oracle.predict_terminate(&features) {
            Ok((stop_score, anomaly_score)) => {
                stop_score < 0.5 && anomaly_score < self.config.anomaly_threshold
            }
            Err(_) => {
                // Oracle prediction failure: fall back to the random
                // profile's termination rule for this decision (§7).
                observation.current_loss_streak < self.random_fallback.max_consecutive_losses
            }
        };

        Decision {
            bet,
            delay_seconds: 0.0,
            continue_playing,
        }
    }

    /// Record the outcome of the spin just taken so the next decision's
    /// lag features are correct.
    pub fn record_spin(&mut self, bet: f64, profit: f64, balance_before: f64, delay: f64) {
        self.prev = PrevSpin {
            bet,
            balance: balance_before,
            profit,
            basepoint: bet,
            delta_t: delay,
        };
        self.spins_taken += 1;
        if profit > 0.0 {
            self.win_streak += 1;
            self.loss_streak = 0;
        } else if profit < 0.0 {
            self.loss_streak += 1;
            self.win_streak = 0;
        }
    }
}

/// Capability-based sum type replacing an interface hierarchy (§9):
/// common fields live in each concrete variant, not a shared base.
pub enum Player {
    Random(RandomPlayer),
    V1(V1Player),
}

impl Player {
    pub fn balance(&self) -> f64 {
        match self {
            Player::Random(p) => p.balance(),
            Player::V1(p) => p.balance(),
        }
    }

    pub fn reset(&mut self, rng: &mut dyn RngCore) {
        match self {
            Player::Random(p) => p.reset(rng),
            Player::V1(p) => p.reset(rng),
        }
    }

    pub fn decide(&self, observation: &SessionObservation, rng: &mut dyn RngCore) -> Decision {
        match self {
            Player::Random(p) => p.decide(observation, rng),
            Player::V1(p) => p.decide(observation, rng),
        }
    }

    /// Debit/credit bookkeeping the session controller performs after a
    /// spin; only the v1 profile needs to remember it for lag features.
    pub fn record_spin(&mut self, bet: f64, profit: f64, balance_before: f64, delay: f64) {
        if let Player::V1(p) = self {
            p.record_spin(bet, profit, balance_before, delay);
        }
    }

    pub fn set_balance(&mut self, balance: f64) {
        match self {
            Player::Random(p) => p.balance = balance,
            Player::V1(p) => p.balance = balance,
        }
    }
}
