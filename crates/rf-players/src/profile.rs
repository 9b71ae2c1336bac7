//! Player profile configuration and initial-balance sampling (§3 "Player profile")

use rand_chacha::rand_core::RngCore;
use serde::{Deserialize, Serialize};

use crate::error::{PlayerError, PlayerResult};

/// Truncated normal distribution over initial balance: `N(mu, sigma)` with
/// samples rejected (and redrawn) outside `[min, max]`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BalanceDistribution {
    pub mu: f64,
    pub sigma: f64,
    pub min: f64,
    pub max: f64,
}

impl BalanceDistribution {
    /// Checks the bounds `sample` relies on: `min <= max`, both finite. A
    /// config with `min > max` would make the zero-sigma branch clamp
    /// nonsensically and the rejection-sampling loop spin forever.
    pub fn validate(&self) -> Result<(), String> {
        if !self.min.is_finite() || !self.max.is_finite() {
            return Err("min/max must be finite".to_string());
        }
        if self.min > self.max {
            return Err(format!("min ({}) exceeds max ({})", self.min, self.max));
        }
        Ok(())
    }

    /// Sample a value in `[min, max]` by rejection sampling a normal draw
    /// produced via Box-Muller. *Invariant:* the returned value always lies
    /// in the configured bounds (§3, §8 "sampled initial balance ∈ [min, max]").
    pub fn sample(&self, rng: &mut dyn RngCore) -> f64 {
        if self.sigma <= 0.0 {
            return self.mu.clamp(self.min, self.max);
        }
        loop {
            let u1 = (rng.next_u64() as f64 / u64::MAX as f64).max(f64::MIN_POSITIVE);
            let u2 = rng.next_u64() as f64 / u64::MAX as f64;
            let z = (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos();
            let value = self.mu + self.sigma * z;
            if value >= self.min && value <= self.max {
                return value;
            }
        }
    }
}

/// Carries the fields common to every player variant (§3 "Player profile").
/// Model-specific parameters live in `config`, a free-form JSON bag read by
/// the variant that understands it (e.g. the v1 bet-weight map).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerProfile {
    pub id: String,
    pub currency: String,
    pub model_version: String,
    pub balance_distribution: BalanceDistribution,
    #[serde(default)]
    pub config: serde_json::Value,
}

impl PlayerProfile {
    /// Checks the invariants the core relies on (spec §6): a valid balance
    /// distribution, and a non-empty id/currency.
    pub fn validate(&self) -> PlayerResult<()> {
        let fail = |reason: String| PlayerError::InvalidProfile {
            id: self.id.clone(),
            reason,
        };

        if self.id.is_empty() {
            return Err(fail("empty player id".to_string()));
        }
        if self.currency.is_empty() {
            return Err(fail("empty currency".to_string()));
        }
        self.balance_distribution.validate().map_err(fail)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand_chacha::rand_core::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn sample_always_within_bounds() {
        let dist = BalanceDistribution {
            mu: 100.0,
            sigma: 50.0,
            min: 10.0,
            max: 120.0,
        };
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..200 {
            let value = dist.sample(&mut rng);
            assert!(value >= dist.min && value <= dist.max);
        }
    }

    #[test]
    fn zero_sigma_clamps_to_mu() {
        let dist = BalanceDistribution {
            mu: 500.0,
            sigma: 0.0,
            min: 10.0,
            max: 100.0,
        };
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert_eq!(dist.sample(&mut rng), 100.0);
    }

    #[test]
    fn rejects_min_greater_than_max() {
        let dist = BalanceDistribution { mu: 50.0, sigma: 0.0, min: 100.0, max: 10.0 };
        assert!(dist.validate().is_err());
    }

    #[test]
    fn profile_validation_rejects_bad_balance_bounds() {
        let profile = PlayerProfile {
            id: "p1".to_string(),
            currency: "USD".to_string(),
            model_version: "random".to_string(),
            balance_distribution: BalanceDistribution { mu: 50.0, sigma: 0.0, min: 100.0, max: 10.0 },
            config: serde_json::json!({}),
        };
        assert!(profile.validate().is_err());
    }

    #[test]
    fn profile_validation_accepts_well_formed_profile() {
        let profile = PlayerProfile {
            id: "p1".to_string(),
            currency: "USD".to_string(),
            model_version: "random".to_string(),
            balance_distribution: BalanceDistribution { mu: 50.0, sigma: 10.0, min: 10.0, max: 100.0 },
            config: serde_json::json!({}),
        };
        assert!(profile.validate().is_ok());
    }
}
