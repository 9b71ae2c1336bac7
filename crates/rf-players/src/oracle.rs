//! The model-driven player treats its inference backend as an opaque
//! oracle: two typed predictors, no prescribed inference engine (§4.5, §6).

use crate::error::PlayerError;

pub type BetFeatures = [f32; 12];
pub type TerminateFeatures = [f32; 8];

/// A per-cluster inference backend. Implementations must be safe to call
/// concurrently from every worker (§6 "must be thread-safe for read-only
/// inference"); the core never mutates an oracle after construction.
pub trait Oracle: Send + Sync {
    /// Next bet amount, or an error if inference itself failed.
    fn predict_bet(&self, features: &BetFeatures) -> Result<f32, PlayerError>;

    /// `(stop_score, anomaly_score)`; the caller thresholds both (§4.5).
    fn predict_terminate(&self, features: &TerminateFeatures) -> Result<(f32, f32), PlayerError>;
}

/// Default oracle backend when no real model is configured for a cluster
/// (§9: "the source's PickleLoader is a stub with heuristic scoring; the
/// real ML backend is external"). Repeats the previous bet and stops once
/// the balance is exhausted or the session's drawdown dwarfs its balance.
pub struct HeuristicOracle;

impl Oracle for HeuristicOracle {
    fn predict_bet(&self, features: &BetFeatures) -> Result<f32, PlayerError> {
        Ok(features[8])
    }

    fn predict_terminate(&self, features: &TerminateFeatures) -> Result<(f32, f32), PlayerError> {
        let balance = features[0];
        let cumulative_profit = features[1];
        let stop_score = if balance <= 0.0 { 1.0 } else { 0.0 };
        let anomaly_score = if balance > 0.0 {
            (cumulative_profit.abs() / balance).min(1.0)
        } else {
            1.0
        };
        Ok((stop_score, anomaly_score))
    }
}

#[cfg(test)]
pub(crate) struct StubOracle {
    pub bet: f32,
    pub stop_score: f32,
    pub anomaly_score: f32,
}

#[cfg(test)]
impl Oracle for StubOracle {
    fn predict_bet(&self, _features: &BetFeatures) -> Result<f32, PlayerError> {
        Ok(self.bet)
    }

    fn predict_terminate(&self, _features: &TerminateFeatures) -> Result<(f32, f32), PlayerError> {
        Ok((self.stop_score, self.anomaly_score))
    }
}

#[cfg(test)]
pub(crate) struct FailingOracle;

#[cfg(test)]
impl Oracle for FailingOracle {
    fn predict_bet(&self, _features: &BetFeatures) -> Result<f32, PlayerError> {
        Err(PlayerError::OraclePredictionFailure("stub failure".into()))
    }

    fn predict_terminate(&self, _features: &TerminateFeatures) -> Result<(f32, f32), PlayerError> {
        Err(PlayerError::OraclePredictionFailure("stub failure".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heuristic_oracle_repeats_previous_bet() {
        let mut features: BetFeatures = [0.0; 12];
        features[8] = 2.5;
        assert_eq!(HeuristicOracle.predict_bet(&features).unwrap(), 2.5);
    }

    #[test]
    fn heuristic_oracle_stops_at_zero_balance() {
        let features: TerminateFeatures = [0.0, -10.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0];
        let (stop, _) = HeuristicOracle.predict_terminate(&features).unwrap();
        assert_eq!(stop, 1.0);
    }

    #[test]
    fn heuristic_oracle_flags_drawdown_exceeding_balance() {
        let features: TerminateFeatures = [10.0, -50.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0];
        let (_, anomaly) = HeuristicOracle.predict_terminate(&features).unwrap();
        assert_eq!(anomaly, 1.0);
    }
}
