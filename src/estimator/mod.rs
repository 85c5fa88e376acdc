use crate::sample::Sample;
use std::fmt;

pub mod kalman;
pub mod matrix;
pub mod mean;
pub mod median;
mod registry;

pub use registry::Registry;

/// Point estimate produced for one tick.
#[derive(Debug, PartialEq, Clone, Copy)]
pub struct Estimate {
    pub distance: f64,
    pub signal_strength: f64,
}

impl Estimate {
    pub const ZERO: Estimate = Estimate {
        distance: 0.0,
        signal_strength: 0.0,
    };

    pub fn new(distance: f64, signal_strength: f64) -> Self {
        Self {
            distance,
            signal_strength,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.distance.is_finite() && self.signal_strength.is_finite()
    }
}

#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum Algorithm {
    MovingAverage,
    Median,
    Kalman,
}

impl Algorithm {
    pub const ALL: [Algorithm; 3] = [Algorithm::MovingAverage, Algorithm::Median, Algorithm::Kalman];

    pub fn id(&self) -> &'static str {
        match self {
            Algorithm::MovingAverage => "movingAverage",
            Algorithm::Median => "median",
            Algorithm::Kalman => "kalman",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.id() == id)
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

#[derive(Debug, Clone)]
pub enum Strategy {
    MovingAverage(mean::MovingAverage),
    Median(median::Median),
    Kalman(kalman::Kalman),
}

impl Strategy {
    pub fn new(algorithm: Algorithm, max_speed: f64) -> Self {
        match algorithm {
            Algorithm::MovingAverage => Self::MovingAverage(mean::MovingAverage),
            Algorithm::Median => Self::Median(median::Median),
            Algorithm::Kalman => Self::Kalman(kalman::Kalman::new(max_speed)),
        }
    }

    /// Returns [`Estimate::ZERO`] for an empty window.
    pub fn compute(&mut self, samples: &[Sample]) -> Estimate {
        match self {
            Self::MovingAverage(s) => s.compute(samples),
            Self::Median(s) => s.compute(samples),
            Self::Kalman(s) => s.compute(samples),
        }
    }

    pub fn reset(&mut self) {
        match self {
            Self::MovingAverage(_) | Self::Median(_) => {}
            Self::Kalman(s) => s.reset(),
        }
    }

    pub fn algorithm(&self) -> Algorithm {
        match self {
            Self::MovingAverage(_) => Algorithm::MovingAverage,
            Self::Median(_) => Algorithm::Median,
            Self::Kalman(_) => Algorithm::Kalman,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_algorithm_ids_round_trip() {
        for algorithm in Algorithm::ALL {
            assert_eq!(Some(algorithm), Algorithm::from_id(algorithm.id()));
        }
        assert_eq!(None, Algorithm::from_id("doesNotExist"));
        assert_eq!(None, Algorithm::from_id("MovingAverage"));
    }

    #[test]
    fn test_every_strategy_returns_zero_for_empty_window() {
        for algorithm in Algorithm::ALL {
            let mut strategy = Strategy::new(algorithm, 1.0);
            assert_eq!(Estimate::ZERO, strategy.compute(&[]), "{algorithm}");
            assert_eq!(algorithm, strategy.algorithm());
        }
    }

    #[test]
    fn test_reset_clears_kalman_state() {
        let mut strategy = Strategy::new(Algorithm::Kalman, 1.0);
        strategy.compute(&[Sample::new(4.0, -50.0, 0)]);

        strategy.reset();

        match strategy {
            Strategy::Kalman(k) => assert!(k.state().is_none()),
            _ => unreachable!(),
        }
    }
}
