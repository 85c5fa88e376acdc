use crate::estimator::Estimate;
use crate::sample::Sample;
use std::collections::VecDeque;

pub const HISTORY_CAPACITY: usize = 10_000;

/// Spread of the raw samples around the current estimate.
#[derive(Debug, PartialEq, Clone, Copy)]
pub struct Dispersion {
    pub deviation: f64,
    pub std_dev: f64,
}

/// Bounded history of per-tick deviations, oldest evicted first.
#[derive(Debug)]
pub struct Tracker {
    history: VecDeque<f64>,
    capacity: usize,
    total_samples: u64,
}

impl Default for Tracker {
    fn default() -> Self {
        Self::new(HISTORY_CAPACITY)
    }
}

impl Tracker {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            history: VecDeque::with_capacity(capacity),
            capacity,
            total_samples: 0,
        }
    }

    /// Returns `None` when the tick is discarded: a non-finite estimate or an
    /// empty window leaves the history and counter untouched.
    pub fn update(&mut self, estimate: &Estimate, samples: &[Sample]) -> Option<Dispersion> {
        if !estimate.is_finite() {
            log::debug!("Discarding tick with non-finite estimate {estimate:?}");
            return None;
        }

        let latest = samples.last()?;

        let variance = samples
            .iter()
            .map(|s| (s.distance - estimate.distance).powi(2))
            .sum::<f64>()
            / samples.len() as f64;

        let dispersion = Dispersion {
            deviation: latest.distance - estimate.distance,
            std_dev: variance.sqrt(),
        };

        if !dispersion.deviation.is_finite() || !dispersion.std_dev.is_finite() {
            log::debug!("Discarding tick with non-finite dispersion {dispersion:?}");
            return None;
        }

        if self.history.len() == self.capacity {
            self.history.pop_front();
        }
        self.history.push_back(dispersion.deviation);
        self.total_samples += 1;

        Some(dispersion)
    }

    pub fn history(&self) -> &VecDeque<f64> {
        &self.history
    }

    pub fn total_samples(&self) -> u64 {
        self.total_samples
    }

    pub fn reset(&mut self) {
        self.history.clear();
        self.total_samples = 0;
    }
}
