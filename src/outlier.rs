use crate::estimator::median::median;
use crate::sample::Sample;
use itertools::Itertools;

pub const MIN_THRESHOLD_DB: f64 = 1.0;

/// Drops samples whose signal strength strays too far from the window median.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutlierFilter {
    enabled: bool,
    threshold_db: f64,
}

impl OutlierFilter {
    pub fn new(enabled: bool, threshold_db: f64) -> Self {
        Self {
            enabled,
            threshold_db: coerce_threshold(threshold_db),
        }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn threshold_db(&self) -> f64 {
        self.threshold_db
    }

    /// Never returns an empty set for a non-empty input: if every sample would be
    /// rejected the input is passed through unchanged.
    pub fn apply(&self, samples: Vec<Sample>) -> Vec<Sample> {
        if !self.enabled {
            return samples;
        }

        let Some(median) = median(
            samples
                .iter()
                .map(|s| s.signal_strength)
                .filter(|s| s.is_finite()),
        ) else {
            return samples;
        };

        let retained = samples
            .iter()
            .filter(|s| {
                !s.signal_strength.is_finite()
                    || (s.signal_strength - median).abs() <= self.threshold_db
            })
            .copied()
            .collect_vec();

        if retained.is_empty() {
            return samples;
        }

        if retained.len() < samples.len() {
            log::trace!(
                "Rejected {} of {} samples around median signal strength {median}",
                samples.len() - retained.len(),
                samples.len()
            );
        }

        retained
    }
}

fn coerce_threshold(threshold_db: f64) -> f64 {
    if threshold_db.is_finite() {
        threshold_db.max(MIN_THRESHOLD_DB)
    } else {
        MIN_THRESHOLD_DB
    }
}
