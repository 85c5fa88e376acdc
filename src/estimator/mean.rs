use super::Estimate;
use crate::sample::Sample;

/// Arithmetic mean of distance and signal strength over the window.
#[derive(Debug, Default, Clone, Copy)]
pub struct MovingAverage;

impl MovingAverage {
    pub fn compute(&self, samples: &[Sample]) -> Estimate {
        if samples.is_empty() {
            return Estimate::ZERO;
        }

        let count = samples.len() as f64;
        let (distance, signal_strength) = samples.iter().fold((0.0, 0.0), |(d, s), sample| {
            (d + sample.distance, s + sample.signal_strength)
        });

        Estimate::new(distance / count, signal_strength / count)
    }
}
