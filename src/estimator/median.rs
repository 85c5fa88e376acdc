use super::Estimate;
use crate::sample::Sample;
use itertools::Itertools;

/// Independent medians of distance and signal strength.
///
/// The two are sorted separately, so the reported pair does not necessarily come
/// from the same sample.
#[derive(Debug, Default, Clone, Copy)]
pub struct Median;

impl Median {
    pub fn compute(&self, samples: &[Sample]) -> Estimate {
        match (
            median(samples.iter().map(|s| s.distance)),
            median(samples.iter().map(|s| s.signal_strength)),
        ) {
            (Some(distance), Some(signal_strength)) => Estimate::new(distance, signal_strength),
            _ => Estimate::ZERO,
        }
    }
}

/// Middle element for an odd count, mean of the two central elements for an even one.
pub fn median(values: impl Iterator<Item = f64>) -> Option<f64> {
    let sorted = values.sorted_by(|a, b| a.total_cmp(b)).collect_vec();
    let len = sorted.len();

    match len {
        0 => None,
        _ if len % 2 == 0 => Some((sorted[len / 2 - 1] + sorted[len / 2]) / 2.0),
        _ => Some(sorted[len / 2]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_window_is_zero() {
        assert_eq!(Estimate::ZERO, Median.compute(&[]));
    }

    #[test]
    fn test_odd_count() {
        let samples = [
            Sample::new(10.0, -50.0, 0),
            Sample::new(12.0, -48.0, 10),
            Sample::new(11.0, -49.0, 20),
        ];

        assert_eq!(Estimate::new(11.0, -49.0), Median.compute(&samples));
    }

    #[test]
    fn test_even_count() {
        let samples = [
            Sample::new(4.0, -70.0, 0),
            Sample::new(1.0, -40.0, 10),
            Sample::new(3.0, -60.0, 20),
            Sample::new(2.0, -50.0, 30),
        ];

        assert_eq!(Estimate::new(2.5, -55.0), Median.compute(&samples));
    }

    #[test]
    fn test_distance_and_signal_strength_are_independent() {
        // the sample with the median distance has the weakest signal
        let samples = [
            Sample::new(5.0, -90.0, 0),
            Sample::new(1.0, -40.0, 10),
            Sample::new(9.0, -45.0, 20),
        ];

        assert_eq!(Estimate::new(5.0, -45.0), Median.compute(&samples));
    }

    #[test]
    fn test_median() {
        assert_eq!(None, median(std::iter::empty()));
        assert_eq!(Some(7.0), median([7.0].into_iter()));
        assert_eq!(Some(11.0), median([12.0, 10.0, 11.0].into_iter()));
        assert_eq!(Some(2.5), median([4.0, 1.0, 3.0, 2.0].into_iter()));
    }
}
