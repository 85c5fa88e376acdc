use super::kalman::Kalman;
use super::{Algorithm, Strategy};
use std::collections::HashMap;

const DEFAULT_ALGORITHM: Algorithm = Algorithm::MovingAverage;

/// Lookup table of strategy instances, built once at startup.
///
/// Instances live for the whole run, so stateful strategies keep their state
/// while another one is active. Callers reset them when switching back.
#[derive(Debug)]
pub struct Registry {
    strategies: HashMap<Algorithm, Strategy>,
    max_speed: f64,
}

impl Registry {
    pub fn new(max_speed: f64) -> Self {
        Self {
            strategies: Algorithm::ALL
                .into_iter()
                .map(|a| (a, Strategy::new(a, max_speed)))
                .collect(),
            max_speed,
        }
    }

    /// Unknown identifiers degrade to the moving average.
    pub fn resolve(id: &str) -> Algorithm {
        Algorithm::from_id(id).unwrap_or_else(|| {
            log::warn!("Unknown algorithm '{id}', falling back to '{DEFAULT_ALGORITHM}'");
            DEFAULT_ALGORITHM
        })
    }

    pub fn get(&mut self, id: &str) -> &mut Strategy {
        self.strategy(Self::resolve(id))
    }

    pub fn strategy(&mut self, algorithm: Algorithm) -> &mut Strategy {
        let max_speed = self.max_speed;
        self.strategies
            .entry(algorithm)
            .or_insert_with(|| Strategy::new(algorithm, max_speed))
    }

    pub fn kalman(&mut self) -> Option<&mut Kalman> {
        match self.strategy(Algorithm::Kalman) {
            Strategy::Kalman(k) => Some(k),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::Sample;

    fn window() -> Vec<Sample> {
        vec![
            Sample::new(10.0, -50.0, 0),
            Sample::new(12.0, -48.0, 10),
            Sample::new(11.0, -49.0, 20),
            Sample::new(30.0, -49.0, 30),
        ]
    }

    #[test]
    fn test_get_known_ids() {
        let mut registry = Registry::new(1.0);

        for algorithm in Algorithm::ALL {
            assert_eq!(algorithm, registry.get(algorithm.id()).algorithm());
        }
    }

    #[test]
    fn test_unknown_id_behaves_like_moving_average() {
        let mut registry = Registry::new(1.0);

        let fallback = registry.get("doesNotExist").compute(&window());
        let moving_average = registry.get("movingAverage").compute(&window());

        assert_eq!(Algorithm::MovingAverage, registry.get("").algorithm());
        assert_eq!(moving_average, fallback);
    }

    #[test]
    fn test_instances_keep_state_between_lookups() {
        let mut registry = Registry::new(1.0);
        registry.get("kalman").compute(&window());

        assert!(registry.kalman().is_some_and(|k| k.state().is_some()));
    }
}
