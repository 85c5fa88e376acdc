use crate::config::app;
use crate::dispersion::{self, Dispersion};
use crate::estimator::{Algorithm, Estimate, Registry};
use crate::outlier::OutlierFilter;
use crate::sample::Sample;

/// Result of one successful tick.
#[derive(Debug, PartialEq, Clone, Copy)]
pub struct Tick {
    pub estimate: Estimate,
    pub dispersion: Dispersion,
}

/// Runs filter, estimate and dispersion for a window snapshot, and owns
/// strategy switching. Takes `&mut self` for every tick, so ticks never overlap.
pub struct Controller {
    registry: Registry,
    active: Algorithm,
    max_speed_kmh: f64,
    outlier: OutlierFilter,
    dispersion: dispersion::Tracker,
}

impl Controller {
    pub fn new(settings: &app::Pipeline) -> Self {
        let mut registry = Registry::new(settings.max_speed_mps());
        let active = registry.get(&settings.algorithm).algorithm();

        Self {
            registry,
            active,
            max_speed_kmh: settings.max_speed_kmh,
            outlier: OutlierFilter::new(
                settings.use_outlier_filter,
                settings.outlier_threshold_db,
            ),
            dispersion: dispersion::Tracker::default(),
        }
    }

    pub fn tick(&mut self, snapshot: Vec<Sample>) -> Option<Tick> {
        let samples = self.outlier.apply(snapshot);
        if samples.is_empty() {
            return None;
        }

        let estimate = self.registry.strategy(self.active).compute(&samples);
        let dispersion = self.dispersion.update(&estimate, &samples)?;

        log::trace!(
            "[{}] {:.3} m ({:.1} dBm) from {} samples",
            self.active,
            estimate.distance,
            estimate.signal_strength,
            samples.len()
        );

        Some(Tick {
            estimate,
            dispersion,
        })
    }

    /// Switches strategy and tunables. The selected strategy is reset when it
    /// differs from the previous one or its own configuration changed.
    pub fn apply(&mut self, settings: &app::Pipeline) {
        let algorithm = Registry::resolve(&settings.algorithm);

        let max_speed_changed = settings.max_speed_kmh != self.max_speed_kmh;
        if max_speed_changed {
            let accepted = self
                .registry
                .kalman()
                .is_some_and(|k| k.set_max_speed(settings.max_speed_mps()));
            if accepted {
                self.max_speed_kmh = settings.max_speed_kmh;
            }
        }

        let reconfigured = algorithm == Algorithm::Kalman && max_speed_changed;
        if algorithm != self.active || reconfigured {
            log::debug!("Switching from '{}' to '{algorithm}'", self.active);
            self.registry.strategy(algorithm).reset();
        }
        self.active = algorithm;

        self.outlier = OutlierFilter::new(
            settings.use_outlier_filter,
            settings.outlier_threshold_db,
        );
    }

    /// Clears dispersion history, counters and the active strategy's state.
    pub fn reset_all(&mut self) {
        log::debug!("Resetting '{}' and dispersion history", self.active);
        self.dispersion.reset();
        self.registry.strategy(self.active).reset();
    }

    pub fn active_algorithm(&self) -> Algorithm {
        self.active
    }

    pub fn dispersion(&self) -> &dispersion::Tracker {
        &self.dispersion
    }

    pub fn outlier_filter(&self) -> &OutlierFilter {
        &self.outlier
    }

    #[cfg(test)]
    fn registry(&mut self) -> &mut Registry {
        &mut self.registry
    }
}
