use super::matrix::{Matrix, Vector};
use super::Estimate;
use crate::sample::Sample;
use itertools::Itertools;

/// Sensor variance of a single distance reading, in m².
const MEASUREMENT_NOISE: f64 = 0.5;
/// Fraction of the squared max speed used as the acceleration variance.
const PROCESS_NOISE_FACTOR: f64 = 0.1;
/// Used when consecutive timestamps are equal, reversed or unusable (~50 Hz).
const NOMINAL_DT_SECS: f64 = 0.02;
/// Gaps longer than this are not folded into the motion model.
const MAX_GAP_SECS: f64 = 5.0;

pub const DEFAULT_MAX_SPEED_MPS: f64 = 10.0 / 3.6;

/// Constant-velocity filter over distance with a hard speed limit.
#[derive(Debug, Clone)]
pub struct Kalman {
    q: f64,
    r: f64,
    max_speed: f64,
    state: Option<State>,
    steps: u64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct State {
    pub position: f64,
    pub velocity: f64,
    pub covariance: Matrix,
    pub last_timestamp_ms: i64,
}

impl State {
    fn seed(sample: &Sample) -> Self {
        Self {
            position: sample.distance,
            velocity: 0.0,
            covariance: Matrix::UNIT,
            last_timestamp_ms: sample.timestamp_ms,
        }
    }
}

impl Default for Kalman {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_SPEED_MPS)
    }
}

impl Kalman {
    pub fn new(max_speed: f64) -> Kalman {
        let max_speed = if max_speed.is_finite() && max_speed > 0.0 {
            max_speed
        } else {
            DEFAULT_MAX_SPEED_MPS
        };

        Kalman {
            q: process_noise(max_speed),
            r: MEASUREMENT_NOISE,
            max_speed,
            state: None,
            steps: 0,
        }
    }

    pub fn compute(&mut self, samples: &[Sample]) -> Estimate {
        let samples = samples
            .iter()
            .filter(|s| s.distance.is_finite())
            .sorted_by_key(|s| s.timestamp_ms)
            .collect_vec();

        let Some(latest) = samples.last() else {
            return Estimate::ZERO;
        };

        let mut state = match self.state {
            Some(state) => state,
            None => {
                log::debug!("Seeding Kalman filter at {} m", latest.distance);
                State::seed(latest)
            }
        };

        for sample in &samples {
            state = self.process(state, sample);
        }
        self.state = Some(state);
        log::trace!(
            "Kalman at {:.3} m, {:.3} m/s after {} steps",
            state.position,
            state.velocity,
            self.steps
        );

        let signal_strength =
            samples.iter().map(|s| s.signal_strength).sum::<f64>() / samples.len() as f64;

        Estimate::new(state.position, signal_strength)
    }

    fn process(&mut self, state: State, sample: &Sample) -> State {
        self.steps += 1;

        let dt = (sample.timestamp_ms - state.last_timestamp_ms) as f64 / 1000.0;
        let dt = if !dt.is_finite() || dt <= 0.0 {
            NOMINAL_DT_SECS
        } else {
            dt
        };

        if dt > MAX_GAP_SECS {
            log::debug!("Re-seeding Kalman filter after a gap of {dt:.1}s");
            return State::seed(sample);
        }

        let transition = Matrix::new(1.0, dt, 0.0, 1.0);
        let (dt2, dt3, dt4) = (dt * dt, dt * dt * dt, dt * dt * dt * dt);
        let noise = Matrix::new(dt4 / 4.0, dt3 / 2.0, dt3 / 2.0, dt2).scale(self.q);

        let predicted = transition * Vector::new(state.position, state.velocity);
        let p0 = transition * state.covariance * transition.transpose() + noise;

        let innovation = sample.distance - predicted.entry(0);
        let innovation_variance = p0.entry(0, 0) + self.r;
        let gain = Vector::new(
            p0.entry(0, 0) / innovation_variance,
            p0.entry(1, 0) / innovation_variance,
        );

        let position = predicted.entry(0) + gain.entry(0) * innovation;
        let velocity = (predicted.entry(1) + gain.entry(1) * innovation)
            .clamp(-self.max_speed, self.max_speed);
        let covariance = (Matrix::UNIT - Matrix::new(gain.entry(0), 0.0, gain.entry(1), 0.0)) * p0;

        if !position.is_finite() || !velocity.is_finite() || !covariance.is_finite() {
            log::debug!("Kalman state diverged at {sample:?}, re-seeding");
            return State::seed(sample);
        }

        State {
            position,
            velocity,
            covariance,
            last_timestamp_ms: sample.timestamp_ms,
        }
    }

    pub fn reset(&mut self) {
        self.state = None;
        self.steps = 0;
    }

    #[cfg(test)]
    pub fn max_speed(&self) -> f64 {
        self.max_speed
    }

    /// Returns whether the value was accepted; non-finite or non-positive speeds are ignored.
    pub fn set_max_speed(&mut self, max_speed: f64) -> bool {
        if !max_speed.is_finite() || max_speed <= 0.0 {
            log::warn!("Ignoring invalid max speed {max_speed} m/s");
            return false;
        }

        self.max_speed = max_speed;
        self.q = process_noise(max_speed);
        true
    }

    #[cfg(test)]
    pub fn state(&self) -> Option<&State> {
        self.state.as_ref()
    }

    #[cfg(test)]
    pub fn velocity(&self) -> Option<f64> {
        self.state.map(|s| s.velocity)
    }

    #[cfg(test)]
    pub fn steps(&self) -> u64 {
        self.steps
    }
}

fn process_noise(max_speed: f64) -> f64 {
    max_speed * max_speed * PROCESS_NOISE_FACTOR
}
