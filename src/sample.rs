/// One raw measurement as delivered by the ranging sensor.
#[derive(Debug, PartialEq, Clone, Copy)]
pub struct Sample {
    pub distance: f64,
    pub signal_strength: f64,
    pub timestamp_ms: i64,
}

impl Sample {
    pub fn new(distance: f64, signal_strength: f64, timestamp_ms: i64) -> Self {
        Self {
            distance,
            signal_strength,
            timestamp_ms,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.distance.is_finite() && self.signal_strength.is_finite()
    }
}
