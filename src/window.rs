use crate::sample::Sample;

/// Bounded buffer of the most recent samples.
///
/// Appends are amortized O(1): the buffer is allowed to grow to twice the
/// window size and is then compacted back down in a single drain.
#[derive(Debug)]
pub struct SampleWindow {
    samples: Vec<Sample>,
    window_size: usize,
}

/// Extremes of the current window, for consumers that draw ranges.
#[derive(Debug, PartialEq, Clone, Copy)]
pub struct WindowSummary {
    pub min_distance: f64,
    pub max_distance: f64,
    pub min_signal_strength: f64,
    pub max_signal_strength: f64,
}

impl SampleWindow {
    pub fn new(window_size: usize) -> Self {
        let window_size = window_size.max(1);
        Self {
            samples: Vec::with_capacity(2 * window_size),
            window_size,
        }
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    pub fn set_window_size(&mut self, window_size: usize) {
        if window_size == 0 {
            log::warn!("Ignoring window size of 0, keeping {}", self.window_size);
            return;
        }
        self.window_size = window_size;
        self.compact();
    }

    /// Non-finite samples are dropped without being queued.
    pub fn append(&mut self, sample: Sample) -> bool {
        if !sample.is_finite() {
            log::debug!("Dropping non-finite sample {sample:?}");
            return false;
        }

        self.samples.push(sample);
        self.compact();
        true
    }

    /// Copy of the last `min(size, len)` samples in arrival order.
    pub fn snapshot(&self, size: usize) -> Vec<Sample> {
        let start = self.samples.len().saturating_sub(size);
        self.samples[start..].to_vec()
    }

    /// Snapshot of the configured window size.
    pub fn current(&self) -> Vec<Sample> {
        self.snapshot(self.window_size)
    }

    pub fn summary(&self) -> Option<WindowSummary> {
        let start = self.samples.len().saturating_sub(self.window_size);
        let window = &self.samples[start..];
        if window.is_empty() {
            return None;
        }

        Some(window.iter().fold(
            WindowSummary {
                min_distance: f64::INFINITY,
                max_distance: f64::NEG_INFINITY,
                min_signal_strength: f64::INFINITY,
                max_signal_strength: f64::NEG_INFINITY,
            },
            |acc, s| WindowSummary {
                min_distance: acc.min_distance.min(s.distance),
                max_distance: acc.max_distance.max(s.distance),
                min_signal_strength: acc.min_signal_strength.min(s.signal_strength),
                max_signal_strength: acc.max_signal_strength.max(s.signal_strength),
            },
        ))
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    fn compact(&mut self) {
        if self.samples.len() > 2 * self.window_size {
            let excess = self.samples.len() - self.window_size;
            self.samples.drain(..excess);
        }
    }
}
