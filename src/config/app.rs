use super::file;
use crate::outlier::MIN_THRESHOLD_DB;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub enum Source {
    Stdin,
    File { path: PathBuf },
    Cmd { command: String },
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Report {
    Stdout,
    Log,
    None,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Pipeline {
    pub window_size: usize,
    pub update_interval: Duration,
    pub algorithm: String,
    pub max_speed_kmh: f64,
    pub use_outlier_filter: bool,
    pub outlier_threshold_db: f64,
}

#[derive(Debug)]
pub struct Config {
    pub source: Source,
    pub report: Report,
    pub pipeline: Pipeline,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self {
            window_size: 20,
            update_interval: Duration::from_millis(100),
            algorithm: "movingAverage".to_string(),
            max_speed_kmh: 10.0,
            use_outlier_filter: false,
            outlier_threshold_db: 6.0,
        }
    }
}

impl Pipeline {
    pub fn max_speed_mps(&self) -> f64 {
        self.max_speed_kmh / 3.6
    }

    /// Applies the values from the file on top of `self`, keeping the current
    /// value for anything missing or out of range.
    pub fn merge(&self, file: file::Pipeline) -> Self {
        let mut merged = self.clone();

        match file.window_size {
            Some(n) if n > 0 => merged.window_size = n as usize,
            Some(n) => ignore("window_size", n),
            None => {}
        }

        match file.update_interval_ms {
            Some(ms) if ms > 0 => merged.update_interval = Duration::from_millis(ms as u64),
            Some(ms) => ignore("update_interval_ms", ms),
            None => {}
        }

        if let Some(algorithm) = file.algorithm {
            merged.algorithm = algorithm;
        }

        match file.max_speed_kmh {
            Some(kmh) if kmh.is_finite() && kmh > 0.0 => merged.max_speed_kmh = kmh,
            Some(kmh) => ignore("max_speed_kmh", kmh),
            None => {}
        }

        if let Some(enabled) = file.use_outlier_filter {
            merged.use_outlier_filter = enabled;
        }

        match file.outlier_threshold_db {
            Some(db) if db.is_finite() && db > 0.0 => {
                merged.outlier_threshold_db = db.max(MIN_THRESHOLD_DB)
            }
            Some(db) => ignore("outlier_threshold_db", db),
            None => {}
        }

        merged
    }
}

fn ignore(key: &str, value: impl std::fmt::Display) {
    log::warn!("Ignoring out of range value for '{key}': {value}");
}

impl From<file::Source> for Source {
    fn from(source: file::Source) -> Self {
        match source {
            file::Source::Stdin => Source::Stdin,
            file::Source::File { path } => Source::File { path: path.into() },
            file::Source::Cmd { command } => Source::Cmd { command },
            file::Source::None => Source::None,
        }
    }
}

impl From<file::Report> for Report {
    fn from(report: file::Report) -> Self {
        match report {
            file::Report::Stdout => Report::Stdout,
            file::Report::Log => Report::Log,
            file::Report::None => Report::None,
        }
    }
}
