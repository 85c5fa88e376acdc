use crate::config::app;
use crate::dispersion::Dispersion;
use crate::estimator::{Algorithm, Estimate};
use crate::window::WindowSummary;
use crate::ErrorBox;
use smol::io::AsyncWriteExt;
use smol::Unblock;
use std::io::Stdout;

/// Everything a consumer needs to draw one tick.
#[derive(Debug, PartialEq, Clone)]
pub struct Report {
    pub algorithm: Algorithm,
    pub estimate: Estimate,
    pub dispersion: Dispersion,
    pub total_samples: u64,
    /// Number of deviations currently kept in the dispersion history.
    pub history_len: usize,
    /// Rejection threshold, `None` while the outlier filter is off.
    pub outlier_threshold_db: Option<f64>,
    pub summary: Option<WindowSummary>,
}

impl Report {
    /// `distance rssi std_dev deviation min_distance max_distance total`
    pub fn to_line(&self) -> String {
        let (min, max) = self
            .summary
            .map_or((f64::NAN, f64::NAN), |s| (s.min_distance, s.max_distance));

        format!(
            "{:.3} {:.1} {:.3} {:.3} {:.3} {:.3} {}\n",
            self.estimate.distance,
            self.estimate.signal_strength,
            self.dispersion.std_dev,
            self.dispersion.deviation,
            min,
            max,
            self.total_samples
        )
    }
}

pub enum Reporter {
    Stdout(Unblock<Stdout>),
    Log,
    None,

    #[cfg(test)]
    Mock(Vec<Report>),
}

impl From<app::Report> for Reporter {
    fn from(report: app::Report) -> Self {
        match report {
            app::Report::Stdout => Reporter::Stdout(Unblock::new(std::io::stdout())),
            app::Report::Log => Reporter::Log,
            app::Report::None => Reporter::None,
        }
    }
}

impl Reporter {
    pub async fn report(&mut self, report: &Report) -> Result<(), ErrorBox> {
        match self {
            Reporter::Stdout(out) => {
                out.write_all(report.to_line().as_bytes()).await?;
                out.flush().await?;
            }
            Reporter::Log => log::info!(
                "[{}] {:.3} m ({:.1} dBm), std dev {:.3} m over {} of {} ticks, outlier filter {}",
                report.algorithm,
                report.estimate.distance,
                report.estimate.signal_strength,
                report.dispersion.std_dev,
                report.history_len,
                report.total_samples,
                report
                    .outlier_threshold_db
                    .map_or("off".to_string(), |db| format!("±{db:.1} dB"))
            ),
            Reporter::None => {}

            #[cfg(test)]
            Reporter::Mock(reports) => reports.push(report.clone()),
        }

        Ok(())
    }
}
