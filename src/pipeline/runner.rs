use super::Controller;
use crate::channel_ext::ReceiverExt;
use crate::config::app;
use crate::report::{Report, Reporter};
use crate::sample::Sample;
use crate::window::SampleWindow;
use smol::channel::Receiver;
use smol::Timer;
use std::time::Duration;

/// Drives the controller on a fixed cadence. Resets and new settings are only
/// ever applied between two ticks.
pub struct Runner {
    controller: Controller,
    window: SampleWindow,
    update_interval: Duration,
    sample_rx: Receiver<Sample>,
    reset_rx: Receiver<()>,
    settings_rx: Receiver<app::Pipeline>,
    reporter: Reporter,
}

impl Runner {
    pub fn new(
        settings: &app::Pipeline,
        sample_rx: Receiver<Sample>,
        reset_rx: Receiver<()>,
        settings_rx: Receiver<app::Pipeline>,
        reporter: Reporter,
    ) -> Self {
        Self {
            controller: Controller::new(settings),
            window: SampleWindow::new(settings.window_size),
            update_interval: settings.update_interval,
            sample_rx,
            reset_rx,
            settings_rx,
            reporter,
        }
    }

    pub async fn run(&mut self) {
        loop {
            self.step().await;
            Timer::after(self.update_interval).await;
        }
    }

    async fn step(&mut self) {
        if let Some(settings) = self
            .settings_rx
            .recv_maybe_last()
            .await
            .expect("settings_rx closed unexpectedly")
        {
            self.apply(&settings);
        }

        if !self.reset_rx.drain().is_empty() {
            self.controller.reset_all();
        }

        for sample in self.sample_rx.drain() {
            self.window.append(sample);
        }

        let Some(tick) = self.controller.tick(self.window.current()) else {
            return;
        };

        let tracker = self.controller.dispersion();
        let outlier = self.controller.outlier_filter();
        let report = Report {
            algorithm: self.controller.active_algorithm(),
            estimate: tick.estimate,
            dispersion: tick.dispersion,
            total_samples: tracker.total_samples(),
            history_len: tracker.history().len(),
            outlier_threshold_db: outlier.enabled().then_some(outlier.threshold_db()),
            summary: self.window.summary(),
        };

        if let Err(err) = self.reporter.report(&report).await {
            log::error!("Unable to report estimate: {err}");
        }
    }

    fn apply(&mut self, settings: &app::Pipeline) {
        if settings.window_size != self.window.window_size() {
            log::debug!(
                "Resizing window from {} to {}",
                self.window.window_size(),
                settings.window_size
            );
        }
        self.window.set_window_size(settings.window_size);
        self.update_interval = settings.update_interval;
        self.controller.apply(settings);
    }
}
