use macro_rules_attribute::apply;
use smol::channel;
use smol_macros::{main, Executor};

mod channel_ext;
mod config;
mod dispersion;
mod estimator;
mod outlier;
mod pipeline;
mod report;
mod sample;
mod source;
mod window;

pub type ErrorBox = Box<dyn std::error::Error + Send + Sync>;

const SAMPLE_QUEUE_LEN: usize = 1024;

#[apply(main!)]
async fn main(ex: &Executor<'_>) {
    let panic_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        panic_hook(panic_info);
        std::process::exit(1);
    }));

    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let config = match config::load() {
        Ok(config) => config,
        Err(err) => panic!("Unable to load config: {err:#}"),
    };

    log::debug!("Using {config:#?}");

    let (sample_tx, sample_rx) = channel::bounded(SAMPLE_QUEUE_LEN);
    let (reset_tx, reset_rx) = channel::bounded(16);
    let (settings_tx, settings_rx) = channel::bounded(16);

    match config::path() {
        Some(path) => {
            let mut watcher =
                config::watch::Watcher::new(path, settings_tx, config.pipeline.clone());
            std::thread::Builder::new()
                .name("config-watch".to_string())
                .spawn(move || {
                    if let Err(err) = watcher.run() {
                        log::error!("Config file is no longer watched: {err}");
                    }
                })
                .expect("Unable to start thread: config-watch");
        }
        None => drop(settings_tx),
    }

    let mut source =
        source::Controller::new(config.source, sample_tx, reset_tx, source::SystemClock);
    ex.spawn(async move { source.run().await }).detach();

    let mut runner = pipeline::Runner::new(
        &config.pipeline,
        sample_rx,
        reset_rx,
        settings_rx,
        config.report.into(),
    );

    log::info!(
        "rangewatch {} started, estimating with '{}' every {:?}",
        env!("RANGEWATCH_VERSION"),
        config.pipeline.algorithm,
        config.pipeline.update_interval
    );
    runner.run().await;
}
