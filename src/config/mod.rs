use anyhow::Context;
use std::fs;
use std::path::{Path, PathBuf};

pub mod app;
pub mod file;
pub mod watch;

const DEFAULT_CONFIG: &str = include_str!("../../config.toml");

/// User config file, if one exists.
pub fn path() -> Option<PathBuf> {
    xdg::BaseDirectories::with_prefix("rangewatch")
        .ok()
        .and_then(|dirs| dirs.find_config_file("config.toml"))
}

pub fn load() -> anyhow::Result<app::Config> {
    match path() {
        Some(path) => read(&path, &app::Pipeline::default()),
        None => parse(DEFAULT_CONFIG, &app::Pipeline::default())
            .context("Unable to parse embedded default config"),
    }
}

/// Reads `path`, merging its pipeline settings on top of `previous`.
pub fn read(path: &Path, previous: &app::Pipeline) -> anyhow::Result<app::Config> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Unable to read {}", path.display()))?;
    parse(&content, previous).with_context(|| format!("Unable to parse {}", path.display()))
}

pub fn parse(content: &str, previous: &app::Pipeline) -> anyhow::Result<app::Config> {
    let cfg: file::Config = toml::from_str(content)?;

    Ok(app::Config {
        source: cfg.source.into(),
        report: cfg.report.into(),
        pipeline: previous.merge(cfg.pipeline),
    })
}
