use serde::Deserialize;

#[derive(Deserialize, Debug)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Stdin,
    File { path: String },
    Cmd { command: String },
    None,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "lowercase")]
pub enum Report {
    #[default]
    Stdout,
    Log,
    None,
}

// Validated in app::Pipeline::merge
#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct Pipeline {
    pub window_size: Option<i64>,
    pub update_interval_ms: Option<i64>,
    pub algorithm: Option<String>,
    pub max_speed_kmh: Option<f64>,
    pub use_outlier_filter: Option<bool>,
    pub outlier_threshold_db: Option<f64>,
}

#[derive(Deserialize, Debug)]
pub struct Config {
    pub source: Source,
    #[serde(default)]
    pub report: Report,
    #[serde(default)]
    pub pipeline: Pipeline,
}
