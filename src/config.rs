use serde::Deserialize;
use std::path::{Path, PathBuf};

const DEFAULT_CONFIG_FILE: &str = "epi_report";
const ENV_PREFIX: &str = "EPI_REPORT";

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Settings {
    pub feed_path: PathBuf,
    pub ranking_rows: usize,
    pub preview_rows: usize,
    pub default_country: String,
    pub log_filter: String,
}

/// Defaults, then an optional TOML file, then `EPI_REPORT_*` variables.
///
/// Without an explicit path, `epi_report.toml` in the working directory is
/// read if it exists.
pub fn load_settings(path: Option<&Path>) -> anyhow::Result<Settings> {
    let file = match path {
        Some(p) => config::File::from(p.to_path_buf()).required(true),
        None => config::File::with_name(DEFAULT_CONFIG_FILE).required(false),
    };
    let settings = config::Config::builder()
        .set_default("feed_path", "casedistribution.csv")?
        .set_default("ranking_rows", 15)?
        .set_default("preview_rows", 14)?
        .set_default("default_country", "ESP")?
        .set_default("log_filter", "warn")?
        .add_source(file)
        .add_source(config::Environment::with_prefix(ENV_PREFIX))
        .build()?;

    Ok(settings.try_deserialize()?)
}
