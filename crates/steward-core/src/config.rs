use config::{Config, ConfigError, Environment, File as ConfigFile};
use serde::Deserialize;
use std::fs::File;
use std::io;
use std::path::Path;
use tracing::{debug, warn};

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_db_path")]
    pub db_path: String,
    #[serde(default = "default_marker_tokens_path")]
    pub marker_tokens_path: String,
    #[serde(default)]
    pub ignore_patterns: Vec<String>,
    #[serde(default = "default_version_threshold")]
    pub version_threshold: usize,
    #[serde(default = "default_largest_limit")]
    pub largest_limit: usize,
    #[serde(default = "default_log_file_path")]
    pub log_file_path: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_db_path() -> String {
    "steward.db".to_string()
}

fn default_marker_tokens_path() -> String {
    "versions_keywords.csv".to_string()
}

fn default_version_threshold() -> usize {
    3
}

fn default_largest_limit() -> usize {
    10
}

fn default_log_file_path() -> String {
    "./logs/steward.log".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            marker_tokens_path: default_marker_tokens_path(),
            ignore_patterns: Vec::new(),
            version_threshold: default_version_threshold(),
            largest_limit: default_largest_limit(),
            log_file_path: default_log_file_path(),
            log_level: default_log_level(),
        }
    }
}

/// Reads `Config.toml` (optional) and `STEWARD_*` environment overrides.
pub fn load_configuration() -> Result<AppConfig, ConfigError> {
    let builder = Config::builder()
        .add_source(ConfigFile::with_name("Config").required(false))
        .add_source(Environment::with_prefix("STEWARD"))
        .build()?;
    builder.try_deserialize::<AppConfig>()
}

/// Load marker tokens from the first line of a comma-separated file.
///
/// A missing or unreadable file is not fatal: version clustering then runs
/// with no normalization at all.
pub fn load_marker_tokens(path: &Path) -> Vec<String> {
    match read_first_csv_line(path) {
        Ok(tokens) => {
            debug!("Loaded {} marker tokens from {}", tokens.len(), path.display());
            tokens
        }
        Err(e) => {
            warn!(
                "Marker tokens unavailable at {} ({}), using none",
                path.display(),
                e
            );
            Vec::new()
        }
    }
}

fn read_first_csv_line(path: &Path) -> io::Result<Vec<String>> {
    let file = File::open(path)?;
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(file);

    let mut record = csv::StringRecord::new();
    let found = reader
        .read_record(&mut record)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    if !found {
        return Ok(Vec::new());
    }

    Ok(record
        .iter()
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect())
}
