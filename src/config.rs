use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::error::ConfigError;
use crate::ingest::DEFAULT_DATA_FILE;

pub const DEFAULT_CONFIG_FILE: &str = "channel-insights.toml";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Markdown,
    Json,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub data_file: PathBuf,
    pub log_filter: String,
    pub format: OutputFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from(DEFAULT_DATA_FILE),
            log_filter: "warn".to_string(),
            format: OutputFormat::Markdown,
        }
    }
}

pub fn parse(contents: &str, path: &Path) -> Result<Config, ConfigError> {
    toml::from_str(contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Reads an explicit config path, or the default file when present.
/// Only an explicit path is required to exist.
pub fn load(explicit: Option<&Path>) -> Result<Config, ConfigError> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => {
            let default = PathBuf::from(DEFAULT_CONFIG_FILE);
            if !default.exists() {
                return Ok(Config::default());
            }
            default
        }
    };

    let contents = fs::read_to_string(&path).map_err(|source| ConfigError::Io {
        path: path.clone(),
        source,
    })?;
    let config = parse(&contents, &path)?;
    debug!(path = %path.display(), "loaded config");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let config = parse("", Path::new("inline.toml")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.data_file, PathBuf::from("cleaned_youtube_data_3.csv"));
    }

    #[test]
    fn overrides_selected_keys() {
        let config = parse(
            "data_file = \"channels.csv\"\nformat = \"json\"\n",
            Path::new("inline.toml"),
        )
        .unwrap();
        assert_eq!(config.data_file, PathBuf::from("channels.csv"));
        assert_eq!(config.format, OutputFormat::Json);
        assert_eq!(config.log_filter, "warn");
    }

    #[test]
    fn rejects_unknown_keys() {
        let err = parse("colour = \"blue\"\n", Path::new("inline.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn explicit_missing_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load(Some(&dir.path().join("missing.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn loads_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        fs::write(&path, "log_filter = \"debug\"\n").unwrap();
        assert_eq!(load(Some(&path)).unwrap().log_filter, "debug");
    }
}
