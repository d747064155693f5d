//! Configuration

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{session::RetryPolicy, timestamp::TimestampMode};

#[derive(Debug, Error)]
pub enum Error {
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),
    #[error("Failed to read configuration at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

type Result<T> = std::result::Result<T, Error>;

/// Defaults applied to a [`SessionBuilder`](crate::SessionBuilder).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    directory: PathBuf,
    extension: String,
    timestamps: TimestampMode,
    overwrite: bool,
    date_suffix: bool,
    retry: RetryPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("datalogs"),
            extension: "csv".to_owned(),
            timestamps: TimestampMode::DecimalSeconds,
            overwrite: true,
            date_suffix: false,
            retry: RetryPolicy::Never,
        }
    }
}

impl Config {
    pub fn from_toml(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(Error::Toml)
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string(self).map_err(Error::TomlSer)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let s = fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_owned(),
            source,
        })?;
        Self::from_toml(&s)
    }

    /// Directory the log files are created in.
    #[must_use]
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    #[must_use]
    pub fn extension(&self) -> &str {
        &self.extension
    }

    #[must_use]
    pub const fn timestamps(&self) -> TimestampMode {
        self.timestamps
    }

    /// Truncate an existing file instead of refusing to open it.
    #[must_use]
    pub const fn overwrite(&self) -> bool {
        self.overwrite
    }

    /// Append the local start time to file names.
    #[must_use]
    pub const fn date_suffix(&self) -> bool {
        self.date_suffix
    }

    #[must_use]
    pub const fn retry(&self) -> RetryPolicy {
        self.retry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_gives_defaults() {
        assert_eq!(Config::from_toml("").unwrap(), Config::default());
    }

    #[test]
    fn partial_toml_overrides() {
        let config = Config::from_toml(
            r#"
            directory = "/tmp/logs"
            timestamps = "none"
            retry = "once"
            "#,
        )
        .unwrap();
        assert_eq!(config.directory(), Path::new("/tmp/logs"));
        assert_eq!(config.timestamps(), TimestampMode::None);
        assert_eq!(config.retry(), RetryPolicy::Once);
        assert_eq!(config.extension(), "csv");
        assert!(config.overwrite());
    }

    #[test]
    fn serialized_default_parses_back() {
        let config = Config::default();
        let s = config.to_toml().unwrap();
        assert_eq!(Config::from_toml(&s).unwrap(), config);
    }

    #[test]
    fn unknown_mode_is_rejected() {
        assert!(Config::from_toml("timestamps = \"nanoseconds\"").is_err());
    }

    #[test]
    fn load_reports_missing_file() {
        let err = Config::load(Path::new("/nonexistent/looplog.toml")).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }
}
