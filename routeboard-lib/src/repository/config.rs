use std::{fs, io, sync::Arc};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::{fs::config_dir, schedule::Schedule};

const FILE_NAME: &str = "core.toml";

/// Handle to the core configuration
pub type Cfg = Arc<RwLock<CoreConfig>>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Failed to access the configuration file: {0}")]
    Io(#[from] io::Error),
    #[error("Failed to serialize the configuration: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// The library's core configuration, serialized to TOML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    /// Region used when a command doesn't name one
    pub default_region: String,
    pub schedule: Schedule,
}

impl CoreConfig {
    /// Load the configuration file, writing the defaults out if there isn't one yet.
    ///
    /// A file that fails to parse is reported and replaced by the defaults in memory, leaving the
    /// file itself untouched.
    pub fn load() -> Result<Self, Error> {
        let path = config_dir()?.join(FILE_NAME);

        if path.exists() {
            let contents = fs::read_to_string(&path)?;
            Ok(Self::parse(&contents))
        } else {
            let cfg = Self::default();
            cfg.save()?;
            Ok(cfg)
        }
    }

    pub fn save(&self) -> Result<(), Error> {
        let contents = toml::to_string_pretty(self)?;

        fs::write(config_dir()?.join(FILE_NAME), contents)?;

        Ok(())
    }

    fn parse(contents: &str) -> Self {
        toml::from_str(contents).unwrap_or_else(|err| {
            warn!("Ignoring invalid {FILE_NAME}: {err}");
            Self::default()
        })
    }

    #[cfg(test)]
    pub(crate) fn mock() -> Self {
        Self::default()
    }
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            default_region: "kuala-lumpur".to_string(),
            schedule: Schedule::default(),
        }
    }
}

#[cfg(test)]
mod test {
    use chrono::NaiveDate;

    use super::CoreConfig;

    #[test]
    fn test_parse_partial() {
        let cfg = CoreConfig::parse(
            r#"
            [schedule]
            alternate_week_anchor = "2025-01-06"
            "#,
        );

        assert_eq!(cfg.default_region, "kuala-lumpur");
        assert_eq!(
            cfg.schedule.alternate_week_anchor,
            NaiveDate::from_ymd_opt(2025, 1, 6).unwrap()
        );
    }

    #[test]
    fn test_parse_invalid_falls_back() {
        let cfg = CoreConfig::parse("default_region = [");

        assert_eq!(cfg, CoreConfig::default());
    }

    #[test]
    fn test_round_trip() {
        let cfg = CoreConfig {
            default_region: "selangor".into(),
            ..CoreConfig::default()
        };

        let text = toml::to_string_pretty(&cfg).unwrap();

        assert_eq!(CoreConfig::parse(&text), cfg);
    }
}
