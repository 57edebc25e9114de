//! Converter configuration.
//!
//! Read from TOML:
//!
//! ```toml
//! dialect = "postgres"
//! max_depth = 64
//!
//! [functions]
//! CCUR = "CAST_MONEY"
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::error::{ConvertError, ConvertResult};
use crate::rewriter::{DEFAULT_MAX_DEPTH, Dialect};

/// File name looked up in the working directory.
pub const LOCAL_CONFIG: &str = "accql.toml";

/// Main converter configuration
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Target dialect
    pub dialect: Dialect,

    /// Maximum nesting depth before `InputTooDeep`
    pub max_depth: usize,

    /// Extra function renames, Access name → target name
    pub functions: BTreeMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dialect: Dialect::default(),
            max_depth: DEFAULT_MAX_DEPTH,
            functions: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Create a new configuration builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    pub fn from_toml(text: &str) -> ConvertResult<Self> {
        let config: Config =
            toml::from_str(text).map_err(|e| ConvertError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> ConvertResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| ConvertError::io(path, e))?;
        Self::from_toml(&text).map_err(|e| match e {
            ConvertError::Config(msg) => {
                ConvertError::Config(format!("{}: {}", path.display(), msg))
            }
            other => other,
        })
    }

    /// Load the first config found.
    ///
    /// An explicit path must exist. Otherwise `./accql.toml`, then
    /// `<config dir>/accql/config.toml`, then defaults.
    pub fn load(explicit: Option<&Path>) -> ConvertResult<Self> {
        if let Some(path) = explicit {
            debug!(path = %path.display(), "loading config");
            return Self::from_file(path);
        }
        for path in Self::default_paths() {
            if path.is_file() {
                debug!(path = %path.display(), "loading config");
                return Self::from_file(&path);
            }
        }
        debug!("no config file found, using defaults");
        Ok(Self::default())
    }

    /// Implicit lookup locations, in priority order.
    pub fn default_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(LOCAL_CONFIG)];
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("accql").join("config.toml"));
        }
        paths
    }

    fn validate(&self) -> ConvertResult<()> {
        if self.max_depth == 0 {
            return Err(ConvertError::Config(
                "max_depth must be at least 1".to_string(),
            ));
        }
        if let Some((from, _)) = self.functions.iter().find(|(from, to)| {
            from.trim().is_empty() || to.trim().is_empty()
        }) {
            return Err(ConvertError::Config(format!(
                "empty function mapping for '{}'",
                from
            )));
        }
        Ok(())
    }
}

/// Builder for Config
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the target dialect
    pub fn dialect(mut self, dialect: Dialect) -> Self {
        self.config.dialect = dialect;
        self
    }

    /// Set the nesting bound
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.config.max_depth = depth;
        self
    }

    /// Add a function rename
    pub fn function(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.config.functions.insert(from.into(), to.into());
        self
    }

    /// Build the configuration
    pub fn build(self) -> ConvertResult<Config> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.dialect, Dialect::Postgres);
        assert_eq!(config.max_depth, DEFAULT_MAX_DEPTH);
    }

    #[test]
    fn test_full_file() {
        let config = Config::from_toml(
            r#"
            dialect = "mysql"
            max_depth = 32

            [functions]
            CCUR = "CAST_MONEY"
            "#,
        )
        .unwrap();
        assert_eq!(config.dialect, Dialect::MySql);
        assert_eq!(config.max_depth, 32);
        assert_eq!(config.functions.get("CCUR").map(String::as_str), Some("CAST_MONEY"));
    }

    #[test]
    fn test_dialect_alias() {
        let config = Config::from_toml(r#"dialect = "pg""#).unwrap();
        assert_eq!(config.dialect, Dialect::Postgres);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(matches!(
            Config::from_toml(r#"dialect = "oracle""#),
            Err(ConvertError::Config(_))
        ));
        assert!(matches!(
            Config::from_toml("max_depth = 0"),
            Err(ConvertError::Config(_))
        ));
        assert!(matches!(
            Config::from_toml("unknown_key = 1"),
            Err(ConvertError::Config(_))
        ));
    }

    #[test]
    fn test_explicit_missing_file_is_io_error() {
        let err = Config::load(Some(Path::new("/nonexistent/accql.toml"))).unwrap_err();
        assert!(matches!(err, ConvertError::Io { .. }));
    }

    #[test]
    fn test_builder() {
        let config = Config::builder()
            .dialect(Dialect::Sqlite)
            .max_depth(8)
            .function("Fmt", "PRINTF")
            .build()
            .unwrap();
        assert_eq!(config.dialect, Dialect::Sqlite);
        assert_eq!(config.max_depth, 8);
        assert_eq!(config.functions.len(), 1);

        assert!(Config::builder().function("X", " ").build().is_err());
    }
}
