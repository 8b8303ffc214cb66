//! Layered settings for the rollcore binary
//!
//! Sources, later ones winning:
//! 1. Built-in defaults
//! 2. Optional TOML file
//! 3. `ROLLCORE_` environment variables, `__` separating nested keys
//!    (`ROLLCORE_MECHANIC__TARGET=15`, `ROLLCORE_SEED=7`)

use std::path::Path;

use anyhow::{bail, Result};
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::mechanic::MechanicConfig;

/// Environment variable prefix
pub const ENV_PREFIX: &str = "ROLLCORE_";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub mechanic: MechanicConfig,
    /// Fixed RNG seed; fresh entropy when unset
    pub seed: Option<u64>,
    /// Default tracing filter when RUST_LOG is unset
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            mechanic: MechanicConfig::default(),
            seed: None,
            log_filter: "rollcore=info".to_string(),
        }
    }
}

impl Settings {
    /// Load defaults, then `path` if given, then the environment
    ///
    /// # Errors
    /// * `path` does not exist
    /// * A source fails to parse or has the wrong shape
    /// * The resulting mechanic config is invalid
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut figment = Self::figment(path)?;
        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));
        Self::from_figment(figment)
    }

    /// Defaults plus the optional file, without the environment layer
    pub fn figment(path: Option<&Path>) -> Result<Figment> {
        let mut figment = Figment::from(Serialized::defaults(Settings::default()));

        if let Some(path) = path {
            if !path.exists() {
                bail!("Config file not found: {}", path.display());
            }
            debug!("Loading settings from {}", path.display());
            figment = figment.merge(Toml::file(path));
        }

        Ok(figment)
    }

    /// Extract and validate settings from a prepared figment
    pub fn from_figment(figment: Figment) -> Result<Self> {
        let settings: Settings = figment.extract()?;
        settings.mechanic.validate()?;
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mechanic::{Criteria, Mechanic};
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let settings = Settings::from_figment(Settings::figment(None).unwrap()).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.mechanic.base_formula, "1d20");
    }

    #[test]
    fn test_load_toml_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
seed = 1234

[mechanic]
mechanic = "pool"
base_formula = "6d10"
criteria = ">="
target = 8
difficulty = 3
exploding = true
explode_threshold = 10
"#
        )
        .unwrap();

        let figment = Settings::figment(Some(file.path())).unwrap();
        let settings = Settings::from_figment(figment).unwrap();

        assert_eq!(settings.seed, Some(1234));
        assert_eq!(settings.mechanic.mechanic, Mechanic::DicePool);
        assert_eq!(settings.mechanic.base_formula, "6d10");
        assert_eq!(settings.mechanic.criteria, Criteria::GreaterEqual);
        assert_eq!(settings.mechanic.target, Some(8));
        assert_eq!(settings.mechanic.difficulty, Some(3));
        assert!(settings.mechanic.exploding);
        assert_eq!(settings.mechanic.explode_threshold, Some(10));
        assert_eq!(settings.log_filter, "rollcore=info");
    }

    #[test]
    fn test_later_layers_win() {
        let figment = Settings::figment(None)
            .unwrap()
            .merge(Serialized::default("seed", 9))
            .merge(Serialized::default("mechanic.target", 12));
        let settings = Settings::from_figment(figment).unwrap();
        assert_eq!(settings.seed, Some(9));
        assert_eq!(settings.mechanic.target, Some(12));
    }

    #[test]
    fn test_missing_file() {
        let result = Settings::figment(Some(Path::new("/nonexistent/rollcore.toml")));
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("not found"));
    }

    #[test]
    fn test_invalid_mechanic_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[mechanic]\nexplode_threshold = 0").unwrap();

        let figment = Settings::figment(Some(file.path())).unwrap();
        let result = Settings::from_figment(figment);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("explosion threshold"));
    }
}
