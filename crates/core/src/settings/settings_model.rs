//! Conversion settings, read from a small JSON file.

use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::constants::{DIVISION_MIN_SCALE, MAX_SCALE, SETTINGS_FILE_NAME};
use crate::errors::{Error, Result};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct ConversionSettings {
    /// Minimum fractional digits kept when a rate is derived from two amounts.
    pub division_scale: u32,
    /// Reuse the last answer for further transactions on a pair that has
    /// no link yet, instead of asking again.
    pub reuse_session_rate: bool,
}

impl Default for ConversionSettings {
    fn default() -> Self {
        Self {
            division_scale: DIVISION_MIN_SCALE,
            reuse_session_rate: true,
        }
    }
}

impl ConversionSettings {
    /// Loads settings from `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No settings file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let settings: ConversionSettings = serde_json::from_str(&content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Loads `conversion.json` from the directory holding the data file.
    pub fn load_from_dir(dir: &Path) -> Result<Self> {
        Self::load(&dir.join(SETTINGS_FILE_NAME))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        self.validate()?;
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.division_scale > MAX_SCALE {
            return Err(Error::InvalidConfigValue(format!(
                "divisionScale must be at most {}, got {}",
                MAX_SCALE, self.division_scale
            )));
        }
        Ok(())
    }
}
