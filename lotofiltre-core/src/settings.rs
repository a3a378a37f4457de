use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Prix d'une grille, en unités monétaires.
    pub unit_price: u64,
    /// Au-delà, la réduction est refusée avec `PoolTooLarge`.
    pub max_combinations: u64,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            unit_price: 2,
            max_combinations: 5_000_000,
        }
    }
}

impl EngineSettings {
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let settings: EngineSettings = serde_json::from_str(&json)?;
        Ok(settings)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = EngineSettings::default();
        assert_eq!(settings.unit_price, 2);
        assert_eq!(settings.max_combinations, 5_000_000);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings: EngineSettings = serde_json::from_str(r#"{ "unit_price": 3 }"#).unwrap();
        assert_eq!(settings.unit_price, 3);
        assert_eq!(settings.max_combinations, 5_000_000);
    }

    #[test]
    fn test_save_and_load() {
        let path = std::env::temp_dir().join(format!("lotofiltre-settings-{}.json", std::process::id()));
        let settings = EngineSettings { unit_price: 5, max_combinations: 1000 };
        settings.save(&path).unwrap();
        let loaded = EngineSettings::load(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_load_missing_file() {
        assert!(EngineSettings::load(Path::new("/nonexistent/lotofiltre.json")).is_err());
    }
}
