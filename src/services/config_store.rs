// Configuration Storage Service
// Handles config file read/write and version backup

use crate::models::AnalyzerOptions;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    pub version: String,
    #[serde(default)]
    pub classifier: ClassifierConfig,
    #[serde(default)]
    pub analysis: AnalyzerOptions,
    /// Label-to-glyph overrides merged on top of the built-in table.
    #[serde(default)]
    pub glyphs: HashMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ClassifierConfig {
    pub base_url: Option<String>,
}

pub struct ConfigStore {
    config_dir: PathBuf,
    config_file: PathBuf,
}

impl ConfigStore {
    pub fn new(config_dir: PathBuf) -> Self {
        let config_file = config_dir.join("config.json");
        Self { config_dir, config_file }
    }

    /// Get default config directory
    pub fn default_config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("emodrift"))
    }

    /// Ensure config directory exists
    pub fn ensure_dir(&self) -> Result<(), String> {
        fs::create_dir_all(&self.config_dir)
            .map_err(|e| format!("Failed to create config dir: {}", e))
    }

    /// Load configuration from file
    /// Malformed analysis options (threshold outside [0,1]) are rejected
    /// here, at configuration time, not per analysis call.
    pub fn load(&self) -> Result<AppConfig, String> {
        if !self.config_file.exists() {
            return Ok(AppConfig::default());
        }

        let content = fs::read_to_string(&self.config_file)
            .map_err(|e| format!("Failed to read config: {}", e))?;

        let config: AppConfig = serde_json::from_str(&content)
            .map_err(|e| format!("Failed to parse config: {}", e))?;

        config
            .analysis
            .validate()
            .map_err(|e| format!("Invalid analysis config: {}", e))?;

        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, config: &AppConfig) -> Result<(), String> {
        config
            .analysis
            .validate()
            .map_err(|e| format!("Invalid analysis config: {}", e))?;

        self.ensure_dir()?;

        // Create backup if file exists
        if self.config_file.exists() {
            self.create_backup()?;
        }

        let content = serde_json::to_string_pretty(config)
            .map_err(|e| format!("Failed to serialize config: {}", e))?;

        fs::write(&self.config_file, content)
            .map_err(|e| format!("Failed to write config: {}", e))
    }

    /// Create a backup of current config
    fn create_backup(&self) -> Result<(), String> {
        let backup_dir = self.config_dir.join("backups");
        fs::create_dir_all(&backup_dir)
            .map_err(|e| format!("Failed to create backup dir: {}", e))?;

        let timestamp = chrono::Utc::now().format("%Y%m%d_%H%M%S");
        let backup_file = backup_dir.join(format!("config_{}.json", timestamp));

        fs::copy(&self.config_file, &backup_file)
            .map_err(|e| format!("Failed to create backup: {}", e))?;

        // Keep only last 10 backups
        self.cleanup_old_backups(&backup_dir, 10)?;

        Ok(())
    }

    /// Remove old backups, keeping only the most recent N
    fn cleanup_old_backups(&self, backup_dir: &PathBuf, keep: usize) -> Result<(), String> {
        let mut entries: Vec<_> = fs::read_dir(backup_dir)
            .map_err(|e| format!("Failed to read backup dir: {}", e))?
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().map_or(false, |ext| ext == "json"))
            .collect();

        if entries.len() <= keep {
            return Ok(());
        }

        // Sort by modification time (oldest first)
        entries.sort_by_key(|e| {
            e.metadata()
                .and_then(|m| m.modified())
                .unwrap_or(std::time::SystemTime::UNIX_EPOCH)
        });

        // Remove oldest entries
        for entry in entries.iter().take(entries.len() - keep) {
            let _ = fs::remove_file(entry.path());
        }

        Ok(())
    }

    /// Get classifier base URL from config file
    pub fn get_classifier_url(&self) -> Result<Option<String>, String> {
        let config = self.load()?;
        Ok(config.classifier.base_url)
    }

    /// Set classifier base URL in config file
    pub fn set_classifier_url(&self, url: &str) -> Result<(), String> {
        let mut config = self.load()?;
        config.classifier.base_url = Some(url.to_string());
        self.save(&config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.analysis.threshold, 0.1);
        assert_eq!(config.analysis.fallback_label, "neutral");
        assert!(config.classifier.base_url.is_none());
        assert!(config.glyphs.is_empty());
    }

    #[test]
    fn test_config_serialization() {
        let mut config = AppConfig::default();
        config.version = "1.0.0".to_string();
        config.classifier.base_url = Some("http://127.0.0.1:8799".to_string());
        config.glyphs.insert("joy".to_string(), ":)".to_string());

        let json = serde_json::to_string(&config).unwrap();
        let parsed: AppConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.version, "1.0.0");
        assert_eq!(parsed.classifier.base_url.as_deref(), Some("http://127.0.0.1:8799"));
        assert_eq!(parsed.glyphs.get("joy").map(|s| s.as_str()), Some(":)"));
    }

    #[test]
    fn test_save_rejects_invalid_threshold() {
        let mut config = AppConfig::default();
        config.analysis.threshold = 5.0;

        let store = ConfigStore::new(std::env::temp_dir().join("emodrift-test-config"));
        assert!(store.save(&config).is_err());
    }
}
