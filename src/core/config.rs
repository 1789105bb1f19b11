//! Application configuration management

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

/// Number of entries kept in the recent files list
const MAX_RECENT_FILES: usize = 10;

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppConfig {
    /// Last opened markdown file
    pub last_opened_file: Option<PathBuf>,
    /// Last opened directory
    pub last_opened_directory: Option<PathBuf>,
    /// Recently opened files, most recent first
    pub recent_files: Vec<PathBuf>,
    /// Initial window width
    pub window_width: u32,
    /// Initial window height
    pub window_height: u32,
    /// Theme (light/dark)
    pub theme: String,
    /// Show dotfiles in the file list
    pub show_hidden_files: bool,
    /// Settings without a dedicated field
    pub custom_settings: HashMap<String, String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            last_opened_file: None,
            last_opened_directory: None,
            recent_files: Vec::new(),
            window_width: 1024,
            window_height: 768,
            theme: "light".to_string(),
            show_hidden_files: false,
            custom_settings: HashMap::new(),
        }
    }
}

/// A single configuration update, addressed by its JSON key
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigField {
    LastOpenedFile(PathBuf),
    LastOpenedDirectory(PathBuf),
    Theme(String),
    ShowHiddenFiles(bool),
    /// Unknown keys land in `custom_settings`
    Custom { key: String, value: String },
}

impl ConfigField {
    /// Route a key/value pair to its field
    pub fn parse(key: &str, value: &str) -> Self {
        match key {
            "lastOpenedFile" => Self::LastOpenedFile(PathBuf::from(value)),
            "lastOpenedDirectory" => Self::LastOpenedDirectory(PathBuf::from(value)),
            "theme" => Self::Theme(value.to_string()),
            "showHiddenFiles" => Self::ShowHiddenFiles(value == "true"),
            _ => Self::Custom {
                key: key.to_string(),
                value: value.to_string(),
            },
        }
    }
}

fn non_empty(path: PathBuf) -> Option<PathBuf> {
    if path.as_os_str().is_empty() {
        None
    } else {
        Some(path)
    }
}

impl AppConfig {
    /// Get the config file path
    fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "markdowns", "Markdowns")
            .map(|dirs| dirs.config_dir().join("config.json"))
    }

    /// Load configuration from disk
    pub fn load() -> Result<Self> {
        let path = Self::config_path()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
        Self::load_from(&path)
    }

    /// Load configuration from `path`, defaults if the file is absent
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_json(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Parse a whole configuration document
    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
        self.save_to(&path)
    }

    /// Save configuration to `path`
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure config directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        tracing::info!("Saved config to: {}", path.display());
        Ok(())
    }

    /// Apply a single field update
    pub fn apply(&mut self, field: ConfigField) {
        match field {
            ConfigField::LastOpenedFile(path) => self.last_opened_file = non_empty(path),
            ConfigField::LastOpenedDirectory(path) => self.last_opened_directory = non_empty(path),
            ConfigField::Theme(theme) => self.theme = theme,
            ConfigField::ShowHiddenFiles(show) => self.show_hidden_files = show,
            ConfigField::Custom { key, value } => {
                self.custom_settings.insert(key, value);
            }
        }
    }

    /// Load, update one field by key, and save
    #[allow(dead_code)]
    pub fn update_field(key: &str, value: &str) -> Result<()> {
        let mut config = Self::load()?;
        config.apply(ConfigField::parse(key, value));
        config.save()
    }

    /// Add a file to recent files
    pub fn add_recent_file(&mut self, path: PathBuf) {
        // Remove if already exists
        self.recent_files.retain(|p| p != &path);
        // Add to front
        self.recent_files.insert(0, path);
        self.recent_files.truncate(MAX_RECENT_FILES);
    }

    pub fn is_dark(&self) -> bool {
        self.theme.eq_ignore_ascii_case("dark")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_loads_defaults() {
        let tmp = TempDir::new().unwrap();
        let config = AppConfig::load_from(&tmp.path().join("config.json")).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.theme, "light");
        assert_eq!((config.window_width, config.window_height), (1024, 768));
    }

    #[test]
    fn test_save_and_reload() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested").join("config.json");
        let mut config = AppConfig::default();
        config.apply(ConfigField::parse("lastOpenedDirectory", "/home/u/notes"));
        config.apply(ConfigField::parse("showHiddenFiles", "true"));
        config.save_to(&path).unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"lastOpenedDirectory\": \"/home/u/notes\""));
        assert_eq!(AppConfig::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config = AppConfig::from_json(r#"{"theme": "dark", "recentFiles": ["/a.md"]}"#).unwrap();
        assert!(config.is_dark());
        assert_eq!(config.recent_files, vec![PathBuf::from("/a.md")]);
        assert_eq!(config.window_width, 1024);
        assert!(AppConfig::from_json("{not json").is_err());
    }

    #[test]
    fn test_field_routing() {
        assert_eq!(
            ConfigField::parse("showHiddenFiles", "yes"),
            ConfigField::ShowHiddenFiles(false)
        );
        assert_eq!(ConfigField::parse("theme", "dark"), ConfigField::Theme("dark".into()));

        let mut config = AppConfig::default();
        config.apply(ConfigField::parse("fontSize", "14"));
        assert_eq!(config.custom_settings.get("fontSize").map(String::as_str), Some("14"));

        config.apply(ConfigField::parse("lastOpenedFile", "/n/a.md"));
        assert_eq!(config.last_opened_file, Some(PathBuf::from("/n/a.md")));
        config.apply(ConfigField::parse("lastOpenedFile", ""));
        assert_eq!(config.last_opened_file, None);
    }

    #[test]
    fn test_recent_files_dedup_and_cap() {
        let mut config = AppConfig::default();
        for i in 0..12 {
            config.add_recent_file(PathBuf::from(format!("/n/{i}.md")));
        }
        config.add_recent_file(PathBuf::from("/n/5.md"));
        assert_eq!(config.recent_files.len(), MAX_RECENT_FILES);
        assert_eq!(config.recent_files[0], PathBuf::from("/n/5.md"));
        assert_eq!(config.recent_files.iter().filter(|p| p.ends_with("5.md")).count(), 1);
    }
}
