// Application settings
// Loaded from ~/.config/pagesel/settings.json

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub use pagesel_engine::DEFAULT_PAGE_SIZE;
pub const DEFAULT_API_BASE: &str = "https://api.artic.edu/api/v1";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    // Table
    #[serde(rename = "table.pageSize")]
    pub page_size: usize,

    #[serde(rename = "table.errorMessage")]
    pub error_message: String,

    // Page source
    #[serde(rename = "source.apiBase")]
    pub api_base: String,

    #[serde(rename = "source.timeoutSecs")]
    pub timeout_secs: u64,

    #[serde(rename = "source.maxRetries")]
    pub max_retries: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            // Table
            page_size: DEFAULT_PAGE_SIZE,
            error_message: "Failed to load artworks".to_string(),
            // Source
            api_base: DEFAULT_API_BASE.to_string(),
            timeout_secs: 30,
            max_retries: 3,
        }
    }
}

impl Settings {
    /// Get the settings file path
    pub fn config_path() -> PathBuf {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("pagesel");
        config_dir.join("settings.json")
    }

    /// Load settings from the default location, writing a commented
    /// default file on first run.
    pub fn load() -> Self {
        let path = Self::config_path();

        if !path.exists() {
            let settings = Self::default();
            settings.create_default_file(&path);
            return settings;
        }

        Self::load_from(&path)
    }

    /// Load settings from `path`, falling back to defaults on any error
    pub fn load_from(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => match Self::parse(&contents) {
                Ok(settings) => settings,
                Err(e) => {
                    log::warn!("Error parsing {}: {}", path.display(), e);
                    log::warn!("Using default settings");
                    Self::default()
                }
            },
            Err(e) => {
                log::warn!("Error reading {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Parse settings JSON. Lines starting with `//` are comments.
    pub fn parse(contents: &str) -> Result<Self, serde_json::Error> {
        let cleaned: String = contents
            .lines()
            .filter(|line| !line.trim().starts_with("//"))
            .collect::<Vec<_>>()
            .join("\n");

        let settings: Self = serde_json::from_str(&cleaned)?;
        Ok(settings.normalized())
    }

    fn normalized(mut self) -> Self {
        if self.page_size == 0 {
            self.page_size = DEFAULT_PAGE_SIZE;
        }
        let trimmed = self.api_base.trim_end_matches('/').len();
        self.api_base.truncate(trimmed);
        self
    }

    /// Create default settings file with comments
    fn create_default_file(&self, path: &Path) {
        if let Some(parent) = path.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                log::warn!("Error creating config directory: {}", e);
                return;
            }
        }

        let default_config = r#"{
    // Table
    "table.pageSize": 12,
    "table.errorMessage": "Failed to load artworks",

    // Page source (Art Institute of Chicago public API)
    "source.apiBase": "https://api.artic.edu/api/v1",
    "source.timeoutSecs": 30,
    "source.maxRetries": 3
}
"#;

        if let Err(e) = fs::write(path, default_config) {
            log::warn!("Error writing default settings.json: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_with_comments() {
        let json = r#"{
    // smaller pages
    "table.pageSize": 25,
    "source.apiBase": "http://localhost:9000/api/v1/"
}"#;
        let settings = Settings::parse(json).unwrap();
        assert_eq!(settings.page_size, 25);
        assert_eq!(settings.api_base, "http://localhost:9000/api/v1");
        assert_eq!(settings.max_retries, 3);
    }

    #[test]
    fn test_zero_page_size_is_normalized() {
        let settings = Settings::parse(r#"{ "table.pageSize": 0 }"#).unwrap();
        assert_eq!(settings.page_size, DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn test_invalid_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{ not json").unwrap();
        assert_eq!(Settings::load_from(&path), Settings::default());
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(
            Settings::load_from(&dir.path().join("absent.json")),
            Settings::default()
        );
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{ "table.pageSize": 50, "source.timeoutSecs": 5 }"#).unwrap();
        let settings = Settings::load_from(&path);
        assert_eq!(settings.page_size, 50);
        assert_eq!(settings.timeout_secs, 5);
        assert_eq!(settings.error_message, "Failed to load artworks");
    }

    #[test]
    fn test_page_size_default_matches_engine() {
        assert_eq!(Settings::default().page_size, pagesel_engine::DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn test_default_file_parses_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        Settings::default().create_default_file(&path);
        assert_eq!(Settings::load_from(&path), Settings::default());
    }
}
