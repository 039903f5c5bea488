use std::path::{
    Path,
    PathBuf,
};

use serde::{
    Deserialize,
    Serialize,
};

use crate::{
    core::ReminderError,
    persistence::{
        get_data_file_path,
        load_json_or_default,
        save_json,
    },
};

pub const SETTINGS_FILE: &str = "settings.json";
pub const API_URL_ENV: &str = "TASKBELL_API_URL";
pub const DEFAULT_API_URL: &str = "http://192.168.1.8:5000";
pub const DEFAULT_LOG_FILTER: &str = "taskbell=info";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientSettings {
    pub api_url: String,
    pub live_updates: bool,
    pub log_filter: String,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            live_updates: true,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl ClientSettings {
    pub fn default_path() -> PathBuf {
        get_data_file_path(SETTINGS_FILE)
    }

    /// Defaults, then the settings file, then `TASKBELL_API_URL`.
    pub fn load(path: Option<&Path>) -> Self {
        let path = path.map(Path::to_path_buf).unwrap_or_else(Self::default_path);
        load_json_or_default::<Self>(&path).with_api_url(std::env::var(API_URL_ENV).ok())
    }

    /// Overrides the server address when `api_url` is set and non-blank.
    pub fn with_api_url(mut self, api_url: Option<String>) -> Self {
        if let Some(api_url) = api_url.map(|url| url.trim().to_string()).filter(|url| !url.is_empty())
        {
            self.api_url = api_url;
        }
        self
    }

    pub fn save(&self, path: Option<&Path>) -> Result<PathBuf, ReminderError> {
        let path = path.map(Path::to_path_buf).unwrap_or_else(Self::default_path);
        save_json(self, &path)?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expected(settings: ClientSettings) -> ClientSettings {
        settings.with_api_url(std::env::var(API_URL_ENV).ok())
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(SETTINGS_FILE);

        let settings = ClientSettings {
            api_url: "http://10.0.0.2:5000".to_string(),
            live_updates: false,
            log_filter: "taskbell=debug".to_string(),
        };
        assert_eq!(settings.save(Some(&path)).unwrap(), path);

        assert_eq!(ClientSettings::load(Some(&path)), expected(settings));
    }

    #[test]
    fn test_missing_or_broken_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.json");
        assert_eq!(ClientSettings::load(Some(&missing)), expected(ClientSettings::default()));

        let broken = dir.path().join("broken.json");
        std::fs::write(&broken, "{ not json").unwrap();
        assert_eq!(ClientSettings::load(Some(&broken)), expected(ClientSettings::default()));
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILE);
        std::fs::write(&path, r#"{"live_updates": false}"#).unwrap();

        let loaded = ClientSettings::load(Some(&path));
        assert!(!loaded.live_updates);
        assert_eq!(loaded.log_filter, DEFAULT_LOG_FILTER);
    }

    #[test]
    fn test_api_url_override() {
        let settings = ClientSettings::default();
        assert_eq!(settings.clone().with_api_url(None).api_url, DEFAULT_API_URL);
        assert_eq!(settings.clone().with_api_url(Some("   ".to_string())).api_url, DEFAULT_API_URL);
        assert_eq!(
            settings.with_api_url(Some(" http://localhost:5000 ".to_string())).api_url,
            "http://localhost:5000"
        );
    }
}
