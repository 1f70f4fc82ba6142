use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use log::LevelFilter;
use meshload_obj::ParseOptions;

#[derive(thiserror::Error, Debug)]
pub enum SettingsError {
    #[error("Unable to open settings file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Invalid settings file: {0}")]
    JsonError(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct Settings {
    pub thread_count: u32,
    pub log_level: LevelFilter,
    pub resolve_materials: bool,
    pub fail_fast: bool,
    pub reclaim_interval: usize,
    pub list_objects: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            thread_count: 4,
            log_level: LevelFilter::Info,
            resolve_materials: true,
            fail_fast: false,
            reclaim_interval: ParseOptions::default().reclaim_interval,
            list_objects: false,
        }
    }
}

impl Settings {
    /// Reads settings from a JSON file. Missing fields take their default values.
    pub fn load(path: &Path) -> Result<Settings, SettingsError> {
        let file = File::open(path)?;
        let settings = serde_json::from_reader(BufReader::new(file))?;
        Ok(settings)
    }

    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            reclaim_interval: self.reclaim_interval,
        }
    }
}

#[cfg(test)]
mod test {
    use log::LevelFilter;

    use super::Settings;

    #[test]
    fn partial_settings_use_defaults() {
        let settings: Settings = serde_json::from_str(r#"{ "thread_count": 2, "log_level": "DEBUG" }"#).unwrap();
        assert_eq!(settings.thread_count, 2);
        assert_eq!(settings.log_level, LevelFilter::Debug);
        assert!(settings.resolve_materials);
        assert_eq!(settings.reclaim_interval, 1_000_000);
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("meshload.json");
        std::fs::write(&path, r#"{ "fail_fast": true, "list_objects": true }"#).unwrap();
        let settings = Settings::load(&path).unwrap();
        assert!(settings.fail_fast);
        assert!(settings.list_objects);
        assert_eq!(settings.thread_count, Settings::default().thread_count);
    }

    #[test]
    fn invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("meshload.json");
        std::fs::write(&path, "{ thread_count: ").unwrap();
        assert!(Settings::load(&path).is_err());
    }
}
