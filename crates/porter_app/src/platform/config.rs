use std::fs;
use std::path::{Path, PathBuf};

use client_logging::{client_info, client_warn};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct AppConfig {
    pub server_url: String,
    pub output_dir: PathBuf,
    pub history_cap: usize,
    pub settle_delay_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:5000".to_string(),
            output_dir: PathBuf::from("outputs"),
            history_cap: 10,
            settle_delay_ms: 2000,
        }
    }
}

pub(crate) fn load_config(path: &Path) -> AppConfig {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return AppConfig::default();
        }
        Err(err) => {
            client_warn!("Failed to read config from {:?}: {}", path, err);
            return AppConfig::default();
        }
    };

    match ron::from_str(&content) {
        Ok(config) => {
            client_info!("Loaded config from {:?}", path);
            config
        }
        Err(err) => {
            client_warn!("Failed to parse config from {:?}: {}", path, err);
            AppConfig::default()
        }
    }
}

pub(crate) fn write_default_config(path: &Path) -> Result<(), String> {
    let pretty = ron::ser::PrettyConfig::new();
    let content =
        ron::ser::to_string_pretty(&AppConfig::default(), pretty).map_err(|err| err.to_string())?;
    fs::write(path, content).map_err(|err| err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_config_falls_back_to_defaults() {
        let temp = TempDir::new().unwrap();
        let config = load_config(&temp.path().join("absent.ron"));
        assert_eq!(config.server_url, AppConfig::default().server_url);
        assert_eq!(config.history_cap, 10);
    }

    #[test]
    fn malformed_config_falls_back_to_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("porter.ron");
        fs::write(&path, "not ron at all {{{").unwrap();
        let config = load_config(&path);
        assert_eq!(config.settle_delay_ms, 2000);
    }

    #[test]
    fn default_config_round_trips() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("porter.ron");
        write_default_config(&path).unwrap();
        let config = load_config(&path);
        assert_eq!(config.output_dir, AppConfig::default().output_dir);
    }
}
