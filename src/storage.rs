use crate::config::Config;
use crate::constants::{CONFIG_DIR_NAME, CONFIG_FILE_NAME, LOG_FILE_NAME};
use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

/// Locates the config directory and the files living in it
#[derive(Clone, Debug)]
pub struct Storage {
    config_dir: PathBuf,
}

impl Storage {
    pub fn new() -> Self {
        let config_dir = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(CONFIG_DIR_NAME);
        Storage { config_dir }
    }

    /// Storage rooted at an explicit directory
    pub fn at(config_dir: impl Into<PathBuf>) -> Self {
        Storage {
            config_dir: config_dir.into(),
        }
    }

    pub fn config_path(&self) -> PathBuf {
        self.config_dir.join(CONFIG_FILE_NAME)
    }

    /// Ensure config directory exists
    fn ensure_dir(&self) -> Result<()> {
        if !self.config_dir.exists() {
            fs::create_dir_all(&self.config_dir)?;
        }
        Ok(())
    }

    /// Load the config file; a missing file yields defaults
    pub fn load_config(&self) -> Result<Config> {
        let path = self.config_path();
        if !path.exists() {
            return Ok(Config::default());
        }
        let content = fs::read_to_string(&path)
            .with_context(|| format!("reading {}", path.display()))?;
        let config = serde_yaml::from_str::<Config>(&content)
            .with_context(|| format!("parsing {}", path.display()))?;
        Ok(config)
    }

    /// Write `config` out when no config file exists yet, so there is a file to edit.
    ///
    /// Returns whether a file was written.
    pub fn write_default_config(&self, config: &Config) -> Result<bool> {
        if self.config_path().exists() {
            return Ok(false);
        }
        self.save_config(config)?;
        Ok(true)
    }

    pub fn save_config(&self, config: &Config) -> Result<()> {
        self.ensure_dir()?;
        let content = serde_yaml::to_string(config)?;
        fs::write(self.config_path(), content)?;
        Ok(())
    }

    pub fn log_file(&self, config: &Config) -> PathBuf {
        config
            .log_file
            .clone()
            .unwrap_or_else(|| self.config_dir.join(LOG_FILE_NAME))
    }

    /// Directory the camera frames are read from
    pub fn frames_dir(&self, config: &Config) -> PathBuf {
        config
            .camera
            .frames_dir
            .clone()
            .unwrap_or_else(|| self.config_dir.join("frames"))
    }

    /// Directory saved QR images go to
    pub fn output_dir(&self, config: &Config) -> PathBuf {
        config
            .qr
            .output_dir
            .clone()
            .or_else(dirs::download_dir)
            .unwrap_or_else(|| self.config_dir.join("generated"))
    }
}

impl Default for Storage {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::QrSize;

    #[test]
    fn test_missing_config_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::at(dir.path().join("absent"));
        assert_eq!(storage.load_config().unwrap(), Config::default());
    }

    #[test]
    fn test_save_and_load_config() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::at(dir.path());
        let mut config = Config::default();
        config.qr.default_size = QrSize::Px400;
        config.http.default_url = "https://api.example.com".into();
        storage.save_config(&config).unwrap();

        assert_eq!(storage.load_config().unwrap(), config);
    }

    #[test]
    fn test_default_config_written_only_once() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::at(dir.path().join("fresh"));
        assert!(storage.write_default_config(&Config::default()).unwrap());

        fs::write(storage.config_path(), "http:\n  timeout_secs: 5\n").unwrap();
        assert!(!storage.write_default_config(&Config::default()).unwrap());
        assert_eq!(storage.load_config().unwrap().http.timeout_secs, 5);
    }

    #[test]
    fn test_broken_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::at(dir.path());
        fs::write(storage.config_path(), "qr: [not, a, map").unwrap();
        let err = storage.load_config().unwrap_err();
        assert!(format!("{:#}", err).contains("parsing"));
    }

    #[test]
    fn test_paths_resolve_against_config_dir() {
        let storage = Storage::at("/tmp/qrprobe-test");
        let config = Config::default();
        assert_eq!(storage.log_file(&config), PathBuf::from("/tmp/qrprobe-test/qrprobe.log"));
        assert_eq!(storage.frames_dir(&config), PathBuf::from("/tmp/qrprobe-test/frames"));
    }
}
