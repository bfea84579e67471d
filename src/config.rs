use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::app_dirs::AppDirs;
use crate::drag::DEFAULT_DRAG_SENSITIVITY;
use crate::error::Result;
use crate::picker::{PickerProps, DEFAULT_DIVISIONS, DEFAULT_SLIDER_STEP};

/// Persisted demo settings plus the last chosen time
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub value: String,
    pub label: Option<String>,
    pub slider_step: u32,
    pub drag_sensitivity: f64,
    pub divisions: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            value: "9:00".to_string(),
            label: None,
            slider_step: DEFAULT_SLIDER_STEP,
            drag_sensitivity: DEFAULT_DRAG_SENSITIVITY,
            divisions: DEFAULT_DIVISIONS,
        }
    }
}

impl Config {
    pub fn props(&self, disabled: bool) -> PickerProps {
        PickerProps {
            label: self.label.clone(),
            disabled,
            slider_step: self.slider_step,
            drag_sensitivity: self.drag_sensitivity,
            divisions: self.divisions,
        }
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = AppDirs::config_path().unwrap_or_else(|| PathBuf::from("scrubtime_config.json"));
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) => {
                debug!(path = %self.path.display(), %err, "no config file, using defaults");
                return Config::default();
            }
        };
        match serde_json::from_slice::<Config>(&bytes) {
            Ok(cfg) => cfg,
            Err(err) => {
                warn!(path = %self.path.display(), %err, "unreadable config, using defaults");
                Config::default()
            }
        }
    }

    fn save(&self, cfg: &Config) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg)?;
        fs::write(&self.path, data)?;
        debug!(path = %self.path.display(), "config saved");
        Ok(())
    }
}
