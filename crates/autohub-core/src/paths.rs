use crate::{Error, Result};
use std::path::{Path, PathBuf};

/// Environment variable that relocates every Automation Hub directory
pub const HOME_ENV: &str = "AUTOHUB_HOME";

const APP_DIR_NAME: &str = "autohub";

/// Where settings, results, scripts and browser profiles live on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppDirs {
    config_dir: PathBuf,
    data_dir: PathBuf,
}

impl AppDirs {
    /// Resolve directories from `AUTOHUB_HOME`, falling back to the platform defaults
    pub fn resolve() -> Result<Self> {
        if let Some(home) = std::env::var_os(HOME_ENV).filter(|v| !v.is_empty()) {
            return Ok(Self::at(PathBuf::from(home)));
        }

        let config_dir = dirs::config_dir()
            .ok_or(Error::MissingDirectory("config"))?
            .join(APP_DIR_NAME);
        let data_dir = dirs::data_dir()
            .ok_or(Error::MissingDirectory("data"))?
            .join(APP_DIR_NAME);

        Ok(Self {
            config_dir,
            data_dir,
        })
    }

    /// Keep everything under a single root directory
    pub fn at(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        Self {
            config_dir: root.join("config"),
            data_dir: root.join("data"),
        }
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn settings_file(&self) -> PathBuf {
        self.config_dir.join("settings.json")
    }

    pub fn results_file(&self) -> PathBuf {
        self.data_dir.join("results.json")
    }

    pub fn scripts_dir(&self) -> PathBuf {
        self.data_dir.join("scripts")
    }

    pub fn profiles_dir(&self) -> PathBuf {
        self.data_dir.join("browser_profiles")
    }

    pub fn default_profile(&self) -> PathBuf {
        self.profiles_dir().join("brave_profile")
    }

    /// Create every directory that does not exist yet
    pub fn ensure(&self) -> Result<()> {
        for dir in [
            self.config_dir.clone(),
            self.data_dir.clone(),
            self.scripts_dir(),
            self.profiles_dir(),
        ] {
            if !dir.exists() {
                tracing::debug!("Creating directory: {}", dir.display());
                std::fs::create_dir_all(&dir)?;
            }
        }
        Ok(())
    }
}
