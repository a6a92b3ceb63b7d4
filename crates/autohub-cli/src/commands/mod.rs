pub mod browser;
pub mod completion;
pub mod data;
pub mod profile;
pub mod run;
pub mod script;
pub mod settings;

use anyhow::{Context, Result};
use autohub_core::{AppDirs, DataStore, Settings};

/// Resolve the application directories and make sure they exist
pub(crate) fn app_dirs() -> Result<AppDirs> {
    let dirs = AppDirs::resolve()?;
    dirs.ensure()
        .with_context(|| format!("Failed to create {}", dirs.data_dir().display()))?;
    Ok(dirs)
}

pub(crate) fn load_settings(dirs: &AppDirs) -> Result<Settings> {
    let path = dirs.settings_file();
    Settings::load(&path).with_context(|| format!("Failed to read settings from {}", path.display()))
}

pub(crate) fn load_store(dirs: &AppDirs) -> Result<DataStore> {
    let path = dirs.results_file();
    DataStore::load(&path).with_context(|| format!("Failed to read results from {}", path.display()))
}
