use super::{app_dirs, load_settings};
use anyhow::Result;
use autohub_browser::BrowserFinder;
use autohub_core::SettingKey;
use std::path::PathBuf;

/// Report the browser binary a run would launch
pub fn execute(browser_path: Option<PathBuf>) -> Result<()> {
    let settings = load_settings(&app_dirs()?)?;
    let configured = browser_path.or_else(|| {
        settings
            .get_non_empty(SettingKey::BrowserPath)
            .map(PathBuf::from)
    });

    println!("🔍 Locating browser...");
    let path = BrowserFinder::new(configured.clone()).find()?;

    let origin = if configured.is_some() {
        "configured"
    } else {
        "auto-detected"
    };
    println!("✅ Found browser at: {} ({})", path.display(), origin);
    Ok(())
}
