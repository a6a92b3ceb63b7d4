use crate::{Error, Result};
use std::collections::BTreeMap;
use std::fmt;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// The fixed set of persisted settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SettingKey {
    BrowserPath,
    ProfilePath,
    Theme,
    Proxy,
    Timeout,
    RetryCount,
    Headless,
    Delay,
    CurrentPage,
    WindowGeometry,
    WindowState,
}

impl SettingKey {
    pub fn all() -> [SettingKey; 11] {
        [
            SettingKey::BrowserPath,
            SettingKey::ProfilePath,
            SettingKey::Theme,
            SettingKey::Proxy,
            SettingKey::Timeout,
            SettingKey::RetryCount,
            SettingKey::Headless,
            SettingKey::Delay,
            SettingKey::CurrentPage,
            SettingKey::WindowGeometry,
            SettingKey::WindowState,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SettingKey::BrowserPath => "browser_path",
            SettingKey::ProfilePath => "profile_path",
            SettingKey::Theme => "theme",
            SettingKey::Proxy => "proxy",
            SettingKey::Timeout => "timeout",
            SettingKey::RetryCount => "retry_count",
            SettingKey::Headless => "headless",
            SettingKey::Delay => "delay",
            SettingKey::CurrentPage => "current_page",
            SettingKey::WindowGeometry => "window_geometry",
            SettingKey::WindowState => "window_state",
        }
    }

    /// Built-in value used when the key has never been set
    pub fn default_value(&self) -> Option<&'static str> {
        match self {
            SettingKey::Theme => Some("light"),
            SettingKey::Timeout => Some("10"),
            SettingKey::RetryCount => Some("3"),
            SettingKey::Headless => Some("false"),
            SettingKey::Delay => Some("0"),
            SettingKey::CurrentPage => Some("0"),
            _ => None,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            SettingKey::BrowserPath => "Path to the Brave/Chromium executable",
            SettingKey::ProfilePath => "Browser user-data directory",
            SettingKey::Theme => "Interface theme name",
            SettingKey::Proxy => "Proxy server address (host:port or scheme://host:port)",
            SettingKey::Timeout => "Element wait timeout in seconds",
            SettingKey::RetryCount => "Retry count (stored, runs are never retried)",
            SettingKey::Headless => "Run the browser without a window",
            SettingKey::Delay => "Pause between interactions in seconds",
            SettingKey::CurrentPage => "Last open page index",
            SettingKey::WindowGeometry => "Saved window geometry",
            SettingKey::WindowState => "Saved window state",
        }
    }
}

impl fmt::Display for SettingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SettingKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().replace('-', "_");
        SettingKey::all()
            .into_iter()
            .find(|key| key.as_str().eq_ignore_ascii_case(&wanted))
            .ok_or_else(|| Error::UnknownSetting(s.to_string()))
    }
}

/// Persisted key/value settings. Values are free text; typed getters coerce on read.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    path: Option<PathBuf>,
    values: BTreeMap<String, String>,
}

impl Settings {
    /// Settings that are never written to disk
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Load settings from a JSON file. A missing file yields empty settings.
    pub fn load(path: &Path) -> Result<Self> {
        let mut settings = Self {
            path: Some(path.to_path_buf()),
            values: BTreeMap::new(),
        };

        if !path.exists() {
            tracing::debug!("No settings file at {}, using defaults", path.display());
            return Ok(settings);
        }

        let reader = BufReader::new(File::open(path)?);
        let raw: BTreeMap<String, serde_json::Value> = serde_json::from_reader(reader)?;

        for (key, value) in raw {
            let text = match value {
                serde_json::Value::String(s) => s,
                serde_json::Value::Null => continue,
                other => other.to_string(),
            };
            settings.values.insert(key, text);
        }

        tracing::debug!(
            "Loaded {} settings from {}",
            settings.values.len(),
            path.display()
        );

        Ok(settings)
    }

    /// Write settings back to the file they were loaded from
    pub fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(writer, &self.values)?;

        tracing::debug!("Saved settings to {}", path.display());
        Ok(())
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Raw value, or the key's built-in default
    pub fn get(&self, key: SettingKey) -> Option<&str> {
        self.values
            .get(key.as_str())
            .map(String::as_str)
            .or_else(|| key.default_value())
    }

    /// Non-empty value, trimmed
    pub fn get_non_empty(&self, key: SettingKey) -> Option<String> {
        self.get(key)
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    }

    /// Parse the value, falling back to `default` when missing or malformed
    pub fn get_parsed<T: FromStr>(&self, key: SettingKey, default: T) -> T {
        match self.get(key) {
            Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
                tracing::warn!("Ignoring malformed value for {}: {:?}", key, raw);
                default
            }),
            None => default,
        }
    }

    pub fn get_bool(&self, key: SettingKey, default: bool) -> bool {
        match self.get(key).map(|v| v.trim().to_ascii_lowercase()) {
            Some(v) if matches!(v.as_str(), "true" | "1" | "yes" | "on") => true,
            Some(v) if matches!(v.as_str(), "false" | "0" | "no" | "off") => false,
            _ => default,
        }
    }

    pub fn set(&mut self, key: SettingKey, value: impl Into<String>) {
        self.values.insert(key.as_str().to_string(), value.into());
    }

    pub fn remove(&mut self, key: SettingKey) -> Option<String> {
        self.values.remove(key.as_str())
    }

    /// Every known key with its stored value, `None` when never set
    pub fn entries(&self) -> Vec<(SettingKey, Option<String>)> {
        SettingKey::all()
            .into_iter()
            .map(|key| (key, self.values.get(key.as_str()).cloned()))
            .collect()
    }
}
