use super::{app_dirs, load_settings};
use crate::OutputFormat;
use anyhow::{Context, Result, anyhow};
use autohub_core::proxy::ProxyAddress;
use autohub_core::{SettingKey, Settings};
use console::style;
use serde::Serialize;
use std::time::Duration;

#[derive(Debug, Serialize)]
struct SettingEntry {
    key: &'static str,
    value: Option<String>,
    default: Option<&'static str>,
    description: &'static str,
}

pub fn list(format: OutputFormat) -> Result<()> {
    let settings = load_settings(&app_dirs()?)?;
    let entries: Vec<SettingEntry> = settings
        .entries()
        .into_iter()
        .map(|(key, value)| SettingEntry {
            key: key.as_str(),
            value,
            default: key.default_value(),
            description: key.description(),
        })
        .collect();

    if format.is_json() {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    for entry in entries {
        let value = match (&entry.value, entry.default) {
            (Some(value), _) => style(value.clone()).green().to_string(),
            (None, Some(default)) => style(format!("{} (default)", default)).dim().to_string(),
            (None, None) => style("unset".to_string()).dim().to_string(),
        };
        println!("{:<16} {:<32} {}", entry.key, value, style(entry.description).dim());
    }
    Ok(())
}

pub fn get(key: &str) -> Result<()> {
    let key: SettingKey = key.parse()?;
    let settings = load_settings(&app_dirs()?)?;

    match settings.get(key) {
        Some(value) => println!("{}", value),
        None => println!(),
    }
    Ok(())
}

pub fn set(key: &str, value: &str) -> Result<()> {
    let key: SettingKey = key.parse()?;
    check_value(key, value)?;

    let mut settings = load_settings(&app_dirs()?)?;
    settings.set(key, value);
    save(&settings)?;

    println!("✅ {} = {}", key, value);
    Ok(())
}

pub fn unset(key: &str) -> Result<()> {
    let key: SettingKey = key.parse()?;

    let mut settings = load_settings(&app_dirs()?)?;
    settings.remove(key);
    save(&settings)?;

    match key.default_value() {
        Some(default) => println!("✅ {} reset to {}", key, default),
        None => println!("✅ {} cleared", key),
    }
    Ok(())
}

pub fn path() -> Result<()> {
    println!("{}", app_dirs()?.settings_file().display());
    Ok(())
}

fn save(settings: &Settings) -> Result<()> {
    settings.save().with_context(|| {
        format!(
            "Failed to write settings to {}",
            settings.path().map(|p| p.display().to_string()).unwrap_or_default()
        )
    })
}

/// Reject values that typed getters could never use
fn check_value(key: SettingKey, value: &str) -> Result<()> {
    let value = value.trim();
    match key {
        SettingKey::Timeout | SettingKey::RetryCount | SettingKey::CurrentPage => {
            value
                .parse::<u64>()
                .map_err(|_| anyhow!("{} must be a whole number, got '{}'", key, value))?;
        }
        SettingKey::Delay => {
            let delay: f64 = value
                .parse()
                .map_err(|_| anyhow!("{} must be a number of seconds, got '{}'", key, value))?;
            if delay < 0.0 {
                return Err(anyhow!("{} must not be negative", key));
            }
            Duration::try_from_secs_f64(delay)
                .map_err(|_| anyhow!("{} is out of range, got '{}'", key, value))?;
        }
        SettingKey::Headless => {
            if !matches!(
                value.to_ascii_lowercase().as_str(),
                "true" | "false" | "1" | "0" | "yes" | "no" | "on" | "off"
            ) {
                return Err(anyhow!("{} must be true or false, got '{}'", key, value));
            }
        }
        SettingKey::Proxy if !value.is_empty() => {
            ProxyAddress::parse(value)?;
        }
        _ => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_settings_are_checked() {
        assert!(check_value(SettingKey::Timeout, "15").is_ok());
        assert!(check_value(SettingKey::Timeout, "soon").is_err());
        assert!(check_value(SettingKey::Delay, "0.5").is_ok());
        assert!(check_value(SettingKey::Delay, "-1").is_err());
        assert!(check_value(SettingKey::Delay, "1e20").is_err());
        assert!(check_value(SettingKey::Delay, "NaN").is_err());
        assert!(check_value(SettingKey::Delay, "inf").is_err());
    }

    #[test]
    fn test_proxy_setting_is_checked() {
        assert!(check_value(SettingKey::Proxy, "127.0.0.1:8080").is_ok());
        assert!(check_value(SettingKey::Proxy, "").is_ok());
        assert!(check_value(SettingKey::Proxy, "ftp://proxy:21").is_err());
    }

    #[test]
    fn test_free_text_settings_pass() {
        assert!(check_value(SettingKey::Theme, "dark").is_ok());
        assert!(check_value(SettingKey::WindowGeometry, "100,100,800,600").is_ok());
    }
}
