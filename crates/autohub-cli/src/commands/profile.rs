//! Persistent browser profiles.
//!
//! A profile keeps cookies and logins between runs. Profiles live under the
//! data directory and are selected with `--profile <NAME>`; without it the
//! `brave_profile` profile is used.
//!
//! ```bash
//! autohub profile list
//! autohub profile delete old-profile --force
//! ```

use super::app_dirs;
use crate::OutputFormat;
use anyhow::{Result, anyhow};
use autohub_browser::ProfileManager;
use console::style;
use serde_json::json;
use std::io::{self, Write};

const SIZE_WARNING_THRESHOLD: u64 = 1_073_741_824; // 1GB

/// List all available profiles
pub fn list(format: OutputFormat) -> Result<()> {
    let dirs = app_dirs()?;
    let profiles_dir = dirs.profiles_dir();
    let profiles = ProfileManager::list(&profiles_dir)?;
    let default_name = dirs
        .default_profile()
        .file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .unwrap_or_default();

    if format.is_json() {
        let items: Vec<_> = profiles
            .iter()
            .map(|p| {
                json!({
                    "name": p.name,
                    "path": p.path,
                    "size": p.size,
                    "default": p.name == default_name,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&items)?);
        return Ok(());
    }

    if profiles.is_empty() {
        println!(
            "No profiles found. Profiles will be created in: {}",
            profiles_dir.display()
        );
        return Ok(());
    }

    println!("Available profiles:");
    println!();

    let mut has_warnings = false;
    for profile in &profiles {
        let marker = if profile.name == default_name { "* " } else { "  " };
        let size_mb = profile.size as f64 / 1_048_576.0;
        let warning = if profile.size > SIZE_WARNING_THRESHOLD {
            has_warnings = true;
            style(" ⚠️  Large").yellow().to_string()
        } else {
            String::new()
        };

        println!(
            "{}{:<20} {:>8.1} MB    {}{}",
            marker,
            profile.name,
            size_mb,
            profile.path.display(),
            warning
        );
    }

    if has_warnings {
        println!();
        println!("⚠️  Some profiles exceed 1GB. Consider deleting profiles you no longer use.");
    }

    Ok(())
}

/// Delete a profile
pub fn delete(name: &str, force: bool) -> Result<()> {
    let profiles_dir = app_dirs()?.profiles_dir();
    if !profiles_dir.join(name).is_dir() {
        return Err(anyhow!("Profile '{}' not found", name));
    }

    if !force {
        print!(
            "⚠️  This will permanently delete profile '{}' and all its data.\nType '{}' to confirm: ",
            name, name
        );
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;

        if input.trim() != name {
            println!("Deletion cancelled.");
            return Ok(());
        }
    }

    ProfileManager::delete(&profiles_dir, name)?;
    println!("✅ Profile '{}' deleted", name);
    Ok(())
}
