use crate::{Error, Result};
use std::path::{Path, PathBuf};

/// Manages browser user-data directories
pub struct ProfileManager {
    path: PathBuf,
    is_temporary: bool,
}

/// A persistent profile found on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileInfo {
    pub name: String,
    pub path: PathBuf,
    pub size: u64,
}

impl ProfileManager {
    /// Create a temporary profile that will be deleted on drop
    pub fn temporary() -> Result<Self> {
        let temp_dir = tempfile::Builder::new().prefix("autohub-profile-").tempdir()?;

        let path = temp_dir.keep();

        Ok(Self {
            path,
            is_temporary: true,
        })
    }

    /// Create or use a persistent profile at the given path
    pub fn persistent(path: PathBuf) -> Result<Self> {
        if !path.exists() {
            std::fs::create_dir_all(&path)?;
        }

        if !path.is_dir() {
            return Err(Error::Browser(format!(
                "Profile path is not a directory: {}",
                path.display()
            )));
        }

        Ok(Self {
            path,
            is_temporary: false,
        })
    }

    /// Get the profile directory path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Check if this is a temporary profile
    pub fn is_temporary(&self) -> bool {
        self.is_temporary
    }

    /// Persistent profiles stored under `profiles_dir`, sorted by name
    pub fn list(profiles_dir: &Path) -> Result<Vec<ProfileInfo>> {
        if !profiles_dir.exists() {
            return Ok(Vec::new());
        }

        let mut profiles = Vec::new();
        for entry in std::fs::read_dir(profiles_dir)? {
            let path = entry?.path();
            if !path.is_dir() {
                continue;
            }
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            profiles.push(ProfileInfo {
                name: name.to_string(),
                size: dir_size(&path).unwrap_or(0),
                path: path.clone(),
            });
        }

        profiles.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(profiles)
    }

    /// Delete a named profile under `profiles_dir`
    pub fn delete(profiles_dir: &Path, name: &str) -> Result<()> {
        if name.is_empty() || name.contains(['/', '\\']) || name == "." || name == ".." {
            return Err(Error::Browser(format!("Invalid profile name: '{}'", name)));
        }

        let path = profiles_dir.join(name);
        if !path.is_dir() {
            return Err(Error::Browser(format!("Profile '{}' not found", name)));
        }

        std::fs::remove_dir_all(&path)?;
        tracing::debug!("Deleted profile {}", path.display());
        Ok(())
    }
}

fn dir_size(path: &Path) -> Result<u64> {
    let mut total = 0;
    for entry in std::fs::read_dir(path)? {
        let entry = entry?;
        let metadata = entry.metadata()?;
        if metadata.is_dir() {
            total += dir_size(&entry.path())?;
        } else {
            total += metadata.len();
        }
    }
    Ok(total)
}

impl Drop for ProfileManager {
    fn drop(&mut self) {
        if self.is_temporary && self.path.exists() {
            let _ = std::fs::remove_dir_all(&self.path);
        }
    }
}
