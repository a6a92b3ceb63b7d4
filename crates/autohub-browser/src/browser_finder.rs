use crate::{Error, Result};
use std::path::{Path, PathBuf};

/// Executable names looked up on `PATH`, in order of preference
const PATH_CANDIDATES: [&str; 6] = [
    "brave-browser",
    "brave",
    "chromium",
    "chromium-browser",
    "google-chrome",
    "google-chrome-stable",
];

/// Locates a Brave or Chromium-family browser binary on the system
pub struct BrowserFinder {
    custom_path: Option<PathBuf>,
}

impl BrowserFinder {
    /// Create a new BrowserFinder with optional custom path
    pub fn new(custom_path: Option<PathBuf>) -> Self {
        Self { custom_path }
    }

    /// Find the browser, checking the custom path first, then platform defaults, then `PATH`
    pub fn find(&self) -> Result<PathBuf> {
        // A configured path is authoritative: no fallback if it is wrong
        if let Some(ref path) = self.custom_path {
            return self.validate_browser_path(path);
        }

        for path in Self::default_paths() {
            if let Ok(valid_path) = self.validate_browser_path(&path) {
                tracing::debug!("Found browser at default location {}", valid_path.display());
                return Ok(valid_path);
            }
        }

        for name in PATH_CANDIDATES {
            if let Ok(path) = which::which(name) {
                tracing::debug!("Found browser on PATH: {}", path.display());
                return Ok(path);
            }
        }

        Err(Error::Browser(format!(
            "Browser not found. Checked: {}, and {} on PATH. Use --browser-path to specify location.",
            Self::default_paths()
                .iter()
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(", "),
            PATH_CANDIDATES.join("/")
        )))
    }

    /// Get platform-specific default browser paths, Brave first
    fn default_paths() -> Vec<PathBuf> {
        #[cfg(target_os = "macos")]
        return vec![
            PathBuf::from("/Applications/Brave Browser.app/Contents/MacOS/Brave Browser"),
            PathBuf::from("/Applications/Google Chrome.app/Contents/MacOS/Google Chrome"),
            PathBuf::from("/Applications/Chromium.app/Contents/MacOS/Chromium"),
        ];

        #[cfg(target_os = "linux")]
        return vec![
            PathBuf::from("/usr/bin/brave-browser"),
            PathBuf::from("/opt/brave.com/brave/brave"),
            PathBuf::from("/usr/bin/chromium"),
            PathBuf::from("/usr/bin/chromium-browser"),
            PathBuf::from("/usr/bin/google-chrome"),
        ];

        #[cfg(target_os = "windows")]
        return vec![
            PathBuf::from(r"C:\Program Files\BraveSoftware\Brave-Browser\Application\brave.exe"),
            PathBuf::from(r"C:\Program Files (x86)\BraveSoftware\Brave-Browser\Application\brave.exe"),
            PathBuf::from(r"C:\Program Files\Google\Chrome\Application\chrome.exe"),
            PathBuf::from(r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe"),
        ];

        #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
        return vec![];
    }

    /// Validate that a path exists and is executable
    fn validate_browser_path(&self, path: &Path) -> Result<PathBuf> {
        if !path.exists() {
            return Err(Error::Browser(format!(
                "Browser not found at: {}",
                path.display()
            )));
        }

        if path.is_dir() {
            return Err(Error::Browser(format!(
                "Browser path is a directory: {}",
                path.display()
            )));
        }

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let metadata = std::fs::metadata(path).map_err(Error::Io)?;
            let permissions = metadata.permissions();
            if permissions.mode() & 0o111 == 0 {
                return Err(Error::Browser(format!(
                    "Browser binary not executable: {}",
                    path.display()
                )));
            }
        }

        Ok(path.to_path_buf())
    }
}
