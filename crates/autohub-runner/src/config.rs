use autohub_core::{AppDirs, SettingKey, Settings};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_ELEMENT_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_SETTLE: Duration = Duration::from_secs(5);
pub const DEFAULT_POLL: Duration = Duration::from_millis(250);

/// Entry points of the built-in site adapters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteUrls {
    pub google: String,
    pub facebook: String,
    pub shopee: String,
}

impl Default for SiteUrls {
    fn default() -> Self {
        Self {
            google: "https://www.google.com".to_string(),
            facebook: "https://www.facebook.com".to_string(),
            shopee: "https://shopee.vn".to_string(),
        }
    }
}

/// Immutable configuration shared by every run of a `TaskRunner`
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Browser binary. `None` lets `BrowserFinder` search the usual places.
    pub browser_path: Option<PathBuf>,
    /// Persistent user-data directory. `None` uses a throwaway profile.
    pub profile_path: Option<PathBuf>,
    pub profile_directory: Option<String>,
    pub headless: bool,
    pub proxy: Option<String>,
    pub extra_args: Vec<String>,
    /// Upper bound for every element wait
    pub element_timeout: Duration,
    /// Pause after actions that trigger a navigation
    pub settle: Duration,
    pub poll: Duration,
    pub request_timeout: Duration,
    pub sites: SiteUrls,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            browser_path: None,
            profile_path: None,
            profile_directory: None,
            headless: false,
            proxy: None,
            extra_args: Vec::new(),
            element_timeout: DEFAULT_ELEMENT_TIMEOUT,
            settle: DEFAULT_SETTLE,
            poll: DEFAULT_POLL,
            request_timeout: Duration::from_secs(30),
            sites: SiteUrls::default(),
        }
    }
}

impl RunnerConfig {
    /// Build the configuration from persisted settings.
    ///
    /// Without a stored profile path the default persistent profile under the
    /// data directory is used, so logins survive between runs.
    pub fn from_settings(settings: &Settings, dirs: &AppDirs) -> Self {
        let timeout_secs = settings.get_parsed::<u64>(SettingKey::Timeout, 10).max(1);

        Self {
            browser_path: settings.get_non_empty(SettingKey::BrowserPath).map(PathBuf::from),
            profile_path: Some(
                settings
                    .get_non_empty(SettingKey::ProfilePath)
                    .map(PathBuf::from)
                    .unwrap_or_else(|| dirs.default_profile()),
            ),
            headless: settings.get_bool(SettingKey::Headless, false),
            proxy: settings.get_non_empty(SettingKey::Proxy),
            element_timeout: Duration::from_secs(timeout_secs),
            ..Self::default()
        }
    }

    pub fn with_browser_path(mut self, path: Option<PathBuf>) -> Self {
        if path.is_some() {
            self.browser_path = path;
        }
        self
    }

    pub fn with_profile_path(mut self, path: Option<PathBuf>) -> Self {
        if path.is_some() {
            self.profile_path = path;
        }
        self
    }

    pub fn with_element_timeout(mut self, timeout: Duration) -> Self {
        self.element_timeout = timeout;
        self
    }

    pub fn with_settle(mut self, settle: Duration) -> Self {
        self.settle = settle;
        self
    }

    pub fn with_poll(mut self, poll: Duration) -> Self {
        self.poll = poll;
        self
    }

    pub fn with_sites(mut self, sites: SiteUrls) -> Self {
        self.sites = sites;
        self
    }
}
