use std::path::PathBuf;
use std::time::Duration;

/// Flags that keep the browser from advertising automation
const ANTI_DETECTION_ARGS: [&str; 2] = [
    "--disable-blink-features=AutomationControlled",
    "--disable-infobars",
];

/// Flags applied to every launch
const BASE_ARGS: [&str; 6] = [
    "--no-first-run",
    "--no-default-browser-check",
    "--disable-notifications",
    "--disable-dev-shm-usage",
    "--password-store=basic",
    "--use-mock-keychain",
];

/// Everything needed to start one browser session
#[derive(Debug, Clone, PartialEq)]
pub struct LaunchOptions {
    pub browser_path: PathBuf,
    pub user_data_dir: Option<PathBuf>,
    pub profile_directory: Option<String>,
    pub headless: bool,
    pub proxy: Option<String>,
    pub extra_args: Vec<String>,
    pub window_size: (u32, u32),
    pub request_timeout: Duration,
}

impl LaunchOptions {
    pub fn new(browser_path: PathBuf) -> Self {
        Self {
            browser_path,
            user_data_dir: None,
            profile_directory: None,
            headless: false,
            proxy: None,
            extra_args: Vec::new(),
            window_size: (1920, 1080),
            request_timeout: Duration::from_secs(30),
        }
    }

    pub fn with_user_data_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.user_data_dir = dir;
        self
    }

    pub fn with_profile_directory(mut self, name: Option<String>) -> Self {
        self.profile_directory = name;
        self
    }

    pub fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    pub fn with_proxy(mut self, proxy: Option<String>) -> Self {
        self.proxy = proxy;
        self
    }

    pub fn with_extra_args(mut self, args: Vec<String>) -> Self {
        self.extra_args = args;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Build browser command-line arguments.
    ///
    /// The user-data directory and headless switches are passed to the CDP
    /// launcher separately and are not part of this list.
    pub fn build_args(&self) -> Vec<String> {
        let mut args: Vec<String> = BASE_ARGS
            .iter()
            .chain(ANTI_DETECTION_ARGS.iter())
            .map(|arg| arg.to_string())
            .collect();

        args.push(format!(
            "--window-size={},{}",
            self.window_size.0, self.window_size.1
        ));

        if let Some(name) = &self.profile_directory {
            args.push(format!("--profile-directory={}", name));
        }

        if let Some(proxy) = &self.proxy {
            args.push(format!("--proxy-server={}", proxy));
        }

        for arg in &self.extra_args {
            // Never let a caller re-enable the automation banner
            if arg == "--enable-automation" || args.contains(arg) {
                continue;
            }
            args.push(arg.clone());
        }

        args
    }
}
