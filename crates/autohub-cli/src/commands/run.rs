//! Task commands: build a descriptor, start the runner and render its
//! notifications until the run finishes.

use super::{app_dirs, load_settings, load_store};
use crate::OutputFormat;
use anyhow::{Context, Result, anyhow};
use autohub_browser::ChromiumSessionFactory;
use autohub_core::{
    AppDirs, Credentials, Notification, ResultRecord, RunResults, SettingKey, Settings,
    TaskDescriptor,
};
use autohub_runner::{AdapterRegistry, RunnerConfig, RunnerError, TaskRunner};
use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Flags shared by every command that drives the browser
#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// Maximum number of results to collect
    #[arg(long, env = "AUTOHUB_MAX_RESULTS")]
    pub max_results: Option<usize>,

    /// Pause between interactions, in seconds
    #[arg(long, env = "AUTOHUB_DELAY")]
    pub delay: Option<f64>,

    /// Proxy server (host:port or scheme://host:port)
    #[arg(long, env = "AUTOHUB_PROXY")]
    pub proxy: Option<String>,

    /// Run the browser without a window
    #[arg(long, env = "AUTOHUB_HEADLESS")]
    pub headless: bool,

    /// Path to the Brave/Chromium executable
    #[arg(long, env = "AUTOHUB_BROWSER_PATH")]
    pub browser_path: Option<PathBuf>,

    /// Profile name under the profiles directory, or a directory path
    #[arg(long, env = "AUTOHUB_PROFILE")]
    pub profile: Option<String>,

    /// Element wait timeout in seconds
    #[arg(long, env = "AUTOHUB_TIMEOUT")]
    pub timeout: Option<u64>,

    /// Do not append results to the data store
    #[arg(long)]
    pub no_save: bool,
}

impl RunArgs {
    /// Settings first, then command-line overrides
    pub fn runner_config(&self, settings: &Settings, dirs: &AppDirs) -> RunnerConfig {
        let profile = self.profile.as_deref().map(|profile| {
            if profile.contains(['/', '\\']) {
                PathBuf::from(profile)
            } else {
                dirs.profiles_dir().join(profile)
            }
        });

        let mut config = RunnerConfig::from_settings(settings, dirs)
            .with_browser_path(self.browser_path.clone())
            .with_profile_path(profile);

        if let Some(secs) = self.timeout {
            config = config.with_element_timeout(Duration::from_secs(secs.max(1)));
        }

        config
    }

    /// Apply the per-task flags to a descriptor
    pub fn apply(&self, mut descriptor: TaskDescriptor, settings: &Settings) -> TaskDescriptor {
        if let Some(max) = self.max_results {
            descriptor = descriptor.with_max_results(max);
        }

        let delay = self
            .delay
            .unwrap_or_else(|| settings.get_parsed(SettingKey::Delay, 0.0));
        if delay > 0.0 {
            match Duration::try_from_secs_f64(delay) {
                Ok(delay) => descriptor = descriptor.with_delay(delay),
                Err(_) => tracing::warn!("Ignoring unusable delay {}s", delay),
            }
        }

        if self.proxy.is_some() {
            descriptor = descriptor.with_proxy(self.proxy.clone());
        }

        descriptor.with_headless(self.headless)
    }
}

pub fn search(keyword: String, args: &RunArgs, format: OutputFormat) -> Result<bool> {
    execute(TaskDescriptor::search(keyword), args, format)
}

pub fn scrape(keyword: String, pages: u32, args: &RunArgs, format: OutputFormat) -> Result<bool> {
    execute(TaskDescriptor::scrape(keyword).with_pages(pages), args, format)
}

pub fn login(email: String, password: String, args: &RunArgs, format: OutputFormat) -> Result<bool> {
    execute(TaskDescriptor::login(email, password), args, format)
}

pub fn post(
    content: String,
    images: Vec<PathBuf>,
    credentials: Option<(String, String)>,
    args: &RunArgs,
    format: OutputFormat,
) -> Result<bool> {
    let mut descriptor = TaskDescriptor::post(content).with_images(images);
    if let Some((email, password)) = credentials {
        descriptor = descriptor.with_credentials(Credentials::new(email, password));
    }
    execute(descriptor, args, format)
}

/// Run one task to completion. Returns the success flag of the run.
pub fn execute(descriptor: TaskDescriptor, args: &RunArgs, format: OutputFormat) -> Result<bool> {
    let dirs = app_dirs()?;
    let settings = load_settings(&dirs)?;

    let config = args.runner_config(&settings, &dirs);
    let descriptor = args.apply(descriptor, &settings);

    let (runner, mut stream) = TaskRunner::new(
        config,
        Arc::new(ChromiumSessionFactory::new()),
        AdapterRegistry::with_defaults(),
    );
    let runner = Arc::new(runner);

    let handle = match runner.start(descriptor) {
        Ok(handle) => Some(handle),
        // The rejection was already reported through the stream
        Err(RunnerError::InvalidDescriptor(_)) => None,
        Err(e) => return Err(anyhow!(e)),
    };

    if handle.is_some() {
        stop_on_interrupt(Arc::clone(&runner));
    }

    let view = RunView::new(format);
    let mut collected = Vec::new();
    let mut success = false;

    while let Some(notification) = stream.blocking_recv() {
        view.show(&notification)?;
        match notification {
            Notification::Result(results) => collected.push(results),
            Notification::Finished { success: ok } => {
                success = ok;
                break;
            }
            _ => {}
        }
    }

    if let Some(handle) = handle {
        let state = handle.join();
        tracing::debug!("Run ended in state {:?}", state);
    }

    view.finish(&collected);

    if !args.no_save && !collected.is_empty() {
        save_results(&dirs, &collected)?;
    }

    Ok(success)
}

/// Cancel the run on Ctrl-C instead of killing the process with the browser open
fn stop_on_interrupt(runner: Arc<TaskRunner>) {
    let spawned = std::thread::Builder::new()
        .name("autohub-signal".to_string())
        .spawn(move || {
            let runtime = match tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(runtime) => runtime,
                Err(e) => {
                    tracing::debug!("Interrupt handler unavailable: {}", e);
                    return;
                }
            };
            if runtime.block_on(tokio::signal::ctrl_c()).is_ok() {
                runner.stop();
            }
        });

    if let Err(e) = spawned {
        tracing::debug!("Interrupt handler unavailable: {}", e);
    }
}

fn save_results(dirs: &AppDirs, collected: &[RunResults]) -> Result<()> {
    let mut store = load_store(dirs)?;
    let added: usize = collected.iter().map(|results| store.append(results)).sum();
    store
        .save()
        .with_context(|| format!("Failed to save results to {}", dirs.results_file().display()))?;
    tracing::debug!("Stored {} row(s) in {}", added, dirs.results_file().display());
    Ok(())
}

/// Renders notifications either as a progress bar with log lines or as JSON lines
struct RunView {
    format: OutputFormat,
    bar: ProgressBar,
}

impl RunView {
    fn new(format: OutputFormat) -> Self {
        let bar = if format.is_json() {
            ProgressBar::hidden()
        } else {
            let bar = ProgressBar::new(100);
            bar.set_style(
                ProgressStyle::with_template("{bar:40.cyan/blue} {pos:>3}% {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar()),
            );
            bar
        };
        Self { format, bar }
    }

    fn show(&self, notification: &Notification) -> Result<()> {
        if self.format.is_json() {
            println!("{}", serde_json::to_string(notification)?);
            return Ok(());
        }

        match notification {
            Notification::Log(message) => {
                self.bar.set_message(message.clone());
                self.bar.suspend(|| println!("  {}", style(message).dim()));
            }
            Notification::Progress(percent) => self.bar.set_position(u64::from(*percent)),
            Notification::Error(message) => {
                self.bar
                    .suspend(|| eprintln!("{} {}", style("✗").red().bold(), style(message).red()));
            }
            Notification::Result(results) => {
                self.bar.suspend(|| {
                    println!(
                        "{} {} result(s) from {}",
                        style("✓").green().bold(),
                        results.len(),
                        results.source
                    )
                });
            }
            Notification::Finished { .. } => {}
        }
        Ok(())
    }

    fn finish(&self, collected: &[RunResults]) {
        self.bar.finish_and_clear();
        if self.format.is_json() {
            return;
        }

        for results in collected {
            println!();
            println!("{}", style(format!("Results from {}", results.source)).bold().cyan());
            for (i, record) in results.records.iter().enumerate() {
                println!("{:>3}. {}", i + 1, record.summary());
                if let Some(url) = record_url(record) {
                    println!("     {}", style(url).dim());
                }
            }
        }
    }
}

fn record_url(record: &ResultRecord) -> Option<&str> {
    match record {
        ResultRecord::Link { url, .. }
        | ResultRecord::Product { url, .. }
        | ResultRecord::Status { url, .. } => Some(url.as_str()).filter(|u| !u.is_empty()),
        ResultRecord::Extracted { .. } => None,
    }
}
