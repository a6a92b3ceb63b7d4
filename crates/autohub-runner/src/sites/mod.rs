//! Site adapters: one per task kind, each a fixed navigate/locate/act flow.

mod facebook;
mod google;
mod script;
mod shopee;

pub use facebook::{FacebookLogin, FacebookPost};
pub use google::GoogleSearch;
pub use script::ScriptRunner;
pub use shopee::ShopeeScrape;

use crate::config::{RunnerConfig, SiteUrls};
use crate::error::RunError;
use crate::notify::Reporter;
use async_trait::async_trait;
use autohub_browser::{Element, Session, wait_for};
use autohub_core::{Locator, ResultRecord, TaskDescriptor, TaskKind};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// Automates one site for one task kind
#[async_trait]
pub trait SiteAdapter: Send + Sync {
    fn kind(&self) -> TaskKind;

    /// Label recorded as the data source of the results
    fn source(&self, descriptor: &TaskDescriptor) -> String;

    /// Reject descriptors this adapter cannot run, before any browser starts
    fn validate(&self, descriptor: &TaskDescriptor) -> Result<(), RunError> {
        if descriptor.kind != self.kind() {
            return Err(RunError::Config(format!(
                "{} adapter cannot run a {} task",
                self.kind(),
                descriptor.kind
            )));
        }
        descriptor.validate().map_err(RunError::from)
    }

    async fn run(
        &self,
        session: &dyn Session,
        descriptor: &TaskDescriptor,
        ctx: &StepContext,
    ) -> Result<Vec<ResultRecord>, StepFailure>;
}

/// A failed flow, with whatever was collected before the failure
#[derive(Debug, Clone, PartialEq)]
pub struct StepFailure {
    pub error: RunError,
    pub partial: Vec<ResultRecord>,
}

impl StepFailure {
    pub fn with_partial(error: RunError, partial: Vec<ResultRecord>) -> Self {
        Self { error, partial }
    }
}

impl From<RunError> for StepFailure {
    fn from(error: RunError) -> Self {
        Self {
            error,
            partial: Vec::new(),
        }
    }
}

impl From<autohub_browser::Error> for StepFailure {
    fn from(err: autohub_browser::Error) -> Self {
        RunError::from(err).into()
    }
}

/// Timing and reporting shared by every step of one run
#[derive(Debug, Clone)]
pub struct StepContext {
    pub reporter: Reporter,
    pub timeout: Duration,
    pub poll: Duration,
    pub settle: Duration,
    /// Extra pause between interactions, from the task descriptor
    pub delay: Duration,
    pub sites: SiteUrls,
}

impl StepContext {
    pub fn new(reporter: Reporter, config: &RunnerConfig, descriptor: &TaskDescriptor) -> Self {
        Self {
            reporter,
            timeout: config.element_timeout,
            poll: config.poll,
            settle: config.settle,
            delay: descriptor.delay,
            sites: config.sites.clone(),
        }
    }

    pub fn log(&self, message: impl Into<String>) {
        self.reporter.log(message);
    }

    pub fn progress(&self, percent: u8) {
        self.reporter.progress(percent);
    }

    /// Wait for an element using the configured element timeout
    pub async fn wait(
        &self,
        session: &dyn Session,
        locator: &Locator,
    ) -> Result<Box<dyn Element>, RunError> {
        self.wait_up_to(session, locator, self.timeout).await
    }

    pub async fn wait_up_to(
        &self,
        session: &dyn Session,
        locator: &Locator,
        timeout: Duration,
    ) -> Result<Box<dyn Element>, RunError> {
        Ok(wait_for(session, locator, timeout, self.poll).await?)
    }

    /// Give the page time to react to a navigation
    pub async fn settle(&self) {
        if !self.settle.is_zero() {
            tokio::time::sleep(self.settle).await;
        }
    }

    /// Pause between interactions when the task asks for one
    pub async fn pause(&self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }
}

/// Maps each task kind to the adapter that runs it
#[derive(Clone, Default)]
pub struct AdapterRegistry {
    adapters: HashMap<TaskKind, Arc<dyn SiteAdapter>>,
}

impl AdapterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in Google, Facebook, Shopee and script adapters
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(GoogleSearch));
        registry.register(Arc::new(FacebookLogin));
        registry.register(Arc::new(FacebookPost));
        registry.register(Arc::new(ShopeeScrape));
        registry.register(Arc::new(ScriptRunner));
        registry
    }

    /// Add an adapter, replacing any previous one for the same kind
    pub fn register(&mut self, adapter: Arc<dyn SiteAdapter>) {
        self.adapters.insert(adapter.kind(), adapter);
    }

    pub fn get(&self, kind: TaskKind) -> Option<Arc<dyn SiteAdapter>> {
        self.adapters.get(&kind).cloned()
    }
}

/// Trimmed text of the first matching child, if it has any
async fn text_of(element: &dyn Element, locator: &Locator) -> Option<String> {
    let child = element.find(locator).await.ok()?;
    let text = child.text().await.ok()?;
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

async fn href_of(element: &dyn Element) -> Option<String> {
    let link = element.find(&Locator::css("a")).await.ok()?;
    link.attribute("href").await.ok().flatten()
}
