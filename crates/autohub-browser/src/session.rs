//! The capability set the automation layer needs from a browser.
//!
//! Site adapters only talk to these traits, so they run unchanged against a
//! real CDP-driven browser or an in-memory fake in tests.

use crate::{Error, LaunchOptions, Result};
use async_trait::async_trait;
use autohub_core::Locator;
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// A live browser tab, exclusively owned by one run
#[async_trait]
pub trait Session: Send + Sync {
    async fn goto(&self, url: &str) -> Result<()>;

    async fn current_url(&self) -> Result<String>;

    /// First element matching the locator, without waiting
    async fn find(&self, locator: &Locator) -> Result<Box<dyn Element>>;

    /// Every element matching the locator, possibly none
    async fn find_all(&self, locator: &Locator) -> Result<Vec<Box<dyn Element>>>;

    /// Release the browser. Calling it twice is harmless.
    async fn close(&mut self) -> Result<()>;
}

/// A handle to one element of the page
#[async_trait]
pub trait Element: Send + Sync {
    async fn find(&self, locator: &Locator) -> Result<Box<dyn Element>>;

    async fn find_all(&self, locator: &Locator) -> Result<Vec<Box<dyn Element>>>;

    /// Rendered text, empty when the element has none
    async fn text(&self) -> Result<String>;

    async fn attribute(&self, name: &str) -> Result<Option<String>>;

    async fn click(&self) -> Result<()>;

    async fn clear(&self) -> Result<()>;

    async fn type_text(&self, text: &str) -> Result<()>;

    async fn press_enter(&self) -> Result<()>;

    /// Attach files to an `<input type="file">`
    async fn upload(&self, files: &[PathBuf]) -> Result<()>;
}

/// Opens sessions. The runner owns one factory and asks it for a session per run.
#[async_trait]
pub trait SessionFactory: Send + Sync {
    async fn open(&self, options: &LaunchOptions) -> Result<Box<dyn Session>>;
}

/// Poll `find` until the element appears or `timeout` elapses
pub async fn wait_for(
    session: &dyn Session,
    locator: &Locator,
    timeout: Duration,
    poll: Duration,
) -> Result<Box<dyn Element>> {
    let started = Instant::now();

    loop {
        match session.find(locator).await {
            Ok(element) => return Ok(element),
            Err(Error::SessionClosed) => return Err(Error::SessionClosed),
            Err(e) => tracing::trace!("{} not present yet: {}", locator, e),
        }

        let waited = started.elapsed();
        if waited >= timeout {
            return Err(Error::Timeout {
                locator: locator.to_string(),
                waited,
            });
        }

        tokio::time::sleep(poll.min(timeout - waited)).await;
    }
}
