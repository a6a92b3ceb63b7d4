//! Runs one automation task at a time on a background thread and reports
//! what happens through a stream of [`Notification`]s.
//!
//! [`Notification`]: autohub_core::Notification

mod config;
mod error;
mod notify;
mod runner;
pub mod sites;

#[cfg(test)]
mod fake;

pub use config::{RunnerConfig, SiteUrls};
pub use error::{RunError, RunnerError};
pub use notify::{NotificationSender, NotificationStream, Reporter};
pub use runner::{RunHandle, TaskRunner};
pub use sites::{AdapterRegistry, SiteAdapter, StepContext, StepFailure};
