use autohub_core::{Notification, RunResults};
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TryRecvError;

/// Producer side of the notification channel. Sends never block and a
/// closed receiver is ignored.
#[derive(Debug, Clone)]
pub struct NotificationSender {
    tx: mpsc::UnboundedSender<Notification>,
}

/// Consumer side, read by exactly one dispatcher
#[derive(Debug)]
pub struct NotificationStream {
    rx: mpsc::UnboundedReceiver<Notification>,
}

pub fn channel() -> (NotificationSender, NotificationStream) {
    let (tx, rx) = mpsc::unbounded_channel();
    (NotificationSender { tx }, NotificationStream { rx })
}

impl NotificationSender {
    pub fn send(&self, notification: Notification) {
        if self.tx.send(notification).is_err() {
            tracing::trace!("Notification dropped, nobody is listening");
        }
    }
}

impl NotificationStream {
    /// Block the current thread until the next notification.
    ///
    /// Must not be called from inside an async runtime.
    pub fn blocking_recv(&mut self) -> Option<Notification> {
        self.rx.blocking_recv()
    }

    pub fn try_recv(&mut self) -> Option<Notification> {
        match self.rx.try_recv() {
            Ok(notification) => Some(notification),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    /// Receive notifications until the end of the current run
    pub fn blocking_collect_run(&mut self) -> Vec<Notification> {
        let mut seen = Vec::new();
        while let Some(notification) = self.blocking_recv() {
            let done = notification.is_finished();
            seen.push(notification);
            if done {
                break;
            }
        }
        seen
    }
}

/// Per-run helper that keeps progress monotonic. Messages are mirrored to
/// `tracing` at debug level.
#[derive(Debug, Clone)]
pub struct Reporter {
    sender: NotificationSender,
    progress: Arc<AtomicU8>,
}

impl Reporter {
    pub fn new(sender: NotificationSender) -> Self {
        Self {
            sender,
            progress: Arc::new(AtomicU8::new(0)),
        }
    }

    pub fn log(&self, message: impl Into<String>) {
        let message = message.into();
        tracing::debug!("{}", message);
        self.sender.send(Notification::Log(message));
    }

    /// Report progress in percent. Values above 100 are clamped and values
    /// lower than what was already reported are dropped.
    pub fn progress(&self, percent: u8) {
        let percent = percent.min(100);
        let previous = self.progress.fetch_max(percent, Ordering::SeqCst);
        if percent >= previous {
            self.sender.send(Notification::Progress(percent));
        }
    }

    pub fn current_progress(&self) -> u8 {
        self.progress.load(Ordering::SeqCst)
    }

    pub fn error(&self, message: impl Into<String>) {
        let message = message.into();
        tracing::debug!("error: {}", message);
        self.sender.send(Notification::Error(message));
    }

    pub fn result(&self, results: RunResults) {
        tracing::debug!("{} result(s) from {}", results.len(), results.source);
        self.sender.send(Notification::Result(results));
    }

    pub fn finished(&self, success: bool) {
        tracing::debug!("Run finished (success: {})", success);
        self.sender.send(Notification::Finished { success });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(stream: &mut NotificationStream) -> Vec<Notification> {
        std::iter::from_fn(|| stream.try_recv()).collect()
    }

    #[test]
    fn test_progress_is_monotonic_and_clamped() {
        let (tx, mut rx) = channel();
        let reporter = Reporter::new(tx);

        reporter.progress(10);
        reporter.progress(50);
        reporter.progress(30);
        reporter.progress(250);

        assert_eq!(
            drain(&mut rx),
            vec![
                Notification::Progress(10),
                Notification::Progress(50),
                Notification::Progress(100),
            ]
        );
        assert_eq!(reporter.current_progress(), 100);
    }

    #[test]
    fn test_send_after_receiver_dropped_is_ignored() {
        let (tx, rx) = channel();
        drop(rx);

        let reporter = Reporter::new(tx);
        reporter.log("nobody hears this");
        reporter.finished(false);
    }

    #[test]
    fn test_messages_keep_order() {
        let (tx, mut rx) = channel();
        let reporter = Reporter::new(tx);

        reporter.log("one");
        reporter.error("two");
        reporter.finished(false);

        assert_eq!(
            drain(&mut rx),
            vec![
                Notification::Log("one".to_string()),
                Notification::Error("two".to_string()),
                Notification::Finished { success: false },
            ]
        );
    }
}
