use crate::config::RunnerConfig;
use crate::error::{RunError, RunnerError};
use crate::notify::{self, NotificationSender, NotificationStream, Reporter};
use crate::sites::{AdapterRegistry, SiteAdapter, StepContext};
use autohub_browser::{BrowserFinder, LaunchOptions, ProfileManager, SessionFactory};
use autohub_core::proxy::ProxyAddress;
use autohub_core::{RunResults, RunState, TaskDescriptor};
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use tokio::sync::watch;

/// Runs at most one task at a time on a dedicated background thread.
///
/// Every accepted run ends with exactly one `Finished` notification, which
/// is always the last notification of that run.
pub struct TaskRunner {
    config: Arc<RunnerConfig>,
    factory: Arc<dyn SessionFactory>,
    registry: Arc<AdapterRegistry>,
    sender: NotificationSender,
    busy: Arc<AtomicBool>,
    cancel: Mutex<Option<watch::Sender<bool>>>,
}

/// Handle to the background thread of one run
pub struct RunHandle {
    thread: JoinHandle<RunState>,
}

impl RunHandle {
    /// Wait for the run to end and return its final state
    pub fn join(self) -> RunState {
        self.thread.join().unwrap_or(RunState::Failed)
    }
}

/// Everything the background thread owns for one run
struct Job {
    config: Arc<RunnerConfig>,
    factory: Arc<dyn SessionFactory>,
    adapter: Arc<dyn SiteAdapter>,
    descriptor: TaskDescriptor,
    reporter: Reporter,
    cancel: watch::Receiver<bool>,
}

impl TaskRunner {
    pub fn new(
        config: RunnerConfig,
        factory: Arc<dyn SessionFactory>,
        registry: AdapterRegistry,
    ) -> (Self, NotificationStream) {
        let (sender, stream) = notify::channel();
        let runner = Self {
            config: Arc::new(config),
            factory,
            registry: Arc::new(registry),
            sender,
            busy: Arc::new(AtomicBool::new(false)),
            cancel: Mutex::new(None),
        };
        (runner, stream)
    }

    /// Whether a run is in flight
    pub fn is_running(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    /// Validate the descriptor and start it on a background thread
    pub fn start(&self, descriptor: TaskDescriptor) -> Result<RunHandle, RunnerError> {
        if self
            .busy
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(RunnerError::Busy);
        }

        let reporter = Reporter::new(self.sender.clone());

        let adapter = match self.registry.get(descriptor.kind) {
            Some(adapter) => adapter,
            None => {
                let message = format!("No site adapter registered for {} tasks", descriptor.kind);
                return Err(self.reject(&reporter, message));
            }
        };

        if let Err(e) = adapter.validate(&descriptor) {
            return Err(self.reject(&reporter, e.to_string()));
        }

        let (cancel_tx, cancel_rx) = watch::channel(false);
        if let Ok(mut slot) = self.cancel.lock() {
            *slot = Some(cancel_tx);
        }

        let kind = descriptor.kind;
        let job = Job {
            config: Arc::clone(&self.config),
            factory: Arc::clone(&self.factory),
            adapter,
            descriptor,
            reporter: reporter.clone(),
            cancel: cancel_rx,
        };
        let busy = Arc::clone(&self.busy);

        tracing::debug!("Starting {} run", kind);

        let spawned = std::thread::Builder::new()
            .name(format!("autohub-{}", kind))
            .spawn(move || {
                let reporter = job.reporter.clone();
                let success = run_job(job);
                // Cleared before Finished so a start issued on Finished is accepted
                busy.store(false, Ordering::SeqCst);
                reporter.finished(success);
                RunState::NotStarted
                    .start()
                    .and_then(|state| state.finish(success))
                    .unwrap_or(RunState::Failed)
            });

        match spawned {
            Ok(thread) => Ok(RunHandle { thread }),
            Err(e) => {
                let message = format!("Could not start the worker thread: {}", e);
                reporter.error(message.clone());
                reporter.finished(false);
                self.busy.store(false, Ordering::SeqCst);
                Err(RunnerError::Spawn(e.to_string()))
            }
        }
    }

    /// Ask the in-flight run to stop. Returns false when nothing is running.
    pub fn stop(&self) -> bool {
        if !self.is_running() {
            return false;
        }

        match self.cancel.lock() {
            Ok(slot) => match slot.as_ref() {
                Some(tx) => {
                    tracing::info!("Cancelling current run");
                    tx.send_replace(true);
                    true
                }
                None => false,
            },
            Err(_) => false,
        }
    }

    fn reject(&self, reporter: &Reporter, message: String) -> RunnerError {
        reporter.error(message.clone());
        reporter.finished(false);
        self.busy.store(false, Ordering::SeqCst);
        RunnerError::InvalidDescriptor(message)
    }
}

/// Body of the background thread: drive the run and report any failure.
/// Returns whether the run succeeded; the caller emits `Finished`.
fn run_job(job: Job) -> bool {
    let reporter = job.reporter.clone();

    let outcome = std::panic::catch_unwind(AssertUnwindSafe(|| {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| RunError::Unexpected(format!("async runtime unavailable: {}", e)))?;
        runtime.block_on(execute(job))
    }));

    match outcome {
        Ok(Ok(())) => true,
        Ok(Err(error)) => {
            reporter.error(error.to_string());
            false
        }
        Err(panic) => {
            reporter.error(RunError::Unexpected(panic_message(panic.as_ref())).to_string());
            false
        }
    }
}

async fn execute(job: Job) -> Result<(), RunError> {
    let Job {
        config,
        factory,
        adapter,
        descriptor,
        reporter,
        mut cancel,
    } = job;

    reporter.progress(0);
    reporter.log(format!("Starting {} task", descriptor.kind));

    let (options, profile) = prepare_launch(&config, &descriptor)?;
    tracing::debug!("Launch arguments: {:?}", options.build_args());

    let mut session = tokio::select! {
        opened = factory.open(&options) => opened.map_err(|e| match e {
            autohub_browser::Error::Launch(msg) => RunError::Launch(msg),
            other => RunError::Launch(other.to_string()),
        })?,
        _ = cancelled(&mut cancel) => return Err(RunError::Cancelled),
    };
    reporter.log("Browser started");

    let ctx = StepContext::new(reporter.clone(), &config, &descriptor);
    let outcome = tokio::select! {
        outcome = adapter.run(session.as_ref(), &descriptor, &ctx) => Some(outcome),
        _ = cancelled(&mut cancel) => None,
    };

    if let Err(e) = session.close().await {
        tracing::warn!("Failed to close browser session: {}", e);
    }
    drop(profile);

    let source = adapter.source(&descriptor);
    match outcome {
        None => Err(RunError::Cancelled),
        Some(Ok(mut records)) => {
            records.truncate(descriptor.max_results);
            reporter.result(RunResults::new(descriptor.kind, source, records));
            reporter.progress(100);
            Ok(())
        }
        Some(Err(failure)) => {
            if !failure.partial.is_empty() {
                let mut partial = failure.partial;
                partial.truncate(descriptor.max_results);
                reporter.log(format!("Keeping {} result(s) gathered before the failure", partial.len()));
                reporter.result(RunResults::new(descriptor.kind, source, partial));
            }
            Err(failure.error)
        }
    }
}

/// Resolve the browser binary, profile directory and flags for one run
fn prepare_launch(
    config: &RunnerConfig,
    descriptor: &TaskDescriptor,
) -> Result<(LaunchOptions, ProfileManager), RunError> {
    let browser_path = BrowserFinder::new(config.browser_path.clone())
        .find()
        .map_err(|e| RunError::Launch(e.to_string()))?;

    let proxy = match descriptor.proxy.as_ref().or(config.proxy.as_ref()) {
        Some(raw) => Some(ProxyAddress::parse(raw)?.to_string()),
        None => None,
    };

    let profile = match &config.profile_path {
        Some(path) => ProfileManager::persistent(path.clone()),
        None => ProfileManager::temporary(),
    }
    .map_err(|e| RunError::Launch(format!("profile unavailable: {}", e)))?;

    let options = LaunchOptions::new(browser_path)
        .with_user_data_dir(Some(profile.path().to_path_buf()))
        .with_profile_directory(config.profile_directory.clone())
        .with_headless(descriptor.headless || config.headless)
        .with_proxy(proxy)
        .with_extra_args(config.extra_args.clone())
        .with_request_timeout(config.request_timeout);

    Ok((options, profile))
}

/// Resolves once the cancel flag is raised. Never resolves if the runner is gone.
async fn cancelled(rx: &mut watch::Receiver<bool>) {
    loop {
        if *rx.borrow_and_update() {
            return;
        }
        if rx.changed().await.is_err() {
            futures::future::pending::<()>().await;
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "worker panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::{FakeFactory, FakeNode, FakePage, test_config};
    use crate::sites::StepFailure;
    use async_trait::async_trait;
    use autohub_browser::Session;
    use autohub_core::{Notification, ResultRecord, TaskKind};
    use std::path::PathBuf;
    use std::time::Duration;

    fn google_page(results: usize) -> FakePage {
        let items = (0..results)
            .map(|i| {
                FakeNode::new()
                    .child("h3", FakeNode::text(&format!("Result {}", i)))
                    .child("a", FakeNode::new().attr("href", &format!("https://r{}.example/", i)))
            })
            .collect();
        FakePage::new()
            .with("name=q", FakeNode::new())
            .with("css=#search", FakeNode::new())
            .with_all("css=div.g", items)
    }

    fn runner_with(factory: FakeFactory, config: RunnerConfig) -> (TaskRunner, NotificationStream) {
        TaskRunner::new(config, Arc::new(factory), AdapterRegistry::with_defaults())
    }

    fn progress_values(notifications: &[Notification]) -> Vec<u8> {
        notifications
            .iter()
            .filter_map(|n| match n {
                Notification::Progress(p) => Some(*p),
                _ => None,
            })
            .collect()
    }

    fn errors(notifications: &[Notification]) -> Vec<String> {
        notifications
            .iter()
            .filter_map(|n| match n {
                Notification::Error(e) => Some(e.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_successful_search() {
        let factory = FakeFactory::new(google_page(5));
        let (runner, mut stream) = runner_with(factory.clone(), test_config());

        let handle = runner
            .start(TaskDescriptor::search("rust").with_max_results(3))
            .unwrap();
        let seen = stream.blocking_collect_run();

        assert_eq!(handle.join(), RunState::Succeeded);
        assert!(!runner.is_running());

        let progress = progress_values(&seen);
        assert_eq!(progress.first(), Some(&0));
        assert_eq!(progress.last(), Some(&100));
        assert!(progress.windows(2).all(|w| w[0] <= w[1]));

        let results: Vec<_> = seen
            .iter()
            .filter_map(|n| match n {
                Notification::Result(r) => Some(r),
                _ => None,
            })
            .collect();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].kind, TaskKind::Search);
        assert_eq!(results[0].source, "google");
        assert_eq!(results[0].len(), 3);

        assert!(errors(&seen).is_empty());
        assert_eq!(seen.last(), Some(&Notification::Finished { success: true }));
        assert_eq!(seen.iter().filter(|n| n.is_finished()).count(), 1);
        assert!(factory.page().actions().contains(&"close".to_string()));
    }

    #[test]
    fn test_invalid_descriptor_never_launches() {
        let factory = FakeFactory::new(google_page(1));
        let (runner, mut stream) = runner_with(factory.clone(), test_config());

        let err = runner.start(TaskDescriptor::search("")).err().unwrap();
        let seen = stream.blocking_collect_run();

        assert!(matches!(err, RunnerError::InvalidDescriptor(_)));
        assert_eq!(errors(&seen).len(), 1);
        assert!(errors(&seen)[0].contains("keyword"));
        assert_eq!(seen.last(), Some(&Notification::Finished { success: false }));
        assert!(!seen.iter().any(|n| matches!(n, Notification::Result(_))));
        assert!(factory.launches().is_empty());
        assert!(!runner.is_running());
    }

    #[test]
    fn test_launch_failure_reports_one_error() {
        let factory = FakeFactory::failing();
        let (runner, mut stream) = runner_with(factory, test_config());

        let handle = runner.start(TaskDescriptor::search("rust")).unwrap();
        let seen = stream.blocking_collect_run();

        assert_eq!(handle.join(), RunState::Failed);
        assert_eq!(errors(&seen).len(), 1);
        assert!(errors(&seen)[0].contains("Could not start the browser"));
        assert_eq!(seen.last(), Some(&Notification::Finished { success: false }));
        assert!(!seen.iter().any(|n| matches!(n, Notification::Result(_))));
    }

    #[test]
    fn test_missing_browser_binary_fails_launch() {
        let factory = FakeFactory::new(google_page(1));
        let config = RunnerConfig {
            browser_path: Some(PathBuf::from("/nonexistent/brave")),
            ..test_config()
        };
        let (runner, mut stream) = runner_with(factory.clone(), config);

        let handle = runner.start(TaskDescriptor::search("rust")).unwrap();
        let seen = stream.blocking_collect_run();

        assert_eq!(handle.join(), RunState::Failed);
        assert_eq!(errors(&seen).len(), 1);
        assert_eq!(factory.opened(), 0);
    }

    #[test]
    fn test_launch_options_follow_descriptor() {
        let factory = FakeFactory::new(google_page(1));
        let (runner, mut stream) = runner_with(factory.clone(), test_config());

        let descriptor = TaskDescriptor::search("rust")
            .with_headless(true)
            .with_proxy(Some("10.0.0.1:3128".to_string()));
        runner.start(descriptor).unwrap().join();
        stream.blocking_collect_run();

        let launches = factory.launches();
        assert_eq!(launches.len(), 1);
        assert!(launches[0].headless);
        assert_eq!(launches[0].proxy.as_deref(), Some("http://10.0.0.1:3128"));
        assert!(launches[0].user_data_dir.is_some());
    }

    #[test]
    fn test_step_failure_is_one_error() {
        let factory = FakeFactory::new(FakePage::new());
        let (runner, mut stream) = runner_with(factory.clone(), test_config());

        let handle = runner.start(TaskDescriptor::search("rust")).unwrap();
        let seen = stream.blocking_collect_run();

        assert_eq!(handle.join(), RunState::Failed);
        assert_eq!(errors(&seen).len(), 1);
        assert!(errors(&seen)[0].contains("name=q"));
        assert!(factory.page().actions().contains(&"close".to_string()));
    }

    struct Partial;

    #[async_trait]
    impl SiteAdapter for Partial {
        fn kind(&self) -> TaskKind {
            TaskKind::Scrape
        }

        fn source(&self, _: &TaskDescriptor) -> String {
            "partial".to_string()
        }

        async fn run(
            &self,
            _: &dyn Session,
            _: &TaskDescriptor,
            _: &StepContext,
        ) -> Result<Vec<ResultRecord>, StepFailure> {
            Err(StepFailure::with_partial(
                RunError::Step("page 2 never loaded".to_string()),
                vec![ResultRecord::product("A", "1", "https://shop.example/a")],
            ))
        }
    }

    #[test]
    fn test_partial_results_come_before_error() {
        let mut registry = AdapterRegistry::with_defaults();
        registry.register(Arc::new(Partial));
        let (runner, mut stream) =
            TaskRunner::new(test_config(), Arc::new(FakeFactory::new(FakePage::new())), registry);

        runner.start(TaskDescriptor::scrape("x")).unwrap().join();
        let seen = stream.blocking_collect_run();

        let result_at = seen
            .iter()
            .position(|n| matches!(n, Notification::Result(_)))
            .unwrap();
        let error_at = seen
            .iter()
            .position(|n| matches!(n, Notification::Error(_)))
            .unwrap();
        assert!(result_at < error_at);
        assert_eq!(seen.last(), Some(&Notification::Finished { success: false }));
        assert!(!progress_values(&seen).contains(&100));
    }

    struct Panicking;

    #[async_trait]
    impl SiteAdapter for Panicking {
        fn kind(&self) -> TaskKind {
            TaskKind::Search
        }

        fn source(&self, _: &TaskDescriptor) -> String {
            "panic".to_string()
        }

        async fn run(
            &self,
            _: &dyn Session,
            _: &TaskDescriptor,
            _: &StepContext,
        ) -> Result<Vec<ResultRecord>, StepFailure> {
            panic!("selector engine exploded");
        }
    }

    #[test]
    fn test_panic_becomes_error() {
        let mut registry = AdapterRegistry::new();
        registry.register(Arc::new(Panicking));
        let (runner, mut stream) =
            TaskRunner::new(test_config(), Arc::new(FakeFactory::new(FakePage::new())), registry);

        let handle = runner.start(TaskDescriptor::search("x")).unwrap();
        let seen = stream.blocking_collect_run();

        assert_eq!(handle.join(), RunState::Failed);
        assert!(errors(&seen)[0].contains("selector engine exploded"));
        assert_eq!(seen.last(), Some(&Notification::Finished { success: false }));
        assert!(!runner.is_running());
    }

    #[test]
    fn test_second_start_is_busy() {
        // The search box never appears, so the first run waits out its timeout
        let config = RunnerConfig {
            element_timeout: Duration::from_secs(30),
            ..test_config()
        };
        let (runner, mut stream) = runner_with(FakeFactory::new(FakePage::new()), config);

        let handle = runner.start(TaskDescriptor::search("one")).unwrap();
        assert!(runner.is_running());
        assert_eq!(
            runner.start(TaskDescriptor::search("two")).err(),
            Some(RunnerError::Busy)
        );

        assert!(runner.stop());
        let seen = stream.blocking_collect_run();

        assert_eq!(handle.join(), RunState::Failed);
        assert_eq!(errors(&seen), vec!["run cancelled".to_string()]);
        assert_eq!(seen.iter().filter(|n| n.is_finished()).count(), 1);
        assert_eq!(seen.last(), Some(&Notification::Finished { success: false }));
    }

    #[test]
    fn test_runner_accepts_new_run_after_finish() {
        let (runner, mut stream) = runner_with(FakeFactory::new(google_page(2)), test_config());

        runner.start(TaskDescriptor::search("a")).unwrap().join();
        stream.blocking_collect_run();

        let second = runner.start(TaskDescriptor::search("b")).unwrap();
        stream.blocking_collect_run();

        assert_eq!(second.join(), RunState::Succeeded);
    }

    #[test]
    fn test_runner_accepts_start_issued_on_finished() {
        let (runner, mut stream) = runner_with(FakeFactory::new(google_page(1)), test_config());

        let mut handles = Vec::new();
        for i in 0..50 {
            let handle = runner
                .start(TaskDescriptor::search(format!("k{}", i)))
                .unwrap_or_else(|e| panic!("start {} rejected after Finished: {}", i, e));
            stream.blocking_collect_run();
            handles.push(handle);
        }

        for handle in handles {
            assert_eq!(handle.join(), RunState::Succeeded);
        }
    }

    #[test]
    fn test_stop_without_run() {
        let (runner, _stream) = runner_with(FakeFactory::new(FakePage::new()), test_config());

        assert!(!runner.stop());
    }
}
