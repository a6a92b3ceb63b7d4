//! In-memory browser used by the runner and adapter tests.

use crate::config::RunnerConfig;
use crate::notify::{self, NotificationStream, Reporter};
use crate::sites::StepContext;
use async_trait::async_trait;
use autohub_browser::{Element, Error, LaunchOptions, Result, Session, SessionFactory};
use autohub_core::{Locator, TaskDescriptor};
use std::collections::{HashMap, VecDeque};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// One element: text, attributes and children keyed by CSS selector
#[derive(Debug, Clone, Default)]
pub struct FakeNode {
    text: String,
    attrs: HashMap<String, String>,
    children: HashMap<String, Vec<FakeNode>>,
}

impl FakeNode {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(text: &str) -> Self {
        Self {
            text: text.to_string(),
            ..Self::default()
        }
    }

    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.attrs.insert(name.to_string(), value.to_string());
        self
    }

    pub fn child(mut self, css: &str, node: FakeNode) -> Self {
        self.children
            .entry(Locator::css(css).to_string())
            .or_default()
            .push(node);
        self
    }
}

type Dom = HashMap<String, Vec<FakeNode>>;

#[derive(Default)]
struct PageState {
    url: String,
    dom: Dom,
    goto_on_click: HashMap<String, String>,
    load_on_click: HashMap<String, VecDeque<Dom>>,
    actions: Vec<String>,
}

/// A page whose DOM is keyed by the display form of a locator, e.g. `css=#search`
#[derive(Clone, Default)]
pub struct FakePage {
    state: Arc<Mutex<PageState>>,
}

impl FakePage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(self, key: &str, node: FakeNode) -> Self {
        self.with_all(key, vec![node])
    }

    pub fn with_all(self, key: &str, nodes: Vec<FakeNode>) -> Self {
        self.state.lock().unwrap().dom.insert(key.to_string(), nodes);
        self
    }

    /// Clicking `key` changes the current URL
    pub fn on_click_goto(self, key: &str, url: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .goto_on_click
            .insert(key.to_string(), url.to_string());
        self
    }

    /// Clicking `key` replaces the DOM with the one of `next`
    pub fn on_click_load(self, key: &str, next: FakePage) -> Self {
        let dom = next.state.lock().unwrap().dom.clone();
        self.state
            .lock()
            .unwrap()
            .load_on_click
            .entry(key.to_string())
            .or_default()
            .push_back(dom);
        self
    }

    pub fn session(&self) -> FakeSession {
        FakeSession {
            page: self.clone(),
        }
    }

    pub fn actions(&self) -> Vec<String> {
        self.state.lock().unwrap().actions.clone()
    }

    fn record(&self, action: String) {
        self.state.lock().unwrap().actions.push(action);
    }

    fn lookup(&self, key: &str) -> Vec<FakeNode> {
        self.state
            .lock()
            .unwrap()
            .dom
            .get(key)
            .cloned()
            .unwrap_or_default()
    }

    fn clicked(&self, key: &str) {
        let mut state = self.state.lock().unwrap();
        if let Some(url) = state.goto_on_click.get(key).cloned() {
            state.url = url;
        }
        if let Some(dom) = state.load_on_click.get_mut(key).and_then(VecDeque::pop_front) {
            state.dom = dom;
        }
    }

    fn element(&self, key: &str, node: FakeNode) -> Box<dyn Element> {
        Box::new(FakeElement {
            page: self.clone(),
            key: key.to_string(),
            node,
        })
    }
}

pub struct FakeSession {
    page: FakePage,
}

#[async_trait]
impl Session for FakeSession {
    async fn goto(&self, url: &str) -> Result<()> {
        self.page.record(format!("goto {}", url));
        self.page.state.lock().unwrap().url = url.to_string();
        Ok(())
    }

    async fn current_url(&self) -> Result<String> {
        Ok(self.page.state.lock().unwrap().url.clone())
    }

    async fn find(&self, locator: &Locator) -> Result<Box<dyn Element>> {
        let key = locator.to_string();
        let node = self
            .page
            .lookup(&key)
            .into_iter()
            .next()
            .ok_or_else(|| Error::NotFound(key.clone()))?;
        Ok(self.page.element(&key, node))
    }

    async fn find_all(&self, locator: &Locator) -> Result<Vec<Box<dyn Element>>> {
        let key = locator.to_string();
        Ok(self
            .page
            .lookup(&key)
            .into_iter()
            .map(|node| self.page.element(&key, node))
            .collect())
    }

    async fn close(&mut self) -> Result<()> {
        self.page.record("close".to_string());
        Ok(())
    }
}

struct FakeElement {
    page: FakePage,
    key: String,
    node: FakeNode,
}

#[async_trait]
impl Element for FakeElement {
    async fn find(&self, locator: &Locator) -> Result<Box<dyn Element>> {
        let key = locator.to_string();
        let node = self
            .node
            .children
            .get(&key)
            .and_then(|nodes| nodes.first())
            .cloned()
            .ok_or_else(|| Error::NotFound(key.clone()))?;
        Ok(self.page.element(&key, node))
    }

    async fn find_all(&self, locator: &Locator) -> Result<Vec<Box<dyn Element>>> {
        let key = locator.to_string();
        Ok(self
            .node
            .children
            .get(&key)
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .map(|node| self.page.element(&key, node))
            .collect())
    }

    async fn text(&self) -> Result<String> {
        Ok(self.node.text.clone())
    }

    async fn attribute(&self, name: &str) -> Result<Option<String>> {
        Ok(self.node.attrs.get(name).cloned())
    }

    async fn click(&self) -> Result<()> {
        self.page.record(format!("click {}", self.key));
        self.page.clicked(&self.key);
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        self.page.record(format!("clear {}", self.key));
        Ok(())
    }

    async fn type_text(&self, text: &str) -> Result<()> {
        self.page.record(format!("type {} {}", self.key, text));
        Ok(())
    }

    async fn press_enter(&self) -> Result<()> {
        self.page.record(format!("enter {}", self.key));
        Ok(())
    }

    async fn upload(&self, files: &[PathBuf]) -> Result<()> {
        self.page.record(format!("upload {} {}", self.key, files.len()));
        Ok(())
    }
}

/// Hands out sessions on a shared `FakePage`, or fails every launch
#[derive(Clone, Default)]
pub struct FakeFactory {
    page: FakePage,
    fail_launch: bool,
    opened: Arc<AtomicUsize>,
    launches: Arc<Mutex<Vec<LaunchOptions>>>,
}

impl FakeFactory {
    pub fn new(page: FakePage) -> Self {
        Self {
            page,
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail_launch: true,
            ..Self::default()
        }
    }

    pub fn page(&self) -> &FakePage {
        &self.page
    }

    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn launches(&self) -> Vec<LaunchOptions> {
        self.launches.lock().unwrap().clone()
    }
}

#[async_trait]
impl SessionFactory for FakeFactory {
    async fn open(&self, options: &LaunchOptions) -> Result<Box<dyn Session>> {
        self.launches.lock().unwrap().push(options.clone());
        if self.fail_launch {
            return Err(Error::Launch("browser exited immediately".to_string()));
        }
        self.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(self.page.session()))
    }
}

/// Runner configuration with short waits and an executable that always exists
pub fn test_config() -> RunnerConfig {
    RunnerConfig {
        browser_path: std::env::current_exe().ok(),
        element_timeout: Duration::from_millis(100),
        settle: Duration::ZERO,
        poll: Duration::from_millis(5),
        ..RunnerConfig::default()
    }
}

pub fn context() -> (StepContext, NotificationStream) {
    let (tx, rx) = notify::channel();
    let ctx = StepContext::new(
        Reporter::new(tx),
        &test_config(),
        &TaskDescriptor::search("test"),
    );
    (ctx, rx)
}
