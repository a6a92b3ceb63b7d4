use crate::proxy::ProxyAddress;
use crate::script::Script;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_MAX_RESULTS: usize = 10;

/// The kind of automation run to perform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskKind {
    Search,
    Login,
    Post,
    Scrape,
    Custom,
}

impl TaskKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskKind::Search => "search",
            TaskKind::Login => "login",
            TaskKind::Post => "post",
            TaskKind::Scrape => "scrape",
            TaskKind::Custom => "custom",
        }
    }

    pub fn all() -> [TaskKind; 5] {
        [
            TaskKind::Search,
            TaskKind::Login,
            TaskKind::Post,
            TaskKind::Scrape,
            TaskKind::Custom,
        ]
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        TaskKind::all()
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::InvalidTask(format!("unknown task kind '{}'", s)))
    }
}

/// Account credentials for login-style tasks
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.email.trim().is_empty() && !self.password.is_empty()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Describes one automation run. The runner takes it by value, so it cannot
/// change once a run has started.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskDescriptor {
    pub kind: TaskKind,
    #[serde(default)]
    pub keyword: String,
    #[serde(default)]
    pub credentials: Option<Credentials>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub images: Vec<PathBuf>,
    #[serde(default)]
    pub script: Option<Script>,
    pub pages: u32,
    pub max_results: usize,
    #[serde(default)]
    pub delay: Duration,
    #[serde(default)]
    pub proxy: Option<String>,
    #[serde(default)]
    pub headless: bool,
}

impl TaskDescriptor {
    pub fn new(kind: TaskKind) -> Self {
        Self {
            kind,
            keyword: String::new(),
            credentials: None,
            content: None,
            images: Vec::new(),
            script: None,
            pages: 1,
            max_results: DEFAULT_MAX_RESULTS,
            delay: Duration::ZERO,
            proxy: None,
            headless: false,
        }
    }

    pub fn search(keyword: impl Into<String>) -> Self {
        Self::new(TaskKind::Search).with_keyword(keyword)
    }

    pub fn scrape(keyword: impl Into<String>) -> Self {
        Self::new(TaskKind::Scrape).with_keyword(keyword)
    }

    pub fn login(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self::new(TaskKind::Login).with_credentials(Credentials::new(email, password))
    }

    pub fn post(content: impl Into<String>) -> Self {
        let mut descriptor = Self::new(TaskKind::Post);
        descriptor.content = Some(content.into());
        descriptor
    }

    pub fn custom(script: Script) -> Self {
        let mut descriptor = Self::new(TaskKind::Custom);
        descriptor.script = Some(script);
        descriptor
    }

    pub fn with_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.keyword = keyword.into();
        self
    }

    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    pub fn with_images(mut self, images: Vec<PathBuf>) -> Self {
        self.images = images;
        self
    }

    pub fn with_pages(mut self, pages: u32) -> Self {
        self.pages = pages;
        self
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_proxy(mut self, proxy: Option<String>) -> Self {
        self.proxy = proxy.filter(|p| !p.trim().is_empty());
        self
    }

    pub fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Check that every field the task kind needs is present
    pub fn validate(&self) -> Result<()> {
        if self.max_results == 0 {
            return Err(Error::InvalidTask(
                "result cap must be at least 1".to_string(),
            ));
        }

        if let Some(proxy) = &self.proxy {
            ProxyAddress::parse(proxy)?;
        }

        match self.kind {
            TaskKind::Search | TaskKind::Scrape => {
                if self.keyword.trim().is_empty() {
                    return Err(Error::InvalidTask(format!(
                        "{} requires a keyword",
                        self.kind
                    )));
                }
                if self.pages == 0 {
                    return Err(Error::InvalidTask(
                        "page limit must be at least 1".to_string(),
                    ));
                }
            }
            TaskKind::Login => {
                if !self.credentials.as_ref().is_some_and(Credentials::is_complete) {
                    return Err(Error::InvalidTask(
                        "login requires an email and a password".to_string(),
                    ));
                }
            }
            TaskKind::Post => {
                if self.content.as_deref().is_none_or(|c| c.trim().is_empty()) {
                    return Err(Error::InvalidTask("post requires content".to_string()));
                }
                if let Some(credentials) = &self.credentials {
                    if !credentials.is_complete() {
                        return Err(Error::InvalidTask(
                            "post credentials need both an email and a password".to_string(),
                        ));
                    }
                }
            }
            TaskKind::Custom => match &self.script {
                Some(script) => script.validate()?,
                None => {
                    return Err(Error::InvalidTask(
                        "custom task requires a script".to_string(),
                    ));
                }
            },
        }

        Ok(())
    }
}

/// Lifecycle of a single run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    NotStarted,
    Running,
    Succeeded,
    Failed,
}

impl RunState {
    /// Move from `NotStarted` to `Running`
    pub fn start(self) -> Result<Self> {
        match self {
            RunState::NotStarted => Ok(RunState::Running),
            other => Err(Error::InvalidTask(format!(
                "cannot start a run that is {:?}",
                other
            ))),
        }
    }

    /// Move from `Running` to a finished state
    pub fn finish(self, success: bool) -> Result<Self> {
        match self {
            RunState::Running if success => Ok(RunState::Succeeded),
            RunState::Running => Ok(RunState::Failed),
            other => Err(Error::InvalidTask(format!(
                "cannot finish a run that is {:?}",
                other
            ))),
        }
    }

    pub fn is_finished(&self) -> bool {
        matches!(self, RunState::Succeeded | RunState::Failed)
    }
}
