use crate::session::{Element, Session, SessionFactory};
use crate::{Error, LaunchOptions, Result};
use async_trait::async_trait;
use autohub_core::Locator;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::dom::SetFileInputFilesParams;
use chromiumoxide::cdp::browser_protocol::page::AddScriptToEvaluateOnNewDocumentParams;
use chromiumoxide::{Element as CdpElement, Page};
use futures::StreamExt;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::task::JoinHandle;

/// Hides the most common automation fingerprints before any page script runs
const STEALTH_SCRIPT: &str = r#"
Object.defineProperty(navigator, 'webdriver', { get: () => undefined });
Object.defineProperty(navigator, 'languages', { get: () => ['en-US', 'en'] });
window.chrome = window.chrome || { runtime: {} };
"#;

const CLEAR_FN: &str = r#"function() {
    if ('value' in this) { this.value = ''; } else { this.textContent = ''; }
    this.dispatchEvent(new Event('input', { bubbles: true }));
}"#;

/// Launches Chromium-family browsers over the DevTools protocol
#[derive(Debug, Default, Clone)]
pub struct ChromiumSessionFactory;

impl ChromiumSessionFactory {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SessionFactory for ChromiumSessionFactory {
    async fn open(&self, options: &LaunchOptions) -> Result<Box<dyn Session>> {
        tracing::info!(
            "Launching browser {} (headless: {})",
            options.browser_path.display(),
            options.headless
        );

        let mut builder = BrowserConfig::builder()
            .chrome_executable(&options.browser_path)
            .disable_default_args()
            .args(options.build_args())
            .window_size(options.window_size.0, options.window_size.1)
            .request_timeout(options.request_timeout);

        if let Some(dir) = &options.user_data_dir {
            builder = builder.user_data_dir(dir);
        }
        if !options.headless {
            builder = builder.with_head();
        }

        let config = builder.build().map_err(Error::Launch)?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| Error::Launch(e.to_string()))?;

        // The handler must be polled for any CDP command to complete
        let closed = Arc::new(AtomicBool::new(false));
        let handler_closed = Arc::clone(&closed);
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!("CDP handler event error (continuing): {}", e);
                }
            }
            handler_closed.store(true, Ordering::SeqCst);
        });

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                handler_task.abort();
                return Err(Error::Launch(format!("could not open a tab: {}", e)));
            }
        };

        page.execute(AddScriptToEvaluateOnNewDocumentParams::new(STEALTH_SCRIPT))
            .await?;

        tracing::info!("Browser session ready");

        Ok(Box::new(ChromiumSession {
            browser,
            page,
            handler_task: Some(handler_task),
            closed,
        }))
    }
}

struct ChromiumSession {
    browser: Browser,
    page: Page,
    handler_task: Option<JoinHandle<()>>,
    closed: Arc<AtomicBool>,
}

impl ChromiumSession {
    fn ensure_open(&self) -> Result<()> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(Error::SessionClosed);
        }
        Ok(())
    }

    fn wrap(&self, element: CdpElement) -> Box<dyn Element> {
        Box::new(ChromiumElement {
            element,
            page: self.page.clone(),
            closed: Arc::clone(&self.closed),
        })
    }
}

#[async_trait]
impl Session for ChromiumSession {
    async fn goto(&self, url: &str) -> Result<()> {
        self.ensure_open()?;
        tracing::debug!("Navigating to {}", url);
        self.page.goto(url).await?;
        Ok(())
    }

    async fn current_url(&self) -> Result<String> {
        self.ensure_open()?;
        Ok(self.page.url().await?.unwrap_or_default())
    }

    async fn find(&self, locator: &Locator) -> Result<Box<dyn Element>> {
        self.ensure_open()?;
        let element = match locator.to_css() {
            Some(css) => self.page.find_element(css).await?,
            None => self.page.find_xpath(locator.value()).await?,
        };
        Ok(self.wrap(element))
    }

    async fn find_all(&self, locator: &Locator) -> Result<Vec<Box<dyn Element>>> {
        self.ensure_open()?;
        let elements = match locator.to_css() {
            Some(css) => self.page.find_elements(css).await?,
            None => self.page.find_xpaths(locator.value()).await?,
        };
        Ok(elements.into_iter().map(|e| self.wrap(e)).collect())
    }

    async fn close(&mut self) -> Result<()> {
        if self.closed.swap(true, Ordering::SeqCst) && self.handler_task.is_none() {
            return Ok(());
        }

        tracing::info!("Closing browser session");

        if let Err(e) = self.browser.close().await {
            tracing::warn!("Browser did not close cleanly: {}", e);
        }
        if let Err(e) = self.browser.wait().await {
            tracing::warn!("Failed waiting for browser exit: {}", e);
        }

        if let Some(task) = self.handler_task.take() {
            task.abort();
        }

        Ok(())
    }
}

impl Drop for ChromiumSession {
    fn drop(&mut self) {
        if let Some(task) = self.handler_task.take() {
            task.abort();
        }
    }
}

struct ChromiumElement {
    element: CdpElement,
    page: Page,
    closed: Arc<AtomicBool>,
}

impl ChromiumElement {
    fn ensure_open(&self) -> Result<()> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(Error::SessionClosed);
        }
        Ok(())
    }

    fn wrap(&self, element: CdpElement) -> Box<dyn Element> {
        Box::new(ChromiumElement {
            element,
            page: self.page.clone(),
            closed: Arc::clone(&self.closed),
        })
    }

    fn css_for(locator: &Locator) -> Result<String> {
        locator.to_css().ok_or_else(|| {
            Error::Unsupported(format!("element-scoped lookup by {}", locator))
        })
    }
}

#[async_trait]
impl Element for ChromiumElement {
    async fn find(&self, locator: &Locator) -> Result<Box<dyn Element>> {
        self.ensure_open()?;
        let element = self.element.find_element(Self::css_for(locator)?).await?;
        Ok(self.wrap(element))
    }

    async fn find_all(&self, locator: &Locator) -> Result<Vec<Box<dyn Element>>> {
        self.ensure_open()?;
        let elements = self.element.find_elements(Self::css_for(locator)?).await?;
        Ok(elements.into_iter().map(|e| self.wrap(e)).collect())
    }

    async fn text(&self) -> Result<String> {
        self.ensure_open()?;
        Ok(self
            .element
            .inner_text()
            .await?
            .map(|t| t.trim().to_string())
            .unwrap_or_default())
    }

    async fn attribute(&self, name: &str) -> Result<Option<String>> {
        self.ensure_open()?;
        // Properties resolve relative links, so prefer them for href/src
        if let Some(serde_json::Value::String(value)) = self.element.property(name).await? {
            return Ok(Some(value));
        }
        Ok(self.element.attribute(name).await?)
    }

    async fn click(&self) -> Result<()> {
        self.ensure_open()?;
        self.element.click().await?;
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        self.ensure_open()?;
        self.element.call_js_fn(CLEAR_FN, false).await?;
        Ok(())
    }

    async fn type_text(&self, text: &str) -> Result<()> {
        self.ensure_open()?;
        self.element.focus().await?;
        self.element.type_str(text).await?;
        Ok(())
    }

    async fn press_enter(&self) -> Result<()> {
        self.ensure_open()?;
        self.element.press_key("Enter").await?;
        Ok(())
    }

    async fn upload(&self, files: &[PathBuf]) -> Result<()> {
        self.ensure_open()?;
        let params = SetFileInputFilesParams::builder()
            .files(files.iter().map(|f| f.display().to_string()))
            .backend_node_id(self.element.backend_node_id)
            .build()
            .map_err(Error::Browser)?;
        self.page.execute(params).await?;
        Ok(())
    }
}
