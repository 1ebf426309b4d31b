use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::page::ScreenshotParams;
use futures_util::StreamExt;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use super::{BrowserError, BrowserLauncher, BrowserSession, ElementState, Page, ProxyPool};

#[derive(Debug, Clone)]
pub struct ChromiumConfig {
    pub headless: bool,
    /// Chrome/Chromium binary; auto-detected when unset.
    pub executable: Option<PathBuf>,
    pub navigation_timeout: Duration,
    pub proxies: ProxyPool,
    pub window_size: (u32, u32),
    /// Containers without user namespaces need `--no-sandbox`.
    pub sandbox: bool,
}

impl Default for ChromiumConfig {
    fn default() -> Self {
        Self {
            headless: true,
            executable: None,
            navigation_timeout: Duration::from_secs(30),
            proxies: ProxyPool::default(),
            window_size: (1280, 900),
            sandbox: true,
        }
    }
}

pub struct ChromiumLauncher {
    config: ChromiumConfig,
}

impl ChromiumLauncher {
    pub fn new(config: ChromiumConfig) -> Self {
        Self { config }
    }

    fn browser_config(&self, proxy: Option<&str>) -> Result<BrowserConfig, BrowserError> {
        let (width, height) = self.config.window_size;
        let mut builder = BrowserConfig::builder()
            .request_timeout(self.config.navigation_timeout)
            .window_size(width, height);
        if !self.config.headless {
            builder = builder.with_head();
        }
        if !self.config.sandbox {
            builder = builder.no_sandbox();
        }
        if let Some(exe) = &self.config.executable {
            builder = builder.chrome_executable(exe);
        }
        if let Some(proxy) = proxy {
            builder = builder.arg(format!("--proxy-server={proxy}"));
        }
        builder.build().map_err(BrowserError::Launch)
    }
}

#[async_trait]
impl BrowserLauncher for ChromiumLauncher {
    async fn launch(&self) -> Result<Box<dyn BrowserSession>, BrowserError> {
        let proxy = self.config.proxies.pick();
        if let Some(proxy) = proxy {
            tracing::info!(proxy, "launching browser through proxy");
        }

        let config = self.browser_config(proxy)?;
        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| BrowserError::Launch(e.to_string()))?;

        // The CDP connection only makes progress while its handler stream is polled.
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        Ok(Box::new(ChromiumSession {
            browser: Mutex::new(Some(browser)),
            handler_task,
            navigation_timeout: self.config.navigation_timeout,
        }))
    }
}

struct ChromiumSession {
    browser: Mutex<Option<Browser>>,
    handler_task: JoinHandle<()>,
    navigation_timeout: Duration,
}

#[async_trait]
impl BrowserSession for ChromiumSession {
    async fn new_page(&self, url: &str) -> Result<Box<dyn Page>, BrowserError> {
        let guard = self.browser.lock().await;
        let browser = guard.as_ref().ok_or(BrowserError::Closed)?;

        let navigation_error = |message: String| BrowserError::Navigation {
            url: url.to_string(),
            message,
        };
        let page = tokio::time::timeout(self.navigation_timeout, browser.new_page(url))
            .await
            .map_err(|_| navigation_error(format!("timed out after {:?}", self.navigation_timeout)))?
            .map_err(|e| navigation_error(e.to_string()))?;

        Ok(Box::new(ChromiumPage { page }))
    }

    async fn close(&self) -> Result<(), BrowserError> {
        let Some(mut browser) = self.browser.lock().await.take() else {
            return Ok(());
        };
        let closed = browser.close().await.map_err(|e| BrowserError::Protocol(e.to_string()));
        let _ = browser.wait().await;
        self.handler_task.abort();
        closed.map(|_| ())
    }
}

impl Drop for ChromiumSession {
    fn drop(&mut self) {
        self.handler_task.abort();
    }
}

struct ChromiumPage {
    page: chromiumoxide::Page,
}

impl ChromiumPage {
    async fn eval<T: serde::de::DeserializeOwned>(&self, script: String) -> Result<T, BrowserError> {
        self.page
            .evaluate(script)
            .await
            .map_err(|e| BrowserError::Protocol(e.to_string()))?
            .into_value::<T>()
            .map_err(|e| BrowserError::Protocol(e.to_string()))
    }

    async fn write_control(
        &self,
        body: &str,
        selector: &str,
        value: &str,
    ) -> Result<(), BrowserError> {
        let script = format!(
            "((sel, value) => {{ {body} }})({}, {})",
            js_string(selector)?,
            js_string(value)?
        );
        let status: String = self.eval(script).await?;
        match status.as_str() {
            "ok" => Ok(()),
            "missing" => Err(BrowserError::ElementNotFound(selector.to_string())),
            other => Err(BrowserError::not_interactable(selector, other)),
        }
    }
}

const FILL_JS: &str = r#"
const el = document.querySelector(sel);
if (!el) return 'missing';
if (el.disabled || el.readOnly) return 'field is disabled or read-only';
el.focus();
const proto = el instanceof HTMLTextAreaElement ? HTMLTextAreaElement.prototype
  : el instanceof HTMLInputElement ? HTMLInputElement.prototype : null;
const desc = proto && Object.getOwnPropertyDescriptor(proto, 'value');
if (desc && desc.set) { desc.set.call(el, value); } else { el.value = value; }
el.dispatchEvent(new Event('input', { bubbles: true }));
el.dispatchEvent(new Event('change', { bubbles: true }));
return 'ok';
"#;

const SELECT_JS: &str = r#"
const el = document.querySelector(sel);
if (!el) return 'missing';
if (!(el instanceof HTMLSelectElement)) return 'element is not a <select>';
if (el.disabled) return 'select is disabled';
if (!Array.from(el.options).some(o => o.value === value)) return 'no option with value ' + JSON.stringify(value);
el.value = value;
el.dispatchEvent(new Event('input', { bubbles: true }));
el.dispatchEvent(new Event('change', { bubbles: true }));
return 'ok';
"#;

const LOCATE_JS: &str = r#"
const el = document.querySelector(sel);
if (!el) return { present: false, visible: false, enabled: false };
const style = window.getComputedStyle(el);
const rect = el.getBoundingClientRect();
const visible = style.display !== 'none' && style.visibility !== 'hidden'
  && (rect.width > 0 || rect.height > 0);
return {
  present: true,
  visible,
  enabled: !el.matches(':disabled'),
  text: el.innerText ?? el.textContent,
  value: 'value' in el ? String(el.value) : null,
  html: el.innerHTML,
};
"#;

#[async_trait]
impl Page for ChromiumPage {
    async fn click(&self, selector: &str) -> Result<(), BrowserError> {
        let element = self
            .page
            .find_element(selector)
            .await
            .map_err(|_| BrowserError::ElementNotFound(selector.to_string()))?;
        element
            .click()
            .await
            .map_err(|e| BrowserError::not_interactable(selector, e.to_string()))?;
        Ok(())
    }

    async fn fill(&self, selector: &str, value: &str) -> Result<(), BrowserError> {
        self.write_control(FILL_JS, selector, value).await
    }

    async fn select_option(&self, selector: &str, value: &str) -> Result<(), BrowserError> {
        self.write_control(SELECT_JS, selector, value).await
    }

    async fn locate(&self, selector: &str) -> Result<ElementState, BrowserError> {
        let script = format!("((sel) => {{ {LOCATE_JS} }})({})", js_string(selector)?);
        self.eval(script).await
    }

    async fn screenshot(&self, path: &Path) -> Result<(), BrowserError> {
        let params = ScreenshotParams::builder().full_page(true).build();
        self.page
            .save_screenshot(params, path)
            .await
            .map_err(|e| BrowserError::Protocol(e.to_string()))?;
        Ok(())
    }
}

fn js_string(s: &str) -> Result<String, BrowserError> {
    serde_json::to_string(s).map_err(|e| BrowserError::Protocol(e.to_string()))
}
