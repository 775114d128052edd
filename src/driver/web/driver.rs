//! Web Driver implementation using Playwright
//!
//! Owns one browser, one context and one page. The runner creates a fresh
//! driver per scenario so no cookies, cart contents or storage leak between
//! journeys.

use anyhow::{Context, Result};
use async_trait::async_trait;
use playwright::api::{Browser, BrowserContext, Page, Viewport};
use playwright::Playwright;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::driver::traits::{PageDriver, Selector};

/// Web browser type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BrowserType {
    #[default]
    Chromium,
    Firefox,
    Webkit,
}

impl BrowserType {
    pub fn parse(name: &str) -> Result<Self> {
        match name.trim().to_lowercase().as_str() {
            "chromium" | "chrome" => Ok(BrowserType::Chromium),
            "firefox" => Ok(BrowserType::Firefox),
            "webkit" | "safari" => Ok(BrowserType::Webkit),
            other => anyhow::bail!("Unknown browser: {}", other),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BrowserType::Chromium => "chromium",
            BrowserType::Firefox => "firefox",
            BrowserType::Webkit => "webkit",
        }
    }
}

/// Web Driver configuration
#[derive(Debug, Clone)]
pub struct WebDriverConfig {
    pub browser_type: BrowserType,
    pub headless: bool,
    pub viewport_width: u32,
    pub viewport_height: u32,
    /// CDP endpoint of a remote browser (local debugging port or a cloud grid)
    pub cdp_endpoint: Option<String>,
}

impl Default for WebDriverConfig {
    fn default() -> Self {
        Self {
            browser_type: BrowserType::Chromium,
            headless: true,
            viewport_width: 1280,
            viewport_height: 720,
            cdp_endpoint: None,
        }
    }
}

/// Whether Playwright gave up waiting, as opposed to the page or browser failing
fn is_wait_timeout(err: &playwright::Error) -> bool {
    match err {
        playwright::Error::Timeout => true,
        playwright::Error::ErrorResponded(msg) => msg.to_string().starts_with("TimeoutError"),
        playwright::Error::Arc(inner) => is_wait_timeout(inner),
        _ => false,
    }
}

/// Web Driver using Playwright
pub struct WebDriver {
    #[allow(dead_code)]
    playwright: Arc<Playwright>,
    browser: Arc<Browser>,
    #[allow(dead_code)]
    context: Arc<BrowserContext>,
    page: Arc<Mutex<Page>>,
    config: WebDriverConfig,
}

impl WebDriver {
    /// Launch (or connect to) a browser and open a fresh page
    pub async fn new(config: WebDriverConfig) -> Result<Self> {
        let playwright = Playwright::initialize()
            .await
            .context("Failed to initialize Playwright")?;

        let browser = match (&config.cdp_endpoint, config.browser_type) {
            (Some(endpoint), BrowserType::Chromium) => {
                log::info!("Connecting to remote browser at {}", redact_endpoint(endpoint));
                playwright
                    .chromium()
                    .connect_over_cdp_builder(endpoint)
                    .connect_over_cdp()
                    .await
                    .context("Failed to connect to remote browser over CDP")?
            }
            (Some(_), other) => {
                anyhow::bail!("CDP connections are only supported for chromium, not {}", other.as_str())
            }
            (None, BrowserType::Chromium) => {
                launch_chromium_browser(&playwright.chromium(), &config).await?
            }
            (None, BrowserType::Firefox) => {
                playwright
                    .firefox()
                    .launcher()
                    .headless(config.headless)
                    .launch()
                    .await?
            }
            (None, BrowserType::Webkit) => {
                playwright
                    .webkit()
                    .launcher()
                    .headless(config.headless)
                    .launch()
                    .await?
            }
        };

        let context = browser.context_builder().build().await?;
        let page = context.new_page().await?;

        page.set_viewport_size(Viewport {
            width: config.viewport_width as i32,
            height: config.viewport_height as i32,
        })
        .await?;

        Ok(Self {
            playwright: Arc::new(playwright),
            browser: Arc::new(browser),
            context: Arc::new(context),
            page: Arc::new(Mutex::new(page)),
            config,
        })
    }

    /// Resolve the first element matching `selector` or fail with a readable message
    async fn element(
        &self,
        page: &Page,
        selector: &Selector,
    ) -> Result<playwright::api::ElementHandle> {
        let sel = selector.to_playwright();
        page.query_selector(&sel)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Element not found for selector: {}", sel))
    }
}

#[async_trait]
impl PageDriver for WebDriver {
    fn browser_name(&self) -> &str {
        self.config.browser_type.as_str()
    }

    async fn goto(&self, url: &str, timeout_ms: u64) -> Result<()> {
        let page = self.page.lock().await;
        page.goto_builder(url)
            .timeout(timeout_ms as f64)
            .goto()
            .await
            .with_context(|| format!("Failed to navigate to {}", url))?;
        Ok(())
    }

    async fn wait_for_visible(&self, selector: &Selector, timeout_ms: u64) -> Result<bool> {
        let page = self.page.lock().await;
        let sel = selector.to_playwright();

        let result = page
            .wait_for_selector_builder(&sel)
            .timeout(timeout_ms as f64)
            .wait_for_selector()
            .await;

        match result {
            Ok(_) => Ok(true),
            Err(e) if is_wait_timeout(&e) => {
                log::debug!("wait_for_selector({}) gave up: {:?}", sel, e);
                Ok(false)
            }
            Err(e) => Err(anyhow::anyhow!("Failed waiting for {}: {}", sel, e)),
        }
    }

    async fn is_visible(&self, selector: &Selector) -> Result<bool> {
        let page = self.page.lock().await;
        let sel = selector.to_playwright();
        match page.query_selector(&sel).await? {
            Some(el) => Ok(el.is_visible().await?),
            None => Ok(false),
        }
    }

    async fn click(&self, selector: &Selector) -> Result<()> {
        let page = self.page.lock().await;
        let sel = selector.to_playwright();
        page.click_builder(&sel)
            .click()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to click: {}. Error: {:?}", sel, e))?;
        Ok(())
    }

    async fn fill(&self, selector: &Selector, text: &str) -> Result<()> {
        let page = self.page.lock().await;
        let el = self.element(&page, selector).await?;
        el.fill_builder(text).fill().await?;
        Ok(())
    }

    async fn press(&self, selector: &Selector, key: &str) -> Result<()> {
        let page = self.page.lock().await;
        let el = self.element(&page, selector).await?;
        page.evaluate::<_, ()>("el => el.focus()", el).await?;
        page.keyboard.down(key).await?;
        page.keyboard.up(key).await?;
        Ok(())
    }

    async fn select_option(&self, selector: &Selector, value: &str) -> Result<()> {
        let page = self.page.lock().await;
        let el = self.element(&page, selector).await?;
        // Value is embedded as a JSON string literal, so quotes cannot escape it
        let js = format!(
            "el => {{ el.value = {}; el.dispatchEvent(new Event('change', {{ bubbles: true }})); return el.value; }}",
            serde_json::to_string(value)?
        );
        let selected: String = page.evaluate(&js, el).await?;
        if selected != value {
            anyhow::bail!("Option '{}' not available in {}", value, selector);
        }
        Ok(())
    }

    async fn inner_text(&self, selector: &Selector) -> Result<String> {
        let page = self.page.lock().await;
        let el = self.element(&page, selector).await?;
        let js = "el => el.value || el.innerText || el.textContent || ''";
        let text: String = page.evaluate(js, el).await?;
        Ok(text)
    }

    async fn count(&self, selector: &Selector) -> Result<usize> {
        let page = self.page.lock().await;
        let elements = page.query_selector_all(&selector.to_playwright()).await?;
        Ok(elements.len())
    }

    async fn evaluate(&self, expression: &str, arg: serde_json::Value) -> Result<serde_json::Value> {
        let page = self.page.lock().await;
        let value: serde_json::Value = page.evaluate(expression, arg).await?;
        Ok(value)
    }

    async fn title(&self) -> Result<String> {
        let page = self.page.lock().await;
        let title: String = page.evaluate("() => document.title", ()).await?;
        Ok(title)
    }

    async fn current_url(&self) -> Result<String> {
        let page = self.page.lock().await;
        let url: String = page.evaluate("() => window.location.href", ()).await?;
        Ok(url)
    }

    async fn take_screenshot(&self, path: &Path) -> Result<()> {
        let page = self.page.lock().await;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        page.screenshot_builder()
            .path(path.to_path_buf())
            .screenshot()
            .await?;
        Ok(())
    }

    async fn performance_metrics(&self) -> Result<HashMap<String, f64>> {
        let page = self.page.lock().await;

        let json: serde_json::Value = page
            .evaluate(
                "() => {
             const nav = performance.getEntriesByType('navigation')[0] || {};
             const paint = performance.getEntriesByType('paint') || [];
             const fcpEntry = paint.find(p => p.name === 'first-contentful-paint');
             return {
                 duration: nav.duration || 0,
                 domContentLoaded: nav.domContentLoadedEventEnd || 0,
                 loadEventEnd: nav.loadEventEnd || 0,
                 ttfb: nav.responseStart || 0,
                 fcp: fcpEntry ? fcpEntry.startTime : 0,
                 resources: performance.getEntriesByType('resource').length
             };
         }",
                (),
            )
            .await?;

        Ok(metrics_from_json(&json))
    }

    async fn close(&self) -> Result<()> {
        self.browser.close().await?;
        Ok(())
    }
}

/// Map the navigation-timing object returned by the page into named metrics
pub(crate) fn metrics_from_json(json: &serde_json::Value) -> HashMap<String, f64> {
    let names = [
        ("duration", "load_time_ms"),
        ("domContentLoaded", "dom_content_loaded_ms"),
        ("loadEventEnd", "load_event_end_ms"),
        ("ttfb", "ttfb_ms"),
        ("fcp", "fcp_ms"),
        ("resources", "resource_count"),
    ];

    names
        .iter()
        .filter_map(|(js_key, metric)| {
            json.get(*js_key)
                .and_then(|v| v.as_f64())
                .map(|v| (metric.to_string(), v))
        })
        .collect()
}

/// Hide credentials embedded in a remote endpoint before logging it
fn redact_endpoint(endpoint: &str) -> String {
    match endpoint.split_once('?') {
        Some((base, _)) => format!("{}?<redacted>", base),
        None => endpoint.to_string(),
    }
}

/// Launch a new Chromium browser, preferring an installed Chrome when present
async fn launch_chromium_browser(
    chromium: &playwright::api::BrowserType,
    config: &WebDriverConfig,
) -> Result<Browser> {
    let mut launcher = chromium.launcher();
    launcher = launcher.headless(config.headless);

    let env_path = std::env::var("PLAYWRIGHT_CHROMIUM_EXECUTABLE_PATH")
        .ok()
        .map(std::path::PathBuf::from);

    let executable_path = env_path.or_else(find_system_browser);
    if let Some(ref path) = executable_path {
        log::info!("Using browser executable: {}", path.display());
        launcher = launcher.executable(path);
    } else {
        log::info!("No browser executable found, using Playwright's bundled chromium");
    }

    let args: Vec<String> = [
        "--no-sandbox",
        "--disable-setuid-sandbox",
        "--disable-dev-shm-usage",
        "--disable-gpu",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();

    launcher = launcher.args(&args);

    Ok(launcher.launch().await?)
}

fn find_system_browser() -> Option<std::path::PathBuf> {
    let common_paths = [
        "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
        "/usr/bin/google-chrome",
        "/usr/bin/google-chrome-stable",
        "/Applications/Chromium.app/Contents/MacOS/Chromium",
        "/usr/bin/chromium",
        "/usr/bin/chromium-browser",
    ];

    common_paths
        .iter()
        .map(std::path::Path::new)
        .find(|p| p.exists())
        .map(|p| p.to_path_buf())
}
