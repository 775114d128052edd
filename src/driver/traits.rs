use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;

/// Element selector for page elements
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    /// Raw CSS selector
    Css(String),
    /// Select by visible text (exact match)
    Text(String),
    /// Select by XPath
    XPath(String),
    /// Select form controls by their `name` attribute
    Name(String),
    /// Select by placeholder text
    Placeholder(String),
    /// Select by ARIA role
    Role(String),
    /// Select by `data-testid`
    TestId(String),
}

impl Selector {
    pub fn css(css: &str) -> Self {
        Selector::Css(css.to_string())
    }

    pub fn text(text: &str) -> Self {
        Selector::Text(text.to_string())
    }

    pub fn name(name: &str) -> Self {
        Selector::Name(name.to_string())
    }

    /// Convert to a Playwright selector string
    pub fn to_playwright(&self) -> String {
        match self {
            Selector::Css(css) => css.clone(),
            Selector::Text(text) => format!("text=\"{}\"", text),
            Selector::XPath(xpath) => format!("xpath={}", xpath),
            Selector::Name(name) => format!("[name=\"{}\"]", name),
            Selector::Placeholder(p) => format!("[placeholder=\"{}\"]", p),
            Selector::Role(role) => format!("[role=\"{}\"]", role),
            Selector::TestId(id) => format!("[data-testid=\"{}\"]", id),
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_playwright())
    }
}

/// Page-like handle a scenario drives
///
/// One implementation talks to a real browser page through Playwright; the
/// test suite drives scenarios against a scripted in-memory page instead.
/// Waits return `false` on timeout rather than erroring so callers decide
/// how a missing element is reported.
#[async_trait]
pub trait PageDriver: Send + Sync {
    /// Browser engine name (e.g., "chromium")
    fn browser_name(&self) -> &str;

    /// Navigate to a URL, failing if the navigation does not commit in time
    async fn goto(&self, url: &str, timeout_ms: u64) -> Result<()>;

    /// Wait for an element to become visible
    ///
    /// # Returns
    /// True if the element became visible, false if the wait timed out.
    /// Any other failure (closed page, bad selector) is an error.
    async fn wait_for_visible(&self, selector: &Selector, timeout_ms: u64) -> Result<bool>;

    /// Check if an element is currently visible
    async fn is_visible(&self, selector: &Selector) -> Result<bool>;

    async fn click(&self, selector: &Selector) -> Result<()>;

    /// Replace the value of an input element
    async fn fill(&self, selector: &Selector, text: &str) -> Result<()>;

    /// Focus an element and press a key (e.g., "Enter")
    async fn press(&self, selector: &Selector, key: &str) -> Result<()>;

    /// Select an `<option>` by value
    async fn select_option(&self, selector: &Selector, value: &str) -> Result<()>;

    /// Get the rendered text of the first matching element
    async fn inner_text(&self, selector: &Selector) -> Result<String>;

    /// Number of elements currently matching the selector
    async fn count(&self, selector: &Selector) -> Result<usize>;

    /// Evaluate a JavaScript function in the page with one argument
    async fn evaluate(&self, expression: &str, arg: serde_json::Value) -> Result<serde_json::Value>;

    async fn title(&self) -> Result<String>;

    async fn current_url(&self) -> Result<String>;

    /// Take a screenshot
    ///
    /// # Arguments
    /// * `path` - Where to save the screenshot; parent directories are created
    async fn take_screenshot(&self, path: &Path) -> Result<()>;

    /// Navigation timing metrics of the current document, in milliseconds
    async fn performance_metrics(&self) -> Result<HashMap<String, f64>>;

    /// Release the page and its browser
    async fn close(&self) -> Result<()>;
}
