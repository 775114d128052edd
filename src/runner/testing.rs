//! Scripted in-memory page used by the unit tests
//!
//! Elements are plain selector strings; clicking can reveal elements or
//! change texts and counts, which is enough to walk every scenario without a
//! browser.

use anyhow::Result;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::{Arc, Mutex};

use crate::driver::traits::{PageDriver, Selector};
use crate::driver::PageFactory;

/// Effect applied to the page when an element is clicked or a key pressed
#[derive(Debug, Clone)]
pub enum Reaction {
    Show(String),
    Hide(String),
    Text(String, String),
    Count(String, usize),
}

#[derive(Default)]
struct PageState {
    visible: HashSet<String>,
    texts: HashMap<String, String>,
    counts: HashMap<String, usize>,
    reactions: HashMap<String, Vec<Reaction>>,
    actions: Vec<String>,
    evaluations: Vec<(String, serde_json::Value)>,
    metrics: HashMap<String, f64>,
    title: String,
    closed: bool,
}

#[derive(Clone, Default)]
pub struct ScriptedPage {
    state: Arc<Mutex<PageState>>,
    fail_evaluate: bool,
    fail_goto: bool,
    fail_wait: bool,
}

impl ScriptedPage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn visible(self, selectors: &[&str]) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            state
                .visible
                .extend(selectors.iter().map(|s| s.to_string()));
        }
        self
    }

    pub fn text(self, selector: &str, text: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .texts
            .insert(selector.to_string(), text.to_string());
        self
    }

    pub fn count(self, selector: &str, count: usize) -> Self {
        self.state
            .lock()
            .unwrap()
            .counts
            .insert(selector.to_string(), count);
        self
    }

    pub fn on_action(self, selector: &str, reactions: Vec<Reaction>) -> Self {
        self.state
            .lock()
            .unwrap()
            .reactions
            .entry(selector.to_string())
            .or_default()
            .extend(reactions);
        self
    }

    pub fn title(self, title: &str) -> Self {
        self.state.lock().unwrap().title = title.to_string();
        self
    }

    pub fn metric(self, name: &str, value: f64) -> Self {
        self.state
            .lock()
            .unwrap()
            .metrics
            .insert(name.to_string(), value);
        self
    }

    pub fn failing_evaluate(mut self) -> Self {
        self.fail_evaluate = true;
        self
    }

    pub fn failing_wait(mut self) -> Self {
        self.fail_wait = true;
        self
    }

    pub fn failing_goto(mut self) -> Self {
        self.fail_goto = true;
        self
    }

    pub fn actions(&self) -> Vec<String> {
        self.state.lock().unwrap().actions.clone()
    }

    pub fn evaluations(&self) -> Vec<(String, serde_json::Value)> {
        self.state.lock().unwrap().evaluations.clone()
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().unwrap().closed
    }

    fn record(&self, action: String) {
        self.state.lock().unwrap().actions.push(action);
    }

    fn require_visible(&self, selector: &Selector) -> Result<String> {
        let key = selector.to_playwright();
        if self.state.lock().unwrap().visible.contains(&key) {
            Ok(key)
        } else {
            anyhow::bail!("Element not found for selector: {}", key)
        }
    }

    fn react(&self, key: &str) {
        let mut state = self.state.lock().unwrap();
        let reactions = state.reactions.get(key).cloned().unwrap_or_default();
        for reaction in reactions {
            match reaction {
                Reaction::Show(s) => {
                    state.visible.insert(s);
                }
                Reaction::Hide(s) => {
                    state.visible.remove(&s);
                }
                Reaction::Text(s, t) => {
                    state.texts.insert(s, t);
                }
                Reaction::Count(s, n) => {
                    state.counts.insert(s, n);
                }
            }
        }
    }
}

#[async_trait]
impl PageDriver for ScriptedPage {
    fn browser_name(&self) -> &str {
        "scripted"
    }

    async fn goto(&self, url: &str, _timeout_ms: u64) -> Result<()> {
        self.record(format!("goto {}", url));
        if self.fail_goto {
            anyhow::bail!("page.goto: net::ERR_CONNECTION_REFUSED at {}\nCall log:\n  - navigating to \"{}\"", url, url);
        }
        Ok(())
    }

    async fn wait_for_visible(&self, selector: &Selector, _timeout_ms: u64) -> Result<bool> {
        if self.fail_wait {
            anyhow::bail!("Target page, context or browser has been closed");
        }
        self.is_visible(selector).await
    }

    async fn is_visible(&self, selector: &Selector) -> Result<bool> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .visible
            .contains(&selector.to_playwright()))
    }

    async fn click(&self, selector: &Selector) -> Result<()> {
        let key = self.require_visible(selector)?;
        self.record(format!("click {}", key));
        self.react(&key);
        Ok(())
    }

    async fn fill(&self, selector: &Selector, text: &str) -> Result<()> {
        let key = self.require_visible(selector)?;
        self.record(format!("fill {}={}", key, text));
        self.state.lock().unwrap().texts.insert(key, text.to_string());
        Ok(())
    }

    async fn press(&self, selector: &Selector, key: &str) -> Result<()> {
        let sel = self.require_visible(selector)?;
        self.record(format!("press {} {}", sel, key));
        self.react(&format!("{}#{}", sel, key));
        Ok(())
    }

    async fn select_option(&self, selector: &Selector, value: &str) -> Result<()> {
        let key = self.require_visible(selector)?;
        self.record(format!("select {}={}", key, value));
        Ok(())
    }

    async fn inner_text(&self, selector: &Selector) -> Result<String> {
        let key = selector.to_playwright();
        self.state
            .lock()
            .unwrap()
            .texts
            .get(&key)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("Element not found for selector: {}", key))
    }

    async fn count(&self, selector: &Selector) -> Result<usize> {
        let key = selector.to_playwright();
        let state = self.state.lock().unwrap();
        Ok(state
            .counts
            .get(&key)
            .copied()
            .unwrap_or_else(|| usize::from(state.visible.contains(&key))))
    }

    async fn evaluate(&self, expression: &str, arg: serde_json::Value) -> Result<serde_json::Value> {
        self.state
            .lock()
            .unwrap()
            .evaluations
            .push((expression.to_string(), arg));
        if self.fail_evaluate {
            anyhow::bail!("Target page, context or browser has been closed");
        }
        Ok(serde_json::Value::Null)
    }

    async fn title(&self) -> Result<String> {
        Ok(self.state.lock().unwrap().title.clone())
    }

    async fn current_url(&self) -> Result<String> {
        let state = self.state.lock().unwrap();
        let url = state
            .actions
            .iter()
            .rev()
            .find_map(|a| a.strip_prefix("goto "))
            .unwrap_or("about:blank")
            .to_string();
        Ok(url)
    }

    async fn take_screenshot(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, b"\x89PNG")?;
        self.record(format!("screenshot {}", path.display()));
        Ok(())
    }

    async fn performance_metrics(&self) -> Result<HashMap<String, f64>> {
        Ok(self.state.lock().unwrap().metrics.clone())
    }

    async fn close(&self) -> Result<()> {
        self.state.lock().unwrap().closed = true;
        Ok(())
    }
}

/// Hands out clones of one scripted page; clones share state so tests can
/// inspect what the runner did after the fact
pub struct ScriptedFactory {
    page: ScriptedPage,
    opened: Mutex<usize>,
}

impl ScriptedFactory {
    pub fn new(page: ScriptedPage) -> Self {
        Self {
            page,
            opened: Mutex::new(0),
        }
    }

    pub fn opened(&self) -> usize {
        *self.opened.lock().unwrap()
    }
}

#[async_trait]
impl PageFactory for ScriptedFactory {
    async fn open(&self) -> Result<Box<dyn PageDriver>> {
        *self.opened.lock().unwrap() += 1;
        Ok(Box::new(self.page.clone()))
    }
}
