use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::driver::web::{BrowserType, WebDriverConfig};
use crate::report::status::ReportMode;

pub const DEFAULT_BASE_URL: &str = "https://testathon.live/";
const BROWSERSTACK_CDP: &str = "wss://cdp.browserstack.com/playwright";

/// Application configuration
///
/// Layered as defaults, then an optional YAML file, then environment
/// variables, then command line flags.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storefront under test
    pub base_url: String,

    pub browser: String,

    pub headless: bool,

    /// Remote browser to attach to instead of launching one
    pub cdp_endpoint: Option<String>,

    /// Output directory for screenshots and reports
    pub output_dir: PathBuf,

    /// Number of concurrent scenario workers
    pub workers: usize,

    /// Default timeout for element waiting (ms)
    pub default_timeout_ms: u64,

    /// Timeout for page navigations (ms)
    pub navigation_timeout_ms: u64,

    /// Screenshot on failure
    pub snapshot: bool,

    /// Write HTML and JUnit reports next to the JSON results
    pub report: bool,

    pub browserstack: BrowserStackConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            browser: "chromium".to_string(),
            headless: true,
            cdp_endpoint: None,
            output_dir: PathBuf::from("./output"),
            workers: 1,
            default_timeout_ms: 10000,
            navigation_timeout_ms: 30000,
            snapshot: false,
            report: false,
            browserstack: BrowserStackConfig::default(),
        }
    }
}

/// Remote session settings for BrowserStack
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserStackConfig {
    pub enabled: bool,
    pub username: Option<String>,
    pub access_key: Option<String>,
    pub os: String,
    pub os_version: String,
    pub browser_version: String,
    pub build_name: String,
    pub project_name: String,
}

impl Default for BrowserStackConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            username: None,
            access_key: None,
            os: "Windows".to_string(),
            os_version: "11".to_string(),
            browser_version: "latest".to_string(),
            build_name: "testathon-e2e".to_string(),
            project_name: "Testathon".to_string(),
        }
    }
}

/// Values given on the command line; `None` leaves the config untouched
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub base_url: Option<String>,
    pub browser: Option<String>,
    pub headless: Option<bool>,
    pub cdp_endpoint: Option<String>,
    pub output_dir: Option<PathBuf>,
    pub workers: Option<usize>,
    pub snapshot: Option<bool>,
    pub report: Option<bool>,
    pub browserstack: Option<bool>,
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl Config {
    /// Load configuration from a YAML file
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        serde_yaml::from_str(&raw)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Build the effective configuration for a run
    pub fn resolve(path: Option<&Path>, overrides: &Overrides) -> Result<Self> {
        let mut config = match path {
            Some(p) => Self::load(p)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        config.apply_overrides(overrides);
        config.validate()?;
        Ok(config)
    }

    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("TESTATHON_BASE_URL") {
            self.base_url = url;
        }
        match lookup("TESTATHON_HEADLESS").as_deref().map(parse_bool) {
            Some(Some(headless)) => self.headless = headless,
            Some(None) => log::warn!("Ignoring TESTATHON_HEADLESS: expected true or false"),
            None => {}
        }
        if let Some(endpoint) = lookup("TESTATHON_CDP_ENDPOINT") {
            self.cdp_endpoint = Some(endpoint);
        }
        if let Some(output) = lookup("TESTATHON_OUTPUT") {
            self.output_dir = PathBuf::from(output);
        }
        if let Some(user) = lookup("BROWSERSTACK_USERNAME") {
            self.browserstack.username = Some(user);
        }
        if let Some(key) = lookup("BROWSERSTACK_ACCESS_KEY") {
            self.browserstack.access_key = Some(key);
        }
        if let Some(build) = lookup("BROWSERSTACK_BUILD_NAME") {
            self.browserstack.build_name = build;
        }
    }

    pub fn apply_overrides(&mut self, overrides: &Overrides) {
        if let Some(url) = &overrides.base_url {
            self.base_url = url.clone();
        }
        if let Some(browser) = &overrides.browser {
            self.browser = browser.clone();
        }
        if let Some(headless) = overrides.headless {
            self.headless = headless;
        }
        if let Some(endpoint) = &overrides.cdp_endpoint {
            self.cdp_endpoint = Some(endpoint.clone());
        }
        if let Some(dir) = &overrides.output_dir {
            self.output_dir = dir.clone();
        }
        if let Some(workers) = overrides.workers {
            self.workers = workers;
        }
        if let Some(snapshot) = overrides.snapshot {
            self.snapshot = snapshot;
        }
        if let Some(report) = overrides.report {
            self.report = report;
        }
        if let Some(enabled) = overrides.browserstack {
            self.browserstack.enabled = enabled;
        }
    }

    pub fn validate(&self) -> Result<()> {
        let browser = BrowserType::parse(&self.browser)?;
        if self.workers == 0 {
            anyhow::bail!("workers must be at least 1");
        }
        if self.browserstack.enabled
            && (self.browserstack.username.is_none() || self.browserstack.access_key.is_none())
        {
            anyhow::bail!(
                "BrowserStack is enabled but BROWSERSTACK_USERNAME or BROWSERSTACK_ACCESS_KEY is not set"
            );
        }
        // Remote browsers are attached over CDP, which only chromium speaks
        if browser != BrowserType::Chromium
            && (self.browserstack.enabled || self.cdp_endpoint.is_some())
        {
            anyhow::bail!(
                "{} cannot run over CDP; use --browser chromium with BrowserStack or --cdp-endpoint",
                browser.as_str()
            );
        }
        Ok(())
    }

    pub fn report_mode(&self) -> ReportMode {
        if self.browserstack.enabled {
            ReportMode::BrowserStack
        } else {
            ReportMode::LocalOnly
        }
    }

    /// Remote CDP endpoint with BrowserStack capabilities url-encoded into it
    pub fn browserstack_endpoint(&self) -> Option<String> {
        let bs = &self.browserstack;
        let (username, access_key) = (bs.username.as_ref()?, bs.access_key.as_ref()?);

        let caps = serde_json::json!({
            "browser": "chrome",
            "browser_version": bs.browser_version,
            "os": bs.os,
            "os_version": bs.os_version,
            "name": "Testathon E2E",
            "build": bs.build_name,
            "project": bs.project_name,
            "browserstack.username": username,
            "browserstack.accessKey": access_key,
        });

        Some(format!(
            "{}?caps={}",
            BROWSERSTACK_CDP,
            urlencoding::encode(&caps.to_string())
        ))
    }

    /// Browser settings for the page factory
    ///
    /// An explicit CDP endpoint wins over the BrowserStack one.
    pub fn web_driver_config(&self) -> Result<WebDriverConfig> {
        let cdp_endpoint = match &self.cdp_endpoint {
            Some(endpoint) => Some(endpoint.clone()),
            None if self.browserstack.enabled => Some(
                self.browserstack_endpoint()
                    .context("BrowserStack credentials are missing")?,
            ),
            None => None,
        };

        Ok(WebDriverConfig {
            browser_type: BrowserType::parse(&self.browser)?,
            headless: self.headless,
            cdp_endpoint,
            ..WebDriverConfig::default()
        })
    }
}
