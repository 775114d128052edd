use std::path::{Path, PathBuf};

use crate::utils::config::Config;

/// Runtime information a scenario needs besides the page itself
#[derive(Debug, Clone)]
pub struct ScenarioContext {
    /// Storefront the journeys start from
    pub base_url: String,

    /// Output directory for screenshots and reports
    pub output_dir: PathBuf,

    /// Timeout for page navigations
    pub navigation_timeout_ms: u64,

    /// Timeout for element waits
    pub element_timeout_ms: u64,

    /// Capture a screenshot when a scenario fails
    pub snapshot_on_failure: bool,
}

impl ScenarioContext {
    pub fn new(base_url: &str, output_dir: &Path) -> Self {
        // Always ensure output directory exists
        let _ = std::fs::create_dir_all(output_dir);

        Self {
            base_url: base_url.to_string(),
            output_dir: output_dir.to_path_buf(),
            navigation_timeout_ms: 30000,
            element_timeout_ms: 10000,
            snapshot_on_failure: false,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let mut ctx = Self::new(&config.base_url, &config.output_dir);
        ctx.navigation_timeout_ms = config.navigation_timeout_ms;
        ctx.element_timeout_ms = config.default_timeout_ms;
        ctx.snapshot_on_failure = config.snapshot;
        ctx
    }

    /// Resolve a path on the storefront against the base URL
    pub fn url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else {
            format!(
                "{}/{}",
                self.base_url.trim_end_matches('/'),
                path.trim_start_matches('/')
            )
        }
    }

    /// Get the output path for a file
    pub fn output_path(&self, filename: &str) -> PathBuf {
        self.output_dir.join(filename)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joining() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = ScenarioContext::new("https://testathon.live/", dir.path());
        assert_eq!(ctx.url("/"), "https://testathon.live/");
        assert_eq!(ctx.url("checkout"), "https://testathon.live/checkout");
        assert_eq!(ctx.url("https://example.com/x"), "https://example.com/x");
    }

    #[test]
    fn test_output_dir_is_created() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("nested/output");
        let ctx = ScenarioContext::new("https://testathon.live", &out);
        assert!(out.is_dir());
        assert_eq!(ctx.output_path("page_load.png"), out.join("page_load.png"));
    }
}
