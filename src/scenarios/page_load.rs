use async_trait::async_trait;

use super::{open_storefront, Scenario};
use crate::driver::traits::PageDriver;
use crate::error::{ScenarioError, ScenarioResult};
use crate::runner::context::ScenarioContext;
use crate::runner::steps;

pub const SCREENSHOT_FILE: &str = "page_load.png";

/// Navigation-timing diagnostics for the storefront home page
pub struct PageLoad {
    /// Pause before the screenshot so late rendering is captured
    pub settle_ms: u64,
}

impl Default for PageLoad {
    fn default() -> Self {
        Self { settle_ms: 2000 }
    }
}

#[async_trait]
impl Scenario for PageLoad {
    fn name(&self) -> &'static str {
        "page_load"
    }

    fn description(&self) -> &'static str {
        "Collect page load metrics and a diagnostics screenshot"
    }

    fn tags(&self) -> &'static [&'static str] {
        &["diagnostics", "smoke"]
    }

    async fn run(&self, page: &dyn PageDriver, ctx: &ScenarioContext) -> ScenarioResult<String> {
        open_storefront(page, ctx).await?;

        let metrics = page.performance_metrics().await?;
        let mut names: Vec<_> = metrics.keys().collect();
        names.sort();
        for name in names {
            log::info!("{} = {:.1}", name, metrics[name]);
        }

        let title = page.title().await?;
        if title.trim().is_empty() {
            return Err(ScenarioError::assertion("page title is empty"));
        }

        steps::pause(self.settle_ms).await;
        page.take_screenshot(&ctx.output_path(SCREENSHOT_FILE))
            .await?;

        let load = metrics.get("load_time_ms").copied().unwrap_or_default();
        Ok(match metrics.get("fcp_ms") {
            Some(fcp) => format!(
                "{} loaded in {:.0}ms (first contentful paint {:.0}ms)",
                title.trim(),
                load,
                fcp
            ),
            None => format!("{} loaded in {:.0}ms", title.trim(), load),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::testing::ScriptedPage;

    fn scenario() -> PageLoad {
        PageLoad { settle_ms: 0 }
    }

    #[tokio::test]
    async fn test_metrics_and_screenshot() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = ScenarioContext::new("https://testathon.live/", dir.path());
        let page = ScriptedPage::new()
            .visible(&[".shelf-container"])
            .title("StackDemo")
            .metric("load_time_ms", 812.4)
            .metric("fcp_ms", 301.0);

        let reason = scenario().run(&page, &ctx).await.unwrap();
        assert_eq!(
            reason,
            "StackDemo loaded in 812ms (first contentful paint 301ms)"
        );
        assert!(dir.path().join(SCREENSHOT_FILE).exists());
    }

    #[tokio::test]
    async fn test_empty_title_fails_before_screenshot() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = ScenarioContext::new("https://testathon.live/", dir.path());
        let page = ScriptedPage::new().visible(&[".shelf-container"]).title("  ");

        let err = scenario().run(&page, &ctx).await.unwrap_err();
        assert!(matches!(err, ScenarioError::Assertion(_)));
        assert!(!dir.path().join(SCREENSHOT_FILE).exists());
    }
}
