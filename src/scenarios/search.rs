use async_trait::async_trait;

use super::Scenario;
use crate::driver::traits::{PageDriver, Selector};
use crate::error::ScenarioResult;
use crate::runner::context::ScenarioContext;
use crate::runner::steps;

const QUERY: &str = "phone";

pub struct ProductSearch;

#[async_trait]
impl Scenario for ProductSearch {
    fn name(&self) -> &'static str {
        "product_search"
    }

    fn description(&self) -> &'static str {
        "Search the catalog and expect at least one result"
    }

    fn tags(&self) -> &'static [&'static str] {
        &["search"]
    }

    async fn run(&self, page: &dyn PageDriver, ctx: &ScenarioContext) -> ScenarioResult<String> {
        page.goto(&ctx.url("/"), ctx.navigation_timeout_ms).await?;

        let input = Selector::css(".search-input");
        steps::fill_when_visible(page, &input, QUERY, 5000).await?;
        steps::press_when_visible(page, &input, "Enter", 5000).await?;

        steps::wait_visible(page, &Selector::css(".search-results"), 10000).await?;
        let found =
            steps::expect_count_at_least(page, &Selector::css(".search-results .product-item"), 1)
                .await?;

        Ok(format!("Search for '{}' returned {} results", QUERY, found))
    }
}
