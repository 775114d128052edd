//! Storefront user journeys
//!
//! Each scenario opens its own page on the storefront and never relies on
//! state left behind by another one.

pub mod add_to_cart;
pub mod checkout;
pub mod page_load;
pub mod registration;
pub mod search;
pub mod vendor_filter;

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;

use crate::driver::traits::{PageDriver, Selector};
use crate::error::ScenarioResult;
use crate::runner::context::ScenarioContext;
use crate::runner::steps;

/// One independent end-to-end user journey
#[async_trait]
pub trait Scenario: Send + Sync {
    /// Stable identifier used on the command line and in reports
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    fn tags(&self) -> &'static [&'static str];

    /// Drive the page through the journey
    ///
    /// # Returns
    /// The human-readable reason reported with a `passed` status
    async fn run(&self, page: &dyn PageDriver, ctx: &ScenarioContext) -> ScenarioResult<String>;
}

/// Every scenario shipped with the crate, in default execution order
pub fn catalog() -> Vec<Arc<dyn Scenario>> {
    vec![
        Arc::new(add_to_cart::AddToCart),
        Arc::new(search::ProductSearch),
        Arc::new(registration::UserRegistration),
        Arc::new(checkout::Checkout),
        Arc::new(vendor_filter::VendorFilter::default()),
        Arc::new(page_load::PageLoad::default()),
    ]
}

/// Pick scenarios by name and tags
///
/// Empty `names` selects the whole catalog. A scenario must carry every tag
/// in `tags` to be kept. Unknown names are an error.
pub fn select(
    available: Vec<Arc<dyn Scenario>>,
    names: &[String],
    tags: &[String],
) -> Result<Vec<Arc<dyn Scenario>>> {
    for name in names {
        if !available.iter().any(|s| s.name() == name) {
            anyhow::bail!(
                "Scenario '{}' not found. Available scenarios: {}",
                name,
                available
                    .iter()
                    .map(|s| s.name())
                    .collect::<Vec<_>>()
                    .join(", ")
            );
        }
    }

    Ok(available
        .into_iter()
        .filter(|s| names.is_empty() || names.iter().any(|n| n == s.name()))
        .filter(|s| tags.iter().all(|t| s.tags().contains(&t.as_str())))
        .collect())
}

// ============================================================================
// Shared storefront steps
// ============================================================================

pub(crate) fn shelf() -> Selector {
    Selector::css(".shelf-container")
}

/// Navigate to the storefront home page and wait for the product shelf
pub(crate) async fn open_storefront(
    page: &dyn PageDriver,
    ctx: &ScenarioContext,
) -> ScenarioResult<()> {
    page.goto(&ctx.url("/"), ctx.navigation_timeout_ms).await?;
    steps::wait_visible(page, &shelf(), ctx.element_timeout_ms).await
}

/// Cart badge; the storefront has shipped two different class names for it
pub(crate) fn cart_badge_candidates() -> Vec<Selector> {
    vec![Selector::css(".bag__quantity"), Selector::css(".cart-count")]
}

/// Add the first product on the shelf to the cart and return its title
pub(crate) async fn add_first_product(
    page: &dyn PageDriver,
    ctx: &ScenarioContext,
) -> ScenarioResult<String> {
    let title = steps::text_of(
        page,
        &Selector::css(".shelf-item .shelf-item__title"),
        ctx.element_timeout_ms,
    )
    .await?;
    log::info!("Product: {}", title);

    steps::click_when_visible(
        page,
        &Selector::css(".shelf-item .shelf-item__buy-btn"),
        ctx.element_timeout_ms,
    )
    .await?;

    steps::first_visible(page, &cart_badge_candidates(), 5000).await?;
    Ok(title)
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::runner::testing::{Reaction, ScriptedPage};

    pub const PRODUCT: &str = "iPhone 12";

    /// Home page with one product that can be added to the cart
    pub fn storefront() -> ScriptedPage {
        ScriptedPage::new()
            .visible(&[
                ".shelf-container",
                ".shelf-item .shelf-item__title",
                ".shelf-item .shelf-item__buy-btn",
                ".bag",
            ])
            .text(".shelf-item .shelf-item__title", PRODUCT)
            .on_action(
                ".shelf-item .shelf-item__buy-btn",
                vec![
                    Reaction::Show(".bag__quantity".into()),
                    Reaction::Text(".bag__quantity".into(), "1".into()),
                ],
            )
    }
}
