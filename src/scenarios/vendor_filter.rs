use async_trait::async_trait;
use regex::Regex;

use super::{open_storefront, Scenario};
use crate::driver::traits::{PageDriver, Selector};
use crate::error::{ScenarioError, ScenarioResult};
use crate::runner::context::ScenarioContext;
use crate::runner::steps;

const VENDOR: &str = "Apple";

/// Narrow the shelf to one vendor and check the product counter follows
pub struct VendorFilter {
    /// Time the shelf gets to re-render after the filter toggles
    pub settle_ms: u64,
}

impl Default for VendorFilter {
    fn default() -> Self {
        Self { settle_ms: 1000 }
    }
}

/// Parse the `"25 Product(s) found."` label
pub fn parse_products_found(label: &str) -> Option<usize> {
    let re = Regex::new(r"(\d+)\s+Product(?:\(s\)|s)?\s+found").ok()?;
    re.captures(label)?.get(1)?.as_str().parse().ok()
}

async fn products_found(page: &dyn PageDriver, timeout_ms: u64) -> ScenarioResult<usize> {
    let label = steps::text_of(page, &Selector::css(".products-found span"), timeout_ms).await?;
    parse_products_found(&label).ok_or_else(|| {
        ScenarioError::assertion(format!("unrecognized products label \"{}\"", label))
    })
}

fn vendor_toggle() -> Vec<Selector> {
    vec![
        Selector::css(&format!("input[value=\"{}\"] + .checkmark", VENDOR)),
        Selector::text(VENDOR),
    ]
}

#[async_trait]
impl Scenario for VendorFilter {
    fn name(&self) -> &'static str {
        "vendor_filter"
    }

    fn description(&self) -> &'static str {
        "Filter the shelf by vendor and verify the product count"
    }

    fn tags(&self) -> &'static [&'static str] {
        &["filter"]
    }

    async fn run(&self, page: &dyn PageDriver, ctx: &ScenarioContext) -> ScenarioResult<String> {
        open_storefront(page, ctx).await?;
        let before = products_found(page, ctx.element_timeout_ms).await?;

        steps::click_first_visible(page, &vendor_toggle(), 5000).await?;
        steps::pause(self.settle_ms).await;

        let after = products_found(page, ctx.element_timeout_ms).await?;
        if after == 0 || after >= before {
            return Err(ScenarioError::assertion(format!(
                "{} filter should narrow {} products to at least one, got {}",
                VENDOR, before, after
            )));
        }

        let shelf = page.count(&Selector::css(".shelf-item")).await?;
        if shelf != after {
            return Err(ScenarioError::assertion(format!(
                "label reports {} products but the shelf shows {}",
                after, shelf
            )));
        }

        Ok(format!(
            "{} filter narrowed {} products to {}",
            VENDOR, before, after
        ))
    }
}
