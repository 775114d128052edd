use async_trait::async_trait;

use super::{add_first_product, open_storefront, Scenario};
use crate::driver::traits::{PageDriver, Selector};
use crate::error::ScenarioResult;
use crate::runner::context::ScenarioContext;
use crate::runner::steps;

pub struct Checkout;

#[async_trait]
impl Scenario for Checkout {
    fn name(&self) -> &'static str {
        "checkout"
    }

    fn description(&self) -> &'static str {
        "Buy one product through shipping and payment"
    }

    fn tags(&self) -> &'static [&'static str] {
        &["cart", "checkout"]
    }

    async fn run(&self, page: &dyn PageDriver, ctx: &ScenarioContext) -> ScenarioResult<String> {
        open_storefront(page, ctx).await?;
        let product = add_first_product(page, ctx).await?;

        steps::click_when_visible(page, &Selector::css(".checkout-btn"), 5000).await?;
        steps::wait_visible(page, &Selector::css(".checkout-form"), 5000).await?;

        // Shipping
        steps::fill_form(
            page,
            &[
                (Selector::name("shippingAddress"), "123 Test Street".to_string()),
                (Selector::name("city"), "Test City".to_string()),
                (Selector::name("zipCode"), "12345".to_string()),
            ],
            5000,
        )
        .await?;
        steps::select_when_visible(page, &Selector::name("country"), "US", 5000).await?;
        steps::click_when_visible(page, &Selector::css(".continue-to-payment"), 5000).await?;

        // Payment
        steps::wait_visible(page, &Selector::css(".payment-form"), 5000).await?;
        steps::fill_form(
            page,
            &[
                (Selector::name("cardNumber"), "4111111111111111".to_string()),
                (Selector::name("expiryDate"), "12/25".to_string()),
                (Selector::name("cvv"), "123".to_string()),
            ],
            5000,
        )
        .await?;

        steps::click_when_visible(page, &Selector::css(".place-order"), 5000).await?;
        steps::expect_visible(page, &Selector::css(".order-confirmation"), 10000).await?;

        Ok(format!("Checkout completed for {}", product))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::testing::{Reaction, ScriptedPage};
    use crate::scenarios::fixtures::storefront;

    fn shows(selectors: &[&str]) -> Vec<Reaction> {
        selectors
            .iter()
            .map(|s| Reaction::Show(s.to_string()))
            .collect()
    }

    fn checkout_page() -> ScriptedPage {
        storefront()
            .on_action(
                ".shelf-item .shelf-item__buy-btn",
                shows(&[".checkout-btn"]),
            )
            .on_action(
                ".checkout-btn",
                shows(&[
                    ".checkout-form",
                    "[name=\"shippingAddress\"]",
                    "[name=\"city\"]",
                    "[name=\"zipCode\"]",
                    "[name=\"country\"]",
                    ".continue-to-payment",
                ]),
            )
            .on_action(
                ".continue-to-payment",
                shows(&[
                    ".payment-form",
                    "[name=\"cardNumber\"]",
                    "[name=\"expiryDate\"]",
                    "[name=\"cvv\"]",
                    ".place-order",
                ]),
            )
    }

    #[tokio::test]
    async fn test_full_checkout() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = ScenarioContext::new("https://testathon.live/", dir.path());
        let page = checkout_page().on_action(".place-order", shows(&[".order-confirmation"]));

        let reason = Checkout.run(&page, &ctx).await.unwrap();
        assert_eq!(reason, "Checkout completed for iPhone 12");

        let actions = page.actions();
        assert!(actions.contains(&"select [name=\"country\"]=US".to_string()));
        assert!(actions.contains(&"fill [name=\"cvv\"]=123".to_string()));
        assert_eq!(actions.last().unwrap(), "click .place-order");
    }

    #[tokio::test]
    async fn test_missing_confirmation_times_out() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = ScenarioContext::new("https://testathon.live/", dir.path());

        let err = Checkout.run(&checkout_page(), &ctx).await.unwrap_err();
        assert!(err.is_timeout());
        assert!(err.to_string().contains(".order-confirmation"));
    }
}
