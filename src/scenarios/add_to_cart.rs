use async_trait::async_trait;

use super::{add_first_product, cart_badge_candidates, open_storefront, Scenario};
use crate::driver::traits::{PageDriver, Selector};
use crate::error::{ScenarioError, ScenarioResult};
use crate::runner::context::ScenarioContext;
use crate::runner::steps;

/// Add the first shelf product and find it in the cart
pub struct AddToCart;

#[async_trait]
impl Scenario for AddToCart {
    fn name(&self) -> &'static str {
        "add_to_cart"
    }

    fn description(&self) -> &'static str {
        "Add the first product to the cart and verify it is listed"
    }

    fn tags(&self) -> &'static [&'static str] {
        &["cart", "smoke"]
    }

    async fn run(&self, page: &dyn PageDriver, ctx: &ScenarioContext) -> ScenarioResult<String> {
        open_storefront(page, ctx).await?;
        let product = add_first_product(page, ctx).await?;

        let badge = steps::first_visible(page, &cart_badge_candidates(), 5000).await?;
        steps::expect_text(page, &badge, "1", 5000).await?;

        steps::click_first_visible(
            page,
            &[Selector::css(".bag"), Selector::css(".cart-icon")],
            5000,
        )
        .await?;
        steps::first_visible(
            page,
            &[
                Selector::css(".float-cart__content"),
                Selector::css(".mini-cart"),
            ],
            5000,
        )
        .await?;

        let item = steps::first_visible(
            page,
            &[
                Selector::css(".float-cart__shelf-container .shelf-item__details .title"),
                Selector::css(".mini-cart .product-name"),
            ],
            5000,
        )
        .await?;
        let in_cart = steps::text_of(page, &item, 5000).await?;
        if in_cart != product {
            return Err(ScenarioError::assertion(format!(
                "cart lists \"{}\" instead of \"{}\"",
                in_cart, product
            )));
        }

        Ok(format!("Successfully added {} to cart", product))
    }
}
