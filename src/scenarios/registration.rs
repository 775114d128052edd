use async_trait::async_trait;
use rand::Rng;

use super::Scenario;
use crate::driver::traits::{PageDriver, Selector};
use crate::error::ScenarioResult;
use crate::runner::context::ScenarioContext;
use crate::runner::steps;

const PASSWORD: &str = "TestPassword123!";

pub struct UserRegistration;

/// Throwaway address so repeated runs don't collide on an existing account
pub fn random_email() -> String {
    let n: u32 = rand::thread_rng().gen_range(1000..=9999);
    format!("testuser{}@example.com", n)
}

/// Entry points to the sign-up form, most specific first
fn signup_candidates() -> Vec<Selector> {
    vec![
        Selector::css(".register-btn"),
        Selector::text("Sign In"),
        Selector::css("#signin"),
    ]
}

#[async_trait]
impl Scenario for UserRegistration {
    fn name(&self) -> &'static str {
        "user_registration"
    }

    fn description(&self) -> &'static str {
        "Register a new account with a random email"
    }

    fn tags(&self) -> &'static [&'static str] {
        &["account"]
    }

    async fn run(&self, page: &dyn PageDriver, ctx: &ScenarioContext) -> ScenarioResult<String> {
        page.goto(&ctx.url("/"), ctx.navigation_timeout_ms).await?;

        let entry = steps::click_first_visible(page, &signup_candidates(), 5000).await?;
        log::debug!("sign-up form opened through {}", entry);
        steps::wait_visible(page, &Selector::css(".registration-form"), 5000).await?;

        let email = random_email();
        steps::fill_form(
            page,
            &[
                (Selector::name("email"), email.clone()),
                (Selector::name("password"), PASSWORD.to_string()),
                (Selector::name("confirmPassword"), PASSWORD.to_string()),
                (Selector::name("firstName"), "Test".to_string()),
                (Selector::name("lastName"), "User".to_string()),
            ],
            5000,
        )
        .await?;

        steps::click_when_visible(page, &Selector::css(".register-submit"), 5000).await?;
        steps::expect_visible(page, &Selector::css(".welcome-message"), 10000).await?;

        Ok(format!("User registration successful for {}", email))
    }
}
