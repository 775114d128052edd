//! Journey steps: wait-then-act helpers over a page-like handle
//!
//! Every interaction waits for its target to be visible first, with an
//! explicit timeout. A missing element becomes [`ScenarioError::Timeout`].

use std::time::Duration;

use crate::driver::common::{poll_until, PollConfig};
use crate::driver::traits::{PageDriver, Selector};
use crate::error::{ScenarioError, ScenarioResult};

pub async fn wait_visible(
    page: &dyn PageDriver,
    selector: &Selector,
    timeout_ms: u64,
) -> ScenarioResult<()> {
    if page.wait_for_visible(selector, timeout_ms).await? {
        Ok(())
    } else {
        Err(ScenarioError::timeout(selector, timeout_ms))
    }
}

pub async fn click_when_visible(
    page: &dyn PageDriver,
    selector: &Selector,
    timeout_ms: u64,
) -> ScenarioResult<()> {
    wait_visible(page, selector, timeout_ms).await?;
    page.click(selector).await?;
    Ok(())
}

pub async fn fill_when_visible(
    page: &dyn PageDriver,
    selector: &Selector,
    text: &str,
    timeout_ms: u64,
) -> ScenarioResult<()> {
    wait_visible(page, selector, timeout_ms).await?;
    page.fill(selector, text).await?;
    Ok(())
}

pub async fn press_when_visible(
    page: &dyn PageDriver,
    selector: &Selector,
    key: &str,
    timeout_ms: u64,
) -> ScenarioResult<()> {
    wait_visible(page, selector, timeout_ms).await?;
    page.press(selector, key).await?;
    Ok(())
}

pub async fn select_when_visible(
    page: &dyn PageDriver,
    selector: &Selector,
    value: &str,
    timeout_ms: u64,
) -> ScenarioResult<()> {
    wait_visible(page, selector, timeout_ms).await?;
    page.select_option(selector, value).await?;
    Ok(())
}

/// Fill several form fields in order
pub async fn fill_form(
    page: &dyn PageDriver,
    fields: &[(Selector, String)],
    timeout_ms: u64,
) -> ScenarioResult<()> {
    for (selector, value) in fields {
        fill_when_visible(page, selector, value, timeout_ms).await?;
    }
    Ok(())
}

/// Resolve the first candidate (in priority order) that is visible
///
/// Candidates are checked in order on every poll; the first visible one wins.
pub async fn first_visible(
    page: &dyn PageDriver,
    candidates: &[Selector],
    timeout_ms: u64,
) -> ScenarioResult<Selector> {
    if candidates.is_empty() {
        return Err(ScenarioError::assertion("no selector candidates given"));
    }

    let found = poll_until(
        move || async move {
            for candidate in candidates {
                match page.is_visible(candidate).await {
                    Ok(true) => return Some(candidate.clone()),
                    Ok(false) => {}
                    Err(e) => log::debug!("visibility probe for {} failed: {:#}", candidate, e),
                }
            }
            None
        },
        PollConfig::with_timeout(timeout_ms),
    )
    .await;

    match found {
        Some(selector) => {
            log::debug!("selector fallback resolved to {}", selector);
            Ok(selector)
        }
        None => Err(ScenarioError::timeout_any(candidates, timeout_ms)),
    }
}

/// Click whichever candidate becomes visible first
pub async fn click_first_visible(
    page: &dyn PageDriver,
    candidates: &[Selector],
    timeout_ms: u64,
) -> ScenarioResult<Selector> {
    let selector = first_visible(page, candidates, timeout_ms).await?;
    page.click(&selector).await?;
    Ok(selector)
}

/// Wait for an element and return its trimmed text
pub async fn text_of(
    page: &dyn PageDriver,
    selector: &Selector,
    timeout_ms: u64,
) -> ScenarioResult<String> {
    wait_visible(page, selector, timeout_ms).await?;
    Ok(page.inner_text(selector).await?.trim().to_string())
}

pub async fn expect_text(
    page: &dyn PageDriver,
    selector: &Selector,
    expected: &str,
    timeout_ms: u64,
) -> ScenarioResult<()> {
    let actual = text_of(page, selector, timeout_ms).await?;
    if actual == expected {
        Ok(())
    } else {
        Err(ScenarioError::assertion(format!(
            "expected {} to have text \"{}\", got \"{}\"",
            selector, expected, actual
        )))
    }
}

pub async fn expect_visible(
    page: &dyn PageDriver,
    selector: &Selector,
    timeout_ms: u64,
) -> ScenarioResult<()> {
    wait_visible(page, selector, timeout_ms).await
}

/// Assert at least `min` elements match, returning the actual count
pub async fn expect_count_at_least(
    page: &dyn PageDriver,
    selector: &Selector,
    min: usize,
) -> ScenarioResult<usize> {
    let count = page.count(selector).await?;
    if count >= min {
        Ok(count)
    } else {
        Err(ScenarioError::assertion(format!(
            "expected at least {} elements matching {}, found {}",
            min, selector, count
        )))
    }
}

/// Fixed sleep to let time-dependent rendering settle before observing it
pub async fn pause(ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
}
