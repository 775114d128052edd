//! Error types raised while a scenario drives the page

use thiserror::Error;

use crate::driver::traits::Selector;

#[derive(Error, Debug)]
pub enum ScenarioError {
    /// Rendered the way Playwright renders its own timeouts so the
    /// `Call log:` trailer is stripped by the normalizer like any other.
    #[error("Timeout {timeout_ms}ms exceeded.\nCall log:\n  - waiting for {selector} to be visible\n")]
    Timeout { selector: String, timeout_ms: u64 },

    #[error("Assertion failed: {0}")]
    Assertion(String),

    #[error(transparent)]
    Driver(#[from] anyhow::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ScenarioError {
    pub fn timeout(selector: &Selector, timeout_ms: u64) -> Self {
        ScenarioError::Timeout {
            selector: selector.to_string(),
            timeout_ms,
        }
    }

    /// Timeout over a set of alternative selectors tried in priority order
    pub fn timeout_any(selectors: &[Selector], timeout_ms: u64) -> Self {
        let joined = selectors
            .iter()
            .map(|s| s.to_string())
            .collect::<Vec<_>>()
            .join(" | ");
        ScenarioError::Timeout {
            selector: format!("any of [{}]", joined),
            timeout_ms,
        }
    }

    pub fn assertion(message: impl Into<String>) -> Self {
        ScenarioError::Assertion(message.into())
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, ScenarioError::Timeout { .. })
    }
}

pub type ScenarioResult<T> = Result<T, ScenarioError>;
