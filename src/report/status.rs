//! Session status reporting
//!
//! Delivers a scenario's pass/fail to the cloud session dashboard through the
//! `browserstack_executor` side channel: a no-op function evaluated in the page
//! whose argument carries the command. Delivery problems are logged locally
//! and never surface to the caller.

use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::driver::traits::PageDriver;

/// Prefix the cloud grid intercepts on evaluated arguments
pub const EXECUTOR_PREFIX: &str = "browserstack_executor: ";

/// Function evaluated in the page to carry the payload
const NOOP_SCRIPT: &str = "_ => {}";

/// Final status of a scenario as seen by the session dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Passed,
    Failed,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Passed => "passed",
            SessionStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ExecutorCommand {
    pub action: String,
    pub arguments: SessionStatusArguments,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct SessionStatusArguments {
    pub status: SessionStatus,
    pub reason: String,
}

/// Build the `browserstack_executor: {...}` payload for a status update
pub fn status_payload(status: SessionStatus, reason: &str) -> String {
    let command = ExecutorCommand {
        action: "setSessionStatus".to_string(),
        arguments: SessionStatusArguments {
            status,
            reason: reason.to_string(),
        },
    };
    // Serializing a struct of strings cannot fail
    let json = serde_json::to_string(&command).unwrap_or_default();
    format!("{}{}", EXECUTOR_PREFIX, json)
}

/// Mark the remote session as passed or failed
///
/// Never fails: if the page refuses the evaluation (closed page, grid outage)
/// the status is written to the local log instead.
pub async fn mark_test_status(page: &dyn PageDriver, status: SessionStatus, reason: &str) {
    let payload = status_payload(status, reason);

    if let Err(e) = page
        .evaluate(NOOP_SCRIPT, serde_json::Value::String(payload))
        .await
    {
        log::warn!(
            "Could not deliver session status '{}' ({}): {:#}",
            status,
            reason,
            e
        );
        println!(
            "  {} Session status not delivered, recorded locally: {} - {}",
            "⚠".yellow(),
            status,
            reason
        );
    }
}

/// Local console line printed for every reported outcome
pub fn outcome_line(status: SessionStatus, reason: &str) -> String {
    let marker = match status {
        SessionStatus::Passed => "✓".green(),
        SessionStatus::Failed => "✗".red(),
    };
    format!("  {} Session status {}: {}", marker, status, reason)
}

/// Where scenario outcomes are sent besides the local console
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportMode {
    /// Deliver to the cloud session through the page
    BrowserStack,
    /// Only log the outcome locally
    #[default]
    LocalOnly,
}

/// Outcome reporter used by the scenario executor
#[derive(Debug, Clone, Copy, Default)]
pub struct StatusReporter {
    mode: ReportMode,
}

impl StatusReporter {
    pub fn new(mode: ReportMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> ReportMode {
        self.mode
    }

    pub async fn report(&self, page: &dyn PageDriver, status: SessionStatus, reason: &str) {
        log::info!("Scenario {}: {}", status, reason);
        println!("{}", outcome_line(status, reason));
        if self.mode == ReportMode::BrowserStack {
            mark_test_status(page, status, reason).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::testing::ScriptedPage;

    #[test]
    fn test_payload_shape() {
        let payload = status_payload(SessionStatus::Passed, "Search returned 3 results");
        assert_eq!(
            payload,
            r#"browserstack_executor: {"action":"setSessionStatus","arguments":{"status":"passed","reason":"Search returned 3 results"}}"#
        );
    }

    #[test]
    fn test_payload_round_trips_reason_with_double_quotes() {
        let reason = r#"Expected "1", got "2""#;
        let payload = status_payload(SessionStatus::Failed, reason);
        let json = payload.strip_prefix(EXECUTOR_PREFIX).unwrap();
        let command: ExecutorCommand = serde_json::from_str(json).unwrap();
        assert_eq!(command.action, "setSessionStatus");
        assert_eq!(command.arguments.status, SessionStatus::Failed);
        assert_eq!(command.arguments.reason, reason);
    }

    #[tokio::test]
    async fn test_mark_test_status_evaluates_payload_once() {
        let page = ScriptedPage::new();
        mark_test_status(&page, SessionStatus::Failed, "Timeout 5000ms exceeded.").await;

        let calls = page.evaluations();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "_ => {}");
        assert_eq!(
            calls[0].1,
            serde_json::Value::String(status_payload(
                SessionStatus::Failed,
                "Timeout 5000ms exceeded."
            ))
        );
    }

    #[tokio::test]
    async fn test_sink_outage_is_swallowed() {
        let page = ScriptedPage::new().failing_evaluate();
        // Must return normally even though delivery fails
        mark_test_status(&page, SessionStatus::Passed, "ok").await;
        assert_eq!(page.evaluations().len(), 1);
    }

    #[test]
    fn test_outcome_line_names_status_and_reason() {
        let line = outcome_line(SessionStatus::Failed, "Timeout 5000ms exceeded.");
        assert!(line.contains('✗'));
        assert!(line.ends_with("Session status failed: Timeout 5000ms exceeded."));

        let line = outcome_line(SessionStatus::Passed, "ok");
        assert!(line.contains('✓'));
        assert!(line.ends_with("Session status passed: ok"));
    }

    #[tokio::test]
    async fn test_local_only_mode_does_not_touch_page() {
        let page = ScriptedPage::new();
        StatusReporter::new(ReportMode::LocalOnly)
            .report(&page, SessionStatus::Passed, "ok")
            .await;
        assert!(page.evaluations().is_empty());
    }

    #[tokio::test]
    async fn test_browserstack_mode_delivers() {
        let page = ScriptedPage::new();
        StatusReporter::new(ReportMode::BrowserStack)
            .report(&page, SessionStatus::Passed, "ok")
            .await;
        assert_eq!(page.evaluations().len(), 1);
    }
}
