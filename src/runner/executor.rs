use colored::Colorize;
use uuid::Uuid;

use super::context::ScenarioContext;
use super::events::{EventEmitter, TestEvent};
use super::state::{ScenarioOutcome, ScenarioState};
use crate::driver::common::safe_file_stem;
use crate::driver::traits::PageDriver;
use crate::error::ScenarioResult;
use crate::report::normalize::normalize_error;
use crate::report::status::{SessionStatus, StatusReporter};
use crate::scenarios::Scenario;

/// Runs scenarios on a page and reports every outcome exactly once
pub struct ScenarioExecutor {
    context: ScenarioContext,
    reporter: StatusReporter,
    emitter: EventEmitter,
}

impl ScenarioExecutor {
    pub fn new(context: ScenarioContext, reporter: StatusReporter, emitter: EventEmitter) -> Self {
        Self {
            context,
            reporter,
            emitter,
        }
    }

    pub fn emitter(&self) -> &EventEmitter {
        &self.emitter
    }

    /// Execute one scenario
    ///
    /// The outcome is reported before returning. On failure the normalized
    /// record is reported as `failed` and the original error is handed back
    /// so the caller sees the failure too.
    pub async fn run_scenario(
        &self,
        scenario: &dyn Scenario,
        page: &dyn PageDriver,
        state: &mut ScenarioState,
    ) -> ScenarioResult<ScenarioOutcome> {
        state.start();
        self.emitter.emit(TestEvent::ScenarioStarted {
            name: scenario.name().to_string(),
            description: scenario.description().to_string(),
        });

        match scenario.run(page, &self.context).await {
            Ok(reason) => {
                let outcome = ScenarioOutcome::passed(reason);
                self.reporter
                    .report(page, outcome.status, &outcome.reason)
                    .await;
                state.pass(&outcome.reason);

                self.emitter.emit(TestEvent::ScenarioPassed {
                    name: scenario.name().to_string(),
                    reason: outcome.reason.clone(),
                    duration_ms: state.duration_ms.unwrap_or(0),
                });
                Ok(outcome)
            }
            Err(err) => {
                let raw = err.to_string();
                let record = normalize_error(&raw);
                let url = page.current_url().await.unwrap_or_default();
                log::warn!(
                    "{} failed on {} at {}: {:?}",
                    scenario.name(),
                    page.browser_name(),
                    url,
                    err
                );

                if self.context.snapshot_on_failure {
                    state.screenshot_path = self.capture_failure(scenario.name(), page).await;
                }

                self.reporter
                    .report(page, SessionStatus::Failed, &record)
                    .await;
                state.fail(&record, &raw);

                self.emitter.emit(TestEvent::ScenarioFailed {
                    name: scenario.name().to_string(),
                    error: record,
                    duration_ms: state.duration_ms.unwrap_or(0),
                });
                Err(err)
            }
        }
    }

    /// Save a failure screenshot, returning its path relative to the output dir
    async fn capture_failure(&self, scenario_name: &str, page: &dyn PageDriver) -> Option<String> {
        let uuid = Uuid::new_v4().to_string();
        let timestamp = chrono::Local::now().format("%H%M%S");
        let filename = format!(
            "fail_{}_{}_{}.png",
            safe_file_stem(scenario_name),
            timestamp,
            &uuid[..8]
        );
        let path = self.context.output_path(&filename);

        match page.take_screenshot(&path).await {
            Ok(()) => {
                self.emitter.log(format!(
                    "{} Saved Screenshot: {}",
                    "📸".green(),
                    path.display()
                ));
                Some(filename)
            }
            Err(e) => {
                self.emitter
                    .log(format!("{} Failed to take screenshot: {}", "⚠".yellow(), e));
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ScenarioError;
    use crate::report::status::{status_payload, ReportMode};
    use crate::runner::state::ScenarioStatus;
    use crate::runner::testing::ScriptedPage;
    use async_trait::async_trait;

    struct Passing;

    #[async_trait]
    impl Scenario for Passing {
        fn name(&self) -> &'static str {
            "passing"
        }
        fn description(&self) -> &'static str {
            "always passes"
        }
        fn tags(&self) -> &'static [&'static str] {
            &[]
        }
        async fn run(&self, _page: &dyn PageDriver, _ctx: &ScenarioContext) -> ScenarioResult<String> {
            Ok("all good".to_string())
        }
    }

    struct TimingOut;

    #[async_trait]
    impl Scenario for TimingOut {
        fn name(&self) -> &'static str {
            "timing_out"
        }
        fn description(&self) -> &'static str {
            "waits for an element that never shows"
        }
        fn tags(&self) -> &'static [&'static str] {
            &[]
        }
        async fn run(&self, _page: &dyn PageDriver, _ctx: &ScenarioContext) -> ScenarioResult<String> {
            Err(ScenarioError::Timeout {
                selector: "'.cart-count'".to_string(),
                timeout_ms: 5000,
            })
        }
    }

    fn executor(dir: &std::path::Path, snapshot: bool) -> ScenarioExecutor {
        let mut ctx = ScenarioContext::new("https://testathon.live/", dir);
        ctx.snapshot_on_failure = snapshot;
        ScenarioExecutor::new(
            ctx,
            StatusReporter::new(ReportMode::BrowserStack),
            EventEmitter::default(),
        )
    }

    fn reported(page: &ScriptedPage) -> Vec<serde_json::Value> {
        page.evaluations().into_iter().map(|(_, arg)| arg).collect()
    }

    #[tokio::test]
    async fn test_pass_reports_passed_exactly_once() {
        let dir = tempfile::tempdir().unwrap();
        let page = ScriptedPage::new();
        let mut state = ScenarioState::new("passing", &[]);

        let outcome = executor(dir.path(), false)
            .run_scenario(&Passing, &page, &mut state)
            .await
            .unwrap();

        assert_eq!(outcome, ScenarioOutcome::passed("all good"));
        assert_eq!(
            reported(&page),
            vec![serde_json::Value::String(status_payload(
                SessionStatus::Passed,
                "all good"
            ))]
        );
        assert_eq!(state.status, ScenarioStatus::Passed);
    }

    #[tokio::test]
    async fn test_failure_reports_normalized_record_then_propagates() {
        let dir = tempfile::tempdir().unwrap();
        let page = ScriptedPage::new();
        let mut state = ScenarioState::new("timing_out", &[]);

        let err = executor(dir.path(), false)
            .run_scenario(&TimingOut, &page, &mut state)
            .await
            .unwrap_err();

        // The original error comes back untouched
        assert!(err.is_timeout());
        assert!(err.to_string().contains("Call log:"));

        assert_eq!(
            reported(&page),
            vec![serde_json::Value::String(status_payload(
                SessionStatus::Failed,
                "Timeout 5000ms exceeded."
            ))]
        );
        assert_eq!(
            state.status,
            ScenarioStatus::Failed {
                error: "Timeout 5000ms exceeded.".to_string()
            }
        );
        // The full text, trailer included, is kept for the reports
        assert_eq!(state.raw_error, Some(err.to_string()));
        assert!(state
            .raw_error
            .as_deref()
            .is_some_and(|raw| raw.contains("waiting for '.cart-count' to be visible")));
    }

    #[tokio::test]
    async fn test_sink_outage_does_not_change_outcome() {
        let dir = tempfile::tempdir().unwrap();
        let page = ScriptedPage::new().failing_evaluate();

        let mut state = ScenarioState::new("passing", &[]);
        let outcome = executor(dir.path(), false)
            .run_scenario(&Passing, &page, &mut state)
            .await;
        assert!(outcome.is_ok());

        let mut state = ScenarioState::new("timing_out", &[]);
        let failed = executor(dir.path(), false)
            .run_scenario(&TimingOut, &page, &mut state)
            .await;
        assert!(matches!(failed, Err(ScenarioError::Timeout { .. })));
    }

    #[tokio::test]
    async fn test_failure_screenshot_is_captured() {
        let dir = tempfile::tempdir().unwrap();
        let page = ScriptedPage::new();
        let mut state = ScenarioState::new("timing_out", &[]);

        let _ = executor(dir.path(), true)
            .run_scenario(&TimingOut, &page, &mut state)
            .await;

        let file = state.screenshot_path.expect("screenshot recorded");
        assert!(file.starts_with("fail_timing_out_"));
        assert!(dir.path().join(&file).exists());
    }
}
