use crate::runner::state::{ScenarioReport, TestSessionState, TestSummary};
use serde::{Deserialize, Serialize};

/// Test results for report generation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResults {
    pub session_id: String,
    pub base_url: String,
    pub browser: String,
    pub scenarios: Vec<ScenarioReport>,
    pub summary: TestSummary,
    pub generated_at: String,
}

impl TestResults {
    pub fn from_session(session: &TestSessionState) -> Self {
        Self {
            session_id: session.session_id.clone(),
            base_url: session.base_url.clone(),
            browser: session.browser.clone(),
            scenarios: session.scenarios.iter().map(|s| s.to_report()).collect(),
            summary: session.summary(),
            generated_at: chrono::Local::now()
                .format("%Y-%m-%d %H:%M:%S")
                .to_string(),
        }
    }
}
