use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::report::status::SessionStatus;

/// Scenario execution status
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ScenarioStatus {
    Pending,
    Running,
    Passed,
    Failed { error: String },
}

/// Outcome handed to the status reporter, produced once per execution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioOutcome {
    pub status: SessionStatus,
    pub reason: String,
}

impl ScenarioOutcome {
    pub fn passed(reason: impl Into<String>) -> Self {
        Self {
            status: SessionStatus::Passed,
            reason: reason.into(),
        }
    }
}

/// State for a single scenario execution
#[derive(Debug, Clone)]
pub struct ScenarioState {
    pub name: String,
    pub tags: Vec<String>,
    pub status: ScenarioStatus,
    pub reason: Option<String>,
    pub started_at: Option<Instant>,
    pub finished_at: Option<Instant>,
    pub duration_ms: Option<u64>,
    pub screenshot_path: Option<String>,
    /// Failure text as raised, before normalization
    pub raw_error: Option<String>,
}

impl ScenarioState {
    pub fn new(name: &str, tags: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            status: ScenarioStatus::Pending,
            reason: None,
            started_at: None,
            finished_at: None,
            duration_ms: None,
            screenshot_path: None,
            raw_error: None,
        }
    }

    pub fn start(&mut self) {
        self.status = ScenarioStatus::Running;
        self.started_at = Some(Instant::now());
    }

    pub fn pass(&mut self, reason: &str) {
        self.reason = Some(reason.to_string());
        self.finish(ScenarioStatus::Passed);
    }

    /// `record` is the normalized error record sent to the dashboard,
    /// `raw_error` the full failure text it was derived from
    pub fn fail(&mut self, record: &str, raw_error: &str) {
        self.reason = Some(record.to_string());
        self.raw_error = Some(raw_error.to_string());
        self.finish(ScenarioStatus::Failed {
            error: record.to_string(),
        });
    }

    fn finish(&mut self, status: ScenarioStatus) {
        self.status = status;
        self.finished_at = Some(Instant::now());
        if let Some(start) = self.started_at {
            self.duration_ms = Some(start.elapsed().as_millis() as u64);
        }
    }

    /// Serialize state for reporting (without Instant which isn't serializable)
    pub fn to_report(&self) -> ScenarioReport {
        ScenarioReport {
            name: self.name.clone(),
            tags: self.tags.clone(),
            status: self.status.clone(),
            reason: self.reason.clone(),
            duration_ms: self.duration_ms,
            screenshot_path: self.screenshot_path.clone(),
            raw_error: self.raw_error.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioReport {
    pub name: String,
    pub tags: Vec<String>,
    pub status: ScenarioStatus,
    pub reason: Option<String>,
    pub duration_ms: Option<u64>,
    pub screenshot_path: Option<String>,
    #[serde(default)]
    pub raw_error: Option<String>,
}

/// Global test session state
#[derive(Debug, Clone)]
pub struct TestSessionState {
    pub session_id: String,
    pub base_url: String,
    pub browser: String,
    pub scenarios: Vec<ScenarioState>,
    pub started_at: Option<Instant>,
    pub finished_at: Option<Instant>,
}

impl TestSessionState {
    pub fn new(session_id: &str, base_url: &str, browser: &str) -> Self {
        Self {
            session_id: session_id.to_string(),
            base_url: base_url.to_string(),
            browser: browser.to_string(),
            scenarios: Vec::new(),
            started_at: None,
            finished_at: None,
        }
    }

    pub fn start(&mut self) {
        self.started_at = Some(Instant::now());
    }

    pub fn add_scenario(&mut self, scenario: ScenarioState) {
        self.scenarios.push(scenario);
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Instant::now());
    }

    pub fn has_failures(&self) -> bool {
        self.scenarios
            .iter()
            .any(|s| matches!(s.status, ScenarioStatus::Failed { .. }))
    }

    pub fn summary(&self) -> TestSummary {
        let mut passed = 0;
        let mut failed = 0;

        for scenario in &self.scenarios {
            match scenario.status {
                ScenarioStatus::Passed => passed += 1,
                ScenarioStatus::Failed { .. } => failed += 1,
                _ => {}
            }
        }

        let total_duration_ms = self.started_at.map(|start| {
            self.finished_at
                .unwrap_or_else(Instant::now)
                .duration_since(start)
                .as_millis() as u64
        });

        TestSummary {
            session_id: self.session_id.clone(),
            total_scenarios: self.scenarios.len() as u32,
            passed,
            failed,
            total_duration_ms,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestSummary {
    pub session_id: String,
    pub total_scenarios: u32,
    pub passed: u32,
    pub failed: u32,
    pub total_duration_ms: Option<u64>,
}
