use super::types::TestResults;
use anyhow::Result;
use std::path::Path;

pub const RESULTS_FILE: &str = "test-results.json";

/// Generate JSON report
pub async fn generate(results: &TestResults, output: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(results)?;

    if let Some(path) = output {
        tokio::fs::write(path, json).await?;
        println!("JSON report saved to: {}", path.display());
    } else {
        println!("{}", json);
    }

    Ok(())
}

/// Load a results file written by a previous run
pub fn load(path: &Path) -> Result<TestResults> {
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::state::{ScenarioState, TestSessionState};

    #[tokio::test]
    async fn test_written_results_load_back() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = TestSessionState::new("s1", "https://testathon.live/", "chromium");
        let mut scenario = ScenarioState::new("page_load", &["diagnostics"]);
        scenario.start();
        scenario.pass("StackDemo loaded in 812ms");
        session.add_scenario(scenario);

        let path = dir.path().join(RESULTS_FILE);
        generate(&TestResults::from_session(&session), Some(&path))
            .await
            .unwrap();

        let loaded = load(&path).unwrap();
        assert_eq!(loaded.session_id, "s1");
        assert_eq!(loaded.scenarios[0].name, "page_load");
        assert_eq!(loaded.summary.passed, 1);
    }
}
