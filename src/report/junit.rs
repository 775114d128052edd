use super::types::TestResults;
use crate::runner::state::{ScenarioReport, ScenarioStatus};
use anyhow::Result;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::Cursor;
use std::path::Path;

pub const JUNIT_FILE: &str = "junit.xml";

fn seconds(ms: u64) -> String {
    (ms as f64 / 1000.0).to_string()
}

/// Generate JUnit XML report string from TestResults
pub fn generate_junit_xml(results: &TestResults) -> Result<String> {
    let mut writer = Writer::new(Cursor::new(Vec::new()));
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let total = results.scenarios.len().to_string();
    let failures = results.summary.failed.to_string();
    let skipped = "0";
    let time = seconds(
        results
            .scenarios
            .iter()
            .map(|s| s.duration_ms.unwrap_or(0))
            .sum(),
    );

    let mut suites = BytesStart::new("testsuites");
    suites.push_attribute(("name", "testathon-e2e"));
    suites.push_attribute(("tests", total.as_str()));
    suites.push_attribute(("failures", failures.as_str()));
    suites.push_attribute(("skipped", skipped));
    suites.push_attribute(("time", time.as_str()));
    writer.write_event(Event::Start(suites))?;

    // One suite per run, named after the browser it ran on
    let mut suite = BytesStart::new("testsuite");
    suite.push_attribute(("name", results.browser.as_str()));
    suite.push_attribute(("id", results.session_id.as_str()));
    suite.push_attribute(("hostname", results.base_url.as_str()));
    suite.push_attribute(("tests", total.as_str()));
    suite.push_attribute(("failures", failures.as_str()));
    suite.push_attribute(("skipped", skipped));
    suite.push_attribute(("time", time.as_str()));
    suite.push_attribute(("timestamp", results.generated_at.as_str()));
    writer.write_event(Event::Start(suite))?;

    for scenario in &results.scenarios {
        write_test_case(&mut writer, scenario)?;
    }

    writer.write_event(Event::End(BytesEnd::new("testsuite")))?;
    writer.write_event(Event::End(BytesEnd::new("testsuites")))?;

    Ok(String::from_utf8(writer.into_inner().into_inner())?)
}

fn write_test_case<W: std::io::Write>(
    writer: &mut Writer<W>,
    scenario: &ScenarioReport,
) -> Result<()> {
    // Tags become the class name so CI dashboards group related journeys
    let classname = if scenario.tags.is_empty() {
        "scenarios".to_string()
    } else {
        format!("scenarios.{}", scenario.tags.join("."))
    };
    let time = seconds(scenario.duration_ms.unwrap_or(0));

    let mut case = BytesStart::new("testcase");
    case.push_attribute(("name", scenario.name.as_str()));
    case.push_attribute(("classname", classname.as_str()));
    case.push_attribute(("time", time.as_str()));
    writer.write_event(Event::Start(case))?;

    if let ScenarioStatus::Failed { error } = &scenario.status {
        let kind = if error.starts_with("Timeout") {
            "TimeoutError"
        } else {
            "AssertionError"
        };
        let mut failure = BytesStart::new("failure");
        failure.push_attribute(("message", error.as_str()));
        failure.push_attribute(("type", kind));
        writer.write_event(Event::Start(failure))?;
        // The body carries the full text, call log included
        let body = scenario.raw_error.as_deref().unwrap_or(error);
        writer.write_event(Event::Text(BytesText::new(body)))?;
        writer.write_event(Event::End(BytesEnd::new("failure")))?;
    }

    if let Some(reason) = scenario
        .reason
        .as_deref()
        .filter(|_| scenario.status == ScenarioStatus::Passed)
    {
        writer.write_event(Event::Start(BytesStart::new("system-out")))?;
        writer.write_event(Event::Text(BytesText::new(reason)))?;
        writer.write_event(Event::End(BytesEnd::new("system-out")))?;
    }

    writer.write_event(Event::End(BytesEnd::new("testcase")))?;
    Ok(())
}

/// Write report to file
pub fn write_report(results: &TestResults, output_dir: &Path) -> Result<()> {
    let xml = generate_junit_xml(results)?;
    let path = output_dir.join(JUNIT_FILE);
    std::fs::write(&path, xml)?;
    println!("    Generated JUnit report: {}", path.display());
    Ok(())
}
