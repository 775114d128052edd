pub mod html;
pub mod json;
pub mod junit;
pub mod normalize;
pub mod status;
pub mod types;

use anyhow::Result;
use std::path::Path;

use crate::runner::state::TestSessionState;
use types::TestResults;

/// Generate report from a saved results file
pub async fn generate_report(
    results_path: &Path,
    format: &str,
    output: Option<&Path>,
) -> Result<()> {
    let results = json::load(results_path)?;

    match format {
        "json" => json::generate(&results, output).await,
        "html" => html::generate(&results, output).await,
        "junit" => {
            let xml = junit::generate_junit_xml(&results)?;
            match output {
                Some(path) => {
                    tokio::fs::write(path, xml).await?;
                    println!("JUnit report saved to: {}", path.display());
                }
                None => println!("{}", xml),
            }
            Ok(())
        }
        _ => anyhow::bail!("Unknown format: {}", format),
    }
}

/// Write the run artifacts for a finished session
///
/// `test-results.json` is always written; the HTML and JUnit reports only
/// when `full` is set.
pub async fn write_session_reports(
    session: &TestSessionState,
    output_dir: &Path,
    full: bool,
) -> Result<TestResults> {
    tokio::fs::create_dir_all(output_dir).await?;
    let results = TestResults::from_session(session);

    json::generate(&results, Some(&output_dir.join(json::RESULTS_FILE))).await?;
    if full {
        html::generate(&results, Some(&output_dir.join(html::HTML_FILE))).await?;
        junit::write_report(&results, output_dir)?;
    }

    Ok(results)
}
