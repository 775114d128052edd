use super::types::TestResults;
use crate::runner::state::{ScenarioReport, ScenarioStatus};
use anyhow::Result;
use std::path::Path;

pub const HTML_FILE: &str = "report.html";

/// Generate HTML report
pub async fn generate(results: &TestResults, output: Option<&Path>) -> Result<()> {
    let html = generate_html(results);

    if let Some(path) = output {
        tokio::fs::write(path, html).await?;
        println!("HTML report saved to: {}", path.display());
    } else {
        println!("{}", html);
    }

    Ok(())
}

fn scenario_card(scenario: &ScenarioReport) -> String {
    let (icon, class) = match &scenario.status {
        ScenarioStatus::Passed => ("✓", "passed"),
        ScenarioStatus::Failed { .. } => ("✗", "failed"),
        ScenarioStatus::Running => ("⋯", "running"),
        ScenarioStatus::Pending => ("○", "pending"),
    };

    let tags_html: String = scenario
        .tags
        .iter()
        .map(|t| format!(r#"<span class="tag">{}</span>"#, html_escape(t)))
        .collect();

    let duration_html = scenario
        .duration_ms
        .map(|d| format!(r#"<span class="duration">{}</span>"#, format_duration(d)))
        .unwrap_or_default();

    let detail_html = match (&scenario.status, scenario.reason.as_deref()) {
        (ScenarioStatus::Failed { error }, _) => {
            let raw_html = scenario
                .raw_error
                .as_deref()
                .filter(|raw| *raw != error.as_str())
                .map(|raw| format!(r#"<pre class="raw-error">{}</pre>"#, html_escape(raw)))
                .unwrap_or_default();
            format!(
                r#"<div class="error-message">{}</div>{}"#,
                html_escape(error),
                raw_html
            )
        }
        (_, Some(reason)) => format!(r#"<div class="reason">{}</div>"#, html_escape(reason)),
        _ => String::new(),
    };

    // Screenshot paths are relative to the report, which sits in the same directory
    let screenshot_html = scenario
        .screenshot_path
        .as_deref()
        .map(|p| {
            format!(
                r#"<a class="screenshot" href="{0}"><img src="{0}" alt="failure screenshot"></a>"#,
                html_escape(p)
            )
        })
        .unwrap_or_default();

    format!(
        r#"
        <section class="scenario {class}">
            <div class="scenario-header">
                <span class="icon">{icon}</span>
                <h3>{name}</h3>
                {tags_html}
                {duration_html}
            </div>
            {detail_html}
            {screenshot_html}
        </section>"#,
        name = html_escape(&scenario.name),
    )
}

fn generate_html(results: &TestResults) -> String {
    let summary = &results.summary;
    let pass_rate = if summary.total_scenarios > 0 {
        (summary.passed as f64 / summary.total_scenarios as f64 * 100.0) as u32
    } else {
        0
    };

    let scenarios_html: String = results.scenarios.iter().map(scenario_card).collect();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>E2E Report - {session}</title>
    <style>
        :root {{
            --bg: #0f172a;
            --card: #1e293b;
            --border: #334155;
            --text: #f1f5f9;
            --muted: #94a3b8;
            --green: #22c55e;
            --red: #ef4444;
        }}
        * {{ margin: 0; padding: 0; box-sizing: border-box; }}
        body {{
            font-family: system-ui, -apple-system, sans-serif;
            background: var(--bg);
            color: var(--text);
            padding: 2rem 1rem;
        }}
        .container {{ max-width: 960px; margin: 0 auto; }}
        h1 {{ font-size: 1.75rem; margin-bottom: 0.25rem; }}
        .subtitle {{ color: var(--muted); margin-bottom: 2rem; }}
        .summary {{
            display: grid;
            grid-template-columns: repeat(4, 1fr);
            gap: 1rem;
            margin-bottom: 1.5rem;
        }}
        .stat {{
            background: var(--card);
            border: 1px solid var(--border);
            border-radius: 0.75rem;
            padding: 1rem;
        }}
        .stat-value {{ font-size: 2rem; font-weight: 700; }}
        .stat-label {{ color: var(--muted); font-size: 0.8rem; text-transform: uppercase; }}
        .stat.passed .stat-value {{ color: var(--green); }}
        .stat.failed .stat-value {{ color: var(--red); }}
        .progress {{
            height: 8px;
            background: var(--card);
            border-radius: 4px;
            overflow: hidden;
            margin-bottom: 2rem;
        }}
        .progress-fill {{ height: 100%; background: var(--green); }}
        .scenario {{
            background: var(--card);
            border: 1px solid var(--border);
            border-left-width: 4px;
            border-radius: 0.75rem;
            padding: 1rem 1.25rem;
            margin-bottom: 1rem;
        }}
        .scenario.passed {{ border-left-color: var(--green); }}
        .scenario.failed {{ border-left-color: var(--red); }}
        .scenario-header {{ display: flex; align-items: center; gap: 0.75rem; }}
        .scenario-header h3 {{ font-family: monospace; font-size: 1rem; }}
        .scenario.passed .icon {{ color: var(--green); }}
        .scenario.failed .icon {{ color: var(--red); }}
        .tag {{
            font-size: 0.7rem;
            padding: 0.1rem 0.5rem;
            border-radius: 999px;
            border: 1px solid var(--border);
            color: var(--muted);
        }}
        .duration {{ margin-left: auto; color: var(--muted); font-size: 0.8rem; }}
        .reason {{ margin-top: 0.5rem; color: var(--muted); font-size: 0.9rem; }}
        .error-message {{
            margin-top: 0.75rem;
            padding: 0.75rem;
            border-radius: 0.5rem;
            background: rgba(239, 68, 68, 0.1);
            color: #fca5a5;
            font-family: monospace;
            font-size: 0.85rem;
        }}
        .raw-error {{
            margin-top: 0.5rem;
            padding: 0.75rem;
            border-radius: 0.5rem;
            background: var(--bg);
            color: var(--muted);
            font-size: 0.8rem;
            white-space: pre-wrap;
        }}
        .screenshot img {{
            margin-top: 0.75rem;
            max-width: 100%;
            max-height: 320px;
            border-radius: 0.5rem;
            border: 1px solid var(--border);
        }}
        footer {{ margin-top: 2rem; color: var(--muted); font-size: 0.8rem; text-align: center; }}
    </style>
</head>
<body>
    <div class="container">
        <h1>E2E Test Report</h1>
        <div class="subtitle">{base_url} on {browser} · {duration}</div>

        <div class="summary">
            <div class="stat"><div class="stat-value">{total}</div><div class="stat-label">Scenarios</div></div>
            <div class="stat passed"><div class="stat-value">{passed}</div><div class="stat-label">Passed</div></div>
            <div class="stat failed"><div class="stat-value">{failed}</div><div class="stat-label">Failed</div></div>
            <div class="stat"><div class="stat-value">{pass_rate}%</div><div class="stat-label">Pass rate</div></div>
        </div>

        <div class="progress"><div class="progress-fill" style="width: {pass_rate}%"></div></div>

        {scenarios_html}

        <footer>Session {session} · Generated {generated}</footer>
    </div>
</body>
</html>"#,
        session = html_escape(&results.session_id),
        base_url = html_escape(&results.base_url),
        browser = html_escape(&results.browser),
        duration = format_duration(summary.total_duration_ms.unwrap_or(0)),
        total = summary.total_scenarios,
        passed = summary.passed,
        failed = summary.failed,
        generated = results.generated_at,
    )
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn format_duration(ms: u64) -> String {
    if ms < 1000 {
        format!("{}ms", ms)
    } else if ms < 60000 {
        format!("{}.{}s", ms / 1000, (ms % 1000) / 100)
    } else {
        format!("{}m {}s", ms / 60000, (ms % 60000) / 1000)
    }
}
