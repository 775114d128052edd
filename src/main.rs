use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use std::sync::Arc;

use testathon_e2e::driver::WebPageFactory;
use testathon_e2e::report::status::StatusReporter;
use testathon_e2e::runner::context::ScenarioContext;
use testathon_e2e::runner::{ConsoleEventListener, EventEmitter};
use testathon_e2e::utils::config::{Config, Overrides};
use testathon_e2e::{normalize_error, report, runner, scenarios};

#[derive(Parser)]
#[command(name = "testathon-e2e")]
#[command(version = "0.1.0")]
#[command(about = "End-to-end storefront journeys with session status reporting", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run scenarios against the storefront
    Run {
        /// Scenario to run. Can be specified multiple times; all when omitted.
        #[arg(long = "scenario")]
        scenarios: Vec<String>,

        /// Filter scenarios by tags (comma-separated, all must match)
        #[arg(short, long, value_delimiter = ',')]
        tags: Vec<String>,

        /// Number of concurrent workers
        #[arg(short, long)]
        workers: Option<usize>,

        /// Output directory for reports and artifacts
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Storefront base URL
        #[arg(long)]
        base_url: Option<String>,

        /// Run the browser headless
        #[arg(long, default_value = "false")]
        headless: bool,

        /// Show the browser window
        #[arg(long, default_value = "false", conflicts_with = "headless")]
        headed: bool,

        /// Browser engine (chromium, firefox, webkit)
        #[arg(long)]
        browser: Option<String>,

        /// Attach to a running browser over CDP
        #[arg(long)]
        cdp_endpoint: Option<String>,

        /// Run on BrowserStack and report outcomes to the session
        #[arg(long, default_value = "false")]
        browserstack: bool,

        /// Enable screenshot capture on failures
        #[arg(long, short = 's', default_value = "false")]
        snapshot: bool,

        /// Generate HTML and JUnit reports
        #[arg(long, default_value = "false")]
        report: bool,

        /// YAML configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// List available scenarios
    List,

    /// Generate report from test results
    Report {
        /// Path to test results JSON
        results: PathBuf,

        /// Output format (json, html, junit)
        #[arg(short, long, default_value = "html")]
        format: String,

        /// Output file path
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the error record a raw failure message is reported as
    Normalize {
        text: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            scenarios: names,
            tags,
            workers,
            output,
            base_url,
            headless,
            headed,
            browser,
            cdp_endpoint,
            browserstack,
            snapshot,
            report,
            config,
        } => {
            let overrides = Overrides {
                base_url,
                browser,
                headless: if headed {
                    Some(false)
                } else {
                    headless.then_some(true)
                },
                cdp_endpoint,
                output_dir: output,
                workers,
                snapshot: snapshot.then_some(true),
                report: report.then_some(true),
                browserstack: browserstack.then_some(true),
            };
            let config = Config::resolve(config.as_deref(), &overrides)?;
            let selected = scenarios::select(scenarios::catalog(), &names, &tags)?;

            if selected.is_empty() {
                println!("{} No scenarios match the given filters.", "ℹ".blue());
                return Ok(());
            }

            println!("{} Running against: {}", "▶".green().bold(), config.base_url.cyan());
            println!("  Browser: {}", config.browser.cyan());
            if !tags.is_empty() {
                println!("  Tags: {}", tags.join(", ").yellow());
            }
            println!("  Output: {}", config.output_dir.display().to_string().cyan());
            if config.browserstack.enabled {
                println!("  BrowserStack: {}", "Enabled".green());
            }
            if config.snapshot {
                println!("  Snapshots: {}", "Enabled".green());
            }

            let (emitter, receiver) = EventEmitter::new();
            let listener = tokio::spawn(ConsoleEventListener::listen(receiver));

            let factory = Arc::new(WebPageFactory::new(config.web_driver_config()?));
            let session = runner::run_scenarios(
                factory,
                selected,
                ScenarioContext::from_config(&config),
                StatusReporter::new(config.report_mode()),
                config.workers,
                emitter,
                &config.browser,
            )
            .await?;

            // Every emitter clone is gone, so the listener drains and exits
            let _ = listener.await;

            report::write_session_reports(&session, &config.output_dir, config.report).await?;

            if session.has_failures() {
                std::process::exit(1);
            }
        }

        Commands::List => {
            for scenario in scenarios::catalog() {
                println!(
                    "  {} {} {}",
                    scenario.name().white().bold(),
                    format!("[{}]", scenario.tags().join(", ")).dimmed(),
                    scenario.description()
                );
            }
        }

        Commands::Report {
            results,
            format,
            output,
        } => {
            println!(
                "{} Generating {} report from: {}",
                "📊".to_string().blue(),
                format.cyan(),
                results.display()
            );
            report::generate_report(&results, &format, output.as_deref()).await?;
        }

        Commands::Normalize { text } => {
            println!("{}", normalize_error(&text));
        }
    }

    Ok(())
}
