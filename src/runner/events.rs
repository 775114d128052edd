use super::state::TestSummary;
use tokio::sync::broadcast;

/// Test execution events for real-time updates
#[derive(Debug, Clone)]
pub enum TestEvent {
    // Session events
    SessionStarted {
        session_id: String,
        scenario_count: usize,
        workers: usize,
    },
    SessionFinished {
        summary: TestSummary,
    },

    // Scenario events
    ScenarioStarted {
        name: String,
        description: String,
    },
    ScenarioPassed {
        name: String,
        reason: String,
        duration_ms: u64,
    },
    ScenarioFailed {
        name: String,
        error: String,
        duration_ms: u64,
    },

    // Log event for coordinated output
    Log {
        message: String,
    },
}

/// Event emitter for broadcasting test events
#[derive(Clone)]
pub struct EventEmitter {
    sender: broadcast::Sender<TestEvent>,
}

impl EventEmitter {
    pub fn new() -> (Self, broadcast::Receiver<TestEvent>) {
        let (sender, receiver) = broadcast::channel(100);
        (Self { sender }, receiver)
    }

    pub fn emit(&self, event: TestEvent) {
        let _ = self.sender.send(event);
    }

    pub fn log(&self, message: impl Into<String>) {
        self.emit(TestEvent::Log {
            message: message.into(),
        });
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TestEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventEmitter {
    fn default() -> Self {
        let (sender, _) = broadcast::channel(100);
        Self { sender }
    }
}

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::time::Duration as StdDuration;

/// Console event listener for printing real-time updates
pub struct ConsoleEventListener;

impl ConsoleEventListener {
    pub async fn listen(mut receiver: broadcast::Receiver<TestEvent>) {
        use colored::Colorize;
        use indicatif::ProgressDrawTarget;
        use std::io::IsTerminal;

        // Hidden draw target when piped, to avoid terminal escape codes
        let multi = if std::io::stdout().is_terminal() {
            MultiProgress::new()
        } else {
            MultiProgress::with_draw_target(ProgressDrawTarget::hidden())
        };

        // Scenarios may run on several workers at once, so spinners are keyed by name
        let mut spinners: HashMap<String, ProgressBar> = HashMap::new();

        loop {
            let event = match receiver.recv().await {
                Ok(event) => event,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    log::warn!("console listener skipped {} events", skipped);
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => break,
            };

            match event {
                TestEvent::SessionStarted {
                    session_id,
                    scenario_count,
                    workers,
                } => {
                    multi
                        .println(format!(
                            "\n{} Test session started: {} ({} scenarios, {} worker{})",
                            "▶".green().bold(),
                            session_id.cyan(),
                            scenario_count,
                            workers,
                            if workers == 1 { "" } else { "s" }
                        ))
                        .ok();
                }

                TestEvent::SessionFinished { summary } => {
                    for (_, pb) in spinners.drain() {
                        pb.finish_and_clear();
                    }

                    println!("\n{} Test session finished", "■".blue().bold());
                    println!("  Total scenarios: {}", summary.total_scenarios);
                    println!(
                        "  {} passed, {} failed",
                        summary.passed.to_string().green(),
                        summary.failed.to_string().red()
                    );
                    if let Some(duration) = summary.total_duration_ms {
                        println!("  Duration: {}ms", duration);
                    }
                }

                TestEvent::ScenarioStarted { name, description } => {
                    let pb = multi.add(ProgressBar::new_spinner());
                    if let Ok(style) = ProgressStyle::default_spinner()
                        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ ")
                        .template("  {spinner} {msg}")
                    {
                        pb.set_style(style);
                    }
                    pb.set_message(format!("{} {}", name.white().bold(), description.dimmed()));
                    pb.enable_steady_tick(StdDuration::from_millis(100));
                    spinners.insert(name, pb);
                }

                TestEvent::ScenarioPassed {
                    name,
                    reason,
                    duration_ms,
                } => {
                    if let Some(pb) = spinners.remove(&name) {
                        pb.finish_and_clear();
                    }
                    println!(
                        "  {} {} {} ({}ms)",
                        "✓".green(),
                        name.white().bold(),
                        reason,
                        duration_ms
                    );
                }

                TestEvent::ScenarioFailed {
                    name,
                    error,
                    duration_ms,
                } => {
                    if let Some(pb) = spinners.remove(&name) {
                        pb.finish_and_clear();
                    }
                    println!(
                        "  {} {} {} ({}ms)",
                        "✗".red(),
                        name.white().bold(),
                        error.red(),
                        duration_ms
                    );
                }

                TestEvent::Log { message } => {
                    multi.println(format!("      {}", message)).ok();
                }
            }
        }
    }
}
