pub mod context;
pub mod events;
pub mod executor;
pub mod state;
pub mod steps;

#[cfg(test)]
pub(crate) mod testing;

use anyhow::Result;
use colored::Colorize;
use std::sync::Arc;

pub use events::*;
pub use state::*;

use crate::driver::PageFactory;
use crate::report::normalize::normalize_error;
use crate::report::status::StatusReporter;
use crate::scenarios::Scenario;
use context::ScenarioContext;
use executor::ScenarioExecutor;

/// Run scenarios across `workers` concurrent tasks
///
/// Scenarios are split into contiguous chunks, one per worker; each chunk
/// runs sequentially and every scenario gets its own page. Results come back
/// in the order the scenarios were given.
pub async fn run_scenarios(
    factory: Arc<dyn PageFactory>,
    scenarios: Vec<Arc<dyn Scenario>>,
    context: ScenarioContext,
    reporter: StatusReporter,
    workers: usize,
    emitter: EventEmitter,
    browser: &str,
) -> Result<TestSessionState> {
    let session_id = uuid::Uuid::new_v4().to_string();
    let mut session = TestSessionState::new(&session_id, &context.base_url, browser);
    session.start();

    let workers = workers.clamp(1, scenarios.len().max(1));
    emitter.emit(TestEvent::SessionStarted {
        session_id,
        scenario_count: scenarios.len(),
        workers,
    });

    let executor = Arc::new(ScenarioExecutor::new(context, reporter, emitter.clone()));
    let indexed: Vec<(usize, Arc<dyn Scenario>)> = scenarios.into_iter().enumerate().collect();

    let mut results: Vec<(usize, ScenarioState)> = Vec::new();
    if workers > 1 {
        emitter.log(format!(
            "{} Parallel execution enabled across {} workers",
            "🚀".yellow(),
            workers
        ));

        let chunk_size = indexed.len().div_ceil(workers);
        let mut handles = Vec::new();
        for chunk in indexed.chunks(chunk_size) {
            let chunk = chunk.to_vec();
            let factory = factory.clone();
            let executor = executor.clone();
            handles.push(tokio::spawn(async move {
                run_chunk(factory.as_ref(), &executor, chunk).await
            }));
        }

        for handle in handles {
            results.extend(handle.await?);
        }
    } else {
        results = run_chunk(factory.as_ref(), &executor, indexed).await;
    }

    results.sort_by_key(|(index, _)| *index);
    for (_, state) in results {
        session.add_scenario(state);
    }
    session.finish();

    emitter.emit(TestEvent::SessionFinished {
        summary: session.summary(),
    });
    Ok(session)
}

/// Run one worker's share of scenarios, each on a fresh page
async fn run_chunk(
    factory: &dyn PageFactory,
    executor: &ScenarioExecutor,
    chunk: Vec<(usize, Arc<dyn Scenario>)>,
) -> Vec<(usize, ScenarioState)> {
    let mut states = Vec::with_capacity(chunk.len());

    for (index, scenario) in chunk {
        let mut state = ScenarioState::new(scenario.name(), scenario.tags());

        let page = match factory.open().await {
            Ok(page) => page,
            Err(e) => {
                // No page means nothing to report through; record it locally
                let raw = format!("{:#}", e);
                let record = normalize_error(&raw);
                log::error!("Failed to open a page for {}: {}", scenario.name(), raw);
                state.start();
                state.fail(&record, &raw);
                executor.emitter().emit(TestEvent::ScenarioFailed {
                    name: scenario.name().to_string(),
                    error: record,
                    duration_ms: state.duration_ms.unwrap_or(0),
                });
                states.push((index, state));
                continue;
            }
        };

        if let Err(e) = executor
            .run_scenario(scenario.as_ref(), page.as_ref(), &mut state)
            .await
        {
            log::debug!("{} finished with error: {}", scenario.name(), e);
        }

        if let Err(e) = page.close().await {
            log::warn!("Failed to close page for {}: {:#}", scenario.name(), e);
        }
        states.push((index, state));
    }

    states
}
