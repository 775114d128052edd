pub mod driver;
pub mod error;
pub mod report;
pub mod runner;
pub mod scenarios;
pub mod utils;

// Re-export common items
pub use error::{ScenarioError, ScenarioResult};
pub use report::generate_report;
pub use report::normalize::normalize_error;
pub use report::status::{mark_test_status, SessionStatus, StatusReporter};
pub use runner::run_scenarios;
