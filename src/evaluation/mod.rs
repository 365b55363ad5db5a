//! Relevance evaluation of the retrieval modes
//!
//! - [`EvaluationRunner`] retrieves and judges documents per query and mode
//! - [`ResultStore`] persists the judged results as JSON
//! - [`PerformanceReport`] summarizes average relevance per mode

mod report;
mod runner;
mod store;

pub use report::{ModePerformance, PerformanceReport};
pub use runner::EvaluationRunner;
pub use store::ResultStore;
