pub mod orchestrator;
pub mod summary;

pub use orchestrator::{Pipeline, PipelineEvent, SourcePlan};
pub use summary::{RunReport, RunSummary};
