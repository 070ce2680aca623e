pub mod file_filter;
pub mod source_collector;

pub use file_filter::SourceFilter;
pub use source_collector::{validate_directory, SourceCollector, SourceFile};
