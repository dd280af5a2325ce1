pub mod collect_pipeline;
pub mod report_pipeline;

pub use collect_pipeline::{CollectPipeline, CollectedBatch};
pub use report_pipeline::ReportPipeline;
