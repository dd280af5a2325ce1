pub mod pipelines;

pub use pipelines::{CollectPipeline, ReportPipeline};
