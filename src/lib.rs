pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod report;
pub mod utils;

pub use adapters::{HttpPageSource, LocalStorage};
pub use app::{CollectPipeline, ReportPipeline};
pub use config::AppConfig;
#[cfg(feature = "cli")]
pub use config::{CollectArgs, ReportArgs};
pub use core::etl::EtlEngine;
pub use utils::error::{EtlError, Result};
