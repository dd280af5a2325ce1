pub mod toml_config;

pub use toml_config::AppConfig;

#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use std::path::PathBuf;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "collect-startups")]
#[command(about = "Collects the public startup listing into CSV and JSON files")]
pub struct CollectArgs {
    /// Optional TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[arg(long)]
    pub base_url: Option<String>,

    #[arg(long)]
    pub page_size: Option<usize>,

    #[arg(long)]
    pub location: Option<String>,

    /// Pause between page requests, in milliseconds
    #[arg(long)]
    pub delay_ms: Option<u64>,

    #[arg(long)]
    pub retry_attempts: Option<u32>,

    #[arg(long)]
    pub output_path: Option<String>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log process CPU and memory per phase")]
    pub monitor: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub log_json: bool,

    /// Show the resolved configuration without sending any request
    #[arg(long)]
    pub dry_run: bool,
}

#[cfg(feature = "cli")]
impl CollectArgs {
    /// Loads the configuration file (if any) and applies command line overrides.
    pub fn resolve(&self) -> crate::Result<AppConfig> {
        let mut config = AppConfig::load(self.config.as_deref())?;

        if let Some(base_url) = &self.base_url {
            config.source.base_url = base_url.clone();
        }
        if let Some(page_size) = self.page_size {
            config.source.page_size = page_size;
        }
        if let Some(location) = &self.location {
            config.source.location = location.clone();
        }
        if let Some(delay_ms) = self.delay_ms {
            config.source.request_delay_ms = delay_ms;
        }
        if let Some(retry_attempts) = self.retry_attempts {
            config.source.retry_attempts = retry_attempts;
        }
        if let Some(output_path) = &self.output_path {
            config.output.path = output_path.clone();
        }
        if self.verbose {
            config.logging.verbose = true;
        }
        if self.log_json {
            config.logging.format = "json".to_string();
        }

        Ok(config)
    }
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "ecosystem-report")]
#[command(about = "Renders ecosystem charts from a collected startups JSON file")]
pub struct ReportArgs {
    /// Optional TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[arg(long)]
    pub output_path: Option<String>,

    /// JSON data file, relative to the output path
    #[arg(short, long)]
    pub input: Option<String>,

    #[arg(long)]
    pub charts_dir: Option<String>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log process CPU and memory per phase")]
    pub monitor: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub log_json: bool,
}

#[cfg(feature = "cli")]
impl ReportArgs {
    pub fn resolve(&self) -> crate::Result<AppConfig> {
        let mut config = AppConfig::load(self.config.as_deref())?;

        if let Some(output_path) = &self.output_path {
            config.output.path = output_path.clone();
        }
        if let Some(input) = &self.input {
            config.output.json_file = input.clone();
        }
        if let Some(charts_dir) = &self.charts_dir {
            config.output.charts_dir = charts_dir.clone();
        }
        if self.verbose {
            config.logging.verbose = true;
        }
        if self.log_json {
            config.logging.format = "json".to_string();
        }

        Ok(config)
    }
}
