use anyhow::Context;
use clap::Parser;
use startup_ecosystem::utils::{logger, validation::Validate};
use startup_ecosystem::{
    AppConfig, CollectArgs, CollectPipeline, EtlEngine, EtlError, HttpPageSource, LocalStorage,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CollectArgs::parse();

    let config = match args.resolve() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load configuration: {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    };

    logger::init_logger(config.log_json(), config.logging.verbose);
    tracing::info!("Starting startup collector");
    tracing::debug!("Resolved config: {:?}", config);

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    if args.dry_run {
        display_config_summary(&config);
        return Ok(());
    }

    if args.monitor {
        tracing::info!("🔍 System monitoring enabled");
    }

    let storage = LocalStorage::new(config.output.path.clone());
    let source =
        HttpPageSource::from_config(&config.source).context("failed to set up the HTTP client")?;
    let pipeline = CollectPipeline::new(storage, source, config);
    let engine = EtlEngine::new_with_monitoring(pipeline, args.monitor);

    match engine.run().await {
        Ok(summary) => {
            println!("✅ Collection complete: {}", summary);
        }
        Err(e) => exit_with(e),
    }

    Ok(())
}

fn exit_with(e: EtlError) {
    tracing::error!(
        "❌ Collection failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
    eprintln!("❌ {}", e.user_friendly_message());

    let exit_code = e.exit_code();
    if exit_code > 0 {
        std::process::exit(exit_code);
    }
}

fn display_config_summary(config: &AppConfig) {
    println!("📋 Configuration Summary:");
    println!("  Endpoint: {}", config.source.base_url);
    println!("  Location: {}", config.source.location);
    println!("  Page size: {}", config.source.page_size);
    println!("  Delay between pages: {} ms", config.source.request_delay_ms);
    println!(
        "  Retries per page: {} (base delay {} ms)",
        config.source.retry_attempts, config.source.retry_delay_ms
    );
    if let Some(timeout) = config.source.timeout_seconds {
        println!("  Request timeout: {} s", timeout);
    }
    if !config.source.headers.is_empty() {
        println!("  Extra headers: {}", config.source.headers.len());
    }
    println!("  Output: {}", config.output.path);
    println!("    {}", config.output.csv_file);
    println!("    {}", config.output.json_file);
    println!("  🔍 DRY RUN: no requests were sent");
}
