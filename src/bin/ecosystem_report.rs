use clap::Parser;
use startup_ecosystem::utils::{logger, validation::Validate};
use startup_ecosystem::{EtlEngine, LocalStorage, ReportArgs, ReportPipeline};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = ReportArgs::parse();

    let config = match args.resolve() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load configuration: {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    };

    logger::init_logger(config.log_json(), config.logging.verbose);
    tracing::info!("Starting ecosystem report");

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let storage = LocalStorage::new(config.output.path.clone());
    let settings = config.report.settings();
    let pipeline = ReportPipeline::new(storage, config, settings);
    let engine = EtlEngine::new_with_monitoring(pipeline, args.monitor);

    match engine.run().await {
        Ok(summary) => println!("✅ Report complete: {}", summary),
        Err(e) => {
            tracing::error!(
                "❌ Report failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            let exit_code = e.exit_code();
            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}
