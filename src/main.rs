use clap::Parser;
use geo_enrich::utils::{logger, validation::Validate};
use geo_enrich::{CliConfig, EtlEngine, GeoEnrichError, GeoJsonPipeline, GooglePlacesClient, LocalStorage};

fn fail(e: &GeoEnrichError) -> ! {
    tracing::error!(
        "❌ {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());
    std::process::exit(e.exit_code().max(1));
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    logger::init_cli_logger(cli.verbose, cli.log_format);

    // a missing .env is fine; the key may come from the shell
    if let Ok(path) = dotenvy::dotenv() {
        tracing::debug!("Loaded environment from {}", path.display());
    }

    tracing::info!("Starting geo-enrich");

    let settings = match cli.resolve(|name| std::env::var(name).ok()) {
        Ok(settings) => settings,
        Err(e) => fail(&e),
    };
    if let Err(e) = settings.validate() {
        fail(&e);
    }
    tracing::debug!("Settings: {:?}", settings);

    let geocoder = GooglePlacesClient::new(settings.api_key.clone())
        .with_base_url(settings.places_base_url.clone())
        .with_timeout(settings.timeout);
    let storage = LocalStorage::new(".");
    let pipeline = GeoJsonPipeline::new(storage, settings, geocoder);
    let engine = EtlEngine::new_with_monitoring(pipeline, cli.monitor);

    match engine.run().await {
        Ok(outcome) => {
            let summary = &outcome.summary;
            println!(
                "✅ Wrote {} features to {}",
                summary.features_written(),
                outcome.output_path
            );
            if summary.limit_reached {
                println!(
                    "⚠️  API request limit reached ({} requests, max {}). Remaining rows have no location data.",
                    summary.requests_used, summary.request_limit
                );
            }
            Ok(())
        }
        Err(e) => fail(&e),
    }
}
