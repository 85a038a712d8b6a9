use clap::Parser;
use course_scraper::utils::error::ErrorSeverity;
use course_scraper::utils::{logger, validation::Validate};
use course_scraper::{
    CliArgs, HttpFetcher, LocalDestination, RunSummary, ScrapeConfig, ScrapeEngine, ScrapeError,
    ScraperHtmlParser,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    // 初始化日誌
    if args.log_json {
        logger::init_json_logger(args.verbose);
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("Starting course-scraper");

    // 載入並驗證配置
    let config = match args.resolve().and_then(|config| config.validate().map(|_| config)) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Configuration validation failed: {}", e);
            tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(1);
        }
    };
    tracing::debug!("Resolved config: {:?}", config);

    let destination = LocalDestination::new(&config.load);

    if args.dry_run {
        display_config_summary(&config, &destination);
        return Ok(());
    }

    let fetcher = match HttpFetcher::new(&config.source) {
        Ok(fetcher) => fetcher,
        Err(e) => exit_with(e),
    };
    let engine = ScrapeEngine::new(fetcher, ScraperHtmlParser);

    match engine.run(&config, &destination).await {
        Ok(summary) => report_summary(&summary),
        Err(e) => exit_with(e),
    }

    Ok(())
}

fn exit_with(e: ScrapeError) -> ! {
    tracing::error!(
        "❌ Scrape failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());

    let exit_code = match e.severity() {
        ErrorSeverity::Low | ErrorSeverity::High => 1,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code);
}

fn report_summary(summary: &RunSummary) {
    println!("✅ Scrape completed in {}s", summary.elapsed().num_seconds());
    println!(
        "📋 {} listings, {} duplicates dropped, {} records written",
        summary.listings_found, summary.duplicates_dropped, summary.records_emitted
    );

    if !summary.skipped.is_empty() {
        println!("⚠️ Skipped {} courses:", summary.skipped.len());
        for skipped in &summary.skipped {
            println!("  {} ({}) at {}: {}", skipped.code, skipped.url, skipped.stage, skipped.reason);
        }
    }

    for path in &summary.output_files {
        println!("📁 Output saved to: {}", path);
    }
}

fn display_config_summary(config: &ScrapeConfig, destination: &LocalDestination) {
    println!("📋 Configuration Summary:");
    println!("  Listing page: {}", config.source.listing_url);
    if let Some(base) = &config.source.base_url {
        println!("  Base URL: {}", base);
    }
    println!("  Timeout: {}s", config.source.timeout_seconds);
    println!("  Title anchor: {}", config.extract.title_anchor);
    println!("  Description anchor: {}", config.extract.description_anchor);
    println!("  Field class prefix: {}", config.extract.field_class_prefix);
    println!("  Deduplicate: {}", config.extract.deduplicate);
    if let Some(max) = config.extract.max_courses {
        println!("  Max courses: {}", max);
    }
    println!("  Formats: {}", config.load.output_formats.join(", "));
    for path in destination.planned_paths() {
        println!("  Output: {}", path.display());
    }
    println!();
    println!("🔍 DRY RUN MODE - nothing was fetched or written");
}
