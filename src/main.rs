use clap::Parser;
use nairobi_scout::config::{Args, ScrapeConfig};
use nairobi_scout::context::RunContext;
use nairobi_scout::{logging, pipeline, scrapers};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ScrapeConfig::from(Args::parse());
    config.validate()?;

    let _guard = logging::init(&config)?;

    info!("🏠 Nairobi Scout");
    info!("==========================================");
    info!(
        "max_pages={} headless={} browser={} output={}",
        config.max_pages,
        config.headless,
        config.browser,
        config.output.display()
    );

    let sources = scrapers::all_sources(&config.region);
    let ctx = RunContext::new(config);
    let summary = pipeline::run(&ctx, &sources).await?;

    println!();
    println!(
        "{} unique listings ({} raw) in {:.1}s",
        summary.unique,
        summary.raw,
        summary.elapsed.as_secs_f64()
    );
    for ((source, listing_type), count) in &summary.per_source {
        println!("  {:<14} {:<5} {}", source, listing_type, count);
    }
    println!("💾 Saved to {}", ctx.config.output.display());

    Ok(())
}
