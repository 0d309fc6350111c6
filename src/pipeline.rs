//! One full crawl: every source and listing type, then dedup and output

use crate::context::RunContext;
use crate::dedup::dedup;
use crate::fetch::{BrowserSession, Engine, Fetcher, HttpFetcher};
use crate::models::{ListingRecord, ListingType};
use crate::pagination::Paginator;
use crate::scrapers::ListingScraper;
use crate::writer;
use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{error, info, warn};

const LISTING_TYPES: [ListingType; 2] = [ListingType::Sale, ListingType::Rent];

/// Counts reported at the end of a run
#[derive(Debug, Default)]
pub struct RunSummary {
    pub raw: usize,
    pub unique: usize,
    pub elapsed: Duration,
    /// Records collected per (source, listing type), before dedup
    pub per_source: BTreeMap<(String, ListingType), usize>,
}

impl RunSummary {
    pub fn log(&self) {
        info!("{}", "=".repeat(55));
        info!("Raw: {} | Unique: {}", self.raw, self.unique);
        info!("Time: {:.1}s", self.elapsed.as_secs_f64());
        for ((source, listing_type), count) in &self.per_source {
            info!("  {:<14} {:<5} {}", source, listing_type, count);
        }
        info!("{}", "=".repeat(55));
    }
}

/// Accumulates records across source runs
struct Collector<'a> {
    ctx: &'a RunContext,
    records: Vec<ListingRecord>,
    per_source: BTreeMap<(String, ListingType), usize>,
    runs: usize,
}

impl<'a> Collector<'a> {
    fn new(ctx: &'a RunContext) -> Self {
        Self {
            ctx,
            records: Vec::new(),
            per_source: BTreeMap::new(),
            runs: 0,
        }
    }

    /// Crawl every query of one source/type with `fetcher`
    async fn run(
        &mut self,
        scraper: &dyn ListingScraper,
        fetcher: &dyn Fetcher,
        listing_type: ListingType,
    ) {
        if self.runs > 0 {
            self.ctx.politeness.pause().await;
        }
        self.runs += 1;

        info!("[{}] {}", scraper.source_name(), listing_type);
        let paginator = Paginator::new(self.ctx);
        let mut collected = 0;
        // One page budget for the whole source/type, however many queries
        let mut budget = self.ctx.config.max_pages;
        for (i, query) in scraper.queries(listing_type).iter().enumerate() {
            if budget == 0 {
                info!("  page limit reached, skipping {}", query);
                continue;
            }
            if i > 0 {
                self.ctx.politeness.pause().await;
            }
            let report = paginator
                .crawl(scraper, fetcher, listing_type, query, budget)
                .await;
            budget = budget.saturating_sub(report.attempts);
            collected += report.records.len();
            self.records.extend(report.records);
        }

        info!("[{}] {}: {} listings", scraper.source_name(), listing_type, collected);
        *self
            .per_source
            .entry((scraper.source_name().to_string(), listing_type))
            .or_default() += collected;
    }

    /// Record an empty result for a source that could not run at all
    fn skipped(&mut self, scraper: &dyn ListingScraper) {
        for listing_type in LISTING_TYPES {
            self.per_source
                .entry((scraper.source_name().to_string(), listing_type))
                .or_default();
        }
    }
}

/// Crawl `scrapers` in order and return every record collected, raw.
/// Source failures only shrink the result; they never end the run.
pub async fn collect(
    ctx: &RunContext,
    scrapers: &[Box<dyn ListingScraper>],
) -> (Vec<ListingRecord>, BTreeMap<(String, ListingType), usize>) {
    let config = &ctx.config;
    let mut collector = Collector::new(ctx);
    let selected: Vec<&dyn ListingScraper> = scrapers
        .iter()
        .map(|s| &**s)
        .filter(|s| config.wants_source(s.source_name()))
        .collect();

    for scraper in selected.iter().filter(|s| s.engine() == Engine::Http) {
        for listing_type in LISTING_TYPES {
            match HttpFetcher::new(&scraper.header_overlay(), config.http_timeout()) {
                Ok(fetcher) => collector.run(*scraper, &fetcher, listing_type).await,
                Err(e) => error!("[{}] {:#}", scraper.source_name(), e),
            }
        }
    }

    let browser_sources: Vec<&dyn ListingScraper> = selected
        .iter()
        .copied()
        .filter(|s| s.engine() == Engine::Browser)
        .collect();
    if !browser_sources.is_empty() {
        if !config.browser {
            warn!("Browser disabled; skipping {} source(s)", browser_sources.len());
            browser_sources.iter().for_each(|s| collector.skipped(*s));
        } else {
            match launch_browser(ctx).await {
                Ok(session) => {
                    for scraper in &browser_sources {
                        for listing_type in LISTING_TYPES {
                            collector.run(*scraper, &session, listing_type).await;
                        }
                    }
                }
                Err(e) => {
                    error!("Browser unavailable, skipping browser sources: {:#}", e);
                    browser_sources.iter().for_each(|s| collector.skipped(*s));
                }
            }
        }
    }

    (collector.records, collector.per_source)
}

async fn launch_browser(ctx: &RunContext) -> Result<BrowserSession> {
    let config = ctx.config.clone();
    tokio::task::spawn_blocking(move || BrowserSession::launch(&config))
        .await
        .context("Browser launch task panicked")?
}

/// Full run: collect, dedup, write the CSV, log the summary
pub async fn run(ctx: &RunContext, scrapers: &[Box<dyn ListingScraper>]) -> Result<RunSummary> {
    let (records, per_source) = collect(ctx, scrapers).await;
    let raw = records.len();

    let unique = dedup(records);
    writer::write_csv(&ctx.config.output, &unique)?;

    let summary = RunSummary {
        raw,
        unique: unique.len(),
        elapsed: ctx.started.elapsed(),
        per_source,
    };
    summary.log();
    Ok(summary)
}
