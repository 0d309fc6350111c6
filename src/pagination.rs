//! Per-source page loop

use crate::context::RunContext;
use crate::fetch::Fetcher;
use crate::models::{ListingRecord, ListingType};
use crate::scrapers::{ListingScraper, PageProgress};
use std::fmt;
use tracing::{info, warn};

/// Why a page loop ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Fetch or navigation failed; the page is treated as unavailable
    FetchFailed,
    /// A page produced no records
    EmptyPage,
    /// No way forward from the last page
    NoNextPage,
    /// The configured page budget was used up
    PageLimit,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::FetchFailed => "page unavailable",
            Self::EmptyPage => "no listings on page",
            Self::NoNextPage => "no next page",
            Self::PageLimit => "page limit reached",
        })
    }
}

/// Outcome of paginating one query
#[derive(Debug)]
pub struct CrawlReport {
    pub records: Vec<ListingRecord>,
    /// Pages fetched successfully
    pub pages_fetched: u32,
    /// Requests made, including a final failed one
    pub attempts: u32,
    pub stop: StopReason,
}

/// Drives fetch → extract → continue/stop for one source query. Records
/// gathered before the loop stops are always returned.
pub struct Paginator<'a> {
    ctx: &'a RunContext,
}

impl<'a> Paginator<'a> {
    pub fn new(ctx: &'a RunContext) -> Self {
        Self { ctx }
    }

    /// `page_budget` caps the requests made for this query. Callers crawling
    /// several queries of one source/type split a single budget between them.
    pub async fn crawl(
        &self,
        scraper: &dyn ListingScraper,
        fetcher: &dyn Fetcher,
        listing_type: ListingType,
        query: &str,
        page_budget: u32,
    ) -> CrawlReport {
        let mut records = Vec::new();
        let mut pages_fetched = 0;
        let mut attempts = 0;

        if page_budget == 0 {
            return CrawlReport {
                records,
                pages_fetched,
                attempts,
                stop: StopReason::PageLimit,
            };
        }

        let stop = loop {
            let page_number = pages_fetched + 1;
            let url = scraper.page_url(query, page_number);
            info!("  p{}: {}", page_number, url);

            attempts += 1;
            let page = match fetcher.fetch(&url).await {
                Ok(page) => page,
                Err(e) => {
                    warn!("  {:#}", e);
                    break StopReason::FetchFailed;
                }
            };
            pages_fetched = page_number;

            let mut page_records = scraper.extract(&page, scraper.base_url());
            for record in &mut page_records {
                record.backfill_listing_type(listing_type);
            }
            info!("  {} listings on p{}", page_records.len(), page_number);

            if page_records.is_empty() {
                break StopReason::EmptyPage;
            }
            let page_count = page_records.len();
            records.extend(page_records);

            let progress = PageProgress {
                page: page_number,
                page_records: page_count,
                collected: records.len(),
                max_pages: page_budget,
            };
            if !scraper.has_next_page(&page, &progress) {
                break StopReason::NoNextPage;
            }
            if page_number >= page_budget {
                break StopReason::PageLimit;
            }

            self.ctx.politeness.pause().await;
        };

        info!(
            "  stopped after {} page(s): {} ({} records)",
            pages_fetched,
            stop,
            records.len()
        );

        CrawlReport {
            records,
            pages_fetched,
            attempts,
            stop,
        }
    }
}
