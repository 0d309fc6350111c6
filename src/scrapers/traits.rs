use super::dom;
use super::types::{PageProgress, Strategy};
use crate::fetch::{Engine, FetchedPage};
use crate::models::{ListingRecord, ListingType};
use tracing::{debug, info};

/// One listing website: where its result pages live and how to read them.
/// Adding a source means adding one implementation.
pub trait ListingScraper: Send + Sync {
    /// Name written to the `source` column
    fn source_name(&self) -> &'static str;

    fn engine(&self) -> Engine;

    fn base_url(&self) -> &str;

    /// Extra request headers layered over the base set
    fn header_overlay(&self) -> Vec<(&'static str, String)> {
        Vec::new()
    }

    /// Search paths for a listing type; each is paginated on its own
    fn queries(&self, listing_type: ListingType) -> Vec<String>;

    fn page_url(&self, query: &str, page: u32) -> String;

    /// Records on one fetched page. Pure function of the page content.
    fn extract(&self, page: &FetchedPage, base_url: &str) -> Vec<ListingRecord>;

    /// Whether the page offers a way forward. Defaults to looking for a
    /// next-page link.
    fn has_next_page(&self, page: &FetchedPage, progress: &PageProgress) -> bool {
        dom::has_next_link(&page.document(), progress.page)
    }
}

/// Try `chain` in order, returning the first non-empty result
pub fn run_chain<F>(source: &str, chain: &[Strategy], mut attempt: F) -> Vec<ListingRecord>
where
    F: FnMut(Strategy) -> Vec<ListingRecord>,
{
    for &strategy in chain {
        let records = attempt(strategy);
        if !records.is_empty() {
            info!("  [{}] {} strategy: {} records", source, strategy, records.len());
            return records;
        }
        debug!("[{}] {} strategy: nothing", source, strategy);
    }
    Vec::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RecordBuilder;

    fn one(title: &str) -> Vec<ListingRecord> {
        RecordBuilder::new("Test").title(title).build().into_iter().collect()
    }

    #[test]
    fn stops_at_first_strategy_with_records() {
        let mut tried = Vec::new();
        let records = run_chain(
            "Test",
            &[Strategy::Structured, Strategy::Dom, Strategy::TextPattern],
            |s| {
                tried.push(s);
                match s {
                    Strategy::Structured => one("from json"),
                    _ => one("from markup"),
                }
            },
        );

        assert_eq!(tried, vec![Strategy::Structured]);
        assert_eq!(records[0].title, "from json");
    }

    #[test]
    fn falls_through_empty_strategies() {
        let mut tried = Vec::new();
        let records = run_chain(
            "Test",
            &[Strategy::Structured, Strategy::Dom, Strategy::TextPattern],
            |s| {
                tried.push(s);
                if s == Strategy::TextPattern {
                    one("from text")
                } else {
                    Vec::new()
                }
            },
        );

        assert_eq!(tried.len(), 3);
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn empty_when_every_strategy_fails() {
        let records = run_chain("Test", &[Strategy::Dom, Strategy::TextPattern], |_| Vec::new());
        assert!(records.is_empty());
    }
}
