use crate::models::ListingRecord;
use std::collections::HashSet;
use tracing::info;

/// Drops every record whose identity was already seen, keeping the first
/// occurrence and the original order
pub fn dedup(records: Vec<ListingRecord>) -> Vec<ListingRecord> {
    let before = records.len();
    let mut seen = HashSet::with_capacity(before);

    let unique: Vec<ListingRecord> = records
        .into_iter()
        .filter(|record| seen.insert(record.dedup_key()))
        .collect();

    info!("Dedup: {} → {}", before, unique.len());
    unique
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RecordBuilder;

    fn record(source: &str, title: &str, price: &str, url: &str) -> ListingRecord {
        RecordBuilder::new(source)
            .title(title)
            .price(price)
            .url(url)
            .build()
            .unwrap()
    }

    #[test]
    fn same_url_across_sources_is_one_listing() {
        let records = vec![
            record("BuyRentKenya", "Flat in Kilimani", "KSh 1", "https://x.test/1"),
            record("Jiji", "Another title", "KSh 2", "https://x.test/1"),
            record("Jiji", "Flat in Kilimani", "KSh 1", "https://x.test/2"),
        ];
        let unique = dedup(records);

        assert_eq!(unique.len(), 2);
        assert_eq!(unique[0].source, "BuyRentKenya");
        assert_eq!(unique[1].url, "https://x.test/2");
    }

    #[test]
    fn url_less_records_match_on_title_and_price() {
        let records = vec![
            record("PigiaMe", "3 Bed Apartment", "KSh 12,000,000", ""),
            record("PigiaMe", "3 Bed Apartment", "KSh 12,000,000", ""),
            record("PigiaMe", "3 Bed Apartment", "KSh 13,000,000", ""),
        ];
        let unique = dedup(records);

        assert_eq!(unique.len(), 2);
        assert_eq!(unique[1].price, "KSh 13,000,000");
    }

    #[test]
    fn empty_input() {
        assert!(dedup(Vec::new()).is_empty());
    }
}
