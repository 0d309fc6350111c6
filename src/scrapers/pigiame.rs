use super::dom::{self, CardLayout};
use super::text_pattern;
use super::traits::{run_chain, ListingScraper};
use super::types::Strategy;
use crate::fetch::{Engine, FetchedPage};
use crate::models::{ListingRecord, ListingType};

pub const BASE_URL: &str = "https://www.pigiame.co.ke";

const CARDS: CardLayout = CardLayout {
    card: "article[class*='listing'], div[class*='listing-card'], li[class*='item'], [data-advert-id]",
    fallback_card: Some("div[class*='card']"),
    title: &["h2", "h3", "[class*='title']", "[class*='name']"],
    price: &["[class*='price']", "[class*='cost']"],
    location: &["[class*='location']", "[class*='suburb']", "[class*='area']"],
    bedrooms: &["[class*='bed']"],
    bathrooms: &["[class*='bath']"],
    link: &["a[href]"],
    require_title: true,
    ..CardLayout::EMPTY
};

/// PigiaMe classifieds. Houses and apartments live under separate category
/// paths, so each listing type has two queries.
pub struct PigiaMe {
    base_url: String,
    region: String,
}

impl PigiaMe {
    pub fn new(base_url: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            region: region.into(),
        }
    }
}

impl ListingScraper for PigiaMe {
    fn source_name(&self) -> &'static str {
        "PigiaMe"
    }

    fn engine(&self) -> Engine {
        Engine::Browser
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn queries(&self, listing_type: ListingType) -> Vec<String> {
        let slugs: [&str; 2] = match listing_type {
            ListingType::Sale => ["houses-for-sale", "apartments-for-sale"],
            ListingType::Rent => ["houses-for-rent", "apartments-for-rent"],
        };
        slugs.iter().map(|s| format!("{}/nairobi", s)).collect()
    }

    fn page_url(&self, query: &str, page: u32) -> String {
        format!("{}/{}?page={}", self.base_url, query, page)
    }

    fn extract(&self, page: &FetchedPage, base_url: &str) -> Vec<ListingRecord> {
        let document = page.document();
        run_chain(
            self.source_name(),
            &[Strategy::Dom, Strategy::TextPattern],
            |strategy| match strategy {
                Strategy::Dom => dom::extract_cards(&document, &CARDS, self.source_name(), base_url),
                Strategy::TextPattern => {
                    text_pattern::extract(&document, self.source_name(), &self.region)
                }
                Strategy::Structured => Vec::new(),
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scraper() -> PigiaMe {
        PigiaMe::new(BASE_URL, "Nairobi")
    }

    #[test]
    fn two_category_queries_per_type() {
        let s = scraper();
        let queries = s.queries(ListingType::Rent);
        assert_eq!(queries, vec!["houses-for-rent/nairobi", "apartments-for-rent/nairobi"]);
        assert_eq!(
            s.page_url(&queries[1], 4),
            "https://www.pigiame.co.ke/apartments-for-rent/nairobi?page=4"
        );
    }

    #[test]
    fn cards_without_title_are_dropped() {
        let html = r#"<ul>
            <li class="listing-item" data-advert-id="1">
              <a href="/listings/3-bed-apartment-kilimani-1">
                <div class="ad-title">3 Bed Apartment with En Suite</div>
                <div class="ad-bed">3 bed</div>
                <div class="ad-location">Kilimani</div>
                <div class="ad-price">KSh 12,000,000</div>
              </a>
            </li>
            <li class="listing-item" data-advert-id="2">
              <div class="ad-price">KSh 1,000</div>
            </li>
          </ul>"#;
        let page = FetchedPage::new("u", html);
        let records = scraper().extract(&page, BASE_URL);

        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!(r.title, "3 Bed Apartment with En Suite");
        assert_eq!(r.bedrooms, "3 bed");
        assert_eq!(r.location, "Kilimani");
        assert_eq!(r.price, "KSh 12,000,000");
        assert_eq!(r.url, "https://www.pigiame.co.ke/listings/3-bed-apartment-kilimani-1");
    }

    #[test]
    fn text_fallback_when_no_cards_match() {
        let html = r#"<main>
            <span>3 Bed Apartment with En Suite · 3 bed · Kilimani · KSh 12,000,000</span>
            <span>4 Bedroom Villa in Runda</span><span>KSh 90,000,000</span>
          </main>"#;
        let page = FetchedPage::new("u", html);
        let records = scraper().extract(&page, BASE_URL);

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].price, "KSh 12,000,000");
        assert_eq!(records[0].bedrooms, "3 Bed");
        assert_eq!(records[1].title, "4 Bedroom Villa in Runda");
    }
}
