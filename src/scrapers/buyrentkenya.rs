use super::dom::{self, absolute_url, text_of};
use super::patterns::{self, BATHROOMS, BEDROOMS, PRICE, SIZE};
use super::text_pattern;
use super::traits::{run_chain, ListingScraper};
use super::types::Strategy;
use crate::fetch::{Engine, FetchedPage};
use crate::models::{ListingRecord, ListingType, RecordBuilder};
use crate::normalize::clean_text;
use anyhow::Result;
use scraper::{ElementRef, Html, Node};
use std::collections::HashSet;
use tracing::debug;

pub const BASE_URL: &str = "https://www.buyrentkenya.com";

/// Words that mark a sibling text node as a fact line rather than a suburb
const NOT_LOCATION: [&str; 8] = [
    "Bedroom", "Bathroom", "m²", "KSh", "APARTMENT", "HOUSE", "FOR SALE", "FOR RENT",
];

/// Levels above the title searched for the listing link
const LINK_DEPTH: usize = 6;

/// BuyRentKenya, server-rendered.
///
/// A card has no wrapper class: an `<h2>` title, then an `<h3>` whose text is
/// the title with the price glued on (`TITLEKSh 1,000`), then bare text nodes
/// for suburb and facts, all inside an `<a href="/listings/...">`. Every card
/// is rendered twice (desktop and mobile).
pub struct BuyRentKenya {
    base_url: String,
    region: String,
}

impl BuyRentKenya {
    pub fn new(base_url: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            region: region.into(),
        }
    }

    fn from_headings(&self, document: &Html, base: &str) -> Vec<ListingRecord> {
        let Some(h2s) = dom::selector("h2") else {
            return Vec::new();
        };

        let mut records = Vec::new();
        for h2 in document.select(&h2s) {
            match self.heading_record(h2, base) {
                Ok(Some(record)) => records.push(record),
                Ok(None) => {}
                Err(e) => debug!("[{}] card skipped: {:#}", self.source_name(), e),
            }
        }
        records
    }

    fn heading_record(&self, h2: ElementRef<'_>, base: &str) -> Result<Option<ListingRecord>> {
        let title = text_of(h2);
        if title.chars().count() < 8 {
            return Ok(None);
        }

        // Price is split off the concatenated h3 text, not by tag boundary
        let price = h2
            .next_siblings()
            .filter_map(ElementRef::wrap)
            .find(|el| el.value().name() == "h3")
            .map(|h3| patterns::find(&PRICE, &text_of(h3)))
            .unwrap_or_default();
        if price.is_empty() {
            // Navigation and header h2s carry no price
            return Ok(None);
        }

        let mut url = String::new();
        let mut node = h2.parent();
        for _ in 0..LINK_DEPTH {
            let Some(current) = node else { break };
            if let Some(a) = ElementRef::wrap(current).filter(|el| el.value().name() == "a") {
                let href = a.value().attr("href").unwrap_or("");
                if href.contains("/listings/") {
                    url = absolute_url(base, href)?;
                    break;
                }
            }
            node = current.parent();
        }

        let mut location = String::new();
        let mut chunk = String::new();
        for sibling in h2.next_siblings() {
            match sibling.value() {
                Node::Element(el) if el.name() == "h2" => break,
                Node::Element(_) => {
                    if let Some(el) = ElementRef::wrap(sibling) {
                        chunk.push(' ');
                        chunk.push_str(&text_of(el));
                    }
                }
                Node::Text(text) => {
                    let t = text.trim();
                    let len = t.chars().count();
                    if location.is_empty()
                        && len > 3
                        && len < 70
                        && !NOT_LOCATION.iter().any(|w| t.contains(w))
                    {
                        location = t.to_string();
                    }
                    chunk.push(' ');
                    chunk.push_str(t);
                }
                _ => {}
            }
        }
        let chunk = clean_text(&chunk);

        Ok(RecordBuilder::new(self.source_name())
            .title(title)
            .price(price)
            .location(location)
            .bedrooms(patterns::find(&BEDROOMS, &chunk))
            .bathrooms(patterns::find(&BATHROOMS, &chunk))
            .size_sqm(patterns::find(&SIZE, &chunk))
            .url(url)
            .build())
    }
}

/// Keep the first of each title+price pair
fn dedup_renders(records: Vec<ListingRecord>) -> Vec<ListingRecord> {
    let mut seen = HashSet::new();
    records
        .into_iter()
        .filter(|r| seen.insert(format!("{}{}", r.title, r.price)))
        .collect()
}

impl ListingScraper for BuyRentKenya {
    fn source_name(&self) -> &'static str {
        "BuyRentKenya"
    }

    fn engine(&self) -> Engine {
        Engine::Http
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn queries(&self, listing_type: ListingType) -> Vec<String> {
        let slug = match listing_type {
            ListingType::Sale => "property-for-sale",
            ListingType::Rent => "property-for-rent",
        };
        vec![format!("{}/nairobi", slug)]
    }

    fn page_url(&self, query: &str, page: u32) -> String {
        format!("{}/{}?page={}", self.base_url, query, page)
    }

    fn extract(&self, page: &FetchedPage, base_url: &str) -> Vec<ListingRecord> {
        let document = page.document();
        let records = run_chain(
            self.source_name(),
            &[Strategy::Dom, Strategy::TextPattern],
            |strategy| match strategy {
                Strategy::Dom => self.from_headings(&document, base_url),
                Strategy::TextPattern => {
                    text_pattern::extract(&document, self.source_name(), &self.region)
                }
                Strategy::Structured => Vec::new(),
            },
        );
        dedup_renders(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<html><body>
        <nav><h2>Find your next home today</h2></nav>
        <div class="desktop">
          <a href="/listings/4-bed-townhouse-lavington-3912">
            <div>
              <h2>4 Bed Townhouse in Lavington</h2>
              <h3>4 Bed Townhouse in LavingtonKSh 42,000,000</h3>
              <h3>TOWNHOUSE FOR SALE</h3>
              Lavington, Westlands
              <span>4 Bedrooms</span><span>5 Bathrooms</span><span>320 m²</span>
            </div>
          </a>
        </div>
        <div class="mobile">
          <a href="/listings/4-bed-townhouse-lavington-3912">
            <div>
              <h2>4 Bed Townhouse in Lavington</h2>
              <h3>4 Bed Townhouse in LavingtonKSh 42,000,000</h3>
              Lavington, Westlands
              <span>4 Bedrooms</span>
            </div>
          </a>
        </div>
        <a href="/listings/studio-kilimani-77">
          <h2>Studio Apartment, Kilimani</h2>
          <h3>Studio Apartment, KilimaniKSh 35,000</h3>
          Kilimani, Nairobi
          <span>1 Bathroom</span>
        </a>
        <a href="/property-for-sale/nairobi?page=2">2</a>
    </body></html>"#;

    fn scraper() -> BuyRentKenya {
        BuyRentKenya::new("https://www.buyrentkenya.com", "Nairobi")
    }

    #[test]
    fn desktop_and_mobile_renders_collapse_to_one() {
        let page = FetchedPage::new("https://www.buyrentkenya.com/x", PAGE);
        let records = scraper().extract(&page, BASE_URL);

        assert_eq!(records.len(), 2);
        let townhouse = &records[0];
        assert_eq!(townhouse.title, "4 Bed Townhouse in Lavington");
        assert_eq!(townhouse.price, "KSh 42,000,000");
        assert_eq!(townhouse.location, "Lavington, Westlands");
        assert_eq!(townhouse.bedrooms, "4 Bedrooms");
        assert_eq!(townhouse.bathrooms, "5 Bathrooms");
        assert_eq!(townhouse.size_sqm, "320 m²");
        assert_eq!(
            townhouse.url,
            "https://www.buyrentkenya.com/listings/4-bed-townhouse-lavington-3912"
        );
        assert_eq!(townhouse.listing_type(), None);

        let studio = &records[1];
        assert_eq!(studio.price, "KSh 35,000");
        assert_eq!(studio.location, "Kilimani, Nairobi");
        assert_eq!(studio.bathrooms, "1 Bathroom");
    }

    #[test]
    fn next_page_link_is_detected() {
        let page = FetchedPage::new("u", PAGE);
        let progress = crate::scrapers::PageProgress {
            page: 1,
            page_records: 2,
            collected: 2,
            max_pages: 10,
        };
        assert!(scraper().has_next_page(&page, &progress));
    }

    #[test]
    fn builds_paged_urls() {
        let s = scraper();
        let query = &s.queries(ListingType::Rent)[0];
        assert_eq!(
            s.page_url(query, 3),
            "https://www.buyrentkenya.com/property-for-rent/nairobi?page=3"
        );
    }
}
