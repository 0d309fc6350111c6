use super::dom::{self, CardLayout};
use super::text_pattern;
use super::traits::{run_chain, ListingScraper};
use super::types::Strategy;
use crate::fetch::{Engine, FetchedPage};
use crate::models::{ListingRecord, ListingType};

pub const BASE_URL: &str = "https://www.property24.co.ke";

const TILES: CardLayout = CardLayout {
    card: ".p24_regularTile",
    fallback_card: Some("[class*='p24_']"),
    title: &[".p24_title", ".p24_propertyName", "h2", "h3"],
    price: &[".p24_price", ".p24_displayPrice", "[class*='price']"],
    location: &[".p24_address", ".p24_addressDescription", "[class*='address']"],
    property_type: &[".p24_propertyType"],
    link: &["a[href]"],
    facts: &[".p24_info span", ".p24_details span", ".p24_featureDetails span"],
    ..CardLayout::EMPTY
};

/// Property24 Kenya. Server-rendered tiles, but only served to a real
/// browser.
pub struct Property24 {
    base_url: String,
    region: String,
}

impl Property24 {
    pub fn new(base_url: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            region: region.into(),
        }
    }
}

impl ListingScraper for Property24 {
    fn source_name(&self) -> &'static str {
        "Property24"
    }

    fn engine(&self) -> Engine {
        Engine::Browser
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn queries(&self, listing_type: ListingType) -> Vec<String> {
        let slug = match listing_type {
            ListingType::Sale => "property-for-sale-in-nairobi-c1890",
            ListingType::Rent => "property-to-rent-in-nairobi-c1890",
        };
        vec![slug.to_string()]
    }

    fn page_url(&self, query: &str, page: u32) -> String {
        format!("{}/{}?Page={}", self.base_url, query, page)
    }

    fn extract(&self, page: &FetchedPage, base_url: &str) -> Vec<ListingRecord> {
        let document = page.document();
        run_chain(
            self.source_name(),
            &[Strategy::Dom, Strategy::TextPattern],
            |strategy| match strategy {
                Strategy::Dom => dom::extract_cards(&document, &TILES, self.source_name(), base_url),
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

    fn scraper() -> Property24 {
        Property24::new(BASE_URL, "Nairobi")
    }

    #[test]
    fn reads_regular_tiles() {
        let html = r#"<div class="p24_results">
            <div class="p24_regularTile">
              <a href="/4-bedroom-house-for-sale-in-runda-115603421">
                <span class="p24_price">KSh 85 000 000</span>
                <span class="p24_title">4 Bedroom House</span>
                <span class="p24_location">Runda</span>
                <span class="p24_address">Runda Grove, Runda</span>
                <span class="p24_featureDetails"><span>4 Beds</span><span>5 Baths</span><span>620 m²</span></span>
              </a>
            </div>
            <div class="p24_regularTile">
              <span class="p24_price">POA</span>
              <span class="p24_title">Land in Karen</span>
            </div>
          </div>"#;
        let page = FetchedPage::new("u", html);
        let records = scraper().extract(&page, BASE_URL);

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].title, "4 Bedroom House");
        assert_eq!(records[0].price, "KSh 85 000 000");
        assert_eq!(records[0].location, "Runda Grove, Runda");
        assert_eq!(records[0].bedrooms, "4 Beds");
        assert_eq!(records[0].bathrooms, "5 Baths");
        assert_eq!(records[0].size_sqm, "620 m²");
        assert_eq!(
            records[0].url,
            "https://www.property24.co.ke/4-bedroom-house-for-sale-in-runda-115603421"
        );
        assert_eq!(records[1].title, "Land in Karen");
    }

    #[test]
    fn fallback_cards_must_mention_a_price() {
        let html = r#"<div class="p24_header"><h2>Property for sale</h2></div>
            <div class="p24_tile">
              <h3>3 Bed Apartment in Westlands</h3>
              <div class="p24_amount">KSh 16,000,000</div>
            </div>"#;
        let page = FetchedPage::new("u", html);
        let records = scraper().extract(&page, BASE_URL);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title, "3 Bed Apartment in Westlands");
        // No price selector matches; the price comes from the card text
        assert_eq!(records[0].price, "KSh 16,000,000");
    }

    #[test]
    fn selector_miss_falls_back_to_text_patterns() {
        let html = r#"<html><body>
            <section>
              <p>Spacious 3 Bedroom Apartment in Kileleshwa</p><p>KSh 18,500,000</p>
              <p>Family House with garden, Karen</p><p>KSh 95,000,000</p>
              <p>Studio Apartment near Yaya Centre</p><p>Kilimani</p><p>KSh 40,000</p>
            </section>
          </body></html>"#;
        let page = FetchedPage::new("u", html);
        let records = scraper().extract(&page, BASE_URL);

        assert_eq!(records.len(), 3);
        assert!(records.iter().all(|r| r.location == "Nairobi" && r.url.is_empty()));
        assert_eq!(records[2].price, "KSh 40,000");
    }

    #[test]
    fn page_urls_use_capital_page_param() {
        let s = scraper();
        let q = &s.queries(ListingType::Sale)[0];
        assert_eq!(
            s.page_url(q, 2),
            "https://www.property24.co.ke/property-for-sale-in-nairobi-c1890?Page=2"
        );
    }
}
