use super::dom::{self, absolute_url, CardLayout};
use super::embedded::{self, EmbeddedJson};
use super::text_pattern;
use super::traits::{run_chain, ListingScraper};
use super::types::{PageProgress, Strategy};
use crate::fetch::{Engine, FetchedPage};
use crate::models::{ListingRecord, ListingType, RecordBuilder};
use anyhow::Result;
use regex::Regex;
use scraper::Html;
use serde::Deserialize;
use serde_json::Value;
use std::sync::LazyLock;
use tracing::{debug, info};

pub const BASE_URL: &str = "https://jiji.co.ke";

/// Assumed page size when a page's advert count is unknown
const DEFAULT_PAGE_SIZE: usize = 20;

static TOTAL_COUNT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""total_count"\s*:\s*(\d+)"#).expect("hardcoded regex pattern is valid")
});

/// Advert cards for the rare page served without the JSON state
const CARDS: CardLayout = CardLayout {
    card: "div.b-list-advert__gallery__item",
    fallback_card: Some("[class*='b-list-advert']"),
    title: &[".b-advert-title-inner", ".qa-advert-title", "[class*='title']"],
    price: &[".qa-advert-price", "[class*='price']"],
    location: &[".b-list-advert__region__text", "[class*='region']"],
    property_type: &["[class*='category']"],
    link: &["a[href]"],
    ..CardLayout::EMPTY
};

/// One element of the embedded `adverts` array
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Advert {
    title: Option<String>,
    price_obj: Option<Value>,
    price: Option<Value>,
    region_name: Option<String>,
    town_name: Option<String>,
    url: Option<String>,
    attrs: Option<Value>,
    category_name: Option<String>,
}

/// Jiji classifieds. Results are embedded in the page state as
/// `window.INITIAL_DATA__ = {"adverts":[...],"total_count":N}`.
pub struct Jiji {
    base_url: String,
    region: String,
}

impl Jiji {
    pub fn new(base_url: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            region: region.into(),
        }
    }

    fn from_state(&self, document: &Html, base: &str) -> Vec<ListingRecord> {
        let Some(scripts) = dom::selector("script") else {
            return Vec::new();
        };

        for script in document.select(&scripts) {
            let text: String = script.text().collect();
            if !text.contains("\"adverts\"") {
                continue;
            }
            let adverts = match embedded::extract_array(&text, "adverts", Some("total_count")) {
                EmbeddedJson::Parsed(values) => values,
                EmbeddedJson::RecoveredPartial(values) => {
                    info!("  adverts JSON truncated, recovered {} complete", values.len());
                    values
                }
                EmbeddedJson::Unavailable => continue,
            };

            return adverts
                .into_iter()
                .filter_map(|value| match self.advert_record(value, base) {
                    Ok(record) => record,
                    Err(e) => {
                        debug!("[{}] advert skipped: {:#}", self.source_name(), e);
                        None
                    }
                })
                .collect();
        }
        Vec::new()
    }

    fn advert_record(&self, value: Value, base: &str) -> Result<Option<ListingRecord>> {
        let advert: Advert = serde_json::from_value(value)?;

        let price = match advert
            .price_obj
            .as_ref()
            .and_then(|po| po.get("value"))
            .map(value_text)
        {
            Some(v) if !v.is_empty() => format!("KSh {v}"),
            _ => advert.price.as_ref().map(value_text).unwrap_or_default(),
        };

        let attrs = attribute_map(advert.attrs.as_ref());
        let attr = |names: &[&str]| {
            names
                .iter()
                .find_map(|n| attrs.iter().find(|(k, _)| k.as_str() == *n).map(|(_, v)| v.clone()))
                .filter(|v| !v.is_empty())
                .unwrap_or_default()
        };

        let href = advert.url.unwrap_or_default();
        let url = if href.is_empty() {
            href
        } else {
            absolute_url(base, &href)?
        };

        Ok(RecordBuilder::new(self.source_name())
            .title(advert.title.unwrap_or_default())
            .price(price)
            .location(
                advert
                    .region_name
                    .filter(|r| !r.is_empty())
                    .or(advert.town_name)
                    .unwrap_or_default(),
            )
            .bedrooms(attr(&["Bedrooms", "bedrooms"]))
            .bathrooms(attr(&["Bathrooms", "bathrooms"]))
            .size_sqm(attr(&["Size", "size"]))
            .property_type(advert.category_name.unwrap_or_default())
            .url(url)
            .build())
    }
}

/// Scalar JSON as plain text; null and containers become empty
fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

/// `attrs` arrives either as an object or as `[{"name":..,"value":..}]`
fn attribute_map(attrs: Option<&Value>) -> Vec<(String, String)> {
    match attrs {
        Some(Value::Object(map)) => map
            .iter()
            .map(|(k, v)| (k.clone(), value_text(v)))
            .collect(),
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| {
                let name = item.get("name").map(value_text)?;
                let value = item.get("value").map(value_text).unwrap_or_default();
                Some((name, value))
            })
            .collect(),
        _ => Vec::new(),
    }
}

/// `total_count` from the page state, if present
pub fn total_count(html: &str) -> Option<usize> {
    TOTAL_COUNT
        .captures(html)
        .and_then(|caps| caps[1].parse().ok())
}

impl ListingScraper for Jiji {
    fn source_name(&self) -> &'static str {
        "Jiji"
    }

    fn engine(&self) -> Engine {
        Engine::Http
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn header_overlay(&self) -> Vec<(&'static str, String)> {
        vec![("referer", format!("{}/", self.base_url))]
    }

    fn queries(&self, listing_type: ListingType) -> Vec<String> {
        let slug = match listing_type {
            ListingType::Sale => "houses-apartments-for-sale",
            ListingType::Rent => "houses-apartments-for-rent",
        };
        vec![format!("nairobi/{}", slug)]
    }

    fn page_url(&self, query: &str, page: u32) -> String {
        format!("{}/{}?page={}", self.base_url, query, page)
    }

    fn extract(&self, page: &FetchedPage, base_url: &str) -> Vec<ListingRecord> {
        let document = page.document();
        run_chain(
            self.source_name(),
            &[Strategy::Structured, Strategy::Dom, Strategy::TextPattern],
            |strategy| match strategy {
                Strategy::Structured => self.from_state(&document, base_url),
                Strategy::Dom => dom::extract_cards(&document, &CARDS, self.source_name(), base_url),
                Strategy::TextPattern => {
                    text_pattern::extract(&document, self.source_name(), &self.region)
                }
            },
        )
    }

    /// Jiji pages have no dependable next link; keep going until the
    /// advertised total (capped by the page budget) has been collected
    fn has_next_page(&self, page: &FetchedPage, progress: &PageProgress) -> bool {
        let Some(total) = total_count(&page.html).filter(|t| *t > 0) else {
            return true;
        };
        if progress.page == 1 {
            info!("  Total listings: {}", total);
        }
        let page_size = if progress.page_records > 0 {
            progress.page_records
        } else {
            DEFAULT_PAGE_SIZE
        };
        let target = total.min(progress.max_pages as usize * page_size);
        progress.collected < target
    }
}
