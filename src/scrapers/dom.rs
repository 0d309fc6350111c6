//! Selector-driven card extraction shared by the server-rendered sources

use super::patterns::{self, NEXT_TEXT, PAGE_PARAM, PRICE};
use crate::models::{ListingRecord, RecordBuilder};
use crate::normalize::clean_text;
use anyhow::{Context, Result};
use scraper::{ElementRef, Html, Selector};
use tracing::debug;
use url::Url;

/// Where the fields of a listing card live.
///
/// Each field list is ordered; the first selector that matches inside the
/// card wins.
#[derive(Debug, Clone, Copy)]
pub struct CardLayout {
    pub card: &'static str,
    /// Broader card selector used when `card` matches nothing. Matches are
    /// kept only if their text carries a price.
    pub fallback_card: Option<&'static str>,
    pub title: &'static [&'static str],
    pub price: &'static [&'static str],
    pub location: &'static [&'static str],
    pub bedrooms: &'static [&'static str],
    pub bathrooms: &'static [&'static str],
    pub size: &'static [&'static str],
    pub property_type: &'static [&'static str],
    pub link: &'static [&'static str],
    /// Small "3 Beds" / "2 Baths" / "120 m²" chips, scanned by keyword when
    /// the dedicated field selectors miss
    pub facts: &'static [&'static str],
    /// Drop cards without a title even if they have a price
    pub require_title: bool,
}

impl CardLayout {
    pub const EMPTY: CardLayout = CardLayout {
        card: "",
        fallback_card: None,
        title: &[],
        price: &[],
        location: &[],
        bedrooms: &[],
        bathrooms: &[],
        size: &[],
        property_type: &[],
        link: &[],
        facts: &[],
        require_title: false,
    };
}

pub fn selector(css: &str) -> Option<Selector> {
    match Selector::parse(css) {
        Ok(sel) => Some(sel),
        Err(e) => {
            debug!("Skipping invalid selector {:?}: {:?}", css, e);
            None
        }
    }
}

/// Whitespace-joined, cleaned text of an element
pub fn text_of(element: ElementRef<'_>) -> String {
    clean_text(&element.text().collect::<Vec<_>>().join(" "))
}

/// First element matching any of `candidates`, trying them in order
pub fn first_match<'a>(scope: ElementRef<'a>, candidates: &[&str]) -> Option<ElementRef<'a>> {
    candidates
        .iter()
        .filter_map(|css| selector(css))
        .find_map(|sel| scope.select(&sel).next())
}

fn first_text(scope: ElementRef<'_>, candidates: &[&str]) -> String {
    first_match(scope, candidates)
        .map(text_of)
        .unwrap_or_default()
}

/// Resolve `href` against the site root
pub fn absolute_url(base: &str, href: &str) -> Result<String> {
    if href.starts_with("http://") || href.starts_with("https://") {
        return Ok(href.to_string());
    }
    let base = Url::parse(base).with_context(|| format!("Bad base url {base}"))?;
    let joined = base
        .join(href)
        .with_context(|| format!("Cannot resolve {href} against {base}"))?;
    Ok(joined.to_string())
}

/// Listing cards on the page: primary selector, else the broader fallback
/// filtered to blocks that mention a price
pub fn select_cards<'a>(document: &'a Html, layout: &CardLayout) -> Vec<ElementRef<'a>> {
    if let Some(sel) = selector(layout.card) {
        let cards: Vec<_> = document.select(&sel).collect();
        debug!("{} cards: {}", layout.card, cards.len());
        if !cards.is_empty() {
            return cards;
        }
    }

    let Some(fallback) = layout.fallback_card.and_then(selector) else {
        return Vec::new();
    };
    let cards: Vec<_> = document
        .select(&fallback)
        .filter(|card| PRICE.is_match(&text_of(*card)))
        .collect();
    debug!("fallback {:?} cards: {}", layout.fallback_card, cards.len());
    cards
}

fn card_record(
    card: ElementRef<'_>,
    layout: &CardLayout,
    source: &str,
    base: &str,
) -> Result<Option<ListingRecord>> {
    let title = first_text(card, layout.title);
    if layout.require_title && title.is_empty() {
        return Ok(None);
    }

    let facts: Vec<String> = layout
        .facts
        .iter()
        .filter_map(|css| selector(css))
        .flat_map(|sel| card.select(&sel).map(text_of).collect::<Vec<_>>())
        .collect();
    let fact = |selectors: &[&str], keyword: &str| {
        let direct = first_text(card, selectors);
        if !direct.is_empty() {
            return direct;
        }
        facts
            .iter()
            .find(|f| f.contains(keyword))
            .cloned()
            .unwrap_or_default()
    };

    let href = first_match(card, layout.link)
        .and_then(|a| a.value().attr("href"))
        .unwrap_or("");
    let url = if href.is_empty() {
        String::new()
    } else {
        absolute_url(base, href)?
    };

    // Untitled fragments get no price from loose text
    let mut price = first_text(card, layout.price);
    if price.is_empty() && !title.is_empty() {
        price = patterns::find(&PRICE, &text_of(card));
    }

    Ok(RecordBuilder::new(source)
        .title(title)
        .price(price)
        .location(first_text(card, layout.location))
        .bedrooms(fact(layout.bedrooms, "Bed"))
        .bathrooms(fact(layout.bathrooms, "Bath"))
        .size_sqm(fact(layout.size, "m²"))
        .property_type(first_text(card, layout.property_type))
        .url(url)
        .build())
}

/// Run the card layout over a page. Cards that fail are skipped.
pub fn extract_cards(
    document: &Html,
    layout: &CardLayout,
    source: &str,
    base: &str,
) -> Vec<ListingRecord> {
    let mut records = Vec::new();
    for card in select_cards(document, layout) {
        match card_record(card, layout, source, base) {
            Ok(Some(record)) => records.push(record),
            Ok(None) => {}
            Err(e) => debug!("[{}] card skipped: {:#}", source, e),
        }
    }
    records
}

/// A link whose text reads "Next"/›/», marked `rel="next"`, or pointing at
/// page `current + 1`
pub fn has_next_link(document: &Html, current: u32) -> bool {
    let Some(anchors) = selector("a") else {
        return false;
    };
    document.select(&anchors).any(|a| {
        if a.value().attr("rel").is_some_and(|rel| rel.eq_ignore_ascii_case("next")) {
            return true;
        }
        if NEXT_TEXT.is_match(&text_of(a)) {
            return true;
        }
        a.value()
            .attr("href")
            .and_then(|href| PAGE_PARAM.captures(href))
            .and_then(|caps| caps[1].parse::<u32>().ok())
            .is_some_and(|n| n == current + 1)
    })
}
