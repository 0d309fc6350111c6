//! Last-resort extraction: listing phrases followed by a nearby price

use super::patterns::{self, BED_SHORT, PRICE, TITLE_PHRASE};
use crate::models::{ListingRecord, RecordBuilder};
use scraper::{Html, Node};

const SKIPPED_PARENTS: [&str; 3] = ["script", "style", "noscript"];

/// Visible text of the page, one text node per line
pub fn page_text(document: &Html) -> String {
    let mut lines = Vec::new();
    for node in document.root_element().descendants() {
        let Node::Text(text) = node.value() else {
            continue;
        };
        let hidden = node
            .parent()
            .and_then(|p| p.value().as_element().map(|e| SKIPPED_PARENTS.contains(&e.name())))
            .unwrap_or(false);
        let line = text.trim();
        if !hidden && !line.is_empty() {
            lines.push(line.to_string());
        }
    }
    lines.join("\n")
}

/// Characters of a title kept after its keyword
const TITLE_TAIL: usize = 80;
/// How far past the title a price may appear
const PRICE_WINDOW: usize = 200;

/// One record per title phrase followed closely by a `KSh` price.
/// Location defaults to the search region; other fields stay empty apart
/// from a bedroom count lifted from the title.
pub fn extract(document: &Html, source: &str, region: &str) -> Vec<ListingRecord> {
    let text = page_text(document);
    let mut records = Vec::new();
    let mut pos = 0;

    while let Some(phrase) = TITLE_PHRASE.find_at(&text, pos) {
        let line_end = text[phrase.end()..]
            .find('\n')
            .map_or(text.len(), |i| phrase.end() + i);
        let title_end = text[phrase.end()..line_end]
            .char_indices()
            .nth(TITLE_TAIL)
            .map_or(line_end, |(i, _)| phrase.end() + i);

        // A price on the title line ends the title; otherwise look just past it
        let found = PRICE.find_at(&text, phrase.end()).and_then(|price| {
            if price.start() < title_end {
                Some((&text[phrase.start()..price.start()], price))
            } else if price.start() - title_end <= PRICE_WINDOW {
                Some((&text[phrase.start()..title_end], price))
            } else {
                None
            }
        });
        let Some((title, price)) = found else {
            pos = phrase.end();
            continue;
        };
        pos = price.end();

        let record = RecordBuilder::new(source)
            .title(title)
            .price(price.as_str())
            .bedrooms(patterns::find(&BED_SHORT, title))
            .location(region)
            .build();
        if let Some(record) = record.filter(|r| r.title.chars().count() > 5) {
            records.push(record);
        }
    }
    records
}
