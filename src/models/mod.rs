mod builder;

pub use builder::RecordBuilder;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Output columns, in the order they are written
pub const FIELDS: [&str; 11] = [
    "source",
    "listing_type",
    "title",
    "price",
    "location",
    "bedrooms",
    "bathrooms",
    "size_sqm",
    "property_type",
    "url",
    "scraped_at",
];

/// Whether a listing is offered for sale or for rent
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ListingType {
    Sale,
    Rent,
}

impl ListingType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sale => "Sale",
            Self::Rent => "Rent",
        }
    }
}

impl fmt::Display for ListingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// One normalized property listing
///
/// Text fields are cleaned by [`RecordBuilder`] at construction. `price`,
/// `bedrooms` and friends keep whatever the source printed (currency prefix,
/// unit words); scale is left to downstream cleaning.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingRecord {
    pub source: String,
    pub title: String,
    pub price: String,
    pub location: String,
    pub bedrooms: String,
    pub bathrooms: String,
    pub size_sqm: String,
    pub property_type: String,
    pub url: String,
    listing_type: Option<ListingType>,
    scraped_at: DateTime<Local>,
}

impl ListingRecord {
    pub fn listing_type(&self) -> Option<ListingType> {
        self.listing_type
    }

    /// Tag the record with the listing type of the page it came from.
    /// A type already set by the extractor wins.
    pub fn backfill_listing_type(&mut self, listing_type: ListingType) {
        if self.listing_type.is_none() {
            self.listing_type = Some(listing_type);
        }
    }

    /// Identity used for deduplication: the url, or title+price without one
    pub fn dedup_key(&self) -> String {
        if self.url.is_empty() {
            format!("{}{}", self.title, self.price)
        } else {
            self.url.clone()
        }
    }

    /// Row in [`FIELDS`] order
    pub fn to_row(&self) -> [String; 11] {
        [
            self.source.clone(),
            self.listing_type
                .map(|t| t.as_str().to_string())
                .unwrap_or_default(),
            self.title.clone(),
            self.price.clone(),
            self.location.clone(),
            self.bedrooms.clone(),
            self.bathrooms.clone(),
            self.size_sqm.clone(),
            self.property_type.clone(),
            self.url.clone(),
            self.scraped_at.format("%Y-%m-%dT%H:%M:%S%.6f").to_string(),
        ]
    }
}
