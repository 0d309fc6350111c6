use super::{ListingRecord, ListingType};
use crate::normalize::clean_text;
use chrono::Local;

/// Assembles a [`ListingRecord`] from whatever fields a source exposes.
///
/// Absent fields default to empty strings. Every value passes through
/// [`clean_text`]; the timestamp is taken when `build` is called.
#[derive(Debug, Default, Clone)]
pub struct RecordBuilder {
    source: String,
    listing_type: Option<ListingType>,
    title: String,
    price: String,
    location: String,
    bedrooms: String,
    bathrooms: String,
    size_sqm: String,
    property_type: String,
    url: String,
}

macro_rules! text_setter {
    ($($name:ident),* $(,)?) => {
        $(
            pub fn $name(mut self, value: impl AsRef<str>) -> Self {
                self.$name = clean_text(value.as_ref());
                self
            }
        )*
    };
}

impl RecordBuilder {
    pub fn new(source: &str) -> Self {
        Self {
            source: clean_text(source),
            ..Self::default()
        }
    }

    text_setter!(
        title,
        price,
        location,
        bedrooms,
        bathrooms,
        size_sqm,
        property_type,
        url,
    );

    pub fn listing_type(mut self, listing_type: ListingType) -> Self {
        self.listing_type = Some(listing_type);
        self
    }

    /// Returns `None` when both title and price are empty; such blocks are
    /// navigation or layout noise, not listings.
    pub fn build(self) -> Option<ListingRecord> {
        if self.title.is_empty() && self.price.is_empty() {
            return None;
        }

        Some(ListingRecord {
            source: self.source,
            title: self.title,
            price: self.price,
            location: self.location,
            bedrooms: self.bedrooms,
            bathrooms: self.bathrooms,
            size_sqm: self.size_sqm,
            property_type: self.property_type,
            url: self.url,
            listing_type: self.listing_type,
            scraped_at: Local::now(),
        })
    }
}
