//! Nairobi property listing crawler
//!
//! Fetches sale and rental listings from several Kenyan real-estate sites,
//! normalizes them into one record shape, deduplicates across sources and
//! writes a single CSV table.

pub mod config;
pub mod context;
pub mod dedup;
pub mod fetch;
pub mod logging;
pub mod models;
pub mod normalize;
pub mod pagination;
pub mod pipeline;
pub mod scrapers;
pub mod writer;

pub use config::{Args, ScrapeConfig};
pub use context::RunContext;
pub use models::{ListingRecord, ListingType};
