//! Regexes shared by the site extractors

use regex::Regex;
use std::sync::LazyLock;

/// Kenyan shilling price token, e.g. `KSh 12,500,000`
pub static PRICE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"KSh\s*\d[\d,]*(?:\.\d+)?").expect("hardcoded regex pattern is valid"));

pub static BEDROOMS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)\s*Bedrooms?").expect("hardcoded regex pattern is valid"));

pub static BATHROOMS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)\s*Bathrooms?").expect("hardcoded regex pattern is valid"));

pub static SIZE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([\d,]+)\s*m²").expect("hardcoded regex pattern is valid"));

/// Short bedroom mention inside a title, e.g. `3 Bed` or `2bed`
pub static BED_SHORT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)\s*[Bb]ed").expect("hardcoded regex pattern is valid"));

/// Start of a title-like phrase: plain words ending in a property keyword
pub static TITLE_PHRASE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[\w ,'&/-]*(?:[Bb]ed|[Aa]partment|[Hh]ouse|[Vv]illa|[Ss]tudio)")
        .expect("hardcoded regex pattern is valid")
});

/// Link text of a "next page" affordance
pub static NEXT_TEXT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bnext\b|›|»").expect("hardcoded regex pattern is valid"));

pub static PAGE_PARAM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)[?&]page=(\d+)").expect("hardcoded regex pattern is valid"));

/// First match of `re` in `text`, or an empty string
pub fn find(re: &Regex, text: &str) -> String {
    re.find(text).map(|m| m.as_str().to_string()).unwrap_or_default()
}
