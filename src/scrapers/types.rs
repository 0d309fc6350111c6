use std::fmt;

/// Extraction strategies, in the order extractors usually try them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// JSON payload embedded in the page
    Structured,
    /// CSS selectors over listing cards
    Dom,
    /// Regex over page text, last resort
    TextPattern,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Structured => "structured",
            Self::Dom => "dom",
            Self::TextPattern => "text-pattern",
        })
    }
}

/// Where pagination stands after a page has been extracted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageProgress {
    /// 1-based number of the page just processed
    pub page: u32,
    /// Records extracted from that page
    pub page_records: usize,
    /// Records accumulated for this query so far, including this page
    pub collected: usize,
    pub max_pages: u32,
}
