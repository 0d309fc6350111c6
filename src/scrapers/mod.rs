pub mod buyrentkenya;
pub mod dom;
pub mod embedded;
pub mod jiji;
pub mod patterns;
pub mod pigiame;
pub mod property24;
pub mod text_pattern;
pub mod traits;
pub mod types;

pub use buyrentkenya::BuyRentKenya;
pub use jiji::Jiji;
pub use pigiame::PigiaMe;
pub use property24::Property24;
pub use traits::ListingScraper;
pub use types::{PageProgress, Strategy};

/// Every known source, in crawl order: plain-HTTP sources first, then the
/// browser-driven ones
pub fn all_sources(region: &str) -> Vec<Box<dyn ListingScraper>> {
    vec![
        Box::new(BuyRentKenya::new(buyrentkenya::BASE_URL, region)),
        Box::new(Jiji::new(jiji::BASE_URL, region)),
        Box::new(Property24::new(property24::BASE_URL, region)),
        Box::new(PigiaMe::new(pigiame::BASE_URL, region)),
    ]
}
