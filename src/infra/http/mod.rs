pub mod google_scraper;
pub mod web_client;

pub use google_scraper::GoogleScraper;
pub use web_client::{HttpLookupClient, HttpMediaFetcher, LookupEndpoints};
