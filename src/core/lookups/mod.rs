pub mod lookup_models;
pub mod lookup_service;

pub use lookup_models::{Breach, GeoIpRecord, PwnedStatus, SearchResult, UrbanEntry, UrbanResponse};
pub use lookup_service::{LookupApi, LookupService, SearchEngine};
