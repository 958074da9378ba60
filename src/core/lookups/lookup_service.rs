// Text lookups against third-party services: cats, Urban Dictionary,
// Have I Been Pwned, geo-IP and web search.
//
// The service only sees the `LookupApi` and `SearchEngine` traits; the reqwest
// clients live in infra.

use super::lookup_models::{Breach, GeoIpRecord, PwnedStatus, SearchResult, UrbanEntry};
use crate::core::commands::CommandError;
use async_trait::async_trait;
use std::net::IpAddr;
use std::sync::Arc;

/// How many times `random_cat_url` asks before giving up.
const CAT_ATTEMPTS: usize = 3;

#[async_trait]
pub trait LookupApi: Send + Sync {
    /// URL of a random cat picture.
    async fn random_cat_url(&self) -> Result<String, CommandError>;
    async fn define(&self, term: &str) -> Result<Vec<UrbanEntry>, CommandError>;
    /// Breaches for an account. A 404 status means the account is clean.
    async fn breaches(&self, email: &str) -> Result<Vec<Breach>, CommandError>;
    async fn geoip(&self, ip: IpAddr) -> Result<GeoIpRecord, CommandError>;
}

/// Narrow seam around result scraping so the engine can be replaced without
/// touching the command.
#[async_trait]
pub trait SearchEngine: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, CommandError>;
}

pub struct LookupService {
    api: Arc<dyn LookupApi>,
    search: Arc<dyn SearchEngine>,
}

impl LookupService {
    pub fn new(api: Arc<dyn LookupApi>, search: Arc<dyn SearchEngine>) -> Self {
        Self { api, search }
    }

    /// Ask for a cat up to three times, skipping GIFs and failed requests.
    pub async fn random_cat_url(&self) -> Option<String> {
        for attempt in 1..=CAT_ATTEMPTS {
            match self.api.random_cat_url().await {
                Ok(url) if !url.to_lowercase().ends_with(".gif") => return Some(url),
                Ok(url) => tracing::debug!(attempt, %url, "Skipping GIF cat"),
                Err(err) => tracing::debug!(attempt, error = %err, "Cat lookup failed"),
            }
        }
        None
    }

    pub async fn urban(&self, term: &str) -> Result<Option<UrbanEntry>, CommandError> {
        let entries = self.api.define(term).await?;
        Ok(entries.into_iter().next())
    }

    pub async fn pwnd(&self, email: &str) -> Result<PwnedStatus, CommandError> {
        if !email.contains('@') {
            return Err(CommandError::invalid(format!(
                "`{}` is not an email address",
                email
            )));
        }

        match self.api.breaches(email).await {
            Ok(breaches) if breaches.is_empty() => Ok(PwnedStatus::Clean),
            Ok(breaches) => Ok(PwnedStatus::Breached(breaches)),
            Err(err) if err.is_not_found() => Ok(PwnedStatus::Clean),
            Err(err) => Err(err),
        }
    }

    pub async fn geoip(&self, raw_ip: &str) -> Result<GeoIpRecord, CommandError> {
        let ip: IpAddr = raw_ip
            .parse()
            .map_err(|_| CommandError::invalid(format!("`{}` is not an IP address", raw_ip)))?;
        self.api.geoip(ip).await
    }

    pub async fn google(&self, query: &str) -> Result<Option<SearchResult>, CommandError> {
        let results = self.search.search(query).await?;
        Ok(results.into_iter().next())
    }
}
