use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::net::IpAddr;
use std::time::Duration;

use crate::core::commands::CommandError;
use crate::core::lookups::{Breach, GeoIpRecord, LookupApi, UrbanEntry, UrbanResponse};
use crate::core::media::MediaFetcher;

/// Largest body `HttpMediaFetcher` will buffer.
pub const MAX_MEDIA_BYTES: usize = 16 * 1024 * 1024;

const USER_AGENT: &str = "UtilityBot/0.1";

/// Base URLs of the JSON APIs behind the lookup commands.
#[derive(Debug, Clone)]
pub struct LookupEndpoints {
    pub cat: String,
    pub urban: String,
    pub hibp: String,
    pub geoip: String,
}

impl Default for LookupEndpoints {
    fn default() -> Self {
        Self {
            cat: "https://api.thecatapi.com/v1/images/search".to_string(),
            urban: "https://api.urbandictionary.com/v0/define".to_string(),
            hibp: "https://haveibeenpwned.com/api/v3".to_string(),
            geoip: "https://json.geoiplookup.io".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CatImage {
    url: String,
}

pub(crate) fn transport_error(err: reqwest::Error) -> CommandError {
    if err.is_timeout() {
        CommandError::Transport("timed out".to_string())
    } else {
        CommandError::Transport(err.to_string())
    }
}

/// Fail on anything outside 2xx, keeping the status and URL for the warning.
pub(crate) fn ensure_success(response: Response) -> Result<Response, CommandError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(CommandError::Status {
            status: status.as_u16(),
            url: response.url().to_string(),
        })
    }
}

fn join_segments(base: &str, segments: &[&str]) -> Result<Url, CommandError> {
    let mut url = Url::parse(base).map_err(|e| CommandError::Transport(e.to_string()))?;
    {
        let mut path = url
            .path_segments_mut()
            .map_err(|_| CommandError::Transport(format!("{} cannot be a base URL", base)))?;
        path.pop_if_empty();
        for segment in segments {
            path.push(segment);
        }
    }
    Ok(url)
}

/// reqwest client for the cat, Urban Dictionary, HIBP and geo-IP APIs.
pub struct HttpLookupClient {
    client: Client,
    endpoints: LookupEndpoints,
    hibp_api_key: Option<String>,
}

impl HttpLookupClient {
    pub fn new(
        timeout: Duration,
        endpoints: LookupEndpoints,
        hibp_api_key: Option<String>,
    ) -> anyhow::Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert("User-Agent", HeaderValue::from_static(USER_AGENT));
        headers.insert("Accept", HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            endpoints,
            hibp_api_key,
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, CommandError> {
        let response = request.send().await.map_err(transport_error)?;
        let response = ensure_success(response)?;
        response
            .json::<T>()
            .await
            .map_err(|e| CommandError::Decode(e.to_string()))
    }
}

#[async_trait]
impl LookupApi for HttpLookupClient {
    async fn random_cat_url(&self) -> Result<String, CommandError> {
        let images: Vec<CatImage> = self.get_json(self.client.get(&self.endpoints.cat)).await?;
        images
            .into_iter()
            .next()
            .map(|image| image.url)
            .ok_or_else(|| CommandError::Decode("cat API returned no images".to_string()))
    }

    async fn define(&self, term: &str) -> Result<Vec<UrbanEntry>, CommandError> {
        let request = self.client.get(&self.endpoints.urban).query(&[("term", term)]);
        let response: UrbanResponse = self.get_json(request).await?;
        Ok(response.list)
    }

    async fn breaches(&self, email: &str) -> Result<Vec<Breach>, CommandError> {
        let url = join_segments(&self.endpoints.hibp, &["breachedaccount", email])?;
        let mut request = self
            .client
            .get(url)
            .query(&[("truncateResponse", "false")]);
        if let Some(key) = &self.hibp_api_key {
            request = request.header("hibp-api-key", key);
        }
        self.get_json(request).await
    }

    async fn geoip(&self, ip: IpAddr) -> Result<GeoIpRecord, CommandError> {
        let url = join_segments(&self.endpoints.geoip, &[&ip.to_string()])?;
        self.get_json(self.client.get(url)).await
    }
}

/// Raw byte downloads for emoji and user-supplied images.
pub struct HttpMediaFetcher {
    client: Client,
}

impl HttpMediaFetcher {
    pub fn new() -> anyhow::Result<Self> {
        let client = Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl MediaFetcher for HttpMediaFetcher {
    async fn fetch(&self, url: &str, timeout: Duration) -> Result<Vec<u8>, CommandError> {
        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(transport_error)?;
        let mut response = ensure_success(response)?;

        if let Some(length) = response.content_length() {
            if length > MAX_MEDIA_BYTES as u64 {
                return Err(CommandError::invalid("file is too large"));
            }
        }

        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await.map_err(transport_error)? {
            if body.len() + chunk.len() > MAX_MEDIA_BYTES {
                return Err(CommandError::invalid("file is too large"));
            }
            body.extend_from_slice(&chunk);
        }
        Ok(body)
    }
}
