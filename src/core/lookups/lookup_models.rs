use serde::Deserialize;

/// One Urban Dictionary definition.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct UrbanEntry {
    pub word: String,
    pub definition: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UrbanResponse {
    #[serde(default)]
    pub list: Vec<UrbanEntry>,
}

/// A breach record as reported by Have I Been Pwned.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct Breach {
    pub title: String,
    #[serde(default)]
    pub domain: String,
    pub breach_date: String,
}

impl Breach {
    pub fn summary(&self) -> String {
        format!("{} - {} ({})", self.breach_date, self.title, self.domain)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PwnedStatus {
    Clean,
    Breached(Vec<Breach>),
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct GeoIpRecord {
    #[serde(default)]
    pub isp: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub country_code: String,
    #[serde(default)]
    pub latitude: f64,
    #[serde(default)]
    pub longitude: f64,
}

impl GeoIpRecord {
    pub fn summary(&self) -> String {
        format!(
            "{} - {}, {} ({}) | {}, {}",
            self.isp, self.city, self.region, self.country_code, self.latitude, self.longitude
        )
    }
}

/// First-class search hit, independent of whichever engine produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    pub snippet: String,
}
