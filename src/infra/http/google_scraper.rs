// Scrapes the plain-HTML Google results page. Google serves this variant to
// clients that do not look like a full browser, so no API key is needed.

use async_trait::async_trait;
use reqwest::{Client, Url};
use scraper::{ElementRef, Html, Selector};
use std::time::Duration;

use super::web_client::{ensure_success, transport_error};
use crate::core::commands::CommandError;
use crate::core::lookups::{SearchEngine, SearchResult};

const SNIPPET_MAX_CHARS: usize = 300;

pub struct GoogleScraper {
    client: Client,
    search_url: String,
}

impl GoogleScraper {
    pub fn new(timeout: Duration, search_url: String) -> anyhow::Result<Self> {
        let client = Client::builder()
            .user_agent("Mozilla/5.0 (compatible; UtilityBot/0.1)")
            .timeout(timeout)
            .build()?;
        Ok(Self { client, search_url })
    }
}

#[async_trait]
impl SearchEngine for GoogleScraper {
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, CommandError> {
        let response = self
            .client
            .get(&self.search_url)
            .query(&[("hl", "en"), ("q", query), ("safe", "off")])
            .send()
            .await
            .map_err(transport_error)?;
        let html = ensure_success(response)?
            .text()
            .await
            .map_err(|e| CommandError::Decode(e.to_string()))?;

        let results = parse_results(&html)?;
        tracing::debug!(query, count = results.len(), "Scraped search results");
        Ok(results)
    }
}

fn selector(css: &str) -> Result<Selector, CommandError> {
    Selector::parse(css)
        .map_err(|e| CommandError::Decode(format!("bad selector {:?}: {:?}", css, e)))
}

/// Pull organic results out of a results page, in page order.
///
/// A result is a link with an `<h3>` title somewhere inside it. Internal
/// links (`/search?...`, image tabs) are skipped; `/url?q=` redirects are
/// unwrapped. The snippet is the text of the smallest enclosing block that
/// holds nothing but this result, minus the link itself.
pub fn parse_results(html: &str) -> Result<Vec<SearchResult>, CommandError> {
    let document = Html::parse_document(html);
    let anchor_selector = selector("a[href]")?;
    let title_selector = selector("h3")?;

    let hits: Vec<(ElementRef, ElementRef, String)> = document
        .select(&anchor_selector)
        .filter_map(|anchor| {
            let title = anchor.select(&title_selector).next()?;
            let url = resolve_href(anchor.value().attr("href")?)?;
            Some((anchor, title, url))
        })
        .collect();
    Ok(hits
        .iter()
        .map(|(anchor, title, url)| SearchResult {
            title: collapse_whitespace(title.text()),
            url: url.clone(),
            snippet: truncate_chars(&snippet_for(*anchor, &hits), SNIPPET_MAX_CHARS),
        })
        .collect())
}

fn snippet_for(anchor: ElementRef, hits: &[(ElementRef, ElementRef, String)]) -> String {
    for ancestor in anchor.ancestors().filter_map(ElementRef::wrap) {
        let hits_inside = ancestor
            .descendants()
            .filter(|node| hits.iter().any(|(hit, _, _)| hit.id() == node.id()))
            .count();
        if hits_inside > 1 {
            break;
        }

        let text = collapse_whitespace(ancestor.descendants().filter_map(|node| {
            let text = node.value().as_text()?;
            let in_anchor = node.ancestors().any(|parent| parent.id() == anchor.id());
            (!in_anchor).then(|| &**text)
        }));
        if !text.is_empty() {
            return text;
        }
    }
    String::new()
}

fn resolve_href(href: &str) -> Option<String> {
    if href.starts_with("/url?") {
        let url = Url::parse("https://www.google.com").ok()?.join(href).ok()?;
        return url
            .query_pairs()
            .find(|(key, _)| key == "q")
            .map(|(_, value)| value.into_owned())
            .filter(|target| target.starts_with("http"));
    }
    if href.starts_with("http://") || href.starts_with("https://") {
        return Some(href.to_string());
    }
    None
}

/// Join text pieces with single spaces.
fn collapse_whitespace<'a>(pieces: impl Iterator<Item = &'a str>) -> String {
    pieces
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => format!("{}...", text[..cut].trim_end()),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
<html><body>
<div><a href="/search?q=rust&amp;tbm=isch"><div>Images</div></a></div>
<div class="g">
  <a href="/url?q=https://www.rust-lang.org/&amp;sa=U&amp;ved=2ahUKE"><h3 class="zBAuLc"><div class="BNeawe">Rust Programming Language</div></h3><div class="BNeawe UPmit">www.rust-lang.org</div></a>
  <div class="kCrYT"><div class="BNeawe s3v9rd">A language empowering everyone to build reliable and efficient software.</div></div>
</div>
<div class="g">
  <a href="/url?q=https://en.wikipedia.org/wiki/Rust_(programming_language)&amp;sa=U"><h3 class="zBAuLc"><div>Rust (programming language) - Wikipedia</div></h3></a>
  <div><span>Rust is a general&#8209;purpose language &amp; it&#39;s fast.</span></div>
</div>
<div class="g">
  <a href="/search?q=rust+book"><h3>Related: rust book</h3></a>
</div>
</body></html>
"#;

    #[test]
    fn parses_organic_results_in_order() {
        let results = parse_results(PAGE).unwrap();
        assert_eq!(results.len(), 2);

        assert_eq!(results[0].title, "Rust Programming Language");
        assert_eq!(results[0].url, "https://www.rust-lang.org/");
        assert_eq!(
            results[0].snippet,
            "A language empowering everyone to build reliable and efficient software."
        );

        assert_eq!(
            results[1].url,
            "https://en.wikipedia.org/wiki/Rust_(programming_language)"
        );
        assert_eq!(results[1].title, "Rust (programming language) - Wikipedia");
        assert_eq!(
            results[1].snippet,
            "Rust is a general\u{2011}purpose language & it's fast."
        );
    }

    #[test]
    fn numeric_entities_are_decoded() {
        let page = r#"<a href="/url?q=https://a.test/&amp;sa=U"><h3>Tom &#38; Jerry&#8217;s</h3></a><div>Snip &#x2F; here</div>"#;
        let results = parse_results(page).unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].url, "https://a.test/");
        assert_eq!(results[0].title, "Tom & Jerry\u{2019}s");
        assert_eq!(results[0].snippet, "Snip / here");
    }

    #[test]
    fn titles_wrapped_in_extra_markup_are_found() {
        let page = r#"
<div class="g"><a href="/url?q=https://a.test/&amp;sa=U"><div class="DnJfK"><h3><span>Wrapped</span> title</h3></div></a><div>First snippet</div></div>
<div class="g"><a href="https://b.test/"><div><div><h3>Second</h3></div></div></a><div>Second snippet</div></div>
"#;
        let results = parse_results(page).unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].title, "Wrapped title");
        assert_eq!(results[0].snippet, "First snippet");
        assert_eq!(results[1].url, "https://b.test/");
        assert_eq!(results[1].snippet, "Second snippet");
    }

    #[test]
    fn redirect_targets_are_percent_decoded() {
        let url = resolve_href("/url?q=https://example.com/a%20b&sa=U").unwrap();
        assert_eq!(url, "https://example.com/a b");
    }

    #[test]
    fn direct_links_pass_through_and_internal_links_are_dropped() {
        assert_eq!(
            resolve_href("https://example.com/"),
            Some("https://example.com/".to_string())
        );
        assert_eq!(resolve_href("/search?q=x"), None);
        assert_eq!(resolve_href("/url?q=/search%3Fq%3Dx"), None);
    }

    #[test]
    fn page_without_results_yields_nothing() {
        assert!(parse_results("<html><body>No results</body></html>")
            .unwrap()
            .is_empty());
    }

    #[test]
    fn long_snippets_are_cut() {
        let long = "word ".repeat(200);
        let cut = truncate_chars(long.trim(), SNIPPET_MAX_CHARS);
        assert!(cut.ends_with("..."));
        assert!(cut.chars().count() <= SNIPPET_MAX_CHARS + 3);
    }
}
