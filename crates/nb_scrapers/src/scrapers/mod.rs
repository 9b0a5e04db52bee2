use async_trait::async_trait;
use nb_core::config::ScraperConfig;
use nb_core::{Candidate, Result, SourceTag};

pub mod github;
pub mod techcrunch;
pub mod verge;

use github::GitHubTrendingScraper;
use techcrunch::TechCrunchScraper;
use verge::VergeScraper;

#[async_trait]
pub trait Scraper: Send + Sync {
    /// The source this scraper reads
    fn source(&self) -> SourceTag;

    /// Returns a list of CLI shorthand names for this scraper
    fn cli_names(&self) -> Vec<&str> {
        vec![self.source().cli_name()]
    }

    /// One attempt at the source. Candidates are unique by link, in page order.
    async fn fetch_candidates(&self) -> Result<Vec<Candidate>>;
}

/// Enum that holds all possible scraper types
#[derive(Debug, Clone)]
pub enum ScraperType {
    TechCrunch(TechCrunchScraper),
    Verge(VergeScraper),
    GitHub(GitHubTrendingScraper),
}

impl ScraperType {
    pub fn new(tag: SourceTag, client: reqwest::Client, config: &ScraperConfig) -> Self {
        match tag {
            SourceTag::TechCrunch => ScraperType::TechCrunch(TechCrunchScraper::new(client, config)),
            SourceTag::Verge => ScraperType::Verge(VergeScraper::new(client, config)),
            SourceTag::GitHub => ScraperType::GitHub(GitHubTrendingScraper::new(client, config)),
        }
    }

    /// Builds every configured scraper around one shared HTTP client.
    pub fn from_config(config: &ScraperConfig) -> Result<Vec<ScraperType>> {
        let client = utils::build_client(config)?;
        Ok(config
            .source_tags()?
            .into_iter()
            .map(|tag| ScraperType::new(tag, client.clone(), config))
            .collect())
    }
}

#[async_trait]
impl Scraper for ScraperType {
    fn source(&self) -> SourceTag {
        match self {
            ScraperType::TechCrunch(s) => s.source(),
            ScraperType::Verge(s) => s.source(),
            ScraperType::GitHub(s) => s.source(),
        }
    }

    fn cli_names(&self) -> Vec<&str> {
        match self {
            ScraperType::TechCrunch(s) => s.cli_names(),
            ScraperType::Verge(s) => s.cli_names(),
            ScraperType::GitHub(s) => s.cli_names(),
        }
    }

    async fn fetch_candidates(&self) -> Result<Vec<Candidate>> {
        match self {
            ScraperType::TechCrunch(s) => s.fetch_candidates().await,
            ScraperType::Verge(s) => s.fetch_candidates().await,
            ScraperType::GitHub(s) => s.fetch_candidates().await,
        }
    }
}

/// Common utilities for scrapers
pub(crate) mod utils {
    use std::collections::HashSet;
    use std::time::Duration;

    use chrono::{Duration as ChronoDuration, NaiveDate};
    use nb_core::config::ScraperConfig;
    use nb_core::{Candidate, Error, Result};
    use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
    use reqwest::Client;
    use scraper::{ElementRef, Html, Selector};
    use url::Url;

    pub fn build_client(config: &ScraperConfig) -> Result<Client> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));

        Ok(Client::builder()
            .user_agent(config.user_agent.as_str())
            .default_headers(headers)
            .timeout(Duration::from_secs(config.request_timeout_secs.max(1)))
            .build()?)
    }

    pub async fn fetch_html(client: &Client, url: &str) -> Result<String> {
        let response = client.get(url).send().await?.error_for_status()?;
        Ok(response.text().await?)
    }

    pub fn selector(selector: &str) -> Result<Selector> {
        Selector::parse(selector)
            .map_err(|e| Error::Scraping(format!("Invalid selector {}: {:?}", selector, e)))
    }

    /// Resolves `href` against `base`, keeping only http(s) results.
    pub fn absolutize(base: &str, href: &str) -> Option<String> {
        let joined = Url::parse(base).ok()?.join(href.trim()).ok()?;
        match joined.scheme() {
            "http" | "https" => Some(joined.to_string()),
            _ => None,
        }
    }

    pub fn collapse_whitespace(text: &str) -> String {
        text.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    pub fn element_text(element: ElementRef<'_>) -> String {
        collapse_whitespace(&element.text().collect::<String>())
    }

    pub fn extract_texts(document: &Html, selector_str: &str) -> Result<Vec<String>> {
        let selector = selector(selector_str)?;
        Ok(document.select(&selector).map(element_text).collect())
    }

    /// Article body: paragraphs from `primary`, or from every `p` when it matches nothing.
    /// Paragraphs of `min_len` chars or fewer are dropped.
    pub fn body_text(html: &str, primary: &str, min_len: usize) -> Result<Option<String>> {
        let document = Html::parse_document(html);
        let mut paragraphs = extract_texts(&document, primary)?;
        if paragraphs.is_empty() {
            paragraphs = extract_texts(&document, "p")?;
        }

        let kept: Vec<String> = paragraphs
            .into_iter()
            .filter(|p| p.chars().count() > min_len)
            .collect();
        Ok(if kept.is_empty() { None } else { Some(kept.join("\n")) })
    }

    /// True when `date` falls in the `days` days ending at `today`, today included.
    pub fn is_recent(date: NaiveDate, today: NaiveDate, days: u32) -> bool {
        date <= today && date > today - ChronoDuration::days(i64::from(days.max(1)))
    }

    pub fn dedup_by_link(candidates: Vec<Candidate>) -> Vec<Candidate> {
        let mut seen = HashSet::new();
        candidates
            .into_iter()
            .filter(|c| seen.insert(c.link.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::utils;
    use super::*;
    use chrono::NaiveDate;
    use scraper::Html;

    #[test]
    fn test_extract_texts() {
        let html = r#"
            <div class="item">Item 1</div>
            <div class="item">Item 2</div>
        "#;
        let document = Html::parse_document(html);

        let texts = utils::extract_texts(&document, ".item").unwrap();
        assert_eq!(texts, vec!["Item 1", "Item 2"]);
    }

    #[test]
    fn test_absolutize() {
        assert_eq!(
            utils::absolutize("https://www.theverge.com", "/ai/1234/story").as_deref(),
            Some("https://www.theverge.com/ai/1234/story")
        );
        assert_eq!(
            utils::absolutize("https://github.com", "https://techcrunch.com/a").as_deref(),
            Some("https://techcrunch.com/a")
        );
        assert!(utils::absolutize("https://github.com", "javascript:void(0)").is_none());
    }

    #[test]
    fn test_body_text_falls_back_to_paragraphs() {
        let html = r#"<article><p>short</p><p>This paragraph is long enough.</p></article>"#;
        let body = utils::body_text(html, "div.entry-content p", 10).unwrap();
        assert_eq!(body.as_deref(), Some("This paragraph is long enough."));

        assert!(utils::body_text("<p>tiny</p>", "div.x p", 10).unwrap().is_none());
    }

    #[test]
    fn test_is_recent() {
        let today = NaiveDate::from_ymd_opt(2024, 5, 3).unwrap();
        let day = |d| NaiveDate::from_ymd_opt(2024, 5, d).unwrap();
        assert!(utils::is_recent(day(3), today, 3));
        assert!(utils::is_recent(day(1), today, 3));
        assert!(!utils::is_recent(NaiveDate::from_ymd_opt(2024, 4, 30).unwrap(), today, 3));
        assert!(!utils::is_recent(day(4), today, 3));
    }

    #[test]
    fn test_dedup_by_link_keeps_first() {
        let list = vec![
            Candidate::new(SourceTag::Verge, "first", "https://v/1"),
            Candidate::new(SourceTag::Verge, "other", "https://v/2"),
            Candidate::new(SourceTag::Verge, "again", "https://v/1"),
        ];
        let unique = utils::dedup_by_link(list);
        assert_eq!(unique.len(), 2);
        assert_eq!(unique[0].title, "first");
    }

    #[test]
    fn test_from_config_follows_sources() {
        let config = ScraperConfig {
            sources: vec!["github".to_string(), "verge".to_string()],
            ..ScraperConfig::default()
        };
        let scrapers = ScraperType::from_config(&config).unwrap();
        let tags: Vec<SourceTag> = scrapers.iter().map(|s| s.source()).collect();
        assert_eq!(tags, vec![SourceTag::GitHub, SourceTag::Verge]);
        assert!(scrapers[0].cli_names().contains(&"github"));
    }
}
