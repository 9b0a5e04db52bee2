use async_trait::async_trait;
use chrono::{Local, NaiveDate};
use nb_core::config::ScraperConfig;
use nb_core::{Candidate, Error, Result, SourceTag};
use reqwest::Client;
use scraper::{ElementRef, Html};

use super::utils;
use super::Scraper;

const CARD_SELECTOR: &str = "div[class*='duet--content-cards--content-card']";
const BODY_SELECTOR: &str = "div.duet--article--article-body-component";
const AI_KEYWORDS: &[&str] = &[
    "artificial intelligence",
    "chatgpt",
    "openai",
    "anthropic",
    "google",
    "meta",
    "tech",
];
const SKIPPED_PATHS: &[&str] = &["author", "tag", "search", "newsletter", "podcast"];

#[derive(Debug, Clone)]
pub struct VergeScraper {
    client: Client,
    recent_days: u32,
    max_items: usize,
}

/// A listing entry plus the teaser text shown on the card, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct VergeEntry {
    pub candidate: Candidate,
    pub preview: Option<String>,
}

impl VergeScraper {
    const BASE_URL: &'static str = "https://www.theverge.com";
    const AI_PAGE_URL: &'static str = "https://www.theverge.com/ai-artificial-intelligence";

    pub fn new(client: Client, config: &ScraperConfig) -> Self {
        Self {
            client,
            recent_days: config.recent_days,
            max_items: config.max_items_per_source,
        }
    }
}

/// `ai` only counts as a whole word, the other keywords as substrings.
pub fn mentions_ai(text: &str) -> bool {
    let lower = text.to_lowercase();
    lower
        .split(|c: char| !c.is_alphanumeric())
        .any(|word| word == "ai")
        || AI_KEYWORDS.iter().any(|k| lower.contains(k))
}

fn card_date(card: ElementRef<'_>, today: NaiveDate) -> Result<NaiveDate> {
    let time = utils::selector("time[datetime]")?;
    let date = card
        .select(&time)
        .next()
        .and_then(|t| t.value().attr("datetime"))
        .and_then(|raw| {
            let day = raw.split('T').next().unwrap_or(raw);
            NaiveDate::parse_from_str(day.trim(), "%Y-%m-%d").ok()
        });
    Ok(date.unwrap_or(today))
}

fn card_preview(card: ElementRef<'_>) -> Result<Option<String>> {
    let paragraphs = utils::selector("p")?;
    Ok(card
        .select(&paragraphs)
        .map(utils::element_text)
        .find(|text| text.chars().count() > 20)
        .map(|text| text.chars().take(200).collect()))
}

fn parse_cards(document: &Html, today: NaiveDate, recent_days: u32) -> Result<Vec<VergeEntry>> {
    let cards = utils::selector(CARD_SELECTOR)?;
    let anchors = utils::selector("a[href]")?;
    let headings = utils::selector("h2, h3")?;

    let mut entries = Vec::new();
    for card in document.select(&cards) {
        let Some(href) = card
            .select(&anchors)
            .next()
            .and_then(|a| a.value().attr("href"))
        else {
            continue;
        };
        let Some(title) = card
            .select(&headings)
            .next()
            .map(utils::element_text)
            .filter(|t| !t.is_empty())
        else {
            continue;
        };
        let Some(link) = utils::absolutize(VergeScraper::BASE_URL, href) else {
            continue;
        };

        let date = card_date(card, today)?;
        if !utils::is_recent(date, today, recent_days) {
            continue;
        }
        if !mentions_ai(&title) && !mentions_ai(&link) {
            continue;
        }

        entries.push(VergeEntry {
            candidate: Candidate::new(SourceTag::Verge, title, link),
            preview: card_preview(card)?,
        });
    }
    Ok(entries)
}

fn parse_fallback_links(document: &Html) -> Result<Vec<VergeEntry>> {
    let anchors = utils::selector("a[href^='/']")?;

    let mut entries = Vec::new();
    for anchor in document.select(&anchors) {
        let href = anchor.value().attr("href").unwrap_or_default();
        let text = utils::element_text(anchor);
        let lower_href = href.to_lowercase();

        if text.chars().count() <= 20
            || !mentions_ai(&text)
            || SKIPPED_PATHS.iter().any(|skip| lower_href.contains(skip))
        {
            continue;
        }
        if let Some(link) = utils::absolutize(VergeScraper::BASE_URL, href) {
            entries.push(VergeEntry {
                candidate: Candidate::new(SourceTag::Verge, text, link),
                preview: None,
            });
        }
    }
    Ok(entries)
}

/// AI stories from the section page. Cards first; plain links when fewer than two cards match.
pub fn parse_listing(html: &str, today: NaiveDate, recent_days: u32) -> Result<Vec<VergeEntry>> {
    let document = Html::parse_document(html);
    let mut entries = parse_cards(&document, today, recent_days)?;
    if entries.len() < 2 {
        entries.extend(parse_fallback_links(&document)?);
    }

    let mut seen = std::collections::HashSet::new();
    entries.retain(|e| seen.insert(e.candidate.link.clone()));
    Ok(entries)
}

pub fn parse_body(html: &str) -> Result<Option<String>> {
    utils::body_text(html, BODY_SELECTOR, 10)
}

#[async_trait]
impl Scraper for VergeScraper {
    fn source(&self) -> SourceTag {
        SourceTag::Verge
    }

    fn cli_names(&self) -> Vec<&str> {
        vec!["verge", "theverge"]
    }

    async fn fetch_candidates(&self) -> Result<Vec<Candidate>> {
        let today = Local::now().date_naive();
        let html = utils::fetch_html(&self.client, Self::AI_PAGE_URL)
            .await
            .map_err(|e| Error::SourceUnavailable {
                name: self.source().to_string(),
                reason: e.to_string(),
            })?;

        let mut entries = parse_listing(&html, today, self.recent_days)?;
        tracing::debug!(found = entries.len(), "verge listing");
        entries.truncate(self.max_items);

        let mut candidates = Vec::with_capacity(entries.len());
        for entry in entries {
            let body = match utils::fetch_html(&self.client, &entry.candidate.link).await {
                Ok(html) => parse_body(&html).unwrap_or_default(),
                Err(e) => {
                    tracing::warn!(link = %entry.candidate.link, error = %e, "verge body fetch failed");
                    None
                }
            };
            candidates.push(match body.or(entry.preview) {
                Some(text) => entry.candidate.with_content(text),
                None => entry.candidate,
            });
        }
        Ok(candidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 3).unwrap()
    }

    const CARDS: &str = r#"
        <div class="duet--content-cards--content-card _1ufh7nr1">
          <a href="/ai-artificial-intelligence/123/openai-voice-mode">
            <h2>OpenAI rolls out voice mode to everyone</h2>
          </a>
          <p>The feature lets you talk with ChatGPT in real time, no typing required.</p>
          <time datetime="2024-05-02T14:00:00+00:00">May 2</time>
        </div>
        <div class="duet--content-cards--content-card">
          <a href="/2024/5/3/24148/ai-pin-review"><h3>The AI Pin, reviewed</h3></a>
        </div>
        <div class="duet--content-cards--content-card">
          <a href="/games/99/old"><h2>A game from last month</h2></a>
          <time datetime="2024-04-01T10:00:00Z">Apr 1</time>
        </div>
        <div class="duet--content-cards--content-card">
          <a href="/cars/1/ev"><h2>A new electric bicycle</h2></a>
        </div>
    "#;

    #[test]
    fn test_mentions_ai() {
        assert!(mentions_ai("The AI Pin, reviewed"));
        assert!(mentions_ai("/ai-artificial-intelligence/123"));
        assert!(mentions_ai("Anthropic launches Claude"));
        assert!(!mentions_ai("A new electric bicycle"));
        assert!(!mentions_ai("Said the chair"));
    }

    #[test]
    fn test_parse_cards() {
        let entries = parse_listing(CARDS, today(), 3).unwrap();
        assert_eq!(entries.len(), 2);

        let first = &entries[0];
        assert_eq!(first.candidate.title, "OpenAI rolls out voice mode to everyone");
        assert_eq!(
            first.candidate.link,
            "https://www.theverge.com/ai-artificial-intelligence/123/openai-voice-mode"
        );
        assert_eq!(
            first.preview.as_deref(),
            Some("The feature lets you talk with ChatGPT in real time, no typing required.")
        );

        assert_eq!(entries[1].candidate.title, "The AI Pin, reviewed");
        assert!(entries[1].preview.is_none());
    }

    #[test]
    fn test_fallback_links() {
        let html = r#"
            <nav><a href="/authors/someone">Someone who writes about AI a lot</a></nav>
            <a href="/2024/5/3/1/anthropic-claude-team-plan">Anthropic launches a Claude team plan</a>
            <a href="/2024/5/3/2/short">AI</a>
            <a href="https://example.com/ai">External story about AI and robots</a>
        "#;
        let entries = parse_listing(html, today(), 3).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(
            entries[0].candidate.link,
            "https://www.theverge.com/2024/5/3/1/anthropic-claude-team-plan"
        );
    }

    #[test]
    fn test_parse_body() {
        let html = r#"
            <div class="duet--article--article-body-component"><p>OpenAI said the rollout starts today.</p></div>
            <div class="duet--article--article-body-component"><p>ok</p></div>
        "#;
        assert_eq!(
            parse_body(html).unwrap().as_deref(),
            Some("OpenAI said the rollout starts today.")
        );
    }
}
