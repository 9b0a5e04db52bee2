use async_trait::async_trait;
use chrono::{Local, NaiveDate};
use nb_core::config::ScraperConfig;
use nb_core::{Candidate, Error, Result, SourceTag};
use reqwest::Client;
use scraper::Html;
use url::Url;

use super::utils;
use super::Scraper;

const LISTING_SELECTOR: &str = "h3.loop-card__title a.loop-card__title-link";
const BODY_SELECTOR: &str = "div.entry-content p.wp-block-paragraph";

#[derive(Debug, Clone)]
pub struct TechCrunchScraper {
    client: Client,
    max_pages: u32,
    recent_days: u32,
    max_items: usize,
}

impl TechCrunchScraper {
    const BASE_URL: &'static str = "https://techcrunch.com";

    pub fn new(client: Client, config: &ScraperConfig) -> Self {
        Self {
            client,
            max_pages: config.techcrunch_max_pages.max(1),
            recent_days: config.recent_days,
            max_items: config.max_items_per_source,
        }
    }

    fn page_url(page: u32) -> String {
        format!("{}/latest/page/{}", Self::BASE_URL, page)
    }
}

/// Publish date from a `/YYYY/MM/DD/slug` article path.
pub fn date_from_link(link: &str) -> Option<NaiveDate> {
    let url = Url::parse(link).ok()?;
    let mut segments = url.path_segments()?;
    let year = segments.next()?.parse().ok()?;
    let month = segments.next()?.parse().ok()?;
    let day = segments.next()?.parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Recent articles on one listing page, without bodies.
pub fn parse_listing(html: &str, today: NaiveDate, recent_days: u32) -> Result<Vec<Candidate>> {
    let document = Html::parse_document(html);
    let links = utils::selector(LISTING_SELECTOR)?;

    let mut candidates = Vec::new();
    for anchor in document.select(&links) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        let Some(link) = utils::absolutize(TechCrunchScraper::BASE_URL, href) else {
            continue;
        };
        let title = utils::element_text(anchor);
        if title.is_empty() {
            continue;
        }

        match date_from_link(&link) {
            Some(date) if utils::is_recent(date, today, recent_days) => {
                candidates.push(Candidate::new(SourceTag::TechCrunch, title, link));
            }
            Some(_) => {}
            None => tracing::debug!(%link, "no date in techcrunch link"),
        }
    }
    Ok(candidates)
}

pub fn parse_body(html: &str) -> Result<Option<String>> {
    utils::body_text(html, BODY_SELECTOR, 10)
}

#[async_trait]
impl Scraper for TechCrunchScraper {
    fn source(&self) -> SourceTag {
        SourceTag::TechCrunch
    }

    fn cli_names(&self) -> Vec<&str> {
        vec!["techcrunch", "tc"]
    }

    async fn fetch_candidates(&self) -> Result<Vec<Candidate>> {
        let today = Local::now().date_naive();
        let mut listed = Vec::new();
        let mut failures = Vec::new();

        for page in 1..=self.max_pages {
            let url = Self::page_url(page);
            let parsed = match utils::fetch_html(&self.client, &url).await {
                Ok(html) => parse_listing(&html, today, self.recent_days),
                Err(e) => Err(e),
            };
            match parsed {
                Ok(found) => {
                    tracing::debug!(page, found = found.len(), "techcrunch listing page");
                    listed.extend(found);
                }
                Err(e) => {
                    tracing::warn!(page, error = %e, "techcrunch listing page failed");
                    failures.push(format!("page {}: {}", page, e));
                }
            }
        }

        if failures.len() as u32 == self.max_pages {
            return Err(Error::SourceUnavailable {
                name: self.source().to_string(),
                reason: failures.join("; "),
            });
        }

        let mut candidates = utils::dedup_by_link(listed);
        candidates.truncate(self.max_items);

        let mut enriched = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            let body = match utils::fetch_html(&self.client, &candidate.link).await {
                Ok(html) => parse_body(&html).unwrap_or_default(),
                Err(e) => {
                    tracing::warn!(link = %candidate.link, error = %e, "techcrunch body fetch failed");
                    None
                }
            };
            enriched.push(match body {
                Some(text) => candidate.with_content(text),
                None => candidate,
            });
        }
        Ok(enriched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = r#"
        <ul class="wp-block-post-template">
          <li>
            <h3 class="loop-card__title">
              <a class="loop-card__title-link" href="https://techcrunch.com/2024/05/03/openai-ships-a-new-model/">
                OpenAI ships a new model
              </a>
            </h3>
          </li>
          <li>
            <h3 class="loop-card__title">
              <a class="loop-card__title-link" href="https://techcrunch.com/2024/05/01/anthropic-raises/">Anthropic raises</a>
            </h3>
          </li>
          <li>
            <h3 class="loop-card__title">
              <a class="loop-card__title-link" href="https://techcrunch.com/2024/04/20/old-news/">Old news</a>
            </h3>
          </li>
          <li>
            <h3 class="loop-card__title">
              <a class="loop-card__title-link" href="https://techcrunch.com/events/disrupt/">Disrupt</a>
            </h3>
          </li>
        </ul>
    "#;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 3).unwrap()
    }

    #[test]
    fn test_date_from_link() {
        assert_eq!(
            date_from_link("https://techcrunch.com/2024/05/03/slug/"),
            NaiveDate::from_ymd_opt(2024, 5, 3)
        );
        assert!(date_from_link("https://techcrunch.com/events/disrupt/").is_none());
        assert!(date_from_link("https://techcrunch.com/2024/13/40/bad/").is_none());
    }

    #[test]
    fn test_parse_listing_keeps_recent_articles() {
        let candidates = parse_listing(LISTING, today(), 3).unwrap();
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].title, "OpenAI ships a new model");
        assert_eq!(
            candidates[0].link,
            "https://techcrunch.com/2024/05/03/openai-ships-a-new-model/"
        );
        assert_eq!(candidates[0].tag, SourceTag::TechCrunch);
        assert!(candidates[0].content.is_none());
        assert_eq!(candidates[1].title, "Anthropic raises");
    }

    #[test]
    fn test_parse_listing_without_matches() {
        assert!(parse_listing("<html><body></body></html>", today(), 3)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_parse_body() {
        let html = r#"
            <div class="entry-content wp-block-post-content">
              <p class="wp-block-paragraph">OpenAI on Friday released a new model.</p>
              <p class="wp-block-paragraph">Short.</p>
              <p class="wp-block-paragraph">It is available to paying users first.</p>
              <p>Newsletter signup footer text</p>
            </div>
        "#;
        assert_eq!(
            parse_body(html).unwrap().as_deref(),
            Some("OpenAI on Friday released a new model.\nIt is available to paying users first.")
        );
    }

    #[test]
    fn test_page_url() {
        assert_eq!(TechCrunchScraper::page_url(2), "https://techcrunch.com/latest/page/2");
    }
}
