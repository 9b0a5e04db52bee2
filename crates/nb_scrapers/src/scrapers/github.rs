use async_trait::async_trait;
use nb_core::config::{ScraperConfig, TrendingRange};
use nb_core::{Candidate, Error, Result, SourceTag};
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};

use super::utils;
use super::Scraper;

#[derive(Debug, Clone)]
pub struct GitHubTrendingScraper {
    client: Client,
    since: TrendingRange,
    limit: usize,
}

impl GitHubTrendingScraper {
    const BASE_URL: &'static str = "https://github.com";

    pub fn new(client: Client, config: &ScraperConfig) -> Self {
        Self {
            client,
            since: config.github_since,
            limit: config.github_limit.min(config.max_items_per_source),
        }
    }

    pub fn trending_url(&self) -> String {
        format!("{}/trending?since={}", Self::BASE_URL, self.since.as_str())
    }
}

struct RowSelectors {
    title: Selector,
    description: Selector,
    language: Selector,
    stars: Selector,
    growth: Selector,
}

impl RowSelectors {
    fn new() -> Result<Self> {
        Ok(Self {
            title: utils::selector("h2 a, h1 a")?,
            description: utils::selector("p")?,
            language: utils::selector("span[itemprop='programmingLanguage']")?,
            stars: utils::selector("a.Link--muted")?,
            growth: utils::selector("span.d-inline-block.float-sm-right")?,
        })
    }
}

fn first_text(row: ElementRef<'_>, selector: &Selector) -> Option<String> {
    row.select(selector)
        .next()
        .map(utils::element_text)
        .filter(|t| !t.is_empty())
}

fn parse_row(row: ElementRef<'_>, selectors: &RowSelectors) -> Option<Candidate> {
    let anchor = row.select(&selectors.title).next()?;
    let href = anchor.value().attr("href")?;
    let link = utils::absolutize(GitHubTrendingScraper::BASE_URL, href)?;
    let name: String = anchor.text().collect::<String>().split_whitespace().collect();
    if name.is_empty() {
        return None;
    }

    let description =
        first_text(row, &selectors.description).unwrap_or_else(|| "No description available".to_string());
    let language = first_text(row, &selectors.language).unwrap_or_else(|| "Unknown".to_string());
    let stars = first_text(row, &selectors.stars).unwrap_or_else(|| "0".to_string());
    let growth = first_text(row, &selectors.growth).filter(|t| t.contains("stars"));

    let mut lines = vec![
        format!("Repository: {}", name),
        format!("Description: {}", description),
        format!("Programming Language: {}", language),
        format!("Total Stars: {}", stars),
    ];
    if let Some(growth) = growth {
        lines.push(format!("Today's Growth: {}", growth));
    }

    Some(Candidate::new(SourceTag::GitHub, name, link).with_content(lines.join("\n")))
}

/// Trending rows in page order, at most `limit`.
pub fn parse_trending(html: &str, limit: usize) -> Result<Vec<Candidate>> {
    let document = Html::parse_document(html);
    let selectors = RowSelectors::new()?;

    let mut rows: Vec<ElementRef<'_>> = document.select(&utils::selector("article.Box-row")?).collect();
    if rows.is_empty() {
        rows = document.select(&utils::selector("div.Box-row")?).collect();
    }

    let candidates = rows
        .into_iter()
        .filter_map(|row| parse_row(row, &selectors))
        .collect();
    let mut candidates = utils::dedup_by_link(candidates);
    candidates.truncate(limit);
    Ok(candidates)
}

#[async_trait]
impl Scraper for GitHubTrendingScraper {
    fn source(&self) -> SourceTag {
        SourceTag::GitHub
    }

    fn cli_names(&self) -> Vec<&str> {
        vec!["github", "gh", "trending"]
    }

    async fn fetch_candidates(&self) -> Result<Vec<Candidate>> {
        let html = utils::fetch_html(&self.client, &self.trending_url())
            .await
            .map_err(|e| Error::SourceUnavailable {
                name: self.source().to_string(),
                reason: e.to_string(),
            })?;
        let candidates = parse_trending(&html, self.limit)?;
        tracing::debug!(found = candidates.len(), since = self.since.as_str(), "github trending");
        Ok(candidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRENDING: &str = r#"
        <div class="Box">
          <article class="Box-row">
            <h2 class="h3 lh-condensed">
              <a href="/openai/whisper">
                <span class="text-normal">openai /</span>
                whisper
              </a>
            </h2>
            <p class="col-9 color-fg-muted my-1 pr-4">
              Robust Speech Recognition via Large-Scale Weak Supervision
            </p>
            <div class="f6 color-fg-muted mt-2">
              <span itemprop="programmingLanguage">Python</span>
              <a class="Link--muted d-inline-block mr-3" href="/openai/whisper/stargazers">61,234</a>
              <a class="Link--muted d-inline-block mr-3" href="/openai/whisper/forks">7,000</a>
              <span class="d-inline-block float-sm-right">512 stars today</span>
            </div>
          </article>
          <article class="Box-row">
            <h2 class="h3 lh-condensed"><a href="/someone/dotfiles">someone / dotfiles</a></h2>
          </article>
          <article class="Box-row">
            <h2 class="h3 lh-condensed"><a href="/third/repo">third / repo</a></h2>
          </article>
        </div>
    "#;

    #[test]
    fn test_parse_trending() {
        let candidates = parse_trending(TRENDING, 5).unwrap();
        assert_eq!(candidates.len(), 3);

        let first = &candidates[0];
        assert_eq!(first.title, "openai/whisper");
        assert_eq!(first.link, "https://github.com/openai/whisper");
        assert_eq!(first.tag, SourceTag::GitHub);
        assert_eq!(
            first.content.as_deref(),
            Some(
                "Repository: openai/whisper\n\
                 Description: Robust Speech Recognition via Large-Scale Weak Supervision\n\
                 Programming Language: Python\n\
                 Total Stars: 61,234\n\
                 Today's Growth: 512 stars today"
            )
        );

        let second = &candidates[1];
        assert_eq!(second.title, "someone/dotfiles");
        assert!(second
            .content
            .as_deref()
            .unwrap()
            .contains("Description: No description available\nProgramming Language: Unknown\nTotal Stars: 0"));
    }

    #[test]
    fn test_parse_trending_respects_limit() {
        assert_eq!(parse_trending(TRENDING, 1).unwrap().len(), 1);
        assert!(parse_trending("<div></div>", 5).unwrap().is_empty());
    }

    #[test]
    fn test_trending_url() {
        let config = ScraperConfig {
            github_since: TrendingRange::Weekly,
            ..ScraperConfig::default()
        };
        let scraper = GitHubTrendingScraper::new(Client::new(), &config);
        assert_eq!(scraper.trending_url(), "https://github.com/trending?since=weekly");
        assert_eq!(scraper.limit, 3);
    }
}
