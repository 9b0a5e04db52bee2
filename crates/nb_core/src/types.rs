use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// The fixed set of sources a run can scrape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceTag {
    TechCrunch,
    Verge,
    GitHub,
}

impl SourceTag {
    pub const ALL: [SourceTag; 3] = [SourceTag::TechCrunch, SourceTag::Verge, SourceTag::GitHub];

    /// Value stored in the `tag` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceTag::TechCrunch => "TechCrunch",
            SourceTag::Verge => "Verge",
            SourceTag::GitHub => "GitHub",
        }
    }

    /// Shorthand accepted on the command line and in `scraper.sources`.
    pub fn cli_name(&self) -> &'static str {
        match self {
            SourceTag::TechCrunch => "techcrunch",
            SourceTag::Verge => "verge",
            SourceTag::GitHub => "github",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            SourceTag::TechCrunch => "TechCrunch",
            SourceTag::Verge => "The Verge",
            SourceTag::GitHub => "GitHub Trending",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            SourceTag::TechCrunch => "🗞️",
            SourceTag::Verge => "🔺",
            SourceTag::GitHub => "🐙",
        }
    }

    pub fn homepage(&self) -> &'static str {
        match self {
            SourceTag::TechCrunch => "https://techcrunch.com",
            SourceTag::Verge => "https://www.theverge.com",
            SourceTag::GitHub => "https://github.com/trending",
        }
    }
}

impl fmt::Display for SourceTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceTag {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let needle = s.trim();
        SourceTag::ALL
            .into_iter()
            .find(|tag| {
                tag.as_str().eq_ignore_ascii_case(needle) || tag.cli_name().eq_ignore_ascii_case(needle)
            })
            .ok_or_else(|| Error::Scraping(format!("Unknown source: {}", s)))
    }
}

/// A raw scraped record, before the vendor has seen it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub tag: SourceTag,
    pub title: String,
    pub link: String,
    pub content: Option<String>,
}

impl Candidate {
    pub fn new(tag: SourceTag, title: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            tag,
            title: title.into(),
            link: link.into(),
            content: None,
        }
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        let content = content.into();
        self.content = if content.trim().is_empty() { None } else { Some(content) };
        self
    }

    /// Text the summarizer works from. Falls back to the title when no body was scraped.
    pub fn summary_input(&self) -> &str {
        self.content.as_deref().unwrap_or(&self.title)
    }
}

/// What the vendor returns for one candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enrichment {
    pub zh_title: String,
    pub summary: String,
}

/// A fully enriched record, the only shape that ever reaches the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    pub date: String,
    pub tag: SourceTag,
    pub title: String,
    pub zh_title: String,
    pub link: String,
    pub content: String,
    pub summary: String,
}

impl NewsItem {
    /// Joins a candidate with its enrichment. Blank translated fields are rejected so a
    /// half-enriched item can never be persisted.
    pub fn enrich(candidate: Candidate, enrichment: Enrichment, date: impl Into<String>) -> Result<Self> {
        let zh_title = enrichment.zh_title.trim().to_string();
        let summary = enrichment.summary.trim().to_string();
        if zh_title.is_empty() {
            return Err(Error::Vendor(format!("empty zh_title for {}", candidate.link)));
        }
        if summary.is_empty() {
            return Err(Error::Vendor(format!("empty summary for {}", candidate.link)));
        }

        let content = candidate.summary_input().to_string();
        Ok(Self {
            date: date.into(),
            tag: candidate.tag,
            title: candidate.title,
            zh_title,
            link: candidate.link,
            content,
            summary,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_tag_from_str() {
        assert_eq!("techcrunch".parse::<SourceTag>().unwrap(), SourceTag::TechCrunch);
        assert_eq!("Verge".parse::<SourceTag>().unwrap(), SourceTag::Verge);
        assert_eq!(" GitHub ".parse::<SourceTag>().unwrap(), SourceTag::GitHub);
        assert!("bloomberg".parse::<SourceTag>().is_err());
    }

    #[test]
    fn test_summary_input_falls_back_to_title() {
        let candidate = Candidate::new(SourceTag::Verge, "Title only", "https://v/1");
        assert_eq!(candidate.summary_input(), "Title only");

        let candidate = candidate.with_content("   ");
        assert!(candidate.content.is_none());

        let candidate = candidate.with_content("Body text");
        assert_eq!(candidate.summary_input(), "Body text");
    }

    #[test]
    fn test_enrich_rejects_blank_fields() {
        let candidate = Candidate::new(SourceTag::TechCrunch, "X", "http://a/1");
        let blank_title = Enrichment {
            zh_title: "  ".to_string(),
            summary: "摘要".to_string(),
        };
        assert!(matches!(
            NewsItem::enrich(candidate.clone(), blank_title, "2024-01-01"),
            Err(Error::Vendor(_))
        ));

        let blank_summary = Enrichment {
            zh_title: "X译".to_string(),
            summary: String::new(),
        };
        assert!(NewsItem::enrich(candidate, blank_summary, "2024-01-01").is_err());
    }

    #[test]
    fn test_enrich_keeps_candidate_fields() {
        let candidate = Candidate::new(SourceTag::TechCrunch, "X", "http://a/1");
        let item = NewsItem::enrich(
            candidate,
            Enrichment {
                zh_title: " X译 ".to_string(),
                summary: "摘要".to_string(),
            },
            "2024-01-01",
        )
        .unwrap();

        assert_eq!(item.link, "http://a/1");
        assert_eq!(item.zh_title, "X译");
        assert_eq!(item.summary, "摘要");
        assert_eq!(item.content, "X");
        assert_eq!(item.date, "2024-01-01");
    }
}
