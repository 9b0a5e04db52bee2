use clap::{Args, Subcommand};
use nb_core::config::ScraperConfig;
use nb_core::{Error, Result, SourceTag};

use crate::scrapers::{utils, Scraper, ScraperType};

#[derive(Args, Debug)]
pub struct ScraperArgs {
    #[command(subcommand)]
    pub command: ScraperCommands,
}

#[derive(Subcommand, Debug)]
pub enum ScraperCommands {
    /// List available scrapers
    List,
    /// Scrape one source and print its candidates (no summarizer, store or push)
    Source {
        /// Source name, e.g. techcrunch, verge or github
        source: String,
    },
}

/// Finds the scraper whose tag or CLI shorthand matches `name`.
pub fn get_scraper(name: &str, config: &ScraperConfig) -> Result<ScraperType> {
    let client = utils::build_client(config)?;
    let needle = name.trim().to_lowercase();
    SourceTag::ALL
        .into_iter()
        .map(|tag| ScraperType::new(tag, client.clone(), config))
        .find(|s| {
            s.cli_names().iter().any(|n| *n == needle) || s.source().as_str().eq_ignore_ascii_case(&needle)
        })
        .ok_or_else(|| Error::Scraping(format!("Scraper not found: {}", name)))
}

pub async fn handle_command(args: ScraperArgs, config: &ScraperConfig) -> Result<()> {
    match args.command {
        ScraperCommands::List => {
            println!("Available scrapers:");
            for tag in SourceTag::ALL {
                let scraper = get_scraper(tag.cli_name(), config)?;
                println!(
                    "  {} {:<16} [{}]",
                    tag.emoji(),
                    tag.display_name(),
                    scraper.cli_names().join(", ")
                );
            }
        }
        ScraperCommands::Source { source } => {
            let scraper = get_scraper(&source, config)?;
            let candidates = scraper.fetch_candidates().await?;
            println!("Found {} candidates from {}", candidates.len(), scraper.source().display_name());

            for candidate in candidates {
                let chars = candidate.content.as_deref().map_or(0, |c| c.chars().count());
                println!("🆕 {} - {} ({} chars)", candidate.title, candidate.link, chars);
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_scraper() {
        let config = ScraperConfig::default();

        assert_eq!(get_scraper("techcrunch", &config).unwrap().source(), SourceTag::TechCrunch);
        assert_eq!(get_scraper("TC", &config).unwrap().source(), SourceTag::TechCrunch);
        assert_eq!(get_scraper("theverge", &config).unwrap().source(), SourceTag::Verge);
        assert_eq!(get_scraper("GitHub", &config).unwrap().source(), SourceTag::GitHub);

        assert!(get_scraper("invalid", &config).is_err());
        assert!(get_scraper("", &config).is_err());
    }
}
