use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDateTime;
use nb_core::config::{AppConfig, SummarizerConfig, SummarizerProvider};
use nb_core::{NewsStore, PushSink, Result, Summarizer};
use nb_push::ConsoleSink;
use nb_scrapers::{NewsManager, RunOptions, RunReport, Scraper, ScraperType};
use nb_storage::InMemoryStorage;
use tracing::info;

/// Everything a run needs, assembled once from the loaded config.
pub struct App {
    manager: NewsManager,
}

impl App {
    pub async fn build(config: &AppConfig, dry_run: bool) -> Result<Self> {
        let store: Arc<dyn NewsStore> = if dry_run {
            Arc::new(InMemoryStorage::new())
        } else {
            nb_storage::create_storage(&config.store).await?
        };
        info!("💾 Store ready (using {})", store.name());

        let summarizer = build_summarizer(&config.summarizer, dry_run)?;
        info!("🧠 Summarizer ready (using {})", summarizer.name());

        let sink: Arc<dyn PushSink> = if dry_run {
            Arc::new(ConsoleSink)
        } else {
            nb_push::create_sink(&config.push)?
        };
        info!("📣 Push sink ready (using {})", sink.name());

        let options = RunOptions {
            max_items_per_source: config.scraper.max_items_per_source,
            request_delay: Duration::from_secs(config.summarizer.request_delay_secs),
        };
        let mut manager = NewsManager::new(store, summarizer, sink, options);

        let scrapers = ScraperType::from_config(&config.scraper)?;
        let names: Vec<&str> = scrapers.iter().map(|s| s.source().display_name()).collect();
        info!("🦗 Scrapers initialized successfully: {}", names.join(", "));
        for scraper in scrapers {
            manager.add_scraper(Box::new(scraper));
        }

        Ok(Self { manager })
    }

    pub async fn run(&self, now: NaiveDateTime) -> RunReport {
        self.manager.run_once(now).await
    }
}

fn build_summarizer(config: &SummarizerConfig, dry_run: bool) -> Result<Arc<dyn Summarizer>> {
    let has_key = config.api_key.as_deref().is_some_and(|k| !k.trim().is_empty());
    if dry_run && config.provider == SummarizerProvider::Deepseek && !has_key {
        tracing::warn!("no summarizer api key, dry run falls back to the dummy summarizer");
        return nb_summarizer::create_summarizer(&SummarizerConfig {
            provider: SummarizerProvider::Dummy,
            ..config.clone()
        });
    }
    nb_summarizer::create_summarizer(config)
}
