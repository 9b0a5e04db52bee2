use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDateTime;
use nb_core::{
    Candidate, Digest, InsertOutcome, NewsItem, NewsStore, PushSink, Summarizer,
};

use crate::report::{RunReport, RunState, SkipReason, SkipRecord, SourceOutcome};
use crate::scrapers::Scraper;

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub max_items_per_source: usize,
    /// Pause between consecutive vendor calls
    pub request_delay: Duration,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            max_items_per_source: 3,
            request_delay: Duration::from_secs(10),
        }
    }
}

/// Drives one scrape → filter → summarize → persist → push run at a time.
pub struct NewsManager {
    scrapers: Vec<Box<dyn Scraper>>,
    store: Arc<dyn NewsStore>,
    summarizer: Arc<dyn Summarizer>,
    sink: Arc<dyn PushSink>,
    options: RunOptions,
}

fn transition(report: &mut RunReport, next: RunState) {
    tracing::debug!(from = ?report.state, to = ?next, "run state");
    report.state = next;
}

fn skip(report: &mut RunReport, candidate: &Candidate, reason: SkipReason) {
    tracing::info!(source = %candidate.tag, link = %candidate.link, %reason, "skipping candidate");
    report.skipped.push(SkipRecord {
        tag: candidate.tag,
        title: candidate.title.clone(),
        link: candidate.link.clone(),
        reason,
    });
}

impl NewsManager {
    pub fn new(
        store: Arc<dyn NewsStore>,
        summarizer: Arc<dyn Summarizer>,
        sink: Arc<dyn PushSink>,
        options: RunOptions,
    ) -> Self {
        Self {
            scrapers: Vec::new(),
            store,
            summarizer,
            sink,
            options,
        }
    }

    pub fn add_scraper(&mut self, scraper: Box<dyn Scraper>) {
        self.scrapers.push(scraper);
    }

    /// Executes one full run. Source, vendor and store failures are recorded in the
    /// report; only a push failure makes the run end `Failed`. The sink is called
    /// exactly once, with an empty digest when nothing new was persisted.
    pub async fn run_once(&self, now: NaiveDateTime) -> RunReport {
        let mut report = RunReport::new(now);
        tracing::info!(
            date = %report.date,
            sources = self.scrapers.len(),
            store = self.store.name(),
            summarizer = self.summarizer.name(),
            sink = self.sink.name(),
            "starting run"
        );

        transition(&mut report, RunState::Scraping);
        let candidates = self.scrape_all(&mut report).await;

        transition(&mut report, RunState::Filtering);
        let admitted = self.filter(candidates, &mut report).await;

        self.summarize_and_persist(admitted, &mut report).await;

        transition(&mut report, RunState::Composing);
        let digest = Digest::compose(&report.persisted, now);

        match self.sink.push(&digest).await {
            Ok(()) => transition(&mut report, RunState::Pushed),
            Err(e) => {
                tracing::error!(sink = self.sink.name(), error = %e, "push failed");
                report.push_error = Some(e.to_string());
                transition(&mut report, RunState::Failed);
            }
        }

        tracing::info!("{}", report);
        report
    }

    async fn scrape_all(&self, report: &mut RunReport) -> Vec<Candidate> {
        let mut all = Vec::new();
        for scraper in &self.scrapers {
            let tag = scraper.source();
            match scraper.fetch_candidates().await {
                Ok(mut found) => {
                    found.truncate(self.options.max_items_per_source);
                    tracing::info!(source = %tag, count = found.len(), "scraped");
                    report.sources.push(SourceOutcome::Scraped {
                        tag,
                        count: found.len(),
                    });
                    all.extend(found);
                }
                Err(e) => {
                    tracing::warn!(source = %tag, error = %e, "source unavailable");
                    report.sources.push(SourceOutcome::Unavailable {
                        tag,
                        reason: e.to_string(),
                    });
                }
            }
        }
        all
    }

    async fn filter(&self, candidates: Vec<Candidate>, report: &mut RunReport) -> Vec<Candidate> {
        let mut seen = HashSet::new();
        let mut admitted = Vec::new();

        for candidate in candidates {
            if !seen.insert(candidate.link.clone()) {
                skip(report, &candidate, SkipReason::DuplicateInRun);
                continue;
            }
            match self.store.contains_link(&candidate.link).await {
                Ok(true) => skip(report, &candidate, SkipReason::AlreadySeen),
                Ok(false) => admitted.push(candidate),
                Err(e) => skip(report, &candidate, SkipReason::Persistence(e.to_string())),
            }
        }

        tracing::debug!(admitted = admitted.len(), "filtered candidates");
        admitted
    }

    async fn summarize_and_persist(&self, admitted: Vec<Candidate>, report: &mut RunReport) {
        for (i, candidate) in admitted.into_iter().enumerate() {
            if i > 0 && !self.options.request_delay.is_zero() {
                tokio::time::sleep(self.options.request_delay).await;
            }

            transition(report, RunState::Summarizing);
            let enrichment = match self
                .summarizer
                .summarize(&candidate.title, candidate.content.as_deref())
                .await
            {
                Ok(enrichment) => enrichment,
                Err(e) => {
                    skip(report, &candidate, SkipReason::Vendor(e.to_string()));
                    continue;
                }
            };

            let item = match NewsItem::enrich(candidate.clone(), enrichment, report.date.clone()) {
                Ok(item) => item,
                Err(e) => {
                    skip(report, &candidate, SkipReason::Vendor(e.to_string()));
                    continue;
                }
            };

            transition(report, RunState::Persisting);
            match self.store.insert(&item).await {
                Ok(InsertOutcome::Inserted) => {
                    tracing::info!(source = %item.tag, link = %item.link, "persisted");
                    report.persisted.push(item);
                }
                Ok(InsertOutcome::Duplicate) => skip(report, &candidate, SkipReason::DuplicateLink),
                Err(e) => skip(report, &candidate, SkipReason::Persistence(e.to_string())),
            }
        }
    }
}
