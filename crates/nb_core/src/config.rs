use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveTime;
use serde::Deserialize;

use crate::types::SourceTag;
use crate::{Error, Result};

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Local time of day, `HH:MM`
    pub at: String,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            at: "09:00".to_string(),
        }
    }
}

impl ScheduleConfig {
    pub fn time_of_day(&self) -> Result<NaiveTime> {
        parse_time_of_day(&self.at)
    }
}

pub fn parse_time_of_day(raw: &str) -> Result<NaiveTime> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .map_err(|e| Error::Config(format!("invalid schedule time {:?}: {}", raw, e)))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendingRange {
    Daily,
    Weekly,
    Monthly,
}

impl TrendingRange {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrendingRange::Daily => "daily",
            TrendingRange::Weekly => "weekly",
            TrendingRange::Monthly => "monthly",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    pub user_agent: String,
    pub request_timeout_secs: u64,
    pub max_items_per_source: usize,
    pub recent_days: u32,
    pub techcrunch_max_pages: u32,
    pub github_since: TrendingRange,
    pub github_limit: usize,
    pub sources: Vec<String>,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            request_timeout_secs: 30,
            max_items_per_source: 3,
            recent_days: 3,
            techcrunch_max_pages: 4,
            github_since: TrendingRange::Daily,
            github_limit: 5,
            sources: SourceTag::ALL.iter().map(|t| t.cli_name().to_string()).collect(),
        }
    }
}

impl ScraperConfig {
    /// Configured sources in order, duplicates dropped.
    pub fn source_tags(&self) -> Result<Vec<SourceTag>> {
        let mut tags = Vec::new();
        for name in &self.sources {
            let tag: SourceTag = name
                .parse()
                .map_err(|_| Error::Config(format!("unknown source in scraper.sources: {}", name)))?;
            if !tags.contains(&tag) {
                tags.push(tag);
            }
        }
        Ok(tags)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummarizerProvider {
    Deepseek,
    Dummy,
}

#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct SummarizerConfig {
    pub provider: SummarizerProvider,
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub timeout_secs: u64,
    pub request_delay_secs: u64,
    pub max_input_chars: usize,
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            provider: SummarizerProvider::Deepseek,
            base_url: "https://api.deepseek.com/v1".to_string(),
            api_key: None,
            model: "deepseek-chat".to_string(),
            timeout_secs: 60,
            request_delay_secs: 10,
            max_input_chars: 4000,
        }
    }
}

impl std::fmt::Debug for SummarizerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SummarizerConfig")
            .field("provider", &self.provider)
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_deref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("timeout_secs", &self.timeout_secs)
            .field("request_delay_secs", &self.request_delay_secs)
            .field("max_input_chars", &self.max_input_chars)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Memory,
    Sqlite,
    Postgres,
}

impl std::str::FromStr for StoreBackend {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(StoreBackend::Memory),
            "sqlite" => Ok(StoreBackend::Sqlite),
            "postgres" | "postgresql" => Ok(StoreBackend::Postgres),
            other => Err(Error::Config(format!("unknown store backend: {}", other))),
        }
    }
}

#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub url: String,
    pub table: String,
    pub max_connections: u32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Postgres,
            url: String::new(),
            table: "ai_news".to_string(),
            max_connections: 5,
        }
    }
}

impl std::fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreConfig")
            .field("backend", &self.backend)
            .field("url", &if self.url.is_empty() { "" } else { "<redacted>" })
            .field("table", &self.table)
            .field("max_connections", &self.max_connections)
            .finish()
    }
}

#[derive(Clone, Deserialize)]
pub struct WebhookConfig {
    #[serde(default = "default_webhook_name")]
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub secret: Option<String>,
}

fn default_webhook_name() -> String {
    "primary".to_string()
}

impl std::fmt::Debug for WebhookConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookConfig")
            .field("name", &self.name)
            .field("url", &"<redacted>")
            .field("secret", &self.secret.as_deref().map(|_| "<redacted>"))
            .finish()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PushConfig {
    pub webhooks: Vec<WebhookConfig>,
    pub request_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub schedule: ScheduleConfig,
    pub scraper: ScraperConfig,
    pub summarizer: SummarizerConfig,
    pub store: StoreConfig,
    pub push: PushConfig,
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Loads from `explicit`, then `NEWSBOT_CONFIG`, then the default locations,
    /// falling back to defaults. Environment overrides are applied last.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let env_path = std::env::var("NEWSBOT_CONFIG").ok().map(PathBuf::from);
        let config = match explicit.map(Path::to_path_buf).or(env_path) {
            Some(path) => {
                if !path.exists() {
                    return Err(Error::Config(format!("config file {:?} not found", path)));
                }
                Self::load_from_file(&path)?
            }
            None => match locate_default_config() {
                Some(path) => Self::load_from_file(&path)?,
                None => AppConfig::default(),
            },
        };

        Ok(config.apply_overrides(|key| std::env::var(key).ok()))
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_yaml(&contents)
            .map_err(|e| Error::Config(format!("failed to parse config file {:?}: {}", path, e)))
    }

    pub fn from_yaml(contents: &str) -> Result<Self> {
        serde_yaml::from_str(contents).map_err(|e| Error::Config(e.to_string()))
    }

    pub fn apply_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("NEWSBOT_DATABASE_URL") {
            self.store.url = url;
        }
        if let Some(backend) = lookup("NEWSBOT_STORE_BACKEND") {
            match backend.parse() {
                Ok(backend) => self.store.backend = backend,
                Err(e) => tracing::warn!(error = %e, "ignoring NEWSBOT_STORE_BACKEND"),
            }
        }
        if let Some(key) = lookup("NEWSBOT_SUMMARIZER_API_KEY") {
            self.summarizer.api_key = Some(key);
        }
        if let Some(url) = lookup("NEWSBOT_WEBHOOK_URL") {
            match self.push.webhooks.first_mut() {
                Some(first) => first.url = url,
                None => self.push.webhooks.push(WebhookConfig {
                    name: default_webhook_name(),
                    url,
                    secret: None,
                }),
            }
        }
        // The secret alone never creates a webhook, it needs a url to attach to.
        if let Some(secret) = lookup("NEWSBOT_WEBHOOK_SECRET") {
            match self.push.webhooks.first_mut() {
                Some(first) => first.secret = Some(secret),
                None => tracing::warn!("ignoring NEWSBOT_WEBHOOK_SECRET, no webhook url configured"),
            }
        }
        if let Some(at) = lookup("NEWSBOT_SCHEDULE_AT") {
            self.schedule.at = at;
        }
        if let Some(level) = lookup("NEWSBOT_LOG_LEVEL") {
            self.logging.level = level;
        }
        self
    }

    /// Checks everything a real (non dry) run needs.
    pub fn validate(&self, dry_run: bool) -> Result<()> {
        self.schedule.time_of_day()?;
        self.scraper.source_tags()?;

        if !is_plain_identifier(&self.store.table) {
            return Err(Error::Config(format!(
                "store.table must be a plain identifier, got {:?}",
                self.store.table
            )));
        }

        if dry_run {
            return Ok(());
        }

        if self.store.backend != StoreBackend::Memory && self.store.url.trim().is_empty() {
            return Err(Error::Config(
                "store.url missing; set NEWSBOT_DATABASE_URL or store.url".to_string(),
            ));
        }

        if self.summarizer.provider == SummarizerProvider::Deepseek
            && self
                .summarizer
                .api_key
                .as_deref()
                .map_or(true, |k| k.trim().is_empty())
        {
            return Err(Error::Config(
                "summarizer.api_key missing; set NEWSBOT_SUMMARIZER_API_KEY or summarizer.api_key"
                    .to_string(),
            ));
        }

        if self.push.webhooks.is_empty() {
            return Err(Error::Config("push.webhooks must list at least one webhook".to_string()));
        }
        for hook in &self.push.webhooks {
            url::Url::parse(&hook.url).map_err(|e| {
                Error::Config(format!("webhook {} has an invalid url: {}", hook.name, e))
            })?;
        }

        Ok(())
    }
}

pub fn is_plain_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn locate_default_config() -> Option<PathBuf> {
    ["config.yml", "config/config.yml", "config.yaml"]
        .into_iter()
        .map(PathBuf::from)
        .find(|path| path.exists())
}
