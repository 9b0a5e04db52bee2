use std::path::PathBuf;

use chrono::Local;
use clap::Parser;
use nb_core::config::{parse_time_of_day, AppConfig};
use nb_core::{Error, Result};
use nb_scrapers::cli::{handle_command, ScraperArgs};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod app;
mod scheduler;

use app::App;

#[derive(Parser, Debug)]
#[command(name = "newsbot", author, version, about = "Daily AI news digest for Feishu", long_about = None)]
pub struct Cli {
    /// Path to the YAML config (defaults to NEWSBOT_CONFIG, then config.yml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Run the pipeline once and push the card
    Run {
        /// Use an in-memory store and print the card instead of pushing it
        #[arg(long)]
        dry_run: bool,
    },
    /// Run every day at a fixed local time
    Schedule {
        /// Time of day as HH:MM (overrides schedule.at)
        #[arg(long)]
        at: Option<String>,
    },
    /// Inspect the scrapers without touching the store or the vendor
    Scrape(ScraperArgs),
    /// Show stored items for a date
    History {
        /// Date as YYYY-MM-DD, today when omitted
        #[arg(long)]
        date: Option<String>,
    },
}

fn setup_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.logging.level.as_str()));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Applies `--at` over `schedule.at`, then validates for a real run.
fn schedule_config(mut config: AppConfig, at: Option<String>) -> Result<AppConfig> {
    if let Some(raw) = at {
        parse_time_of_day(&raw)?;
        config.schedule.at = raw;
    }
    config.validate(false)?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref())?;
    setup_tracing(&config);

    match cli.command {
        Commands::Run { dry_run } => {
            config.validate(dry_run)?;
            let app = App::build(&config, dry_run).await?;
            info!("🚀 Starting one-shot run{}", if dry_run { " (dry run)" } else { "" });

            let report = app.run(Local::now().naive_local()).await;
            if !report.is_success() {
                return Err(Error::Push(report.to_string()));
            }
            info!("✅ {}", report);
        }
        Commands::Schedule { at } => {
            let config = schedule_config(config, at)?;
            let at = config.schedule.time_of_day()?;
            let app = App::build(&config, false).await?;
            info!("🕘 Scheduler started, running daily at {}", at.format("%H:%M"));
            scheduler::run_daily(&app, at).await;
        }
        Commands::Scrape(args) => {
            config.validate(true)?;
            handle_command(args, &config.scraper).await?;
        }
        Commands::History { date } => {
            let date = match date {
                Some(raw) => chrono::NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
                    .map_err(|e| Error::Config(format!("invalid date {:?}: {}", raw, e)))?,
                None => Local::now().date_naive(),
            };
            let store = nb_storage::create_storage(&config.store).await?;
            let day = date.format("%Y-%m-%d").to_string();
            let items = store.list_by_date(&day).await?;

            println!("📰 {} item(s) stored for {}", items.len(), day);
            for item in &items {
                println!("{} [{}] {}", item.tag.emoji(), item.tag, item.zh_title);
                println!("    {}", item.title);
                println!("    {}", item.summary);
                println!("    {}", item.link);
            }
            println!("💾 {} item(s) in {} store", store.count().await?, store.name());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_commands() {
        let cli = Cli::parse_from(["newsbot", "run", "--dry-run"]);
        assert!(matches!(cli.command, Commands::Run { dry_run: true }));

        let cli = Cli::parse_from(["newsbot", "--config", "bot.yml", "schedule", "--at", "07:30"]);
        assert_eq!(cli.config, Some(PathBuf::from("bot.yml")));
        assert!(matches!(cli.command, Commands::Schedule { at: Some(ref t) } if t == "07:30"));

        let cli = Cli::parse_from(["newsbot", "scrape", "source", "github"]);
        assert!(matches!(cli.command, Commands::Scrape(_)));

        let cli = Cli::parse_from(["newsbot", "history", "--date", "2024-05-01"]);
        assert!(matches!(cli.command, Commands::History { date: Some(_) }));
    }

    fn deployable(at: &str) -> AppConfig {
        let yaml = format!(
            "schedule:\n  at: \"{}\"\nsummarizer:\n  api_key: sk-test\nstore:\n  backend: sqlite\n  url: sqlite://news.db\npush:\n  webhooks:\n    - url: https://open.feishu.cn/open-apis/bot/v2/hook/abc\n",
            at
        );
        AppConfig::from_yaml(&yaml).unwrap()
    }

    #[test]
    fn test_schedule_flag_overrides_invalid_file_time() {
        let config = schedule_config(deployable("25:99"), Some("07:30".to_string())).unwrap();
        assert_eq!(config.schedule.time_of_day().unwrap().format("%H:%M").to_string(), "07:30");

        assert!(schedule_config(deployable("25:99"), None).is_err());
        assert!(schedule_config(deployable("09:00"), Some("7h".to_string())).is_err());
        assert!(schedule_config(deployable("09:00"), None).is_ok());
    }
}
