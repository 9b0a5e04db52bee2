pub mod cli;
pub mod manager;
pub mod report;
pub mod scrapers;

pub use cli::{handle_command, ScraperArgs, ScraperCommands};
pub use manager::{NewsManager, RunOptions};
pub use report::{RunReport, RunState, SkipReason, SkipRecord, SourceOutcome};
pub use scrapers::{Scraper, ScraperType};
