use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Scraping error: {0}")]
    Scraping(String),

    #[error("Source {name} unavailable: {reason}")]
    SourceUnavailable { name: String, reason: String },

    #[error("Vendor error: {0}")]
    Vendor(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Push error: {0}")]
    Push(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
