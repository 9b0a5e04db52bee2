pub mod config;
pub mod digest;
pub mod error;
pub mod models;
pub mod push;
pub mod storage;
pub mod types;

pub use config::AppConfig;
pub use digest::{Digest, DigestGroup};
pub use error::{Error, Result};
pub use models::Summarizer;
pub use push::PushSink;
pub use storage::{InsertOutcome, NewsStore};
pub use types::{Candidate, Enrichment, NewsItem, SourceTag};
