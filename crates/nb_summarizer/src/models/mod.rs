use std::sync::Arc;

use nb_core::config::{SummarizerConfig, SummarizerProvider};
use nb_core::{Result, Summarizer};

pub mod deepseek;
pub mod dummy;

pub use deepseek::DeepSeekModel;
pub use dummy::DummyModel;

pub fn create_summarizer(config: &SummarizerConfig) -> Result<Arc<dyn Summarizer>> {
    match config.provider {
        SummarizerProvider::Deepseek => Ok(Arc::new(DeepSeekModel::new(config)?)),
        SummarizerProvider::Dummy => Ok(Arc::new(DummyModel)),
    }
}

/// Cuts `text` to at most `max_chars` characters without splitting a code point.
pub(crate) fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
