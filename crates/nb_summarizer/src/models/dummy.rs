use std::fmt;

use nb_core::{Enrichment, Result, Summarizer};

/// Offline summarizer. Echoes the title and keeps the first twenty words of the body.
pub struct DummyModel;

impl fmt::Debug for DummyModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DummyModel").finish()
    }
}

#[async_trait::async_trait]
impl Summarizer for DummyModel {
    fn name(&self) -> &str {
        "Dummy"
    }

    async fn summarize(&self, title: &str, content: Option<&str>) -> Result<Enrichment> {
        let source = content.unwrap_or(title);
        let words: Vec<&str> = source.split_whitespace().take(20).collect();
        Ok(Enrichment {
            zh_title: title.trim().to_string(),
            summary: words.join(" "),
        })
    }
}
