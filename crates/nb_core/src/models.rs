use async_trait::async_trait;
use crate::types::Enrichment;
use crate::Result;

#[async_trait]
pub trait Summarizer: Send + Sync {
    fn name(&self) -> &str;

    /// Translate the title and summarize the content into Chinese.
    /// `content` is `None` when the scraper found no body; the title is used alone.
    async fn summarize(&self, title: &str, content: Option<&str>) -> Result<Enrichment>;
}
