use async_trait::async_trait;
use crate::types::NewsItem;
use crate::Result;

/// Result of an insert. A row that already exists is not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    Duplicate,
}

#[async_trait]
pub trait NewsStore: Send + Sync {
    /// Short backend name for logs
    fn name(&self) -> &str;

    /// True if a row with exactly this link exists
    async fn contains_link(&self, link: &str) -> Result<bool>;

    /// Insert one finished item, reporting a link collision as `Duplicate`
    async fn insert(&self, item: &NewsItem) -> Result<InsertOutcome>;

    /// All items stored for a push date, in insertion order
    async fn list_by_date(&self, date: &str) -> Result<Vec<NewsItem>>;

    /// Total number of stored items
    async fn count(&self) -> Result<u64>;
}
