use async_trait::async_trait;
use nb_core::{InsertOutcome, NewsItem, NewsStore, Result};
use tokio::sync::RwLock;

/// Process-local store used by dry runs and tests. Nothing survives a restart.
#[derive(Default)]
pub struct InMemoryStorage {
    items: RwLock<Vec<NewsItem>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the store, keeping the first item for any repeated link.
    pub fn with_items(items: Vec<NewsItem>) -> Self {
        let mut unique: Vec<NewsItem> = Vec::with_capacity(items.len());
        for item in items {
            if !unique.iter().any(|i| i.link == item.link) {
                unique.push(item);
            }
        }
        Self {
            items: RwLock::new(unique),
        }
    }
}

#[async_trait]
impl NewsStore for InMemoryStorage {
    fn name(&self) -> &str {
        "memory"
    }

    async fn contains_link(&self, link: &str) -> Result<bool> {
        let items = self.items.read().await;
        Ok(items.iter().any(|i| i.link == link))
    }

    async fn insert(&self, item: &NewsItem) -> Result<InsertOutcome> {
        let mut items = self.items.write().await;
        if items.iter().any(|i| i.link == item.link) {
            return Ok(InsertOutcome::Duplicate);
        }
        items.push(item.clone());
        Ok(InsertOutcome::Inserted)
    }

    async fn list_by_date(&self, date: &str) -> Result<Vec<NewsItem>> {
        let items = self.items.read().await;
        Ok(items.iter().filter(|i| i.date == date).cloned().collect())
    }

    async fn count(&self) -> Result<u64> {
        Ok(self.items.read().await.len() as u64)
    }
}
