use std::path::Path;
use std::str::FromStr;

use async_trait::async_trait;
use nb_core::{Error, InsertOutcome, NewsItem, NewsStore, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

use super::{db_err, NewsRow};

fn migrations(table: &str) -> Vec<String> {
    vec![
        format!(
            r#"
            CREATE TABLE IF NOT EXISTS {table} (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                date TEXT NOT NULL,
                tag TEXT NOT NULL,
                title TEXT NOT NULL,
                zh_title TEXT NOT NULL,
                link TEXT NOT NULL UNIQUE,
                content TEXT NOT NULL,
                summary TEXT NOT NULL,
                created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
            )
            "#
        ),
        format!("CREATE INDEX IF NOT EXISTS idx_{table}_date ON {table}(date)"),
    ]
}

pub struct SQLiteStorage {
    pool: SqlitePool,
    table: String,
}

impl SQLiteStorage {
    /// `url` is a sqlx sqlite url such as `sqlite://news.db`. The file is created if missing.
    pub async fn connect(url: &str, table: &str, max_connections: u32) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(|e| Error::Config(format!("invalid sqlite url: {}", e)))?
            .create_if_missing(true);
        Self::open(options, table, max_connections).await
    }

    pub async fn new_with_path(db_path: &Path, table: &str) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true);
        Self::open(options, table, 1).await
    }

    async fn open(options: SqliteConnectOptions, table: &str, max_connections: u32) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections.max(1))
            .connect_with(options)
            .await
            .map_err(db_err("failed to open sqlite database"))?;

        for (i, migration) in migrations(table).iter().enumerate() {
            sqlx::query(migration)
                .execute(&pool)
                .await
                .map_err(|e| Error::Persistence(format!("migration {} failed: {}", i, e)))?;
        }

        tracing::debug!(table, "sqlite store ready");
        Ok(Self {
            pool,
            table: table.to_string(),
        })
    }
}

#[async_trait]
impl NewsStore for SQLiteStorage {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn contains_link(&self, link: &str) -> Result<bool> {
        let sql = format!("SELECT COUNT(1) FROM {} WHERE link = ?", self.table);
        let found: i64 = sqlx::query_scalar(&sql)
            .bind(link)
            .fetch_one(&self.pool)
            .await
            .map_err(db_err("link lookup failed"))?;
        Ok(found > 0)
    }

    async fn insert(&self, item: &NewsItem) -> Result<InsertOutcome> {
        let sql = format!(
            r#"
            INSERT INTO {} (date, tag, title, zh_title, link, content, summary)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(link) DO NOTHING
            "#,
            self.table
        );
        let result = sqlx::query(&sql)
            .bind(&item.date)
            .bind(item.tag.as_str())
            .bind(&item.title)
            .bind(&item.zh_title)
            .bind(&item.link)
            .bind(&item.content)
            .bind(&item.summary)
            .execute(&self.pool)
            .await
            .map_err(db_err("insert failed"))?;

        if result.rows_affected() == 0 {
            Ok(InsertOutcome::Duplicate)
        } else {
            Ok(InsertOutcome::Inserted)
        }
    }

    async fn list_by_date(&self, date: &str) -> Result<Vec<NewsItem>> {
        let sql = format!(
            "SELECT date, tag, title, zh_title, link, content, summary FROM {} WHERE date = ? ORDER BY id",
            self.table
        );
        let rows: Vec<NewsRow> = sqlx::query_as(&sql)
            .bind(date)
            .fetch_all(&self.pool)
            .await
            .map_err(db_err("list by date failed"))?;
        rows.into_iter().map(NewsRow::into_item).collect()
    }

    async fn count(&self) -> Result<u64> {
        let sql = format!("SELECT COUNT(*) FROM {}", self.table);
        let total: i64 = sqlx::query_scalar(&sql)
            .fetch_one(&self.pool)
            .await
            .map_err(db_err("count failed"))?;
        Ok(total.max(0) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nb_core::SourceTag;
    use tempfile::tempdir;

    fn item(link: &str, tag: SourceTag) -> NewsItem {
        NewsItem {
            date: "2024-05-01".to_string(),
            tag,
            title: "OpenAI ships a model".to_string(),
            zh_title: "OpenAI 发布新模型".to_string(),
            link: link.to_string(),
            content: "Body".to_string(),
            summary: "摘要".to_string(),
        }
    }

    #[tokio::test]
    async fn test_sqlite_storage() {
        let temp_dir = tempdir().unwrap();
        let db_path = temp_dir.path().join("news.db");
        let storage = SQLiteStorage::new_with_path(&db_path, "ai_news").await.unwrap();

        let first = item("https://techcrunch.com/2024/05/01/a/", SourceTag::TechCrunch);
        assert!(!storage.contains_link(&first.link).await.unwrap());
        assert_eq!(storage.insert(&first).await.unwrap(), InsertOutcome::Inserted);
        assert!(storage.contains_link(&first.link).await.unwrap());

        let mut again = first.clone();
        again.summary = "另一个摘要".to_string();
        assert_eq!(storage.insert(&again).await.unwrap(), InsertOutcome::Duplicate);

        storage
            .insert(&item("https://github.com/o/r", SourceTag::GitHub))
            .await
            .unwrap();

        let listed = storage.list_by_date("2024-05-01").await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0], first);
        assert_eq!(listed[1].tag, SourceTag::GitHub);
        assert_eq!(storage.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_reopen_keeps_rows() {
        let temp_dir = tempdir().unwrap();
        let db_path = temp_dir.path().join("nested").join("news.db");
        {
            let storage = SQLiteStorage::new_with_path(&db_path, "news").await.unwrap();
            storage.insert(&item("https://v/1", SourceTag::Verge)).await.unwrap();
        }
        let storage = SQLiteStorage::new_with_path(&db_path, "news").await.unwrap();
        assert!(storage.contains_link("https://v/1").await.unwrap());
    }
}
