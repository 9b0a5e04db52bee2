use async_trait::async_trait;
use nb_core::{Error, InsertOutcome, NewsItem, NewsStore, Result};
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::Executor;

use super::{db_err, NewsRow};

pub struct PostgresStorage {
    pool: PgPool,
    table: String,
}

impl PostgresStorage {
    pub async fn connect(url: &str, table: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections.max(1))
            .connect(url)
            .await
            .map_err(db_err("failed to connect to postgres"))?;

        let storage = Self {
            pool,
            table: table.to_string(),
        };
        storage.ensure_schema().await?;
        tracing::debug!(table, "postgres store ready");
        Ok(storage)
    }

    async fn ensure_schema(&self) -> Result<()> {
        let table = &self.table;
        let mut tx = self.pool.begin().await.map_err(db_err("begin failed"))?;

        tx.execute(
            format!(
                r#"
                CREATE TABLE IF NOT EXISTS {table} (
                  id         BIGSERIAL PRIMARY KEY,
                  date       TEXT NOT NULL,
                  tag        TEXT NOT NULL,
                  title      TEXT NOT NULL,
                  zh_title   TEXT NOT NULL,
                  link       TEXT NOT NULL UNIQUE,
                  content    TEXT NOT NULL,
                  summary    TEXT NOT NULL,
                  created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
                );
                "#
            )
            .as_str(),
        )
        .await
        .map_err(|e| Error::Persistence(format!("create table {} failed: {}", table, e)))?;

        tx.execute(format!("CREATE INDEX IF NOT EXISTS idx_{table}_date ON {table}(date);").as_str())
            .await
            .map_err(db_err("create index failed"))?;

        tx.commit().await.map_err(db_err("commit failed"))?;
        Ok(())
    }
}

#[async_trait]
impl NewsStore for PostgresStorage {
    fn name(&self) -> &str {
        "postgres"
    }

    async fn contains_link(&self, link: &str) -> Result<bool> {
        let sql = format!("SELECT EXISTS(SELECT 1 FROM {} WHERE link = $1)", self.table);
        sqlx::query_scalar::<_, bool>(&sql)
            .bind(link)
            .fetch_one(&self.pool)
            .await
            .map_err(db_err("link lookup failed"))
    }

    async fn insert(&self, item: &NewsItem) -> Result<InsertOutcome> {
        let sql = format!(
            r#"
            INSERT INTO {} (date, tag, title, zh_title, link, content, summary)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (link) DO NOTHING
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

        Ok(match result.rows_affected() {
            0 => InsertOutcome::Duplicate,
            _ => InsertOutcome::Inserted,
        })
    }

    async fn list_by_date(&self, date: &str) -> Result<Vec<NewsItem>> {
        let sql = format!(
            r#"
            SELECT date, tag, title, zh_title, link, content, summary
            FROM {}
            WHERE date = $1
            ORDER BY id
            "#,
            self.table
        );
        let rows = sqlx::query_as::<_, NewsRow>(&sql)
            .bind(date)
            .fetch_all(&self.pool)
            .await
            .map_err(db_err("list by date failed"))?;
        rows.into_iter().map(NewsRow::into_item).collect()
    }

    async fn count(&self) -> Result<u64> {
        let sql = format!("SELECT COUNT(*) FROM {}", self.table);
        let total = sqlx::query_scalar::<_, i64>(&sql)
            .fetch_one(&self.pool)
            .await
            .map_err(db_err("count failed"))?;
        Ok(total.max(0) as u64)
    }
}
