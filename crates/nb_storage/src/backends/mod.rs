pub mod memory;

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(feature = "postgres")]
pub mod postgres;

pub use memory::InMemoryStorage;

#[cfg(feature = "sqlite")]
pub use sqlite::SQLiteStorage;

#[cfg(feature = "postgres")]
pub use postgres::PostgresStorage;

#[cfg(any(feature = "sqlite", feature = "postgres"))]
mod row {
    use nb_core::{Error, NewsItem, Result, SourceTag};

    #[derive(Debug, sqlx::FromRow)]
    pub(crate) struct NewsRow {
        pub date: String,
        pub tag: String,
        pub title: String,
        pub zh_title: String,
        pub link: String,
        pub content: String,
        pub summary: String,
    }

    impl NewsRow {
        pub(crate) fn into_item(self) -> Result<NewsItem> {
            let tag: SourceTag = self
                .tag
                .parse()
                .map_err(|_| Error::Persistence(format!("unknown tag in store: {}", self.tag)))?;
            Ok(NewsItem {
                date: self.date,
                tag,
                title: self.title,
                zh_title: self.zh_title,
                link: self.link,
                content: self.content,
                summary: self.summary,
            })
        }
    }

    pub(crate) fn db_err(action: &str) -> impl Fn(sqlx::Error) -> Error + '_ {
        move |e| Error::Persistence(format!("{}: {}", action, e))
    }
}

#[cfg(any(feature = "sqlite", feature = "postgres"))]
pub(crate) use row::{db_err, NewsRow};
