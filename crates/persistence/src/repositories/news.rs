//! News repository.

use domain::models::{CreateNewsRequest, ExternalArticle};
use sqlx::PgPool;

use crate::entities::NewsEntity;
use crate::metrics::QueryTimer;

const NEWS_COLUMNS: &str = "id, title, summary, content, category, image_url, author, \
     external_url, source_name, published_at, is_published, views, created_at";

/// Repository for news items.
#[derive(Clone)]
pub struct NewsRepository {
    pool: PgPool,
}

impl NewsRepository {
    /// Creates a new NewsRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Lists published items newest first, with the total matching count.
    pub async fn list_published(
        &self,
        category: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<NewsEntity>, i64), sqlx::Error> {
        let timer = QueryTimer::new("list_published_news");
        let rows = sqlx::query_as::<_, NewsEntity>(&format!(
            r#"
            SELECT {}
            FROM news
            WHERE is_published AND ($1::TEXT IS NULL OR category = $1)
            ORDER BY published_at DESC, id DESC
            LIMIT $2 OFFSET $3
            "#,
            NEWS_COLUMNS
        ))
        .bind(category)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM news WHERE is_published AND ($1::TEXT IS NULL OR category = $1)",
        )
        .bind(category)
        .fetch_one(&self.pool)
        .await?;

        timer.record();
        Ok((rows, total))
    }

    /// Fetches a published item and increments its view counter.
    pub async fn view(&self, id: i64) -> Result<Option<NewsEntity>, sqlx::Error> {
        let timer = QueryTimer::new("view_news");
        let result = sqlx::query_as::<_, NewsEntity>(&format!(
            r#"
            UPDATE news SET views = views + 1
            WHERE id = $1 AND is_published
            RETURNING {}
            "#,
            NEWS_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Stores an authored item.
    pub async fn create(&self, item: &CreateNewsRequest) -> Result<NewsEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_news");
        let result = sqlx::query_as::<_, NewsEntity>(&format!(
            r#"
            INSERT INTO news
                (title, summary, content, category, image_url, author, external_url,
                 published_at, is_published)
            VALUES ($1, $2, $3, $4, $5, $6, $7, COALESCE($8, NOW()), $9)
            RETURNING {}
            "#,
            NEWS_COLUMNS
        ))
        .bind(item.title.trim())
        .bind(item.summary.as_deref())
        .bind(item.content.as_deref())
        .bind(item.category.trim())
        .bind(item.image_url.as_deref())
        .bind(item.author.as_deref())
        .bind(item.external_url.as_deref())
        .bind(item.published_at)
        .bind(item.is_published)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Inserts fetched articles, skipping any whose external URL is already
    /// stored. Returns the number inserted.
    pub async fn insert_external(
        &self,
        articles: &[ExternalArticle],
        category: &str,
    ) -> Result<usize, sqlx::Error> {
        let timer = QueryTimer::new("insert_external_news");
        let mut tx = self.pool.begin().await?;
        let mut inserted = 0;

        for article in articles {
            let result = sqlx::query(
                r#"
                INSERT INTO news
                    (title, summary, content, category, image_url, author, external_url,
                     source_name, published_at, is_published)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, true)
                ON CONFLICT (external_url) DO NOTHING
                "#,
            )
            .bind(&article.title)
            .bind(article.summary.as_deref())
            .bind(article.content.as_deref())
            .bind(category)
            .bind(article.image_url.as_deref())
            .bind(article.author.as_deref())
            .bind(&article.external_url)
            .bind(article.source_name.as_deref())
            .bind(article.published_at)
            .execute(&mut *tx)
            .await?;
            inserted += result.rows_affected() as usize;
        }

        tx.commit().await?;
        timer.record();
        Ok(inserted)
    }
}
