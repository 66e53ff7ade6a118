//! Newsletter subscriber repository.

use domain::models::SubscribeOutcome;
use sqlx::PgPool;

use crate::entities::SubscriberEntity;
use crate::metrics::QueryTimer;

const SUBSCRIBER_COLUMNS: &str =
    "id, email, status, subscribed_at, unsubscribed_at, source_ip";

/// Repository for newsletter subscriptions.
#[derive(Clone)]
pub struct NewsletterRepository {
    pool: PgPool,
}

impl NewsletterRepository {
    /// Creates a new NewsletterRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Subscribes an address.
    ///
    /// New addresses are inserted active; unsubscribed ones are reactivated
    /// with a fresh timestamp; active ones are left untouched. The insert runs
    /// first with `ON CONFLICT DO NOTHING`, so concurrent first subscribes of
    /// one address resolve to one `Created` and the rest `AlreadySubscribed`.
    pub async fn subscribe(
        &self,
        email: &str,
        source_ip: Option<&str>,
    ) -> Result<(SubscriberEntity, SubscribeOutcome), sqlx::Error> {
        let timer = QueryTimer::new("subscribe_newsletter");
        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query_as::<_, SubscriberEntity>(&format!(
            r#"
            INSERT INTO newsletter_subscribers (email, status, source_ip)
            VALUES ($1, 'active', $2)
            ON CONFLICT (email) DO NOTHING
            RETURNING {}
            "#,
            SUBSCRIBER_COLUMNS
        ))
        .bind(email)
        .bind(source_ip)
        .fetch_optional(&mut *tx)
        .await?;

        let result = match inserted {
            Some(subscriber) => (subscriber, SubscribeOutcome::Created),
            None => {
                let existing = sqlx::query_as::<_, SubscriberEntity>(&format!(
                    "SELECT {} FROM newsletter_subscribers WHERE email = $1 FOR UPDATE",
                    SUBSCRIBER_COLUMNS
                ))
                .bind(email)
                .fetch_one(&mut *tx)
                .await?;

                if existing.is_active() {
                    (existing, SubscribeOutcome::AlreadySubscribed)
                } else {
                    let subscriber = sqlx::query_as::<_, SubscriberEntity>(&format!(
                        r#"
                        UPDATE newsletter_subscribers
                        SET status = 'active', subscribed_at = NOW(), unsubscribed_at = NULL,
                            source_ip = COALESCE($2, source_ip)
                        WHERE email = $1
                        RETURNING {}
                        "#,
                        SUBSCRIBER_COLUMNS
                    ))
                    .bind(email)
                    .bind(source_ip)
                    .fetch_one(&mut *tx)
                    .await?;
                    (subscriber, SubscribeOutcome::Reactivated)
                }
            }
        };

        tx.commit().await?;
        timer.record();
        Ok(result)
    }

    /// Marks an address unsubscribed. Returns `None` for unknown addresses.
    pub async fn unsubscribe(&self, email: &str) -> Result<Option<SubscriberEntity>, sqlx::Error> {
        let timer = QueryTimer::new("unsubscribe_newsletter");
        let result = sqlx::query_as::<_, SubscriberEntity>(&format!(
            r#"
            UPDATE newsletter_subscribers
            SET status = 'unsubscribed', unsubscribed_at = COALESCE(unsubscribed_at, NOW())
            WHERE email = $1
            RETURNING {}
            "#,
            SUBSCRIBER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find a subscriber by address.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<SubscriberEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_subscriber_by_email");
        let result = sqlx::query_as::<_, SubscriberEntity>(&format!(
            "SELECT {} FROM newsletter_subscribers WHERE email = $1",
            SUBSCRIBER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Lists subscribers, optionally filtered by status.
    pub async fn list(&self, status: Option<&str>) -> Result<Vec<SubscriberEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_subscribers");
        let result = sqlx::query_as::<_, SubscriberEntity>(&format!(
            r#"
            SELECT {}
            FROM newsletter_subscribers
            WHERE ($1::TEXT IS NULL OR status = $1)
            ORDER BY subscribed_at DESC
            "#,
            SUBSCRIBER_COLUMNS
        ))
        .bind(status)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }
}
