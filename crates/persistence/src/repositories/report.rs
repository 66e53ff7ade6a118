//! Pollution report repository.

use domain::models::ReportStatus;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::entities::ReportEntity;
use crate::metrics::QueryTimer;

const REPORT_COLUMNS: &str = r#"
    r.id, r.user_id, u.username, r.district_id, d.name AS district_name, r.address,
    r.pollution_type_id, t.code AS pollution_type_code, t.name AS pollution_type_name,
    r.custom_type, r.description, r.media_url, r.latitude, r.longitude, r.status,
    r.verified_by, r.verified_at, r.rejection_reason, r.created_at
"#;

const REPORT_JOINS: &str = r#"
    FROM pollution_reports r
    JOIN districts d ON d.id = r.district_id
    JOIN pollution_types t ON t.id = r.pollution_type_id
    LEFT JOIN users u ON u.id = r.user_id
"#;

/// Fields of a new report after external keys are resolved.
#[derive(Debug, Clone)]
pub struct NewReport<'a> {
    pub user_id: i64,
    pub district_id: i64,
    pub pollution_type_id: i64,
    pub address: &'a str,
    pub custom_type: Option<&'a str>,
    pub description: &'a str,
    pub media_url: Option<&'a str>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Result of [`ReportRepository::create`].
#[derive(Debug)]
pub enum CreateReportOutcome {
    Created(ReportEntity),
    /// An identical report was filed inside the duplicate window.
    Duplicate { existing_id: i64 },
}

/// Result of a single transition.
#[derive(Debug)]
pub enum TransitionOutcome {
    Updated(ReportEntity),
    NotFound,
    /// Guarded mode only: the report has already been reviewed.
    NotPending(ReportStatus),
}

/// Filters for [`ReportRepository::list`].
#[derive(Debug, Clone, Default)]
pub struct ReportFilter {
    pub user_id: Option<i64>,
    pub status: Option<ReportStatus>,
    pub district_id: Option<i64>,
    pub limit: i64,
    pub offset: i64,
}

/// Repository for pollution report operations.
#[derive(Clone)]
pub struct ReportRepository {
    pool: PgPool,
}

impl ReportRepository {
    /// Creates a new ReportRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Files a report in the pending state.
    ///
    /// Inside the same transaction, an identical report (same user, district,
    /// type and description) created within `duplicate_window_secs` is
    /// returned as a duplicate instead of inserting a second row. A per-user
    /// advisory lock serializes concurrent submissions.
    pub async fn create(
        &self,
        report: &NewReport<'_>,
        duplicate_window_secs: u64,
    ) -> Result<CreateReportOutcome, sqlx::Error> {
        let timer = QueryTimer::new("create_report");
        let mut tx = self.pool.begin().await?;

        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(report.user_id)
            .execute(&mut *tx)
            .await?;

        let existing: Option<i64> = sqlx::query_scalar(
            r#"
            SELECT id
            FROM pollution_reports
            WHERE user_id = $1 AND district_id = $2 AND pollution_type_id = $3
              AND description = $4
              AND created_at > NOW() - make_interval(secs => $5::DOUBLE PRECISION)
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(report.user_id)
        .bind(report.district_id)
        .bind(report.pollution_type_id)
        .bind(report.description)
        .bind(duplicate_window_secs as f64)
        .fetch_optional(&mut *tx)
        .await?;

        if let Some(existing_id) = existing {
            tx.rollback().await?;
            timer.record();
            return Ok(CreateReportOutcome::Duplicate { existing_id });
        }

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO pollution_reports
                (user_id, district_id, pollution_type_id, address, custom_type, description,
                 media_url, latitude, longitude, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, 'pending')
            RETURNING id
            "#,
        )
        .bind(report.user_id)
        .bind(report.district_id)
        .bind(report.pollution_type_id)
        .bind(report.address)
        .bind(report.custom_type)
        .bind(report.description)
        .bind(report.media_url)
        .bind(report.latitude)
        .bind(report.longitude)
        .fetch_one(&mut *tx)
        .await?;

        let created = sqlx::query_as::<_, ReportEntity>(&format!(
            "SELECT {} {} WHERE r.id = $1",
            REPORT_COLUMNS, REPORT_JOINS
        ))
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        timer.record();
        Ok(CreateReportOutcome::Created(created))
    }

    /// Find a report by id.
    pub async fn find_by_id(&self, id: i64) -> Result<Option<ReportEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_report_by_id");
        let result = sqlx::query_as::<_, ReportEntity>(&format!(
            "SELECT {} {} WHERE r.id = $1",
            REPORT_COLUMNS, REPORT_JOINS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Sets status, verifier, verification time and (on reject) the reason.
    ///
    /// With `enforce_pending` off the current status is not checked, so a
    /// reviewed report can be re-stamped.
    pub async fn transition(
        &self,
        id: i64,
        admin_id: i64,
        status: ReportStatus,
        reason: Option<&str>,
        enforce_pending: bool,
    ) -> Result<TransitionOutcome, sqlx::Error> {
        let timer = QueryTimer::new("transition_report");
        let reason = if status == ReportStatus::Rejected {
            reason
        } else {
            None
        };

        let mut qb = Self::transition_update(status, admin_id, reason);
        qb.push(" WHERE id = ").push_bind(id);
        if enforce_pending {
            qb.push(" AND status = 'pending'");
        }
        let updated = qb.build().execute(&self.pool).await?.rows_affected();
        timer.record();

        if updated > 0 {
            return Ok(match self.find_by_id(id).await? {
                Some(report) => TransitionOutcome::Updated(report),
                None => TransitionOutcome::NotFound,
            });
        }

        Ok(match self.find_by_id(id).await? {
            None => TransitionOutcome::NotFound,
            Some(current) => TransitionOutcome::NotPending(
                current.status.parse().unwrap_or(ReportStatus::Pending),
            ),
        })
    }

    /// Applies one transition to many reports in a single statement.
    ///
    /// `ids` must already be validated; each is bound as its own placeholder.
    /// Returns the number of rows updated.
    pub async fn bulk_transition(
        &self,
        ids: &[i64],
        admin_id: i64,
        status: ReportStatus,
        reason: Option<&str>,
        enforce_pending: bool,
    ) -> Result<u64, sqlx::Error> {
        if ids.is_empty() {
            return Ok(0);
        }
        let timer = QueryTimer::new("bulk_transition_reports");
        let reason = if status == ReportStatus::Rejected {
            reason
        } else {
            None
        };

        let mut qb = Self::transition_update(status, admin_id, reason);
        qb.push(" WHERE id IN (");
        let mut separated = qb.separated(", ");
        for id in ids {
            separated.push_bind(*id);
        }
        separated.push_unseparated(")");
        if enforce_pending {
            qb.push(" AND status = 'pending'");
        }

        let result = qb.build().execute(&self.pool).await;
        timer.record();
        Ok(result?.rows_affected())
    }

    fn transition_update<'q>(
        status: ReportStatus,
        admin_id: i64,
        reason: Option<&'q str>,
    ) -> QueryBuilder<'q, Postgres> {
        let mut qb = QueryBuilder::new("UPDATE pollution_reports SET status = ");
        qb.push_bind(status.as_str())
            .push(", verified_by = ")
            .push_bind(admin_id)
            .push(", verified_at = NOW(), rejection_reason = ")
            .push_bind(reason);
        qb
    }

    /// Lists reports newest first, with the total matching count.
    pub async fn list(
        &self,
        filter: &ReportFilter,
    ) -> Result<(Vec<ReportEntity>, i64), sqlx::Error> {
        let timer = QueryTimer::new("list_reports");
        let status = filter.status.map(|s| s.as_str());

        let rows = sqlx::query_as::<_, ReportEntity>(&format!(
            r#"
            SELECT {} {}
            WHERE ($1::BIGINT IS NULL OR r.user_id = $1)
              AND ($2::TEXT IS NULL OR r.status = $2)
              AND ($3::BIGINT IS NULL OR r.district_id = $3)
            ORDER BY r.created_at DESC, r.id DESC
            LIMIT $4 OFFSET $5
            "#,
            REPORT_COLUMNS, REPORT_JOINS
        ))
        .bind(filter.user_id)
        .bind(status)
        .bind(filter.district_id)
        .bind(filter.limit)
        .bind(filter.offset)
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM pollution_reports r
            WHERE ($1::BIGINT IS NULL OR r.user_id = $1)
              AND ($2::TEXT IS NULL OR r.status = $2)
              AND ($3::BIGINT IS NULL OR r.district_id = $3)
            "#,
        )
        .bind(filter.user_id)
        .bind(status)
        .bind(filter.district_id)
        .fetch_one(&self.pool)
        .await?;

        timer.record();
        Ok((rows, total))
    }
}
