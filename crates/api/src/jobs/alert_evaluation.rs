//! AQI alert evaluation.
//!
//! Each run loads every user with email alerts on and a district set,
//! compares the district's latest AQI to the user's threshold and sends an
//! alert for each match. Runs are stateless: a user who stays above their
//! threshold is alerted again on the next run.

use std::sync::Arc;

use domain::models::{AlertCandidate, AlertRunSummary};
use domain::services::{dispatch_alerts, AlertNotifier};
use persistence::repositories::AlertRepository;
use sqlx::PgPool;

use super::scheduler::{Job, JobFrequency};
use crate::middleware::metrics::record_alert_run;

#[derive(Clone)]
pub struct AlertEvaluator {
    alerts: AlertRepository,
    notifier: Arc<dyn AlertNotifier>,
}

impl AlertEvaluator {
    pub fn new(pool: PgPool, notifier: Arc<dyn AlertNotifier>) -> Self {
        Self {
            alerts: AlertRepository::new(pool),
            notifier,
        }
    }

    pub async fn run(&self) -> Result<AlertRunSummary, sqlx::Error> {
        let candidates: Vec<AlertCandidate> = self
            .alerts
            .candidates()
            .await?
            .into_iter()
            .map(Into::into)
            .collect();

        let summary = dispatch_alerts(&candidates, self.notifier.as_ref()).await;
        record_alert_run(&summary);
        tracing::info!(
            checked = summary.checked,
            triggered = summary.triggered,
            sent = summary.sent,
            failed = summary.failed,
            "Alert run finished"
        );
        Ok(summary)
    }
}

pub struct AlertEvaluationJob {
    evaluator: AlertEvaluator,
    interval_minutes: u64,
}

impl AlertEvaluationJob {
    pub fn new(evaluator: AlertEvaluator, interval_minutes: u64) -> Self {
        Self {
            evaluator,
            interval_minutes,
        }
    }
}

#[async_trait::async_trait]
impl Job for AlertEvaluationJob {
    fn name(&self) -> &'static str {
        "alert_evaluation"
    }

    fn frequency(&self) -> JobFrequency {
        JobFrequency::Minutes(self.interval_minutes)
    }

    async fn execute(&self) -> Result<(), String> {
        self.evaluator
            .run()
            .await
            .map(|_| ())
            .map_err(|e| format!("Failed to load alert candidates: {}", e))
    }
}
