//! Alert evaluation over a set of candidates.

use crate::models::alert::{AlertCandidate, AlertRunSummary};
use crate::services::notification::{AlertNotifier, NotificationResult};

/// Evaluates every candidate and dispatches alerts for those at or above
/// their threshold.
///
/// A failed send is recorded and the run moves on. No "already notified"
/// state is kept, so a user above threshold is alerted on every run.
pub async fn dispatch_alerts(
    candidates: &[AlertCandidate],
    notifier: &dyn AlertNotifier,
) -> AlertRunSummary {
    let mut summary = AlertRunSummary {
        checked: candidates.len(),
        ..Default::default()
    };

    for candidate in candidates {
        let Some(alert) = candidate.evaluate() else {
            continue;
        };
        summary.triggered += 1;

        match notifier.send_aqi_alert(&alert).await {
            NotificationResult::Sent => summary.sent += 1,
            NotificationResult::Skipped => {}
            NotificationResult::Failed(reason) => {
                tracing::warn!(
                    user_id = candidate.user_id,
                    email = %alert.email,
                    reason = %reason,
                    "AQI alert delivery failed"
                );
                summary.failed += 1;
                summary.failures.push(format!("{}: {}", alert.email, reason));
            }
        }
    }

    summary
}
