//! The poll task: one per patient, owned by the registry.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde_json::Value;
use tokio::sync::{watch, Notify};
use tokio::task::JoinSet;
use tokio::time::{timeout, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use super::state::{PollerState, SequenceGuard};
use crate::api::{ApiError, HealthApi};
use crate::config::{
    Settings, DEFAULT_HISTORY_HOURS, DEFAULT_REFRESH_INTERVAL, DEFAULT_REQUEST_TIMEOUT,
};
use crate::data::{
    normalize_alerts, normalize_history, normalize_notifications, normalize_prediction,
    normalize_status, HealthSnapshot,
};

/// Timing for every poller created by a registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollOptions {
    pub interval: Duration,
    /// Bound on each fetch, including endpoint probing.
    pub request_timeout: Duration,
    pub history_hours: u32,
}

impl Default for PollOptions {
    fn default() -> Self {
        Self {
            interval: DEFAULT_REFRESH_INTERVAL,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            history_hours: DEFAULT_HISTORY_HOURS,
        }
    }
}

impl PollOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            interval: settings.poll.interval,
            request_timeout: settings.api.request_timeout,
            history_hours: settings.poll.history_hours,
        }
    }
}

type FetchResult = (u64, Result<HealthSnapshot, ApiError>);

/// Poll `patient_id` until aborted.
///
/// Fetches once immediately, then on every interval tick and every refresh
/// notification. At most one fetch is in flight; a trigger that arrives
/// while one is running is folded into it.
pub(crate) async fn run(
    api: Arc<dyn HealthApi>,
    patient_id: String,
    options: PollOptions,
    state: watch::Sender<PollerState>,
    refresh: Arc<Notify>,
) {
    let mut ticker = tokio::time::interval(options.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut sequence = SequenceGuard::default();
    let mut in_flight: JoinSet<FetchResult> = JoinSet::new();

    info!(patient = %patient_id, interval = ?options.interval, "poller started");

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                start_fetch(&api, &patient_id, options, &state, &mut sequence, &mut in_flight);
            }
            _ = refresh.notified() => {
                debug!(patient = %patient_id, "manual refresh");
                start_fetch(&api, &patient_id, options, &state, &mut sequence, &mut in_flight);
            }
            Some(joined) = in_flight.join_next() => match joined {
                Ok((seq, result)) => {
                    if let Err(e) = &result {
                        warn!(patient = %patient_id, seq, error = %e, "fetch failed, keeping fallback data");
                    }
                    state.send_modify(|s| {
                        if !s.apply(seq, result, Utc::now()) {
                            debug!(patient = %patient_id, seq, applied = s.sequence, "dropped stale result");
                        }
                        s.is_refreshing = false;
                    });
                }
                Err(e) if e.is_cancelled() => {}
                Err(e) => {
                    error!(patient = %patient_id, error = %e, "fetch task failed");
                    state.send_modify(|s| s.is_refreshing = false);
                }
            },
        }
    }
}

fn start_fetch(
    api: &Arc<dyn HealthApi>,
    patient_id: &str,
    options: PollOptions,
    state: &watch::Sender<PollerState>,
    sequence: &mut SequenceGuard,
    in_flight: &mut JoinSet<FetchResult>,
) {
    if !in_flight.is_empty() {
        debug!(patient = %patient_id, "fetch in flight, trigger coalesced");
        return;
    }

    let seq = sequence.issue();
    debug!(patient = %patient_id, seq, "fetch started");
    state.send_modify(|s| s.is_refreshing = true);

    let api = Arc::clone(api);
    let patient_id = patient_id.to_string();
    in_flight.spawn(async move {
        let result = fetch_snapshot(api.as_ref(), &patient_id, options).await;
        (seq, result)
    });
}

/// One tick's worth of requests. The prediction is required; the other
/// endpoints are best effort and run alongside it.
pub async fn fetch_snapshot(
    api: &dyn HealthApi,
    patient_id: &str,
    options: PollOptions,
) -> Result<HealthSnapshot, ApiError> {
    let limit = options.request_timeout;

    let (prediction, history, status, alerts, notifications) = tokio::join!(
        timeout(limit, api.fetch_prediction(patient_id)),
        optional(
            "history",
            patient_id,
            limit,
            api.fetch_history(patient_id, options.history_hours)
        ),
        optional("status", patient_id, limit, api.fetch_status(patient_id)),
        optional("alerts", patient_id, limit, api.fetch_alerts(patient_id)),
        optional(
            "notifications",
            patient_id,
            limit,
            api.fetch_notifications(patient_id)
        ),
    );

    let raw = prediction.map_err(|_| ApiError::Timeout)??;
    let prediction = normalize_prediction(&raw)?;

    let mut snapshot = HealthSnapshot::from_prediction(patient_id, prediction, Utc::now());
    if let Some(v) = history {
        snapshot.history = normalize_history(&v);
    }
    if let Some(v) = status {
        snapshot.status = normalize_status(&v);
    }
    if let Some(v) = alerts {
        snapshot.alerts = normalize_alerts(&v);
    }
    if let Some(v) = notifications {
        snapshot.notifications = normalize_notifications(&v);
    }
    Ok(snapshot)
}

async fn optional<F>(
    endpoint: &'static str,
    patient_id: &str,
    limit: Duration,
    fut: F,
) -> Option<Value>
where
    F: Future<Output = Result<Value, ApiError>>,
{
    match timeout(limit, fut).await {
        Ok(Ok(value)) => Some(value),
        Ok(Err(ApiError::Unsupported(_))) => None,
        Ok(Err(e)) => {
            warn!(patient = %patient_id, endpoint, error = %e, "optional endpoint failed");
            None
        }
        Err(_) => {
            warn!(patient = %patient_id, endpoint, "optional endpoint timed out");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::MockApi;
    use serde_json::json;

    fn options() -> PollOptions {
        PollOptions {
            interval: Duration::from_secs(10),
            request_timeout: Duration::from_secs(5),
            history_hours: 6,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn fetch_combines_prediction_and_history() {
        let api = MockApi::scoring(72.0).with_history(json!({
            "history": [
                { "timestamp": "2024-05-01T11:00:00Z", "score": 70 },
                { "timestamp": "2024-05-01T11:30:00Z", "score": 74 }
            ]
        }));

        let snapshot = fetch_snapshot(&api, "P001", options()).await.unwrap();
        assert_eq!(snapshot.patient_id, "P001");
        assert_eq!(snapshot.prediction.current_health.score, 72.0);
        assert_eq!(snapshot.history.len(), 2);
        assert_eq!(snapshot.history[0].score, Some(74.0));
        // Unsupported endpoints leave their sections empty
        assert!(snapshot.alerts.is_empty());
        assert!(snapshot.status.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn missing_history_is_not_an_error() {
        let api = MockApi::scoring(72.0);
        let snapshot = fetch_snapshot(&api, "P001", options()).await.unwrap();
        assert!(snapshot.history.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn slow_prediction_times_out() {
        let api = MockApi::scoring(72.0).with_delay(Duration::from_secs(60));
        let result = fetch_snapshot(&api, "P001", options()).await;
        assert_eq!(result, Err(ApiError::Timeout));
    }

    #[tokio::test(start_paused = true)]
    async fn malformed_prediction_is_a_parse_error() {
        let api = MockApi::replying(Ok(json!({ "unexpected": true })));
        let result = fetch_snapshot(&api, "P001", options()).await;
        assert!(matches!(result, Err(ApiError::Parse(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn api_error_passes_through() {
        let api = MockApi::replying(Err(ApiError::Status(503)));
        let result = fetch_snapshot(&api, "P001", options()).await;
        assert_eq!(result, Err(ApiError::Status(503)));
        assert_eq!(api.calls(), 1);
    }
}
