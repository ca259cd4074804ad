//! Scripted in-memory [`HealthApi`] for tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Value};

use super::{ApiError, Guardian, HealthApi};

type Reply = (Duration, Result<Value, ApiError>);

/// Replays scripted prediction replies in order, then repeats the default.
#[derive(Debug)]
pub(crate) struct MockApi {
    script: Mutex<VecDeque<Reply>>,
    default: Mutex<Reply>,
    history: Option<Value>,
    pub prediction_calls: AtomicUsize,
    pub history_calls: AtomicUsize,
    pub emergencies: AtomicUsize,
    pub guardians: Mutex<Vec<Guardian>>,
}

impl MockApi {
    /// Always answers with `{current_health: {score}}` immediately.
    pub fn scoring(score: f64) -> Self {
        Self::replying(Ok(prediction(score)))
    }

    pub fn replying(result: Result<Value, ApiError>) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            default: Mutex::new((Duration::ZERO, result)),
            history: None,
            prediction_calls: AtomicUsize::new(0),
            history_calls: AtomicUsize::new(0),
            emergencies: AtomicUsize::new(0),
            guardians: Mutex::new(Vec::new()),
        }
    }

    /// Queue a reply that arrives after `delay`.
    pub fn then(self, delay: Duration, result: Result<Value, ApiError>) -> Self {
        self.script.lock().push_back((delay, result));
        self
    }

    /// Delay applied to the default reply.
    pub fn with_delay(self, delay: Duration) -> Self {
        self.default.lock().0 = delay;
        self
    }

    pub fn with_history(mut self, history: Value) -> Self {
        self.history = Some(history);
        self
    }

    /// Change the default reply from now on.
    pub fn set_default(&self, result: Result<Value, ApiError>) {
        self.default.lock().1 = result;
    }

    pub fn calls(&self) -> usize {
        self.prediction_calls.load(Ordering::SeqCst)
    }
}

pub(crate) fn prediction(score: f64) -> Value {
    json!({ "current_health": { "score": score, "status": "Good" } })
}

#[async_trait]
impl HealthApi for MockApi {
    async fn fetch_prediction(&self, _patient_id: &str) -> Result<Value, ApiError> {
        self.prediction_calls.fetch_add(1, Ordering::SeqCst);
        let (delay, result) = self
            .script
            .lock()
            .pop_front()
            .unwrap_or_else(|| self.default.lock().clone());
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        result
    }

    async fn fetch_history(&self, _patient_id: &str, _hours: u32) -> Result<Value, ApiError> {
        self.history_calls.fetch_add(1, Ordering::SeqCst);
        self.history
            .clone()
            .ok_or(ApiError::Status(404))
    }

    async fn register_guardian(&self, guardian: &Guardian) -> Result<(), ApiError> {
        guardian.validate()?;
        self.guardians.lock().push(guardian.clone());
        Ok(())
    }

    async fn trigger_emergency(&self, _patient_id: &str) -> Result<(), ApiError> {
        self.emergencies.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn describe(&self) -> String {
        "mock".to_string()
    }
}
