//! Client for the external Health API and notification service.
//!
//! The scoring and prediction engine lives behind these endpoints and is
//! treated as opaque. Reads hand back raw JSON; turning it into typed data
//! is [`crate::data::normalize`]'s job, because the service does not commit
//! to one response shape.
//!
//! [`HealthApi`] is the seam: the poller only ever sees the trait, so tests
//! and offline modes substitute their own implementation.

mod error;
mod guardian;
mod http;
#[cfg(test)]
pub(crate) mod mock;

pub use error::ApiError;
pub use guardian::{ensure_success, Guardian, MAX_PRIORITY, MIN_PRIORITY};
pub use http::{HttpHealthApi, HttpHealthApiBuilder};

use std::fmt::Debug;

use async_trait::async_trait;
use serde_json::Value;

/// Operations against the Health API and its notification service.
///
/// Only [`fetch_prediction`](HealthApi::fetch_prediction) is required. The
/// other endpoints are optional for a backend; their default
/// implementations report [`ApiError::Unsupported`].
#[async_trait]
pub trait HealthApi: Send + Sync + Debug {
    /// Current and predicted health for a patient.
    async fn fetch_prediction(&self, patient_id: &str) -> Result<Value, ApiError>;

    /// Rolling window of past readings covering the last `hours`.
    async fn fetch_history(&self, _patient_id: &str, _hours: u32) -> Result<Value, ApiError> {
        Err(ApiError::Unsupported("history"))
    }

    /// Patient profile and model metadata.
    async fn fetch_status(&self, _patient_id: &str) -> Result<Value, ApiError> {
        Err(ApiError::Unsupported("status"))
    }

    /// Active alerts.
    async fn fetch_alerts(&self, _patient_id: &str) -> Result<Value, ApiError> {
        Err(ApiError::Unsupported("alerts"))
    }

    /// Emergency notification history.
    async fn fetch_notifications(&self, _patient_id: &str) -> Result<Value, ApiError> {
        Err(ApiError::Unsupported("notifications"))
    }

    async fn register_guardian(&self, _guardian: &Guardian) -> Result<(), ApiError> {
        Err(ApiError::Unsupported("guardian registration"))
    }

    /// Manually start the emergency workflow for a patient.
    async fn trigger_emergency(&self, _patient_id: &str) -> Result<(), ApiError> {
        Err(ApiError::Unsupported("emergency trigger"))
    }

    /// Human-readable endpoint, for the header and logs.
    fn describe(&self) -> String;
}
