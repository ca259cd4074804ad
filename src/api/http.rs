//! `reqwest`-backed Health API client.
//!
//! ## Example
//!
//! ```rust,no_run
//! use vitalwatch::api::{HealthApi, HttpHealthApi};
//!
//! # tokio_test::block_on(async {
//! let api = HttpHealthApi::builder()
//!     .base_url("http://localhost:5000")
//!     .build()
//!     .unwrap();
//!
//! let raw = api.fetch_prediction("P001").await.unwrap();
//! println!("{}", raw);
//! # });
//! ```

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::{Client, Response};
use serde_json::Value;
use tracing::debug;

use super::guardian::ensure_success;
use super::{ApiError, Guardian, HealthApi};
use crate::config::{
    ApiSettings, DEFAULT_BASE_URL, DEFAULT_NOTIFICATION_URL, DEFAULT_PREDICT_PATHS,
    DEFAULT_REQUEST_TIMEOUT,
};

/// HTTP client for the Health API.
#[derive(Debug, Clone)]
pub struct HttpHealthApi {
    client: Client,
    base_url: String,
    notification_url: String,
    predict_paths: Vec<String>,
}

impl HttpHealthApi {
    pub fn builder() -> HttpHealthApiBuilder {
        HttpHealthApiBuilder::default()
    }

    /// Build a client from the `[api]` settings section.
    pub fn from_settings(settings: &ApiSettings) -> Result<Self, ApiError> {
        Self::builder()
            .base_url(&settings.base_url)
            .notification_url(&settings.notification_url)
            .timeout(settings.request_timeout)
            .predict_paths(settings.predict_paths.clone())
            .build()
    }

    fn api_url(&self, path: &str, patient_id: &str) -> String {
        join_url(&self.base_url, path, patient_id)
    }

    fn notification_api_url(&self, path: &str, patient_id: &str) -> String {
        join_url(&self.notification_url, path, patient_id)
    }

    async fn get_json(&self, url: &str, query: &[(&str, String)]) -> Result<Value, ApiError> {
        let response = self
            .client
            .get(url)
            .header(ACCEPT, "application/json")
            .query(query)
            .send()
            .await?;
        read_json(response).await
    }

    async fn post_json(&self, url: &str, body: Option<&Value>) -> Result<Value, ApiError> {
        let mut request = self.client.post(url).header(ACCEPT, "application/json");
        if let Some(body) = body {
            request = request.json(body);
        }
        read_json(request.send().await?).await
    }
}

#[async_trait]
impl HealthApi for HttpHealthApi {
    /// Tries each configured predict path in order; the first 2xx answer
    /// wins. If every path fails, the last failure is returned.
    async fn fetch_prediction(&self, patient_id: &str) -> Result<Value, ApiError> {
        let mut last_error = ApiError::Unsupported("prediction");

        for path in &self.predict_paths {
            let url = self.api_url(path, patient_id);
            let response = match self
                .client
                .get(&url)
                .header(ACCEPT, "application/json")
                .send()
                .await
            {
                Ok(response) => response,
                Err(e) => {
                    debug!(%url, error = %e, "predict endpoint failed");
                    last_error = e.into();
                    continue;
                }
            };

            if response.status().is_success() {
                return read_json(response).await;
            }
            debug!(%url, status = %response.status(), "predict endpoint refused");
            last_error = ApiError::Status(response.status().as_u16());
        }

        Err(last_error)
    }

    async fn fetch_history(&self, patient_id: &str, hours: u32) -> Result<Value, ApiError> {
        let url = self.api_url("ml/history", patient_id);
        self.get_json(&url, &[("hours", hours.to_string())]).await
    }

    async fn fetch_status(&self, patient_id: &str) -> Result<Value, ApiError> {
        let url = self.api_url("ml/status", patient_id);
        self.get_json(&url, &[]).await
    }

    async fn fetch_alerts(&self, patient_id: &str) -> Result<Value, ApiError> {
        let url = self.api_url("ml/alerts", patient_id);
        self.get_json(&url, &[]).await
    }

    async fn fetch_notifications(&self, patient_id: &str) -> Result<Value, ApiError> {
        let url = self.notification_api_url("api/notifications", patient_id);
        let body = self.get_json(&url, &[]).await?;
        ensure_success(&body)?;
        Ok(body)
    }

    async fn register_guardian(&self, guardian: &Guardian) -> Result<(), ApiError> {
        guardian.validate()?;
        let url = format!("{}/api/guardians", self.notification_url);
        let body = serde_json::to_value(guardian).map_err(|e| ApiError::Invalid(e.to_string()))?;
        let reply = self.post_json(&url, Some(&body)).await?;
        ensure_success(&reply)
    }

    async fn trigger_emergency(&self, patient_id: &str) -> Result<(), ApiError> {
        let url = self.notification_api_url("api/trigger-emergency", patient_id);
        let reply = self.post_json(&url, None).await?;
        ensure_success(&reply)
    }

    fn describe(&self) -> String {
        self.base_url.clone()
    }
}

/// Decode a JSON body. Non-2xx statuses become [`ApiError::Status`], except
/// that a notification-service reply carrying `success: false` is surfaced
/// as a rejection with its message.
async fn read_json(response: Response) -> Result<Value, ApiError> {
    let status = response.status();
    let text = response.text().await?;

    let parsed: Result<Value, _> = serde_json::from_str(&text);
    if !status.is_success() {
        if let Ok(body) = &parsed {
            if body.get("success").is_some() {
                ensure_success(body)?;
            }
        }
        return Err(ApiError::Status(status.as_u16()));
    }

    parsed.map_err(|e| ApiError::Parse(e.to_string()))
}

fn join_url(base: &str, path: &str, patient_id: &str) -> String {
    format!(
        "{}/{}/{}",
        base.trim_end_matches('/'),
        path.trim_matches('/'),
        patient_id
    )
}

/// Builder for [`HttpHealthApi`].
#[derive(Debug, Default)]
pub struct HttpHealthApiBuilder {
    base_url: Option<String>,
    notification_url: Option<String>,
    timeout: Option<Duration>,
    predict_paths: Option<Vec<String>>,
}

impl HttpHealthApiBuilder {
    /// Set the Health API base URL (default: "http://localhost:5000").
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the notification service base URL (default: "http://localhost:3001").
    pub fn notification_url(mut self, url: impl Into<String>) -> Self {
        self.notification_url = Some(url.into());
        self
    }

    /// Set the per-request timeout (default: 5 seconds).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the ordered list of prediction endpoints to probe.
    pub fn predict_paths(mut self, paths: Vec<String>) -> Self {
        self.predict_paths = Some(paths);
        self
    }

    pub fn build(self) -> Result<HttpHealthApi, ApiError> {
        let timeout = self.timeout.unwrap_or(DEFAULT_REQUEST_TIMEOUT);

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Invalid(format!("HTTP client: {}", e)))?;

        let predict_paths = self
            .predict_paths
            .filter(|paths| !paths.is_empty())
            .unwrap_or_else(|| DEFAULT_PREDICT_PATHS.iter().map(|p| p.to_string()).collect());

        Ok(HttpHealthApi {
            client,
            base_url: self
                .base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            notification_url: self
                .notification_url
                .unwrap_or_else(|| DEFAULT_NOTIFICATION_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            predict_paths,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let api = HttpHealthApi::builder().build().unwrap();
        assert_eq!(api.base_url, "http://localhost:5000");
        assert_eq!(api.notification_url, "http://localhost:3001");
        assert_eq!(
            api.predict_paths,
            vec!["ml/predict", "api/predict", "predict", "vitals"]
        );
    }

    #[test]
    fn test_builder_custom() {
        let api = HttpHealthApi::builder()
            .base_url("http://health.local:8000/")
            .notification_url("http://notify.local")
            .predict_paths(vec!["v2/predict".to_string()])
            .build()
            .unwrap();

        assert_eq!(api.base_url, "http://health.local:8000");
        assert_eq!(api.describe(), "http://health.local:8000");
        assert_eq!(
            api.api_url("v2/predict", "P042"),
            "http://health.local:8000/v2/predict/P042"
        );
        assert_eq!(
            api.notification_api_url("api/trigger-emergency", "P042"),
            "http://notify.local/api/trigger-emergency/P042"
        );
    }

    #[test]
    fn test_empty_probe_list_uses_defaults() {
        let api = HttpHealthApi::builder()
            .predict_paths(Vec::new())
            .build()
            .unwrap();
        assert_eq!(api.predict_paths.len(), 4);
    }

    #[test]
    fn test_join_url_trims_slashes() {
        assert_eq!(
            join_url("http://x/", "/ml/alerts/", "P1"),
            "http://x/ml/alerts/P1"
        );
    }

    #[tokio::test]
    async fn test_invalid_guardian_is_not_sent() {
        // Unroutable base URL: validation must fail before any request.
        let api = HttpHealthApi::builder()
            .notification_url("http://127.0.0.1:9")
            .build()
            .unwrap();
        let guardian = Guardian::new("P001", "Ada", "ada@example.com", "555").priority(9);
        assert!(matches!(
            api.register_guardian(&guardian).await,
            Err(ApiError::Invalid(_))
        ));
    }
}
