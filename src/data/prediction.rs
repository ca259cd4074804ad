//! Canonical health data types.
//!
//! These are the shapes the rest of the crate works with. The external API
//! is free to answer in several looser layouts; [`super::normalize`] turns
//! any of them into these types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Blood pressure in mmHg.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BloodPressure {
    pub systolic: f64,
    pub diastolic: f64,
}

/// A set of vital signs. Every field is optional; sensors drop out.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VitalReading {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heart_rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spo2: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blood_pressure: Option<BloodPressure>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub respiratory_rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl VitalReading {
    /// True if none of the scoring vitals are present.
    pub fn is_empty(&self) -> bool {
        self.heart_rate.is_none()
            && self.spo2.is_none()
            && self.temperature.is_none()
            && self.blood_pressure.is_none()
            && self.respiratory_rate.is_none()
    }
}

/// A scored health reading (current or predicted).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthReading {
    /// Health score in `[0, 100]`.
    pub score: f64,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vitals: Option<VitalReading>,
}

/// Current health plus the backend's short-horizon prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthPrediction {
    pub current_health: HealthReading,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub predicted_health: Option<HealthReading>,
}

impl HealthPrediction {
    /// Score used for the predicted gauge; falls back to the current score.
    pub fn predicted_score(&self) -> f64 {
        self.predicted_health
            .as_ref()
            .map_or(self.current_health.score, |p| p.score)
    }

    /// Status label for the predicted gauge; falls back to the current status.
    pub fn predicted_status(&self) -> &str {
        self.predicted_health
            .as_ref()
            .map_or(self.current_health.status.as_str(), |p| p.status.as_str())
    }

    /// `predicted - current`, the input to trend classification.
    pub fn change(&self) -> f64 {
        self.predicted_score() - self.current_health.score
    }
}

/// One entry of the rolling history window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryPoint {
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(default)]
    pub vitals: VitalReading,
}

/// Alert severity as reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Low,
    Medium,
    High,
}

/// An active alert from `/ml/alerts/:patientId`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub severity: AlertSeverity,
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

/// Model/profile metadata from `/ml/status/:patientId`, kept as ordered
/// key/value pairs because its fields are not fixed.
pub type PatientStatus = Vec<(String, String)>;

/// One emergency notification from the notification service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub current_score: Option<f64>,
    #[serde(default)]
    pub predicted_score: Option<f64>,
    #[serde(default)]
    pub responding_guardian: Option<String>,
    #[serde(default)]
    pub accepting_hospital: Option<String>,
    #[serde(default)]
    pub hospitals_contacted: usize,
}

/// Everything a single poll tick produces.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthSnapshot {
    pub patient_id: String,
    pub prediction: HealthPrediction,
    /// Newest first.
    pub history: Vec<HistoryPoint>,
    pub status: PatientStatus,
    pub alerts: Vec<Alert>,
    /// Emergency notifications, newest first as the service sends them.
    pub notifications: Vec<Notification>,
    pub fetched_at: DateTime<Utc>,
}

impl HealthSnapshot {
    /// A snapshot with only a prediction; optional sections empty.
    pub fn from_prediction(
        patient_id: &str,
        prediction: HealthPrediction,
        fetched_at: DateTime<Utc>,
    ) -> Self {
        Self {
            patient_id: patient_id.to_string(),
            prediction,
            history: Vec::new(),
            status: Vec::new(),
            alerts: Vec::new(),
            notifications: Vec::new(),
            fetched_at,
        }
    }

    /// Vitals attached to the current reading, if any.
    pub fn vitals(&self) -> Option<&VitalReading> {
        self.prediction.current_health.vitals.as_ref()
    }
}
