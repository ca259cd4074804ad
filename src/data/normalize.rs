//! Response-shape normalization.
//!
//! The Health API does not commit to one response layout. A prediction can
//! arrive as any of:
//!
//! ```text
//! { "prediction": { "current_health": {...}, "predicted_health": {...} } }
//! { "current_health": {...}, "predicted_health": {...} }
//! { "score": 81, "status": "...", "predicted_score": 77, "vitals": {...} }
//! { "vitals": { "heart_rate": 82, ... } }
//! { "heart_rate": 82, "spo2": 96, ... }
//! ```
//!
//! Every variant is folded into one [`HealthPrediction`]. Missing scores are
//! derived from vitals and missing statuses are classified from the score,
//! so the output of [`normalize_prediction`] is itself a valid input that
//! normalizes to the same value.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::{Map, Value};
use thiserror::Error;

use super::prediction::{
    Alert, AlertSeverity, BloodPressure, HealthPrediction, HealthReading, HistoryPoint,
    Notification, PatientStatus, VitalReading,
};
use super::score::{vitals_score, ScoreBand};

/// Ways a response can fail to normalize.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NormalizeError {
    /// The body is valid JSON but none of the known layouts.
    #[error("unrecognized response shape: {0}")]
    UnknownShape(String),

    /// A reading carries neither a score nor any vitals.
    #[error("reading has neither a score nor vitals")]
    MissingScore,
}

/// Fold any supported prediction layout into a [`HealthPrediction`].
pub fn normalize_prediction(value: &Value) -> Result<HealthPrediction, NormalizeError> {
    let Some(obj) = value.as_object() else {
        return Err(NormalizeError::UnknownShape(type_name(value).to_string()));
    };

    if let Some(inner) = obj.get("prediction").filter(|v| v.is_object()) {
        return normalize_prediction(inner);
    }

    if let Some(current) = obj.get("current_health").and_then(Value::as_object) {
        let current_health = reading_from_object(current)?;
        let predicted_health = obj
            .get("predicted_health")
            .and_then(Value::as_object)
            .and_then(|p| reading_from_object(p).ok());
        return Ok(HealthPrediction {
            current_health,
            predicted_health,
        });
    }

    if number(obj, "score").is_some() {
        let current_health = reading_from_object(obj)?;
        let predicted_health = number(obj, "predicted_score").map(|raw| {
            let score = raw.clamp(0.0, 100.0);
            HealthReading {
                score,
                status: string(obj, "predicted_status")
                    .unwrap_or_else(|| ScoreBand::classify(score).label().to_string()),
                vitals: None,
            }
        });
        return Ok(HealthPrediction {
            current_health,
            predicted_health,
        });
    }

    if obj.get("vitals").is_some_and(Value::is_object) {
        return Ok(HealthPrediction {
            current_health: reading_from_object(obj)?,
            predicted_health: None,
        });
    }

    if is_bare_vitals(obj) {
        let vitals = vitals_from_object(obj);
        let score = vitals_score(&vitals);
        return Ok(HealthPrediction {
            current_health: HealthReading {
                score,
                status: ScoreBand::classify(score).label().to_string(),
                vitals: Some(vitals),
            },
            predicted_health: None,
        });
    }

    let keys: Vec<&str> = obj.keys().map(String::as_str).take(5).collect();
    Err(NormalizeError::UnknownShape(format!("keys [{}]", keys.join(", "))))
}

/// Normalize a history response (`{history: [...]}` or a bare array).
///
/// Items without a parseable timestamp or without any score/vitals are
/// dropped. The result is sorted newest first.
pub fn normalize_history(value: &Value) -> Vec<HistoryPoint> {
    let mut points: Vec<HistoryPoint> = list_under(value, "history")
        .iter()
        .filter_map(Value::as_object)
        .filter_map(history_point)
        .collect();

    points.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    points
}

/// Normalize `/ml/alerts` (`{alerts: [...]}` or a bare array).
///
/// String items become low-severity alerts; unknown severities map to low.
pub fn normalize_alerts(value: &Value) -> Vec<Alert> {
    let items = list_under(value, "alerts");
    let mut alerts: Vec<Alert> = items
        .iter()
        .filter_map(|item| match item {
            Value::String(message) => Some(Alert {
                severity: AlertSeverity::Low,
                kind: String::new(),
                message: message.clone(),
                timestamp: None,
            }),
            Value::Object(obj) => Some(Alert {
                severity: match string(obj, "severity").as_deref() {
                    Some("high") | Some("critical") => AlertSeverity::High,
                    Some("medium") => AlertSeverity::Medium,
                    _ => AlertSeverity::Low,
                },
                kind: string(obj, "type").unwrap_or_default(),
                message: string(obj, "message").unwrap_or_default(),
                timestamp: string(obj, "timestamp"),
            }),
            _ => None,
        })
        .collect();

    // Stable sort keeps backend order within a severity
    alerts.sort_by(|a, b| b.severity.cmp(&a.severity));
    alerts
}

/// Flatten `/ml/status` (`{status: {...}}` or the object itself) into
/// display pairs. Nested objects and arrays are rendered as compact JSON.
pub fn normalize_status(value: &Value) -> PatientStatus {
    let obj = match value.get("status") {
        Some(Value::Object(inner)) => inner,
        _ => match value.as_object() {
            Some(obj) => obj,
            None => return Vec::new(),
        },
    };

    obj.iter()
        .map(|(key, v)| {
            let text = match v {
                Value::String(s) => s.clone(),
                Value::Null => "-".to_string(),
                other => other.to_string(),
            };
            (key.clone(), text)
        })
        .collect()
}

/// Normalize the notification service's `{success, notifications: [...]}`.
pub fn normalize_notifications(value: &Value) -> Vec<Notification> {
    list_under(value, "notifications")
        .iter()
        .filter_map(Value::as_object)
        .map(|obj| {
            let prediction = obj.get("prediction");
            let score_at = |section: &str| {
                prediction
                    .and_then(|p| p.get(section))
                    .and_then(|s| s.get("score"))
                    .and_then(Value::as_f64)
            };
            Notification {
                status: string(obj, "status").unwrap_or_default(),
                timestamp: string(obj, "timestamp"),
                current_score: score_at("current_health"),
                predicted_score: score_at("predicted_health"),
                responding_guardian: obj
                    .get("guardian_responded")
                    .and_then(Value::as_bool)
                    .filter(|responded| *responded)
                    .and_then(|_| string(obj, "responding_guardian")),
                accepting_hospital: obj
                    .get("hospital_responded")
                    .and_then(Value::as_bool)
                    .filter(|responded| *responded)
                    .and_then(|_| string(obj, "accepting_hospital")),
                hospitals_contacted: obj
                    .get("hospitals_contacted")
                    .and_then(Value::as_array)
                    .map_or(0, Vec::len),
            }
        })
        .collect()
}

/// Parse a backend timestamp. Naive ISO-8601 values are taken as UTC.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|naive| naive.and_utc())
}

fn reading_from_object(obj: &Map<String, Value>) -> Result<HealthReading, NormalizeError> {
    let vitals = match obj.get("vitals").and_then(Value::as_object) {
        Some(v) => Some(vitals_from_object(v)),
        None if is_bare_vitals(obj) => Some(vitals_from_object(obj)),
        None => None,
    };

    let score = match (number(obj, "score"), &vitals) {
        (Some(score), _) => score.clamp(0.0, 100.0),
        (None, Some(v)) => vitals_score(v),
        (None, None) => return Err(NormalizeError::MissingScore),
    };

    let status = string(obj, "status")
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| ScoreBand::classify(score).label().to_string());

    Ok(HealthReading {
        score,
        status,
        vitals,
    })
}

fn vitals_from_object(obj: &Map<String, Value>) -> VitalReading {
    let blood_pressure = obj.get("blood_pressure").and_then(|bp| {
        Some(BloodPressure {
            systolic: bp.get("systolic")?.as_f64()?,
            diastolic: bp.get("diastolic")?.as_f64()?,
        })
    });

    VitalReading {
        heart_rate: number(obj, "heart_rate"),
        spo2: number(obj, "spo2"),
        temperature: number(obj, "temperature"),
        blood_pressure,
        respiratory_rate: number(obj, "respiratory_rate"),
        timestamp: string(obj, "timestamp"),
    }
}

fn history_point(obj: &Map<String, Value>) -> Option<HistoryPoint> {
    let timestamp = obj
        .get("timestamp")
        .and_then(Value::as_str)
        .and_then(parse_timestamp)?;

    let score = number(obj, "score");
    let nested = obj.get("vitals").and_then(Value::as_object);
    let has_vitals = nested.is_some() || obj.contains_key("heart_rate") || obj.contains_key("spo2");
    if score.is_none() && !has_vitals {
        return None;
    }

    Some(HistoryPoint {
        timestamp,
        score,
        vitals: vitals_from_object(nested.unwrap_or(obj)),
    })
}

fn is_bare_vitals(obj: &Map<String, Value>) -> bool {
    ["heart_rate", "spo2", "temperature"]
        .iter()
        .any(|key| number(obj, key).is_some())
}

fn list_under<'a>(value: &'a Value, key: &str) -> &'a [Value] {
    match value {
        Value::Array(items) => items.as_slice(),
        Value::Object(obj) => obj
            .get(key)
            .and_then(Value::as_array)
            .map_or(&[][..], Vec::as_slice),
        _ => &[],
    }
}

fn number(obj: &Map<String, Value>, key: &str) -> Option<f64> {
    obj.get(key).and_then(Value::as_f64).filter(|n| n.is_finite())
}

fn string(obj: &Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key).and_then(Value::as_str).map(str::to_string)
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn canonical() -> HealthPrediction {
        HealthPrediction {
            current_health: HealthReading {
                score: 98.0,
                status: "Excellent".to_string(),
                vitals: Some(VitalReading {
                    heart_rate: Some(75.0),
                    spo2: Some(95.0),
                    temperature: Some(37.0),
                    ..Default::default()
                }),
            },
            predicted_health: None,
        }
    }

    #[test]
    fn all_documented_shapes_agree() {
        let vitals = json!({ "heart_rate": 75, "spo2": 95, "temperature": 37 });
        let shapes = [
            json!({ "prediction": { "current_health": { "score": 98, "status": "Excellent", "vitals": vitals } } }),
            json!({ "current_health": { "score": 98, "status": "Excellent", "vitals": vitals } }),
            json!({ "vitals": vitals }),
            vitals.clone(),
        ];

        for shape in &shapes {
            assert_eq!(normalize_prediction(shape).unwrap(), canonical(), "shape: {}", shape);
        }
    }

    #[test]
    fn normalizing_canonical_output_is_stable() {
        let first = normalize_prediction(&json!({ "heart_rate": 140, "spo2": 85 })).unwrap();
        let again = normalize_prediction(&serde_json::to_value(&first).unwrap()).unwrap();
        assert_eq!(first, again);
    }

    #[test]
    fn flat_score_shape_with_prediction() {
        let p = normalize_prediction(&json!({
            "score": 71,
            "predicted_score": 64,
            "predicted_status": "Watch"
        }))
        .unwrap();
        assert_eq!(p.current_health.score, 71.0);
        assert_eq!(p.current_health.status, "Good");
        let predicted = p.predicted_health.unwrap();
        assert_eq!(predicted.score, 64.0);
        assert_eq!(predicted.status, "Watch");
    }

    #[test]
    fn backend_status_is_kept() {
        let p = normalize_prediction(&json!({
            "current_health": { "score": 45, "status": "Monitoring" },
            "predicted_health": { "score": 52 }
        }))
        .unwrap();
        assert_eq!(p.current_health.status, "Monitoring");
        assert_eq!(p.predicted_health.unwrap().status, "Fair");
    }

    #[test]
    fn out_of_range_scores_are_clamped() {
        let p = normalize_prediction(&json!({ "score": 130 })).unwrap();
        assert_eq!(p.current_health.score, 100.0);

        let p = normalize_prediction(&json!({ "score": 71, "predicted_score": 130 })).unwrap();
        assert_eq!(p.predicted_health.as_ref().unwrap().score, 100.0);
        let p = normalize_prediction(&json!({ "score": 71, "predicted_score": -5 })).unwrap();
        assert_eq!(p.predicted_health.as_ref().unwrap().score, 0.0);
    }

    #[test]
    fn flat_shape_with_out_of_range_prediction_is_stable() {
        let first = normalize_prediction(&json!({ "score": 71, "predicted_score": 130 })).unwrap();
        let again = normalize_prediction(&serde_json::to_value(&first).unwrap()).unwrap();
        assert_eq!(first, again);
    }

    #[test]
    fn unknown_shapes_are_rejected() {
        assert!(matches!(
            normalize_prediction(&json!({ "message": "model warming up" })),
            Err(NormalizeError::UnknownShape(_))
        ));
        assert!(matches!(
            normalize_prediction(&json!([1, 2, 3])),
            Err(NormalizeError::UnknownShape(_))
        ));
        assert_eq!(
            normalize_prediction(&json!({ "current_health": { "status": "?" } })),
            Err(NormalizeError::MissingScore)
        );
    }

    #[test]
    fn history_filters_and_sorts_newest_first() {
        let history = normalize_history(&json!({
            "history": [
                { "timestamp": "2024-05-01T10:00:00Z", "score": 70 },
                { "timestamp": "2024-05-01T12:00:00", "vitals": { "heart_rate": 80 } },
                { "timestamp": "2024-05-01T11:00:00Z", "heart_rate": 90, "spo2": 97 },
                { "timestamp": "2024-05-01T13:00:00Z" },
                { "score": 80 },
                { "timestamp": "not a date", "score": 50 }
            ]
        }));

        assert_eq!(history.len(), 3);
        assert_eq!(history[0].vitals.heart_rate, Some(80.0));
        assert_eq!(history[1].vitals.heart_rate, Some(90.0));
        assert_eq!(history[2].score, Some(70.0));
    }

    #[test]
    fn history_accepts_bare_array_and_garbage() {
        assert_eq!(
            normalize_history(&json!([{ "timestamp": "2024-05-01T10:00:00Z", "score": 1 }])).len(),
            1
        );
        assert!(normalize_history(&json!({ "error": "nope" })).is_empty());
        assert!(normalize_history(&json!("nope")).is_empty());
    }

    #[test]
    fn alerts_sorted_by_severity() {
        let alerts = normalize_alerts(&json!({
            "alerts": [
                { "severity": "low", "type": "info", "message": "battery low" },
                "sensor reconnected",
                { "severity": "high", "type": "spo2", "message": "SpO2 below 90%" }
            ]
        }));
        assert_eq!(alerts.len(), 3);
        assert_eq!(alerts[0].severity, AlertSeverity::High);
        assert_eq!(alerts[0].kind, "spo2");
        assert_eq!(alerts[2].message, "sensor reconnected");
    }

    #[test]
    fn status_is_flattened() {
        let status = normalize_status(&json!({
            "status": { "model": "cnn-lstm", "data_points_collected": 120, "trained": true }
        }));
        assert!(status.contains(&("model".to_string(), "cnn-lstm".to_string())));
        assert!(status.contains(&("data_points_collected".to_string(), "120".to_string())));
        assert!(normalize_status(&json!(null)).is_empty());
    }

    #[test]
    fn notifications_pick_out_responders() {
        let notes = normalize_notifications(&json!({
            "success": true,
            "notifications": [{
                "status": "DISPATCHED",
                "timestamp": "2024-05-01T10:00:00Z",
                "prediction": { "current_health": { "score": 35 }, "predicted_health": { "score": 30 } },
                "guardian_responded": true,
                "responding_guardian": "Ana",
                "hospital_responded": false,
                "accepting_hospital": "General",
                "hospitals_contacted": ["A", "B"]
            }]
        }));
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].current_score, Some(35.0));
        assert_eq!(notes[0].responding_guardian.as_deref(), Some("Ana"));
        assert_eq!(notes[0].accepting_hospital, None);
        assert_eq!(notes[0].hospitals_contacted, 2);
    }

    #[test]
    fn parses_timestamp_variants() {
        assert!(parse_timestamp("2024-05-01T10:00:00Z").is_some());
        assert!(parse_timestamp("2024-05-01T10:00:00+02:00").is_some());
        assert!(parse_timestamp("2024-05-01T10:00:00.123456").is_some());
        assert!(parse_timestamp("2024-05-01 10:00:00").is_some());
        assert!(parse_timestamp("yesterday").is_none());
    }
}
