//! Fixed placeholder data shown when nothing live has ever arrived.

use chrono::{DateTime, Utc};

use super::prediction::{
    BloodPressure, HealthPrediction, HealthReading, HealthSnapshot, VitalReading,
};

/// The placeholder prediction: score 78, stable, ordinary vitals.
pub fn demo_prediction() -> HealthPrediction {
    HealthPrediction {
        current_health: HealthReading {
            score: 78.0,
            status: "Stable".to_string(),
            vitals: Some(VitalReading {
                heart_rate: Some(82.0),
                spo2: Some(96.0),
                temperature: Some(36.8),
                blood_pressure: Some(BloodPressure {
                    systolic: 118.0,
                    diastolic: 76.0,
                }),
                respiratory_rate: Some(16.0),
                timestamp: None,
            }),
        },
        predicted_health: Some(HealthReading {
            score: 75.0,
            status: "Stable".to_string(),
            vitals: None,
        }),
    }
}

pub fn demo_snapshot(patient_id: &str, at: DateTime<Utc>) -> HealthSnapshot {
    HealthSnapshot::from_prediction(patient_id, demo_prediction(), at)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::normalize::normalize_prediction;

    #[test]
    fn demo_is_already_canonical() {
        let demo = demo_prediction();
        let value = serde_json::to_value(&demo).unwrap();
        assert_eq!(normalize_prediction(&value).unwrap(), demo);
        assert_eq!(demo.change(), -3.0);
    }
}
