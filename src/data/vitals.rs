//! Per-vital status ranges and radar normalization.

use super::prediction::VitalReading;
use super::score::vitals_score;

/// Status of a single vital against its reference ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum VitalStatus {
    Normal,
    Warning,
    Critical,
}

impl VitalStatus {
    pub fn symbol(&self) -> &'static str {
        match self {
            VitalStatus::Normal => "OK",
            VitalStatus::Warning => "WARN",
            VitalStatus::Critical => "CRIT",
        }
    }
}

/// The vitals shown in the Vitals view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VitalKind {
    HeartRate,
    Spo2,
    Temperature,
    Systolic,
    Diastolic,
    RespiratoryRate,
}

/// Normal band and the wider warning band; outside the warning band is critical.
#[derive(Debug, Clone, Copy)]
struct Ranges {
    normal: (f64, f64),
    warning: (f64, f64),
}

impl VitalKind {
    pub const ALL: [VitalKind; 6] = [
        VitalKind::HeartRate,
        VitalKind::Spo2,
        VitalKind::Temperature,
        VitalKind::Systolic,
        VitalKind::Diastolic,
        VitalKind::RespiratoryRate,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            VitalKind::HeartRate => "Heart Rate",
            VitalKind::Spo2 => "SpO2",
            VitalKind::Temperature => "Temperature",
            VitalKind::Systolic => "BP Systolic",
            VitalKind::Diastolic => "BP Diastolic",
            VitalKind::RespiratoryRate => "Respiratory Rate",
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            VitalKind::HeartRate => "BPM",
            VitalKind::Spo2 => "%",
            VitalKind::Temperature => "°C",
            VitalKind::Systolic | VitalKind::Diastolic => "mmHg",
            VitalKind::RespiratoryRate => "br/min",
        }
    }

    fn ranges(&self) -> Ranges {
        let (normal, warning) = match self {
            VitalKind::HeartRate => ((60.0, 100.0), (50.0, 120.0)),
            VitalKind::Spo2 => ((95.0, 100.0), (90.0, 100.0)),
            VitalKind::Temperature => ((36.1, 37.2), (35.5, 38.5)),
            VitalKind::Systolic => ((90.0, 120.0), (85.0, 140.0)),
            VitalKind::Diastolic => ((60.0, 80.0), (55.0, 90.0)),
            VitalKind::RespiratoryRate => ((12.0, 20.0), (10.0, 25.0)),
        };
        Ranges { normal, warning }
    }

    /// Human-readable normal range, e.g. "60-100 BPM".
    pub fn normal_range(&self) -> String {
        let (lo, hi) = self.ranges().normal;
        format!("{}-{} {}", lo, hi, self.unit())
    }

    pub fn classify(&self, value: f64) -> VitalStatus {
        let r = self.ranges();
        if value >= r.normal.0 && value <= r.normal.1 {
            VitalStatus::Normal
        } else if value >= r.warning.0 && value <= r.warning.1 {
            VitalStatus::Warning
        } else {
            VitalStatus::Critical
        }
    }

    /// Read this vital out of a reading.
    pub fn value(&self, vitals: &VitalReading) -> Option<f64> {
        match self {
            VitalKind::HeartRate => vitals.heart_rate,
            VitalKind::Spo2 => vitals.spo2,
            VitalKind::Temperature => vitals.temperature,
            VitalKind::Systolic => vitals.blood_pressure.map(|bp| bp.systolic),
            VitalKind::Diastolic => vitals.blood_pressure.map(|bp| bp.diastolic),
            VitalKind::RespiratoryRate => vitals.respiratory_rate,
        }
    }
}

/// Scale `value` from `[min, max]` onto `[0, 100]`, clamped.
pub fn normalize_to_percent(value: f64, min: f64, max: f64) -> f64 {
    if max <= min {
        return 0.0;
    }
    ((value - min) / (max - min) * 100.0).clamp(0.0, 100.0)
}

/// One axis of the radar panel.
#[derive(Debug, Clone, PartialEq)]
pub struct RadarAxis {
    pub label: &'static str,
    /// Normalized to `[0, 100]`.
    pub normalized: f64,
    pub actual: f64,
    pub unit: &'static str,
}

/// Build the radar axes for a reading. Missing vitals use the same
/// defaults as the fallback score.
pub fn radar_axes(vitals: &VitalReading) -> Vec<RadarAxis> {
    let hr = vitals.heart_rate.unwrap_or(75.0);
    let spo2 = vitals.spo2.unwrap_or(95.0);
    let temp = vitals.temperature.unwrap_or(37.0);
    let systolic = vitals.blood_pressure.map_or(120.0, |bp| bp.systolic);
    let resp = vitals.respiratory_rate.unwrap_or(16.0);
    let score = vitals_score(vitals);

    vec![
        RadarAxis {
            label: "Heart Rate",
            normalized: normalize_to_percent(hr, 40.0, 180.0),
            actual: hr,
            unit: "BPM",
        },
        RadarAxis {
            label: "SpO2",
            normalized: normalize_to_percent(spo2, 70.0, 100.0),
            actual: spo2,
            unit: "%",
        },
        RadarAxis {
            label: "Temp",
            normalized: normalize_to_percent(temp, 35.0, 40.0),
            actual: temp,
            unit: "°C",
        },
        RadarAxis {
            label: "BP",
            normalized: normalize_to_percent(systolic, 80.0, 180.0),
            actual: systolic,
            unit: "mmHg",
        },
        RadarAxis {
            label: "Resp",
            normalized: normalize_to_percent(resp, 8.0, 30.0),
            actual: resp,
            unit: "br/min",
        },
        RadarAxis {
            label: "Score",
            normalized: normalize_to_percent(score, 0.0, 100.0),
            actual: score,
            unit: "/100",
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::prediction::BloodPressure;

    #[test]
    fn heart_rate_bands() {
        assert_eq!(VitalKind::HeartRate.classify(72.0), VitalStatus::Normal);
        assert_eq!(VitalKind::HeartRate.classify(110.0), VitalStatus::Warning);
        assert_eq!(VitalKind::HeartRate.classify(45.0), VitalStatus::Critical);
        assert_eq!(VitalKind::HeartRate.classify(121.0), VitalStatus::Critical);
    }

    #[test]
    fn spo2_bands() {
        assert_eq!(VitalKind::Spo2.classify(97.0), VitalStatus::Normal);
        assert_eq!(VitalKind::Spo2.classify(92.0), VitalStatus::Warning);
        assert_eq!(VitalKind::Spo2.classify(88.0), VitalStatus::Critical);
    }

    #[test]
    fn temperature_bands() {
        assert_eq!(VitalKind::Temperature.classify(36.8), VitalStatus::Normal);
        assert_eq!(VitalKind::Temperature.classify(38.0), VitalStatus::Warning);
        assert_eq!(VitalKind::Temperature.classify(39.0), VitalStatus::Critical);
    }

    #[test]
    fn blood_pressure_is_read_from_pair() {
        let v = VitalReading {
            blood_pressure: Some(BloodPressure {
                systolic: 130.0,
                diastolic: 85.0,
            }),
            ..Default::default()
        };
        assert_eq!(VitalKind::Systolic.value(&v), Some(130.0));
        assert_eq!(VitalKind::Systolic.classify(130.0), VitalStatus::Warning);
        assert_eq!(VitalKind::Diastolic.value(&v), Some(85.0));
        assert_eq!(VitalKind::HeartRate.value(&v), None);
    }

    #[test]
    fn normalize_clamps() {
        assert_eq!(normalize_to_percent(110.0, 40.0, 180.0), 50.0);
        assert_eq!(normalize_to_percent(10.0, 40.0, 180.0), 0.0);
        assert_eq!(normalize_to_percent(500.0, 40.0, 180.0), 100.0);
        assert_eq!(normalize_to_percent(5.0, 10.0, 10.0), 0.0);
    }

    #[test]
    fn radar_has_six_axes_within_bounds() {
        let axes = radar_axes(&VitalReading::default());
        assert_eq!(axes.len(), 6);
        assert!(axes.iter().all(|a| (0.0..=100.0).contains(&a.normalized)));
        assert_eq!(axes[5].actual, 98.0);
    }

    #[test]
    fn normal_range_label() {
        assert_eq!(VitalKind::HeartRate.normal_range(), "60-100 BPM");
    }
}
