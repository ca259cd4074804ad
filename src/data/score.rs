//! Client-side fallback scoring, status bands and trend classification.
//!
//! Used only when the backend omits a score or status. This is a display
//! heuristic, not a clinical model.

use super::prediction::VitalReading;

/// Heart rate assumed when a reading has none.
pub const DEFAULT_HEART_RATE: f64 = 75.0;
/// SpO2 assumed when a reading has none.
pub const DEFAULT_SPO2: f64 = 95.0;
/// Temperature assumed when a reading has none.
pub const DEFAULT_TEMPERATURE: f64 = 37.0;

/// Derive a `[0, 100]` score from vitals.
///
/// `round((hr_score + spo2 + temp_score) / 3)` where
/// `hr_score = max(0, 100 - |75 - hr| * 2)` and
/// `temp_score = max(0, 100 - |37 - temp| * 20)`.
pub fn vitals_score(vitals: &VitalReading) -> f64 {
    let hr = vitals.heart_rate.unwrap_or(DEFAULT_HEART_RATE);
    let spo2 = vitals.spo2.unwrap_or(DEFAULT_SPO2);
    let temp = vitals.temperature.unwrap_or(DEFAULT_TEMPERATURE);

    let hr_score = (100.0 - (75.0 - hr).abs() * 2.0).max(0.0);
    let temp_score = (100.0 - (37.0 - temp).abs() * 20.0).max(0.0);

    ((hr_score + spo2 + temp_score) / 3.0).round().clamp(0.0, 100.0)
}

/// Score band shown next to every gauge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ScoreBand {
    Critical,
    Fair,
    Good,
    Excellent,
}

impl ScoreBand {
    pub fn classify(score: f64) -> Self {
        if score >= 80.0 {
            ScoreBand::Excellent
        } else if score >= 60.0 {
            ScoreBand::Good
        } else if score >= 40.0 {
            ScoreBand::Fair
        } else {
            ScoreBand::Critical
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ScoreBand::Excellent => "Excellent",
            ScoreBand::Good => "Good",
            ScoreBand::Fair => "Fair",
            ScoreBand::Critical => "Critical",
        }
    }

    /// Score range covered by the band, for the legend.
    pub fn range_label(&self) -> &'static str {
        match self {
            ScoreBand::Excellent => "80-100",
            ScoreBand::Good => "60-79",
            ScoreBand::Fair => "40-59",
            ScoreBand::Critical => "<40",
        }
    }
}

/// Direction of `predicted - current`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    RapidlyImproving,
    Improving,
    Stable,
    Declining,
    RapidlyDeclining,
}

impl Trend {
    pub fn classify(change: f64) -> Self {
        if change > 5.0 {
            Trend::RapidlyImproving
        } else if change > 0.0 {
            Trend::Improving
        } else if change < -5.0 {
            Trend::RapidlyDeclining
        } else if change < 0.0 {
            Trend::Declining
        } else {
            Trend::Stable
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Trend::RapidlyImproving => "Rapidly Improving",
            Trend::Improving => "Improving",
            Trend::Stable => "Stable",
            Trend::Declining => "Declining",
            Trend::RapidlyDeclining => "Rapidly Declining",
        }
    }

    pub fn arrow(&self) -> &'static str {
        match self {
            Trend::RapidlyImproving => "⇈",
            Trend::Improving => "↑",
            Trend::Stable => "→",
            Trend::Declining => "↓",
            Trend::RapidlyDeclining => "⇊",
        }
    }
}

/// Percentage change from `from` to `to`; `None` when `from` is zero.
pub fn percent_change(from: f64, to: f64) -> Option<f64> {
    if from == 0.0 {
        None
    } else {
        Some((to - from) / from * 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vitals(hr: f64, spo2: f64, temp: f64) -> VitalReading {
        VitalReading {
            heart_rate: Some(hr),
            spo2: Some(spo2),
            temperature: Some(temp),
            ..Default::default()
        }
    }

    #[test]
    fn ideal_vitals_score_98() {
        assert_eq!(vitals_score(&vitals(75.0, 95.0, 37.0)), 98.0);
    }

    #[test]
    fn distressed_vitals_score_below_60() {
        let score = vitals_score(&vitals(140.0, 85.0, 39.0));
        assert_eq!(score, 48.0);
        assert!(score < 60.0);
    }

    #[test]
    fn missing_vitals_use_defaults() {
        assert_eq!(vitals_score(&VitalReading::default()), 98.0);
        let only_hr = VitalReading {
            heart_rate: Some(95.0),
            ..Default::default()
        };
        // hr_score = 60, spo2 = 95, temp = 100
        assert_eq!(vitals_score(&only_hr), 85.0);
    }

    #[test]
    fn band_boundaries() {
        assert_eq!(ScoreBand::classify(80.0), ScoreBand::Excellent);
        assert_eq!(ScoreBand::classify(79.0), ScoreBand::Good);
        assert_eq!(ScoreBand::classify(60.0), ScoreBand::Good);
        assert_eq!(ScoreBand::classify(59.0), ScoreBand::Fair);
        assert_eq!(ScoreBand::classify(40.0), ScoreBand::Fair);
        assert_eq!(ScoreBand::classify(39.0), ScoreBand::Critical);
    }

    #[test]
    fn trend_boundaries() {
        assert_eq!(Trend::classify(6.0), Trend::RapidlyImproving);
        assert_eq!(Trend::classify(5.0), Trend::Improving);
        assert_eq!(Trend::classify(0.5), Trend::Improving);
        assert_eq!(Trend::classify(0.0), Trend::Stable);
        assert_eq!(Trend::classify(-0.5), Trend::Declining);
        assert_eq!(Trend::classify(-5.0), Trend::Declining);
        assert_eq!(Trend::classify(-5.5), Trend::RapidlyDeclining);
    }

    #[test]
    fn percent_change_guards_zero() {
        assert_eq!(percent_change(0.0, 50.0), None);
        assert_eq!(percent_change(50.0, 75.0), Some(50.0));
    }
}
