//! Score history: the polled sparkline buffer and the backend history window.

use std::collections::VecDeque;

use chrono::{DateTime, Duration, Utc};

use super::prediction::{HealthSnapshot, HistoryPoint};
use super::score::vitals_score;

/// Maximum number of polled scores to keep.
const MAX_HISTORY_SIZE: usize = 60;

/// Scores observed across poll ticks, for the sparkline.
///
/// Only live ticks are recorded; fallback data would draw a flat line of
/// made-up values.
#[derive(Debug, Clone, Default)]
pub struct ScoreHistory {
    /// Current score per recorded tick, oldest first.
    pub current: VecDeque<f64>,
    /// Predicted score per recorded tick, oldest first.
    pub predicted: VecDeque<f64>,
    /// Fetch time of each recorded tick.
    pub timestamps: VecDeque<DateTime<Utc>>,
}

impl ScoreHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a snapshot. A snapshot already recorded (same fetch time) is
    /// ignored so redraws without a new tick don't duplicate entries.
    pub fn record(&mut self, snapshot: &HealthSnapshot) {
        if self.timestamps.back() == Some(&snapshot.fetched_at) {
            return;
        }

        push_capped(&mut self.current, snapshot.prediction.current_health.score);
        push_capped(&mut self.predicted, snapshot.prediction.predicted_score());
        push_capped(&mut self.timestamps, snapshot.fetched_at);
    }

    pub fn len(&self) -> usize {
        self.current.len()
    }

    pub fn is_empty(&self) -> bool {
        self.current.is_empty()
    }

    /// Current scores bucketed to 0-7 for the 8 sparkline glyphs.
    ///
    /// Returns an empty Vec until two ticks have been seen.
    pub fn sparkline(&self) -> Vec<u8> {
        if self.current.len() < 2 {
            return Vec::new();
        }

        let max = self.current.iter().copied().fold(f64::MIN, f64::max);
        let min = self.current.iter().copied().fold(f64::MAX, f64::min);
        let range = (max - min).max(1.0);

        self.current
            .iter()
            .map(|&v| (((v - min) / range) * 7.0).round().clamp(0.0, 7.0) as u8)
            .collect()
    }

    /// Change between the last two recorded current scores.
    pub fn last_change(&self) -> Option<f64> {
        let n = self.current.len();
        if n < 2 {
            return None;
        }
        Some(self.current[n - 1] - self.current[n - 2])
    }
}

fn push_capped<T>(buf: &mut VecDeque<T>, value: T) {
    buf.push_back(value);
    if buf.len() > MAX_HISTORY_SIZE {
        buf.pop_front();
    }
}

/// Score of a history point: the backend's, or derived from its vitals.
pub fn point_score(point: &HistoryPoint) -> f64 {
    point
        .score
        .map(|s| s.clamp(0.0, 100.0).round())
        .unwrap_or_else(|| vitals_score(&point.vitals))
}

/// Rounded mean score of points inside `[now - window, now]`.
pub fn past_average(points: &[HistoryPoint], now: DateTime<Utc>, window: Duration) -> Option<f64> {
    let since = now - window;
    let scores: Vec<f64> = points
        .iter()
        .filter(|p| p.timestamp >= since && p.timestamp <= now)
        .map(point_score)
        .collect();

    if scores.is_empty() {
        return None;
    }
    Some((scores.iter().sum::<f64>() / scores.len() as f64).round())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::prediction::{HealthPrediction, HealthReading, VitalReading};
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    fn snapshot(score: f64, minute: u32) -> HealthSnapshot {
        let prediction = HealthPrediction {
            current_health: HealthReading {
                score,
                status: "Good".to_string(),
                vitals: None,
            },
            predicted_health: None,
        };
        HealthSnapshot::from_prediction(
            "P001",
            prediction,
            Utc.with_ymd_and_hms(2024, 5, 1, 12, minute, 0).unwrap(),
        )
    }

    fn point(hours_ago: i64, score: Option<f64>) -> HistoryPoint {
        HistoryPoint {
            timestamp: now() - Duration::hours(hours_ago),
            score,
            vitals: VitalReading::default(),
        }
    }

    #[test]
    fn new_history_is_empty() {
        let h = ScoreHistory::new();
        assert!(h.is_empty());
        assert!(h.sparkline().is_empty());
        assert!(h.last_change().is_none());
    }

    #[test]
    fn record_skips_duplicate_ticks() {
        let mut h = ScoreHistory::new();
        let s = snapshot(70.0, 0);
        h.record(&s);
        h.record(&s);
        assert_eq!(h.len(), 1);
    }

    #[test]
    fn history_caps_at_max_size() {
        let mut h = ScoreHistory::new();
        for i in 0..70u32 {
            let mut s = snapshot(50.0, 0);
            s.fetched_at = s.fetched_at + Duration::seconds(i as i64);
            h.record(&s);
        }
        assert_eq!(h.len(), 60);
        assert_eq!(h.timestamps.len(), 60);
    }

    #[test]
    fn sparkline_spans_full_range() {
        let mut h = ScoreHistory::new();
        for (i, score) in [40.0, 60.0, 80.0].into_iter().enumerate() {
            h.record(&snapshot(score, i as u32));
        }
        assert_eq!(h.sparkline(), vec![0, 4, 7]);
        assert_eq!(h.last_change(), Some(20.0));
    }

    #[test]
    fn flat_sparkline_is_zero() {
        let mut h = ScoreHistory::new();
        h.record(&snapshot(70.0, 0));
        h.record(&snapshot(70.0, 1));
        assert_eq!(h.sparkline(), vec![0, 0]);
    }

    #[test]
    fn past_average_uses_window_only() {
        let points = vec![point(1, Some(80.0)), point(5, Some(60.0)), point(8, Some(10.0))];
        assert_eq!(past_average(&points, now(), Duration::hours(6)), Some(70.0));
    }

    #[test]
    fn past_average_derives_missing_scores() {
        let points = vec![point(1, None)];
        assert_eq!(past_average(&points, now(), Duration::hours(6)), Some(98.0));
    }

    #[test]
    fn past_average_clamps_backend_scores() {
        let points = vec![point(1, Some(140.0)), point(2, Some(100.0))];
        assert_eq!(past_average(&points, now(), Duration::hours(6)), Some(100.0));
        assert_eq!(point_score(&point(1, Some(-20.0))), 0.0);
    }

    #[test]
    fn past_average_follows_window_length() {
        let points = vec![point(1, Some(80.0)), point(5, Some(60.0))];
        assert_eq!(past_average(&points, now(), Duration::hours(2)), Some(80.0));
    }

    #[test]
    fn past_average_empty_window() {
        assert_eq!(past_average(&[], now(), Duration::hours(6)), None);
        let stale = vec![point(12, Some(50.0))];
        assert_eq!(past_average(&stale, now(), Duration::hours(6)), None);
    }
}
