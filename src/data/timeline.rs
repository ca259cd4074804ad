//! Score timeline: a fixed grid of past points, now, and the prediction.

use chrono::{DateTime, Duration, Utc};

use super::history::point_score;
use super::prediction::{HealthPrediction, HistoryPoint};

/// Number of past points on the timeline.
pub const TIMELINE_POINTS: usize = 12;
/// Spacing between past points, in minutes.
pub const TIMELINE_SPACING_MINUTES: i64 = 10;
/// How far a history point may sit from a grid slot and still fill it.
pub const TIMELINE_TOLERANCE_MINUTES: i64 = 15;
/// How far ahead the predicted point is plotted.
pub const PREDICTION_HORIZON_MINUTES: i64 = 30;
/// Score used when there is no history at all.
pub const ESTIMATED_SCORE: f64 = 75.0;

/// Where a timeline value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointKind {
    /// A real history point near the slot.
    Historical,
    /// No history near the slot; mean of history or the fixed estimate.
    Estimated,
    Current,
    Predicted,
}

impl PointKind {
    pub fn label(&self) -> &'static str {
        match self {
            PointKind::Historical => "Historical",
            PointKind::Estimated => "Estimated",
            PointKind::Current => "Now",
            PointKind::Predicted => "Predicted",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimelinePoint {
    pub at: DateTime<Utc>,
    /// Minutes relative to `now`; negative in the past.
    pub offset_minutes: i64,
    pub score: f64,
    pub kind: PointKind,
}

impl TimelinePoint {
    /// Axis label such as "-40m", "NOW" or "+30m".
    pub fn label(&self) -> String {
        match self.offset_minutes {
            0 => "NOW".to_string(),
            m if m > 0 => format!("+{}m", m),
            m => format!("{}m", m),
        }
    }
}

/// Build the timeline ending at `now`.
///
/// `history` is in any order. `prediction` is `None` when nothing is known,
/// in which case now and the predicted point both use the estimate.
pub fn build_timeline(
    history: &[HistoryPoint],
    prediction: Option<&HealthPrediction>,
    now: DateTime<Utc>,
) -> Vec<TimelinePoint> {
    let tolerance = Duration::minutes(TIMELINE_TOLERANCE_MINUTES);
    let fallback = mean_score(history).unwrap_or(ESTIMATED_SCORE);

    let mut points = Vec::with_capacity(TIMELINE_POINTS + 2);

    for slot in (1..=TIMELINE_POINTS as i64).rev() {
        let offset = -slot * TIMELINE_SPACING_MINUTES;
        let at = now + Duration::minutes(offset);

        let closest = history
            .iter()
            .map(|p| ((p.timestamp - at).num_seconds().abs(), p))
            .filter(|(dist, _)| *dist <= tolerance.num_seconds())
            .min_by_key(|(dist, _)| *dist);

        let (score, kind) = match closest {
            Some((_, p)) => (point_score(p), PointKind::Historical),
            None => (fallback, PointKind::Estimated),
        };

        points.push(TimelinePoint {
            at,
            offset_minutes: offset,
            score,
            kind,
        });
    }

    let current = prediction.map_or(ESTIMATED_SCORE, |p| p.current_health.score);
    let predicted = prediction.map_or(current, |p| p.predicted_score());

    points.push(TimelinePoint {
        at: now,
        offset_minutes: 0,
        score: current,
        kind: PointKind::Current,
    });
    points.push(TimelinePoint {
        at: now + Duration::minutes(PREDICTION_HORIZON_MINUTES),
        offset_minutes: PREDICTION_HORIZON_MINUTES,
        score: predicted,
        kind: PointKind::Predicted,
    });

    points
}

fn mean_score(history: &[HistoryPoint]) -> Option<f64> {
    if history.is_empty() {
        return None;
    }
    let total: f64 = history.iter().map(point_score).sum();
    Some((total / history.len() as f64).round())
}
