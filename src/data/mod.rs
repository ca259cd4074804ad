//! Health data models and processing.
//!
//! This module turns raw Health API responses into canonical, typed data and
//! derives the indicators the dashboard shows.
//!
//! ## Submodules
//!
//! - [`duration`]: Parsing and formatting of duration strings (e.g., "30s", "800ms")
//! - [`prediction`]: Canonical types ([`HealthPrediction`], [`VitalReading`], [`HealthSnapshot`])
//! - [`normalize`]: Folding the API's loose response layouts into canonical types
//! - [`score`]: Fallback score, status bands and trend classification
//! - [`vitals`]: Per-vital reference ranges and radar normalization
//! - [`history`]: Sparkline buffer and the past-average window
//! - [`timeline`]: The fixed past/now/predicted score grid
//! - [`demo`]: Placeholder data for when nothing live is available
//!
//! ## Data Flow
//!
//! ```text
//! serde_json::Value (raw response)
//!        │
//!        ▼
//! normalize_prediction() / normalize_history() / ...
//!        │
//!        ├──▶ HealthSnapshot (one per poll tick)
//!        │
//!        └──▶ ScoreHistory::record() (for sparklines)
//! ```

pub mod demo;
pub mod duration;
pub mod history;
pub mod normalize;
pub mod prediction;
pub mod score;
pub mod timeline;
pub mod vitals;

pub use demo::{demo_prediction, demo_snapshot};
pub use history::{past_average, ScoreHistory};
pub use normalize::{
    normalize_alerts, normalize_history, normalize_notifications, normalize_prediction,
    normalize_status, NormalizeError,
};
pub use prediction::{
    Alert, AlertSeverity, BloodPressure, HealthPrediction, HealthReading, HealthSnapshot,
    HistoryPoint, Notification, PatientStatus, VitalReading,
};
pub use score::{percent_change, vitals_score, ScoreBand, Trend};
pub use timeline::{build_timeline, PointKind, TimelinePoint};
pub use vitals::{radar_axes, RadarAxis, VitalKind, VitalStatus};
