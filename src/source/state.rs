//! Poller state and the origin tag carried with every displayed value.

use chrono::{DateTime, Utc};

use crate::api::ApiError;
use crate::data::{demo_snapshot, HealthSnapshot};

/// Where the data on screen came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataOrigin {
    /// The most recent fetch succeeded.
    Live,
    /// The most recent fetch failed; showing the last success.
    LastKnown,
    /// Nothing has ever succeeded; showing placeholder data.
    Demo,
}

impl DataOrigin {
    pub fn badge(&self) -> &'static str {
        match self {
            DataOrigin::Live => "LIVE",
            DataOrigin::LastKnown => "LAST KNOWN",
            DataOrigin::Demo => "DEMO",
        }
    }

    pub fn is_live(&self) -> bool {
        matches!(self, DataOrigin::Live)
    }
}

/// A snapshot ready to render, tagged with its origin.
#[derive(Debug, Clone, PartialEq)]
pub struct Shown {
    pub snapshot: HealthSnapshot,
    pub origin: DataOrigin,
}

/// State of one patient's poller, published after every change.
#[derive(Debug, Clone)]
pub struct PollerState {
    pub patient_id: String,
    /// Result of the most recently applied fetch; `None` before the first.
    pub outcome: Option<Result<HealthSnapshot, ApiError>>,
    /// Most recent successful snapshot.
    pub last_good: Option<HealthSnapshot>,
    /// A fetch is in flight.
    pub is_refreshing: bool,
    /// When the most recent result (success or failure) was applied.
    pub last_update: Option<DateTime<Utc>>,
    /// Message for the inline warning; set iff the last fetch failed.
    pub error: Option<String>,
    /// Sequence number of the most recently applied fetch.
    pub sequence: u64,
}

impl PollerState {
    pub fn new(patient_id: impl Into<String>) -> Self {
        Self {
            patient_id: patient_id.into(),
            outcome: None,
            last_good: None,
            is_refreshing: false,
            last_update: None,
            error: None,
            sequence: 0,
        }
    }

    /// Apply the result of fetch number `sequence` taken at `at`.
    ///
    /// Returns false, leaving the state untouched, when a result at least
    /// as new has already been applied.
    pub fn apply(
        &mut self,
        sequence: u64,
        result: Result<HealthSnapshot, ApiError>,
        at: DateTime<Utc>,
    ) -> bool {
        if sequence <= self.sequence {
            return false;
        }
        self.sequence = sequence;

        match &result {
            Ok(snapshot) => {
                self.last_good = Some(snapshot.clone());
                self.error = None;
            }
            Err(e) => self.error = Some(e.to_string()),
        }
        self.outcome = Some(result);
        self.last_update = Some(at);
        true
    }

    pub fn origin(&self) -> DataOrigin {
        match (&self.outcome, &self.last_good) {
            (Some(Ok(_)), _) => DataOrigin::Live,
            (_, Some(_)) => DataOrigin::LastKnown,
            (_, None) => DataOrigin::Demo,
        }
    }

    /// The data to render. Never empty: falls back to the last success,
    /// then to placeholder data.
    pub fn shown(&self) -> Shown {
        let origin = self.origin();
        let snapshot = match origin {
            DataOrigin::Live | DataOrigin::LastKnown => self.last_good.clone(),
            DataOrigin::Demo => None,
        }
        .unwrap_or_else(|| {
            demo_snapshot(&self.patient_id, self.last_update.unwrap_or_else(Utc::now))
        });
        Shown { snapshot, origin }
    }
}

/// Issues monotonically increasing fetch numbers.
#[derive(Debug, Default)]
pub struct SequenceGuard {
    issued: u64,
}

impl SequenceGuard {
    pub fn issue(&mut self) -> u64 {
        self.issued += 1;
        self.issued
    }

    pub fn last_issued(&self) -> u64 {
        self.issued
    }
}
