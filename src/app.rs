//! Application state and navigation logic.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use chrono::Utc;
use serde_json::{json, Map, Value};
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::animate::{AnimatedValue, GAUGE_ANIMATION, NUMBER_ANIMATION};
use crate::api::HealthApi;
use crate::config::DEFAULT_HISTORY_HOURS;
use crate::data::{
    build_timeline, past_average, percent_change, ScoreBand, ScoreHistory, Trend, VitalKind,
};
use crate::source::{DataSource, PollerState, Shown};
use crate::ui::Theme;

/// How long a status message stays visible.
const STATUS_MESSAGE_TTL: Duration = Duration::from_secs(3);

/// The current view/tab in the TUI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Past average, current and predicted gauges with trend.
    Scores,
    /// Score over the last two hours plus the prediction.
    Timeline,
    /// Per-vital status and the radar panel.
    Vitals,
    /// Active alerts, model status and emergency history.
    Alerts,
}

impl View {
    pub const ALL: [View; 4] = [View::Scores, View::Timeline, View::Vitals, View::Alerts];

    /// Cycle to the next view.
    pub fn next(self) -> Self {
        match self {
            View::Scores => View::Timeline,
            View::Timeline => View::Vitals,
            View::Vitals => View::Alerts,
            View::Alerts => View::Scores,
        }
    }

    /// Cycle to the previous view.
    pub fn prev(self) -> Self {
        match self {
            View::Scores => View::Alerts,
            View::Timeline => View::Scores,
            View::Vitals => View::Timeline,
            View::Alerts => View::Vitals,
        }
    }

    /// Returns the display label for this view.
    pub fn label(&self) -> &'static str {
        match self {
            View::Scores => "Scores",
            View::Timeline => "Timeline",
            View::Vitals => "Vitals",
            View::Alerts => "Alerts",
        }
    }

    pub fn index(&self) -> usize {
        match self {
            View::Scores => 0,
            View::Timeline => 1,
            View::Vitals => 2,
            View::Alerts => 3,
        }
    }
}

/// Animated values behind the three circular gauges and the big number.
#[derive(Debug, Clone)]
pub struct Gauges {
    pub past_average: AnimatedValue,
    pub current: AnimatedValue,
    pub predicted: AnimatedValue,
    /// The headline score number.
    pub score_number: AnimatedValue,
}

impl Gauges {
    fn new(now: Instant) -> Self {
        Self {
            past_average: AnimatedValue::new(0.0, 100.0, GAUGE_ANIMATION, now),
            current: AnimatedValue::new(0.0, 100.0, GAUGE_ANIMATION, now),
            predicted: AnimatedValue::new(0.0, 100.0, GAUGE_ANIMATION, now),
            score_number: AnimatedValue::new(0.0, 100.0, NUMBER_ANIMATION, now),
        }
    }

    fn retarget(&mut self, past: f64, current: f64, predicted: f64, now: Instant) {
        self.past_average.retarget(past, now);
        self.current.retarget(current, now);
        self.predicted.retarget(predicted, now);
        self.score_number.retarget(current, now);
    }

    /// Advance every gauge one frame. Returns true while any is moving.
    pub fn tick(&mut self, now: Instant) -> bool {
        let a = self.past_average.tick(now);
        let b = self.current.tick(now);
        let c = self.predicted.tick(now);
        let d = self.score_number.tick(now);
        a || b || c || d
    }
}

/// Runs API calls triggered from the keyboard on the runtime and reports
/// back through the status message.
#[derive(Debug)]
pub struct ActionRunner {
    runtime: Handle,
    api: Arc<dyn HealthApi>,
    patient_id: String,
    results_tx: mpsc::UnboundedSender<String>,
    results_rx: mpsc::UnboundedReceiver<String>,
}

impl ActionRunner {
    pub fn new(runtime: Handle, api: Arc<dyn HealthApi>, patient_id: &str) -> Self {
        let (results_tx, results_rx) = mpsc::unbounded_channel();
        Self {
            runtime,
            api,
            patient_id: patient_id.to_string(),
            results_tx,
            results_rx,
        }
    }

    fn trigger_emergency(&self) {
        let api = Arc::clone(&self.api);
        let patient_id = self.patient_id.clone();
        let tx = self.results_tx.clone();

        info!(patient = %patient_id, "emergency trigger requested");
        self.runtime.spawn(async move {
            let message = match api.trigger_emergency(&patient_id).await {
                Ok(()) => {
                    info!(patient = %patient_id, "emergency workflow started");
                    "Emergency triggered: notifying guardians and hospitals".to_string()
                }
                Err(e) => {
                    warn!(patient = %patient_id, error = %e, "emergency trigger failed");
                    format!("Emergency trigger failed: {}", e)
                }
            };
            let _ = tx.send(message);
        });
    }

    fn drain(&mut self) -> Option<String> {
        let mut last = None;
        while let Ok(message) = self.results_rx.try_recv() {
            last = Some(message);
        }
        last
    }
}

/// Main application state.
pub struct App {
    pub running: bool,
    pub current_view: View,
    pub show_help: bool,
    /// The emergency y/n confirmation is open.
    pub confirm_emergency: bool,

    // Data source
    source: Box<dyn DataSource>,
    pub state: Option<PollerState>,
    /// What is on screen. Never empty; starts as placeholder data.
    pub shown: Shown,
    pub past_average: Option<f64>,
    /// Window of the past-average gauge; matches the history fetched.
    pub history_hours: u32,
    pub history: ScoreHistory,
    pub gauges: Gauges,

    actions: Option<ActionRunner>,

    // UI
    pub theme: Theme,

    // Status message (temporary feedback)
    pub status_message: Option<(String, Instant)>,
}

impl App {
    /// Create a new App reading from the given data source.
    pub fn new(source: Box<dyn DataSource>) -> Self {
        let now = Instant::now();
        let shown = PollerState::new("").shown();
        Self {
            running: true,
            current_view: View::Scores,
            show_help: false,
            confirm_emergency: false,
            source,
            state: None,
            shown,
            past_average: None,
            history_hours: DEFAULT_HISTORY_HOURS,
            history: ScoreHistory::new(),
            gauges: Gauges::new(now),
            actions: None,
            theme: Theme::auto_detect(),
            status_message: None,
        }
    }

    /// Enable keyboard-triggered API actions (the emergency trigger).
    pub fn with_actions(mut self, actions: ActionRunner) -> Self {
        self.actions = Some(actions);
        self
    }

    /// Average the past-average gauge over `hours` of history.
    pub fn with_history_hours(mut self, hours: u32) -> Self {
        self.history_hours = hours;
        self
    }

    /// Returns a description of the current data source.
    pub fn source_description(&self) -> &str {
        self.source.description()
    }

    /// Error from the most recent fetch, for the inline warning.
    pub fn error(&self) -> Option<&str> {
        self.source.error()
    }

    pub fn is_refreshing(&self) -> bool {
        self.state.as_ref().is_some_and(|s| s.is_refreshing)
    }

    /// Set a temporary status message that will be shown for a few seconds.
    pub fn set_status_message(&mut self, message: String) {
        self.status_message = Some((message, Instant::now()));
    }

    /// Get the current status message if it hasn't expired.
    pub fn get_status_message(&self) -> Option<&str> {
        if let Some((msg, time)) = &self.status_message {
            if time.elapsed() < STATUS_MESSAGE_TTL {
                return Some(msg);
            }
        }
        None
    }

    /// Poll the data source and collect finished background actions.
    ///
    /// Returns true if new state was received.
    pub fn reload_data(&mut self, now: Instant) -> bool {
        if let Some(message) = self.actions.as_mut().and_then(ActionRunner::drain) {
            self.set_status_message(message);
        }

        let Some(state) = self.source.poll() else {
            return false;
        };
        self.apply_state(state, now);
        true
    }

    fn apply_state(&mut self, state: PollerState, now: Instant) {
        let shown = state.shown();
        let snapshot = &shown.snapshot;

        if shown.origin.is_live() {
            self.history.record(snapshot);
        }

        let current = snapshot.prediction.current_health.score;
        let predicted = snapshot.prediction.predicted_score();
        self.past_average = past_average(
            &snapshot.history,
            Utc::now(),
            chrono::Duration::hours(i64::from(self.history_hours)),
        );
        self.gauges.retarget(
            self.past_average.unwrap_or(current),
            current,
            predicted,
            now,
        );

        self.shown = shown;
        self.state = Some(state);
    }

    /// Advance animations one frame.
    pub fn animate(&mut self, now: Instant) -> bool {
        self.gauges.tick(now)
    }

    /// Ask the source for a fetch now.
    pub fn refresh(&mut self) {
        self.source.request_refresh();
        self.set_status_message("Refreshing...".to_string());
    }

    /// Switch to the next view.
    pub fn next_view(&mut self) {
        self.current_view = self.current_view.next();
    }

    /// Switch to the previous view.
    pub fn prev_view(&mut self) {
        self.current_view = self.current_view.prev();
    }

    /// Switch to a specific view.
    pub fn set_view(&mut self, view: View) {
        self.current_view = view;
    }

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    /// Open the emergency confirmation, if actions are available.
    pub fn request_emergency(&mut self) {
        if self.actions.is_none() {
            self.set_status_message("Emergency trigger unavailable in offline mode".to_string());
            return;
        }
        self.confirm_emergency = true;
    }

    /// Answer the emergency confirmation.
    pub fn confirm_emergency(&mut self, confirmed: bool) {
        self.confirm_emergency = false;
        if !confirmed {
            self.set_status_message("Emergency trigger cancelled".to_string());
            return;
        }
        if let Some(actions) = &self.actions {
            actions.trigger_emergency();
            self.set_status_message("Triggering emergency...".to_string());
        }
    }

    /// Signal the application to quit.
    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Export current state to a file.
    pub fn export_state(&self, path: &std::path::Path) -> Result<()> {
        let Some(ref state) = self.state else {
            anyhow::bail!("No data to export");
        };
        write_export(
            path,
            &export_value(state, &self.history, self.history_hours),
        )
    }
}

/// Build the JSON summary of a poller state. The past average covers the
/// last `history_hours`.
pub fn export_value(state: &PollerState, history: &ScoreHistory, history_hours: u32) -> Value {
    let shown = state.shown();
    let snapshot = &shown.snapshot;
    let prediction = &snapshot.prediction;
    let current = prediction.current_health.score;
    let predicted = prediction.predicted_score();
    let change = prediction.change();
    let now = Utc::now();

    let mut export = Map::new();

    export.insert("patient_id".to_string(), json!(snapshot.patient_id));
    export.insert("origin".to_string(), json!(shown.origin.badge()));
    export.insert("error".to_string(), json!(state.error));
    export.insert(
        "last_update".to_string(),
        json!(state.last_update.map(|t| t.to_rfc3339())),
    );

    // Scores
    let average = past_average(
        &snapshot.history,
        now,
        chrono::Duration::hours(i64::from(history_hours)),
    );
    export.insert(
        "scores".to_string(),
        json!({
            "past_average": average,
            "current": current,
            "current_status": prediction.current_health.status,
            "current_band": ScoreBand::classify(current).label(),
            "predicted": predicted,
            "predicted_status": prediction.predicted_status(),
            "change": change,
            "change_percent": percent_change(current, predicted),
            "trend": Trend::classify(change).label(),
        }),
    );

    // Vitals
    if let Some(vitals) = snapshot.vitals() {
        let rows: Vec<Value> = VitalKind::ALL
            .iter()
            .filter_map(|kind| {
                kind.value(vitals).map(|v| {
                    json!({
                        "vital": kind.label(),
                        "value": v,
                        "unit": kind.unit(),
                        "status": format!("{:?}", kind.classify(v)),
                        "normal_range": kind.normal_range(),
                    })
                })
            })
            .collect();
        export.insert("vitals".to_string(), Value::Array(rows));
    }

    export.insert("alerts".to_string(), json!(snapshot.alerts));

    let timeline: Vec<Value> = build_timeline(&snapshot.history, Some(prediction), now)
        .iter()
        .map(|p| {
            json!({
                "label": p.label(),
                "score": p.score,
                "kind": p.kind.label(),
            })
        })
        .collect();
    export.insert("timeline".to_string(), Value::Array(timeline));

    export.insert(
        "polled_scores".to_string(),
        json!(history.current.iter().collect::<Vec<_>>()),
    );

    Value::Object(export)
}

pub fn write_export(path: &std::path::Path, value: &Value) -> Result<()> {
    use std::io::Write;

    let json = serde_json::to_string_pretty(value)?;
    let mut file = std::fs::File::create(path)?;
    file.write_all(json.as_bytes())?;
    Ok(())
}
