//! Shared pollers keyed by patient.
//!
//! Every view that needs a patient's data subscribes through the same
//! [`PollerRegistry`], so a patient is polled by exactly one task no matter
//! how many subscribers there are. The task lives as long as at least one
//! [`PollerHandle`] for that patient does.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{watch, Notify};
use tokio::task::JoinHandle;
use tracing::info;

use super::poller::{self, PollOptions};
use super::state::PollerState;
use super::DataSource;
use crate::api::HealthApi;

#[derive(Debug)]
struct Entry {
    state: watch::Receiver<PollerState>,
    refresh: Arc<Notify>,
    task: JoinHandle<()>,
    subscribers: usize,
}

type Pollers = Arc<Mutex<HashMap<String, Entry>>>;

/// Hands out [`PollerHandle`]s, starting and stopping poll tasks on demand.
#[derive(Debug, Clone)]
pub struct PollerRegistry {
    api: Arc<dyn HealthApi>,
    options: PollOptions,
    pollers: Pollers,
}

impl PollerRegistry {
    pub fn new(api: Arc<dyn HealthApi>, options: PollOptions) -> Self {
        Self {
            api,
            options,
            pollers: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Subscribe to `patient_id`, starting its poller if none is running.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn subscribe(&self, patient_id: &str) -> PollerHandle {
        let mut pollers = self.pollers.lock();

        let entry = pollers.entry(patient_id.to_string()).or_insert_with(|| {
            let (tx, rx) = watch::channel(PollerState::new(patient_id));
            let refresh = Arc::new(Notify::new());
            let task = tokio::spawn(poller::run(
                Arc::clone(&self.api),
                patient_id.to_string(),
                self.options,
                tx,
                Arc::clone(&refresh),
            ));
            Entry {
                state: rx,
                refresh,
                task,
                subscribers: 0,
            }
        });
        entry.subscribers += 1;

        PollerHandle {
            patient_id: patient_id.to_string(),
            description: format!("{} @ {}", patient_id, self.api.describe()),
            receiver: entry.state.clone(),
            refresh: Arc::clone(&entry.refresh),
            pollers: Arc::clone(&self.pollers),
            initial_returned: false,
            last_error: None,
        }
    }

    /// Number of patients currently being polled.
    pub fn active(&self) -> usize {
        self.pollers.lock().len()
    }
}

/// One subscriber's view of a shared poller.
///
/// Dropping the last handle for a patient aborts its task along with any
/// request in flight.
#[derive(Debug)]
pub struct PollerHandle {
    patient_id: String,
    description: String,
    receiver: watch::Receiver<PollerState>,
    refresh: Arc<Notify>,
    pollers: Pollers,
    initial_returned: bool,
    last_error: Option<String>,
}

impl PollerHandle {
    pub fn patient_id(&self) -> &str {
        &self.patient_id
    }

    /// The latest state without consuming the change notification.
    pub fn current(&self) -> PollerState {
        self.receiver.borrow().clone()
    }

    /// Wait until the state changes. Returns false if the poller stopped.
    pub async fn changed(&mut self) -> bool {
        self.receiver.changed().await.is_ok()
    }
}

impl DataSource for PollerHandle {
    fn poll(&mut self) -> Option<PollerState> {
        if !self.initial_returned {
            self.initial_returned = true;
            self.receiver.mark_changed();
        }

        if self.receiver.has_changed().unwrap_or(false) {
            let state = self.receiver.borrow_and_update().clone();
            self.last_error = state.error.clone();
            Some(state)
        } else {
            None
        }
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    fn request_refresh(&mut self) {
        self.refresh.notify_one();
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        let mut pollers = self.pollers.lock();
        let Some(entry) = pollers.get_mut(&self.patient_id) else {
            return;
        };

        entry.subscribers = entry.subscribers.saturating_sub(1);
        if entry.subscribers == 0 {
            if let Some(entry) = pollers.remove(&self.patient_id) {
                entry.task.abort();
                info!(patient = %self.patient_id, "poller stopped");
            }
        }
    }
}
