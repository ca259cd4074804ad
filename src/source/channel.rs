//! Channel-based data source.
//!
//! Receives poller states via a tokio watch channel. Useful when another
//! program owns the polling and only wants the dashboard for display.

use tokio::sync::watch;

use super::{DataSource, PollerState};

/// A data source that receives poller states via a channel.
///
/// # Example
///
/// ```
/// use vitalwatch::ChannelSource;
///
/// let (tx, source) = ChannelSource::create("P001", "embedded");
/// ```
#[derive(Debug)]
pub struct ChannelSource {
    receiver: watch::Receiver<PollerState>,
    description: String,
    /// Track if we've returned the initial value yet
    initial_returned: bool,
    last_error: Option<String>,
}

impl ChannelSource {
    /// Create a new channel source.
    ///
    /// * `source_description` - where states come from, shown in the header
    pub fn new(receiver: watch::Receiver<PollerState>, source_description: &str) -> Self {
        Self {
            receiver,
            description: format!("channel: {}", source_description),
            initial_returned: false,
            last_error: None,
        }
    }

    /// Create a channel pair seeded with an empty state for `patient_id`.
    pub fn create(
        patient_id: &str,
        source_description: &str,
    ) -> (watch::Sender<PollerState>, Self) {
        let (tx, rx) = watch::channel(PollerState::new(patient_id));
        (tx, Self::new(rx, source_description))
    }
}

impl DataSource for ChannelSource {
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
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiError;
    use crate::source::DataOrigin;
    use chrono::Utc;

    #[test]
    fn test_channel_source_poll() {
        let (tx, mut source) = ChannelSource::create("P001", "test");
        assert_eq!(source.description(), "channel: test");

        // Initially returns the seeded state
        let state = source.poll().unwrap();
        assert_eq!(state.origin(), DataOrigin::Demo);

        // No change, so poll returns None
        assert!(source.poll().is_none());

        tx.send_modify(|s| {
            s.apply(1, Err(ApiError::Timeout), Utc::now());
        });

        let state = source.poll().unwrap();
        assert_eq!(state.sequence, 1);
        assert_eq!(source.error(), Some("request timed out"));
    }
}
