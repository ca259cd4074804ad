//! Data source abstraction for receiving patient health state.
//!
//! The dashboard never talks to the network itself. It polls a
//! [`DataSource`] once per frame, and the source hands back a new
//! [`PollerState`] whenever something changed. Implementations:
//!
//! - [`PollerHandle`]: a subscription to a shared live poller (see
//!   [`PollerRegistry`])
//! - [`FileSource`]: replays a captured API response from disk
//! - [`ChannelSource`]: receives states pushed by an embedding program

mod channel;
mod file;
mod poller;
mod registry;
mod state;

pub use channel::ChannelSource;
pub use file::FileSource;
pub use poller::{fetch_snapshot, PollOptions};
pub use registry::{PollerHandle, PollerRegistry};
pub use state::{DataOrigin, PollerState, SequenceGuard, Shown};

use std::fmt::Debug;

/// Trait for receiving poller state from various sources.
///
/// # Example
///
/// ```no_run
/// use vitalwatch::{DataSource, FileSource};
///
/// let mut source = FileSource::new("capture.json", "P001");
/// if let Some(state) = source.poll() {
///     let shown = state.shown();
///     println!("{} ({})", shown.snapshot.prediction.current_health.score, shown.origin.badge());
/// }
/// ```
pub trait DataSource: Send + Debug {
    /// Poll for the latest state.
    ///
    /// Returns `Some(state)` if it changed since the last call, `None`
    /// otherwise. Must not block.
    fn poll(&mut self) -> Option<PollerState>;

    /// Returns a human-readable description of the source.
    ///
    /// Used for display in the TUI header.
    fn description(&self) -> &str;

    /// The error from the most recent fetch, if it failed.
    fn error(&self) -> Option<&str>;

    /// Ask for a fetch now instead of waiting for the next tick.
    fn request_refresh(&mut self) {}
}
