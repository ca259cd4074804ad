// Library crate: public API items may not be used by the binary
#![allow(unused)]

//! # vitalwatch
//!
//! A terminal dashboard and library for watching a patient's health score,
//! vitals and short-term prediction as reported by a remote Health API.
//!
//! The dashboard polls the API on a fixed interval, normalizes whatever
//! response layout it gets back, and renders three animated gauges (past
//! average, current, predicted), a two hour timeline, per-vital status and
//! active alerts. When the API is unreachable it keeps showing the last
//! good data, or demo data if there never was any, and always says which.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Application                          │
//! │  ┌─────────┐    ┌──────────┐    ┌─────────┐    ┌─────────┐ │
//! │  │  app    │───▶│ animate  │───▶│   ui    │───▶│ Terminal│ │
//! │  │ (state) │    │ (gauges) │    │(render) │    │         │ │
//! │  └────┬────┘    └──────────┘    └─────────┘    └─────────┘ │
//! │       │                                                     │
//! │       ▼                                                     │
//! │  ┌─────────┐    ┌──────────┐    ┌─────────┐                │
//! │  │ source  │───▶│   api    │───▶│  data   │                │
//! │  │(pollers)│    │ (HTTP)   │    │(normalize)               │
//! │  └─────────┘    └──────────┘    └─────────┘                │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`app`]**: Application state, view navigation and keyboard actions
//! - **[`source`]**: The [`DataSource`] trait, shared per-patient pollers
//!   ([`PollerRegistry`]), file replay and channel input
//! - **[`api`]**: The [`HealthApi`] trait and its reqwest implementation
//! - **[`data`]**: Canonical types, response normalization, fallback
//!   scoring, bands, trends and the timeline
//! - **[`animate`]**: Eased, cancellable value transitions for the gauges
//! - **[`config`]**: Layered settings (defaults, TOML file, environment)
//! - **[`ui`]**: Terminal rendering using ratatui
//!
//! ## Usage
//!
//! ### As a CLI tool
//!
//! ```bash
//! # Watch patient P001 against a local API
//! vitalwatch --patient P001 --api-url http://localhost:5000
//!
//! # Replay a captured response
//! vitalwatch --file capture.json
//! ```
//!
//! ### As a library with a live poller
//!
//! ```no_run
//! use std::sync::Arc;
//! use vitalwatch::{App, HttpHealthApi, PollOptions, PollerRegistry};
//!
//! # tokio_test::block_on(async {
//! let api = Arc::new(HttpHealthApi::builder().build().unwrap());
//! let registry = PollerRegistry::new(api, PollOptions::default());
//! let handle = registry.subscribe("P001");
//! let app = App::new(Box::new(handle));
//! # });
//! ```
//!
//! ### As a library with channel source
//!
//! ```
//! use vitalwatch::{App, ChannelSource};
//!
//! // Another component owns polling and pushes states
//! let (tx, source) = ChannelSource::create("P001", "embedded");
//! let app = App::new(Box::new(source));
//! ```

pub mod animate;
pub mod api;
pub mod app;
pub mod config;
pub mod data;
pub mod events;
pub mod source;
pub mod ui;

// Re-export main types for convenience
pub use animate::{AnimatedValue, AnimationSpec, Easing, FrameTicket};
pub use api::{ApiError, Guardian, HealthApi, HttpHealthApi};
pub use app::App;
pub use config::Settings;
pub use data::{
    HealthPrediction, HealthReading, HealthSnapshot, ScoreBand, Trend, VitalReading,
};
pub use source::{
    fetch_snapshot, ChannelSource, DataOrigin, DataSource, FileSource, PollOptions,
    PollerHandle, PollerRegistry, PollerState, Shown,
};
