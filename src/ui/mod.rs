//! Terminal UI rendering using ratatui.
//!
//! Each view is implemented in its own submodule with a `render` function.
//!
//! ## Submodules
//!
//! - [`scores`]: Past average, current and predicted gauges with the trend
//! - [`timeline`]: Two hours of history plus the 30 minute prediction
//! - [`vitals`]: Per-vital status table and the normalized radar panel
//! - [`alerts`]: Active alerts, model status and emergency notifications
//! - [`common`]: Shared components (header, tabs, status bar, overlays)
//! - [`theme`]: Light/dark theme support with terminal auto-detection
//!
//! ## Rendering Architecture
//!
//! ```text
//! ┌──────────────────────────────────────┐
//! │ Header (common::render_header)       │
//! ├──────────────────────────────────────┤
//! │ Tabs (common::render_tabs)           │
//! ├──────────────────────────────────────┤
//! │                                      │
//! │ View Content                         │
//! │ (scores/timeline/vitals/alerts)      │
//! │                                      │
//! ├──────────────────────────────────────┤
//! │ Status Bar (common::render_status)   │
//! └──────────────────────────────────────┘
//!         ↑
//!    Overlays rendered on top:
//!    - common::render_confirm
//!    - common::render_help
//! ```

pub mod alerts;
pub mod common;
pub mod scores;
pub mod theme;
pub mod timeline;
pub mod vitals;

pub use theme::Theme;
