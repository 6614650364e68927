// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Pirsch analytics beacon SDK for Rust applications.
//!
//! This crate reports page views, custom events and session keep-alives to a
//! Pirsch collection endpoint. It honours do-not-track, the persisted
//! `disable_pirsch` opt-out flag, and per-variant include/exclude path
//! patterns. Nothing is sent for a page that fails those checks.
//!
//! # Quick Start
//!
//! ```ignore
//! use pirsch_beacon::{Beacon, EventOptions, PageHistory, PageSnapshot, ScriptAttributes, SharedPage};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let page = SharedPage::new(
//!         PageSnapshot::new("https://example.com/")
//!             .with_title("Home")
//!             .with_script("pirschjs", ScriptAttributes::new().with("data-exclude", "^/admin"))
//!             .with_script("pirscheventsjs", ScriptAttributes::new()),
//!     );
//!
//!     let beacon = Beacon::builder().page(page.clone()).build()?;
//!
//!     // Initial hit, then one per client-side navigation
//!     if let Some(views) = beacon.page_views() {
//!         let mut history = views.track_history(PageHistory::new(page.clone()));
//!         history.push_state(serde_json::Value::Null, "", Some("/pricing"));
//!     }
//!
//!     if let Some(events) = beacon.events() {
//!         events
//!             .event("Signup", EventOptions::new().duration(42).meta_entry("plan", "pro"))
//!             .await?;
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! # Delivery
//!
//! Every report is sent at most once. Page views and keep-alives are
//! fire-and-forget; events are handed to the beacon mechanism and fall back
//! to a JSON POST whose outcome is returned to the caller.

mod beacon;
mod error;
mod events;
mod navigation;
mod pageview;
mod session;
mod transport;

#[cfg(test)]
pub(crate) mod testing;

pub use beacon::{Beacon, BeaconBuilder};
pub use error::{BeaconError, Result};
pub use events::Events;
pub use navigation::{wrap_navigation, History, HistoryEntry, PageHistory, TrackedHistory};
pub use pageview::{PageViewTracker, PageViews};
pub use session::{extend_session, SessionKeeper};
pub use transport::{
	cache_buster, resolve_endpoint, with_query, HttpTransport, OutboundRequest, SharedTransport,
	Transport, TransportConfig, JSON_CONTENT_TYPE, TEXT_CONTENT_TYPE,
};

// Re-export core types for convenience
pub use pirsch_beacon_core::{
	evaluate, BeaconConfig, BlockReason, CoreError, EventMeta, EventOptions, EventRecord,
	GateDecision, Page, PageFilter, PageSnapshot, PageView, Redaction, ScreenSize, ScriptAttributes,
	SessionPing, SharedPage, Variant,
};

// Re-export the user agent so hosts can match it in server logs
pub use pirsch_common_http::{user_agent, SDK_NAME, SDK_VERSION};
