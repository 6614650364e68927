// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Core types for the Pirsch analytics beacon.
//!
//! Everything in this crate is a pure decision or transform over page
//! state; no request is ever made from here. The SDK crate
//! (`pirsch-beacon`) wires these pieces to a transport.
//!
//! - [`consent`]: do-not-track and the persisted opt-out flag
//! - [`filter`]: include/exclude path patterns
//! - [`gate`]: the combined go/no-go decision run once per page load
//! - [`payload`] and [`meta`]: the fixed-shape records sent on the wire
//! - [`session`]: keep-alive targets for the session variant

pub mod attributes;
pub mod config;
pub mod consent;
pub mod error;
pub mod filter;
pub mod gate;
pub mod meta;
pub mod page;
pub mod payload;
pub mod session;

pub use attributes::ScriptAttributes;
pub use config::{BeaconConfig, Redaction, Variant, DEFAULT_CLIENT_ID, DEFAULT_INTERVAL};
pub use consent::{check_consent, DO_NOT_TRACK_ENABLED, OPT_OUT_KEY};
pub use error::{CoreError, Result, EVENT_NAME_USAGE};
pub use filter::{Matcher, PageFilter, PatternSet};
pub use gate::{evaluate, BlockReason, GateDecision};
pub use meta::{coerce_to_string, EventMeta};
pub use page::{Page, PageSnapshot, ScreenSize, SharedPage};
pub use payload::{strip_query, truncate_url, EventOptions, EventRecord, PageView, MAX_URL_LENGTH};
pub use session::{rewrite_host, session_pings, SessionPing};
