// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Beacon configuration derived from the embedding script element.
//!
//! The configuration is read once per page load. Components receive it as
//! `Arc<BeaconConfig>`; later changes to the page's attributes are never
//! observed.

use std::time::Duration;

use tracing::warn;

use crate::attributes::{
	ScriptAttributes, ATTR_CLIENT_ID, ATTR_DEV, ATTR_DISABLE_QUERY, ATTR_DISABLE_REFERRER,
	ATTR_DISABLE_RESOLUTION, ATTR_DOMAIN, ATTR_ENDPOINT, ATTR_INTERVAL_MS,
};
use crate::filter::PageFilter;
use crate::page::Page;

/// Keep-alive interval used when `data-interval-ms` is absent or unusable.
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(60_000);

/// Client id sent with keep-alives when `data-client-id` is absent.
pub const DEFAULT_CLIENT_ID: &str = "0";

/// Which script flavor is being configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variant {
	/// Page views on load and on client-side navigation.
	PageView,
	/// Custom events reported by application code.
	Events,
	/// Periodic session keep-alives.
	Sessions,
}

impl Variant {
	/// Element id of the script tag carrying this variant's attributes.
	pub fn script_id(self) -> &'static str {
		match self {
			Variant::PageView => "pirschjs",
			Variant::Events => "pirscheventsjs",
			Variant::Sessions => "pirschsessionsjs",
		}
	}

	pub fn default_endpoint(self) -> &'static str {
		match self {
			Variant::PageView => "/pirsch/hit",
			Variant::Events => "/pirsch/event",
			Variant::Sessions => "/pirsch/session",
		}
	}
}

impl std::fmt::Display for Variant {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Variant::PageView => write!(f, "page_view"),
			Variant::Events => write!(f, "events"),
			Variant::Sessions => write!(f, "sessions"),
		}
	}
}

/// Which parts of the page are withheld from reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Redaction {
	/// Strip the query string from the reported URL.
	pub query: bool,
	/// Report an empty referrer.
	pub referrer: bool,
	/// Report a 0x0 screen.
	pub resolution: bool,
}

/// Immutable per-page-load configuration.
#[derive(Debug, Clone)]
pub struct BeaconConfig {
	pub variant: Variant,
	/// Collection endpoint, absolute or relative to the page.
	pub endpoint: String,
	pub filter: PageFilter,
	pub redaction: Redaction,
	pub client_id: String,
	/// Additional hostnames whose sessions are kept alive.
	pub domains: Vec<String>,
	pub interval: Duration,
	/// Hostname substituted for the page host in keep-alive URLs.
	pub dev_rewrite: Option<String>,
}

impl BeaconConfig {
	/// Builds the configuration for `variant` from its script attributes.
	pub fn from_attributes(variant: Variant, attrs: &ScriptAttributes) -> Self {
		Self {
			variant,
			endpoint: attrs
				.non_empty(ATTR_ENDPOINT)
				.unwrap_or(variant.default_endpoint())
				.to_string(),
			filter: PageFilter::from_attributes(attrs),
			redaction: Redaction {
				query: attrs.has(ATTR_DISABLE_QUERY),
				referrer: attrs.has(ATTR_DISABLE_REFERRER),
				resolution: attrs.has(ATTR_DISABLE_RESOLUTION),
			},
			client_id: attrs
				.non_empty(ATTR_CLIENT_ID)
				.unwrap_or(DEFAULT_CLIENT_ID)
				.to_string(),
			domains: attrs.list(ATTR_DOMAIN),
			interval: parse_interval(attrs.get(ATTR_INTERVAL_MS)),
			dev_rewrite: attrs.non_empty(ATTR_DEV).map(str::to_string),
		}
	}

	/// Reads the variant's script element from the page.
	///
	/// A missing element is logged and yields the defaults.
	pub fn load(variant: Variant, page: &dyn Page) -> Self {
		let attrs = page.script(variant.script_id()).unwrap_or_else(|| {
			warn!(
				script_id = variant.script_id(),
				%variant,
				"Script element not found, using default configuration"
			);
			ScriptAttributes::default()
		});
		Self::from_attributes(variant, &attrs)
	}
}

/// Parses a leading integer the way `parseInt` would, falling back to the
/// default for anything that is not a positive number of milliseconds.
fn parse_interval(raw: Option<&str>) -> Duration {
	let Some(raw) = raw.map(str::trim) else {
		return DEFAULT_INTERVAL;
	};

	let digits_end = raw
		.char_indices()
		.find(|(i, c)| !(c.is_ascii_digit() || (*i == 0 && (*c == '-' || *c == '+'))))
		.map(|(i, _)| i)
		.unwrap_or(raw.len());

	match raw[..digits_end].parse::<i64>() {
		Ok(ms) if ms > 0 => Duration::from_millis(ms as u64),
		_ => DEFAULT_INTERVAL,
	}
}
