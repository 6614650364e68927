// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Wire payloads for page views and custom events.
//!
//! Both shapes are fixed. Redaction is applied while capturing from the
//! page, and the URL is always capped at [`MAX_URL_LENGTH`] characters
//! after the query string has been removed.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::Redaction;
use crate::error::{CoreError, Result};
use crate::meta::EventMeta;
use crate::page::Page;

/// Longest URL ever reported, in characters.
pub const MAX_URL_LENGTH: usize = 1800;

/// Caps a URL at [`MAX_URL_LENGTH`] characters. May cut through an escape
/// sequence.
pub fn truncate_url(url: &str) -> String {
	url.chars().take(MAX_URL_LENGTH).collect()
}

/// Drops everything from the first `?` on.
pub fn strip_query(url: &str) -> &str {
	url.split_once('?').map_or(url, |(head, _)| head)
}

/// The page fields shared by every report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageView {
	pub url: String,
	pub title: String,
	pub referrer: String,
	pub screen_width: u32,
	pub screen_height: u32,
}

impl PageView {
	/// Captures the current page, honouring the redaction toggles.
	pub fn capture(page: &dyn Page, redaction: Redaction) -> Self {
		let href = page.href();
		let url = if redaction.query {
			truncate_url(strip_query(&href))
		} else {
			truncate_url(&href)
		};

		let referrer = if redaction.referrer {
			String::new()
		} else {
			page.referrer()
		};

		let (screen_width, screen_height) = match page.screen() {
			Some(screen) if !redaction.resolution => (screen.width, screen.height),
			_ => (0, 0),
		};

		Self {
			url,
			title: page.title(),
			referrer,
			screen_width,
			screen_height,
		}
	}

	/// Query parameters of a page-view hit, `nc` first.
	pub fn query_pairs(&self, nc: i64) -> Vec<(&'static str, String)> {
		vec![
			("nc", nc.to_string()),
			("url", self.url.clone()),
			("t", self.title.clone()),
			("ref", self.referrer.clone()),
			("w", self.screen_width.to_string()),
			("h", self.screen_height.to_string()),
		]
	}
}

/// Optional parts of a custom event.
#[derive(Debug, Clone, Default)]
pub struct EventOptions {
	duration: Option<Value>,
	meta: EventMeta,
}

impl EventOptions {
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets the duration. Only JSON numbers are honoured; anything else is
	/// reported as 0.
	pub fn duration(mut self, duration: impl Into<Value>) -> Self {
		self.duration = Some(duration.into());
		self
	}

	pub fn meta(mut self, meta: EventMeta) -> Self {
		self.meta = meta;
		self
	}

	/// Adds a single metadata entry.
	pub fn meta_entry(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
		self.meta = self.meta.insert(key, value);
		self
	}

	/// The duration as reported: whole units, never negative.
	pub fn duration_value(&self) -> u64 {
		match &self.duration {
			Some(Value::Number(n)) => n.as_u64().unwrap_or_else(|| {
				n.as_f64()
					.filter(|f| f.is_finite() && *f > 0.0)
					.map(|f| f as u64)
					.unwrap_or(0)
			}),
			_ => 0,
		}
	}
}

/// A custom event as posted to the collector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
	#[serde(flatten)]
	pub page: PageView,
	pub event_name: String,
	pub event_duration: u64,
	pub event_meta: BTreeMap<String, String>,
}

impl EventRecord {
	/// Builds a record from an already captured page view.
	pub fn build(page: PageView, name: &str, options: EventOptions) -> Result<Self> {
		if name.is_empty() {
			return Err(CoreError::InvalidEventName);
		}

		let event_duration = options.duration_value();
		Ok(Self {
			page,
			event_name: name.to_string(),
			event_duration,
			event_meta: options.meta.into_strings(),
		})
	}

	/// Captures the page and builds the record in one step.
	pub fn capture(
		page: &dyn Page,
		redaction: Redaction,
		name: &str,
		options: EventOptions,
	) -> Result<Self> {
		Self::build(PageView::capture(page, redaction), name, options)
	}
}
