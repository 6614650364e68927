// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Custom event reporting.

use std::sync::Arc;

use pirsch_beacon_core::{BeaconConfig, CoreError, EventOptions, EventRecord, Page};
use tracing::{debug, instrument};

use crate::error::Result;
use crate::transport::{resolve_endpoint, OutboundRequest, Transport};

/// The events capability handed out once the page passed the gate.
#[derive(Clone)]
pub struct Events {
	config: Arc<BeaconConfig>,
	page: Arc<dyn Page>,
	transport: Arc<dyn Transport>,
}

impl Events {
	pub fn new(config: Arc<BeaconConfig>, page: Arc<dyn Page>, transport: Arc<dyn Transport>) -> Self {
		Self {
			config,
			page,
			transport,
		}
	}

	/// Builds the record an event with this name and options would send.
	pub fn record(&self, name: &str, options: EventOptions) -> Result<EventRecord> {
		Ok(EventRecord::capture(
			self.page.as_ref(),
			self.config.redaction,
			name,
			options,
		)?)
	}

	/// Reports a custom event.
	///
	/// The beacon mechanism is tried first; when it is unavailable the record
	/// is POSTed as JSON and the collector's answer decides the result. An
	/// empty name is rejected before anything is sent.
	#[instrument(skip(self, options))]
	pub async fn event(&self, name: &str, options: EventOptions) -> Result<()> {
		if name.is_empty() {
			return Err(CoreError::InvalidEventName.into());
		}

		let record = self.record(name, options)?;
		let url = resolve_endpoint(&self.page.href(), &self.config.endpoint)?;
		let body = serde_json::to_string(&record)?;

		if self.transport.beacon(&url, body.clone()) {
			debug!(event_name = name, "Event queued via beacon");
			return Ok(());
		}

		debug!(event_name = name, "Beacon unavailable, posting event");
		self.transport.send(OutboundRequest::json(url, body)).await
	}

	pub fn config(&self) -> &BeaconConfig {
		&self.config
	}
}

impl std::fmt::Debug for Events {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Events")
			.field("endpoint", &self.config.endpoint)
			.finish_non_exhaustive()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::error::BeaconError;
	use crate::testing::RecordingTransport;
	use crate::transport::JSON_CONTENT_TYPE;
	use pirsch_beacon_core::{EventMeta, PageSnapshot, ScriptAttributes, Variant, MAX_URL_LENGTH};
	use proptest::prelude::*;
	use serde_json::{json, Value};

	fn events(transport: Arc<RecordingTransport>) -> Events {
		let page = PageSnapshot::new("https://example.com/signup?ref=mail")
			.with_title("Sign up")
			.with_screen(800, 600);
		let config = Arc::new(BeaconConfig::from_attributes(
			Variant::Events,
			&ScriptAttributes::new(),
		));
		Events::new(config, Arc::new(page), transport)
	}

	#[tokio::test]
	async fn test_empty_name_rejected_without_request() {
		let transport = Arc::new(RecordingTransport::new());
		let result = events(transport.clone()).event("", EventOptions::new()).await;

		let err = result.unwrap_err();
		assert!(matches!(err, BeaconError::Core(CoreError::InvalidEventName)));
		assert!(err.is_validation());
		assert_eq!(transport.total_requests(), 0);
	}

	#[tokio::test]
	async fn test_event_goes_through_beacon() {
		let transport = Arc::new(RecordingTransport::new());
		let options = EventOptions::new()
			.duration(42)
			.meta(EventMeta::new().insert("plan", "pro").insert("seats", 3));

		tokio_test::assert_ok!(events(transport.clone()).event("Signup", options).await);

		let beacons = transport.beacons();
		assert_eq!(beacons.len(), 1);
		assert_eq!(beacons[0].0.as_str(), "https://example.com/pirsch/event");
		let body: Value = serde_json::from_str(&beacons[0].1).unwrap();
		assert_eq!(body["event_name"], "Signup");
		assert_eq!(body["event_duration"], 42);
		assert_eq!(body["event_meta"], json!({"plan": "pro", "seats": "3"}));
		assert_eq!(body["url"], "https://example.com/signup?ref=mail");
		assert_eq!(body["screen_width"], 800);
		assert!(transport.sent().is_empty());
	}

	#[tokio::test]
	async fn test_missing_duration_reports_zero() {
		let transport = Arc::new(RecordingTransport::new());
		tokio_test::assert_ok!(events(transport.clone()).event("Click", EventOptions::new()).await);

		let body: Value = serde_json::from_str(&transport.beacons()[0].1).unwrap();
		assert_eq!(body["event_duration"], 0);
		assert_eq!(body["event_meta"], json!({}));
	}

	#[tokio::test]
	async fn test_falls_back_to_json_post() {
		let transport = Arc::new(RecordingTransport::without_beacon());
		tokio_test::assert_ok!(events(transport.clone()).event("Click", EventOptions::new()).await);

		let sent = transport.sent();
		assert_eq!(sent.len(), 1);
		assert_eq!(sent[0].method, reqwest::Method::POST);
		assert_eq!(sent[0].content_type, Some(JSON_CONTENT_TYPE));
		let body: Value = serde_json::from_str(sent[0].body.as_deref().unwrap()).unwrap();
		assert_eq!(body["event_name"], "Click");
	}

	#[tokio::test]
	async fn test_fallback_surfaces_server_error() {
		let transport = Arc::new(RecordingTransport::without_beacon());
		transport.fail_sends_with(502);

		let result = events(transport.clone()).event("Click", EventOptions::new()).await;
		assert!(matches!(result, Err(BeaconError::ServerError { status: 502, .. })));
	}

	#[test]
	fn test_record_applies_redaction() {
		let page = PageSnapshot::new("https://example.com/signup?ref=mail")
			.with_referrer("https://mail.example.org/");
		let attrs = ScriptAttributes::new()
			.with_flag("data-disable-query")
			.with_flag("data-disable-referrer");
		let config = Arc::new(BeaconConfig::from_attributes(Variant::Events, &attrs));
		let events = Events::new(config, Arc::new(page), Arc::new(RecordingTransport::new()));

		let record = events.record("Open", EventOptions::new()).unwrap();
		assert_eq!(record.page.url, "https://example.com/signup");
		assert_eq!(record.page.referrer, "");
		assert!(events.config().redaction.query);
	}

	fn meta_value() -> impl Strategy<Value = Value> {
		prop_oneof![
			Just(Value::Null),
			any::<bool>().prop_map(Value::Bool),
			any::<i64>().prop_map(|n| json!(n)),
			"[a-zA-Z0-9 ]{0,20}".prop_map(Value::String),
			proptest::collection::vec(any::<u8>(), 0..4).prop_map(|v| json!(v)),
		]
	}

	proptest! {
		#[test]
		fn recorded_events_are_bounded_and_stringly_typed(
			path_len in 0usize..4000,
			entries in proptest::collection::btree_map("[a-z]{1,10}", meta_value(), 0..8),
		) {
			let page = PageSnapshot::new(format!("https://example.com/{}", "p".repeat(path_len)));
			let config = Arc::new(BeaconConfig::from_attributes(
				Variant::Events,
				&ScriptAttributes::new(),
			));
			let events = Events::new(config, Arc::new(page), Arc::new(RecordingTransport::new()));

			let meta: EventMeta = entries.clone().into_iter().collect();
			let record = events.record("Scroll", EventOptions::new().meta(meta)).unwrap();
			prop_assert!(record.page.url.chars().count() <= MAX_URL_LENGTH);

			let body: Value = serde_json::to_value(&record).unwrap();
			let wire_meta = body["event_meta"].as_object().unwrap();
			prop_assert_eq!(wire_meta.len(), entries.len());
			prop_assert!(wire_meta.values().all(Value::is_string));
		}
	}
}
