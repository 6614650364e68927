// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Page-view reporting.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use pirsch_beacon_core::{BeaconConfig, Page, PageView};
use tracing::{debug, warn};

use crate::error::Result;
use crate::navigation::{History, TrackedHistory};
use crate::transport::{cache_buster, resolve_endpoint, with_query, OutboundRequest, Transport};

/// Builds and sends page-view hits for the current page.
#[derive(Clone)]
pub struct PageViewTracker {
	config: Arc<BeaconConfig>,
	page: Arc<dyn Page>,
	transport: Arc<dyn Transport>,
}

impl PageViewTracker {
	pub fn new(config: Arc<BeaconConfig>, page: Arc<dyn Page>, transport: Arc<dyn Transport>) -> Self {
		Self {
			config,
			page,
			transport,
		}
	}

	/// The GET request describing the page as it is right now.
	pub fn request(&self) -> Result<OutboundRequest> {
		let view = PageView::capture(self.page.as_ref(), self.config.redaction);
		let endpoint = resolve_endpoint(&self.page.href(), &self.config.endpoint)?;
		Ok(OutboundRequest::get(with_query(
			endpoint,
			&view.query_pairs(cache_buster()),
		)))
	}

	/// Sends a hit without waiting for the response.
	pub fn hit(&self) {
		match self.request() {
			Ok(request) => {
				debug!(url = %request.url, "Page view");
				self.transport.dispatch(request);
			}
			Err(e) => warn!(error = %e, "Dropping page view"),
		}
	}

	/// Sends a hit and waits for the collector's answer.
	pub async fn report(&self) -> Result<()> {
		let request = self.request()?;
		self.transport.send(request).await
	}

	pub fn config(&self) -> &BeaconConfig {
		&self.config
	}
}

impl std::fmt::Debug for PageViewTracker {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("PageViewTracker")
			.field("endpoint", &self.config.endpoint)
			.finish_non_exhaustive()
	}
}

/// The page-view capability handed out once the page passed the gate.
///
/// The initial hit is sent on creation when the document body is ready,
/// otherwise on the first [`PageViews::document_ready`] call. It is sent
/// exactly once either way.
#[derive(Debug)]
pub struct PageViews {
	tracker: PageViewTracker,
	initial_sent: AtomicBool,
}

impl PageViews {
	pub(crate) fn start(tracker: PageViewTracker, body_ready: bool) -> Self {
		let views = Self {
			tracker,
			initial_sent: AtomicBool::new(false),
		};
		if body_ready {
			views.send_initial();
		} else {
			debug!("Document body not ready, deferring initial page view");
		}
		views
	}

	/// Host notification that the document finished loading.
	pub fn document_ready(&self) {
		self.send_initial();
	}

	/// Sends one more hit and waits for the collector's answer.
	pub async fn report(&self) -> Result<()> {
		self.tracker.report().await
	}

	pub fn initial_report_sent(&self) -> bool {
		self.initial_sent.load(Ordering::SeqCst)
	}

	/// Wraps the host's history so client-side navigation reports page views.
	pub fn track_history<H: History>(&self, history: H) -> TrackedHistory<H> {
		TrackedHistory::new(history, self.tracker.clone())
	}

	pub fn tracker(&self) -> &PageViewTracker {
		&self.tracker
	}

	fn send_initial(&self) {
		if self.initial_sent.swap(true, Ordering::SeqCst) {
			return;
		}
		self.tracker.hit();
	}
}
