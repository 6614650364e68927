// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Beacon initialization.
//!
//! Each variant is activated separately. Activation reads the variant's
//! script attributes once, runs the consent and path gate, and hands out a
//! capability only when the page may be tracked. A blocked page gets `None`
//! and no request is ever made for it.

use std::sync::Arc;
use std::time::Duration;

use pirsch_beacon_core::{evaluate, BeaconConfig, GateDecision, Page, Variant};
use tracing::{debug, info};

use crate::error::{BeaconError, Result};
use crate::events::Events;
use crate::pageview::{PageViewTracker, PageViews};
use crate::session::SessionKeeper;
use crate::transport::{HttpTransport, Transport, TransportConfig};

/// Builder for [`Beacon`].
#[derive(Default)]
pub struct BeaconBuilder {
	page: Option<Arc<dyn Page>>,
	transport: Option<Arc<dyn Transport>>,
	transport_config: TransportConfig,
}

impl BeaconBuilder {
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets the page being tracked. Required.
	pub fn page(mut self, page: impl Page + 'static) -> Self {
		self.page = Some(Arc::new(page));
		self
	}

	pub fn shared_page(mut self, page: Arc<dyn Page>) -> Self {
		self.page = Some(page);
		self
	}

	/// Replaces the default HTTP transport.
	pub fn transport(mut self, transport: impl Transport + 'static) -> Self {
		self.transport = Some(Arc::new(transport));
		self
	}

	pub fn shared_transport(mut self, transport: Arc<dyn Transport>) -> Self {
		self.transport = Some(transport);
		self
	}

	/// Timeout for HTTP requests. Ignored with a custom transport.
	pub fn request_timeout(mut self, timeout: Duration) -> Self {
		self.transport_config.request_timeout = timeout;
		self
	}

	/// Turns off the beacon mechanism, so events always use the JSON POST.
	pub fn disable_beacon(mut self) -> Self {
		self.transport_config.beacon_enabled = false;
		self
	}

	pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
		self.transport_config.user_agent = Some(user_agent.into());
		self
	}

	pub fn build(self) -> Result<Beacon> {
		let page = self.page.ok_or(BeaconError::MissingPage)?;
		let transport = match self.transport {
			Some(transport) => transport,
			None => Arc::new(HttpTransport::new(self.transport_config)?),
		};

		Ok(Beacon { page, transport })
	}
}

impl std::fmt::Debug for BeaconBuilder {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("BeaconBuilder")
			.field("has_page", &self.page.is_some())
			.field("has_transport", &self.transport.is_some())
			.field("transport_config", &self.transport_config)
			.finish()
	}
}

/// Entry point: activates the variants for one page.
#[derive(Clone)]
pub struct Beacon {
	page: Arc<dyn Page>,
	transport: Arc<dyn Transport>,
}

impl Beacon {
	pub fn builder() -> BeaconBuilder {
		BeaconBuilder::new()
	}

	/// A page-view tracker for manual reporting. No hit is sent by this call.
	pub fn page_view_tracker(&self) -> Option<PageViewTracker> {
		let config = self.activate(Variant::PageView)?;
		Some(PageViewTracker::new(
			config,
			self.page.clone(),
			self.transport.clone(),
		))
	}

	/// Activates page views and sends the initial hit, or defers it until
	/// [`PageViews::document_ready`] when the body is not ready yet.
	pub fn page_views(&self) -> Option<PageViews> {
		let tracker = self.page_view_tracker()?;
		Some(PageViews::start(tracker, self.page.body_ready()))
	}

	pub fn events(&self) -> Option<Events> {
		let config = self.activate(Variant::Events)?;
		Some(Events::new(config, self.page.clone(), self.transport.clone()))
	}

	/// Activates session keep-alives. The returned keeper must be kept alive
	/// for as long as the timer should run.
	pub fn sessions(&self) -> Option<SessionKeeper> {
		let config = self.activate(Variant::Sessions)?;
		Some(SessionKeeper::start(
			config,
			self.page.clone(),
			self.transport.clone(),
		))
	}

	pub fn page(&self) -> &Arc<dyn Page> {
		&self.page
	}

	fn activate(&self, variant: Variant) -> Option<Arc<BeaconConfig>> {
		let config = BeaconConfig::load(variant, self.page.as_ref());
		match evaluate(self.page.as_ref(), &config) {
			GateDecision::Allowed => {
				debug!(%variant, endpoint = %config.endpoint, "Beacon activated");
				Some(Arc::new(config))
			}
			GateDecision::Blocked(reason) => {
				info!(%variant, %reason, "Tracking disabled for this page");
				None
			}
		}
	}
}

impl std::fmt::Debug for Beacon {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Beacon")
			.field("href", &self.page.href())
			.finish_non_exhaustive()
	}
}
