// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Periodic session keep-alives.
//!
//! A [`SessionKeeper`] owns one background task that wakes every configured
//! interval and POSTs a keep-alive for the page and for each additional
//! domain. The first tick comes one full interval after start. Stopping is
//! idempotent, and dropping the keeper stops it too.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use pirsch_beacon_core::{session_pings, BeaconConfig, Page};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::transport::{cache_buster, resolve_endpoint, with_query, OutboundRequest, Transport};

/// Sends one round of keep-alives: the page first, then each domain.
pub fn extend_session(config: &BeaconConfig, page: &dyn Page, transport: &dyn Transport) {
	let endpoint = match resolve_endpoint(&page.href(), &config.endpoint) {
		Ok(endpoint) => endpoint,
		Err(e) => {
			warn!(error = %e, "Skipping session keep-alive");
			return;
		}
	};

	let nc = cache_buster();
	for ping in session_pings(config, page) {
		let url = with_query(endpoint.clone(), &ping.query_pairs(nc));
		debug!(url = %ping.url, "Session keep-alive");
		transport.dispatch(OutboundRequest::post(url));
	}
}

/// Handle to the running keep-alive timer.
#[derive(Debug)]
pub struct SessionKeeper {
	interval: Duration,
	stopped: Arc<AtomicBool>,
	task: Mutex<Option<JoinHandle<()>>>,
}

impl SessionKeeper {
	/// Starts the timer on the current tokio runtime.
	///
	/// Without a runtime the keeper is returned already stopped.
	pub fn start(config: Arc<BeaconConfig>, page: Arc<dyn Page>, transport: Arc<dyn Transport>) -> Self {
		let stopped = Arc::new(AtomicBool::new(false));
		let interval = config.interval;

		let Ok(handle) = Handle::try_current() else {
			warn!("No async runtime available, session keep-alive not started");
			stopped.store(true, Ordering::SeqCst);
			return Self {
				interval,
				stopped,
				task: Mutex::new(None),
			};
		};

		info!(
			interval_ms = interval.as_millis() as u64,
			domains = config.domains.len(),
			"Starting session keep-alive"
		);

		let flag = stopped.clone();
		let task = handle.spawn(async move {
			let mut ticker = interval_at(Instant::now() + interval, interval);
			ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
			loop {
				ticker.tick().await;
				if flag.load(Ordering::SeqCst) {
					break;
				}
				extend_session(&config, page.as_ref(), transport.as_ref());
			}
		});

		Self {
			interval,
			stopped,
			task: Mutex::new(Some(task)),
		}
	}

	/// Cancels the timer. Calling it again does nothing.
	pub fn stop(&self) {
		if self.stopped.swap(true, Ordering::SeqCst) {
			return;
		}
		if let Some(task) = self.task.lock().take() {
			task.abort();
		}
		info!("Session keep-alive stopped");
	}

	pub fn is_active(&self) -> bool {
		!self.stopped.load(Ordering::SeqCst)
	}

	pub fn interval(&self) -> Duration {
		self.interval
	}
}

impl Drop for SessionKeeper {
	fn drop(&mut self) {
		self.stopped.store(true, Ordering::SeqCst);
		if let Some(task) = self.task.get_mut().take() {
			task.abort();
		}
	}
}
