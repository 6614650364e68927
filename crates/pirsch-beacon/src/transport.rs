// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Delivery of reports to the collection endpoint.
//!
//! Delivery is at-most-once: nothing is retried or queued. Fire-and-forget
//! sends are handed to the current tokio runtime and their failures are
//! only logged; [`Transport::send`] is the one path that reports the
//! outcome back to the caller.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method};
use tokio::runtime::Handle;
use tracing::{debug, warn};
use url::Url;

use crate::error::{BeaconError, Result};

/// Content type of JSON bodies sent through the fallback path.
pub const JSON_CONTENT_TYPE: &str = "application/json;charset=UTF-8";
/// Content type of beacon bodies.
pub const TEXT_CONTENT_TYPE: &str = "text/plain;charset=UTF-8";

/// A single outbound request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundRequest {
	pub method: Method,
	pub url: Url,
	pub body: Option<String>,
	pub content_type: Option<&'static str>,
}

impl OutboundRequest {
	pub fn get(url: Url) -> Self {
		Self {
			method: Method::GET,
			url,
			body: None,
			content_type: None,
		}
	}

	/// A POST with an empty body.
	pub fn post(url: Url) -> Self {
		Self {
			method: Method::POST,
			url,
			body: None,
			content_type: None,
		}
	}

	pub fn json(url: Url, body: String) -> Self {
		Self {
			method: Method::POST,
			url,
			body: Some(body),
			content_type: Some(JSON_CONTENT_TYPE),
		}
	}

	pub fn text(url: Url, body: String) -> Self {
		Self {
			method: Method::POST,
			url,
			body: Some(body),
			content_type: Some(TEXT_CONTENT_TYPE),
		}
	}

	/// Returns the value of a query parameter.
	pub fn query_param(&self, name: &str) -> Option<String> {
		self
			.url
			.query_pairs()
			.find(|(k, _)| k == name)
			.map(|(_, v)| v.into_owned())
	}
}

/// Resolves an endpoint, which may be relative, against the page location.
pub fn resolve_endpoint(page_href: &str, endpoint: &str) -> Result<Url> {
	let resolved = match Url::parse(endpoint) {
		Ok(url) => Ok(url),
		Err(url::ParseError::RelativeUrlWithoutBase) => {
			Url::parse(page_href).and_then(|base| base.join(endpoint))
		}
		Err(e) => Err(e),
	};

	resolved.map_err(|source| BeaconError::InvalidEndpoint {
		endpoint: endpoint.to_string(),
		source,
	})
}

/// Appends query parameters to an endpoint URL.
pub fn with_query(mut url: Url, pairs: &[(&str, String)]) -> Url {
	url.query_pairs_mut().extend_pairs(pairs);
	url
}

/// Cache-busting value for the `nc` parameter: the current time in
/// milliseconds.
pub fn cache_buster() -> i64 {
	Utc::now().timestamp_millis()
}

/// The mechanisms available for delivering a report.
#[async_trait]
pub trait Transport: Send + Sync {
	/// Queues `body` for a background POST that outlives the caller.
	///
	/// Returns false when the mechanism is unavailable, in which case
	/// nothing was sent.
	fn beacon(&self, url: &Url, body: String) -> bool;

	/// Sends without waiting; failures are logged and dropped.
	fn dispatch(&self, request: OutboundRequest);

	/// Sends and waits for the response. Succeeds on a 2xx status.
	async fn send(&self, request: OutboundRequest) -> Result<()>;
}

/// Shared handle to a transport.
pub type SharedTransport = Arc<dyn Transport>;

/// Configuration for the HTTP transport.
#[derive(Debug, Clone)]
pub struct TransportConfig {
	/// Timeout for HTTP requests.
	pub request_timeout: Duration,
	/// Whether the beacon mechanism is offered at all.
	pub beacon_enabled: bool,
	/// User-Agent override, for hosts forwarding on behalf of a visitor.
	pub user_agent: Option<String>,
}

impl Default for TransportConfig {
	fn default() -> Self {
		Self {
			request_timeout: Duration::from_secs(10),
			beacon_enabled: true,
			user_agent: None,
		}
	}
}

/// reqwest-backed transport.
#[derive(Debug, Clone)]
pub struct HttpTransport {
	client: Client,
	beacon_enabled: bool,
}

impl HttpTransport {
	pub fn new(config: TransportConfig) -> Result<Self> {
		let builder = match &config.user_agent {
			Some(ua) => pirsch_common_http::builder_with_user_agent(ua.clone()),
			None => pirsch_common_http::builder(),
		};
		let client = builder
			.timeout(config.request_timeout)
			.build()
			.map_err(BeaconError::RequestFailed)?;

		Ok(Self {
			client,
			beacon_enabled: config.beacon_enabled,
		})
	}

	fn spawn(&self, request: OutboundRequest, mechanism: &'static str) -> bool {
		let Ok(handle) = Handle::try_current() else {
			warn!(mechanism, url = %request.url, "No async runtime available, dropping request");
			return false;
		};

		let client = self.client.clone();
		handle.spawn(async move {
			let url = request.url.clone();
			if let Err(e) = execute(&client, request).await {
				debug!(mechanism, url = %url, error = %e, "Fire-and-forget request failed");
			}
		});
		true
	}
}

#[async_trait]
impl Transport for HttpTransport {
	fn beacon(&self, url: &Url, body: String) -> bool {
		if !self.beacon_enabled {
			return false;
		}
		self.spawn(OutboundRequest::text(url.clone(), body), "beacon")
	}

	fn dispatch(&self, request: OutboundRequest) {
		self.spawn(request, "dispatch");
	}

	async fn send(&self, request: OutboundRequest) -> Result<()> {
		execute(&self.client, request).await
	}
}

async fn execute(client: &Client, request: OutboundRequest) -> Result<()> {
	debug!(method = %request.method, url = %request.url, "Sending report");

	let mut builder = client.request(request.method, request.url);
	if let Some(content_type) = request.content_type {
		builder = builder.header(CONTENT_TYPE, content_type);
	}
	if let Some(body) = request.body {
		builder = builder.body(body);
	}

	let response = builder.send().await?;
	let status = response.status();
	if !status.is_success() {
		return Err(BeaconError::ServerError {
			status: status.as_u16(),
			message: status.canonical_reason().unwrap_or("unknown status").to_string(),
		});
	}

	Ok(())
}
