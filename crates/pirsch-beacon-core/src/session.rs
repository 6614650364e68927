// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Keep-alive targets for the session variant.

use tracing::warn;
use url::Url;

use crate::config::BeaconConfig;
use crate::page::Page;
use crate::payload::truncate_url;

/// One keep-alive request, before the cache-busting timestamp is added.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionPing {
	pub client_id: String,
	pub url: String,
}

impl SessionPing {
	/// Query parameters of a keep-alive, `nc` first.
	pub fn query_pairs(&self, nc: i64) -> Vec<(&'static str, String)> {
		vec![
			("nc", nc.to_string()),
			("client_id", self.client_id.clone()),
			("url", self.url.clone()),
		]
	}
}

/// Replaces the host of `href`. `None` when the location cannot carry a host
/// or `host` is not a valid hostname.
pub fn rewrite_host(href: &str, host: &str) -> Option<String> {
	let mut url = Url::parse(href).ok()?;
	url.set_host(Some(host)).ok()?;
	Some(url.into())
}

/// The pings sent on every tick: the page itself (host rewritten when a dev
/// hostname is configured) followed by one per additional domain.
///
/// A domain that cannot be put into the page URL is skipped. A dev hostname
/// that cannot be applied leaves the primary URL as it is.
pub fn session_pings(config: &BeaconConfig, page: &dyn Page) -> Vec<SessionPing> {
	let href = page.href();
	let primary = match &config.dev_rewrite {
		Some(host) => rewrite_host(&href, host).unwrap_or_else(|| {
			warn!(host = %host, "Cannot apply dev hostname, keeping page URL");
			href.clone()
		}),
		None => href.clone(),
	};

	let domains = config.domains.iter().filter_map(|domain| {
		let url = rewrite_host(&href, domain);
		if url.is_none() {
			warn!(domain = %domain, "Skipping session keep-alive for invalid domain");
		}
		url
	});

	std::iter::once(primary)
		.chain(domains)
		.map(|url| SessionPing {
			client_id: config.client_id.clone(),
			url: truncate_url(&url),
		})
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::attributes::{ScriptAttributes, ATTR_CLIENT_ID, ATTR_DEV, ATTR_DOMAIN};
	use crate::config::Variant;
	use crate::page::PageSnapshot;
	use crate::payload::MAX_URL_LENGTH;

	fn config(attrs: ScriptAttributes) -> BeaconConfig {
		BeaconConfig::from_attributes(Variant::Sessions, &attrs)
	}

	#[test]
	fn test_primary_only() {
		let page = PageSnapshot::new("https://example.com/app?x=1");
		let pings = session_pings(&config(ScriptAttributes::new()), &page);
		assert_eq!(
			pings,
			vec![SessionPing {
				client_id: "0".to_string(),
				url: "https://example.com/app?x=1".to_string(),
			}]
		);
	}

	#[test]
	fn test_primary_plus_domains() {
		let page = PageSnapshot::new("https://example.com/app");
		let cfg = config(
			ScriptAttributes::new()
				.with(ATTR_CLIENT_ID, "7")
				.with(ATTR_DOMAIN, "one.example.org,two.example.org"),
		);
		let urls: Vec<_> = session_pings(&cfg, &page).into_iter().map(|p| p.url).collect();
		assert_eq!(
			urls,
			vec![
				"https://example.com/app",
				"https://one.example.org/app",
				"https://two.example.org/app",
			]
		);
	}

	#[test]
	fn test_dev_rewrite_applies_to_primary() {
		let page = PageSnapshot::new("http://localhost:3000/dashboard");
		let cfg = config(ScriptAttributes::new().with(ATTR_DEV, "example.com"));
		let pings = session_pings(&cfg, &page);
		assert_eq!(pings[0].url, "http://example.com:3000/dashboard");
	}

	#[test]
	fn test_rewrite_host_rejects_unusable_input() {
		assert_eq!(rewrite_host("/relative/path", "example.com"), None);
		assert_eq!(rewrite_host("https://example.com/", "bad host"), None);
		assert_eq!(
			rewrite_host("https://example.com/x?y=1", "a.example.org").as_deref(),
			Some("https://a.example.org/x?y=1")
		);
	}

	#[test]
	fn test_invalid_domain_is_skipped() {
		let page = PageSnapshot::new("https://example.com/app");
		let cfg = config(
			ScriptAttributes::new().with(ATTR_DOMAIN, "bad host,b.example.org"),
		);
		let urls: Vec<_> = session_pings(&cfg, &page).into_iter().map(|p| p.url).collect();
		assert_eq!(urls, vec!["https://example.com/app", "https://b.example.org/app"]);
	}

	#[test]
	fn test_invalid_dev_hostname_keeps_primary() {
		let page = PageSnapshot::new("https://example.com/app");
		let cfg = config(ScriptAttributes::new().with(ATTR_DEV, "bad host"));
		let pings = session_pings(&cfg, &page);
		assert_eq!(pings.len(), 1);
		assert_eq!(pings[0].url, "https://example.com/app");
	}

	#[test]
	fn test_ping_urls_are_truncated() {
		let page = PageSnapshot::new(format!("https://example.com/{}", "p".repeat(3000)));
		let pings = session_pings(&config(ScriptAttributes::new()), &page);
		assert_eq!(pings[0].url.chars().count(), MAX_URL_LENGTH);
	}

	#[test]
	fn test_query_pairs_order() {
		let ping = SessionPing {
			client_id: "7".to_string(),
			url: "https://example.com/".to_string(),
		};
		assert_eq!(
			ping.query_pairs(99),
			vec![
				("nc", "99".to_string()),
				("client_id", "7".to_string()),
				("url", "https://example.com/".to_string()),
			]
		);
	}
}
