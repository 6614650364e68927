// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The page the beacon is embedded in.
//!
//! [`Page`] is the seam between the beacon and its host: a browser binding,
//! a server forwarding hits for a client, or a test. Every browser API the
//! beacon reads is optional so that a host lacking one degrades to "not
//! opted out" rather than failing.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::attributes::ScriptAttributes;

/// Screen resolution in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenSize {
	pub width: u32,
	pub height: u32,
}

impl ScreenSize {
	pub fn new(width: u32, height: u32) -> Self {
		Self { width, height }
	}
}

/// Read access to the current page and browser state.
pub trait Page: Send + Sync {
	/// Full location, including query string and fragment.
	fn href(&self) -> String;

	/// Path component of the location.
	fn pathname(&self) -> String {
		pathname_of(&self.href())
	}

	fn title(&self) -> String;

	fn referrer(&self) -> String;

	/// Screen resolution, if the host exposes one.
	fn screen(&self) -> Option<ScreenSize>;

	/// Raw do-not-track signal, `None` when the host has no such API.
	fn do_not_track(&self) -> Option<String> {
		None
	}

	/// Value persisted under `key` in the local key-value store.
	fn stored_item(&self, _key: &str) -> Option<String> {
		None
	}

	/// Whether the document body exists yet.
	fn body_ready(&self) -> bool {
		true
	}

	/// Attributes of the script element with the given id.
	fn script(&self, id: &str) -> Option<ScriptAttributes>;
}

/// Extracts the path from a location, falling back to the text before any
/// query or fragment when the location is not an absolute URL.
pub fn pathname_of(href: &str) -> String {
	match Url::parse(href) {
		Ok(url) => url.path().to_string(),
		Err(_) => href
			.split(['?', '#'])
			.next()
			.unwrap_or_default()
			.to_string(),
	}
}

fn default_true() -> bool {
	true
}

/// A plain description of a page, loadable from TOML or JSON.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSnapshot {
	pub url: String,
	#[serde(default)]
	pub title: String,
	#[serde(default)]
	pub referrer: String,
	#[serde(default)]
	pub screen: Option<ScreenSize>,
	#[serde(default)]
	pub do_not_track: Option<String>,
	/// Persisted key-value store.
	#[serde(default)]
	pub storage: BTreeMap<String, String>,
	#[serde(default = "default_true")]
	pub body_ready: bool,
	/// Script elements by id.
	#[serde(default)]
	pub scripts: BTreeMap<String, ScriptAttributes>,
}

impl PageSnapshot {
	pub fn new(url: impl Into<String>) -> Self {
		Self {
			url: url.into(),
			body_ready: true,
			..Self::default()
		}
	}

	pub fn with_title(mut self, title: impl Into<String>) -> Self {
		self.title = title.into();
		self
	}

	pub fn with_referrer(mut self, referrer: impl Into<String>) -> Self {
		self.referrer = referrer.into();
		self
	}

	pub fn with_screen(mut self, width: u32, height: u32) -> Self {
		self.screen = Some(ScreenSize::new(width, height));
		self
	}

	pub fn with_do_not_track(mut self, value: impl Into<String>) -> Self {
		self.do_not_track = Some(value.into());
		self
	}

	pub fn with_stored_item(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.storage.insert(key.into(), value.into());
		self
	}

	pub fn with_body_ready(mut self, ready: bool) -> Self {
		self.body_ready = ready;
		self
	}

	pub fn with_script(mut self, id: impl Into<String>, attributes: ScriptAttributes) -> Self {
		self.scripts.insert(id.into(), attributes);
		self
	}
}

impl Page for PageSnapshot {
	fn href(&self) -> String {
		self.url.clone()
	}

	fn title(&self) -> String {
		self.title.clone()
	}

	fn referrer(&self) -> String {
		self.referrer.clone()
	}

	fn screen(&self) -> Option<ScreenSize> {
		self.screen
	}

	fn do_not_track(&self) -> Option<String> {
		self.do_not_track.clone()
	}

	fn stored_item(&self, key: &str) -> Option<String> {
		self.storage.get(key).cloned()
	}

	fn body_ready(&self) -> bool {
		self.body_ready
	}

	fn script(&self, id: &str) -> Option<ScriptAttributes> {
		self.scripts.get(id).cloned()
	}
}

/// A page whose location and title change as the app navigates.
///
/// Clones share the same underlying state.
#[derive(Debug, Clone, Default)]
pub struct SharedPage {
	inner: Arc<RwLock<PageSnapshot>>,
}

impl SharedPage {
	pub fn new(snapshot: PageSnapshot) -> Self {
		Self {
			inner: Arc::new(RwLock::new(snapshot)),
		}
	}

	/// Moves to `url`, resolved against the current location.
	pub fn navigate(&self, url: &str) {
		let mut page = self.inner.write();
		let next = Url::parse(&page.url)
			.and_then(|base| base.join(url))
			.map(String::from)
			.unwrap_or_else(|_| url.to_string());
		page.url = next;
	}

	pub fn set_title(&self, title: impl Into<String>) {
		self.inner.write().title = title.into();
	}

	pub fn set_body_ready(&self, ready: bool) {
		self.inner.write().body_ready = ready;
	}

	pub fn set_stored_item(&self, key: impl Into<String>, value: impl Into<String>) {
		self.inner.write().storage.insert(key.into(), value.into());
	}

	/// Replaces the attributes of the script element with the given id.
	pub fn set_script(&self, id: impl Into<String>, attributes: ScriptAttributes) {
		self.inner.write().scripts.insert(id.into(), attributes);
	}

	pub fn snapshot(&self) -> PageSnapshot {
		self.inner.read().clone()
	}
}

impl From<PageSnapshot> for SharedPage {
	fn from(snapshot: PageSnapshot) -> Self {
		Self::new(snapshot)
	}
}

impl Page for SharedPage {
	fn href(&self) -> String {
		self.inner.read().href()
	}

	fn title(&self) -> String {
		self.inner.read().title()
	}

	fn referrer(&self) -> String {
		self.inner.read().referrer()
	}

	fn screen(&self) -> Option<ScreenSize> {
		self.inner.read().screen()
	}

	fn do_not_track(&self) -> Option<String> {
		self.inner.read().do_not_track()
	}

	fn stored_item(&self, key: &str) -> Option<String> {
		self.inner.read().stored_item(key)
	}

	fn body_ready(&self) -> bool {
		self.inner.read().body_ready()
	}

	fn script(&self, id: &str) -> Option<ScriptAttributes> {
		self.inner.read().script(id)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_pathname_of_absolute_url() {
		assert_eq!(pathname_of("https://example.com/blog/post-1?a=b#top"), "/blog/post-1");
		assert_eq!(pathname_of("https://example.com"), "/");
	}

	#[test]
	fn test_pathname_of_relative_location() {
		assert_eq!(pathname_of("/about?x=1"), "/about");
		assert_eq!(pathname_of("/about#team"), "/about");
	}

	#[test]
	fn test_snapshot_defaults_from_toml() {
		let snapshot: PageSnapshot = toml::from_str(r#"url = "https://example.com/""#).unwrap();
		assert!(snapshot.body_ready);
		assert!(snapshot.screen.is_none());
		assert!(snapshot.do_not_track.is_none());
		assert!(snapshot.scripts.is_empty());
	}

	#[test]
	fn test_snapshot_scripts_from_toml() {
		let snapshot: PageSnapshot = toml::from_str(
			r#"
url = "https://example.com/"
screen = { width = 1920, height = 1080 }

[scripts.pirschjs]
"data-endpoint" = "/stats/hit"
"data-disable-query" = ""
"#,
		)
		.unwrap();

		let script = snapshot.script("pirschjs").unwrap();
		assert_eq!(script.get("data-endpoint"), Some("/stats/hit"));
		assert!(script.has("data-disable-query"));
		assert_eq!(snapshot.screen, Some(ScreenSize::new(1920, 1080)));
	}

	#[test]
	fn test_shared_page_navigate_resolves_relative() {
		let page = SharedPage::new(PageSnapshot::new("https://example.com/blog/"));
		page.navigate("/about?tab=team");
		assert_eq!(page.href(), "https://example.com/about?tab=team");
		assert_eq!(page.pathname(), "/about");
	}

	#[test]
	fn test_shared_page_clones_share_state() {
		let page = SharedPage::new(PageSnapshot::new("https://example.com/"));
		let other = page.clone();
		other.set_title("Pricing");
		other.navigate("https://example.com/pricing");
		assert_eq!(page.title(), "Pricing");
		assert_eq!(page.pathname(), "/pricing");
	}

	#[test]
	fn test_shared_page_setters() {
		let page = SharedPage::new(PageSnapshot::new("https://example.com/"));
		page.set_body_ready(false);
		page.set_stored_item("disable_pirsch", "1");
		page.set_script("pirschjs", ScriptAttributes::new().with("data-exclude", "^/admin"));

		assert!(!page.body_ready());
		assert_eq!(page.stored_item("disable_pirsch").as_deref(), Some("1"));
		assert_eq!(
			page.script("pirschjs").and_then(|s| s.get("data-exclude").map(str::to_string)),
			Some("^/admin".to_string())
		);

		let snapshot = page.snapshot();
		page.navigate("/pricing");
		assert_eq!(snapshot.url, "https://example.com/");
		assert_eq!(page.href(), "https://example.com/pricing");
	}

	#[test]
	fn test_page_without_browser_apis() {
		let page = PageSnapshot::new("https://example.com/");
		assert!(page.do_not_track().is_none());
		assert!(page.stored_item("disable_pirsch").is_none());
		assert!(page.script("pirschjs").is_none());
	}
}
