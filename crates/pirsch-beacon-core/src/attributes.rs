// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Declarative attributes of the embedding script element.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub const ATTR_ENDPOINT: &str = "data-endpoint";
pub const ATTR_INCLUDE: &str = "data-include";
pub const ATTR_EXCLUDE: &str = "data-exclude";
pub const ATTR_DISABLE_QUERY: &str = "data-disable-query";
pub const ATTR_DISABLE_REFERRER: &str = "data-disable-referrer";
pub const ATTR_DISABLE_RESOLUTION: &str = "data-disable-resolution";
pub const ATTR_CLIENT_ID: &str = "data-client-id";
pub const ATTR_DOMAIN: &str = "data-domain";
pub const ATTR_INTERVAL_MS: &str = "data-interval-ms";
pub const ATTR_DEV: &str = "data-dev";

/// Attribute set of a script element, keyed by attribute name.
///
/// Flag attributes such as `data-disable-query` only need to be present;
/// their value is ignored.
///
/// # Example
///
/// ```
/// use pirsch_beacon_core::ScriptAttributes;
///
/// let attrs = ScriptAttributes::new()
///     .with("data-endpoint", "https://example.com/pirsch/hit")
///     .with("data-exclude", "^/admin,^/internal")
///     .with_flag("data-disable-query");
///
/// assert!(attrs.has("data-disable-query"));
/// assert_eq!(attrs.list("data-exclude"), vec!["^/admin", "^/internal"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScriptAttributes {
	inner: BTreeMap<String, String>,
}

impl ScriptAttributes {
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets an attribute value (builder pattern).
	pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.insert(name, value);
		self
	}

	/// Sets a presence-only attribute (builder pattern).
	pub fn with_flag(self, name: impl Into<String>) -> Self {
		self.with(name, "")
	}

	pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
		self.inner.insert(name.into(), value.into());
	}

	/// Returns true if the attribute is present, whatever its value.
	pub fn has(&self, name: &str) -> bool {
		self.inner.contains_key(name)
	}

	/// Returns the raw attribute value.
	pub fn get(&self, name: &str) -> Option<&str> {
		self.inner.get(name).map(String::as_str)
	}

	/// Returns the attribute value, treating an empty value as absent.
	pub fn non_empty(&self, name: &str) -> Option<&str> {
		self.get(name).filter(|v| !v.is_empty())
	}

	/// Splits a comma-separated attribute into its trimmed, non-empty entries.
	pub fn list(&self, name: &str) -> Vec<String> {
		self
			.non_empty(name)
			.map(|v| {
				v.split(',')
					.map(str::trim)
					.filter(|entry| !entry.is_empty())
					.map(str::to_string)
					.collect()
			})
			.unwrap_or_default()
	}

	pub fn is_empty(&self) -> bool {
		self.inner.is_empty()
	}
}

impl<K, V> FromIterator<(K, V)> for ScriptAttributes
where
	K: Into<String>,
	V: Into<String>,
{
	fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
		Self {
			inner: iter
				.into_iter()
				.map(|(k, v)| (k.into(), v.into()))
				.collect(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_flag_attribute_is_present_with_empty_value() {
		let attrs = ScriptAttributes::new().with_flag(ATTR_DISABLE_REFERRER);
		assert!(attrs.has(ATTR_DISABLE_REFERRER));
		assert_eq!(attrs.get(ATTR_DISABLE_REFERRER), Some(""));
		assert_eq!(attrs.non_empty(ATTR_DISABLE_REFERRER), None);
	}

	#[test]
	fn test_missing_attribute() {
		let attrs = ScriptAttributes::new();
		assert!(!attrs.has(ATTR_ENDPOINT));
		assert!(attrs.get(ATTR_ENDPOINT).is_none());
		assert!(attrs.list(ATTR_DOMAIN).is_empty());
	}

	#[test]
	fn test_list_skips_stray_commas_and_whitespace() {
		let attrs = ScriptAttributes::new().with(ATTR_DOMAIN, " a.com,, b.com ,");
		assert_eq!(attrs.list(ATTR_DOMAIN), vec!["a.com", "b.com"]);
	}

	#[test]
	fn test_from_iterator() {
		let attrs: ScriptAttributes = [(ATTR_CLIENT_ID, "42"), (ATTR_DEV, "localhost")]
			.into_iter()
			.collect();
		assert_eq!(attrs.get(ATTR_CLIENT_ID), Some("42"));
		assert_eq!(attrs.get(ATTR_DEV), Some("localhost"));
	}
}
