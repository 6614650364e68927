// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Metadata attached to custom events.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

/// A builder for custom event metadata.
///
/// Values may be any JSON value; they are flattened to strings when the
/// event record is built, since the collector only accepts string metadata.
///
/// # Example
///
/// ```
/// use pirsch_beacon_core::EventMeta;
///
/// let meta = EventMeta::new()
///     .insert("plan", "pro")
///     .insert("seats", 5)
///     .insert("trial", false);
///
/// let strings = meta.into_strings();
/// assert_eq!(strings["seats"], "5");
/// assert_eq!(strings["trial"], "false");
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventMeta {
	inner: Map<String, Value>,
}

impl EventMeta {
	pub fn new() -> Self {
		Self { inner: Map::new() }
	}

	/// Inserts a key-value pair.
	pub fn insert<K, V>(mut self, key: K, value: V) -> Self
	where
		K: Into<String>,
		V: Into<Value>,
	{
		self.inner.insert(key.into(), value.into());
		self
	}

	/// Merges another set of metadata into this one; `other` wins on
	/// conflicting keys.
	pub fn merge(mut self, other: EventMeta) -> Self {
		for (k, v) in other.inner {
			self.inner.insert(k, v);
		}
		self
	}

	pub fn is_empty(&self) -> bool {
		self.inner.is_empty()
	}

	pub fn len(&self) -> usize {
		self.inner.len()
	}

	pub fn get(&self, key: &str) -> Option<&Value> {
		self.inner.get(key)
	}

	/// Coerces every value to a string, keeping keys as given.
	pub fn into_strings(self) -> BTreeMap<String, String> {
		self
			.inner
			.into_iter()
			.map(|(k, v)| (k, coerce_to_string(&v)))
			.collect()
	}
}

/// Renders a JSON value as metadata text.
///
/// Strings pass through unchanged, scalars use their textual form, and
/// arrays or objects become compact JSON.
pub fn coerce_to_string(value: &Value) -> String {
	match value {
		Value::String(s) => s.clone(),
		Value::Null => "null".to_string(),
		Value::Bool(b) => b.to_string(),
		Value::Number(n) => n.to_string(),
		Value::Array(_) | Value::Object(_) => value.to_string(),
	}
}

impl From<Value> for EventMeta {
	fn from(value: Value) -> Self {
		match value {
			Value::Object(map) => Self { inner: map },
			_ => Self::new(),
		}
	}
}

impl From<Map<String, Value>> for EventMeta {
	fn from(map: Map<String, Value>) -> Self {
		Self { inner: map }
	}
}

impl<K, V> FromIterator<(K, V)> for EventMeta
where
	K: Into<String>,
	V: Into<Value>,
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
