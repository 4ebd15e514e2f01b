// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Request path normalization.
//!
//! Protected paths are compared by exact string equality, so both sides of the
//! comparison go through [`normalize_path`] first.

/// Strips the query string and fragment from a request path.
///
/// An empty result becomes `/`. No other rewriting is done: trailing slashes,
/// case and percent-encoding are preserved, so `/test` and `/test/` stay distinct.
pub fn normalize_path(raw: &str) -> String {
	let end = raw.find(['?', '#']).unwrap_or(raw.len());
	let path = raw[..end].trim();

	if path.is_empty() {
		"/".to_string()
	} else {
		path.to_string()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	#[test]
	fn strips_query() {
		assert_eq!(normalize_path("/test/?x=1"), "/test/");
	}

	#[test]
	fn strips_fragment() {
		assert_eq!(normalize_path("/test/#top"), "/test/");
		assert_eq!(normalize_path("/test/?a=b#top"), "/test/");
	}

	#[test]
	fn empty_becomes_root() {
		assert_eq!(normalize_path(""), "/");
		assert_eq!(normalize_path("?x=1"), "/");
	}

	#[test]
	fn trailing_slash_is_significant() {
		assert_ne!(normalize_path("/test"), normalize_path("/test/"));
	}

	proptest! {
		#[test]
		fn normalization_is_idempotent(raw in "[/a-z0-9?#=&_-]{0,40}") {
			let once = normalize_path(&raw);
			prop_assert_eq!(normalize_path(&once), once.clone());
		}

		#[test]
		fn query_never_survives(path in "/[a-z0-9/_-]{0,20}", query in "[a-z0-9=&]{0,20}") {
			let normalized = normalize_path(&format!("{path}?{query}"));
			prop_assert!(!normalized.contains('?'));
			prop_assert_eq!(normalized, normalize_path(&path));
		}
	}
}
