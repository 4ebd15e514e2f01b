// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! HTTP adapters for hosts built on the `http` crate.
//!
//! This module provides:
//! - [`HttpRequestContext`] - a [`RequestContext`] built from request parts
//! - [`ResponseEnforcer`] - an [`Enforcer`] that turns redirects into responses
//!
//! # Flow
//!
//! ```text
//! Request parts ──► HttpRequestContext ──► engine.evaluate(..) ──► ResponseEnforcer
//!                                                                     │
//!                                             RedirectTo ─────────────┼──► 302 + Location
//!                                             Allow / Suppress ───────┴──► None (continue)
//! ```

use http::header::LOCATION;
use http::request::Parts;
use http::{Response, Uri};
use tracing::{debug, instrument};

use crate::lifecycle::{Enforcer, RequestContext};
use crate::path::normalize_path;
use crate::types::{AccessDecision, RequestDescriptor, ResourceClassification};

/// Normalized path of a request URI.
pub fn request_path(uri: &Uri) -> String {
	normalize_path(uri.path())
}

/// Request description assembled from HTTP request parts.
///
/// Classifying the resource (post, page, archive, admin...) requires knowledge of
/// the host's routing, so the host supplies it as a hint. For pages the page
/// path is always taken from the URI.
#[derive(Debug, Clone)]
pub struct HttpRequestContext {
	descriptor: RequestDescriptor,
}

impl HttpRequestContext {
	pub fn new(uri: &Uri, resource: ResourceClassification) -> Self {
		let path = request_path(uri);
		let resource = match resource {
			ResourceClassification::Page { .. } => ResourceClassification::Page {
				path: path.clone(),
			},
			other => other,
		};

		Self {
			descriptor: RequestDescriptor { path, resource },
		}
	}

	pub fn from_parts(parts: &Parts, resource: ResourceClassification) -> Self {
		Self::new(&parts.uri, resource)
	}

	/// Classifies the request as a page at its own path.
	pub fn page(parts: &Parts) -> Self {
		Self::from_parts(
			parts,
			ResourceClassification::Page {
				path: String::new(),
			},
		)
	}
}

impl RequestContext for HttpRequestContext {
	fn describe(&self) -> RequestDescriptor {
		self.descriptor.clone()
	}
}

/// Converts decisions into early HTTP responses.
///
/// Returns `Ok(None)` when the host should continue handling the request. Admin
/// chrome suppression is a rendering concern, so it also continues; the host checks
/// [`AccessDecision::suppresses_admin_chrome`] when rendering.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseEnforcer;

impl Enforcer for ResponseEnforcer {
	type Output = Result<Option<Response<()>>, http::Error>;

	#[instrument(level = "trace", skip_all)]
	fn apply(&self, decision: &AccessDecision) -> Self::Output {
		match decision {
			AccessDecision::RedirectTo { location, status } => {
				debug!(status = status.as_u16(), location = %location, "redirecting request");
				Response::builder()
					.status(*status)
					.header(LOCATION, location.as_str())
					.body(())
					.map(Some)
			}
			AccessDecision::Allow | AccessDecision::SuppressAdminChrome => Ok(None),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::engine::AccessPolicyEngine;
	use crate::lifecycle::LifecyclePoint;
	use crate::types::{CallerIdentity, PostAttrs};
	use http::{Request, StatusCode};

	fn parts(uri: &str) -> Parts {
		Request::builder()
			.uri(uri)
			.body(())
			.unwrap()
			.into_parts()
			.0
	}

	mod request_context {
		use super::*;

		#[test]
		fn page_path_comes_from_uri_without_query() {
			let context = HttpRequestContext::page(&parts("https://example.com/test/?x=1"));
			assert_eq!(context.describe(), RequestDescriptor::page("/test/"));
		}

		#[test]
		fn non_page_hint_is_preserved() {
			let context = HttpRequestContext::from_parts(
				&parts("/hello/?utm=1"),
				ResourceClassification::Post(PostAttrs::new("post")),
			);
			let descriptor = context.describe();
			assert_eq!(descriptor.path, "/hello/");
			assert_eq!(
				descriptor.resource,
				ResourceClassification::Post(PostAttrs::new("post"))
			);
		}

		#[test]
		fn bare_origin_is_root() {
			assert_eq!(request_path(&Uri::from_static("https://example.com")), "/");
		}
	}

	mod response_enforcer {
		use super::*;

		#[test]
		fn redirect_becomes_found_response() {
			let response = ResponseEnforcer
				.apply(&AccessDecision::redirect_found("https://example.com/login/"))
				.unwrap()
				.unwrap();

			assert_eq!(response.status(), StatusCode::FOUND);
			assert_eq!(
				response.headers().get(LOCATION).unwrap(),
				"https://example.com/login/"
			);
		}

		#[test]
		fn allow_continues() {
			assert!(ResponseEnforcer.apply(&AccessDecision::Allow).unwrap().is_none());
		}

		#[test]
		fn suppression_continues() {
			assert!(ResponseEnforcer
				.apply(&AccessDecision::SuppressAdminChrome)
				.unwrap()
				.is_none());
		}

		#[test]
		fn invalid_location_is_an_error() {
			let decision = AccessDecision::redirect_found("/login/\n");
			assert!(ResponseEnforcer.apply(&decision).is_err());
		}
	}

	#[test]
	fn anonymous_request_for_protected_page_is_redirected_end_to_end() {
		let engine = AccessPolicyEngine::default();
		let context = HttpRequestContext::page(&parts("/test/?ref=mail"));
		let decision = engine.evaluate(
			LifecyclePoint::ContentView,
			&CallerIdentity::anonymous(),
			&context,
		);

		let response = ResponseEnforcer.apply(&decision).unwrap().unwrap();
		assert_eq!(response.status(), StatusCode::FOUND);
		assert_eq!(response.headers().get(LOCATION).unwrap(), "/login/");
	}
}
