// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Type definitions for access-decision evaluation.
//!
//! This module defines the per-request inputs and the output of the engine:
//!
//! - [`CallerIdentity`]: who is asking (authentication state and primary role)
//! - [`RequestDescriptor`]: what is being asked for (normalized path and classification)
//! - [`AccessDecision`]: what the host must do (serve, redirect, or suppress admin UI)
//!
//! # Design Principles
//!
//! 1. **Immutable evaluation**: All attributes are computed by the host before evaluation
//! 2. **No lookups**: The engine never consults a user store or session; everything is pre-loaded
//! 3. **Serializable**: All types can be logged/audited as JSON

use http::StatusCode;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::path::normalize_path;

// =============================================================================
// Roles
// =============================================================================

/// Opaque identifier for an authorization role (e.g. `subscriber`, `editor`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleId(String);

impl RoleId {
	/// Create a role identifier.
	pub fn new(id: impl Into<String>) -> Self {
		Self(id.into())
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}

	pub fn is_empty(&self) -> bool {
		self.0.trim().is_empty()
	}
}

impl fmt::Display for RoleId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

impl From<&str> for RoleId {
	fn from(id: &str) -> Self {
		Self(id.to_string())
	}
}

impl From<String> for RoleId {
	fn from(id: String) -> Self {
		Self(id)
	}
}

/// The engine's four-way classification of a caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleClass {
	/// No logged-in caller.
	Unauthenticated,
	/// Logged in with a role listed as restricted.
	Restricted,
	/// Logged in with a role listed as exempt.
	Exempt,
	/// Logged in with an unlisted role, or with no role at all.
	Unknown,
}

impl RoleClass {
	/// Returns true for classes that the role-gated decisions turn away.
	///
	/// `Unknown` fails closed and behaves exactly like `Restricted`.
	pub fn is_restricted(&self) -> bool {
		matches!(self, RoleClass::Restricted | RoleClass::Unknown)
	}
}

impl fmt::Display for RoleClass {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			RoleClass::Unauthenticated => write!(f, "unauthenticated"),
			RoleClass::Restricted => write!(f, "restricted"),
			RoleClass::Exempt => write!(f, "exempt"),
			RoleClass::Unknown => write!(f, "unknown"),
		}
	}
}

// =============================================================================
// Caller identity
// =============================================================================

/// Snapshot of the caller, supplied by the host's identity provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallerIdentity {
	pub is_authenticated: bool,
	/// Primary role. Only meaningful when authenticated.
	pub role: Option<RoleId>,
}

impl CallerIdentity {
	/// An anonymous caller.
	pub fn anonymous() -> Self {
		Self {
			is_authenticated: false,
			role: None,
		}
	}

	/// A logged-in caller holding `role`.
	pub fn authenticated(role: impl Into<RoleId>) -> Self {
		Self {
			is_authenticated: true,
			role: Some(role.into()),
		}
	}

	/// A logged-in caller whose role could not be determined.
	pub fn authenticated_without_role() -> Self {
		Self {
			is_authenticated: true,
			role: None,
		}
	}

	/// A logged-in caller holding several roles. The first role wins.
	pub fn with_roles<I, R>(roles: I) -> Self
	where
		I: IntoIterator<Item = R>,
		R: Into<RoleId>,
	{
		Self {
			is_authenticated: true,
			role: roles.into_iter().next().map(Into::into),
		}
	}
}

// =============================================================================
// Resource classification
// =============================================================================

/// Attributes of a single post (any post type, including custom ones).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostAttrs {
	pub post_type: String,
	#[serde(default)]
	pub categories: Vec<String>,
	#[serde(default)]
	pub tags: Vec<String>,
	#[serde(default)]
	pub taxonomies: Vec<String>,
}

impl PostAttrs {
	pub fn new(post_type: impl Into<String>) -> Self {
		Self {
			post_type: post_type.into(),
			categories: Vec::new(),
			tags: Vec::new(),
			taxonomies: Vec::new(),
		}
	}

	/// Builder: add a category.
	pub fn with_category(mut self, category: impl Into<String>) -> Self {
		self.categories.push(category.into());
		self
	}

	/// Builder: add a tag.
	pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
		self.tags.push(tag.into());
		self
	}

	/// Builder: add a taxonomy the post is filed under.
	pub fn with_taxonomy(mut self, taxonomy: impl Into<String>) -> Self {
		self.taxonomies.push(taxonomy.into());
		self
	}
}

/// Listing pages that aggregate posts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "name", rename_all = "snake_case")]
pub enum ArchiveKind {
	PostType(String),
	Category(String),
	Tag(String),
	Taxonomy(String),
}

/// How the host classified the requested resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResourceClassification {
	Post(PostAttrs),
	/// A fixed page, identified by its path.
	Page { path: String },
	Archive(ArchiveKind),
	/// The administrative back office. Always bypasses the content gate.
	AdminSurface,
	/// A preview render. Always bypasses the content gate.
	PreviewSurface,
	Other,
}

impl ResourceClassification {
	/// Returns true for surfaces that bypass the content gate entirely.
	pub fn is_bypass_surface(&self) -> bool {
		matches!(
			self,
			ResourceClassification::AdminSurface | ResourceClassification::PreviewSurface
		)
	}
}

/// The current request as seen by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestDescriptor {
	/// Request path without query string or fragment.
	pub path: String,
	pub resource: ResourceClassification,
}

impl RequestDescriptor {
	/// Creates a descriptor, normalizing `path`.
	pub fn new(path: &str, resource: ResourceClassification) -> Self {
		Self {
			path: normalize_path(path),
			resource,
		}
	}

	/// A fixed page; the page path and request path are the same.
	pub fn page(path: &str) -> Self {
		let path = normalize_path(path);
		Self {
			resource: ResourceClassification::Page { path: path.clone() },
			path,
		}
	}

	pub fn post(path: &str, post: PostAttrs) -> Self {
		Self::new(path, ResourceClassification::Post(post))
	}

	pub fn archive(path: &str, kind: ArchiveKind) -> Self {
		Self::new(path, ResourceClassification::Archive(kind))
	}

	pub fn admin(path: &str) -> Self {
		Self::new(path, ResourceClassification::AdminSurface)
	}

	pub fn preview(path: &str) -> Self {
		Self::new(path, ResourceClassification::PreviewSurface)
	}

	pub fn other(path: &str) -> Self {
		Self::new(path, ResourceClassification::Other)
	}
}

// =============================================================================
// Decisions
// =============================================================================

/// What the host must do with the current request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum AccessDecision {
	/// Proceed normally.
	Allow,
	/// Redirect and stop processing the request.
	RedirectTo {
		location: String,
		#[serde(with = "status_code")]
		status: StatusCode,
	},
	/// Proceed, but omit administrative UI from the response.
	SuppressAdminChrome,
}

impl AccessDecision {
	/// A `302 Found` redirect to `location`.
	pub fn redirect_found(location: impl Into<String>) -> Self {
		AccessDecision::RedirectTo {
			location: location.into(),
			status: StatusCode::FOUND,
		}
	}

	pub fn is_allowed(&self) -> bool {
		matches!(self, AccessDecision::Allow)
	}

	pub fn is_redirect(&self) -> bool {
		matches!(self, AccessDecision::RedirectTo { .. })
	}

	pub fn suppresses_admin_chrome(&self) -> bool {
		matches!(self, AccessDecision::SuppressAdminChrome)
	}

	/// Redirect target, if this is a redirect.
	pub fn location(&self) -> Option<&str> {
		match self {
			AccessDecision::RedirectTo { location, .. } => Some(location),
			_ => None,
		}
	}
}

impl fmt::Display for AccessDecision {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			AccessDecision::Allow => write!(f, "allow"),
			AccessDecision::RedirectTo { location, status } => {
				write!(f, "redirect {} {location}", status.as_u16())
			}
			AccessDecision::SuppressAdminChrome => write!(f, "suppress_admin_chrome"),
		}
	}
}

mod status_code {
	use http::StatusCode;
	use serde::{de::Error, Deserialize, Deserializer, Serializer};

	pub fn serialize<S: Serializer>(status: &StatusCode, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.serialize_u16(status.as_u16())
	}

	pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<StatusCode, D::Error> {
		let code = u16::deserialize(deserializer)?;
		StatusCode::from_u16(code).map_err(D::Error::custom)
	}
}
