// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Protection configuration consumed by the engine.
//!
//! A [`ProtectionConfig`] is built once at startup (usually by `warden-config`)
//! and never mutated afterwards. The engine holds it behind an `Arc` so any number
//! of concurrent evaluations can share it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::error::PolicyConfigError;
use crate::path::normalize_path;
use crate::types::RoleId;

pub const DEFAULT_LOGIN_PATH: &str = "/login/";

/// What is protected, who may see it, and where to send everyone else.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtectionConfig {
	pub login_path: String,
	/// Prefixed to `login_path` for content-gate redirects. Empty means relative.
	pub home_url: String,
	pub exempt_roles: BTreeSet<RoleId>,
	pub restricted_roles: BTreeSet<RoleId>,
	pub protected_post_types: BTreeSet<String>,
	pub protected_categories: BTreeSet<String>,
	pub protected_tags: BTreeSet<String>,
	pub protected_custom_types: BTreeSet<String>,
	pub protected_taxonomies: BTreeSet<String>,
	/// Normalized, matched by exact equality only.
	pub protected_paths: BTreeSet<String>,
}

impl Default for ProtectionConfig {
	fn default() -> Self {
		Self {
			login_path: DEFAULT_LOGIN_PATH.to_string(),
			home_url: String::new(),
			exempt_roles: roles(&["administrator", "editor"]),
			restricted_roles: roles(&["subscriber"]),
			protected_post_types: strings(&["post"]),
			protected_categories: strings(&["category"]),
			protected_tags: strings(&["tag"]),
			protected_custom_types: BTreeSet::new(),
			protected_taxonomies: BTreeSet::new(),
			protected_paths: strings(&["/test/"]),
		}
	}
}

impl ProtectionConfig {
	/// A configuration that protects nothing and exempts nobody.
	pub fn empty() -> Self {
		Self {
			login_path: DEFAULT_LOGIN_PATH.to_string(),
			home_url: String::new(),
			exempt_roles: BTreeSet::new(),
			restricted_roles: BTreeSet::new(),
			protected_post_types: BTreeSet::new(),
			protected_categories: BTreeSet::new(),
			protected_tags: BTreeSet::new(),
			protected_custom_types: BTreeSet::new(),
			protected_taxonomies: BTreeSet::new(),
			protected_paths: BTreeSet::new(),
		}
	}

	/// Normalizes paths and the home URL, then checks invariants.
	pub fn prepare(mut self) -> Result<Self, PolicyConfigError> {
		// Normalizing turns "" and "?x" into "/", so the raw value is checked first.
		if !self.login_path.trim().starts_with('/') {
			return Err(PolicyConfigError::InvalidLoginPath(self.login_path));
		}
		self.login_path = normalize_path(&self.login_path);
		self.home_url = self.home_url.trim().trim_end_matches('/').to_string();
		self.protected_paths = self
			.protected_paths
			.iter()
			.map(|p| normalize_path(p))
			.collect();
		self.validate()?;
		Ok(self)
	}

	/// Checks the invariants the engine relies on.
	pub fn validate(&self) -> Result<(), PolicyConfigError> {
		if !self.login_path.starts_with('/') {
			return Err(PolicyConfigError::InvalidLoginPath(self.login_path.clone()));
		}

		if self
			.exempt_roles
			.iter()
			.chain(self.restricted_roles.iter())
			.any(RoleId::is_empty)
		{
			return Err(PolicyConfigError::EmptyRoleId);
		}

		if let Some(role) = self.exempt_roles.intersection(&self.restricted_roles).next() {
			return Err(PolicyConfigError::OverlappingRole(role.clone()));
		}

		Ok(())
	}

	/// Absolute (or home-relative) redirect target for the content gate.
	pub fn login_url(&self) -> String {
		format!("{}{}", self.home_url, self.login_path)
	}

	/// Builder: set the login path.
	pub fn with_login_path(mut self, path: impl Into<String>) -> Self {
		self.login_path = path.into();
		self
	}

	/// Builder: set the home URL.
	pub fn with_home_url(mut self, url: impl Into<String>) -> Self {
		self.home_url = url.into();
		self
	}

	/// Builder: mark a role as exempt.
	pub fn with_exempt_role(mut self, role: impl Into<RoleId>) -> Self {
		self.exempt_roles.insert(role.into());
		self
	}

	/// Builder: mark a role as restricted.
	pub fn with_restricted_role(mut self, role: impl Into<RoleId>) -> Self {
		self.restricted_roles.insert(role.into());
		self
	}

	/// Builder: protect a post type.
	pub fn with_post_type(mut self, post_type: impl Into<String>) -> Self {
		self.protected_post_types.insert(post_type.into());
		self
	}

	/// Builder: protect a custom post type.
	pub fn with_custom_type(mut self, post_type: impl Into<String>) -> Self {
		self.protected_custom_types.insert(post_type.into());
		self
	}

	/// Builder: protect a category.
	pub fn with_category(mut self, category: impl Into<String>) -> Self {
		self.protected_categories.insert(category.into());
		self
	}

	/// Builder: protect a tag.
	pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
		self.protected_tags.insert(tag.into());
		self
	}

	/// Builder: protect a taxonomy.
	pub fn with_taxonomy(mut self, taxonomy: impl Into<String>) -> Self {
		self.protected_taxonomies.insert(taxonomy.into());
		self
	}

	/// Builder: protect a fixed path.
	pub fn with_path(mut self, path: &str) -> Self {
		self.protected_paths.insert(normalize_path(path));
		self
	}

	pub(crate) fn is_protected_post_type(&self, post_type: &str) -> bool {
		self.protected_post_types.contains(post_type)
			|| self.protected_custom_types.contains(post_type)
	}
}

fn roles(ids: &[&str]) -> BTreeSet<RoleId> {
	ids.iter().map(|id| RoleId::from(*id)).collect()
}

fn strings(values: &[&str]) -> BTreeSet<String> {
	values.iter().map(|v| v.to_string()).collect()
}
