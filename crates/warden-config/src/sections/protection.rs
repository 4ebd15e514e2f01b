// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Protection configuration section.
//!
//! Any list left unset keeps its built-in default; a list set to `[]` clears it.

use serde::{Deserialize, Serialize};
use warden_policy::{ProtectionConfig, RoleId};

use crate::error::ConfigError;

/// Protection configuration layer (partial, for merging).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ProtectionConfigLayer {
	#[serde(default)]
	pub login_path: Option<String>,
	#[serde(default)]
	pub home_url: Option<String>,
	#[serde(default)]
	pub exempt_roles: Option<Vec<String>>,
	#[serde(default)]
	pub restricted_roles: Option<Vec<String>>,
	#[serde(default)]
	pub protected_post_types: Option<Vec<String>>,
	#[serde(default)]
	pub protected_categories: Option<Vec<String>>,
	#[serde(default)]
	pub protected_tags: Option<Vec<String>>,
	#[serde(default)]
	pub protected_custom_types: Option<Vec<String>>,
	#[serde(default)]
	pub protected_taxonomies: Option<Vec<String>>,
	#[serde(default)]
	pub protected_paths: Option<Vec<String>>,
}

impl ProtectionConfigLayer {
	pub fn merge(&mut self, other: Self) {
		if other.login_path.is_some() {
			self.login_path = other.login_path;
		}
		if other.home_url.is_some() {
			self.home_url = other.home_url;
		}
		if other.exempt_roles.is_some() {
			self.exempt_roles = other.exempt_roles;
		}
		if other.restricted_roles.is_some() {
			self.restricted_roles = other.restricted_roles;
		}
		if other.protected_post_types.is_some() {
			self.protected_post_types = other.protected_post_types;
		}
		if other.protected_categories.is_some() {
			self.protected_categories = other.protected_categories;
		}
		if other.protected_tags.is_some() {
			self.protected_tags = other.protected_tags;
		}
		if other.protected_custom_types.is_some() {
			self.protected_custom_types = other.protected_custom_types;
		}
		if other.protected_taxonomies.is_some() {
			self.protected_taxonomies = other.protected_taxonomies;
		}
		if other.protected_paths.is_some() {
			self.protected_paths = other.protected_paths;
		}
	}

	/// Resolves against the defaults, then normalizes and validates.
	pub fn finalize(self) -> Result<ProtectionConfig, ConfigError> {
		let defaults = ProtectionConfig::default();

		let config = ProtectionConfig {
			login_path: self.login_path.unwrap_or(defaults.login_path),
			home_url: self.home_url.unwrap_or(defaults.home_url),
			exempt_roles: self
				.exempt_roles
				.map(|roles| roles.into_iter().map(RoleId::from).collect())
				.unwrap_or(defaults.exempt_roles),
			restricted_roles: self
				.restricted_roles
				.map(|roles| roles.into_iter().map(RoleId::from).collect())
				.unwrap_or(defaults.restricted_roles),
			protected_post_types: resolve(self.protected_post_types, defaults.protected_post_types),
			protected_categories: resolve(self.protected_categories, defaults.protected_categories),
			protected_tags: resolve(self.protected_tags, defaults.protected_tags),
			protected_custom_types: resolve(
				self.protected_custom_types,
				defaults.protected_custom_types,
			),
			protected_taxonomies: resolve(self.protected_taxonomies, defaults.protected_taxonomies),
			protected_paths: resolve(self.protected_paths, defaults.protected_paths),
		};

		config.prepare().map_err(ConfigError::from)
	}
}

fn resolve<C>(layer: Option<Vec<String>>, default: C) -> C
where
	C: FromIterator<String>,
{
	match layer {
		Some(values) => values.into_iter().collect(),
		None => default,
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_finalize_defaults() {
		let config = ProtectionConfigLayer::default().finalize().unwrap();
		assert_eq!(config, ProtectionConfig::default());
	}

	#[test]
	fn test_finalize_with_values() {
		let layer = ProtectionConfigLayer {
			login_path: Some("/members/login/".to_string()),
			home_url: Some("https://example.com/".to_string()),
			protected_paths: Some(vec!["/members/?tab=1".to_string()]),
			protected_custom_types: Some(vec!["event".to_string()]),
			..Default::default()
		};
		let config = layer.finalize().unwrap();
		assert_eq!(config.login_path, "/members/login/");
		assert_eq!(config.home_url, "https://example.com");
		assert!(config.protected_paths.contains("/members/"));
		assert!(!config.protected_paths.contains("/test/"));
		assert!(config.protected_custom_types.contains("event"));
		assert!(config.protected_post_types.contains("post"));
	}

	#[test]
	fn test_empty_list_clears_default() {
		let layer = ProtectionConfigLayer {
			protected_paths: Some(vec![]),
			..Default::default()
		};
		let config = layer.finalize().unwrap();
		assert!(config.protected_paths.is_empty());
	}

	#[test]
	fn test_overlapping_roles_fail_validation() {
		let layer = ProtectionConfigLayer {
			exempt_roles: Some(vec!["subscriber".to_string()]),
			..Default::default()
		};
		let err = layer.finalize().unwrap_err();
		assert!(matches!(err, ConfigError::Validation(_)));
		assert!(err.to_string().contains("subscriber"));
	}

	#[test]
	fn test_empty_login_path_cannot_ungate_site_root() {
		let layer = ProtectionConfigLayer {
			login_path: Some(String::new()),
			protected_paths: Some(vec!["/".to_string()]),
			..Default::default()
		};
		let err = layer.finalize().unwrap_err();
		assert!(matches!(err, ConfigError::Validation(_)));
	}

	#[test]
	fn test_merge_overwrites() {
		let mut base = ProtectionConfigLayer {
			login_path: Some("/login/".to_string()),
			protected_tags: Some(vec!["tag".to_string()]),
			..Default::default()
		};
		let overlay = ProtectionConfigLayer {
			login_path: Some("/signin/".to_string()),
			..Default::default()
		};
		base.merge(overlay);
		assert_eq!(base.login_path, Some("/signin/".to_string()));
		assert_eq!(base.protected_tags, Some(vec!["tag".to_string()]));
	}

	#[test]
	fn test_deserialize_layer_partial() {
		let toml_str = r#"
login_path = "/signin/"
restricted_roles = ["subscriber", "customer"]
"#;
		let layer: ProtectionConfigLayer = toml::from_str(toml_str).unwrap();
		assert_eq!(layer.login_path, Some("/signin/".to_string()));
		assert_eq!(
			layer.restricted_roles,
			Some(vec!["subscriber".to_string(), "customer".to_string()])
		);
		assert!(layer.protected_paths.is_none());
	}

	#[test]
	fn test_deserialize_empty() {
		let layer: ProtectionConfigLayer = toml::from_str("").unwrap();
		assert_eq!(layer, ProtectionConfigLayer::default());
	}
}
