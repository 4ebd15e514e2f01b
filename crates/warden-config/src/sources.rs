// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sources: environment variables and TOML files.

use std::path::PathBuf;

use tracing::{debug, trace};

use crate::error::ConfigError;
use crate::layer::WardenConfigLayer;
use crate::sections::{LoggingConfigLayer, ProtectionConfigLayer};

/// Default location of the system-wide config file.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/warden/warden.toml";

/// Source precedence levels (higher = overrides lower).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
	Defaults = 10,
	ConfigFile = 20,
	Environment = 50,
}

/// Trait for configuration sources.
pub trait ConfigSource: Send + Sync {
	fn name(&self) -> &'static str;
	fn precedence(&self) -> Precedence;
	fn load(&self) -> Result<WardenConfigLayer, ConfigError>;
}

/// Built-in defaults source.
pub struct DefaultsSource;

impl ConfigSource for DefaultsSource {
	fn name(&self) -> &'static str {
		"defaults"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Defaults
	}

	fn load(&self) -> Result<WardenConfigLayer, ConfigError> {
		debug!("loading defaults");
		Ok(WardenConfigLayer::default())
	}
}

/// TOML file configuration source.
pub struct TomlSource {
	path: PathBuf,
}

impl TomlSource {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}

	pub fn system() -> Self {
		Self::new(SYSTEM_CONFIG_PATH)
	}
}

impl ConfigSource for TomlSource {
	fn name(&self) -> &'static str {
		"toml-config"
	}

	fn precedence(&self) -> Precedence {
		Precedence::ConfigFile
	}

	fn load(&self) -> Result<WardenConfigLayer, ConfigError> {
		if !self.path.exists() {
			debug!(path = %self.path.display(), "config file not found, skipping");
			return Ok(WardenConfigLayer::default());
		}

		debug!(path = %self.path.display(), "loading config file");
		let content = std::fs::read_to_string(&self.path).map_err(|e| ConfigError::FileRead {
			path: self.path.clone(),
			source: e,
		})?;

		let layer: WardenConfigLayer =
			toml::from_str(&content).map_err(|e| ConfigError::TomlParse {
				path: self.path.clone(),
				source: e,
			})?;

		trace!("parsed config layer from TOML");
		Ok(layer)
	}
}

/// Environment variable source.
///
/// Convention: `WARDEN_<FIELD>`; lists are comma separated. A blank scalar is
/// ignored, while a list variable that is set but blank clears that list.
pub struct EnvSource;

impl EnvSource {
	/// Builds a layer from an arbitrary variable lookup.
	pub fn load_with<F>(lookup: F) -> Result<WardenConfigLayer, ConfigError>
	where
		F: Fn(&str) -> Option<String>,
	{
		let var = |name: &str| lookup(name).filter(|s| !s.trim().is_empty());
		let list = |name: &str| lookup(name).map(|v| split_list(&v));

		let protection = ProtectionConfigLayer {
			login_path: var("WARDEN_LOGIN_PATH"),
			home_url: var("WARDEN_HOME_URL"),
			exempt_roles: list("WARDEN_EXEMPT_ROLES"),
			restricted_roles: list("WARDEN_RESTRICTED_ROLES"),
			protected_post_types: list("WARDEN_PROTECTED_POST_TYPES"),
			protected_categories: list("WARDEN_PROTECTED_CATEGORIES"),
			protected_tags: list("WARDEN_PROTECTED_TAGS"),
			protected_custom_types: list("WARDEN_PROTECTED_CUSTOM_TYPES"),
			protected_taxonomies: list("WARDEN_PROTECTED_TAXONOMIES"),
			protected_paths: list("WARDEN_PROTECTED_PATHS"),
		};

		let json = match var("WARDEN_LOG_JSON") {
			Some(v) => Some(parse_bool("WARDEN_LOG_JSON", &v)?),
			None => None,
		};

		let logging = LoggingConfigLayer {
			level: var("WARDEN_LOG_LEVEL"),
			json,
		};

		Ok(WardenConfigLayer {
			protection: Some(protection),
			logging: Some(logging),
		})
	}
}

impl ConfigSource for EnvSource {
	fn name(&self) -> &'static str {
		"environment"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Environment
	}

	fn load(&self) -> Result<WardenConfigLayer, ConfigError> {
		debug!("loading environment variables");
		Self::load_with(|name| std::env::var(name).ok())
	}
}

fn split_list(value: &str) -> Vec<String> {
	value
		.split(',')
		.map(|s| s.trim().to_string())
		.filter(|s| !s.is_empty())
		.collect()
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
	match value.trim().to_lowercase().as_str() {
		"1" | "true" | "yes" | "on" => Ok(true),
		"0" | "false" | "no" | "off" => Ok(false),
		_ => Err(ConfigError::InvalidValue {
			key: key.to_string(),
			message: format!("invalid bool value '{value}'"),
		}),
	}
}
