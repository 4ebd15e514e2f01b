// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Layered configuration for warden.
//!
//! Sources are merged lowest precedence first:
//!
//! ```text
//! defaults (10)  ->  TOML file (20)  ->  WARDEN_* environment (50)
//! ```
//!
//! The merged [`WardenConfigLayer`] is then finalized into a validated
//! [`WardenConfig`].

pub mod error;
pub mod layer;
pub mod sections;
pub mod sources;

use std::path::Path;

use serde::Serialize;
use tracing::{debug, info};
use warden_policy::ProtectionConfig;

pub use error::ConfigError;
pub use layer::WardenConfigLayer;
pub use sections::{LoggingConfig, LoggingConfigLayer, ProtectionConfigLayer};
pub use sources::{
	ConfigSource, DefaultsSource, EnvSource, Precedence, TomlSource, SYSTEM_CONFIG_PATH,
};

/// Fully resolved warden configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WardenConfig {
	pub protection: ProtectionConfig,
	pub logging: LoggingConfig,
}

impl WardenConfig {
	/// Emits the resolved settings at `info`.
	///
	/// Binaries that install their subscriber after loading call this again so the
	/// summary is not lost.
	pub fn log_summary(&self) {
		info!(
			login_path = %self.protection.login_path,
			exempt_roles = self.protection.exempt_roles.len(),
			restricted_roles = self.protection.restricted_roles.len(),
			protected_paths = self.protection.protected_paths.len(),
			log_level = %self.logging.level,
			"configuration loaded"
		);
	}
}

/// Loads from defaults, the system config file and the environment.
pub fn load_config() -> Result<WardenConfig, ConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::system()),
		Box::new(EnvSource),
	])
}

/// Loads with an explicit config file in place of the system one.
pub fn load_config_with_file(path: impl AsRef<Path>) -> Result<WardenConfig, ConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::new(path.as_ref())),
		Box::new(EnvSource),
	])
}

/// Loads from defaults and the environment only.
pub fn load_config_from_env() -> Result<WardenConfig, ConfigError> {
	load_from_sources(vec![Box::new(DefaultsSource), Box::new(EnvSource)])
}

/// Merges the given sources in precedence order and finalizes the result.
pub fn load_from_sources(
	mut sources: Vec<Box<dyn ConfigSource>>,
) -> Result<WardenConfig, ConfigError> {
	sources.sort_by_key(|s| s.precedence());

	let mut merged = WardenConfigLayer::default();
	for source in &sources {
		debug!(
			source = source.name(),
			precedence = ?source.precedence(),
			"applying config source"
		);
		merged.merge(source.load()?);
	}

	finalize(merged)
}

/// Resolves a merged layer into a validated configuration.
pub fn finalize(layer: WardenConfigLayer) -> Result<WardenConfig, ConfigError> {
	let protection = layer.protection.unwrap_or_default().finalize()?;
	let logging = layer.logging.unwrap_or_default().finalize();

	let config = WardenConfig {
		protection,
		logging,
	};
	config.log_summary();
	Ok(config)
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Write;

	struct FixedSource {
		precedence: Precedence,
		layer: WardenConfigLayer,
	}

	impl ConfigSource for FixedSource {
		fn name(&self) -> &'static str {
			"fixed"
		}

		fn precedence(&self) -> Precedence {
			self.precedence
		}

		fn load(&self) -> Result<WardenConfigLayer, ConfigError> {
			Ok(self.layer.clone())
		}
	}

	fn login_layer(path: &str) -> WardenConfigLayer {
		WardenConfigLayer {
			protection: Some(ProtectionConfigLayer {
				login_path: Some(path.to_string()),
				..Default::default()
			}),
			..Default::default()
		}
	}

	#[test]
	fn test_finalize_empty_layer_gives_defaults() {
		let config = finalize(WardenConfigLayer::default()).unwrap();
		assert_eq!(config, WardenConfig::default());
	}

	#[test]
	fn test_higher_precedence_wins_regardless_of_order() {
		let config = load_from_sources(vec![
			Box::new(FixedSource {
				precedence: Precedence::Environment,
				layer: login_layer("/from-env/"),
			}),
			Box::new(FixedSource {
				precedence: Precedence::ConfigFile,
				layer: login_layer("/from-file/"),
			}),
		])
		.unwrap();
		assert_eq!(config.protection.login_path, "/from-env/");
	}

	#[test]
	fn test_file_source_feeds_final_config() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		writeln!(
			file,
			r#"
[protection]
login_path = "/signin"
home_url = "https://example.com/"
protected_paths = ["/members/"]

[logging]
level = "debug"
json = true
"#
		)
		.unwrap();

		let config = load_from_sources(vec![
			Box::new(DefaultsSource),
			Box::new(TomlSource::new(file.path())),
		])
		.unwrap();

		assert_eq!(config.protection.login_path, "/signin");
		assert_eq!(config.protection.login_url(), "https://example.com/signin");
		assert!(config.protection.protected_paths.contains("/members/"));
		assert_eq!(config.logging.level, "debug");
		assert!(config.logging.json);
	}

	#[test]
	fn test_invalid_file_values_surface_as_validation_errors() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		writeln!(file, "[protection]\nlogin_path = \"signin\"").unwrap();

		let err = load_from_sources(vec![Box::new(TomlSource::new(file.path()))]).unwrap_err();
		assert!(matches!(err, ConfigError::Validation(_)));
	}

	#[test]
	fn test_log_summary_reports_resolved_values() {
		use std::sync::{Arc, Mutex};

		#[derive(Clone, Default)]
		struct Captured(Arc<Mutex<Vec<u8>>>);

		impl std::io::Write for Captured {
			fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
				self.0.lock().unwrap().extend_from_slice(buf);
				Ok(buf.len())
			}

			fn flush(&mut self) -> std::io::Result<()> {
				Ok(())
			}
		}

		let captured = Captured::default();
		let writer = captured.clone();
		let subscriber = tracing_subscriber::fmt()
			.with_writer(move || writer.clone())
			.with_ansi(false)
			.finish();

		let config = WardenConfig {
			protection: ProtectionConfig::default().with_login_path("/signin/"),
			..Default::default()
		};
		tracing::subscriber::with_default(subscriber, || config.log_summary());

		let output = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
		assert!(output.contains("configuration loaded"));
		assert!(output.contains("login_path=/signin/"));
	}

	#[test]
	fn test_config_serializes_to_json_shape() {
		let config = WardenConfig::default();
		let json = serde_json::to_value(&config).unwrap();
		assert_eq!(json["protection"]["login_path"], "/login/");
		assert_eq!(json["logging"]["level"], "info");
	}
}
