// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! `warden` - evaluate access decisions against a resolved configuration.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::{debug, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use warden_config::{LoggingConfig, WardenConfig};
use warden_policy::{
	AccessPolicyEngine, ArchiveKind, CallerIdentity, LifecyclePoint, PostAttrs, RequestDescriptor,
	ResourceClassification, UnknownLifecyclePoint,
};

#[derive(Parser, Debug)]
#[command(name = "warden", version, about, long_about = None)]
struct Cli {
	/// Config file used in place of /etc/warden/warden.toml
	#[arg(long, global = true, env = "WARDEN_CONFIG")]
	config: Option<PathBuf>,

	/// Emit logs as JSON
	#[arg(long, global = true)]
	log_json: bool,

	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Evaluate one lifecycle point and print the decision record as JSON
	Check(CheckArgs),
	/// Print the resolved configuration as JSON
	Config,
}

#[derive(Args, Debug, Clone)]
struct CheckArgs {
	/// login, logout, admin-entry, admin-chrome or content-view
	#[arg(long, value_parser = parse_point)]
	point: LifecyclePoint,

	/// The caller is logged in
	#[arg(long)]
	authenticated: bool,

	/// Role held by the caller; the first one given is the primary role
	#[arg(long = "role", requires = "authenticated")]
	roles: Vec<String>,

	#[arg(long, value_enum, default_value_t = KindArg::Page)]
	kind: KindArg,

	#[arg(long, default_value = "/")]
	path: String,

	#[arg(long)]
	post_type: Option<String>,

	#[arg(long = "category")]
	categories: Vec<String>,

	#[arg(long = "tag")]
	tags: Vec<String>,

	#[arg(long = "taxonomy")]
	taxonomies: Vec<String>,
}

fn parse_point(raw: &str) -> Result<LifecyclePoint, UnknownLifecyclePoint> {
	raw.parse()
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum KindArg {
	Post,
	Page,
	ArchivePostType,
	ArchiveCategory,
	ArchiveTag,
	ArchiveTaxonomy,
	Admin,
	Preview,
	Other,
}

impl CheckArgs {
	fn identity(&self) -> CallerIdentity {
		match (self.authenticated, self.roles.is_empty()) {
			(false, _) => CallerIdentity::anonymous(),
			(true, true) => CallerIdentity::authenticated_without_role(),
			(true, false) => CallerIdentity::with_roles(self.roles.iter().cloned()),
		}
	}

	fn descriptor(&self) -> Result<RequestDescriptor> {
		let path = self.path.as_str();
		let descriptor = match self.kind {
			KindArg::Page => RequestDescriptor::page(path),
			KindArg::Post => {
				let post_type = self.post_type.clone().unwrap_or_else(|| "post".to_string());
				RequestDescriptor::post(
					path,
					PostAttrs {
						post_type,
						categories: self.categories.clone(),
						tags: self.tags.clone(),
						taxonomies: self.taxonomies.clone(),
					},
				)
			}
			KindArg::ArchivePostType => RequestDescriptor::archive(
				path,
				ArchiveKind::PostType(required(&self.post_type, "--post-type")?),
			),
			KindArg::ArchiveCategory => RequestDescriptor::archive(
				path,
				ArchiveKind::Category(required(&self.categories.first().cloned(), "--category")?),
			),
			KindArg::ArchiveTag => RequestDescriptor::archive(
				path,
				ArchiveKind::Tag(required(&self.tags.first().cloned(), "--tag")?),
			),
			KindArg::ArchiveTaxonomy => RequestDescriptor::archive(
				path,
				ArchiveKind::Taxonomy(required(&self.taxonomies.first().cloned(), "--taxonomy")?),
			),
			KindArg::Admin => RequestDescriptor::admin(path),
			KindArg::Preview => RequestDescriptor::preview(path),
			KindArg::Other => RequestDescriptor::new(path, ResourceClassification::Other),
		};
		Ok(descriptor)
	}
}

fn required(value: &Option<String>, flag: &str) -> Result<String> {
	match value {
		Some(v) => Ok(v.clone()),
		None => bail!("{flag} is required for this --kind"),
	}
}

fn load_config(path: Option<&PathBuf>) -> Result<WardenConfig> {
	let config = match path {
		Some(path) => warden_config::load_config_with_file(path)
			.with_context(|| format!("loading config from {}", path.display()))?,
		None => warden_config::load_config().context("loading config")?,
	};
	Ok(config)
}

fn init_tracing(logging: &LoggingConfig, force_json: bool) {
	let filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

	if force_json || logging.json {
		tracing_subscriber::registry()
			.with(filter)
			.with(fmt::layer().json().with_writer(std::io::stderr))
			.init();
	} else {
		tracing_subscriber::registry()
			.with(filter)
			.with(fmt::layer().compact().with_writer(std::io::stderr))
			.init();
	}
}

fn main() -> Result<()> {
	let cli = Cli::parse();

	let config = load_config(cli.config.as_ref())?;
	init_tracing(&config.logging, cli.log_json);
	config.log_summary();
	debug!(command = ?cli.command, "starting warden");

	match cli.command {
		Command::Check(args) => {
			let engine = AccessPolicyEngine::new(config.protection)?;
			let record = engine.explain(args.point, &args.identity(), &args.descriptor()?);
			info!(
				point = %record.point,
				decision = %record.decision,
				"access decision"
			);
			println!("{}", serde_json::to_string_pretty(&record)?);
		}
		Command::Config => {
			println!("{}", serde_json::to_string_pretty(&config)?);
		}
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	fn check(args: &[&str]) -> CheckArgs {
		let mut argv = vec!["warden", "check"];
		argv.extend_from_slice(args);
		match Cli::try_parse_from(argv).unwrap().command {
			Command::Check(args) => args,
			Command::Config => panic!("expected check"),
		}
	}

	#[test]
	fn verify_cli() {
		use clap::CommandFactory;
		Cli::command().debug_assert();
	}

	mod identity {
		use super::*;

		#[test]
		fn anonymous_by_default() {
			let args = check(&["--point", "login"]);
			assert_eq!(args.identity(), CallerIdentity::anonymous());
		}

		#[test]
		fn first_role_is_primary() {
			let args = check(&[
				"--point",
				"admin-entry",
				"--authenticated",
				"--role",
				"subscriber",
				"--role",
				"editor",
			]);
			assert_eq!(args.identity(), CallerIdentity::authenticated("subscriber"));
		}

		#[test]
		fn authenticated_without_role() {
			let args = check(&["--point", "admin-chrome", "--authenticated"]);
			assert_eq!(args.identity(), CallerIdentity::authenticated_without_role());
		}

		#[test]
		fn role_requires_authenticated() {
			let result =
				Cli::try_parse_from(["warden", "check", "--point", "login", "--role", "editor"]);
			assert!(result.is_err());
		}
	}

	mod descriptor {
		use super::*;

		#[test]
		fn page_path_is_normalized() {
			let args = check(&["--point", "content-view", "--path", "/test/?x=1"]);
			assert_eq!(args.descriptor().unwrap(), RequestDescriptor::page("/test/"));
		}

		#[test]
		fn post_defaults_to_post_type_post() {
			let args = check(&[
				"--point",
				"content-view",
				"--kind",
				"post",
				"--category",
				"news",
			]);
			let descriptor = args.descriptor().unwrap();
			assert_eq!(
				descriptor.resource,
				ResourceClassification::Post(PostAttrs::new("post").with_category("news"))
			);
		}

		#[test]
		fn archive_tag_uses_first_tag() {
			let args = check(&[
				"--point",
				"content-view",
				"--kind",
				"archive-tag",
				"--tag",
				"tag",
			]);
			assert_eq!(
				args.descriptor().unwrap().resource,
				ResourceClassification::Archive(ArchiveKind::Tag("tag".to_string()))
			);
		}

		#[test]
		fn archive_without_name_is_an_error() {
			let args = check(&["--point", "content-view", "--kind", "archive-taxonomy"]);
			assert!(args.descriptor().is_err());
		}

		#[test]
		fn admin_surface() {
			let args = check(&["--point", "content-view", "--kind", "admin"]);
			assert!(args.descriptor().unwrap().resource.is_bypass_surface());
		}
	}

	mod decisions {
		use super::*;

		#[test]
		fn anonymous_protected_page_redirects() {
			let args = check(&["--point", "content-view", "--path", "/test/"]);
			let engine = AccessPolicyEngine::default();
			let record = engine.explain(args.point, &args.identity(), &args.descriptor().unwrap());
			assert!(record.is_denial());
			assert_eq!(record.decision.location(), Some("/login/"));
		}

		#[test]
		fn point_accepts_kebab_and_snake_case() {
			assert_eq!(check(&["--point", "admin-entry"]).point, LifecyclePoint::AdminEntry);
			assert_eq!(check(&["--point", "content_view"]).point, LifecyclePoint::ContentView);
			for point in LifecyclePoint::all() {
				let name = point.to_string();
				assert_eq!(check(&["--point", name.as_str()]).point, *point);
			}
		}

		#[test]
		fn unknown_point_is_rejected() {
			let result = Cli::try_parse_from(["warden", "check", "--point", "checkout"]);
			let err = result.unwrap_err();
			assert!(err.to_string().contains("unknown lifecycle point"));
		}
	}
}
