// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Access-decision engine.
//!
//! Every decision is a pure function of the [`ProtectionConfig`], the caller's
//! [`CallerIdentity`] and (for content requests) the [`RequestDescriptor`]. Nothing
//! here performs I/O or keeps state between calls, so evaluations can run
//! concurrently against one shared configuration.
//!
//! # Content gate
//!
//! ```text
//! decide_content_view(identity, descriptor)
//!     │
//!     ├── authenticated ─────────────────────► Allow   (no role re-check)
//!     ├── resource not protected ────────────► Allow
//!     └── enforcement
//!         ├── admin / preview surface ───────► Allow
//!         ├── path == login_path ────────────► Allow   (redirect-loop guard)
//!         └── otherwise ─────────────────────► RedirectTo(home_url + login_path, 302)
//! ```
//!
//! The content gate lets any logged-in caller through, including callers that the
//! role-gated decisions below would turn away. That asymmetry is intentional and
//! must not be unified without an explicit policy change.

use std::sync::Arc;

use tracing::{debug, instrument};

use crate::audit::DecisionRecord;
use crate::config::ProtectionConfig;
use crate::error::PolicyConfigError;
use crate::lifecycle::{IdentityProvider, LifecyclePoint, RequestContext};
use crate::path::normalize_path;
use crate::types::{
	AccessDecision, ArchiveKind, CallerIdentity, RequestDescriptor, ResourceClassification,
	RoleClass,
};

/// Classifies the caller. Restricted membership is checked before exempt membership.
pub fn classify_role(identity: &CallerIdentity, config: &ProtectionConfig) -> RoleClass {
	if !identity.is_authenticated {
		return RoleClass::Unauthenticated;
	}

	let Some(role) = identity.role.as_ref() else {
		return RoleClass::Unknown;
	};

	if config.restricted_roles.contains(role) {
		RoleClass::Restricted
	} else if config.exempt_roles.contains(role) {
		RoleClass::Exempt
	} else {
		RoleClass::Unknown
	}
}

/// Returns true if the resource matches any protected set.
///
/// Pages match by exact equality of the normalized path; there is no prefix or
/// wildcard matching.
pub fn is_protected_resource(descriptor: &RequestDescriptor, config: &ProtectionConfig) -> bool {
	match &descriptor.resource {
		ResourceClassification::Post(post) => {
			config.is_protected_post_type(&post.post_type)
				|| post
					.categories
					.iter()
					.any(|c| config.protected_categories.contains(c))
				|| post.tags.iter().any(|t| config.protected_tags.contains(t))
				|| post
					.taxonomies
					.iter()
					.any(|t| config.protected_taxonomies.contains(t))
		}
		ResourceClassification::Page { path } => {
			config.protected_paths.contains(&normalize_path(path))
		}
		ResourceClassification::Archive(kind) => match kind {
			ArchiveKind::PostType(post_type) => config.is_protected_post_type(post_type),
			ArchiveKind::Category(slug) => config.protected_categories.contains(slug),
			ArchiveKind::Tag(slug) => config.protected_tags.contains(slug),
			ArchiveKind::Taxonomy(taxonomy) => config.protected_taxonomies.contains(taxonomy),
		},
		ResourceClassification::AdminSurface
		| ResourceClassification::PreviewSurface
		| ResourceClassification::Other => false,
	}
}

/// Decision at authentication-success time and at logout time.
#[instrument(level = "debug", skip_all, fields(authenticated = identity.is_authenticated))]
pub fn decide_login_time_redirect(
	identity: &CallerIdentity,
	config: &ProtectionConfig,
) -> AccessDecision {
	let class = classify_role(identity, config);
	let decision = if class.is_restricted() {
		AccessDecision::redirect_found(config.login_path.clone())
	} else {
		AccessDecision::Allow
	};

	debug!(role_class = %class, decision = %decision, "login-time redirect evaluated");
	decision
}

/// Decision when the caller tries to enter the administrative back office.
#[instrument(level = "debug", skip_all, fields(authenticated = identity.is_authenticated))]
pub fn decide_admin_entry(identity: &CallerIdentity, config: &ProtectionConfig) -> AccessDecision {
	let class = classify_role(identity, config);
	let decision = if class.is_restricted() {
		AccessDecision::redirect_found(config.login_path.clone())
	} else {
		AccessDecision::Allow
	};

	debug!(role_class = %class, decision = %decision, "admin entry evaluated");
	decision
}

/// Decision on whether the admin toolbar may be rendered.
#[instrument(level = "debug", skip_all, fields(authenticated = identity.is_authenticated))]
pub fn decide_admin_chrome_visibility(
	identity: &CallerIdentity,
	config: &ProtectionConfig,
) -> AccessDecision {
	let class = classify_role(identity, config);
	let decision = if class.is_restricted() {
		AccessDecision::SuppressAdminChrome
	} else {
		AccessDecision::Allow
	};

	debug!(role_class = %class, decision = %decision, "admin chrome evaluated");
	decision
}

/// The primary gate, evaluated once per content request.
#[instrument(
	level = "debug",
	skip_all,
	fields(authenticated = identity.is_authenticated, path = %descriptor.path)
)]
pub fn decide_content_view(
	identity: &CallerIdentity,
	descriptor: &RequestDescriptor,
	config: &ProtectionConfig,
) -> AccessDecision {
	if identity.is_authenticated {
		debug!("authenticated caller, content allowed");
		return AccessDecision::Allow;
	}

	if !is_protected_resource(descriptor, config) {
		debug!("resource not protected, content allowed");
		return AccessDecision::Allow;
	}

	if descriptor.resource.is_bypass_surface() {
		debug!("admin or preview surface bypasses the gate");
		return AccessDecision::Allow;
	}

	// Manual special case: the login page itself is never gated.
	if normalize_path(&descriptor.path) == config.login_path {
		debug!("login page is never gated");
		return AccessDecision::Allow;
	}

	let decision = AccessDecision::redirect_found(config.login_url());
	debug!(decision = %decision, "protected content requested anonymously");
	decision
}

/// Evaluates decisions against one shared, immutable [`ProtectionConfig`].
///
/// Cloning is cheap; clones share the configuration.
#[derive(Debug, Clone)]
pub struct AccessPolicyEngine {
	config: Arc<ProtectionConfig>,
}

impl Default for AccessPolicyEngine {
	fn default() -> Self {
		Self {
			config: Arc::new(ProtectionConfig::default()),
		}
	}
}

impl AccessPolicyEngine {
	/// Normalizes and validates `config`, then wraps it for sharing.
	pub fn new(config: ProtectionConfig) -> Result<Self, PolicyConfigError> {
		let config = config.prepare()?;
		Ok(Self {
			config: Arc::new(config),
		})
	}

	pub fn config(&self) -> &ProtectionConfig {
		&self.config
	}

	pub fn classify_role(&self, identity: &CallerIdentity) -> RoleClass {
		classify_role(identity, &self.config)
	}

	pub fn is_protected_resource(&self, descriptor: &RequestDescriptor) -> bool {
		is_protected_resource(descriptor, &self.config)
	}

	pub fn decide_login_time_redirect(&self, identity: &CallerIdentity) -> AccessDecision {
		decide_login_time_redirect(identity, &self.config)
	}

	pub fn decide_admin_entry(&self, identity: &CallerIdentity) -> AccessDecision {
		decide_admin_entry(identity, &self.config)
	}

	pub fn decide_admin_chrome_visibility(&self, identity: &CallerIdentity) -> AccessDecision {
		decide_admin_chrome_visibility(identity, &self.config)
	}

	pub fn decide_content_view(
		&self,
		identity: &CallerIdentity,
		descriptor: &RequestDescriptor,
	) -> AccessDecision {
		decide_content_view(identity, descriptor, &self.config)
	}

	/// Routes a lifecycle point to its decision.
	///
	/// `descriptor` is only consulted for [`LifecyclePoint::ContentView`].
	pub fn decide(
		&self,
		point: LifecyclePoint,
		identity: &CallerIdentity,
		descriptor: &RequestDescriptor,
	) -> AccessDecision {
		match point {
			LifecyclePoint::Login | LifecyclePoint::Logout => {
				self.decide_login_time_redirect(identity)
			}
			LifecyclePoint::AdminEntry => self.decide_admin_entry(identity),
			LifecyclePoint::AdminChrome => self.decide_admin_chrome_visibility(identity),
			LifecyclePoint::ContentView => self.decide_content_view(identity, descriptor),
		}
	}

	/// Like [`decide`](Self::decide), but returns the classifications alongside the outcome.
	#[instrument(level = "debug", skip_all, fields(point = %point))]
	pub fn explain(
		&self,
		point: LifecyclePoint,
		identity: &CallerIdentity,
		descriptor: &RequestDescriptor,
	) -> DecisionRecord {
		let record = DecisionRecord {
			point,
			role_class: self.classify_role(identity),
			path: normalize_path(&descriptor.path),
			protected: self.is_protected_resource(descriptor),
			decision: self.decide(point, identity, descriptor),
		};

		debug!(
			role_class = %record.role_class,
			protected = record.protected,
			decision = %record.decision,
			"decision recorded"
		);
		record
	}

	/// Pulls fresh snapshots from the host's collaborators and decides.
	pub fn evaluate(
		&self,
		point: LifecyclePoint,
		identity: &dyn IdentityProvider,
		request: &dyn RequestContext,
	) -> AccessDecision {
		self.decide(point, &identity.current_identity(), &request.describe())
	}
}
