// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Access-decision engine for login-gated content.
//!
//! Given a caller identity and a description of the requested resource, the engine
//! decides whether to serve it, redirect to the login page, or hide the admin
//! toolbar. It never authenticates anyone, touches sessions, or renders anything;
//! those concerns belong to the host and reach the engine through the
//! [`IdentityProvider`] and [`RequestContext`] interfaces.
//!
//! # Evaluation
//!
//! ```text
//! classify_role(identity) ──► Unauthenticated | Restricted | Exempt | Unknown
//! is_protected_resource(descriptor) ──► bool
//!
//! LifecyclePoint ──► decide_* ──► AccessDecision ──► Enforcer (host)
//! ```
//!
//! Unknown roles, and logged-in callers with no role, fail closed and are treated
//! as restricted. Resources that match no protected set fail open.
//!
//! # Example
//!
//! ```
//! use warden_policy::{AccessDecision, AccessPolicyEngine, CallerIdentity, RequestDescriptor};
//!
//! let engine = AccessPolicyEngine::default();
//!
//! let decision = engine.decide_content_view(
//!     &CallerIdentity::anonymous(),
//!     &RequestDescriptor::page("/test/?x=1"),
//! );
//! assert_eq!(decision, AccessDecision::redirect_found("/login/"));
//!
//! let decision = engine.decide_admin_entry(&CallerIdentity::authenticated("editor"));
//! assert!(decision.is_allowed());
//! ```

pub mod audit;
pub mod config;
pub mod engine;
pub mod error;
pub mod lifecycle;
pub mod middleware;
pub mod path;
pub mod types;

pub use audit::DecisionRecord;
pub use config::{ProtectionConfig, DEFAULT_LOGIN_PATH};
pub use engine::{
	classify_role, decide_admin_chrome_visibility, decide_admin_entry, decide_content_view,
	decide_login_time_redirect, is_protected_resource, AccessPolicyEngine,
};
pub use error::PolicyConfigError;
pub use lifecycle::{
	Enforcer, IdentityProvider, LifecyclePoint, RequestContext, UnknownLifecyclePoint,
};
pub use middleware::{request_path, HttpRequestContext, ResponseEnforcer};
pub use path::normalize_path;
pub use types::{
	AccessDecision, ArchiveKind, CallerIdentity, PostAttrs, RequestDescriptor,
	ResourceClassification, RoleClass, RoleId,
};
