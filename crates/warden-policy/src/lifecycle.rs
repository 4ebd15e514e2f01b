// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Host call sites and the collaborator interfaces the engine consults.
//!
//! The host owns all I/O. It snapshots the caller through an [`IdentityProvider`],
//! describes the request through a [`RequestContext`], asks the engine for a
//! decision at one of the [`LifecyclePoint`]s, and hands the result to an
//! [`Enforcer`].
//!
//! ```text
//! Login / Logout ─────► decide_login_time_redirect
//! AdminEntry ─────────► decide_admin_entry
//! AdminChrome ────────► decide_admin_chrome_visibility
//! ContentView ────────► decide_content_view
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::types::{AccessDecision, CallerIdentity, RequestDescriptor};

/// The points in the request lifecycle where the host asks for a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecyclePoint {
	/// Right after credentials were accepted.
	Login,
	/// Right after the session was ended.
	Logout,
	/// Before the caller enters the administrative back office.
	AdminEntry,
	/// Before rendering, to decide whether admin UI is shown.
	AdminChrome,
	/// Before content is dispatched.
	ContentView,
}

impl LifecyclePoint {
	pub fn all() -> &'static [LifecyclePoint] {
		&[
			LifecyclePoint::Login,
			LifecyclePoint::Logout,
			LifecyclePoint::AdminEntry,
			LifecyclePoint::AdminChrome,
			LifecyclePoint::ContentView,
		]
	}
}

impl fmt::Display for LifecyclePoint {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			LifecyclePoint::Login => write!(f, "login"),
			LifecyclePoint::Logout => write!(f, "logout"),
			LifecyclePoint::AdminEntry => write!(f, "admin_entry"),
			LifecyclePoint::AdminChrome => write!(f, "admin_chrome"),
			LifecyclePoint::ContentView => write!(f, "content_view"),
		}
	}
}

impl FromStr for LifecyclePoint {
	type Err = UnknownLifecyclePoint;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_lowercase().replace('-', "_").as_str() {
			"login" => Ok(LifecyclePoint::Login),
			"logout" => Ok(LifecyclePoint::Logout),
			"admin_entry" => Ok(LifecyclePoint::AdminEntry),
			"admin_chrome" => Ok(LifecyclePoint::AdminChrome),
			"content_view" => Ok(LifecyclePoint::ContentView),
			_ => Err(UnknownLifecyclePoint(s.to_string())),
		}
	}
}

/// Error returned when parsing an unrecognized lifecycle point name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown lifecycle point: {0}")]
pub struct UnknownLifecyclePoint(pub String);

/// Answers "who is calling" at the moment of the request.
pub trait IdentityProvider {
	fn current_identity(&self) -> CallerIdentity;
}

/// Describes the current request with its path already normalized.
pub trait RequestContext {
	fn describe(&self) -> RequestDescriptor;
}

/// Applies a decision to the host's response.
///
/// On a redirect the host must stop processing the request and emit no body.
pub trait Enforcer {
	type Output;

	fn apply(&self, decision: &AccessDecision) -> Self::Output;
}

/// A snapshot answers for itself.
impl IdentityProvider for CallerIdentity {
	fn current_identity(&self) -> CallerIdentity {
		self.clone()
	}
}

impl RequestContext for RequestDescriptor {
	fn describe(&self) -> RequestDescriptor {
		self.clone()
	}
}
