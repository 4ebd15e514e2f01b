// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Explainable decision records.
//!
//! A [`DecisionRecord`] captures the facts an evaluation was based on together
//! with its outcome, so hosts can write it to an audit trail.

use serde::{Deserialize, Serialize};

use crate::lifecycle::LifecyclePoint;
use crate::types::{AccessDecision, RoleClass};

/// One evaluation, with the intermediate classifications that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionRecord {
	pub point: LifecyclePoint,
	pub role_class: RoleClass,
	/// Normalized request path.
	pub path: String,
	/// Whether the resource matched any protected set.
	pub protected: bool,
	pub decision: AccessDecision,
}

impl DecisionRecord {
	/// Returns true when the caller was turned away or had admin UI removed.
	pub fn is_denial(&self) -> bool {
		!self.decision.is_allowed()
	}
}
