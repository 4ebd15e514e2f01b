// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Errors raised while building a protection configuration.
//!
//! Evaluation itself never fails; these only surface at startup.

use thiserror::Error;

use crate::types::RoleId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyConfigError {
	#[error("login path must start with '/': {0:?}")]
	InvalidLoginPath(String),

	#[error("role listed as both exempt and restricted: {0}")]
	OverlappingRole(RoleId),

	#[error("role identifiers must not be empty")]
	EmptyRoleId,
}
