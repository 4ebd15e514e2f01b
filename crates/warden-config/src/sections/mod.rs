// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sections for warden.

pub mod logging;
pub mod protection;

pub use logging::{LoggingConfig, LoggingConfigLayer};
pub use protection::ProtectionConfigLayer;
