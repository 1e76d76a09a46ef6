// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Orchestrator configuration.

use std::time::Duration;

pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;
pub const DEFAULT_READY_TIMEOUT_SECS: u64 = 300;

/// Configuration for the orchestrator's readiness gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrchestratorConfig {
	/// Delay between readiness polls
	pub poll_interval: Duration,
	/// How long a deployment or job may take before the operation fails
	pub ready_timeout: Duration,
}

impl Default for OrchestratorConfig {
	fn default() -> Self {
		Self {
			poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
			ready_timeout: Duration::from_secs(DEFAULT_READY_TIMEOUT_SECS),
		}
	}
}
