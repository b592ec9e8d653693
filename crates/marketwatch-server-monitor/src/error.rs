// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::time::Duration;

use marketwatch_monitor_core::{CheckKind, MonitorCoreError, OrchestratorState};
use marketwatch_server_db::PersistenceError;

/// Reasons `Orchestrator::initialize` refuses to start.
#[derive(Debug, thiserror::Error)]
pub enum InitializationError {
	#[error("No check definitions configured")]
	NoDefinitions,

	#[error("Check {0} is defined more than once")]
	DuplicateDefinition(CheckKind),

	#[error("Invalid check definition: {0}")]
	InvalidDefinition(#[from] MonitorCoreError),

	#[error("Invalid orchestrator options: {0}")]
	InvalidOptions(String),

	#[error("Failed to ensure result indexes: {0}")]
	Indexes(#[source] PersistenceError),

	#[error("Timed out ensuring result indexes after {0:?}")]
	IndexesTimedOut(Duration),

	#[error("Cannot initialize from state {0}")]
	InvalidState(OrchestratorState),
}

/// Errors reported by a marketplace probe for a single check.
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
	#[error("Authorization rejected: {0}")]
	Unauthorized(String),

	#[error("Marketplace returned {status}: {message}")]
	Remote { status: u16, message: String },

	#[error("Transport error: {0}")]
	Transport(String),

	#[error("Invalid response: {0}")]
	InvalidResponse(String),
}
