// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Orchestrator lifecycle state.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle of an orchestrator instance.
///
/// Transitions: `Uninitialized → Running → ShuttingDown → Stopped`, plus
/// `Uninitialized → Stopped` when shutdown is requested before start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrchestratorState {
	Uninitialized,
	Running,
	ShuttingDown,
	Stopped,
}

impl OrchestratorState {
	pub fn can_transition_to(&self, next: OrchestratorState) -> bool {
		matches!(
			(self, next),
			(Self::Uninitialized, Self::Running)
				| (Self::Uninitialized, Self::Stopped)
				| (Self::Running, Self::ShuttingDown)
				| (Self::ShuttingDown, Self::Stopped)
		)
	}

	/// New checks may only be dispatched while running.
	pub fn accepts_work(&self) -> bool {
		matches!(self, Self::Running)
	}
}

impl fmt::Display for OrchestratorState {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Uninitialized => write!(f, "uninitialized"),
			Self::Running => write!(f, "running"),
			Self::ShuttingDown => write!(f, "shutting_down"),
			Self::Stopped => write!(f, "stopped"),
		}
	}
}
