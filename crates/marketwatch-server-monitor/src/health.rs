// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use chrono::{DateTime, Utc};
use serde::Serialize;

use marketwatch_monitor_core::{CheckKind, CheckOutcome, CheckResult, ConnectionId};

/// Consecutive non-successes at which a check is reported unhealthy.
pub const UNHEALTHY_THRESHOLD: u32 = 3;

#[derive(Debug, Clone, Serialize)]
pub struct CheckHealth {
	pub connection_id: ConnectionId,
	pub check: CheckKind,
	pub status: HealthState,
	pub last_result: Option<LastResultInfo>,
	pub consecutive_failures: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct LastResultInfo {
	pub epoch: i64,
	pub outcome: CheckOutcome,
	pub finished_at: DateTime<Utc>,
	pub duration_ms: u64,
	pub error: Option<String>,
}

impl From<&CheckResult> for LastResultInfo {
	fn from(result: &CheckResult) -> Self {
		Self {
			epoch: result.epoch,
			outcome: result.outcome,
			finished_at: result.finished_at,
			duration_ms: result.duration_ms,
			error: result.error.clone(),
		}
	}
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum HealthState {
	Healthy,
	Degraded,
	Unhealthy,
}

#[derive(Debug, Clone, Serialize)]
pub struct MonitoringHealth {
	pub status: HealthState,
	pub checks: Vec<CheckHealth>,
}

impl MonitoringHealth {
	pub fn from_checks(checks: Vec<CheckHealth>) -> Self {
		let status = checks
			.iter()
			.map(|c| c.status)
			.max()
			.unwrap_or(HealthState::Healthy);
		Self { status, checks }
	}

	/// Report used when the connection list itself cannot be read.
	pub fn unhealthy() -> Self {
		Self {
			status: HealthState::Unhealthy,
			checks: Vec::new(),
		}
	}
}

/// Builds the health of one (connection, check) pair from its results,
/// most recent first.
pub fn check_health(
	connection_id: ConnectionId,
	check: CheckKind,
	recent: &[CheckResult],
) -> CheckHealth {
	let consecutive_failures = recent
		.iter()
		.take_while(|r| !r.outcome.is_success())
		.count() as u32;

	CheckHealth {
		connection_id,
		check,
		status: determine_health_state(recent.first(), consecutive_failures),
		last_result: recent.first().map(LastResultInfo::from),
		consecutive_failures,
	}
}

fn determine_health_state(last: Option<&CheckResult>, consecutive_failures: u32) -> HealthState {
	match last {
		None => HealthState::Healthy,
		Some(result) => match result.outcome {
			CheckOutcome::Success => HealthState::Healthy,
			CheckOutcome::Failure | CheckOutcome::Timeout => {
				if consecutive_failures >= UNHEALTHY_THRESHOLD {
					HealthState::Unhealthy
				} else if consecutive_failures >= 1 {
					HealthState::Degraded
				} else {
					HealthState::Healthy
				}
			}
		},
	}
}
