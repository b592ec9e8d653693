// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Check definitions and check results.

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use uuid::Uuid;

use crate::connection::ConnectionId;
use crate::error::MonitorCoreError;

/// Maximum length of a stored error detail.
pub const MAX_ERROR_DETAIL_BYTES: usize = 4 * 1024;

/// Unique identifier for a stored check result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResultId(pub Uuid);

impl ResultId {
	pub fn new() -> Self {
		Self(Uuid::new_v4())
	}
}

impl Default for ResultId {
	fn default() -> Self {
		Self::new()
	}
}

impl fmt::Display for ResultId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

impl FromStr for ResultId {
	type Err = uuid::Error;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Ok(Self(Uuid::parse_str(s)?))
	}
}

/// The kinds of recurring checks run against a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckKind {
	/// Account reachability and authorization
	Health,
	/// Listing price snapshot
	Price,
	/// Stock level snapshot
	Inventory,
}

impl CheckKind {
	pub const ALL: [CheckKind; 3] = [CheckKind::Health, CheckKind::Price, CheckKind::Inventory];

	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Health => "health",
			Self::Price => "price",
			Self::Inventory => "inventory",
		}
	}
}

impl fmt::Display for CheckKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for CheckKind {
	type Err = MonitorCoreError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"health" => Ok(Self::Health),
			"price" => Ok(Self::Price),
			"inventory" => Ok(Self::Inventory),
			_ => Err(MonitorCoreError::UnknownVariant {
				kind: "check kind",
				value: s.to_string(),
			}),
		}
	}
}

/// A named recurring check with its schedule and timeout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckDefinition {
	pub kind: CheckKind,
	pub interval: Duration,
	pub timeout: Duration,
}

impl CheckDefinition {
	pub fn new(kind: CheckKind, interval: Duration, timeout: Duration) -> Self {
		Self {
			kind,
			interval,
			timeout,
		}
	}

	pub fn validate(&self) -> Result<(), MonitorCoreError> {
		if self.interval.is_zero() {
			return Err(MonitorCoreError::InvalidDefinition {
				kind: self.kind.to_string(),
				message: "interval must be greater than zero".to_string(),
			});
		}
		if self.timeout.is_zero() {
			return Err(MonitorCoreError::InvalidDefinition {
				kind: self.kind.to_string(),
				message: "timeout must be greater than zero".to_string(),
			});
		}
		Ok(())
	}
}

/// Outcome of one check execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckOutcome {
	Success,
	/// Remote error, revoked authorization, or no probe for the marketplace
	Failure,
	/// The check exceeded its configured timeout
	Timeout,
}

impl CheckOutcome {
	pub fn is_success(&self) -> bool {
		matches!(self, Self::Success)
	}
}

impl fmt::Display for CheckOutcome {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Success => write!(f, "success"),
			Self::Failure => write!(f, "failure"),
			Self::Timeout => write!(f, "timeout"),
		}
	}
}

impl FromStr for CheckOutcome {
	type Err = MonitorCoreError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"success" => Ok(Self::Success),
			"failure" => Ok(Self::Failure),
			"timeout" => Ok(Self::Timeout),
			_ => Err(MonitorCoreError::UnknownVariant {
				kind: "check outcome",
				value: s.to_string(),
			}),
		}
	}
}

/// Immutable record of one check execution against one connection.
///
/// `(connection_id, check, epoch)` identifies the execution; the store
/// rejects a second record with the same key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckResult {
	pub id: ResultId,
	pub connection_id: ConnectionId,
	pub check: CheckKind,
	/// Execution epoch, strictly increasing per check definition
	pub epoch: i64,

	pub started_at: DateTime<Utc>,
	pub finished_at: DateTime<Utc>,
	pub duration_ms: u64,

	pub outcome: CheckOutcome,
	/// Measured values reported by the marketplace probe
	pub payload: serde_json::Value,
	pub error: Option<String>,
}

impl CheckResult {
	/// Build a result that finished now.
	///
	/// Both timestamps are truncated to whole milliseconds, the precision the
	/// result store keeps, so a stored result reads back unchanged.
	pub fn completed(
		connection_id: ConnectionId,
		check: CheckKind,
		epoch: i64,
		started_at: DateTime<Utc>,
		outcome: CheckOutcome,
		payload: serde_json::Value,
		error: Option<String>,
	) -> Self {
		let started_at = started_at.trunc_subsecs(3);
		let finished_at = Utc::now().trunc_subsecs(3).max(started_at);
		Self {
			id: ResultId::new(),
			connection_id,
			check,
			epoch,
			started_at,
			finished_at,
			duration_ms: (finished_at - started_at).num_milliseconds().max(0) as u64,
			outcome,
			payload,
			error: error.map(|e| truncate_error(&e)),
		}
	}
}

/// Truncate an error detail to [`MAX_ERROR_DETAIL_BYTES`] on a char boundary.
pub fn truncate_error(detail: &str) -> String {
	if detail.len() <= MAX_ERROR_DETAIL_BYTES {
		return detail.to_string();
	}
	let mut end = MAX_ERROR_DETAIL_BYTES;
	while !detail.is_char_boundary(end) {
		end -= 1;
	}
	format!("{}...[truncated]", &detail[..end])
}
