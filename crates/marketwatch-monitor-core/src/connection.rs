// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Connection types: external marketplace accounts under monitoring.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::MonitorCoreError;

/// Identifier of a linked marketplace account.
///
/// Connection ids are issued by the account-linking flow, so they are opaque
/// strings rather than generated UUIDs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionId(String);

impl ConnectionId {
	pub fn new(id: impl Into<String>) -> Result<Self, MonitorCoreError> {
		let id = id.into();
		if !Self::is_valid(&id) {
			return Err(MonitorCoreError::InvalidConnectionId(id));
		}
		Ok(Self(id))
	}

	/// Non-empty, at most 128 bytes, printable ASCII without whitespace or `/`.
	pub fn is_valid(id: &str) -> bool {
		!id.is_empty()
			&& id.len() <= 128
			&& id.chars().all(|c| c.is_ascii_graphic() && c != '/')
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for ConnectionId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl FromStr for ConnectionId {
	type Err = MonitorCoreError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::new(s)
	}
}

/// Marketplace integration identifier, e.g. `amazon`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MarketplaceId(String);

impl MarketplaceId {
	/// Marketplace ids are case-insensitive and stored lowercase.
	pub fn new(id: impl AsRef<str>) -> Self {
		Self(id.as_ref().trim().to_ascii_lowercase())
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for MarketplaceId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

/// A monitored marketplace account / region pairing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection {
	pub id: ConnectionId,
	pub marketplace_id: MarketplaceId,
	/// Marketplace region: "us-east-1", "eu", "jp"
	pub region: String,
	pub status: ConnectionStatus,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

impl Connection {
	pub fn new(id: ConnectionId, marketplace_id: MarketplaceId, region: impl Into<String>) -> Self {
		let now = Utc::now();
		Self {
			id,
			marketplace_id,
			region: region.into(),
			status: ConnectionStatus::Active,
			created_at: now,
			updated_at: now,
		}
	}

	pub fn is_active(&self) -> bool {
		self.status == ConnectionStatus::Active
	}
}

/// Account status, owned by the account-linking side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionStatus {
	/// Checks are scheduled for this connection
	Active,
	/// Temporarily excluded from monitoring
	Suspended,
	/// Credentials withdrawn; never monitored again
	Revoked,
}

impl fmt::Display for ConnectionStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Active => write!(f, "active"),
			Self::Suspended => write!(f, "suspended"),
			Self::Revoked => write!(f, "revoked"),
		}
	}
}

impl FromStr for ConnectionStatus {
	type Err = MonitorCoreError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"active" => Ok(Self::Active),
			"suspended" => Ok(Self::Suspended),
			"revoked" => Ok(Self::Revoked),
			_ => Err(MonitorCoreError::UnknownVariant {
				kind: "connection status",
				value: s.to_string(),
			}),
		}
	}
}
