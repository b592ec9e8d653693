// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use serde::Serialize;
use std::fmt;

pub type Result<T> = std::result::Result<T, SandboxError>;

/// The operations the sandbox gate guards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SandboxOperation {
	ListingCreation,
	InventoryUpdate,
	PriceUpdate,
}

impl fmt::Display for SandboxOperation {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::ListingCreation => write!(f, "listing_creation"),
			Self::InventoryUpdate => write!(f, "inventory_update"),
			Self::PriceUpdate => write!(f, "price_update"),
		}
	}
}

/// A sandbox operation was invoked in production.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Sandbox operation {operation} is disabled in production")]
pub struct SandboxDisabledError {
	pub operation: SandboxOperation,
}

#[derive(Debug, thiserror::Error)]
pub enum SandboxError {
	#[error(transparent)]
	Disabled(#[from] SandboxDisabledError),

	#[error("Invalid sandbox request: {0}")]
	InvalidRequest(String),

	#[error("Sandbox backend error: {0}")]
	Backend(String),
}
