// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use chrono::{DateTime, Utc};
use serde::Serialize;

use marketwatch_monitor_core::ConnectionId;

use crate::error::SandboxError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingRequest {
	pub connection_id: ConnectionId,
	pub sku: String,
	pub title: String,
	pub price_cents: i64,
	pub quantity: i64,
}

impl ListingRequest {
	pub fn validate(&self) -> Result<(), SandboxError> {
		validate_sku(&self.sku)?;
		if self.title.trim().is_empty() {
			return Err(SandboxError::InvalidRequest("title must not be empty".to_string()));
		}
		validate_non_negative("price_cents", self.price_cents)?;
		validate_non_negative("quantity", self.quantity)
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryUpdate {
	pub connection_id: ConnectionId,
	pub sku: String,
	pub quantity: i64,
}

impl InventoryUpdate {
	pub fn validate(&self) -> Result<(), SandboxError> {
		validate_sku(&self.sku)?;
		validate_non_negative("quantity", self.quantity)
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceUpdate {
	pub connection_id: ConnectionId,
	pub sku: String,
	pub price_cents: i64,
}

impl PriceUpdate {
	pub fn validate(&self) -> Result<(), SandboxError> {
		validate_sku(&self.sku)?;
		validate_non_negative("price_cents", self.price_cents)
	}
}

/// A listing as held by the sandbox backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SimulatedListing {
	/// Synthetic id, prefixed `sbx-`
	pub listing_id: String,
	pub connection_id: ConnectionId,
	pub sku: String,
	pub title: String,
	pub price_cents: i64,
	pub quantity: i64,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

/// Receipt for a simulated inventory or price change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SimulatedUpdate {
	pub update_id: String,
	pub connection_id: ConnectionId,
	pub sku: String,
	/// Value before the update; `None` when the sku had no listing yet
	pub previous: Option<i64>,
	pub applied: i64,
	pub applied_at: DateTime<Utc>,
}

fn validate_sku(sku: &str) -> Result<(), SandboxError> {
	if sku.trim().is_empty() {
		return Err(SandboxError::InvalidRequest("sku must not be empty".to_string()));
	}
	Ok(())
}

fn validate_non_negative(field: &str, value: i64) -> Result<(), SandboxError> {
	if value < 0 {
		return Err(SandboxError::InvalidRequest(format!(
			"{field} must not be negative, got {value}"
		)));
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	fn listing() -> ListingRequest {
		ListingRequest {
			connection_id: ConnectionId::new("C1").unwrap(),
			sku: "B00TEST".to_string(),
			title: "Test widget".to_string(),
			price_cents: 1999,
			quantity: 5,
		}
	}

	#[test]
	fn valid_listing_passes() {
		assert!(listing().validate().is_ok());
	}

	#[test]
	fn zero_values_are_allowed() {
		let request = ListingRequest {
			price_cents: 0,
			quantity: 0,
			..listing()
		};
		assert!(request.validate().is_ok());
	}

	#[test]
	fn negative_quantity_is_rejected() {
		let update = InventoryUpdate {
			connection_id: ConnectionId::new("C1").unwrap(),
			sku: "B00TEST".to_string(),
			quantity: -1,
		};
		match update.validate() {
			Err(SandboxError::InvalidRequest(message)) => assert!(message.contains("quantity")),
			other => panic!("Expected InvalidRequest, got: {:?}", other),
		}
	}

	#[test]
	fn blank_sku_and_title_are_rejected() {
		let request = ListingRequest {
			sku: "  ".to_string(),
			..listing()
		};
		assert!(request.validate().is_err());

		let request = ListingRequest {
			title: String::new(),
			..listing()
		};
		assert!(request.validate().is_err());
	}
}
