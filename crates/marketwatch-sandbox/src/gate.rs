// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::fmt;
use std::sync::Arc;
use tracing::{error, info, instrument};

use crate::backend::SandboxBackend;
use crate::environment::DeploymentEnvironment;
use crate::error::{Result, SandboxDisabledError, SandboxOperation};
use crate::request::{InventoryUpdate, ListingRequest, PriceUpdate, SimulatedListing, SimulatedUpdate};

/// Decides once, at construction, whether sandbox operations may run.
///
/// A production gate holds no backend, so a denied operation cannot reach
/// one. There is no way to switch variants afterwards.
pub enum SandboxGate {
	Production,
	Sandbox(Arc<dyn SandboxBackend>),
}

impl SandboxGate {
	pub fn for_environment(
		environment: DeploymentEnvironment,
		backend: Arc<dyn SandboxBackend>,
	) -> Self {
		if environment.is_production() {
			info!(environment = %environment, "Sandbox operations disabled");
			Self::Production
		} else {
			info!(environment = %environment, "Sandbox operations enabled");
			Self::Sandbox(backend)
		}
	}

	pub fn is_enabled(&self) -> bool {
		matches!(self, Self::Sandbox(_))
	}

	fn backend(
		&self,
		operation: SandboxOperation,
	) -> std::result::Result<&dyn SandboxBackend, SandboxDisabledError> {
		match self {
			Self::Sandbox(backend) => Ok(backend.as_ref()),
			Self::Production => {
				error!(operation = %operation, "Sandbox operation denied in production");
				Err(SandboxDisabledError { operation })
			}
		}
	}

	#[instrument(skip(self, request), fields(connection_id = %request.connection_id, sku = %request.sku))]
	pub async fn simulate_listing_creation(&self, request: ListingRequest) -> Result<SimulatedListing> {
		let backend = self.backend(SandboxOperation::ListingCreation)?;
		backend.create_listing(request).await
	}

	#[instrument(skip(self, update), fields(connection_id = %update.connection_id, sku = %update.sku))]
	pub async fn simulate_inventory_update(&self, update: InventoryUpdate) -> Result<SimulatedUpdate> {
		let backend = self.backend(SandboxOperation::InventoryUpdate)?;
		backend.update_inventory(update).await
	}

	#[instrument(skip(self, update), fields(connection_id = %update.connection_id, sku = %update.sku))]
	pub async fn simulate_price_update(&self, update: PriceUpdate) -> Result<SimulatedUpdate> {
		let backend = self.backend(SandboxOperation::PriceUpdate)?;
		backend.update_price(update).await
	}
}

impl fmt::Debug for SandboxGate {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Production => write!(f, "SandboxGate::Production"),
			Self::Sandbox(_) => write!(f, "SandboxGate::Sandbox"),
		}
	}
}
