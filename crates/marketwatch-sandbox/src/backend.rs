// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, instrument};
use uuid::Uuid;

use marketwatch_monitor_core::ConnectionId;

use crate::error::Result;
use crate::request::{InventoryUpdate, ListingRequest, PriceUpdate, SimulatedListing, SimulatedUpdate};

/// Executes simulated marketplace operations. Only reachable through the gate.
#[async_trait]
pub trait SandboxBackend: Send + Sync {
	async fn create_listing(&self, request: ListingRequest) -> Result<SimulatedListing>;
	async fn update_inventory(&self, update: InventoryUpdate) -> Result<SimulatedUpdate>;
	async fn update_price(&self, update: PriceUpdate) -> Result<SimulatedUpdate>;
}

type ListingKey = (ConnectionId, String);

/// Keeps simulated listings in process memory, keyed by (connection, sku).
#[derive(Default)]
pub struct InMemorySandboxBackend {
	listings: RwLock<HashMap<ListingKey, SimulatedListing>>,
}

impl InMemorySandboxBackend {
	pub fn new() -> Self {
		Self::default()
	}

	pub async fn listing(&self, connection_id: &ConnectionId, sku: &str) -> Option<SimulatedListing> {
		self
			.listings
			.read()
			.await
			.get(&(connection_id.clone(), sku.to_string()))
			.cloned()
	}

	pub async fn len(&self) -> usize {
		self.listings.read().await.len()
	}

	pub async fn is_empty(&self) -> bool {
		self.listings.read().await.is_empty()
	}
}

fn synthetic_id(prefix: &str) -> String {
	format!("{prefix}-{}", Uuid::new_v4().simple())
}

#[async_trait]
impl SandboxBackend for InMemorySandboxBackend {
	#[instrument(skip(self, request), fields(connection_id = %request.connection_id, sku = %request.sku))]
	async fn create_listing(&self, request: ListingRequest) -> Result<SimulatedListing> {
		request.validate()?;

		let now = Utc::now();
		let listing = SimulatedListing {
			listing_id: synthetic_id("sbx"),
			connection_id: request.connection_id,
			sku: request.sku,
			title: request.title,
			price_cents: request.price_cents,
			quantity: request.quantity,
			created_at: now,
			updated_at: now,
		};

		let key = (listing.connection_id.clone(), listing.sku.clone());
		self.listings.write().await.insert(key, listing.clone());
		debug!(listing_id = %listing.listing_id, "Simulated listing created");
		Ok(listing)
	}

	#[instrument(skip(self, update), fields(connection_id = %update.connection_id, sku = %update.sku))]
	async fn update_inventory(&self, update: InventoryUpdate) -> Result<SimulatedUpdate> {
		update.validate()?;

		let now = Utc::now();
		let mut listings = self.listings.write().await;
		let previous = listings
			.get_mut(&(update.connection_id.clone(), update.sku.clone()))
			.map(|listing| {
				let previous = listing.quantity;
				listing.quantity = update.quantity;
				listing.updated_at = now;
				previous
			});

		Ok(SimulatedUpdate {
			update_id: synthetic_id("sbx-inv"),
			connection_id: update.connection_id,
			sku: update.sku,
			previous,
			applied: update.quantity,
			applied_at: now,
		})
	}

	#[instrument(skip(self, update), fields(connection_id = %update.connection_id, sku = %update.sku))]
	async fn update_price(&self, update: PriceUpdate) -> Result<SimulatedUpdate> {
		update.validate()?;

		let now = Utc::now();
		let mut listings = self.listings.write().await;
		let previous = listings
			.get_mut(&(update.connection_id.clone(), update.sku.clone()))
			.map(|listing| {
				let previous = listing.price_cents;
				listing.price_cents = update.price_cents;
				listing.updated_at = now;
				previous
			});

		Ok(SimulatedUpdate {
			update_id: synthetic_id("sbx-price"),
			connection_id: update.connection_id,
			sku: update.sku,
			previous,
			applied: update.price_cents,
			applied_at: now,
		})
	}
}
