// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

use marketwatch_monitor_core::{CheckKind, Connection, MarketplaceId};

use crate::error::ProbeError;

/// Remote side of a check: asks one marketplace integration about one connection.
///
/// Implementations perform a single attempt and never retry; the caller
/// bounds the call with the check timeout.
#[async_trait]
pub trait MarketplaceProbe: Send + Sync {
	fn marketplace_id(&self) -> &MarketplaceId;

	/// Returns the measured values for `check` (e.g. prices, stock levels).
	async fn probe(
		&self,
		connection: &Connection,
		check: CheckKind,
	) -> Result<serde_json::Value, ProbeError>;
}

/// Probes keyed by the marketplace they serve.
#[derive(Clone, Default)]
pub struct ProbeRegistry {
	probes: HashMap<MarketplaceId, Arc<dyn MarketplaceProbe>>,
}

impl ProbeRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers `probe`, replacing any probe already serving its marketplace.
	pub fn register(&mut self, probe: Arc<dyn MarketplaceProbe>) {
		self.probes.insert(probe.marketplace_id().clone(), probe);
	}

	pub fn get(&self, marketplace_id: &MarketplaceId) -> Option<&Arc<dyn MarketplaceProbe>> {
		self.probes.get(marketplace_id)
	}

	pub fn marketplaces(&self) -> Vec<&MarketplaceId> {
		let mut ids: Vec<_> = self.probes.keys().collect();
		ids.sort();
		ids
	}

	pub fn is_empty(&self) -> bool {
		self.probes.is_empty()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	struct NamedProbe {
		id: MarketplaceId,
		tag: &'static str,
	}

	#[async_trait]
	impl MarketplaceProbe for NamedProbe {
		fn marketplace_id(&self) -> &MarketplaceId {
			&self.id
		}

		async fn probe(
			&self,
			_connection: &Connection,
			_check: CheckKind,
		) -> Result<serde_json::Value, ProbeError> {
			Ok(serde_json::json!({ "tag": self.tag }))
		}
	}

	#[test]
	fn register_replaces_probe_for_same_marketplace() {
		let mut registry = ProbeRegistry::new();
		registry.register(Arc::new(NamedProbe {
			id: MarketplaceId::new("amazon"),
			tag: "first",
		}));
		registry.register(Arc::new(NamedProbe {
			id: MarketplaceId::new("ebay"),
			tag: "other",
		}));
		registry.register(Arc::new(NamedProbe {
			id: MarketplaceId::new("AMAZON"),
			tag: "second",
		}));

		let names: Vec<&str> = registry.marketplaces().iter().map(|m| m.as_str()).collect();
		assert_eq!(names, vec!["amazon", "ebay"]);
		assert!(registry.get(&MarketplaceId::new("walmart")).is_none());
	}
}
