// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Marketplace integration gateways, one HTTP probe each.

use serde::Deserialize;
use std::collections::HashSet;

use marketwatch_monitor_core::MarketplaceId;

use crate::error::ConfigError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarketplaceConfig {
	pub id: MarketplaceId,
	pub base_url: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MarketplaceConfigLayer {
	#[serde(default)]
	pub id: Option<String>,
	#[serde(default)]
	pub base_url: Option<String>,
}

impl MarketplaceConfigLayer {
	pub fn finalize(self, index: usize) -> Result<MarketplaceConfig, ConfigError> {
		let id = self
			.id
			.filter(|id| !id.trim().is_empty())
			.ok_or_else(|| ConfigError::InvalidValue {
				key: format!("marketplaces[{index}].id"),
				message: "marketplace id is required".to_string(),
			})?;

		let base_url = self
			.base_url
			.map(|url| url.trim().to_string())
			.ok_or_else(|| ConfigError::InvalidValue {
				key: format!("marketplaces[{index}].base_url"),
				message: format!("base_url is required for marketplace '{id}'"),
			})?;
		if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
			return Err(ConfigError::InvalidValue {
				key: format!("marketplaces[{index}].base_url"),
				message: format!("expected an http(s) URL, got '{base_url}'"),
			});
		}

		Ok(MarketplaceConfig {
			id: MarketplaceId::new(id),
			base_url,
		})
	}
}

/// Resolve every entry, rejecting two gateways for the same marketplace.
pub(crate) fn finalize_all(
	layers: Vec<MarketplaceConfigLayer>,
) -> Result<Vec<MarketplaceConfig>, ConfigError> {
	let mut seen = HashSet::new();
	let mut marketplaces = Vec::with_capacity(layers.len());
	for (index, layer) in layers.into_iter().enumerate() {
		let marketplace = layer.finalize(index)?;
		if !seen.insert(marketplace.id.clone()) {
			return Err(ConfigError::Validation(format!(
				"marketplace '{}' is configured more than once",
				marketplace.id
			)));
		}
		marketplaces.push(marketplace);
	}
	Ok(marketplaces)
}
