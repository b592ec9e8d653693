// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Partial configuration as produced by a single source.

use serde::Deserialize;

use crate::sections::{
	DatabaseConfigLayer, EnvironmentConfigLayer, LoggingConfigLayer, MarketplaceConfigLayer,
	MonitoringConfigLayer,
};

/// One source's view of the configuration. Unset fields defer to lower
/// precedence sources.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfigLayer {
	#[serde(default)]
	pub database: Option<DatabaseConfigLayer>,
	#[serde(default)]
	pub environment: Option<EnvironmentConfigLayer>,
	#[serde(default)]
	pub monitoring: Option<MonitoringConfigLayer>,
	/// Replaces the whole list when set
	#[serde(default)]
	pub marketplaces: Option<Vec<MarketplaceConfigLayer>>,
	#[serde(default)]
	pub logging: Option<LoggingConfigLayer>,
}

impl ServerConfigLayer {
	pub fn merge(&mut self, other: ServerConfigLayer) {
		merge_section(&mut self.database, other.database, DatabaseConfigLayer::merge);
		merge_section(
			&mut self.environment,
			other.environment,
			EnvironmentConfigLayer::merge,
		);
		merge_section(
			&mut self.monitoring,
			other.monitoring,
			MonitoringConfigLayer::merge,
		);
		if other.marketplaces.is_some() {
			self.marketplaces = other.marketplaces;
		}
		merge_section(&mut self.logging, other.logging, LoggingConfigLayer::merge);
	}
}

fn merge_section<T>(base: &mut Option<T>, other: Option<T>, merge: fn(&mut T, T)) {
	if let Some(incoming) = other {
		match base {
			Some(existing) => merge(existing, incoming),
			None => *base = Some(incoming),
		}
	}
}
