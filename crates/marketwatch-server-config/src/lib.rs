// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration management for the Marketwatch server.
//!
//! This crate provides:
//! - Layered configuration from multiple sources (defaults, TOML file, environment)
//! - Type-safe configuration with validation
//! - Consistent environment variable naming (`MARKETWATCH_*`)
//!
//! # Usage
//!
//! ```ignore
//! use marketwatch_server_config::load_config;
//!
//! let config = load_config()?;
//! println!("Monitoring {} marketplaces", config.marketplaces.len());
//! ```

pub mod error;
pub mod layer;
pub mod sections;
pub mod sources;

pub use error::ConfigError;
pub use layer::ServerConfigLayer;
pub use sections::*;
pub use sources::{ConfigSource, DefaultsSource, EnvSource, Precedence, TomlSource};

use tracing::{debug, info};

/// Fully resolved server configuration.
#[derive(Debug, Clone, Default)]
pub struct ServerConfig {
	pub database: DatabaseConfig,
	pub environment: EnvironmentConfig,
	pub monitoring: MonitoringConfig,
	pub marketplaces: Vec<MarketplaceConfig>,
	pub logging: LoggingConfig,
}

/// Load configuration from all sources with standard precedence.
///
/// Precedence (highest to lowest):
/// 1. Environment variables (`MARKETWATCH_*`)
/// 2. Config file (`/etc/marketwatch/server.toml`)
/// 3. Built-in defaults
pub fn load_config() -> Result<ServerConfig, ConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::system()),
		Box::new(EnvSource),
	])
}

/// Load configuration with a custom config file path.
pub fn load_config_with_file(
	config_path: impl Into<std::path::PathBuf>,
) -> Result<ServerConfig, ConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::new(config_path)),
		Box::new(EnvSource),
	])
}

/// Merge `sources` in precedence order and resolve the result.
pub fn load_from_sources(
	mut sources: Vec<Box<dyn ConfigSource>>,
) -> Result<ServerConfig, ConfigError> {
	sources.sort_by_key(|s| s.precedence());

	let mut merged = ServerConfigLayer::default();
	for source in sources {
		debug!(source = source.name(), "loading configuration source");
		let layer = source.load()?;
		merged.merge(layer);
	}

	finalize(merged)
}

/// Finalize configuration layer into resolved config.
fn finalize(layer: ServerConfigLayer) -> Result<ServerConfig, ConfigError> {
	let database = layer.database.unwrap_or_default().finalize();
	let environment = layer.environment.unwrap_or_default().finalize()?;
	let monitoring = layer.monitoring.unwrap_or_default().finalize();
	let marketplaces = sections::marketplaces::finalize_all(layer.marketplaces.unwrap_or_default())?;
	let logging = layer.logging.unwrap_or_default().finalize();

	validate_config(&monitoring)?;

	info!(
		environment = %environment.name,
		database = %database.url,
		checks = monitoring.definitions().len(),
		marketplaces = marketplaces.len(),
		max_concurrent_checks = monitoring.max_concurrent_checks,
		"Server configuration loaded"
	);

	Ok(ServerConfig {
		database,
		environment,
		monitoring,
		marketplaces,
		logging,
	})
}

/// Validate cross-field configuration rules.
fn validate_config(monitoring: &MonitoringConfig) -> Result<(), ConfigError> {
	let definitions = monitoring.definitions();
	if definitions.is_empty() {
		return Err(ConfigError::Validation(
			"every check is disabled; enable at least one of monitoring.health, \
			 monitoring.price or monitoring.inventory"
				.to_string(),
		));
	}
	for definition in &definitions {
		definition
			.validate()
			.map_err(|e| ConfigError::Validation(e.to_string()))?;
	}

	if monitoring.max_concurrent_checks == 0 {
		return Err(ConfigError::Validation(
			"monitoring.max_concurrent_checks must be greater than zero".to_string(),
		));
	}
	if monitoring.result_buffer == 0 {
		return Err(ConfigError::Validation(
			"monitoring.result_buffer must be greater than zero".to_string(),
		));
	}
	if monitoring.call_timeout_secs == 0 {
		return Err(ConfigError::Validation(
			"monitoring.call_timeout_secs must be greater than zero".to_string(),
		));
	}

	Ok(())
}
