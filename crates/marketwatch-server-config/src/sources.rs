// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sources: environment variables and TOML files.

use std::path::PathBuf;

use tracing::{debug, trace};

use marketwatch_sandbox::ENVIRONMENT_VAR;

use crate::error::ConfigError;
use crate::layer::ServerConfigLayer;
use crate::sections::{
	CheckScheduleLayer, DatabaseConfigLayer, EnvironmentConfigLayer, LoggingConfigLayer,
	MarketplaceConfigLayer, MonitoringConfigLayer,
};

/// Source precedence levels (higher = overrides lower).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
	Defaults = 10,
	ConfigFile = 20,
	Environment = 50,
}

/// Trait for configuration sources.
pub trait ConfigSource: Send + Sync {
	fn name(&self) -> &'static str;
	fn precedence(&self) -> Precedence;
	fn load(&self) -> Result<ServerConfigLayer, ConfigError>;
}

/// Built-in defaults source.
pub struct DefaultsSource;

impl ConfigSource for DefaultsSource {
	fn name(&self) -> &'static str {
		"defaults"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Defaults
	}

	fn load(&self) -> Result<ServerConfigLayer, ConfigError> {
		debug!("loading defaults");
		Ok(ServerConfigLayer::default())
	}
}

/// TOML file configuration source.
pub struct TomlSource {
	path: PathBuf,
}

impl TomlSource {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}

	pub fn system() -> Self {
		Self::new("/etc/marketwatch/server.toml")
	}
}

impl ConfigSource for TomlSource {
	fn name(&self) -> &'static str {
		"toml-config"
	}

	fn precedence(&self) -> Precedence {
		Precedence::ConfigFile
	}

	fn load(&self) -> Result<ServerConfigLayer, ConfigError> {
		if !self.path.exists() {
			debug!(path = %self.path.display(), "config file not found, skipping");
			return Ok(ServerConfigLayer::default());
		}

		debug!(path = %self.path.display(), "loading config file");
		let content = std::fs::read_to_string(&self.path).map_err(|e| ConfigError::FileRead {
			path: self.path.clone(),
			source: e,
		})?;

		let layer: ServerConfigLayer =
			toml::from_str(&content).map_err(|e| ConfigError::TomlParse {
				path: self.path.clone(),
				source: e,
			})?;

		trace!("parsed config layer from TOML");
		Ok(layer)
	}
}

/// Environment variable source.
///
/// Convention: `MARKETWATCH_<SECTION>_<FIELD>`, except the deployment
/// environment which is `MARKETWATCH_ENV`.
pub struct EnvSource;

impl ConfigSource for EnvSource {
	fn name(&self) -> &'static str {
		"environment"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Environment
	}

	fn load(&self) -> Result<ServerConfigLayer, ConfigError> {
		debug!("loading environment variables");
		Ok(ServerConfigLayer {
			database: Some(load_database_from_env()),
			environment: Some(load_environment_from_env()),
			monitoring: Some(load_monitoring_from_env()?),
			marketplaces: load_marketplaces_from_env()?,
			logging: Some(load_logging_from_env()),
		})
	}
}

fn env_var(name: &str) -> Option<String> {
	std::env::var(name).ok().filter(|s| !s.is_empty())
}

fn env_bool(name: &str) -> Option<bool> {
	env_var(name).map(|v| v.eq_ignore_ascii_case("true") || v == "1")
}

fn env_u64(name: &str) -> Result<Option<u64>, ConfigError> {
	match env_var(name) {
		Some(v) => v.parse().map(Some).map_err(|_| ConfigError::InvalidValue {
			key: name.to_string(),
			message: format!("invalid u64 value '{v}'"),
		}),
		None => Ok(None),
	}
}

fn env_usize(name: &str) -> Result<Option<usize>, ConfigError> {
	match env_var(name) {
		Some(v) => v.parse().map(Some).map_err(|_| ConfigError::InvalidValue {
			key: name.to_string(),
			message: format!("invalid usize value '{v}'"),
		}),
		None => Ok(None),
	}
}

fn load_database_from_env() -> DatabaseConfigLayer {
	DatabaseConfigLayer {
		url: env_var("MARKETWATCH_DATABASE_URL"),
	}
}

fn load_environment_from_env() -> EnvironmentConfigLayer {
	EnvironmentConfigLayer {
		name: env_var(ENVIRONMENT_VAR),
	}
}

fn load_schedule_from_env(check: &str) -> Result<CheckScheduleLayer, ConfigError> {
	Ok(CheckScheduleLayer {
		enabled: env_bool(&format!("MARKETWATCH_{check}_ENABLED")),
		interval_secs: env_u64(&format!("MARKETWATCH_{check}_INTERVAL_SECS"))?,
		timeout_ms: env_u64(&format!("MARKETWATCH_{check}_TIMEOUT_MS"))?,
	})
}

fn load_monitoring_from_env() -> Result<MonitoringConfigLayer, ConfigError> {
	Ok(MonitoringConfigLayer {
		health: Some(load_schedule_from_env("HEALTH")?),
		price: Some(load_schedule_from_env("PRICE")?),
		inventory: Some(load_schedule_from_env("INVENTORY")?),
		shutdown_grace_secs: env_u64("MARKETWATCH_SHUTDOWN_GRACE_SECS")?,
		max_concurrent_checks: env_usize("MARKETWATCH_MAX_CONCURRENT_CHECKS")?,
		result_buffer: env_usize("MARKETWATCH_RESULT_BUFFER")?,
		call_timeout_secs: env_u64("MARKETWATCH_CALL_TIMEOUT_SECS")?,
	})
}

/// `MARKETWATCH_MARKETPLACES=amazon=https://a.example.com,ebay=https://e.example.com`
fn load_marketplaces_from_env() -> Result<Option<Vec<MarketplaceConfigLayer>>, ConfigError> {
	env_var("MARKETWATCH_MARKETPLACES")
		.map(|raw| parse_marketplaces("MARKETWATCH_MARKETPLACES", &raw))
		.transpose()
}

pub(crate) fn parse_marketplaces(
	key: &str,
	raw: &str,
) -> Result<Vec<MarketplaceConfigLayer>, ConfigError> {
	raw
		.split(',')
		.map(str::trim)
		.filter(|entry| !entry.is_empty())
		.map(|entry| {
			let (id, base_url) = entry.split_once('=').ok_or_else(|| ConfigError::InvalidValue {
				key: key.to_string(),
				message: format!("expected id=url, got '{entry}'"),
			})?;
			Ok(MarketplaceConfigLayer {
				id: Some(id.trim().to_string()),
				base_url: Some(base_url.trim().to_string()),
			})
		})
		.collect()
}

fn load_logging_from_env() -> LoggingConfigLayer {
	LoggingConfigLayer {
		level: env_var("MARKETWATCH_LOG_LEVEL"),
		json: env_bool("MARKETWATCH_LOG_JSON"),
	}
}
