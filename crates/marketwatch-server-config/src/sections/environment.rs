// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Deployment environment. Decides whether sandbox operations are allowed.

use serde::Deserialize;

use marketwatch_sandbox::DeploymentEnvironment;

use crate::error::ConfigError;

#[derive(Debug, Clone, Default)]
pub struct EnvironmentConfig {
	pub name: DeploymentEnvironment,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EnvironmentConfigLayer {
	#[serde(default)]
	pub name: Option<String>,
}

impl EnvironmentConfigLayer {
	pub fn merge(&mut self, other: EnvironmentConfigLayer) {
		if other.name.is_some() {
			self.name = other.name;
		}
	}

	/// Unset means production; an unrecognised name is an error rather than
	/// a silent fallback.
	pub fn finalize(self) -> Result<EnvironmentConfig, ConfigError> {
		let name = match self.name {
			Some(raw) => raw.parse().map_err(|e| ConfigError::InvalidValue {
				key: "environment.name".to_string(),
				message: format!("{e}; expected one of production, sandbox, staging, development, test, local"),
			})?,
			None => DeploymentEnvironment::Production,
		};
		Ok(EnvironmentConfig { name })
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn unset_defaults_to_production() {
		let config = EnvironmentConfigLayer::default().finalize().unwrap();
		assert!(config.name.is_production());
	}

	#[test]
	fn known_name_is_parsed() {
		let layer = EnvironmentConfigLayer {
			name: Some("Staging".to_string()),
		};
		assert_eq!(layer.finalize().unwrap().name, DeploymentEnvironment::Staging);
	}

	#[test]
	fn unknown_name_is_an_error() {
		let layer = EnvironmentConfigLayer {
			name: Some("prod".to_string()),
		};
		match layer.finalize() {
			Err(ConfigError::InvalidValue { key, .. }) => assert_eq!(key, "environment.name"),
			other => panic!("Expected InvalidValue, got: {:?}", other),
		}
	}
}
