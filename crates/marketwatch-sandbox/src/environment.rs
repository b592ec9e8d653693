// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Environment variable naming the deployment environment.
pub const ENVIRONMENT_VAR: &str = "MARKETWATCH_ENV";

/// Where this process is deployed. Only `Production` disables the sandbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeploymentEnvironment {
	#[default]
	Production,
	Sandbox,
	Staging,
	Development,
	Test,
	Local,
}

impl DeploymentEnvironment {
	pub const ALL: [DeploymentEnvironment; 6] = [
		Self::Production,
		Self::Sandbox,
		Self::Staging,
		Self::Development,
		Self::Test,
		Self::Local,
	];

	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Production => "production",
			Self::Sandbox => "sandbox",
			Self::Staging => "staging",
			Self::Development => "development",
			Self::Test => "test",
			Self::Local => "local",
		}
	}

	pub fn is_production(&self) -> bool {
		matches!(self, Self::Production)
	}
}

impl fmt::Display for DeploymentEnvironment {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown deployment environment '{0}'")]
pub struct UnknownEnvironment(pub String);

impl FromStr for DeploymentEnvironment {
	type Err = UnknownEnvironment;

	/// Case-insensitive; surrounding whitespace is ignored.
	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let normalized = s.trim().to_ascii_lowercase();
		Self::ALL
			.into_iter()
			.find(|env| env.as_str() == normalized)
			.ok_or_else(|| UnknownEnvironment(s.to_string()))
	}
}
