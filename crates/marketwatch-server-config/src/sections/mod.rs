// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

mod database;
mod environment;
mod logging;
pub(crate) mod marketplaces;
mod monitoring;

pub use database::{DatabaseConfig, DatabaseConfigLayer};
pub use environment::{EnvironmentConfig, EnvironmentConfigLayer};
pub use logging::{LoggingConfig, LoggingConfigLayer};
pub use marketplaces::{MarketplaceConfig, MarketplaceConfigLayer};
pub use monitoring::{CheckScheduleConfig, CheckScheduleLayer, MonitoringConfig, MonitoringConfigLayer};
