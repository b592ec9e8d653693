// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

use marketwatch_monitor_core::ConnectionId;
use marketwatch_sandbox::{InventoryUpdate, ListingRequest, PriceUpdate};

/// Marketwatch server - recurring health, price and inventory checks
/// against marketplace connections.
#[derive(Parser, Debug)]
#[command(name = "marketwatch-server", about = "Marketplace monitoring server", version)]
pub struct Args {
	/// Config file; defaults to /etc/marketwatch/server.toml
	#[arg(long, global = true, env = "MARKETWATCH_CONFIG")]
	pub config: Option<PathBuf>,

	#[command(subcommand)]
	pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
	/// Run the monitoring orchestrator until interrupted (default)
	Run,
	/// Run one sandbox operation; refused in production
	#[command(subcommand)]
	Simulate(SimulateCommand),
	/// Show version and build information
	Version,
}

#[derive(Subcommand, Debug)]
pub enum SimulateCommand {
	/// Create a simulated listing
	Listing(ListingArgs),
	/// Set the simulated stock level of a sku
	Inventory(InventoryArgs),
	/// Set the simulated price of a sku
	Price(PriceArgs),
}

#[derive(ClapArgs, Debug)]
pub struct ListingArgs {
	#[arg(long)]
	pub connection: ConnectionId,
	#[arg(long)]
	pub sku: String,
	#[arg(long)]
	pub title: String,
	#[arg(long, allow_negative_numbers = true)]
	pub price_cents: i64,
	#[arg(long, allow_negative_numbers = true, default_value_t = 1)]
	pub quantity: i64,
}

#[derive(ClapArgs, Debug)]
pub struct InventoryArgs {
	#[arg(long)]
	pub connection: ConnectionId,
	#[arg(long)]
	pub sku: String,
	#[arg(long, allow_negative_numbers = true)]
	pub quantity: i64,
}

#[derive(ClapArgs, Debug)]
pub struct PriceArgs {
	#[arg(long)]
	pub connection: ConnectionId,
	#[arg(long)]
	pub sku: String,
	#[arg(long, allow_negative_numbers = true)]
	pub price_cents: i64,
}

impl From<ListingArgs> for ListingRequest {
	fn from(args: ListingArgs) -> Self {
		ListingRequest {
			connection_id: args.connection,
			sku: args.sku,
			title: args.title,
			price_cents: args.price_cents,
			quantity: args.quantity,
		}
	}
}

impl From<InventoryArgs> for InventoryUpdate {
	fn from(args: InventoryArgs) -> Self {
		InventoryUpdate {
			connection_id: args.connection,
			sku: args.sku,
			quantity: args.quantity,
		}
	}
}

impl From<PriceArgs> for PriceUpdate {
	fn from(args: PriceArgs) -> Self {
		PriceUpdate {
			connection_id: args.connection,
			sku: args.sku,
			price_cents: args.price_cents,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use clap::CommandFactory;

	#[test]
	fn cli_definition_is_consistent() {
		Args::command().debug_assert();
	}

	#[test]
	fn no_subcommand_means_run() {
		let args = Args::try_parse_from(["marketwatch-server"]).unwrap();
		assert!(args.command.is_none());
		assert!(args.config.is_none());
	}

	#[test]
	fn config_flag_is_accepted_after_subcommand() {
		let args =
			Args::try_parse_from(["marketwatch-server", "run", "--config", "/tmp/mw.toml"]).unwrap();
		assert!(matches!(args.command, Some(Command::Run)));
		assert_eq!(args.config, Some(PathBuf::from("/tmp/mw.toml")));
	}

	#[test]
	fn simulate_listing_builds_request() {
		let args = Args::try_parse_from([
			"marketwatch-server",
			"simulate",
			"listing",
			"--connection",
			"C1",
			"--sku",
			"B00TEST",
			"--title",
			"Widget",
			"--price-cents",
			"1999",
		])
		.unwrap();

		let Some(Command::Simulate(SimulateCommand::Listing(listing))) = args.command else {
			panic!("expected simulate listing");
		};
		let request = ListingRequest::from(listing);
		assert_eq!(request.connection_id.as_str(), "C1");
		assert_eq!(request.price_cents, 1999);
		assert_eq!(request.quantity, 1);
	}

	#[test]
	fn simulate_price_accepts_negative_values() {
		let args = Args::try_parse_from([
			"marketwatch-server",
			"simulate",
			"price",
			"--connection",
			"C1",
			"--sku",
			"B00TEST",
			"--price-cents",
			"-5",
		])
		.unwrap();
		let Some(Command::Simulate(SimulateCommand::Price(price))) = args.command else {
			panic!("expected simulate price");
		};
		assert_eq!(PriceUpdate::from(price).price_cents, -5);
	}

	#[test]
	fn invalid_connection_id_is_rejected() {
		let result = Args::try_parse_from([
			"marketwatch-server",
			"simulate",
			"inventory",
			"--connection",
			"a/b",
			"--sku",
			"B00TEST",
			"--quantity",
			"3",
		]);
		assert!(result.is_err());
	}
}
