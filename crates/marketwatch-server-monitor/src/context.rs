// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

pub use tokio_util::sync::CancellationToken;

/// Per-execution context handed to the monitoring service.
pub struct CheckContext {
	/// Execution epoch of this dispatch
	pub epoch: i64,
	pub cancellation_token: CancellationToken,
}

impl CheckContext {
	pub fn new(epoch: i64, cancellation_token: CancellationToken) -> Self {
		Self {
			epoch,
			cancellation_token,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::time::Duration;

	#[test]
	fn clones_share_cancellation() {
		let token = CancellationToken::new();
		let ctx = CheckContext::new(1, token.clone());
		assert!(!ctx.cancellation_token.is_cancelled());
		token.cancel();
		assert!(ctx.cancellation_token.is_cancelled());
	}

	#[tokio::test]
	async fn cancel_wakes_waiters() {
		let token = CancellationToken::new();
		let ctx = CheckContext::new(1, token.clone());
		let waiter = tokio::spawn(async move { ctx.cancellation_token.cancelled().await });

		token.cancel();
		tokio::time::timeout(Duration::from_secs(1), waiter)
			.await
			.expect("waiter should wake on cancel")
			.unwrap();
	}
}
