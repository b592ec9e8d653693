// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Generic HTTP marketplace probe.
//!
//! Talks to a marketplace integration gateway exposing
//! `GET {base_url}/v1/connections/{connection_id}/{check}?region={region}`
//! and returning the measured values as a JSON document.

use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use std::time::Duration;
use tracing::{debug, instrument};

use marketwatch_monitor_core::{CheckKind, Connection, MarketplaceId};

use crate::error::ProbeError;
use crate::probe::MarketplaceProbe;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const MAX_ERROR_BODY_BYTES: usize = 512;

pub struct HttpMarketplaceProbe {
	marketplace_id: MarketplaceId,
	base_url: Url,
	client: reqwest::Client,
}

impl HttpMarketplaceProbe {
	pub fn new(marketplace_id: MarketplaceId, base_url: &str) -> Result<Self, ProbeError> {
		let base_url = Url::parse(base_url)
			.map_err(|e| ProbeError::Transport(format!("invalid base URL '{base_url}': {e}")))?;
		if !matches!(base_url.scheme(), "http" | "https") || base_url.cannot_be_a_base() {
			return Err(ProbeError::Transport(format!(
				"base URL must be http(s): {base_url}"
			)));
		}

		let client = reqwest::Client::builder()
			.connect_timeout(CONNECT_TIMEOUT)
			.user_agent(concat!("marketwatch/", env!("CARGO_PKG_VERSION")))
			.build()
			.map_err(|e| ProbeError::Transport(e.to_string()))?;

		Ok(Self {
			marketplace_id,
			base_url,
			client,
		})
	}

	fn endpoint(&self, connection: &Connection, check: CheckKind) -> Result<Url, ProbeError> {
		let mut url = self.base_url.clone();
		url
			.path_segments_mut()
			.map_err(|_| ProbeError::Transport(format!("base URL cannot be a base: {}", self.base_url)))?
			.pop_if_empty()
			.extend(["v1", "connections", connection.id.as_str(), check.as_str()]);
		url
			.query_pairs_mut()
			.append_pair("region", &connection.region);
		Ok(url)
	}
}

#[async_trait]
impl MarketplaceProbe for HttpMarketplaceProbe {
	fn marketplace_id(&self) -> &MarketplaceId {
		&self.marketplace_id
	}

	#[instrument(skip(self, connection), fields(marketplace = %self.marketplace_id, connection_id = %connection.id, check = %check))]
	async fn probe(
		&self,
		connection: &Connection,
		check: CheckKind,
	) -> Result<serde_json::Value, ProbeError> {
		let url = self.endpoint(connection, check)?;
		debug!(url = %url, "probing marketplace");

		let response = self
			.client
			.get(url)
			.send()
			.await
			.map_err(|e| ProbeError::Transport(e.to_string()))?;

		let status = response.status();
		if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
			let body = error_body(response).await;
			return Err(ProbeError::Unauthorized(format!("{status}: {body}")));
		}
		if !status.is_success() {
			let body = error_body(response).await;
			return Err(ProbeError::Remote {
				status: status.as_u16(),
				message: body,
			});
		}

		response
			.json::<serde_json::Value>()
			.await
			.map_err(|e| ProbeError::InvalidResponse(e.to_string()))
	}
}

/// Reads at most [`MAX_ERROR_BODY_BYTES`] of an error body; the rest is
/// never pulled off the wire.
async fn error_body(mut response: reqwest::Response) -> String {
	let mut body = Vec::with_capacity(MAX_ERROR_BODY_BYTES);
	while body.len() < MAX_ERROR_BODY_BYTES {
		match response.chunk().await {
			Ok(Some(chunk)) => {
				let take = chunk.len().min(MAX_ERROR_BODY_BYTES - body.len());
				body.extend_from_slice(&chunk[..take]);
			}
			Ok(None) | Err(_) => break,
		}
	}
	// The cap may split a multi-byte character at the end.
	if let Err(e) = std::str::from_utf8(&body) {
		if e.error_len().is_none() {
			body.truncate(e.valid_up_to());
		}
	}
	String::from_utf8_lossy(&body).into_owned()
}

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::Utc;
	use marketwatch_monitor_core::{ConnectionId, ConnectionStatus};
	use wiremock::matchers::{method, path, query_param};
	use wiremock::{Mock, MockServer, ResponseTemplate};

	fn connection(id: &str) -> Connection {
		Connection {
			id: ConnectionId::new(id).unwrap(),
			marketplace_id: MarketplaceId::new("amazon"),
			region: "eu".to_string(),
			status: ConnectionStatus::Active,
			created_at: Utc::now(),
			updated_at: Utc::now(),
		}
	}

	async fn probe_for(server: &MockServer) -> HttpMarketplaceProbe {
		HttpMarketplaceProbe::new(MarketplaceId::new("amazon"), &server.uri()).unwrap()
	}

	#[test]
	fn new_rejects_non_http_base_url() {
		assert!(HttpMarketplaceProbe::new(MarketplaceId::new("amazon"), "ftp://example.com").is_err());
		assert!(HttpMarketplaceProbe::new(MarketplaceId::new("amazon"), "not a url").is_err());
	}

	#[test]
	fn endpoint_escapes_connection_id_and_keeps_base_path() {
		let probe =
			HttpMarketplaceProbe::new(MarketplaceId::new("amazon"), "https://gw.example.com/api/").unwrap();
		let url = probe
			.endpoint(&connection("seller?1"), CheckKind::Inventory)
			.unwrap();
		assert_eq!(
			url.as_str(),
			"https://gw.example.com/api/v1/connections/seller%3F1/inventory?region=eu"
		);
	}

	#[tokio::test]
	async fn success_returns_json_payload() {
		let server = MockServer::start().await;
		Mock::given(method("GET"))
			.and(path("/v1/connections/C1/price"))
			.and(query_param("region", "eu"))
			.respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
				"sku": "B00TEST",
				"price_cents": 1999
			})))
			.expect(1)
			.mount(&server)
			.await;

		let payload = probe_for(&server)
			.await
			.probe(&connection("C1"), CheckKind::Price)
			.await
			.unwrap();
		assert_eq!(payload["price_cents"], 1999);
	}

	#[tokio::test]
	async fn forbidden_maps_to_unauthorized() {
		let server = MockServer::start().await;
		Mock::given(method("GET"))
			.respond_with(ResponseTemplate::new(403).set_body_string("token revoked"))
			.mount(&server)
			.await;

		let err = probe_for(&server)
			.await
			.probe(&connection("C1"), CheckKind::Health)
			.await
			.unwrap_err();
		match err {
			ProbeError::Unauthorized(message) => assert!(message.contains("token revoked")),
			e => panic!("Expected Unauthorized, got: {:?}", e),
		}
	}

	#[tokio::test]
	async fn server_error_maps_to_remote_with_status() {
		let server = MockServer::start().await;
		Mock::given(method("GET"))
			.respond_with(ResponseTemplate::new(503).set_body_string("x".repeat(4096)))
			.mount(&server)
			.await;

		let err = probe_for(&server)
			.await
			.probe(&connection("C1"), CheckKind::Inventory)
			.await
			.unwrap_err();
		match err {
			ProbeError::Remote { status, message } => {
				assert_eq!(status, 503);
				assert_eq!(message.len(), MAX_ERROR_BODY_BYTES);
			}
			e => panic!("Expected Remote, got: {:?}", e),
		}
	}

	#[tokio::test]
	async fn error_body_cap_keeps_whole_characters() {
		let server = MockServer::start().await;
		let body = format!("a{}", "é".repeat(1000));
		Mock::given(method("GET"))
			.respond_with(ResponseTemplate::new(502).set_body_string(body))
			.mount(&server)
			.await;

		let err = probe_for(&server)
			.await
			.probe(&connection("C1"), CheckKind::Price)
			.await
			.unwrap_err();
		match err {
			ProbeError::Remote { status, message } => {
				assert_eq!(status, 502);
				assert_eq!(message, format!("a{}", "é".repeat(255)));
				assert!(!message.contains(char::REPLACEMENT_CHARACTER));
			}
			e => panic!("Expected Remote, got: {:?}", e),
		}
	}

	#[tokio::test]
	async fn non_json_body_is_invalid_response() {
		let server = MockServer::start().await;
		Mock::given(method("GET"))
			.respond_with(ResponseTemplate::new(200).set_body_string("<html>ok</html>"))
			.mount(&server)
			.await;

		let err = probe_for(&server)
			.await
			.probe(&connection("C1"), CheckKind::Health)
			.await
			.unwrap_err();
		assert!(matches!(err, ProbeError::InvalidResponse(_)));
	}

	#[tokio::test]
	async fn unreachable_gateway_is_transport_error() {
		let probe =
			HttpMarketplaceProbe::new(MarketplaceId::new("amazon"), "http://127.0.0.1:1").unwrap();
		let err = probe
			.probe(&connection("C1"), CheckKind::Health)
			.await
			.unwrap_err();
		assert!(matches!(err, ProbeError::Transport(_)));
	}
}
