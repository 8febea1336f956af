//! Muon signing gateway client.
//!
//! The gateway is queried with a plain GET:
//! `?app=<app>&method=signature&params[tokenId]=<registrar>&params[action]=<buy|sell>&params[chain]=<id>`.
//! A successful reply carries the request id, the signed price and
//! timestamp, the nonce address shared by all signers, and one Schnorr
//! signature per node.

use crate::{OracleError, OracleFactory, OracleInterface, OracleRegistry};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::str::FromStr;
use std::time::Duration;
use synth_types::{
	Address, Bytes, ConfigSchema, Field, FieldType, ImplementationRegistry, OracleResponse, Schema,
	SchnorrSignature, SignaturePacket, TradeAction, ValidationError, U256,
};
use tracing::{debug, warn};

const DEFAULT_TIMEOUT_SECONDS: u64 = 15;
const DEFAULT_APP: &str = "synchronizer";

#[derive(Debug, Deserialize)]
struct MuonReply {
	#[serde(default)]
	success: bool,
	#[serde(default)]
	result: Option<MuonResult>,
	#[serde(default)]
	error: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MuonResult {
	req_id: String,
	data: MuonData,
	#[serde(default)]
	signatures: Vec<MuonSignature>,
}

#[derive(Debug, Deserialize)]
struct MuonData {
	result: MuonPrice,
	timestamp: serde_json::Value,
	init: MuonInit,
}

#[derive(Debug, Deserialize)]
struct MuonPrice {
	price: serde_json::Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MuonInit {
	nonce_address: Address,
}

#[derive(Debug, Deserialize)]
struct MuonSignature {
	signature: String,
	owner: Address,
}

/// Reads an integer sent either as a JSON number or as a decimal/hex string.
fn parse_u256(field: &str, value: &serde_json::Value) -> Result<U256, OracleError> {
	let parsed = match value {
		serde_json::Value::String(s) => U256::from_str(s).ok(),
		serde_json::Value::Number(n) => n.as_u64().map(U256::from),
		_ => None,
	};
	parsed.ok_or_else(|| {
		OracleError::InvalidResponse(format!("'{}' is not an integer: {}", field, value))
	})
}

fn error_text(error: &serde_json::Value) -> String {
	match error {
		serde_json::Value::String(s) => s.clone(),
		other => other
			.get("message")
			.and_then(|m| m.as_str())
			.map(str::to_string)
			.unwrap_or_else(|| other.to_string()),
	}
}

impl MuonReply {
	fn into_packet(self) -> Result<SignaturePacket, OracleError> {
		if !self.success {
			let reason = self
				.error
				.as_ref()
				.map(error_text)
				.unwrap_or_else(|| "request was not successful".to_string());
			return Err(OracleError::Declined(reason));
		}

		let result = self
			.result
			.ok_or_else(|| OracleError::InvalidResponse("missing result".to_string()))?;

		let request_id = Bytes::from_str(&result.req_id)
			.map_err(|e| OracleError::InvalidResponse(format!("invalid reqId: {}", e)))?;
		let nonce = result.data.init.nonce_address;

		let signatures = result
			.signatures
			.iter()
			.map(|s| {
				let signature = U256::from_str(&s.signature).map_err(|e| {
					OracleError::InvalidResponse(format!("invalid signature from {}: {}", s.owner, e))
				})?;
				Ok(SchnorrSignature {
					signature,
					owner: s.owner,
					nonce,
				})
			})
			.collect::<Result<Vec<_>, OracleError>>()?;

		Ok(SignaturePacket {
			price: parse_u256("price", &result.data.result.price)?,
			timestamp: parse_u256("timestamp", &result.data.timestamp)?,
			request_id,
			signatures,
		})
	}
}

/// Folds the outcome of a request into the never-failing oracle answer.
fn into_response(result: Result<SignaturePacket, OracleError>) -> OracleResponse {
	match result {
		Ok(packet) => OracleResponse::success(packet),
		Err(e) => {
			warn!(error = %e, "Oracle signature request failed");
			OracleResponse::failure(e.to_string())
		},
	}
}

pub struct MuonOracle {
	client: Client,
	base_url: String,
	app: String,
}

impl MuonOracle {
	pub fn new(
		base_url: impl Into<String>,
		app: impl Into<String>,
		timeout: Duration,
	) -> Result<Self, OracleError> {
		let client = Client::builder()
			.timeout(timeout)
			.build()
			.map_err(|e| OracleError::Network(format!("Failed to create HTTP client: {}", e)))?;

		Ok(Self {
			client,
			base_url: base_url.into(),
			app: app.into(),
		})
	}

	async fn fetch(
		&self,
		registrar: Address,
		action: TradeAction,
		chain_id: u64,
	) -> Result<SignaturePacket, OracleError> {
		let registrar = registrar.to_string();
		let chain = chain_id.to_string();

		debug!(
			url = %self.base_url,
			registrar = %registrar,
			action = %action,
			chain_id,
			"Requesting oracle signatures"
		);

		let response = self
			.client
			.get(&self.base_url)
			.query(&[
				("app", self.app.as_str()),
				("method", "signature"),
				("params[tokenId]", registrar.as_str()),
				("params[action]", action.as_str()),
				("params[chain]", chain.as_str()),
			])
			.send()
			.await
			.map_err(|e| OracleError::Network(format!("HTTP request failed: {}", e)))?;

		let status = response.status();
		if !status.is_success() {
			let body = response.text().await.unwrap_or_default();
			return Err(OracleError::Network(format!("HTTP {}: {}", status, body)));
		}

		let reply: MuonReply = response
			.json()
			.await
			.map_err(|e| OracleError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

		reply.into_packet()
	}
}

pub struct MuonOracleSchema;

impl ConfigSchema for MuonOracleSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		let schema = Schema::new(
			vec![Field::new("base_url", FieldType::String).with_validator(|value| {
				match value.as_str() {
					Some(url) if url.starts_with("http://") || url.starts_with("https://") => Ok(()),
					_ => Err("base_url must be an http(s) url".to_string()),
				}
			})],
			vec![
				Field::new("app", FieldType::String),
				Field::new(
					"timeout_seconds",
					FieldType::Integer {
						min: Some(1),
						max: Some(300),
					},
				),
			],
		);
		schema.validate(config)
	}
}

#[async_trait]
impl OracleInterface for MuonOracle {
	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(MuonOracleSchema)
	}

	async fn get_signatures(
		&self,
		registrar: Address,
		action: TradeAction,
		chain_id: u64,
	) -> OracleResponse {
		into_response(self.fetch(registrar, action, chain_id).await)
	}
}

/// Factory for `[oracle.implementations.muon]`.
///
/// Required: `base_url`. Optional: `app` (default `synchronizer`),
/// `timeout_seconds` (default 15).
pub fn create_oracle(config: &toml::Value) -> Result<Box<dyn OracleInterface>, OracleError> {
	MuonOracleSchema
		.validate(config)
		.map_err(|e| OracleError::Configuration(format!("Invalid configuration: {}", e)))?;

	let base_url = config
		.get("base_url")
		.and_then(|v| v.as_str())
		.ok_or_else(|| OracleError::Configuration("base_url is required".to_string()))?;
	let app = config
		.get("app")
		.and_then(|v| v.as_str())
		.unwrap_or(DEFAULT_APP);
	let timeout = config
		.get("timeout_seconds")
		.and_then(|v| v.as_integer())
		.map(|s| s as u64)
		.unwrap_or(DEFAULT_TIMEOUT_SECONDS);

	Ok(Box::new(MuonOracle::new(
		base_url,
		app,
		Duration::from_secs(timeout),
	)?))
}

pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "muon";
	type Factory = OracleFactory;

	fn factory() -> Self::Factory {
		create_oracle
	}
}

impl OracleRegistry for Registry {}

#[cfg(test)]
mod tests {
	use super::*;

	fn reply(json: serde_json::Value) -> MuonReply {
		serde_json::from_value(json).unwrap()
	}

	#[test]
	fn test_packet_decoding() {
		let packet = reply(serde_json::json!({
			"success": true,
			"result": {
				"reqId": "0x01ab",
				"data": {
					"result": { "price": "1230000000000000000" },
					"timestamp": 1650000000,
					"init": { "nonceAddress": "0x2000000000000000000000000000000000000002" }
				},
				"signatures": [
					{ "signature": "0x0f", "owner": "0x3000000000000000000000000000000000000003" },
					{ "signature": "42", "owner": "0x4000000000000000000000000000000000000004" }
				]
			}
		}))
		.into_packet()
		.unwrap();

		assert_eq!(packet.price, U256::from(1_230_000_000_000_000_000u64));
		assert_eq!(packet.timestamp, U256::from(1_650_000_000u64));
		assert_eq!(packet.request_id, Bytes::from(vec![0x01, 0xab]));
		assert_eq!(packet.signatures.len(), 2);
		assert_eq!(packet.signatures[0].signature, U256::from(15u64));
		assert_eq!(packet.signatures[1].signature, U256::from(42u64));
		let nonce = Address::from_str("0x2000000000000000000000000000000000000002").unwrap();
		assert!(packet.signatures.iter().all(|s| s.nonce == nonce));
	}

	#[test]
	fn test_unsuccessful_reply() {
		let err = reply(serde_json::json!({
			"success": false,
			"error": { "message": "price is stale" }
		}))
		.into_packet()
		.unwrap_err();
		assert!(matches!(err, OracleError::Declined(_)));
		assert_eq!(err.to_string(), "price is stale");

		let err = reply(serde_json::json!({ "success": true })).into_packet().unwrap_err();
		assert!(err.to_string().contains("missing result"));
	}

	#[test]
	fn test_declined_reason_reaches_caller_verbatim() {
		let declined = reply(serde_json::json!({ "success": false, "error": "price is stale" }));
		let response = into_response(declined.into_packet());
		assert!(!response.success);
		assert_eq!(response.error.as_deref(), Some("price is stale"));

		let malformed = reply(serde_json::json!({ "success": true }));
		let response = into_response(malformed.into_packet());
		assert!(response
			.error
			.unwrap()
			.starts_with("Invalid response: missing result"));
	}

	#[test]
	fn test_factory_validation() {
		let config: toml::Value =
			toml::from_str("base_url = \"https://oracle.example/v1\"").unwrap();
		assert!(create_oracle(&config).is_ok());

		let config: toml::Value = toml::from_str("app = \"synchronizer\"").unwrap();
		assert!(matches!(
			create_oracle(&config),
			Err(OracleError::Configuration(_))
		));
	}

	#[tokio::test]
	async fn test_unreachable_gateway_is_failure_value() {
		let oracle =
			MuonOracle::new("http://127.0.0.1:9", DEFAULT_APP, Duration::from_secs(2)).unwrap();
		let response = oracle
			.get_signatures(Address::ZERO, TradeAction::Sell, 56)
			.await;
		assert!(!response.success);
		assert!(response.data.is_none());
		assert!(response.error.unwrap().starts_with("Network error"));
	}
}
