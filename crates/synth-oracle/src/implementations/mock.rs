//! Fixed-answer oracle for local development and tests.

use crate::{OracleError, OracleFactory, OracleInterface, OracleRegistry};
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use synth_types::{
	current_timestamp, Address, Bytes, ConfigSchema, Field, FieldType, ImplementationRegistry,
	OracleResponse, Schema, SchnorrSignature, SignaturePacket, TradeAction, ValidationError, U256,
};

/// Settings of `[oracle.implementations.mock]`.
#[derive(Debug, Clone, Deserialize)]
pub struct MockOracleConfig {
	/// Price in whole units, scaled to 18 decimals in the packet.
	#[serde(default = "default_price")]
	pub price: Decimal,
	/// Fixed timestamp; the current time when unset.
	#[serde(default)]
	pub timestamp: Option<u64>,
	#[serde(default = "default_request_id")]
	pub request_id: Bytes,
	#[serde(default = "default_signers")]
	pub signers: Vec<Address>,
	/// When set, every request fails with this message.
	#[serde(default)]
	pub fail_with: Option<String>,
}

fn default_price() -> Decimal {
	Decimal::ONE
}

fn default_request_id() -> Bytes {
	Bytes::from(vec![0x01])
}

fn default_signers() -> Vec<Address> {
	vec![Address::repeat_byte(0x11)]
}

impl Default for MockOracleConfig {
	fn default() -> Self {
		Self {
			price: default_price(),
			timestamp: None,
			request_id: default_request_id(),
			signers: default_signers(),
			fail_with: None,
		}
	}
}

/// Scales a decimal price to 18-decimal fixed point.
fn to_fixed_point(price: Decimal) -> Option<U256> {
	let scaled = price.checked_mul(Decimal::from(1_000_000_000_000_000_000u64))?;
	if scaled.is_sign_negative() {
		return None;
	}
	U256::from_str(&scaled.trunc().normalize().to_string()).ok()
}

pub struct MockOracle {
	config: MockOracleConfig,
	requests: AtomicUsize,
	last_request: Mutex<Option<(Address, TradeAction, u64)>>,
}

impl MockOracle {
	pub fn new(config: MockOracleConfig) -> Self {
		Self {
			config,
			requests: AtomicUsize::new(0),
			last_request: Mutex::new(None),
		}
	}

	/// Oracle whose every request fails with `message`.
	pub fn failing(message: impl Into<String>) -> Self {
		Self::new(MockOracleConfig {
			fail_with: Some(message.into()),
			..Default::default()
		})
	}

	/// Number of signature requests received so far.
	pub fn request_count(&self) -> usize {
		self.requests.load(Ordering::SeqCst)
	}

	/// Registrar, action and chain of the most recent request.
	pub fn last_request(&self) -> Option<(Address, TradeAction, u64)> {
		self.last_request.lock().ok().and_then(|last| *last)
	}
}

pub struct MockOracleSchema;

impl ConfigSchema for MockOracleSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		let schema = Schema::new(
			vec![],
			vec![
				Field::new("price", FieldType::Decimal),
				Field::new(
					"timestamp",
					FieldType::Integer {
						min: Some(0),
						max: None,
					},
				),
				Field::new("request_id", FieldType::String),
				Field::new("signers", FieldType::Array(Box::new(FieldType::Address))),
				Field::new("fail_with", FieldType::String),
			],
		);
		schema.validate(config)
	}
}

#[async_trait]
impl OracleInterface for MockOracle {
	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(MockOracleSchema)
	}

	async fn get_signatures(
		&self,
		registrar: Address,
		action: TradeAction,
		chain_id: u64,
	) -> OracleResponse {
		self.requests.fetch_add(1, Ordering::SeqCst);
		if let Ok(mut last) = self.last_request.lock() {
			*last = Some((registrar, action, chain_id));
		}

		if let Some(message) = &self.config.fail_with {
			return OracleResponse::failure(message.clone());
		}

		let Some(price) = to_fixed_point(self.config.price) else {
			return OracleResponse::failure(format!("Price {} out of range", self.config.price));
		};
		let timestamp = self.config.timestamp.unwrap_or_else(current_timestamp);

		OracleResponse::success(SignaturePacket {
			price,
			timestamp: U256::from(timestamp),
			request_id: self.config.request_id.clone(),
			signatures: self
				.config
				.signers
				.iter()
				.enumerate()
				.map(|(i, owner)| SchnorrSignature {
					signature: U256::from(i + 1),
					owner: *owner,
					nonce: *owner,
				})
				.collect(),
		})
	}
}

/// Factory for `[oracle.implementations.mock]`. Every field is optional.
pub fn create_oracle(config: &toml::Value) -> Result<Box<dyn OracleInterface>, OracleError> {
	MockOracleSchema
		.validate(config)
		.map_err(|e| OracleError::Configuration(format!("Invalid configuration: {}", e)))?;

	let config: MockOracleConfig = config
		.clone()
		.try_into()
		.map_err(|e| OracleError::Configuration(format!("Invalid configuration: {}", e)))?;

	Ok(Box::new(MockOracle::new(config)))
}

pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "mock";
	type Factory = OracleFactory;

	fn factory() -> Self::Factory {
		create_oracle
	}
}

impl OracleRegistry for Registry {}
