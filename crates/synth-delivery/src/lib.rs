//! Wallet provider access for trade submission.
//!
//! The executor needs three things from a wallet provider: a gas estimate, a
//! read-only dry run of the same request, and the actual broadcast. Provider
//! errors are kept as raw JSON payloads so that the revert reason buried in
//! them can be classified later.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use synth_types::{Bytes, ConfigSchema, ProviderError, TransactionHash, TransactionRequest};
use thiserror::Error;

pub mod implementations {
	pub mod evm {
		pub mod alloy;
	}
}

/// Errors that can occur during transaction delivery operations.
#[derive(Debug, Error)]
pub enum DeliveryError {
	/// The provider answered with an error payload.
	#[error("{0}")]
	Provider(ProviderError),
	/// The provider could not be set up or reached.
	#[error("Network error: {0}")]
	Network(String),
	#[error("No provider available for chain {0}")]
	NoProviderAvailable(u64),
}

impl DeliveryError {
	/// Converts into the JSON error shape used for classification.
	pub fn into_provider_error(self) -> ProviderError {
		match self {
			DeliveryError::Provider(error) => error,
			other => ProviderError::from_message(other.to_string()),
		}
	}
}

impl From<ProviderError> for DeliveryError {
	fn from(error: ProviderError) -> Self {
		DeliveryError::Provider(error)
	}
}

/// Interface of a wallet provider.
#[async_trait]
pub trait DeliveryInterface: Send + Sync {
	fn config_schema(&self) -> Box<dyn ConfigSchema>;

	/// Estimates the gas the request would consume.
	async fn estimate_gas(&self, tx: &TransactionRequest) -> Result<u64, DeliveryError>;

	/// Executes the request without broadcasting it and returns the output.
	async fn call(&self, tx: &TransactionRequest) -> Result<Bytes, DeliveryError>;

	/// Signs and broadcasts the request.
	async fn send_transaction(
		&self,
		tx: &TransactionRequest,
	) -> Result<TransactionHash, DeliveryError>;
}

/// Routes wallet requests to the provider of the request's chain.
pub struct DeliveryService {
	providers: HashMap<u64, Arc<dyn DeliveryInterface>>,
}

impl DeliveryService {
	pub fn new(providers: HashMap<u64, Arc<dyn DeliveryInterface>>) -> Self {
		Self { providers }
	}

	/// Whether a provider is configured for `chain_id`.
	pub fn supports(&self, chain_id: u64) -> bool {
		self.providers.contains_key(&chain_id)
	}

	fn provider(&self, chain_id: u64) -> Result<&Arc<dyn DeliveryInterface>, DeliveryError> {
		self.providers
			.get(&chain_id)
			.ok_or(DeliveryError::NoProviderAvailable(chain_id))
	}

	pub async fn estimate_gas(&self, tx: &TransactionRequest) -> Result<u64, DeliveryError> {
		self.provider(tx.chain_id)?.estimate_gas(tx).await
	}

	pub async fn call(&self, tx: &TransactionRequest) -> Result<Bytes, DeliveryError> {
		self.provider(tx.chain_id)?.call(tx).await
	}

	pub async fn send_transaction(
		&self,
		tx: &TransactionRequest,
	) -> Result<TransactionHash, DeliveryError> {
		self.provider(tx.chain_id)?.send_transaction(tx).await
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use synth_types::{Address, Schema, ValidationError};

	struct EmptySchema;

	impl ConfigSchema for EmptySchema {
		fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
			Schema::new(vec![], vec![]).validate(config)
		}
	}

	struct FixedProvider;

	#[async_trait]
	impl DeliveryInterface for FixedProvider {
		fn config_schema(&self) -> Box<dyn ConfigSchema> {
			Box::new(EmptySchema)
		}

		async fn estimate_gas(&self, _tx: &TransactionRequest) -> Result<u64, DeliveryError> {
			Ok(21_000)
		}

		async fn call(&self, _tx: &TransactionRequest) -> Result<Bytes, DeliveryError> {
			Err(ProviderError::new(serde_json::json!({
				"code": 3,
				"message": "execution reverted: nope"
			}))
			.into())
		}

		async fn send_transaction(
			&self,
			_tx: &TransactionRequest,
		) -> Result<TransactionHash, DeliveryError> {
			Ok(TransactionHash(vec![0xab; 32]))
		}
	}

	fn request(chain_id: u64) -> TransactionRequest {
		TransactionRequest {
			chain_id,
			from: Address::ZERO,
			to: Address::ZERO,
			data: Bytes::new(),
			value: None,
			gas_limit: None,
		}
	}

	#[tokio::test]
	async fn test_routes_by_chain() {
		let mut providers: HashMap<u64, Arc<dyn DeliveryInterface>> = HashMap::new();
		providers.insert(56, Arc::new(FixedProvider));
		let service = DeliveryService::new(providers);

		assert!(service.supports(56));
		assert_eq!(service.estimate_gas(&request(56)).await.unwrap(), 21_000);
		assert!(service.send_transaction(&request(56)).await.is_ok());

		let err = service.estimate_gas(&request(1)).await.unwrap_err();
		assert!(matches!(err, DeliveryError::NoProviderAvailable(1)));
		assert_eq!(
			err.into_provider_error().message(),
			"No provider available for chain 1"
		);
	}

	#[tokio::test]
	async fn test_provider_payload_preserved() {
		let error = FixedProvider.call(&request(56)).await.unwrap_err();
		let payload = error.into_provider_error();
		assert_eq!(payload.code(), Some(3));
		assert_eq!(payload.message(), "execution reverted: nope");
	}
}
