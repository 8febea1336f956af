//! Alloy-backed wallet provider for EVM chains.
//!
//! One HTTP provider per configured network, each with the account's key as
//! its wallet so that `send_transaction` signs locally before broadcasting.

use crate::{DeliveryError, DeliveryInterface};
use alloy_network::EthereumWallet;
use alloy_provider::{Provider, ProviderBuilder};
use alloy_rpc_types::TransactionRequest as AlloyTransactionRequest;
use alloy_signer::Signer;
use alloy_signer_local::PrivateKeySigner;
use alloy_transport::{RpcError, TransportErrorKind};
use alloy_transport_http::Http;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use synth_types::{
	with_0x_prefix, Bytes, ConfigSchema, Field, FieldType, NetworksConfig, ProviderError, Schema,
	SecretString, TransactionHash, TransactionRequest, ValidationError,
};

type HttpProvider = Arc<dyn Provider<Http<reqwest::Client>> + Send + Sync>;

pub struct AlloyDelivery {
	providers: HashMap<u64, HttpProvider>,
}

impl AlloyDelivery {
	/// Creates providers for every configured network.
	///
	/// No connection is made here; the first request opens it.
	pub fn new(networks: &NetworksConfig, signer: PrivateKeySigner) -> Result<Self, DeliveryError> {
		if networks.is_empty() {
			return Err(DeliveryError::Network(
				"At least one network must be configured".to_string(),
			));
		}

		let mut providers = HashMap::new();
		for (chain_id, network) in networks {
			let url = network.rpc_url.parse().map_err(|e| {
				DeliveryError::Network(format!("Invalid RPC URL for network {}: {}", chain_id, e))
			})?;

			let wallet = EthereumWallet::from(signer.clone().with_chain_id(Some(*chain_id)));
			let provider = ProviderBuilder::new()
				.with_recommended_fillers()
				.wallet(wallet)
				.on_http(url);

			providers.insert(*chain_id, Arc::new(provider) as HttpProvider);
		}

		Ok(Self { providers })
	}

	/// Chains this instance has a provider for.
	pub fn chain_ids(&self) -> Vec<u64> {
		self.providers.keys().copied().collect()
	}

	fn get_provider(&self, chain_id: u64) -> Result<&HttpProvider, DeliveryError> {
		self.providers
			.get(&chain_id)
			.ok_or(DeliveryError::NoProviderAvailable(chain_id))
	}
}

/// Converts the wallet-level request into alloy's RPC request type.
pub(crate) fn to_alloy_request(tx: &TransactionRequest) -> AlloyTransactionRequest {
	let mut request = AlloyTransactionRequest::default()
		.from(tx.from)
		.to(tx.to)
		.input(tx.data.clone().into());
	if let Some(value) = tx.value {
		request = request.value(value);
	}
	if let Some(gas_limit) = tx.gas_limit {
		request = request.gas_limit(gas_limit);
	}
	request
}

/// Keeps the JSON-RPC error object when the node sent one, so the revert
/// reason in `message`/`data` survives.
pub(crate) fn to_provider_error(error: RpcError<TransportErrorKind>) -> ProviderError {
	match error.as_error_resp() {
		Some(payload) => match serde_json::to_value(payload) {
			Ok(value) => ProviderError::new(value),
			Err(_) => ProviderError::from_message(payload.message.to_string()),
		},
		None => ProviderError::from_message(error.to_string()),
	}
}

/// Schema of a `[networks.<chain_id>]` table as far as delivery is concerned.
pub struct AlloyDeliverySchema;

impl ConfigSchema for AlloyDeliverySchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		let schema = Schema::new(
			vec![
				Field::new("rpc_url", FieldType::String).with_validator(|value| {
					match value.as_str() {
						Some(url) if url.starts_with("http://") || url.starts_with("https://") => {
							Ok(())
						},
						_ => Err("rpc_url must be an http(s) endpoint".to_string()),
					}
				}),
				Field::new("synchronizer_address", FieldType::Address),
			],
			vec![],
		);
		schema.validate(config)
	}
}

#[async_trait]
impl DeliveryInterface for AlloyDelivery {
	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(AlloyDeliverySchema)
	}

	async fn estimate_gas(&self, tx: &TransactionRequest) -> Result<u64, DeliveryError> {
		let provider = self.get_provider(tx.chain_id)?;
		let request = to_alloy_request(tx);

		let gas = provider
			.estimate_gas(&request)
			.await
			.map_err(|e| DeliveryError::Provider(to_provider_error(e)))?;
		tracing::debug!(chain_id = tx.chain_id, gas, "Estimated gas");
		Ok(gas)
	}

	async fn call(&self, tx: &TransactionRequest) -> Result<Bytes, DeliveryError> {
		let provider = self.get_provider(tx.chain_id)?;
		let request = to_alloy_request(tx);

		provider
			.call(&request)
			.await
			.map_err(|e| DeliveryError::Provider(to_provider_error(e)))
	}

	async fn send_transaction(
		&self,
		tx: &TransactionRequest,
	) -> Result<TransactionHash, DeliveryError> {
		let provider = self.get_provider(tx.chain_id)?;
		let request = to_alloy_request(tx);

		let pending_tx = provider
			.send_transaction(request)
			.await
			.map_err(|e| DeliveryError::Provider(to_provider_error(e)))?;

		let tx_hash = *pending_tx.tx_hash();
		let hash_str = with_0x_prefix(&hex::encode(tx_hash.0));
		tracing::info!(tx_hash = %hash_str, chain_id = tx.chain_id, "Submitted transaction");

		Ok(TransactionHash(tx_hash.0.to_vec()))
	}
}

/// Builds the wallet provider for all configured networks.
///
/// Each network table is checked against [`AlloyDeliverySchema`] before any
/// provider is created.
pub fn create_http_delivery(
	networks: &NetworksConfig,
	private_key: &SecretString,
) -> Result<Box<dyn DeliveryInterface>, DeliveryError> {
	for (chain_id, network) in networks {
		let table = toml::Value::try_from(network).map_err(|e| {
			DeliveryError::Network(format!("Cannot read network {}: {}", chain_id, e))
		})?;
		AlloyDeliverySchema.validate(&table).map_err(|e| {
			DeliveryError::Network(format!("Invalid configuration for network {}: {}", chain_id, e))
		})?;
	}

	let signer: PrivateKeySigner = private_key.with_exposed(|key| {
		key.parse()
			.map_err(|_| DeliveryError::Network("Invalid private key format".to_string()))
	})?;

	Ok(Box::new(AlloyDelivery::new(networks, signer)?))
}
