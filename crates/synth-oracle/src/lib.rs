//! Oracle signature fetching.
//!
//! Before a trade can be submitted the synchronizer needs a price for the
//! registrar signed by the oracle network. This crate asks the configured
//! oracle for that attestation. A failed request is reported inside the
//! [`OracleResponse`] rather than as an error, so callers always inspect
//! `success` first.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use synth_types::{Address, ConfigSchema, ImplementationRegistry, OracleResponse, TradeAction};
use thiserror::Error;

pub mod implementations {
	pub mod mock;
	pub mod muon;
}

/// Errors raised while setting up or talking to an oracle.
#[derive(Debug, Error)]
pub enum OracleError {
	#[error("Network error: {0}")]
	Network(String),
	/// The oracle answered with something that is not a signature packet.
	#[error("Invalid response: {0}")]
	InvalidResponse(String),
	/// The oracle refused to sign; carries its own reason verbatim.
	#[error("{0}")]
	Declined(String),
	#[error("Configuration error: {0}")]
	Configuration(String),
}

/// Interface of a price-signing oracle.
#[async_trait]
pub trait OracleInterface: Send + Sync {
	fn config_schema(&self) -> Box<dyn ConfigSchema>;

	/// Requests signatures for `registrar` and `action` on `chain_id`.
	///
	/// Never fails: transport and decoding problems come back as
	/// `success: false` with the reason in `error`.
	async fn get_signatures(
		&self,
		registrar: Address,
		action: TradeAction,
		chain_id: u64,
	) -> OracleResponse;
}

pub type OracleFactory = fn(&toml::Value) -> Result<Box<dyn OracleInterface>, OracleError>;

pub trait OracleRegistry: ImplementationRegistry<Factory = OracleFactory> {}

/// All oracle implementations known to this crate, as (name, factory) pairs.
pub fn get_all_implementations() -> Vec<(&'static str, OracleFactory)> {
	use implementations::{mock, muon};

	vec![
		(muon::Registry::NAME, muon::Registry::factory()),
		(mock::Registry::NAME, mock::Registry::factory()),
	]
}

/// Holds the configured oracle implementations and forwards to the primary.
pub struct OracleService {
	implementations: HashMap<String, Arc<dyn OracleInterface>>,
	primary_implementation: String,
}

impl OracleService {
	pub fn new(
		implementations: HashMap<String, Arc<dyn OracleInterface>>,
		primary_implementation: String,
	) -> Result<Self, OracleError> {
		if !implementations.contains_key(&primary_implementation) {
			return Err(OracleError::Configuration(format!(
				"Primary implementation '{}' not found in available implementations",
				primary_implementation
			)));
		}

		Ok(Self {
			implementations,
			primary_implementation,
		})
	}

	pub fn primary(&self) -> &str {
		&self.primary_implementation
	}

	/// Fetches signatures from the primary implementation.
	pub async fn get_signatures(
		&self,
		registrar: Address,
		action: TradeAction,
		chain_id: u64,
	) -> OracleResponse {
		match self.implementations.get(&self.primary_implementation) {
			Some(oracle) => oracle.get_signatures(registrar, action, chain_id).await,
			None => OracleResponse::failure(format!(
				"Primary implementation '{}' not available",
				self.primary_implementation
			)),
		}
	}
}
