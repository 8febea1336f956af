//! Account management for the trader.
//!
//! An account supplies the address trades are submitted from and the key the
//! wallet provider signs with. Implementations are selected by name from the
//! `[account]` configuration section.

use async_trait::async_trait;
use synth_types::{Address, ConfigSchema, ImplementationRegistry, SecretString};
use thiserror::Error;

pub mod implementations {
	pub mod local;
}

/// Errors that can occur during account operations.
#[derive(Debug, Error)]
pub enum AccountError {
	/// The configured key is malformed.
	#[error("Invalid key: {0}")]
	InvalidKey(String),
	#[error("Implementation error: {0}")]
	Implementation(String),
}

/// Interface every account implementation provides.
#[async_trait]
pub trait AccountInterface: Send + Sync {
	/// Schema the implementation's configuration table must satisfy.
	fn config_schema(&self) -> Box<dyn ConfigSchema>;

	/// Address trades are submitted from.
	async fn address(&self) -> Result<Address, AccountError>;

	/// Private key with `0x` prefix, handed to the wallet provider for signing.
	fn get_private_key(&self) -> SecretString;
}

/// Builds an account implementation from its configuration table.
pub type AccountFactory = fn(&toml::Value) -> Result<Box<dyn AccountInterface>, AccountError>;

pub trait AccountRegistry: ImplementationRegistry<Factory = AccountFactory> {}

/// All account implementations known to this crate, as (name, factory) pairs.
pub fn get_all_implementations() -> Vec<(&'static str, AccountFactory)> {
	use implementations::local;

	vec![(local::Registry::NAME, local::Registry::factory())]
}

/// Wraps the configured account implementation.
pub struct AccountService {
	implementation: Box<dyn AccountInterface>,
}

impl AccountService {
	pub fn new(implementation: Box<dyn AccountInterface>) -> Self {
		Self { implementation }
	}

	pub async fn get_address(&self) -> Result<Address, AccountError> {
		self.implementation.address().await
	}

	pub fn get_private_key(&self) -> SecretString {
		self.implementation.get_private_key()
	}
}
