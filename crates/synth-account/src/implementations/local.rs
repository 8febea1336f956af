//! Account backed by a private key held in the configuration.

use crate::{AccountError, AccountFactory, AccountInterface, AccountRegistry};
use alloy_signer_local::PrivateKeySigner;
use async_trait::async_trait;
use synth_types::{
	with_0x_prefix, Address, ConfigSchema, Field, FieldType, ImplementationRegistry, Schema,
	SecretString, ValidationError,
};

/// Local key account.
///
/// The key is parsed once at construction so that a malformed key fails at
/// startup. Only the derived address and the redacting [`SecretString`] are
/// kept.
pub struct LocalAccount {
	address: Address,
	private_key: SecretString,
}

impl LocalAccount {
	pub fn new(private_key: &SecretString) -> Result<Self, AccountError> {
		let signer: PrivateKeySigner = private_key.with_exposed(|key| {
			key.trim()
				.parse()
				.map_err(|e| AccountError::InvalidKey(format!("Cannot parse private key: {}", e)))
		})?;

		Ok(Self {
			address: signer.address(),
			private_key: SecretString::new(
				private_key.with_exposed(|key| with_0x_prefix(key.trim())),
			),
		})
	}
}

pub struct LocalAccountSchema;

impl ConfigSchema for LocalAccountSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		let schema = Schema::new(
			vec![Field::new("private_key", FieldType::String).with_validator(|value| {
				let key = value.as_str().unwrap_or_default();
				let hex = key.strip_prefix("0x").unwrap_or(key);
				if hex.len() != 64 {
					return Err("private_key must be 32 bytes of hex".to_string());
				}
				if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
					return Err("private_key must be hexadecimal".to_string());
				}
				Ok(())
			})],
			vec![],
		);
		schema.validate(config)
	}
}

#[async_trait]
impl AccountInterface for LocalAccount {
	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(LocalAccountSchema)
	}

	async fn address(&self) -> Result<Address, AccountError> {
		Ok(self.address)
	}

	fn get_private_key(&self) -> SecretString {
		self.private_key.clone()
	}
}

/// Factory for `[account.implementations.local]`.
///
/// Required: `private_key`, hex with or without `0x`.
pub fn create_account(config: &toml::Value) -> Result<Box<dyn AccountInterface>, AccountError> {
	LocalAccountSchema
		.validate(config)
		.map_err(|e| AccountError::Implementation(format!("Invalid configuration: {}", e)))?;

	let private_key = config
		.get("private_key")
		.and_then(|v| v.as_str())
		.ok_or_else(|| AccountError::InvalidKey("private_key is required".to_string()))?;

	Ok(Box::new(LocalAccount::new(&SecretString::from(private_key))?))
}

pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "local";
	type Factory = AccountFactory;

	fn factory() -> Self::Factory {
		create_account
	}
}

impl AccountRegistry for Registry {}
