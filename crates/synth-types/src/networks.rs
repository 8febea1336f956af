//! Network configuration types.
//!
//! Each chain the trader can submit to has an RPC endpoint, a deployed
//! synchronizer contract, and the list of currencies tradeable there. Synthetic
//! assets carry their trading fee alongside the token definition.

use crate::{Currency, NativeCurrency, Token};
use alloy_primitives::Address;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

/// Configuration for a token on a specific network.
///
/// # Fields
///
/// * `address` - The on-chain address of the token contract
/// * `symbol` - The token symbol (e.g., "DEI", "TSLA")
/// * `decimals` - The number of decimal places for the token
/// * `fee` - Trading fee fraction for synthetic assets (e.g., `0.003`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct TokenConfig {
	pub address: Address,
	pub symbol: String,
	pub decimals: u8,
	#[serde(default)]
	pub name: Option<String>,
	#[serde(default)]
	pub fee: Option<Decimal>,
}

/// Native coin of a network and the token that wraps it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct NativeCurrencyConfig {
	pub symbol: String,
	#[serde(default = "default_native_decimals")]
	pub decimals: u8,
	#[serde(default)]
	pub wrapped: Option<Address>,
}

fn default_native_decimals() -> u8 {
	18
}

/// Configuration for a single blockchain network.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NetworkConfig {
	pub rpc_url: String,
	/// Address of the synchronizer contract that executes trades.
	pub synchronizer_address: Address,
	#[serde(default)]
	pub native: Option<NativeCurrencyConfig>,
	#[serde(default)]
	pub tokens: Vec<TokenConfig>,
}

impl NetworkConfig {
	/// Looks up a currency by symbol (case-insensitive).
	///
	/// The native coin is checked first. Its wrapper is resolved through the
	/// token list when present there, otherwise a wrapper named `W<symbol>` is
	/// synthesized from the configured address.
	pub fn currency(&self, chain_id: u64, symbol: &str) -> Option<Currency> {
		if let Some(native) = &self.native {
			if native.symbol.eq_ignore_ascii_case(symbol) {
				let wrapped = native.wrapped.map(|address| {
					self.token_by_address(&address)
						.map(|config| to_token(chain_id, config))
						.unwrap_or_else(|| Token {
							chain_id,
							address,
							symbol: format!("W{}", native.symbol),
							decimals: native.decimals,
							name: None,
						})
				});
				return Some(Currency::Native(NativeCurrency {
					chain_id,
					symbol: native.symbol.clone(),
					decimals: native.decimals,
					wrapped,
				}));
			}
		}

		self.tokens
			.iter()
			.find(|token| token.symbol.eq_ignore_ascii_case(symbol))
			.map(|config| Currency::Token(to_token(chain_id, config)))
	}

	pub fn token_by_address(&self, address: &Address) -> Option<&TokenConfig> {
		self.tokens.iter().find(|token| &token.address == address)
	}
}

fn to_token(chain_id: u64, config: &TokenConfig) -> Token {
	Token {
		chain_id,
		address: config.address,
		symbol: config.symbol.clone(),
		decimals: config.decimals,
		name: config.name.clone(),
	}
}

/// Networks configuration mapping chain IDs to their configurations.
pub type NetworksConfig = HashMap<u64, NetworkConfig>;

/// Deserializes a networks table whose keys are chain IDs.
///
/// TOML table keys are always strings, so `[networks.56]` arrives as `"56"`
/// and is parsed into a `u64` here.
pub fn deserialize_networks<'de, D>(deserializer: D) -> Result<NetworksConfig, D::Error>
where
	D: Deserializer<'de>,
{
	let string_map: HashMap<String, NetworkConfig> = HashMap::deserialize(deserializer)?;
	let mut result = HashMap::new();

	for (key, value) in string_map {
		let chain_id = key
			.parse::<u64>()
			.map_err(|e| serde::de::Error::custom(format!("Invalid chain_id '{}': {}", key, e)))?;
		result.insert(chain_id, value);
	}

	Ok(result)
}
