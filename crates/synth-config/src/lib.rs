//! Configuration for the synthetic-asset trading workspace.
//!
//! The configuration is a single TOML document. `[trade]` holds the pipeline
//! settings, `[networks.<chain_id>]` describes each chain the trader can submit
//! to, and `[account]`, `[oracle]` and `[history]` select a primary
//! implementation whose own settings stay as raw TOML tables until the
//! matching factory validates them.
//!
//! `${VAR}` and `${VAR:-default}` placeholders are substituted from the
//! environment before parsing.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;
use synth_types::{networks::deserialize_networks, Address, NetworkConfig, NetworksConfig};
use thiserror::Error;

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	#[error("Configuration error: {0}")]
	Parse(String),
	#[error("Validation error: {0}")]
	Validation(String),
}

impl From<toml::de::Error> for ConfigError {
	fn from(err: toml::de::Error) -> Self {
		// The full error embeds the whole input document.
		ConfigError::Parse(err.message().to_string())
	}
}

/// Root configuration document.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
	#[serde(default)]
	pub trade: TradeConfig,
	/// Networks keyed by chain id.
	#[serde(deserialize_with = "deserialize_networks")]
	pub networks: NetworksConfig,
	pub account: ImplementationsConfig,
	pub oracle: ImplementationsConfig,
	pub history: ImplementationsConfig,
}

/// Settings of the trade pipeline itself.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TradeConfig {
	/// Partner registered with the synchronizer's partner manager. Trades are
	/// refused while this is unset.
	#[serde(default)]
	pub partner_id: Option<Address>,
	/// Safety margin added to gas estimates, in basis points.
	#[serde(default = "default_gas_margin_bps")]
	pub gas_margin_bps: u64,
	/// Extra revert reasons mapped to user-facing messages. Entries override
	/// the built-in table.
	#[serde(default)]
	pub revert_messages: HashMap<String, String>,
	/// Chain used by the CLI when none is given.
	#[serde(default)]
	pub default_chain_id: Option<u64>,
}

impl Default for TradeConfig {
	fn default() -> Self {
		Self {
			partner_id: None,
			gas_margin_bps: default_gas_margin_bps(),
			revert_messages: HashMap::new(),
			default_chain_id: None,
		}
	}
}

/// 20 %.
fn default_gas_margin_bps() -> u64 {
	2000
}

/// A pluggable service section: which implementation to use and the raw
/// settings of each configured implementation.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ImplementationsConfig {
	pub primary: String,
	#[serde(default)]
	pub implementations: HashMap<String, toml::Value>,
}

impl ImplementationsConfig {
	/// Raw settings of the primary implementation.
	pub fn primary_config(&self) -> Option<&toml::Value> {
		self.implementations.get(&self.primary)
	}

	fn validate(&self, section: &str) -> Result<(), ConfigError> {
		if self.primary.is_empty() {
			return Err(ConfigError::Validation(format!(
				"{} primary implementation cannot be empty",
				section
			)));
		}
		if !self.implementations.contains_key(&self.primary) {
			return Err(ConfigError::Validation(format!(
				"Primary {} '{}' not found in implementations",
				section, self.primary
			)));
		}
		Ok(())
	}
}

/// Replaces `${VAR}` and `${VAR:-default}` with environment values.
///
/// Inputs above 1MB are rejected before the regex runs.
pub(crate) fn resolve_env_vars(input: &str) -> Result<String, ConfigError> {
	const MAX_INPUT_SIZE: usize = 1024 * 1024;
	if input.len() > MAX_INPUT_SIZE {
		return Err(ConfigError::Validation(format!(
			"Configuration file too large: {} bytes (max: {} bytes)",
			input.len(),
			MAX_INPUT_SIZE
		)));
	}

	let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]{0,127})(?::-([^}]{0,256}))?\}")
		.map_err(|e| ConfigError::Parse(format!("Regex error: {}", e)))?;

	let mut result = String::with_capacity(input.len());
	let mut last = 0;

	for cap in re.captures_iter(input) {
		let (Some(full_match), Some(var_name)) = (cap.get(0), cap.get(1)) else {
			continue;
		};
		let value = match (std::env::var(var_name.as_str()), cap.get(2)) {
			(Ok(v), _) => v,
			(Err(_), Some(default)) => default.as_str().to_string(),
			(Err(_), None) => {
				return Err(ConfigError::Validation(format!(
					"Environment variable '{}' not found",
					var_name.as_str()
				)))
			},
		};

		result.push_str(&input[last..full_match.start()]);
		result.push_str(&value);
		last = full_match.end();
	}
	result.push_str(&input[last..]);

	Ok(result)
}

impl Config {
	/// Reads, resolves and validates a configuration file.
	pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let content = tokio::fs::read_to_string(path.as_ref()).await.map_err(|e| {
			ConfigError::Io(std::io::Error::new(
				e.kind(),
				format!("Cannot read {}: {}", path.as_ref().display(), e),
			))
		})?;
		content.parse()
	}

	/// Network settings for a chain, if configured.
	pub fn network(&self, chain_id: u64) -> Option<&NetworkConfig> {
		self.networks.get(&chain_id)
	}

	fn validate(&self) -> Result<(), ConfigError> {
		if self.networks.is_empty() {
			return Err(ConfigError::Validation(
				"Networks configuration cannot be empty".into(),
			));
		}
		for (chain_id, network) in &self.networks {
			if network.rpc_url.is_empty() {
				return Err(ConfigError::Validation(format!(
					"Network {} must have an rpc_url",
					chain_id
				)));
			}
			if network.synchronizer_address == Address::ZERO {
				return Err(ConfigError::Validation(format!(
					"Network {} must have a synchronizer_address",
					chain_id
				)));
			}
		}

		if let Some(chain_id) = self.trade.default_chain_id {
			if !self.networks.contains_key(&chain_id) {
				return Err(ConfigError::Validation(format!(
					"default_chain_id {} is not a configured network",
					chain_id
				)));
			}
		}

		if self.trade.gas_margin_bps > 10_000 {
			return Err(ConfigError::Validation(
				"gas_margin_bps cannot exceed 10000 (100%)".into(),
			));
		}

		self.account.validate("account")?;
		self.oracle.validate("oracle")?;
		self.history.validate("history")?;

		Ok(())
	}
}

/// Parses a TOML document after environment substitution and validates it.
impl FromStr for Config {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let resolved = resolve_env_vars(s)?;
		let config: Config = toml::from_str(&resolved)?;
		config.validate()?;
		Ok(config)
	}
}
