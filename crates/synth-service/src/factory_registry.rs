//! Factory registry for engine implementations.
//!
//! Collects the factories every service crate exposes and picks the ones the
//! configuration names.

use std::collections::HashMap;
use std::sync::OnceLock;
use synth_account::AccountFactory;
use synth_config::Config;
use synth_core::{EngineBuilder, TradeEngine, TradeFactories};
use synth_delivery::implementations::evm::alloy::create_http_delivery;
use synth_delivery::{DeliveryError, DeliveryInterface};
use synth_history::HistoryFactory;
use synth_oracle::OracleFactory;
use synth_types::{NetworksConfig, SecretString};

pub type DeliveryFactory =
	fn(&NetworksConfig, &SecretString) -> Result<Box<dyn DeliveryInterface>, DeliveryError>;

/// Registry of all known implementation factories, by name.
pub struct FactoryRegistry {
	pub account: HashMap<String, AccountFactory>,
	pub oracle: HashMap<String, OracleFactory>,
	pub history: HashMap<String, HistoryFactory>,
}

impl FactoryRegistry {
	pub fn new() -> Self {
		Self {
			account: HashMap::new(),
			oracle: HashMap::new(),
			history: HashMap::new(),
		}
	}

	pub fn register_account(&mut self, name: impl Into<String>, factory: AccountFactory) {
		self.account.insert(name.into(), factory);
	}

	pub fn register_oracle(&mut self, name: impl Into<String>, factory: OracleFactory) {
		self.oracle.insert(name.into(), factory);
	}

	pub fn register_history(&mut self, name: impl Into<String>, factory: HistoryFactory) {
		self.history.insert(name.into(), factory);
	}
}

impl Default for FactoryRegistry {
	fn default() -> Self {
		Self::new()
	}
}

static REGISTRY: OnceLock<FactoryRegistry> = OnceLock::new();

/// Returns the global registry, registering every implementation on first use.
pub fn get_registry() -> &'static FactoryRegistry {
	REGISTRY.get_or_init(|| {
		let mut registry = FactoryRegistry::new();

		for (name, factory) in synth_account::get_all_implementations() {
			tracing::debug!("Registering account implementation: {}", name);
			registry.register_account(name, factory);
		}

		for (name, factory) in synth_oracle::get_all_implementations() {
			tracing::debug!("Registering oracle implementation: {}", name);
			registry.register_oracle(name, factory);
		}

		for (name, factory) in synth_history::get_all_implementations() {
			tracing::debug!("Registering history implementation: {}", name);
			registry.register_history(name, factory);
		}

		registry
	})
}

/// Picks the registered factory for each configured implementation name.
macro_rules! build_factories {
	($registry:expr, $config_impls:expr, $registry_field:ident, $type_name:literal) => {{
		let mut factories = HashMap::new();
		for name in $config_impls.keys() {
			if let Some(factory) = $registry.$registry_field.get(name) {
				factories.insert(name.clone(), *factory);
			} else {
				let available: Vec<_> = $registry.$registry_field.keys().cloned().collect();
				return Err(format!(
					"Unknown {} implementation '{}'. Available: [{}]",
					$type_name,
					name,
					available.join(", ")
				)
				.into());
			}
		}
		factories
	}};
}

/// Builds the trade engine from configuration using the registry.
pub async fn build_engine_from_config(
	config: Config,
) -> Result<TradeEngine, Box<dyn std::error::Error>> {
	let registry = get_registry();

	let account_factories =
		build_factories!(registry, config.account.implementations, account, "account");
	let oracle_factories =
		build_factories!(registry, config.oracle.implementations, oracle, "oracle");
	let history_factories =
		build_factories!(registry, config.history.implementations, history, "history");

	let factories = TradeFactories {
		account_factories,
		oracle_factories,
		history_factories,
		delivery_factory: create_http_delivery as DeliveryFactory,
	};

	Ok(EngineBuilder::new(config).build(factories).await?)
}
