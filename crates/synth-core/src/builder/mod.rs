//! Builder pattern for constructing trade engines.
//!
//! Composes a [`TradeEngine`] from the configuration and a set of factory
//! functions, one map per pluggable service.

use crate::classify::ErrorClassifier;
use crate::engine::TradeEngine;
use crate::executor::SubmissionExecutor;
use crate::partner::StaticPartnerId;
use std::collections::HashMap;
use std::fmt::Display;
use std::sync::Arc;
use synth_account::{AccountError, AccountInterface, AccountService};
use synth_config::{Config, ImplementationsConfig};
use synth_delivery::{DeliveryError, DeliveryInterface, DeliveryService};
use synth_history::{HistoryError, HistoryInterface, HistoryService};
use synth_oracle::{OracleError, OracleInterface, OracleService};
use synth_types::{NetworksConfig, SecretString};
use thiserror::Error;

/// Errors that can occur during trade engine construction.
#[derive(Debug, Error)]
pub enum BuilderError {
	#[error("Configuration error: {0}")]
	Config(String),
	#[error("Missing required component: {0}")]
	MissingComponent(String),
}

/// Factory functions for every pluggable service of the engine.
///
/// Account, oracle and history implementations are selected by name from
/// their configuration sections. The wallet provider is built from the
/// networks and the primary account's key.
pub struct TradeFactories<AF, OF, HF, DF> {
	pub account_factories: HashMap<String, AF>,
	pub oracle_factories: HashMap<String, OF>,
	pub history_factories: HashMap<String, HF>,
	pub delivery_factory: DF,
}

/// Builds implementations of one component for every configured name that
/// has a factory.
fn load_implementations<T: ?Sized, E: Display, F>(
	component: &'static str,
	section: &ImplementationsConfig,
	factories: &HashMap<String, F>,
) -> Result<HashMap<String, Box<T>>, BuilderError>
where
	F: Fn(&toml::Value) -> Result<Box<T>, E>,
{
	let mut implementations = HashMap::new();
	for (name, config) in &section.implementations {
		let Some(factory) = factories.get(name) else {
			tracing::warn!(component, implementation = %name, "No factory registered, skipping");
			continue;
		};
		match factory(config) {
			Ok(implementation) => {
				// Validation already happened in the factory
				implementations.insert(name.clone(), implementation);
				let is_primary = &section.primary == name;
				tracing::info!(component, implementation = %name, enabled = %is_primary, "Loaded");
			}
			Err(e) => {
				tracing::error!(
					component,
					implementation = %name,
					error = %e,
					"Failed to create implementation"
				);
				return Err(BuilderError::Config(format!(
					"Failed to create {} implementation '{}': {}",
					component, name, e
				)));
			}
		}
	}

	if implementations.is_empty() {
		return Err(BuilderError::MissingComponent(format!(
			"No {} implementations available",
			component
		)));
	}

	Ok(implementations)
}

/// Builder for a [`TradeEngine`] with pluggable implementations.
pub struct EngineBuilder {
	config: Config,
}

impl EngineBuilder {
	pub fn new(config: Config) -> Self {
		Self { config }
	}

	/// Builds the engine using factories for each component type.
	pub async fn build<AF, OF, HF, DF>(
		self,
		factories: TradeFactories<AF, OF, HF, DF>,
	) -> Result<TradeEngine, BuilderError>
	where
		AF: Fn(&toml::Value) -> Result<Box<dyn AccountInterface>, AccountError>,
		OF: Fn(&toml::Value) -> Result<Box<dyn OracleInterface>, OracleError>,
		HF: Fn(&toml::Value) -> Result<Box<dyn HistoryInterface>, HistoryError>,
		DF: Fn(&NetworksConfig, &SecretString) -> Result<Box<dyn DeliveryInterface>, DeliveryError>,
	{
		let config = self.config;

		// Account
		let mut accounts =
			load_implementations("account", &config.account, &factories.account_factories)?;
		let account = accounts.remove(&config.account.primary).ok_or_else(|| {
			BuilderError::Config(format!(
				"Primary account '{}' failed to load or has invalid configuration",
				config.account.primary
			))
		})?;
		let account = Arc::new(AccountService::new(account));

		let address = account.get_address().await.map_err(|e| {
			tracing::error!(component = "account", error = %e, "Failed to get trader address");
			BuilderError::Config(format!("Failed to get trader address: {}", e))
		})?;
		tracing::info!(component = "account", address = %address, "Trader address");

		// Delivery
		let delivery = (factories.delivery_factory)(&config.networks, &account.get_private_key())
			.map_err(|e| {
				tracing::error!(component = "delivery", error = %e, "Failed to create wallet provider");
				BuilderError::Config(format!("Failed to create wallet provider: {}", e))
			})?;
		let delivery: Arc<dyn DeliveryInterface> = delivery.into();
		let mut providers = HashMap::new();
		for chain_id in config.networks.keys() {
			providers.insert(*chain_id, delivery.clone());
			tracing::info!(component = "delivery", network_id = %chain_id, "Loaded");
		}

		// Oracle
		let oracles: HashMap<String, Arc<dyn OracleInterface>> =
			load_implementations("oracle", &config.oracle, &factories.oracle_factories)?
				.into_iter()
				.map(|(name, oracle)| (name, Arc::from(oracle)))
				.collect();
		let oracle = OracleService::new(oracles, config.oracle.primary.clone())
			.map_err(|e| BuilderError::Config(e.to_string()))?;

		// History
		let mut histories =
			load_implementations("history", &config.history, &factories.history_factories)?;
		let history = histories.remove(&config.history.primary).ok_or_else(|| {
			BuilderError::Config(format!(
				"Primary history '{}' failed to load or has invalid configuration",
				config.history.primary
			))
		})?;
		let history = Arc::new(HistoryService::new(history));

		if config.trade.partner_id.is_none() {
			tracing::warn!("No partner id configured, trades cannot be submitted");
		}

		let executor = SubmissionExecutor::new(
			Arc::new(DeliveryService::new(providers)),
			history.clone(),
			ErrorClassifier::new(&config.trade.revert_messages),
			config.trade.gas_margin_bps,
		);

		Ok(TradeEngine::new(
			config.networks,
			config.trade.default_chain_id,
			account,
			Arc::new(oracle),
			history,
			Arc::new(StaticPartnerId::new(config.trade.partner_id)),
			executor,
		))
	}
}
