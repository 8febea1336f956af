//! In-memory history, lost on exit.

use crate::{HistoryError, HistoryFactory, HistoryInterface, HistoryRegistry, TransactionRecord};
use async_trait::async_trait;
use std::sync::Arc;
use synth_types::{ConfigSchema, ImplementationRegistry, Schema, ValidationError};
use tokio::sync::RwLock;

pub struct MemoryHistory {
	records: Arc<RwLock<Vec<TransactionRecord>>>,
}

impl MemoryHistory {
	pub fn new() -> Self {
		Self {
			records: Arc::new(RwLock::new(Vec::new())),
		}
	}
}

impl Default for MemoryHistory {
	fn default() -> Self {
		Self::new()
	}
}

#[async_trait]
impl HistoryInterface for MemoryHistory {
	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(MemoryHistorySchema)
	}

	async fn add(&self, record: TransactionRecord) -> Result<(), HistoryError> {
		self.records.write().await.push(record);
		Ok(())
	}

	async fn list(&self) -> Result<Vec<TransactionRecord>, HistoryError> {
		Ok(self.records.read().await.clone())
	}
}

pub struct MemoryHistorySchema;

impl ConfigSchema for MemoryHistorySchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		Schema::new(vec![], vec![]).validate(config)
	}
}

/// Factory for `[history.implementations.memory]`; takes no settings.
pub fn create_history(config: &toml::Value) -> Result<Box<dyn HistoryInterface>, HistoryError> {
	MemoryHistorySchema
		.validate(config)
		.map_err(|e| HistoryError::Configuration(format!("Invalid configuration: {}", e)))?;
	Ok(Box::new(MemoryHistory::new()))
}

pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "memory";
	type Factory = HistoryFactory;

	fn factory() -> Self::Factory {
		create_history
	}
}

impl HistoryRegistry for Registry {}

#[cfg(test)]
mod tests {
	use super::*;
	use synth_types::{Address, TransactionHash};

	#[tokio::test]
	async fn test_keeps_insertion_order() {
		let history = create_history(&toml::Value::Table(Default::default())).unwrap();
		for i in 0..3u8 {
			let record = TransactionRecord::new(
				&TransactionHash(vec![i]),
				56,
				Address::ZERO,
				format!("trade {}", i),
			);
			history.add(record).await.unwrap();
		}

		let summaries: Vec<_> = history
			.list()
			.await
			.unwrap()
			.into_iter()
			.map(|r| r.summary)
			.collect();
		assert_eq!(summaries, vec!["trade 0", "trade 1", "trade 2"]);
	}

	#[test]
	fn test_rejects_non_table_config() {
		assert!(create_history(&toml::Value::String("x".into())).is_err());
	}
}
