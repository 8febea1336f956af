//! Transaction history.
//!
//! Every broadcast trade is registered here with a one-line summary so it can
//! be listed later. Backends are pluggable like the other services.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use synth_types::{Address, ConfigSchema, ImplementationRegistry, TransactionHash};
use thiserror::Error;
use uuid::Uuid;

pub mod implementations {
	pub mod file;
	pub mod memory;
}

/// Errors that can occur while recording or reading history.
#[derive(Debug, Error)]
pub enum HistoryError {
	#[error("Serialization error: {0}")]
	Serialization(String),
	#[error("Backend error: {0}")]
	Backend(String),
	#[error("Configuration error: {0}")]
	Configuration(String),
}

/// One submitted transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
	pub id: Uuid,
	/// `0x`-prefixed transaction hash.
	pub hash: String,
	pub chain_id: u64,
	pub from: Address,
	/// e.g. `Trade 100 DEI for 81.3008 SYM`.
	pub summary: String,
	pub added_at: DateTime<Utc>,
}

impl TransactionRecord {
	pub fn new(hash: &TransactionHash, chain_id: u64, from: Address, summary: String) -> Self {
		Self {
			id: Uuid::new_v4(),
			hash: hash.to_string(),
			chain_id,
			from,
			summary,
			added_at: Utc::now(),
		}
	}
}

#[async_trait]
pub trait HistoryInterface: Send + Sync {
	fn config_schema(&self) -> Box<dyn ConfigSchema>;

	async fn add(&self, record: TransactionRecord) -> Result<(), HistoryError>;

	/// All records, oldest first.
	async fn list(&self) -> Result<Vec<TransactionRecord>, HistoryError>;
}

pub type HistoryFactory = fn(&toml::Value) -> Result<Box<dyn HistoryInterface>, HistoryError>;

pub trait HistoryRegistry: ImplementationRegistry<Factory = HistoryFactory> {}

/// All history backends known to this crate, as (name, factory) pairs.
pub fn get_all_implementations() -> Vec<(&'static str, HistoryFactory)> {
	use implementations::{file, memory};

	vec![
		(file::Registry::NAME, file::Registry::factory()),
		(memory::Registry::NAME, memory::Registry::factory()),
	]
}

/// Registers and lists transactions through the configured backend.
pub struct HistoryService {
	backend: Box<dyn HistoryInterface>,
}

impl HistoryService {
	pub fn new(backend: Box<dyn HistoryInterface>) -> Self {
		Self { backend }
	}

	/// Records a broadcast transaction with its summary.
	pub async fn add_transaction(
		&self,
		hash: &TransactionHash,
		chain_id: u64,
		from: Address,
		summary: impl Into<String>,
	) -> Result<TransactionRecord, HistoryError> {
		let record = TransactionRecord::new(hash, chain_id, from, summary.into());
		self.backend.add(record.clone()).await?;
		tracing::debug!(hash = %record.hash, summary = %record.summary, "Registered transaction");
		Ok(record)
	}

	pub async fn list(&self) -> Result<Vec<TransactionRecord>, HistoryError> {
		self.backend.list().await
	}

	/// Records on one chain, newest first.
	pub async fn list_for_chain(
		&self,
		chain_id: u64,
	) -> Result<Vec<TransactionRecord>, HistoryError> {
		let mut records: Vec<_> = self
			.backend
			.list()
			.await?
			.into_iter()
			.filter(|r| r.chain_id == chain_id)
			.collect();
		records.sort_by(|a, b| b.added_at.cmp(&a.added_at));
		Ok(records)
	}
}
