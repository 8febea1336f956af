//! History persisted as JSON lines, one record per line.

use crate::{HistoryError, HistoryFactory, HistoryInterface, HistoryRegistry, TransactionRecord};
use async_trait::async_trait;
use std::path::PathBuf;
use synth_types::{ConfigSchema, Field, FieldType, ImplementationRegistry, Schema, ValidationError};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

const DEFAULT_PATH: &str = "./data/history.jsonl";

pub struct FileHistory {
	path: PathBuf,
	/// Serializes appends from concurrent trades.
	write_lock: Mutex<()>,
}

impl FileHistory {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self {
			path: path.into(),
			write_lock: Mutex::new(()),
		}
	}
}

#[async_trait]
impl HistoryInterface for FileHistory {
	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(FileHistorySchema)
	}

	async fn add(&self, record: TransactionRecord) -> Result<(), HistoryError> {
		let mut line = serde_json::to_string(&record)
			.map_err(|e| HistoryError::Serialization(e.to_string()))?;
		line.push('\n');

		let _guard = self.write_lock.lock().await;

		if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
			fs::create_dir_all(parent)
				.await
				.map_err(|e| HistoryError::Backend(format!("Failed to create directory: {}", e)))?;
		}

		let mut file = fs::OpenOptions::new()
			.create(true)
			.append(true)
			.open(&self.path)
			.await
			.map_err(|e| HistoryError::Backend(format!("Failed to open history file: {}", e)))?;
		file.write_all(line.as_bytes())
			.await
			.map_err(|e| HistoryError::Backend(format!("Failed to write record: {}", e)))?;
		file.flush()
			.await
			.map_err(|e| HistoryError::Backend(format!("Failed to flush history file: {}", e)))?;

		Ok(())
	}

	async fn list(&self) -> Result<Vec<TransactionRecord>, HistoryError> {
		let content = match fs::read_to_string(&self.path).await {
			Ok(content) => content,
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
			Err(e) => {
				return Err(HistoryError::Backend(format!(
					"Failed to read history file: {}",
					e
				)))
			},
		};

		let mut records = Vec::new();
		for (index, line) in content.lines().enumerate() {
			if line.trim().is_empty() {
				continue;
			}
			match serde_json::from_str(line) {
				Ok(record) => records.push(record),
				Err(e) => tracing::warn!(
					path = %self.path.display(),
					line = index + 1,
					error = %e,
					"Skipping unreadable history record"
				),
			}
		}
		Ok(records)
	}
}

pub struct FileHistorySchema;

impl ConfigSchema for FileHistorySchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		let schema = Schema::new(
			vec![],
			vec![Field::new("path", FieldType::String).with_validator(|value| {
				match value.as_str() {
					Some(path) if !path.trim().is_empty() => Ok(()),
					_ => Err("path cannot be empty".to_string()),
				}
			})],
		);
		schema.validate(config)
	}
}

/// Factory for `[history.implementations.file]`.
///
/// Optional: `path` (default `./data/history.jsonl`).
pub fn create_history(config: &toml::Value) -> Result<Box<dyn HistoryInterface>, HistoryError> {
	FileHistorySchema
		.validate(config)
		.map_err(|e| HistoryError::Configuration(format!("Invalid configuration: {}", e)))?;

	let path = config
		.get("path")
		.and_then(|v| v.as_str())
		.unwrap_or(DEFAULT_PATH);

	Ok(Box::new(FileHistory::new(path)))
}

pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "file";
	type Factory = HistoryFactory;

	fn factory() -> Self::Factory {
		create_history
	}
}

impl HistoryRegistry for Registry {}
