//! Main entry point for the trade service.
//!
//! Submits synthetic-asset trades from the command line, quotes them, lists
//! registered transactions and explains raw provider errors.

use clap::Parser;
use std::path::Path;
use synth_config::Config;
use synth_core::{ErrorClassifier, TradeCallbackState, TradeEngine};
use synth_types::TradeSession;

mod cli;
mod factory_registry;

use cli::{Args, Command, TradeArgs};
use factory_registry::build_engine_from_config;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	// Initialize tracing with env filter
	use tracing_subscriber::{fmt, EnvFilter};

	let default_directive = args.log_level.to_string();
	let env_filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

	fmt()
		.with_env_filter(env_filter)
		.with_thread_ids(true)
		.with_target(true)
		.init();

	if let Command::Explain { error } = &args.command {
		let error: serde_json::Value = serde_json::from_str(error)?;
		let classifier = load_classifier(&args.config).await;
		println!("{}", classifier.classify(&error));
		return Ok(());
	}

	let config = Config::from_file(&args.config).await?;
	tracing::info!(path = %args.config.display(), "Loaded configuration");

	match args.command {
		Command::Explain { .. } => {}
		Command::History { chain } => {
			let engine = build_engine_from_config(config).await?;
			for record in engine.history(chain).await? {
				println!(
					"{}  chain {}  {}  {}",
					record.added_at.format("%Y-%m-%d %H:%M:%S"),
					record.chain_id,
					record.hash,
					record.summary
				);
			}
		}
		Command::Quote(trade) => {
			let engine = build_engine_from_config(config).await?;
			let (intent, session) = prepare(&engine, &trade).await?;
			let quote = engine.quote(&intent, &session);
			println!("{}", quote.summary);
			if !quote.fee_label.is_empty() {
				println!("Fee: {}", quote.fee_label);
			}
			if let Some(minimum) = quote.minimum_received {
				println!("Minimum received: {}", minimum);
			}
		}
		Command::Trade(trade) => {
			let engine = build_engine_from_config(config).await?;
			let (intent, session) = prepare(&engine, &trade).await?;

			if let TradeCallbackState::Invalid(reason) = engine.callback_state(&intent, &session) {
				return Err(reason.into());
			}

			let hash = engine.execute(&intent, &session).await?;
			println!("{}", hash);
		}
	}

	Ok(())
}

/// Classifier for `explain`. Falls back to the built-in revert table when the
/// configuration cannot be loaded.
async fn load_classifier(path: &Path) -> ErrorClassifier {
	match Config::from_file(path).await {
		Ok(config) => ErrorClassifier::new(&config.trade.revert_messages),
		Err(e) => {
			tracing::debug!(error = %e, "Using built-in revert messages");
			ErrorClassifier::default()
		},
	}
}

/// Builds the intent and the session it is submitted from.
async fn prepare(
	engine: &TradeEngine,
	trade: &TradeArgs,
) -> Result<(synth_types::TradeIntent, TradeSession), Box<dyn std::error::Error>> {
	let mut session = engine.default_session().await?;
	if trade.chain.is_some() {
		session.chain_id = trade.chain;
	}
	let intent = trade.to_intent(engine.networks(), session.chain_id)?;
	tracing::debug!(summary = %intent.summary(), chain_id = ?session.chain_id, "Prepared trade");
	Ok((intent, session))
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Write;

	const CONFIG: &str = r#"
[trade.revert_messages]
"Synchronizer: EXPIRED_SIGNATURE" = "Price expired, try again."

[networks.56]
rpc_url = "http://localhost:8545"
synchronizer_address = "0x7a27a7bf2b5e3e6b3e4ba6e2ec4d5d1f5ff4e3a1"

[account]
primary = "local"
[account.implementations.local]
private_key = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80"

[oracle]
primary = "mock"
[oracle.implementations.mock]

[history]
primary = "memory"
[history.implementations.memory]
"#;

	fn expired() -> serde_json::Value {
		serde_json::json!({ "message": "execution reverted: Synchronizer: EXPIRED_SIGNATURE" })
	}

	#[tokio::test]
	async fn test_explain_uses_configured_messages() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		file.write_all(CONFIG.as_bytes()).unwrap();

		let classifier = load_classifier(file.path()).await;
		assert_eq!(classifier.classify(&expired()), "Price expired, try again.");
	}

	#[tokio::test]
	async fn test_explain_without_config() {
		let classifier = load_classifier(Path::new("/nonexistent/synth.toml")).await;
		assert_eq!(
			classifier.classify(&expired()),
			ErrorClassifier::default().classify(&expired())
		);
		assert_ne!(classifier.classify(&expired()), "Price expired, try again.");
	}
}
