//! Command-line arguments and intent assembly.

use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;
use synth_types::{AmountError, Currency, CurrencyAmount, NetworksConfig, TradeIntent, TradeType};

/// Command-line arguments for the trade service.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
	/// Path to configuration file
	#[arg(short, long, default_value = "config.toml", env = "SYNTH_CONFIG")]
	pub config: PathBuf,

	/// Log level (trace, debug, info, warn, error)
	#[arg(short, long, default_value = "info")]
	pub log_level: String,

	#[command(subcommand)]
	pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
	/// Submit a trade
	Trade(TradeArgs),
	/// Show summary and fee of a trade without submitting it
	Quote(TradeArgs),
	/// List registered transactions
	History {
		/// Only show transactions on this chain
		#[arg(long)]
		chain: Option<u64>,
	},
	/// Classify a raw provider error given as JSON. Only `[trade.revert_messages]`
	/// is read from the configuration; built-in messages are used without one.
	Explain {
		#[arg(long)]
		error: String,
	},
}

#[derive(ClapArgs, Debug, Clone)]
pub struct TradeArgs {
	/// Symbol of the currency paid in
	#[arg(long)]
	pub from: String,

	/// Symbol of the currency received
	#[arg(long)]
	pub to: String,

	/// Amount paid in, as a decimal
	#[arg(long)]
	pub amount: String,

	/// Expected amount received, as a decimal
	#[arg(long)]
	pub amount_out: Option<String>,

	/// open or close
	#[arg(long = "type", value_parser = parse_trade_type)]
	pub trade_type: TradeType,

	/// Chain to trade on; defaults to `trade.default_chain_id`
	#[arg(long)]
	pub chain: Option<u64>,
}

fn parse_trade_type(value: &str) -> Result<TradeType, String> {
	value.parse()
}

impl TradeArgs {
	/// Resolves symbols against the chain's configured currencies.
	///
	/// Unknown symbols or chains leave the currency empty; the engine reports
	/// it as a missing dependency.
	pub fn to_intent(
		&self,
		networks: &NetworksConfig,
		chain_id: Option<u64>,
	) -> Result<TradeIntent, AmountError> {
		let lookup = |symbol: &str| -> Option<Currency> {
			let chain_id = chain_id?;
			networks.get(&chain_id)?.currency(chain_id, symbol)
		};
		let currency_in = lookup(&self.from);
		let currency_out = lookup(&self.to);

		let amount_in = currency_in
			.clone()
			.map(|currency| CurrencyAmount::parse(currency, &self.amount))
			.transpose()?;
		let amount_out = match (&currency_out, &self.amount_out) {
			(Some(currency), Some(amount)) => Some(CurrencyAmount::parse(currency.clone(), amount)?),
			_ => None,
		};

		Ok(TradeIntent {
			currency_in,
			currency_out,
			amount_in,
			amount_out,
			trade_type: self.trade_type,
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::collections::HashMap;
	use synth_types::NetworkConfig;

	fn networks() -> NetworksConfig {
		let network: NetworkConfig = toml::from_str(
			r#"
rpc_url = "http://localhost:8545"
synchronizer_address = "0x7a27a7bf2b5e3e6b3e4ba6e2ec4d5d1f5ff4e3a1"

[[tokens]]
address = "0xDE12c7959E1a72bbe8a5f7A1dc8f8EeF9Ab011B3"
symbol = "DEI"
decimals = 18

[[tokens]]
address = "0x1111111111111111111111111111111111111111"
symbol = "SYM"
decimals = 18
"#,
		)
		.unwrap();
		HashMap::from([(56, network)])
	}

	#[test]
	fn test_parse_trade_command() {
		let args = Args::try_parse_from([
			"synth", "--config", "demo.toml", "trade", "--from", "DEI", "--to", "SYM",
			"--amount", "100", "--type", "open",
		])
		.unwrap();

		assert_eq!(args.config, PathBuf::from("demo.toml"));
		assert_eq!(args.log_level, "info");
		match args.command {
			Command::Trade(trade) => {
				assert_eq!(trade.trade_type, TradeType::Open);
				assert_eq!(trade.amount_out, None);
			}
			other => panic!("unexpected command {:?}", other),
		}
	}

	#[test]
	fn test_invalid_trade_type_rejected() {
		let result = Args::try_parse_from([
			"synth", "quote", "--from", "DEI", "--to", "SYM", "--amount", "1", "--type", "swap",
		]);
		assert!(result.is_err());
	}

	#[test]
	fn test_to_intent() {
		let trade = TradeArgs {
			from: "dei".to_string(),
			to: "SYM".to_string(),
			amount: "100".to_string(),
			amount_out: Some("81.30081300813".to_string()),
			trade_type: TradeType::Open,
			chain: None,
		};

		let intent = trade.to_intent(&networks(), Some(56)).unwrap();
		assert_eq!(intent.summary(), "Trade 100 DEI for 81.3008 SYM");

		let unknown_chain = trade.to_intent(&networks(), Some(1)).unwrap();
		assert!(unknown_chain.currency_in.is_none());
		assert!(unknown_chain.amount_in.is_none());

		let bad_amount = TradeArgs {
			amount: "1.5.5".to_string(),
			..trade
		};
		assert!(bad_amount.to_intent(&networks(), Some(56)).is_err());
	}
}
