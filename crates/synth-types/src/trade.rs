//! Trade intent and session types.
//!
//! A `TradeIntent` is what the user asked for; a `TradeSession` is who is
//! asking and on which chain. Both are plain values handed to the pipeline
//! entry point, nothing is read from ambient state.

use crate::{Currency, CurrencyAmount};
use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Direction of a synthetic-asset trade.
///
/// `Open` buys the synthetic asset with collateral, `Close` sells it back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeType {
	Open,
	Close,
}

impl TradeType {
	/// Action name understood by the oracle signing network.
	pub fn oracle_action(&self) -> TradeAction {
		match self {
			TradeType::Open => TradeAction::Buy,
			TradeType::Close => TradeAction::Sell,
		}
	}

	/// Synchronizer contract method used for this direction.
	pub fn method_name(&self) -> &'static str {
		match self {
			TradeType::Open => "buyFor",
			TradeType::Close => "sellFor",
		}
	}
}

impl fmt::Display for TradeType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			TradeType::Open => write!(f, "OPEN"),
			TradeType::Close => write!(f, "CLOSE"),
		}
	}
}

impl FromStr for TradeType {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_ascii_lowercase().as_str() {
			"open" => Ok(TradeType::Open),
			"close" => Ok(TradeType::Close),
			other => Err(format!("Unknown trade type '{}'", other)),
		}
	}
}

/// Oracle-side vocabulary for a trade direction.
///
/// The oracle and the synchronizer name the same direction differently
/// (`buy` vs `buyFor`); both namings are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeAction {
	Buy,
	Sell,
}

impl TradeAction {
	pub fn as_str(&self) -> &'static str {
		match self {
			TradeAction::Buy => "buy",
			TradeAction::Sell => "sell",
		}
	}
}

impl fmt::Display for TradeAction {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// What the user wants to trade.
///
/// Every field except the direction may be missing while the user is still
/// filling in the form; the pipeline reports what is absent instead of
/// assuming defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradeIntent {
	pub currency_in: Option<Currency>,
	pub currency_out: Option<Currency>,
	pub amount_in: Option<CurrencyAmount>,
	pub amount_out: Option<CurrencyAmount>,
	pub trade_type: TradeType,
}

impl TradeIntent {
	/// Human-readable description used when registering the transaction.
	///
	/// Amounts are rendered with six significant digits; a missing amount
	/// renders as `?`.
	pub fn summary(&self) -> String {
		let amount = |a: &Option<CurrencyAmount>| {
			a.as_ref()
				.map(|a| a.to_significant(6))
				.unwrap_or_else(|| "?".to_string())
		};
		let symbol = |c: &Option<Currency>| {
			c.as_ref()
				.map(|c| c.symbol().to_string())
				.unwrap_or_else(|| "?".to_string())
		};

		format!(
			"Trade {} {} for {} {}",
			amount(&self.amount_in),
			symbol(&self.currency_in),
			amount(&self.amount_out),
			symbol(&self.currency_out)
		)
	}
}

/// The connected wallet session a trade is submitted from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TradeSession {
	pub chain_id: Option<u64>,
	pub account: Option<Address>,
}

impl TradeSession {
	pub fn new(chain_id: u64, account: Address) -> Self {
		Self {
			chain_id: Some(chain_id),
			account: Some(account),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::Token;
	use alloy_primitives::address;

	fn token(symbol: &str, address: Address) -> Currency {
		Currency::Token(Token {
			chain_id: 56,
			address,
			symbol: symbol.to_string(),
			decimals: 18,
			name: None,
		})
	}

	#[test]
	fn test_direction_vocabularies_stay_distinct() {
		assert_eq!(TradeType::Open.oracle_action().as_str(), "buy");
		assert_eq!(TradeType::Close.oracle_action().as_str(), "sell");
		assert_eq!(TradeType::Open.method_name(), "buyFor");
		assert_eq!(TradeType::Close.method_name(), "sellFor");
	}

	#[test]
	fn test_trade_type_parsing() {
		assert_eq!("open".parse::<TradeType>(), Ok(TradeType::Open));
		assert_eq!("CLOSE".parse::<TradeType>(), Ok(TradeType::Close));
		assert!("swap".parse::<TradeType>().is_err());
	}

	#[test]
	fn test_summary() {
		let dei = token("DEI", address!("de12c7959e1a72bbe8a5f7a1dc8f8eef9ab011b3"));
		let sym = token("SYM", address!("1111111111111111111111111111111111111111"));
		let intent = TradeIntent {
			amount_in: Some(CurrencyAmount::parse(dei.clone(), "100").unwrap()),
			amount_out: Some(CurrencyAmount::parse(sym.clone(), "81.30081300813").unwrap()),
			currency_in: Some(dei),
			currency_out: Some(sym),
			trade_type: TradeType::Open,
		};
		assert_eq!(intent.summary(), "Trade 100 DEI for 81.3008 SYM");

		let partial = TradeIntent {
			amount_out: None,
			..intent
		};
		assert_eq!(partial.summary(), "Trade 100 DEI for ? SYM");
	}
}
